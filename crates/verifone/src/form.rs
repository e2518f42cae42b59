//! Hosted payment page form generation.
//!
//! Instead of a server interface call, a browser payment posts a signed
//! field set directly to the provider's payment page. [`build_form`] turns
//! a typed [`PaymentForm`] into that field set; rendering it as hidden
//! HTML inputs is the shop's concern. Pure function, no I/O.

use chrono::Utc;
use sha2::{Digest, Sha256};

use crate::basket::{to_minor_units, BasketItem};
use crate::error::VerifoneError;
use crate::iso::{resolve_country, CurrencyCode};
use crate::params::{truncate_chars, ParameterSet};
use crate::request::Credentials;
use crate::signer::{SignatureAlgorithm, Signer};

/// What happens to the customer's payment method after the payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavePaymentMethod {
    /// Normal payment; a card customer may opt in to saving.
    Normal,
    /// Save the payment method if the payment succeeds.
    SaveOnSuccess,
    /// Only save the method, charge nothing.
    SaveOnly,
    /// Hide the save-payment options entirely.
    Disabled,
}

impl SavePaymentMethod {
    fn as_str(self) -> &'static str {
        match self {
            SavePaymentMethod::Normal => "0",
            SavePaymentMethod::SaveOnSuccess => "1",
            SavePaymentMethod::SaveOnly => "2",
            SavePaymentMethod::Disabled => "3",
        }
    }
}

/// Input for a hosted payment page form.
///
/// Amounts are in major units (`1.51` = 1 euro 51 cents) and are converted
/// to the provider's minor-unit integers on build. Optional free-text
/// fields are truncated to their field's maximum length.
#[derive(Debug, Clone, Default)]
pub struct PaymentForm {
    pub order_number: String,
    /// Customer locale, e.g. `fi_FI`. Unsupported locales fall back to
    /// `en_GB` on the provider side.
    pub locale: String,
    pub amount_gross: Option<f64>,
    pub amount_net: Option<f64>,
    pub vat_amount: Option<f64>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub address2: Option<String>,
    pub address3: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    /// Alpha-2 or numeric ISO 3166 country code.
    pub country: Option<String>,
    /// Style sheet code for the payment page.
    pub style: Option<String>,
    pub note: Option<String>,
    pub customer_id: Option<String>,
    /// Comma-separated list of extra parameters wanted in the feedback.
    pub dynamic_feedback: Option<String>,
    pub payment_method: Option<String>,
    pub save_method: Option<SavePaymentMethod>,
    pub skip_confirmation: bool,
    pub cancel_url: String,
    pub error_url: String,
    pub expired_url: String,
    pub rejected_url: String,
    pub success_url: String,
    /// Server-to-server success callback URL.
    pub success_url_server: String,
    /// `yyyy-MM-dd HH:mm:ss` UTC; defaults to now.
    pub payment_timestamp: Option<String>,
    /// `yyyy-MM-dd HH:mm:ss` UTC; defaults to now.
    pub order_timestamp: Option<String>,
    /// 0-50 basket lines.
    pub products: Vec<BasketItem>,
}

/// Payment token binding agreement code, order number and payment time:
/// first 32 hex characters of their SHA-256, upper case.
pub fn payment_token(agreement_code: &str, order_number: &str, payment_timestamp: &str) -> String {
    let plaintext = format!("{agreement_code};{order_number};{payment_timestamp}");
    let digest = Sha256::digest(plaintext.as_bytes());
    let mut token = String::with_capacity(32);
    for byte in digest.iter().take(16) {
        use std::fmt::Write;
        let _ = write!(token, "{byte:02X}");
    }
    token
}

/// Build the signed field set for the hosted payment page.
pub fn build_form<S: Signer>(
    form: &PaymentForm,
    credentials: &Credentials,
    signer: &S,
    currency: &CurrencyCode,
) -> Result<ParameterSet, VerifoneError> {
    let now = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let payment_timestamp = form.payment_timestamp.clone().unwrap_or_else(|| now.clone());
    let order_timestamp = form.order_timestamp.clone().unwrap_or(now);

    let token = payment_token(&credentials.agreement_code, &form.order_number, &payment_timestamp);

    let mut fields = ParameterSet::new();
    fields.insert("s-f-32-32_payment-token", token);
    fields.insert("locale-f-2-5_payment-locale", form.locale.clone());
    fields.insert("t-f-14-19_payment-timestamp", payment_timestamp);
    fields.insert("t-f-14-19_order-timestamp", order_timestamp);
    fields.insert(
        "s-f-1-36_merchant-agreement-code",
        credentials.agreement_code.clone(),
    );
    fields.insert("s-f-1-36_order-number", form.order_number.clone());
    fields.insert("i-f-1-3_order-currency-code", currency.numeric());
    // Left empty: one payment may span multiple VAT percentages.
    fields.insert("i-t-1-4_order-vat-percentage", "");
    fields.insert(
        "s-f-1-30_buyer-first-name",
        truncate_chars(&form.first_name, 30),
    );
    fields.insert(
        "s-f-1-30_buyer-last-name",
        truncate_chars(&form.last_name, 30),
    );
    fields.insert(
        "s-f-1-100_buyer-email-address",
        truncate_chars(&form.email, 100),
    );
    fields.insert("s-t-1-30_style-code", form.style.clone().unwrap_or_default());
    fields.insert("s-f-5-256_cancel-url", form.cancel_url.clone());
    fields.insert("s-f-5-256_error-url", form.error_url.clone());
    fields.insert("s-f-5-256_expired-url", form.expired_url.clone());
    fields.insert("s-f-5-256_rejected-url", form.rejected_url.clone());
    fields.insert("s-f-5-256_success-url", form.success_url.clone());
    fields.insert(
        "s-t-5-256_change-server-to-server-success-url",
        form.success_url_server.clone(),
    );
    fields.insert("s-f-1-30_software", credentials.software.clone());
    fields.insert("s-f-1-10_software-version", credentials.software_version.clone());
    fields.insert(
        "i-f-1-11_interface-version",
        credentials.interface_version.clone(),
    );
    fields.insert(
        "i-t-1-1_skip-confirmation-page",
        if form.skip_confirmation { "1" } else { "0" },
    );

    if let Some(gross) = form.amount_gross {
        fields.insert("l-f-1-20_order-gross-amount", to_minor_units(gross).to_string());
    }
    if let Some(net) = form.amount_net {
        fields.insert("l-f-1-20_order-net-amount", to_minor_units(net).to_string());
    }
    if let Some(vat) = form.vat_amount {
        fields.insert("l-f-1-20_order-vat-amount", to_minor_units(vat).to_string());
    }

    let optional_30 = [
        (&form.phone, "s-t-1-30_buyer-phone-number"),
        (&form.address, "s-t-1-30_delivery-address-line-one"),
        (&form.address2, "s-t-1-30_delivery-address-line-two"),
        (&form.address3, "s-t-1-30_delivery-address-line-three"),
        (&form.city, "s-t-1-30_delivery-address-city"),
        (&form.postal_code, "s-t-1-30_delivery-address-postal-code"),
        (&form.payment_method, "s-t-1-30_payment-method-code"),
    ];
    for (value, code) in optional_30 {
        if let Some(value) = value {
            fields.insert(code, truncate_chars(value, 30));
        }
    }

    if let Some(save) = form.save_method {
        fields.insert("i-t-1-1_save-payment-method", save.as_str());
    }
    if let Some(country) = &form.country {
        fields.insert(
            "i-t-1-3_delivery-address-country-code",
            resolve_country(country)?,
        );
    }
    if let Some(customer_id) = &form.customer_id {
        fields.insert("s-t-1-255_buyer-external-id", truncate_chars(customer_id, 255));
    }
    if let Some(note) = &form.note {
        fields.insert("s-t-1-36_order-note", truncate_chars(note, 36));
    }
    if let Some(feedback) = &form.dynamic_feedback {
        fields.insert("s-t-1-1024_dynamic-feedback", truncate_chars(feedback, 1024));
    }

    for (index, item) in form.products.iter().enumerate() {
        item.write_to(index, &mut fields);
    }

    let plaintext = fields.plaintext();
    let signature_one = signer.sign(SignatureAlgorithm::Sha1, plaintext.as_bytes())?;
    let signature_two = signer.sign(SignatureAlgorithm::Sha512, plaintext.as_bytes())?;
    fields.insert(crate::constants::SIGNATURE_ONE, signature_one);
    fields.insert(crate::constants::SIGNATURE_TWO, signature_two);

    tracing::debug!(
        order_number = %form.order_number,
        field_count = fields.len(),
        "built payment page form"
    );
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants;
    use crate::testutil::MockSigner;

    #[test]
    fn test_payment_token_value() {
        assert_eq!(
            payment_token("AGR1", "58459", "2018-08-02 11:59:16"),
            "C27AE21C75E153A3C8C566E1F56D41B5"
        );
    }

    #[test]
    fn test_payment_token_length_and_case() {
        let token = payment_token("x", "y", "z");
        assert_eq!(token.len(), 32);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    fn sample_form() -> PaymentForm {
        PaymentForm {
            order_number: "58459".to_string(),
            locale: "fi_FI".to_string(),
            amount_gross: Some(1.51),
            amount_net: Some(1.22),
            vat_amount: Some(0.29),
            first_name: "Test".to_string(),
            last_name: "Tester".to_string(),
            email: "test@test.test".to_string(),
            phone: Some("1212121212121212".to_string()),
            address: Some("Test Street 4".to_string()),
            postal_code: Some("33200".to_string()),
            city: Some("Tampere".to_string()),
            country: Some("fi".to_string()),
            payment_method: Some("nordea-e-payment".to_string()),
            save_method: Some(SavePaymentMethod::Disabled),
            cancel_url: "https://cancel.url".to_string(),
            error_url: "https://error.url".to_string(),
            expired_url: "https://expired.url".to_string(),
            rejected_url: "https://rejected.url".to_string(),
            success_url: "https://success.url".to_string(),
            success_url_server: "https://server.success.url".to_string(),
            payment_timestamp: Some("2018-08-02 11:59:16".to_string()),
            order_timestamp: Some("2018-08-02 09:14:12".to_string()),
            products: vec![BasketItem {
                name: "er_7142303001".to_string(),
                unit_count: 1,
                vat_percent: 24.0,
                discount_percent: 0.0,
                gross_amount: Some(1.51),
                net_amount: Some(1.22),
                unit_cost_gross: Some(1.51),
                unit_cost: None,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_build_form_fields() {
        let credentials = Credentials::new("AGR1", "sdk", "1.0");
        let fields = build_form(
            &sample_form(),
            &credentials,
            &MockSigner::default(),
            &CurrencyCode::default(),
        )
        .unwrap();

        assert_eq!(
            fields.get("s-f-32-32_payment-token"),
            Some("C27AE21C75E153A3C8C566E1F56D41B5")
        );
        assert_eq!(fields.get("i-f-1-3_order-currency-code"), Some("978"));
        assert_eq!(fields.get("i-t-1-4_order-vat-percentage"), Some(""));
        assert_eq!(fields.get("l-f-1-20_order-gross-amount"), Some("151"));
        assert_eq!(fields.get("l-f-1-20_order-net-amount"), Some("122"));
        assert_eq!(fields.get("l-f-1-20_order-vat-amount"), Some("29"));
        assert_eq!(
            fields.get("i-t-1-3_delivery-address-country-code"),
            Some("246")
        );
        assert_eq!(fields.get("i-t-1-1_save-payment-method"), Some("3"));
        assert_eq!(fields.get("i-t-1-1_skip-confirmation-page"), Some("0"));
        assert_eq!(fields.get("s-t-1-30_bi-name-0"), Some("er_7142303001"));
        assert!(fields.contains(constants::SIGNATURE_ONE));
        assert!(fields.contains(constants::SIGNATURE_TWO));
    }

    #[test]
    fn test_build_form_signs_field_set() {
        let credentials = Credentials::new("AGR1", "sdk", "1.0");
        let signer = MockSigner::default();
        let fields = build_form(
            &sample_form(),
            &credentials,
            &signer,
            &CurrencyCode::default(),
        )
        .unwrap();

        let mut unsigned = fields.clone();
        unsigned.remove(constants::SIGNATURE_ONE);
        unsigned.remove(constants::SIGNATURE_TWO);
        let plaintext = unsigned.plaintext();
        assert_eq!(
            fields.get(constants::SIGNATURE_ONE),
            Some(
                signer
                    .expected(SignatureAlgorithm::Sha1, plaintext.as_bytes())
                    .as_str()
            )
        );
    }

    #[test]
    fn test_build_form_rejects_unknown_country() {
        let mut form = sample_form();
        form.country = Some("zz".to_string());
        let err = build_form(
            &form,
            &Credentials::new("AGR1", "sdk", "1.0"),
            &MockSigner::default(),
            &CurrencyCode::default(),
        )
        .unwrap_err();
        assert!(matches!(err, VerifoneError::Config(_)));
    }

    #[test]
    fn test_numeric_country_passes_through() {
        assert_eq!(resolve_country("246").unwrap(), "246");
        assert_eq!(resolve_country("FI").unwrap(), "246");
    }

    #[test]
    fn test_truncates_long_names() {
        let mut form = sample_form();
        form.first_name = "x".repeat(40);
        let fields = build_form(
            &form,
            &Credentials::new("AGR1", "sdk", "1.0"),
            &MockSigner::default(),
            &CurrencyCode::default(),
        )
        .unwrap();
        assert_eq!(
            fields.get("s-f-1-30_buyer-first-name").unwrap().len(),
            30
        );
    }
}
