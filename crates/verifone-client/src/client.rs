//! The per-operation client facade.

use verifone::constants::{
    CURRENCY_CODE, DELIVERY_COUNTRY_CODE, ORDER_CURRENCY_CODE, ORDER_EXPIRY_TIMESTAMP,
    ORDER_NUMBER, ORDER_TIMESTAMP, PAYMENT_LINK_NUMBER, PAYMENT_TIMESTAMP, REFUND_CURRENCY_CODE,
    SAVED_PAYMENT_METHOD_ID,
};
use verifone::iso::resolve_country;
use verifone::{
    build_form, build_request, Credentials, CurrencyCode, EndpointConfig, ParameterSet,
    PaymentForm, Response, RsaSigner, Schema, Signer, VerifoneError,
};

use crate::transport::{HttpTransport, Transport};

/// Client for the Verifone e-payment server interface.
///
/// One method per provider operation; each assembles a signed request,
/// posts it, and decodes the reply. Configuration (credentials, currency,
/// endpoints) is immutable after construction, so a single client can
/// serve concurrent calls without locking.
///
/// Business outcomes are data, not errors: a declined payment or a `0`
/// availability level comes back as a normal [`Response`] and callers
/// inspect its fields. The error type is reserved for local validation,
/// transport, and decoding failures.
pub struct VerifoneClient<S: Signer = RsaSigner, T: Transport = HttpTransport> {
    credentials: Credentials,
    signer: S,
    transport: T,
    endpoints: EndpointConfig,
    currency: CurrencyCode,
    schema: Schema,
    verify_responses: bool,
}

impl VerifoneClient {
    /// Build a production client from PEM key material.
    ///
    /// Keys are parsed eagerly so a bad configuration fails here rather
    /// than on the first call.
    pub fn new(
        agreement_code: impl Into<String>,
        private_key_pem: &str,
        provider_public_key_pem: &str,
        software: impl Into<String>,
        software_version: impl Into<String>,
    ) -> Result<Self, VerifoneError> {
        let signer = RsaSigner::from_pem(private_key_pem, provider_public_key_pem)?;
        let transport = HttpTransport::new()?;
        Ok(Self::with_parts(
            Credentials::new(agreement_code, software, software_version),
            signer,
            transport,
        ))
    }
}

impl<S: Signer, T: Transport> VerifoneClient<S, T> {
    /// Assemble a client from explicit parts. This is the seam tests and
    /// alternative signing/transport implementations plug into.
    pub fn with_parts(credentials: Credentials, signer: S, transport: T) -> Self {
        Self {
            credentials,
            signer,
            transport,
            endpoints: EndpointConfig::default(),
            currency: CurrencyCode::default(),
            schema: Schema::builtin(),
            verify_responses: true,
        }
    }

    /// Switch between the provider's test and production environments.
    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.endpoints = if test_mode {
            EndpointConfig::test()
        } else {
            EndpointConfig::default()
        };
        self
    }

    /// Point the client at custom endpoints.
    pub fn with_endpoints(mut self, endpoints: EndpointConfig) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Set the currency injected into payment operations. Strict: unknown
    /// or malformed codes are a configuration error.
    pub fn with_currency(mut self, alpha3: &str) -> Result<Self, VerifoneError> {
        self.currency = CurrencyCode::from_alpha(alpha3)?;
        Ok(self)
    }

    /// Replace the built-in mandatory-field schema.
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    /// Skip response signature verification. Intended for provider test
    /// environments with mismatched keys; leave it on in production.
    pub fn without_response_verification(mut self) -> Self {
        self.verify_responses = false;
        self
    }

    /// Swap the transport, keeping all other configuration.
    pub fn with_transport<T2: Transport>(self, transport: T2) -> VerifoneClient<S, T2> {
        VerifoneClient {
            credentials: self.credentials,
            signer: self.signer,
            transport,
            endpoints: self.endpoints,
            currency: self.currency,
            schema: self.schema,
            verify_responses: self.verify_responses,
        }
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }

    pub fn endpoints(&self) -> &EndpointConfig {
        &self.endpoints
    }

    /// Connectivity, signature and entitlement check.
    ///
    /// The reply's `i-f-1-1_availability` field carries the access level
    /// (`0` none, `1` express, `2` advanced). `0` is not an error — the
    /// caller decides how to react.
    pub async fn is_available(&self) -> Result<Response, VerifoneError> {
        self.call("is-available", ParameterSet::new()).await
    }

    /// List available payment methods and their amount limits for the
    /// configured currency.
    pub async fn list_payment_methods(&self) -> Result<Response, VerifoneError> {
        let mut params = ParameterSet::new();
        params.insert(CURRENCY_CODE, self.currency.numeric());
        self.call("list-payment-methods", params).await
    }

    /// List payment methods saved for a buyer (name and email mandatory).
    pub async fn list_saved_payment_methods(
        &self,
        params: ParameterSet,
    ) -> Result<Response, VerifoneError> {
        self.call("list-saved-payment-methods", params).await
    }

    /// Remove a saved payment method. The reply's `l-t-1-10_removed-count`
    /// tells whether anything was removed.
    pub async fn remove_saved_payment_method(
        &self,
        payment_method_id: u64,
    ) -> Result<Response, VerifoneError> {
        let mut params = ParameterSet::new();
        params.insert(SAVED_PAYMENT_METHOD_ID, payment_method_id.to_string());
        self.call("remove-saved-payment-method", params).await
    }

    /// Cancel a payment identified by payment method code and transaction
    /// number.
    pub async fn cancel_payment(&self, params: ParameterSet) -> Result<Response, VerifoneError> {
        self.call("cancel-payment", params).await
    }

    /// Refund a card, electronic or invoice payment.
    pub async fn refund_payment(
        &self,
        params: ParameterSet,
    ) -> Result<Response, VerifoneError> {
        let mut merged = ParameterSet::new();
        merged.insert(REFUND_CURRENCY_CODE, self.currency.numeric());
        merged.merge(params);
        self.call("refund-payment", merged).await
    }

    /// Charge a payment directly over the server interface (e.g. against a
    /// saved payment method).
    ///
    /// Payment and order timestamps default to the current UTC time; an
    /// alphabetic delivery country code is converted to its numeric form.
    pub async fn process_payment(
        &self,
        params: ParameterSet,
    ) -> Result<Response, VerifoneError> {
        let mut merged = ParameterSet::new();
        merged.insert(ORDER_CURRENCY_CODE, self.currency.numeric());
        merged.merge(params);

        let now = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
        merged.insert_missing(PAYMENT_TIMESTAMP, now.clone());
        merged.insert_missing(ORDER_TIMESTAMP, now);
        convert_country(&mut merged)?;

        self.call("process-payment", merged).await
    }

    /// Trigger a supplementary authorization on an earlier transaction.
    pub async fn process_supplementary(
        &self,
        params: ParameterSet,
    ) -> Result<Response, VerifoneError> {
        let mut merged = ParameterSet::new();
        merged.insert(ORDER_CURRENCY_CODE, self.currency.numeric());
        merged.merge(params);
        self.call("process-supplementary", merged).await
    }

    /// Query the status of a payment.
    pub async fn get_payment_status(
        &self,
        params: ParameterSet,
    ) -> Result<Response, VerifoneError> {
        self.call("get-payment-status", params).await
    }

    /// List the transaction numbers recorded for an order.
    pub async fn list_transaction_numbers(
        &self,
        order_number: &str,
    ) -> Result<Response, VerifoneError> {
        let mut params = ParameterSet::new();
        params.insert(ORDER_NUMBER, order_number);
        self.call("list-transaction-numbers", params).await
    }

    /// Create a payment link delivered to the customer by SMS or email.
    pub async fn generate_payment_link(
        &self,
        params: ParameterSet,
    ) -> Result<Response, VerifoneError> {
        let mut merged = ParameterSet::new();
        merged.insert(ORDER_CURRENCY_CODE, self.currency.numeric());
        merged.merge(params);
        convert_country(&mut merged)?;
        self.call("generate-payment-link", merged).await
    }

    /// Query a payment link's status (new, used, expired, canceled).
    pub async fn get_payment_link_status(
        &self,
        link_number: &str,
    ) -> Result<Response, VerifoneError> {
        let mut params = ParameterSet::new();
        params.insert(PAYMENT_LINK_NUMBER, link_number);
        self.call("get-payment-link-status", params).await
    }

    /// Reactivate a payment link or move its expiry. The provider emails
    /// the payer about the change.
    pub async fn reactivate_payment_link(
        &self,
        link_number: &str,
        expiry_timestamp: &str,
    ) -> Result<Response, VerifoneError> {
        let mut params = ParameterSet::new();
        params.insert(PAYMENT_LINK_NUMBER, link_number);
        params.insert(ORDER_EXPIRY_TIMESTAMP, expiry_timestamp);
        self.call("reactivate-payment-link", params).await
    }

    /// Build the signed field set for a hosted payment page form. No
    /// network call; the browser posts the result to
    /// [`payment_page_url`](Self::payment_page_url).
    pub fn payment_form(&self, form: &PaymentForm) -> Result<ParameterSet, VerifoneError> {
        build_form(form, &self.credentials, &self.signer, &self.currency)
    }

    /// URL the hosted payment page form is posted to.
    pub fn payment_page_url(&self) -> &str {
        &self.endpoints.payment_page
    }

    /// The build → send → parse → verify pipeline every operation runs.
    async fn call(
        &self,
        operation: &str,
        params: ParameterSet,
    ) -> Result<Response, VerifoneError> {
        let request = build_request(
            operation,
            params,
            &self.credentials,
            &self.signer,
            &self.schema,
        )?;

        tracing::debug!(
            operation,
            endpoint = %self.endpoints.server_interface,
            "sending server interface request"
        );
        let raw = self
            .transport
            .send(&self.endpoints.server_interface, request.fields())
            .await?;

        let response = Response::parse(&raw)?;

        // Provider error replies are unsigned; signature checks only apply
        // to ordinary responses.
        if self.verify_responses && response.error_message().is_none() {
            response.verify(&self.signer)?;
        }

        if let Some(message) = response.error_message() {
            tracing::warn!(operation, message, "provider reported an error");
        }

        Ok(response)
    }
}

/// Rewrite an alphabetic delivery country code to ISO 3166 numeric.
fn convert_country(params: &mut ParameterSet) -> Result<(), VerifoneError> {
    let numeric = match params.get(DELIVERY_COUNTRY_CODE) {
        Some(country) => resolve_country(country)?,
        None => return Ok(()),
    };
    params.insert(DELIVERY_COUNTRY_CODE, numeric);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoints_are_production() {
        let endpoints = EndpointConfig::default();
        assert_eq!(
            endpoints.server_interface,
            "https://epayment1.point.fi/pw/serverinterface"
        );
        assert_eq!(endpoints.payment_page, "https://epayment1.point.fi/pw/payment");
    }

    #[test]
    fn test_test_mode_endpoints() {
        let endpoints = EndpointConfig::test();
        assert_eq!(
            endpoints.server_interface,
            "https://epayment.test.point.fi/pw/serverinterface"
        );
        assert_eq!(
            endpoints.payment_page,
            "https://epayment.test.point.fi/pw/payment"
        );
    }

    #[test]
    fn test_convert_country() {
        let mut params = ParameterSet::from([(DELIVERY_COUNTRY_CODE, "FI")]);
        convert_country(&mut params).unwrap();
        assert_eq!(params.get(DELIVERY_COUNTRY_CODE), Some("246"));

        let mut numeric = ParameterSet::from([(DELIVERY_COUNTRY_CODE, "246")]);
        convert_country(&mut numeric).unwrap();
        assert_eq!(numeric.get(DELIVERY_COUNTRY_CODE), Some("246"));

        let mut unknown = ParameterSet::from([(DELIVERY_COUNTRY_CODE, "ZZ")]);
        assert!(convert_country(&mut unknown).is_err());
    }
}
