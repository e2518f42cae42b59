//! ISO 4217 currency and ISO 3166 country lookups.
//!
//! The provider wants numeric codes on the wire while merchants configure
//! alphabetic ones, so the tables here map alpha codes to their numeric
//! string form. Static data; additions are cheap if a merchant needs a
//! code that is missing.

use crate::error::VerifoneError;

/// ISO 4217 alpha-3 → numeric code, zero-padded to three digits.
static CURRENCIES: &[(&str, &str)] = &[
    ("AED", "784"),
    ("AUD", "036"),
    ("BGN", "975"),
    ("BRL", "986"),
    ("CAD", "124"),
    ("CHF", "756"),
    ("CNY", "156"),
    ("CZK", "203"),
    ("DKK", "208"),
    ("EGP", "818"),
    ("EUR", "978"),
    ("GBP", "826"),
    ("HKD", "344"),
    ("HUF", "348"),
    ("IDR", "360"),
    ("ILS", "376"),
    ("INR", "356"),
    ("ISK", "352"),
    ("JPY", "392"),
    ("KES", "404"),
    ("KRW", "410"),
    ("MXN", "484"),
    ("MYR", "458"),
    ("NOK", "578"),
    ("NZD", "554"),
    ("PHP", "608"),
    ("PLN", "985"),
    ("RON", "946"),
    ("RSD", "941"),
    ("RUB", "643"),
    ("SAR", "682"),
    ("SEK", "752"),
    ("SGD", "702"),
    ("THB", "764"),
    ("TRY", "949"),
    ("UAH", "980"),
    ("USD", "840"),
    ("VND", "704"),
    ("ZAR", "710"),
];

/// ISO 3166 alpha-2 → numeric code, zero-padded to three digits.
static COUNTRIES: &[(&str, &str)] = &[
    ("AT", "040"),
    ("AU", "036"),
    ("BE", "056"),
    ("BG", "100"),
    ("BR", "076"),
    ("CA", "124"),
    ("CH", "756"),
    ("CN", "156"),
    ("CY", "196"),
    ("CZ", "203"),
    ("DE", "276"),
    ("DK", "208"),
    ("EE", "233"),
    ("ES", "724"),
    ("FI", "246"),
    ("FR", "250"),
    ("GB", "826"),
    ("GR", "300"),
    ("HR", "191"),
    ("HU", "348"),
    ("IE", "372"),
    ("IN", "356"),
    ("IS", "352"),
    ("IT", "380"),
    ("JP", "392"),
    ("KR", "410"),
    ("LT", "440"),
    ("LU", "442"),
    ("LV", "428"),
    ("MT", "470"),
    ("MX", "484"),
    ("NL", "528"),
    ("NO", "578"),
    ("NZ", "554"),
    ("PL", "616"),
    ("PT", "620"),
    ("RO", "642"),
    ("RU", "643"),
    ("SE", "752"),
    ("SI", "705"),
    ("SK", "703"),
    ("TR", "792"),
    ("UA", "804"),
    ("US", "840"),
    ("ZA", "710"),
];

/// Numeric ISO 4217 code for an alpha-3 currency code (case-insensitive).
pub fn currency_numeric(alpha3: &str) -> Option<&'static str> {
    let upper = alpha3.to_ascii_uppercase();
    CURRENCIES
        .iter()
        .find(|(code, _)| *code == upper)
        .map(|(_, numeric)| *numeric)
}

/// Numeric ISO 3166 code for an alpha-2 country code (case-insensitive).
pub fn country_numeric(alpha2: &str) -> Option<&'static str> {
    let upper = alpha2.to_ascii_uppercase();
    COUNTRIES
        .iter()
        .find(|(code, _)| *code == upper)
        .map(|(_, numeric)| *numeric)
}

/// Resolve a delivery-address country to the wire form: alphabetic ISO
/// 3166 codes become numeric, numeric input passes through unchanged.
pub fn resolve_country(country: &str) -> Result<String, VerifoneError> {
    if country.chars().all(|c| c.is_ascii_alphabetic()) {
        country_numeric(country)
            .map(str::to_string)
            .ok_or_else(|| VerifoneError::Config(format!("unknown country code {country:?}")))
    } else {
        Ok(country.to_string())
    }
}

/// A validated currency, resolved once to both its alpha and numeric form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyCode {
    alpha: String,
    numeric: &'static str,
}

impl CurrencyCode {
    /// Resolve an alpha-3 code. Fails with [`VerifoneError::Config`] on
    /// anything that is not three letters or is not in the table.
    pub fn from_alpha(alpha3: &str) -> Result<Self, VerifoneError> {
        if alpha3.chars().count() != 3 || !alpha3.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(VerifoneError::Config(format!(
                "currency code must be three letters, got {alpha3:?}"
            )));
        }
        let numeric = currency_numeric(alpha3)
            .ok_or_else(|| VerifoneError::Config(format!("unknown currency code {alpha3:?}")))?;
        Ok(Self {
            alpha: alpha3.to_ascii_uppercase(),
            numeric,
        })
    }

    /// The upper-case alpha-3 code, e.g. `"EUR"`.
    pub fn alpha(&self) -> &str {
        &self.alpha
    }

    /// The numeric code as sent on the wire, e.g. `"978"`.
    pub fn numeric(&self) -> &'static str {
        self.numeric
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self {
            alpha: crate::constants::DEFAULT_CURRENCY.to_string(),
            numeric: "978",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_lookup() {
        assert_eq!(currency_numeric("EUR"), Some("978"));
        assert_eq!(currency_numeric("sek"), Some("752"));
        assert_eq!(currency_numeric("XXX"), None);
    }

    #[test]
    fn test_country_lookup() {
        assert_eq!(country_numeric("FI"), Some("246"));
        assert_eq!(country_numeric("fi"), Some("246"));
        assert_eq!(country_numeric("ZZ"), None);
    }

    #[test]
    fn test_currency_code_strict_parse() {
        let eur = CurrencyCode::from_alpha("eur").unwrap();
        assert_eq!(eur.alpha(), "EUR");
        assert_eq!(eur.numeric(), "978");

        assert!(matches!(
            CurrencyCode::from_alpha("euro"),
            Err(VerifoneError::Config(_))
        ));
        assert!(matches!(
            CurrencyCode::from_alpha("eu1"),
            Err(VerifoneError::Config(_))
        ));
        assert!(matches!(
            CurrencyCode::from_alpha("€"),
            Err(VerifoneError::Config(_))
        ));
        assert!(matches!(
            CurrencyCode::from_alpha("abc"),
            Err(VerifoneError::Config(_))
        ));
    }

    #[test]
    fn test_default_is_eur() {
        let currency = CurrencyCode::default();
        assert_eq!(currency.alpha(), "EUR");
        assert_eq!(currency.numeric(), "978");
    }
}
