//! Per-operation mandatory-field schemas.

use std::collections::HashMap;

use crate::error::VerifoneError;
use crate::params::ParameterSet;

/// Mandatory field codes per operation, checked before a request is signed.
///
/// The built-in table follows the provider's interface documentation;
/// operations missing from the table have no local requirements. The
/// provider remains authoritative, so a custom or trimmed schema can be
/// supplied when it disagrees with the table.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    required: HashMap<String, Vec<String>>,
}

impl Schema {
    /// An empty schema: no local requirements for any operation.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in requirements table.
    pub fn builtin() -> Self {
        let mut schema = Self::default();
        schema
            .require("cancel-payment", [
                "s-f-1-30_payment-method-code",
                "l-f-1-20_transaction-number",
            ])
            .require("get-payment-status", [
                "s-f-1-30_payment-method-code",
                "l-f-1-20_transaction-number",
            ])
            .require("refund-payment", [
                "l-f-1-20_refund-amount",
                "s-f-1-30_payment-method-code",
                "l-f-1-20_transaction-number",
            ])
            .require("process-supplementary", [
                "l-f-1-20_original-transaction-number",
                "s-f-1-30_payment-method-code",
                "l-f-1-20_order-gross-amount",
            ])
            .require("list-saved-payment-methods", [
                "s-f-1-30_buyer-first-name",
                "s-f-1-30_buyer-last-name",
                "s-f-1-100_buyer-email-address",
            ])
            .require("process-payment", [
                "locale-f-2-5_payment-locale",
                "s-f-1-36_order-number",
                "l-f-1-20_order-gross-amount",
                "s-f-1-30_buyer-first-name",
                "s-f-1-30_buyer-last-name",
                "s-f-1-100_buyer-email-address",
            ])
            .require("generate-payment-link", [
                "locale-f-2-5_payment-locale",
                "t-f-14-19_order-expiry-timestamp",
                "s-f-1-36_order-number",
                "t-f-14-19_order-timestamp",
                "l-f-1-20_order-gross-amount",
                "l-f-1-20_order-net-amount",
                "l-f-1-20_order-vat-amount",
                "s-f-1-32_payment-link-delivery-mode",
                "s-f-1-30_buyer-first-name",
                "s-f-1-30_buyer-last-name",
                "s-f-1-100_buyer-email-address",
            ]);
        schema
    }

    /// Add (or extend) the requirements for an operation.
    pub fn require<I, S>(&mut self, operation: &str, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required
            .entry(operation.to_string())
            .or_default()
            .extend(fields.into_iter().map(Into::into));
        self
    }

    /// Fail with the first missing mandatory field for `operation`, if any.
    pub fn check(&self, operation: &str, params: &ParameterSet) -> Result<(), VerifoneError> {
        if let Some(fields) = self.required.get(operation) {
            for field in fields {
                if !params.contains(field) {
                    return Err(VerifoneError::MissingRequiredField(field.clone()));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_passes_complete_params() {
        let schema = Schema::builtin();
        let params = ParameterSet::from([
            ("s-f-1-30_payment-method-code", "visa"),
            ("l-f-1-20_transaction-number", "123456"),
        ]);
        schema.check("cancel-payment", &params).unwrap();
    }

    #[test]
    fn test_builtin_rejects_missing_field() {
        let schema = Schema::builtin();
        let params = ParameterSet::from([("s-f-1-30_payment-method-code", "visa")]);
        let err = schema.check("cancel-payment", &params).unwrap_err();
        assert!(
            matches!(err, VerifoneError::MissingRequiredField(f) if f == "l-f-1-20_transaction-number")
        );
    }

    #[test]
    fn test_unknown_operation_has_no_requirements() {
        let schema = Schema::builtin();
        schema
            .check("some-future-operation", &ParameterSet::new())
            .unwrap();
    }

    #[test]
    fn test_custom_requirements() {
        let mut schema = Schema::empty();
        schema.require("my-op", ["s-f-1-1_flag"]);
        assert!(schema.check("my-op", &ParameterSet::new()).is_err());
        let params = ParameterSet::from([("s-f-1-1_flag", "1")]);
        schema.check("my-op", &params).unwrap();
    }
}
