//! Outbound request assembly: base fields, parameter merge, signatures.

use chrono::Utc;
use rand::Rng;

use crate::constants;
use crate::error::VerifoneError;
use crate::params::ParameterSet;
use crate::schema::Schema;
use crate::signer::{SignatureAlgorithm, Signer};

/// Static merchant configuration sent with every request.
///
/// Immutable for the lifetime of the client; the RSA key material lives in
/// the [`Signer`](crate::Signer), not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Merchant agreement code issued by the provider (1-36 characters).
    pub agreement_code: String,
    /// Name of the shop software (1-30 characters).
    pub software: String,
    /// Version of the shop software (1-10 characters).
    pub software_version: String,
    /// Payment interface version (1-11 numeric characters).
    pub interface_version: String,
}

impl Credentials {
    pub fn new(
        agreement_code: impl Into<String>,
        software: impl Into<String>,
        software_version: impl Into<String>,
    ) -> Self {
        Self {
            agreement_code: agreement_code.into(),
            software: software.into(),
            software_version: software_version.into(),
            interface_version: constants::DEFAULT_INTERFACE_VERSION.to_string(),
        }
    }

    pub fn with_interface_version(mut self, version: impl Into<String>) -> Self {
        self.interface_version = version.into();
        self
    }
}

/// A fully assembled, signed request. Transient: exists for one call.
#[derive(Debug, Clone)]
pub struct Request {
    operation: String,
    fields: ParameterSet,
}

impl Request {
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// The complete form body, signatures included.
    pub fn fields(&self) -> &ParameterSet {
        &self.fields
    }

    pub fn into_fields(self) -> ParameterSet {
        self.fields
    }
}

/// Assemble and sign a request for `operation`.
///
/// Base fields (request id and timestamp, agreement code, software
/// identification, interface version) are laid down first and caller
/// parameters are merged on top, so a caller can deliberately override any
/// of them. Mandatory fields are checked against `schema` after the merge;
/// the request is signed only if the check passes, so a schema failure has
/// zero side effects.
pub fn build_request<S: Signer>(
    operation: &str,
    params: ParameterSet,
    credentials: &Credentials,
    signer: &S,
    schema: &Schema,
) -> Result<Request, VerifoneError> {
    let now = Utc::now();

    let mut fields = ParameterSet::new();
    fields.insert(constants::REQUEST_ID, request_id(&now));
    fields.insert(
        constants::REQUEST_TIMESTAMP,
        now.format("%Y-%m-%d %H:%M:%S").to_string(),
    );
    fields.insert(
        constants::MERCHANT_AGREEMENT_CODE,
        credentials.agreement_code.clone(),
    );
    fields.insert(constants::SOFTWARE, credentials.software.clone());
    fields.insert(
        constants::SOFTWARE_VERSION,
        credentials.software_version.clone(),
    );
    fields.insert(
        constants::INTERFACE_VERSION,
        credentials.interface_version.clone(),
    );
    fields.insert(constants::OPERATION, operation);
    fields.merge(params);

    schema.check(operation, &fields)?;

    let plaintext = fields.plaintext();
    let signature_one = signer.sign(SignatureAlgorithm::Sha1, plaintext.as_bytes())?;
    let signature_two = signer.sign(SignatureAlgorithm::Sha512, plaintext.as_bytes())?;
    fields.insert(constants::SIGNATURE_ONE, signature_one);
    fields.insert(constants::SIGNATURE_TWO, signature_two);

    tracing::debug!(operation, field_count = fields.len(), "built signed request");

    Ok(Request {
        operation: operation.to_string(),
        fields,
    })
}

fn request_id(now: &chrono::DateTime<Utc>) -> String {
    let suffix: u32 = rand::rng().random_range(0..100_000);
    format!("{}{}", now.format("%Y%m%d%H%M%S"), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockSigner;

    fn credentials() -> Credentials {
        Credentials::new("AGR1", "sdk", "1.0")
    }

    #[test]
    fn test_base_fields_present() {
        let request = build_request(
            "is-available",
            ParameterSet::new(),
            &credentials(),
            &MockSigner::default(),
            &Schema::builtin(),
        )
        .unwrap();

        let fields = request.fields();
        assert_eq!(request.operation(), "is-available");
        assert_eq!(fields.get(constants::OPERATION), Some("is-available"));
        assert_eq!(fields.get(constants::MERCHANT_AGREEMENT_CODE), Some("AGR1"));
        assert_eq!(fields.get(constants::SOFTWARE), Some("sdk"));
        assert_eq!(fields.get(constants::SOFTWARE_VERSION), Some("1.0"));
        assert_eq!(fields.get(constants::INTERFACE_VERSION), Some("5"));
        assert!(fields.contains(constants::REQUEST_ID));
        assert!(fields.contains(constants::REQUEST_TIMESTAMP));
    }

    #[test]
    fn test_request_id_shape() {
        let request = build_request(
            "is-available",
            ParameterSet::new(),
            &credentials(),
            &MockSigner::default(),
            &Schema::empty(),
        )
        .unwrap();

        let id = request.fields().get(constants::REQUEST_ID).unwrap();
        // 14-digit timestamp plus a random numeric suffix.
        assert!(id.len() >= 15 && id.len() <= 19);
        assert!(id.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_signatures_cover_sorted_fields() {
        let signer = MockSigner::default();
        let request = build_request(
            "is-available",
            ParameterSet::new(),
            &credentials(),
            &signer,
            &Schema::empty(),
        )
        .unwrap();

        let mut unsigned = request.fields().clone();
        unsigned.remove(constants::SIGNATURE_ONE);
        unsigned.remove(constants::SIGNATURE_TWO);
        let plaintext = unsigned.plaintext();

        assert_eq!(
            request.fields().get(constants::SIGNATURE_ONE),
            Some(signer.expected(SignatureAlgorithm::Sha1, plaintext.as_bytes()).as_str())
        );
        assert_eq!(
            request.fields().get(constants::SIGNATURE_TWO),
            Some(signer.expected(SignatureAlgorithm::Sha512, plaintext.as_bytes()).as_str())
        );
    }

    #[test]
    fn test_caller_params_override_base_fields() {
        let params = ParameterSet::from([(constants::INTERFACE_VERSION, "4")]);
        let request = build_request(
            "is-available",
            params,
            &credentials(),
            &MockSigner::default(),
            &Schema::empty(),
        )
        .unwrap();
        assert_eq!(request.fields().get(constants::INTERFACE_VERSION), Some("4"));
    }

    #[test]
    fn test_missing_required_field_fails_before_signing() {
        let err = build_request(
            "cancel-payment",
            ParameterSet::new(),
            &credentials(),
            &MockSigner::default(),
            &Schema::builtin(),
        )
        .unwrap_err();
        assert!(matches!(err, VerifoneError::MissingRequiredField(_)));
    }

    #[test]
    fn test_interface_version_override() {
        let credentials = Credentials::new("AGR1", "sdk", "1.0").with_interface_version("6");
        let request = build_request(
            "is-available",
            ParameterSet::new(),
            &credentials,
            &MockSigner::default(),
            &Schema::empty(),
        )
        .unwrap();
        assert_eq!(request.fields().get(constants::INTERFACE_VERSION), Some("6"));
    }
}
