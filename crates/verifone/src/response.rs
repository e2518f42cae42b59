//! Decoding and verification of provider replies.

use crate::constants;
use crate::error::VerifoneError;
use crate::params::ParameterSet;
use crate::signer::{SignatureAlgorithm, Signer};

/// A decoded provider reply.
///
/// Business outcomes — declined payments, unknown transactions, the
/// availability level — arrive as ordinary fields and are never turned
/// into errors here; callers inspect them through the accessors or
/// [`Response::fields`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    fields: ParameterSet,
}

impl Response {
    /// Decode a raw reply body (`key=value` pairs joined with `&`, values
    /// form-urlencoded).
    ///
    /// Unknown field codes are retained under their original string key, so
    /// protocol additions on the provider side pass through untouched.
    pub fn parse(raw: &str) -> Result<Self, VerifoneError> {
        if raw.is_empty() {
            return Err(VerifoneError::MalformedResponse(
                "empty response body".to_string(),
            ));
        }

        let mut fields = ParameterSet::new();
        for pair in raw.split('&') {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                VerifoneError::MalformedResponse(format!("not a key=value pair: {pair:?}"))
            })?;
            fields.insert(key, decode_value(value)?);
        }

        tracing::debug!(field_count = fields.len(), "parsed provider response");
        Ok(Self { fields })
    }

    pub fn get(&self, code: &str) -> Option<&str> {
        self.fields.get(code)
    }

    /// Server interface availability, when the reply carries it.
    ///
    /// `"0"` means no access has been granted, `"1"` express level access,
    /// `"2"` advanced level access. Absence is not an error; most
    /// operations simply do not return the field.
    pub fn availability(&self) -> Option<&str> {
        self.fields.get(constants::AVAILABILITY)
    }

    /// Provider-reported business error, when present.
    pub fn error_message(&self) -> Option<&str> {
        self.fields.get(constants::ERROR_MESSAGE)
    }

    pub fn fields(&self) -> &ParameterSet {
        &self.fields
    }

    pub fn into_fields(self) -> ParameterSet {
        self.fields
    }

    /// Verify the provider's signatures over this response.
    ///
    /// Both signature fields are removed from the field set, along with the
    /// `s-t-1-40_shop-order__phase` field the provider excludes from its
    /// own plaintext, and the remainder is checked against both digests.
    pub fn verify<S: Signer>(&self, signer: &S) -> Result<(), VerifoneError> {
        let mut fields = self.fields.clone();
        let signature_one = fields.remove(constants::SIGNATURE_ONE).ok_or_else(|| {
            VerifoneError::SignatureVerification("response missing signature-one".to_string())
        })?;
        let signature_two = fields.remove(constants::SIGNATURE_TWO).ok_or_else(|| {
            VerifoneError::SignatureVerification("response missing signature-two".to_string())
        })?;
        fields.remove(constants::SHOP_ORDER_PHASE);

        let plaintext = fields.plaintext();
        if !signer.verify(SignatureAlgorithm::Sha1, plaintext.as_bytes(), &signature_one) {
            tracing::warn!("SHA-1 response signature rejected");
            return Err(VerifoneError::SignatureVerification(
                "SHA-1 signature mismatch".to_string(),
            ));
        }
        if !signer.verify(SignatureAlgorithm::Sha512, plaintext.as_bytes(), &signature_two) {
            tracing::warn!("SHA-512 response signature rejected");
            return Err(VerifoneError::SignatureVerification(
                "SHA-512 signature mismatch".to_string(),
            ));
        }
        Ok(())
    }
}

/// Decode a form-urlencoded value: `+` is a space, `%XX` a percent escape.
/// Timestamps, for example, arrive as `2018-08-03+06%3A59%3A52`.
fn decode_value(value: &str) -> Result<String, VerifoneError> {
    let spaced = value.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => Ok(decoded.into_owned()),
        Err(e) => Err(VerifoneError::MalformedResponse(format!(
            "undecodable value {value:?}: {e}"
        ))),
    }
}
