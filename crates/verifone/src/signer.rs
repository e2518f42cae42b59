//! Request signing and response signature verification.
//!
//! The provider authenticates both directions with RSA PKCS#1 v1.5
//! signatures over the canonical plaintext (see
//! [`ParameterSet::plaintext`](crate::ParameterSet::plaintext)): the
//! merchant signs requests with its private key, and responses are checked
//! against the provider's public key. Each message carries two signatures,
//! one SHA-1 (legacy interface requirement) and one SHA-512.
//!
//! The scheme is behind the [`Signer`] trait so tests and alternative
//! providers can substitute their own implementation.

use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::signature::{SignatureEncoding, Signer as _, Verifier as _};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha1::Sha1;
use sha2::Sha512;

use crate::error::VerifoneError;

/// Digest used under the RSA PKCS#1 v1.5 signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// Goes into `s-t-256-256_signature-one`.
    Sha1,
    /// Goes into `s-t-256-256_signature-two`.
    Sha512,
}

/// Signing capability injected into request building and response
/// verification.
///
/// `sign` produces the wire form of a signature (upper-case hex);
/// `verify` checks a counterparty signature in the same form.
pub trait Signer: Send + Sync {
    fn sign(
        &self,
        algorithm: SignatureAlgorithm,
        plaintext: &[u8],
    ) -> Result<String, VerifoneError>;

    fn verify(&self, algorithm: SignatureAlgorithm, plaintext: &[u8], signature_hex: &str) -> bool;
}

/// RSA PKCS#1 v1.5 [`Signer`] holding the merchant private key and the
/// provider public key.
#[derive(Debug)]
pub struct RsaSigner {
    sign_sha1: SigningKey<Sha1>,
    sign_sha512: SigningKey<Sha512>,
    verify_sha1: VerifyingKey<Sha1>,
    verify_sha512: VerifyingKey<Sha512>,
}

impl RsaSigner {
    /// Build a signer from already-parsed RSA keys.
    pub fn new(private_key: RsaPrivateKey, provider_public_key: RsaPublicKey) -> Self {
        Self {
            sign_sha1: SigningKey::new(private_key.clone()),
            sign_sha512: SigningKey::new(private_key),
            verify_sha1: VerifyingKey::new(provider_public_key.clone()),
            verify_sha512: VerifyingKey::new(provider_public_key),
        }
    }

    /// Build a signer from PEM-encoded key material.
    ///
    /// Both PKCS#8 (`BEGIN PRIVATE KEY` / `BEGIN PUBLIC KEY`) and PKCS#1
    /// (`BEGIN RSA PRIVATE KEY` / `BEGIN RSA PUBLIC KEY`) encodings are
    /// accepted, matching the formats merchants receive from the provider.
    pub fn from_pem(private_key_pem: &str, provider_public_key_pem: &str) -> Result<Self, VerifoneError> {
        let private_key = RsaPrivateKey::from_pkcs8_pem(private_key_pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(private_key_pem))
            .map_err(|e| VerifoneError::Config(format!("invalid RSA private key: {e}")))?;

        let provider_public_key = RsaPublicKey::from_public_key_pem(provider_public_key_pem)
            .or_else(|_| RsaPublicKey::from_pkcs1_pem(provider_public_key_pem))
            .map_err(|e| VerifoneError::Config(format!("invalid provider public key: {e}")))?;

        Ok(Self::new(private_key, provider_public_key))
    }
}

impl Signer for RsaSigner {
    fn sign(
        &self,
        algorithm: SignatureAlgorithm,
        plaintext: &[u8],
    ) -> Result<String, VerifoneError> {
        let signature = match algorithm {
            SignatureAlgorithm::Sha1 => self.sign_sha1.sign(plaintext).to_vec(),
            SignatureAlgorithm::Sha512 => self.sign_sha512.sign(plaintext).to_vec(),
        };
        Ok(hex::encode_upper(&signature))
    }

    fn verify(&self, algorithm: SignatureAlgorithm, plaintext: &[u8], signature_hex: &str) -> bool {
        let Ok(bytes) = hex::decode(signature_hex) else {
            return false;
        };
        let Ok(signature) = Signature::try_from(bytes.as_slice()) else {
            return false;
        };
        match algorithm {
            SignatureAlgorithm::Sha1 => self.verify_sha1.verify(plaintext, &signature).is_ok(),
            SignatureAlgorithm::Sha512 => self.verify_sha512.verify(plaintext, &signature).is_ok(),
        }
    }
}

mod hex {
    pub fn encode_upper(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().fold(String::new(), |mut s, b| {
            use std::fmt::Write;
            let _ = write!(s, "{b:02X}");
            s
        })
    }

    pub fn decode(s: &str) -> Result<Vec<u8>, ()> {
        if s.len() % 2 != 0 || !s.is_ascii() {
            return Err(());
        }
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).map_err(|_| ()))
            .collect()
    }
}
