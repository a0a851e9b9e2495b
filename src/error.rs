//! use certfactory::error::CertFactoryError;

use thiserror::Error;

/// Represents errors that can occur in the certfactory library.
///
/// This enum provides detailed error messages for various failure scenarios.
#[derive(Debug, Error, Clone)]
pub enum CertFactoryError {
    /// An unsupported algorithm, curve, or key size was requested.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error decoding a PKCS#8 key or a DER-encoded certificate.
    #[error("Failed to decode data: {0}")]
    Decode(String),

    /// Error during data encoding.
    #[error("Failed to encode data: {0}")]
    Encode(String),

    /// Error during key generation.
    #[error("Key generation error: {0}")]
    KeyGeneration(String),

    /// Error while signing the certificate structure.
    #[error("Signing error: {0}")]
    Signing(String),
}

impl From<der::Error> for CertFactoryError {
    fn from(err: der::Error) -> Self {
        CertFactoryError::Decode(err.to_string())
    }
}

impl From<pkcs8::Error> for CertFactoryError {
    fn from(err: pkcs8::Error) -> Self {
        CertFactoryError::Decode(err.to_string())
    }
}
