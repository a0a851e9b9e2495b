//! # certfactory - A Pure Rust Certificate Factory
//!
//! certfactory is a small certificate-factory helper built entirely with
//! rustcrypto libraries, with no dependencies on ring or openssl. It
//! generates RSA and ECDSA key pairs, exports/imports private keys in
//! PKCS#8 form, and builds and parses single X.509 certificates carrying a
//! serial number, distinguished names, a validity window, key usage, and
//! extended key usage.
//!
//! ## Supported Key Types
//!
//! - **RSA**: 2048, 3072, and 4096-bit keys, with PKCS#1 v1.5 or PSS
//!   signatures over SHA-256
//! - **ECDSA**: P-256, P-384, and P-521 curves
//!
//! ## Quick Start
//!
//! ### Generating a Key Pair and a Certificate
//!
//! ```rust,no_run
//! use certfactory::{
//!     cert::{Certificate, extensions::{ExtendedKeyUsagePurpose, KeyUsages}, params::CertificateParams},
//!     key::{KeyPair, NamedCurve},
//! };
//!
//! # fn main() -> Result<(), certfactory::error::CertFactoryError> {
//! let key_pair = KeyPair::generate_ecdsa(NamedCurve::P521);
//!
//! let params = CertificateParams::builder()
//!     .serial_number(3456)
//!     .issuer_dn("CN=dan test,C=US".to_string())
//!     .subject_dn("CN=dan test,C=US".to_string())
//!     .lifetime_days(100)
//!     .key_usages(KeyUsages::KeyCertSign | KeyUsages::DigitalSignature)
//!     .extended_key_usages(vec![ExtendedKeyUsagePurpose::ServerAuth])
//!     .build();
//!
//! let certificate = Certificate::create(&key_pair, &key_pair.public, &params)?;
//! let der = certificate.to_der()?;
//! let parsed = Certificate::from_der(&der)?;
//! assert_eq!(parsed.serial_number(), 3456);
//! # Ok(())
//! # }
//! ```
//!
//! ### Exporting and Importing a Private Key
//!
//! ```rust,no_run
//! use certfactory::key::{KeyPair, PrivateKey, RsaSignatureScheme};
//!
//! # fn main() -> Result<(), certfactory::error::CertFactoryError> {
//! let key_pair = KeyPair::generate_rsa(RsaSignatureScheme::Pss, 2048)?;
//! let pkcs8 = key_pair.private.to_pkcs8_der()?;
//! let imported = PrivateKey::import_rsa(&pkcs8, RsaSignatureScheme::Pss)?;
//! assert_eq!(imported.algorithm, key_pair.private.algorithm);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Failures surface synchronously through
//! [`error::CertFactoryError`]: `InvalidParameter` for unsupported
//! algorithm, curve, or key size combinations (and for exporting a
//! non-extractable key), `Decode` for malformed PKCS#8 or certificate
//! bytes. No partial results are ever returned.
//!
//! ## Module Organization
//!
//! - [`key`]: Key pair generation, PKCS#8 import/export, and signing
//! - [`cert`]: Certificate creation, encoding/decoding, and field access
//! - [`error`]: Error types
//! - [`tbs_certificate`]: Low-level certificate structure manipulation

pub mod cert;
pub mod error;
pub mod key;
pub mod tbs_certificate;
