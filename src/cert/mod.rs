pub mod extensions;
pub mod params;

use core::str::FromStr;

use der::{Any, Decode, DecodePem, Encode, EncodePem};
use time::OffsetDateTime;
use x509_cert::certificate::CertificateInner;
use x509_cert::name::RdnSequence;
use x509_cert::spki::AlgorithmIdentifierOwned;

use crate::error::CertFactoryError;
pub type Result<T> = std::result::Result<T, CertFactoryError>;

use extensions::{
    ExtendedKeyUsage, ExtendedKeyUsagePurpose, FlagSet, KeyUsage, KeyUsages,
    ToAndFromX509Extension,
};
use params::{CertificateParams, ExtensionParam, Validity};

use crate::key::{KeyAlgorithm, KeyPair, NamedCurve, PrivateKey, PublicKey, RsaSignatureScheme};
use crate::tbs_certificate::TbsCertificate;

/// Represents the supported signature algorithms for certificates.
///
/// This enum provides a mapping to the corresponding OIDs for each algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// SHA-256 with RSA encryption (PKCS#1 v1.5).
    Sha256WithRsa,
    /// RSASSA-PSS with SHA-256 and MGF1/SHA-256.
    RsaSsaPss,
    /// SHA-256 with ECDSA.
    EcdsaWithSha256,
    /// SHA-384 with ECDSA.
    EcdsaWithSha384,
    /// SHA-512 with ECDSA.
    EcdsaWithSha512,
}

impl SignatureAlgorithm {
    /// Picks the signature algorithm implied by the signing key's metadata.
    pub fn for_signing_key(key: &PrivateKey) -> Self {
        match &key.algorithm {
            KeyAlgorithm::Rsa {
                scheme: RsaSignatureScheme::Pkcs1V15,
                ..
            } => SignatureAlgorithm::Sha256WithRsa,
            KeyAlgorithm::Rsa {
                scheme: RsaSignatureScheme::Pss,
                ..
            } => SignatureAlgorithm::RsaSsaPss,
            KeyAlgorithm::Ecdsa {
                named_curve: NamedCurve::P256,
            } => SignatureAlgorithm::EcdsaWithSha256,
            KeyAlgorithm::Ecdsa {
                named_curve: NamedCurve::P384,
            } => SignatureAlgorithm::EcdsaWithSha384,
            KeyAlgorithm::Ecdsa {
                named_curve: NamedCurve::P521,
            } => SignatureAlgorithm::EcdsaWithSha512,
        }
    }

    /// Converts the algorithm into an X.509 `AlgorithmIdentifier`.
    ///
    /// RSASSA-PSS carries its RSASSA-PSS-params (SHA-256, MGF1 with SHA-256,
    /// 32-byte salt) in the parameters field; the other algorithms have none.
    pub fn to_algorithm_identifier(&self) -> Result<AlgorithmIdentifierOwned> {
        Ok(match self {
            SignatureAlgorithm::Sha256WithRsa => AlgorithmIdentifierOwned {
                oid: const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION,
                parameters: None,
            },
            SignatureAlgorithm::RsaSsaPss => {
                let pss_params = rsa::pkcs1::RsaPssParams::new::<sha2::Sha256>(32);
                AlgorithmIdentifierOwned {
                    oid: const_oid::db::rfc5912::ID_RSASSA_PSS,
                    parameters: Some(
                        Any::encode_from(&pss_params)
                            .map_err(|e| CertFactoryError::Encode(e.to_string()))?,
                    ),
                }
            }
            SignatureAlgorithm::EcdsaWithSha256 => AlgorithmIdentifierOwned {
                oid: const_oid::db::rfc5912::ECDSA_WITH_SHA_256,
                parameters: None,
            },
            SignatureAlgorithm::EcdsaWithSha384 => AlgorithmIdentifierOwned {
                oid: const_oid::db::rfc5912::ECDSA_WITH_SHA_384,
                parameters: None,
            },
            SignatureAlgorithm::EcdsaWithSha512 => AlgorithmIdentifierOwned {
                oid: const_oid::db::rfc5912::ECDSA_WITH_SHA_512,
                parameters: None,
            },
        })
    }
}

/// Represents an X.509 certificate.
///
/// Immutable once created; all accessors read from the DER-backed inner
/// structure, so a certificate and its parsed round-trip report identical
/// fields.
#[derive(Debug, Clone)]
pub struct Certificate {
    /// The inner representation of the certificate.
    pub inner: CertificateInner,
}

impl Certificate {
    /// Builds a certificate from `params`, carrying `subject_public_key` and
    /// signed with the issuer key pair's private key.
    ///
    /// Not-before is the creation instant (at DER second granularity);
    /// not-after is not-before plus `params.lifetime_days`. Key usage and
    /// extended key usage are encoded as standard extensions and omitted
    /// when empty.
    pub fn create(
        issuer_key_pair: &KeyPair,
        subject_public_key: &PublicKey,
        params: &CertificateParams,
    ) -> Result<Self> {
        let issuer = parse_dn(&params.issuer_dn)?;
        let subject = parse_dn(&params.subject_dn)?;
        let validity = Validity::for_days(params.lifetime_days);

        let mut cert_extensions: Vec<ExtensionParam> = Vec::new();
        if !params.key_usages.is_empty() {
            cert_extensions.push(ExtensionParam::from_extension(
                KeyUsage(params.key_usages),
                true,
            )?);
        }
        if !params.extended_key_usages.is_empty() {
            cert_extensions.push(ExtensionParam::from_extension(
                ExtendedKeyUsage {
                    purposes: params.extended_key_usages.clone(),
                },
                true,
            )?);
        }

        let signature_algorithm = SignatureAlgorithm::for_signing_key(&issuer_key_pair.private);
        let tbs_cert = TbsCertificate {
            serial_number: serial_to_bytes(params.serial_number),
            signature_algorithm: signature_algorithm.clone(),
            issuer,
            not_before: validity.not_before,
            not_after: validity.not_after,
            subject,
            subject_public_key_info: subject_public_key.as_spki()?,
            extensions: cert_extensions,
        };

        let tbs_inner = tbs_cert.to_tbs_certificate_inner()?;
        let tbs_der = tbs_inner
            .to_der()
            .map_err(|e| CertFactoryError::Encode(e.to_string()))?;
        let signature = issuer_key_pair.private.sign(&tbs_der)?;

        Ok(Certificate {
            inner: CertificateInner {
                tbs_certificate: tbs_inner,
                signature_algorithm: signature_algorithm.to_algorithm_identifier()?,
                signature: der::asn1::BitString::from_bytes(&signature)
                    .map_err(|e| CertFactoryError::Encode(e.to_string()))?,
            },
        })
    }

    /// Parses a certificate from its canonical DER encoding.
    ///
    /// Fails with a decode error on malformed or truncated input; no partial
    /// result is returned.
    pub fn from_der(bytes: &[u8]) -> Result<Self> {
        Ok(Certificate {
            inner: CertificateInner::from_der(bytes)?,
        })
    }

    /// Encodes the certificate into DER format.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        self.inner
            .to_der()
            .map_err(|e| CertFactoryError::Encode(e.to_string()))
    }

    /// Parses a certificate from PEM format.
    pub fn from_pem(pem: &str) -> Result<Self> {
        let inner = CertificateInner::from_pem(pem.as_bytes())?;
        Ok(Certificate { inner })
    }

    /// Encodes the certificate into PEM format.
    pub fn to_pem(&self) -> Result<String> {
        self.inner
            .to_pem(pkcs8::LineEnding::LF)
            .map_err(|e| CertFactoryError::Encode(e.to_string()))
    }

    /// The serial number, interpreted as a big-endian unsigned integer.
    ///
    /// Serial numbers built by [`Certificate::create`] always fit; for
    /// foreign certificates with longer serials this returns the low 64 bits.
    pub fn serial_number(&self) -> u64 {
        serial_from_bytes(self.inner.tbs_certificate.serial_number.as_bytes())
    }

    /// The issuer distinguished name as an RFC 4514 string.
    pub fn issuer(&self) -> String {
        self.inner.tbs_certificate.issuer.to_string()
    }

    /// The subject distinguished name as an RFC 4514 string.
    pub fn subject(&self) -> String {
        self.inner.tbs_certificate.subject.to_string()
    }

    pub fn not_before(&self) -> OffsetDateTime {
        to_offset_date_time(&self.inner.tbs_certificate.validity.not_before)
    }

    pub fn not_after(&self) -> OffsetDateTime {
        to_offset_date_time(&self.inner.tbs_certificate.validity.not_after)
    }

    /// The subject's public key with reconstructed algorithm metadata.
    pub fn subject_public_key(&self) -> Result<PublicKey> {
        PublicKey::from_x509spki(&self.inner.tbs_certificate.subject_public_key_info)
    }

    /// The key usage flags, or `None` if the extension is absent.
    pub fn key_usages(&self) -> Result<Option<FlagSet<KeyUsages>>> {
        match self.extension(KeyUsage::OID) {
            Some(ext) => Ok(Some(ext.to_extension::<KeyUsage>()?.0)),
            None => Ok(None),
        }
    }

    /// The extended key usage purposes in certificate order, empty if the
    /// extension is absent.
    pub fn extended_key_usages(&self) -> Result<Vec<ExtendedKeyUsagePurpose>> {
        match self.extension(ExtendedKeyUsage::OID) {
            Some(ext) => Ok(ext.to_extension::<ExtendedKeyUsage>()?.purposes),
            None => Ok(Vec::new()),
        }
    }

    /// All extensions carried by the certificate.
    pub fn extensions(&self) -> Vec<ExtensionParam> {
        self.inner
            .tbs_certificate
            .extensions
            .iter()
            .flatten()
            .map(|ext| ExtensionParam {
                oid: ext.extn_id,
                critical: ext.critical,
                value: ext.extn_value.as_bytes().to_vec(),
            })
            .collect()
    }

    fn extension(&self, oid: der::oid::ObjectIdentifier) -> Option<ExtensionParam> {
        self.extensions().into_iter().find(|ext| ext.oid == oid)
    }
}

fn parse_dn(dn: &str) -> Result<RdnSequence> {
    RdnSequence::from_str(dn)
        .map_err(|e| CertFactoryError::InvalidParameter(format!("invalid DN {dn:?}: {e}")))
}

fn to_offset_date_time(time: &x509_cert::time::Time) -> OffsetDateTime {
    match time {
        x509_cert::time::Time::UtcTime(ut) => OffsetDateTime::from(ut.to_system_time()),
        x509_cert::time::Time::GeneralTime(gt) => OffsetDateTime::from(gt.to_system_time()),
    }
}

// DER INTEGERs are signed, so a serial with the top bit set needs a leading
// zero octet to stay positive.
fn serial_to_bytes(serial: u64) -> Vec<u8> {
    let be = serial.to_be_bytes();
    let start = be.iter().position(|b| *b != 0).unwrap_or(be.len() - 1);
    let mut bytes = be[start..].to_vec();
    if bytes[0] & 0x80 != 0 {
        bytes.insert(0, 0);
    }
    bytes
}

fn serial_from_bytes(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_bytes_round_trip() {
        for serial in [0u64, 1, 127, 128, 3456, 65535, u64::from(u32::MAX) + 17] {
            let bytes = serial_to_bytes(serial);
            assert!(bytes[0] & 0x80 == 0 || bytes.len() > 1);
            assert_eq!(serial_from_bytes(&bytes), serial);
        }
    }

    #[test]
    fn test_serial_high_bit_gets_leading_zero() {
        assert_eq!(serial_to_bytes(0x80), vec![0x00, 0x80]);
        assert_eq!(serial_to_bytes(0x7f), vec![0x7f]);
    }

    #[test]
    fn test_dn_string_round_trip() {
        let dn = parse_dn("CN=dan test,C=US").unwrap();
        assert_eq!(dn.to_string(), "CN=dan test,C=US");
    }

    #[test]
    fn test_invalid_dn_is_rejected() {
        assert!(matches!(
            parse_dn("not a dn"),
            Err(CertFactoryError::InvalidParameter(_))
        ));
    }
}
