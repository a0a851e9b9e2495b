use const_oid::AssociatedOid;
use der::{Decode, Encode, oid::ObjectIdentifier};

pub use der::flagset::FlagSet;
use x509_cert::ext::pkix::KeyUsage as X509KeyUsage;
pub use x509_cert::ext::pkix::KeyUsages;

use crate::error::CertFactoryError;

/// Trait for converting to and from X.509 extensions.
///
/// This trait provides methods to encode and decode X.509 extension values.
pub trait ToAndFromX509Extension {
    /// The Object Identifier (OID) for the extension.
    const OID: ObjectIdentifier;

    /// Encodes the extension into a DER-encoded byte vector.
    fn to_x509_extension_value(&self) -> Result<Vec<u8>, CertFactoryError>;

    /// Decodes the extension from a DER-encoded byte slice.
    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, CertFactoryError>
    where
        Self: Sized;
}

/// Represents the Key Usage extension.
///
/// This extension defines the purpose of the key contained in the certificate.
/// The flags combine by bitwise OR through the [`FlagSet`] type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyUsage(pub FlagSet<KeyUsages>);

impl ToAndFromX509Extension for KeyUsage {
    const OID: ObjectIdentifier = <X509KeyUsage as AssociatedOid>::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, CertFactoryError> {
        let ku = X509KeyUsage::from(self.0);
        ku.to_der()
            .map_err(|e| CertFactoryError::Encode(e.to_string()))
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, CertFactoryError> {
        let ku = X509KeyUsage::from_der(extension)?;
        Ok(Self(ku.0))
    }
}

/// Microsoft certificate-trust-list signing (szOID_KP_CTL_USAGE_SIGNING).
/// Not part of the RFC 5912 OID database.
pub const ID_MS_CERTIFICATE_TRUST_LIST_SIGNING: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.3.6.1.4.1.311.10.3.1");

/// Represents a purpose carried in the Extended Key Usage extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendedKeyUsagePurpose {
    ServerAuth,
    ClientAuth,
    CodeSigning,
    EmailProtection,
    TimeStamping,
    OcspSigning,
    MsCertificateTrustListSigning,
}

impl ExtendedKeyUsagePurpose {
    /// The purpose's object identifier in dotted-decimal string form.
    pub fn oid_string(&self) -> String {
        ObjectIdentifier::from(*self).to_string()
    }
}

impl From<ExtendedKeyUsagePurpose> for ObjectIdentifier {
    fn from(value: ExtendedKeyUsagePurpose) -> Self {
        match value {
            ExtendedKeyUsagePurpose::ServerAuth => const_oid::db::rfc5912::ID_KP_SERVER_AUTH,
            ExtendedKeyUsagePurpose::ClientAuth => const_oid::db::rfc5912::ID_KP_CLIENT_AUTH,
            ExtendedKeyUsagePurpose::CodeSigning => const_oid::db::rfc5912::ID_KP_CODE_SIGNING,
            ExtendedKeyUsagePurpose::EmailProtection => {
                const_oid::db::rfc5912::ID_KP_EMAIL_PROTECTION
            }
            ExtendedKeyUsagePurpose::TimeStamping => const_oid::db::rfc5912::ID_KP_TIME_STAMPING,
            ExtendedKeyUsagePurpose::OcspSigning => const_oid::db::rfc5912::ID_KP_OCSP_SIGNING,
            ExtendedKeyUsagePurpose::MsCertificateTrustListSigning => {
                ID_MS_CERTIFICATE_TRUST_LIST_SIGNING
            }
        }
    }
}

impl TryFrom<ObjectIdentifier> for ExtendedKeyUsagePurpose {
    type Error = CertFactoryError;

    fn try_from(oid: ObjectIdentifier) -> Result<Self, Self::Error> {
        match oid {
            const_oid::db::rfc5912::ID_KP_SERVER_AUTH => Ok(ExtendedKeyUsagePurpose::ServerAuth),
            const_oid::db::rfc5912::ID_KP_CLIENT_AUTH => Ok(ExtendedKeyUsagePurpose::ClientAuth),
            const_oid::db::rfc5912::ID_KP_CODE_SIGNING => Ok(ExtendedKeyUsagePurpose::CodeSigning),
            const_oid::db::rfc5912::ID_KP_EMAIL_PROTECTION => {
                Ok(ExtendedKeyUsagePurpose::EmailProtection)
            }
            const_oid::db::rfc5912::ID_KP_TIME_STAMPING => {
                Ok(ExtendedKeyUsagePurpose::TimeStamping)
            }
            const_oid::db::rfc5912::ID_KP_OCSP_SIGNING => Ok(ExtendedKeyUsagePurpose::OcspSigning),
            ID_MS_CERTIFICATE_TRUST_LIST_SIGNING => {
                Ok(ExtendedKeyUsagePurpose::MsCertificateTrustListSigning)
            }
            other => Err(CertFactoryError::Decode(format!(
                "unsupported extended key usage: {other}"
            ))),
        }
    }
}

/// Represents the Extended Key Usage extension.
///
/// The purposes keep the order in which they were supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtendedKeyUsage {
    pub purposes: Vec<ExtendedKeyUsagePurpose>,
}

impl ToAndFromX509Extension for ExtendedKeyUsage {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::ExtendedKeyUsage::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, CertFactoryError> {
        let oids: Vec<ObjectIdentifier> = self.purposes.iter().map(|p| (*p).into()).collect();
        let eku = x509_cert::ext::pkix::ExtendedKeyUsage(oids);
        eku.to_der()
            .map_err(|e| CertFactoryError::Encode(e.to_string()))
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, CertFactoryError> {
        let eku = x509_cert::ext::pkix::ExtendedKeyUsage::from_der(extension)?;
        let purposes = eku
            .0
            .into_iter()
            .map(ExtendedKeyUsagePurpose::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { purposes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_usage_encoding_decoding() {
        let original = KeyUsage(
            KeyUsages::KeyCertSign | KeyUsages::KeyAgreement | KeyUsages::DigitalSignature,
        );
        let encoded = original.to_x509_extension_value().unwrap();
        let decoded = KeyUsage::from_x509_extension_value(&encoded).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn test_extended_key_usage_encoding_decoding() {
        let original = ExtendedKeyUsage {
            purposes: vec![
                ExtendedKeyUsagePurpose::MsCertificateTrustListSigning,
                ExtendedKeyUsagePurpose::ServerAuth,
                ExtendedKeyUsagePurpose::ClientAuth,
            ],
        };
        let encoded = original.to_x509_extension_value().unwrap();
        let decoded = ExtendedKeyUsage::from_x509_extension_value(&encoded).unwrap();
        assert_eq!(original.purposes, decoded.purposes);
    }

    #[test]
    fn test_ms_trust_list_signing_oid_string() {
        assert_eq!(
            ExtendedKeyUsagePurpose::MsCertificateTrustListSigning.oid_string(),
            "1.3.6.1.4.1.311.10.3.1"
        );
    }

    #[test]
    fn test_unknown_extended_key_usage_is_rejected() {
        let eku = x509_cert::ext::pkix::ExtendedKeyUsage(vec![ObjectIdentifier::new_unwrap(
            "1.2.3.4.5.6",
        )]);
        let encoded = eku.to_der().unwrap();
        assert!(ExtendedKeyUsage::from_x509_extension_value(&encoded).is_err());
    }
}
