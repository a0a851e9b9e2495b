use der::Encode;
use der::asn1::{GeneralizedTime, OctetString, UtcTime};
use time::OffsetDateTime;
use x509_cert::Version;
use x509_cert::certificate::TbsCertificateInner;
use x509_cert::name::RdnSequence;
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::cert::SignatureAlgorithm;
use crate::cert::params::ExtensionParam;
use crate::error::CertFactoryError;

/// Represents the "To Be Signed" (TBS) portion of an X.509 certificate.
///
/// # Fields
/// * `serial_number` - Big-endian serial number bytes.
/// * `signature_algorithm` - The algorithm the issuer will sign with.
/// * `issuer` - The distinguished name of the certificate issuer.
/// * `not_before` - The start of the certificate's validity period.
/// * `not_after` - The end of the certificate's validity period.
/// * `subject` - The distinguished name of the certificate subject.
/// * `subject_public_key_info` - The subject's public key in SPKI form.
/// * `extensions` - X.509 extensions for the certificate.
pub struct TbsCertificate {
    pub serial_number: Vec<u8>,
    pub signature_algorithm: SignatureAlgorithm,
    pub issuer: RdnSequence,
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
    pub subject: RdnSequence,
    pub subject_public_key_info: SubjectPublicKeyInfoOwned,
    pub extensions: Vec<ExtensionParam>,
}

impl TbsCertificate {
    /// Converts the `TbsCertificate` into a `TbsCertificateInner` for DER encoding.
    pub fn to_tbs_certificate_inner(&self) -> Result<TbsCertificateInner, CertFactoryError> {
        let algorithm_id = self.signature_algorithm.to_algorithm_identifier()?;

        let extensions = self
            .extensions
            .iter()
            .map(|ext| {
                Ok(x509_cert::ext::Extension {
                    extn_id: ext.oid,
                    critical: ext.critical,
                    extn_value: OctetString::new(ext.value.clone())
                        .map_err(|e| CertFactoryError::Encode(e.to_string()))?,
                })
            })
            .collect::<Result<Vec<_>, CertFactoryError>>()?;

        let validity = x509_cert::time::Validity {
            not_before: to_x509_time(self.not_before)?,
            not_after: to_x509_time(self.not_after)?,
        };

        let serial_number = SerialNumber::new(self.serial_number.as_slice())
            .map_err(|e| CertFactoryError::Encode(e.to_string()))?;

        Ok(TbsCertificateInner {
            version: Version::V3,
            serial_number,
            signature: algorithm_id,
            issuer: self.issuer.clone(),
            validity,
            subject: self.subject.clone(),
            subject_public_key_info: self.subject_public_key_info.clone(),
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: Some(extensions),
        })
    }

    /// Encodes the TBS portion into DER, the byte sequence the issuer signs.
    pub fn to_der(&self) -> Result<Vec<u8>, CertFactoryError> {
        self.to_tbs_certificate_inner()?
            .to_der()
            .map_err(|e| CertFactoryError::Encode(e.to_string()))
    }
}

// RFC 5280 4.1.2.5: dates through 2049 are encoded as UTCTime, later ones
// as GeneralizedTime. Both have second granularity, so subseconds are
// dropped at this boundary.
fn to_x509_time(timestamp: OffsetDateTime) -> Result<x509_cert::time::Time, CertFactoryError> {
    let system_time: std::time::SystemTime = timestamp.into();
    if timestamp.year() < 2050 {
        let utc = UtcTime::from_system_time(system_time)
            .map_err(|e| CertFactoryError::Encode(e.to_string()))?;
        Ok(x509_cert::time::Time::UtcTime(utc))
    } else {
        let date_time = der::DateTime::from_system_time(system_time)
            .map_err(|e| CertFactoryError::Encode(e.to_string()))?;
        Ok(x509_cert::time::Time::GeneralTime(
            GeneralizedTime::from_date_time(date_time),
        ))
    }
}
