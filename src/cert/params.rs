use bon::Builder;
use const_oid::ObjectIdentifier;
use time::Duration;
use time::OffsetDateTime;

use super::extensions::ToAndFromX509Extension;
pub use crate::cert::extensions::{ExtendedKeyUsagePurpose, FlagSet, KeyUsages};
use crate::error::CertFactoryError;

/// Parameters for building an X.509 certificate.
///
/// # Fields
/// * `serial_number` - The certificate serial number.
/// * `issuer_dn` - The issuer distinguished name as an RFC 4514 string,
///   e.g. "CN=dan test,C=US".
/// * `subject_dn` - The subject distinguished name in the same form.
/// * `lifetime_days` - Validity window length; not-before is the creation
///   instant, not-after is not-before plus this many days.
/// * `key_usages` - Key usage flags, combined by bitwise OR.
/// * `extended_key_usages` - Ordered list of extended key usage purposes.
#[derive(Clone, Debug, Builder)]
pub struct CertificateParams {
    pub serial_number: u64,
    pub issuer_dn: String,
    pub subject_dn: String,
    pub lifetime_days: i64,
    #[builder(default)]
    pub key_usages: FlagSet<KeyUsages>,
    #[builder(default)]
    pub extended_key_usages: Vec<ExtendedKeyUsagePurpose>,
}

/// Certificate validity period.
///
/// This struct represents the `notBefore` and `notAfter` fields in a certificate.
#[derive(Clone, Debug)]
pub struct Validity {
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

impl Validity {
    /// Creates a validity period starting now for the given number of days.
    ///
    /// DER time types carry whole seconds only, so the instant is truncated
    /// to second granularity.
    pub fn for_days(days: i64) -> Self {
        let now = OffsetDateTime::now_utc();
        let now = now - Duration::nanoseconds(i64::from(now.nanosecond()));
        Self {
            not_before: now,
            not_after: now + Duration::days(days),
        }
    }
}

/// Represents an X.509 extension.
///
/// This struct contains the OID, criticality, and value of an extension.
#[derive(Clone, Debug)]
pub struct ExtensionParam {
    pub oid: ObjectIdentifier,
    pub critical: bool,
    /// DER-encoded extension value
    pub value: Vec<u8>,
}

impl ExtensionParam {
    /// Creates an `ExtensionParam` from a specific extension.
    pub fn from_extension<E: ToAndFromX509Extension>(
        extension: E,
        critical: bool,
    ) -> Result<Self, CertFactoryError> {
        let value = extension.to_x509_extension_value()?;
        Ok(Self {
            oid: E::OID,
            critical,
            value,
        })
    }

    /// Decodes an `ExtensionParam` into a specific extension.
    pub fn to_extension<E: ToAndFromX509Extension>(&self) -> Result<E, CertFactoryError> {
        E::from_x509_extension_value(&self.value)
    }
}
