use certfactory::cert::extensions::{ExtendedKeyUsagePurpose, KeyUsages};
use certfactory::cert::params::CertificateParams;

pub const DAN_TEST_DN: &str = "CN=dan test,C=US";

/// The concrete scenario exercised against every signing algorithm: serial
/// 3456, issuer = subject, 100-day lifetime, a three-flag key usage mask and
/// a three-entry extended key usage list.
pub fn dan_test_params() -> CertificateParams {
    CertificateParams::builder()
        .serial_number(3456)
        .issuer_dn(DAN_TEST_DN.to_string())
        .subject_dn(DAN_TEST_DN.to_string())
        .lifetime_days(100)
        .key_usages(KeyUsages::KeyCertSign | KeyUsages::KeyAgreement | KeyUsages::DigitalSignature)
        .extended_key_usages(vec![
            ExtendedKeyUsagePurpose::MsCertificateTrustListSigning,
            ExtendedKeyUsagePurpose::ServerAuth,
            ExtendedKeyUsagePurpose::ClientAuth,
        ])
        .build()
}
