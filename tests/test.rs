mod util;

use certfactory::cert::Certificate;
use certfactory::cert::extensions::{ExtendedKeyUsagePurpose, KeyUsages};
use certfactory::error::CertFactoryError;
use certfactory::key::{HashAlgorithm, KeyPair, NamedCurve, PrivateKey, RsaSignatureScheme};

pub type Result<T> = std::result::Result<T, CertFactoryError>;

/// Both halves of a generated key pair report the requested algorithm
/// metadata and are extractable.
#[test]
fn generate_key_pair() -> Result<()> {
    let rsa_ssa_2048 = KeyPair::generate_rsa(RsaSignatureScheme::Pkcs1V15, 2048)?;
    for algorithm in [
        &rsa_ssa_2048.public.algorithm,
        &rsa_ssa_2048.private.algorithm,
    ] {
        assert_eq!(algorithm.name(), "RSASSA-PKCS1-v1_5");
        assert_eq!(algorithm.modulus_length(), Some(2048));
        assert_eq!(algorithm.hash().map(|h| h.name()), Some("SHA-256"));
    }
    assert!(rsa_ssa_2048.public.extractable);
    assert!(rsa_ssa_2048.private.extractable);

    let rsa_pss_4096 = KeyPair::generate_rsa(RsaSignatureScheme::Pss, 4096)?;
    for algorithm in [
        &rsa_pss_4096.public.algorithm,
        &rsa_pss_4096.private.algorithm,
    ] {
        assert_eq!(algorithm.name(), "RSA-PSS");
        assert_eq!(algorithm.modulus_length(), Some(4096));
        assert_eq!(algorithm.hash(), Some(HashAlgorithm::Sha256));
    }
    assert!(rsa_pss_4096.public.extractable);
    assert!(rsa_pss_4096.private.extractable);

    let ecdsa_p521 = KeyPair::generate_ecdsa(NamedCurve::P521);
    for algorithm in [&ecdsa_p521.public.algorithm, &ecdsa_p521.private.algorithm] {
        assert_eq!(algorithm.name(), "ECDSA");
        assert_eq!(algorithm.named_curve().map(|c| c.name()), Some("P-521"));
        assert_eq!(algorithm.modulus_length(), None);
    }
    assert!(ecdsa_p521.public.extractable);
    assert!(ecdsa_p521.private.extractable);

    Ok(())
}

#[test]
fn generate_rsa_rejects_unsupported_modulus_length() {
    for bits in [512, 1024, 2047, 8192] {
        let result = KeyPair::generate_rsa(RsaSignatureScheme::Pkcs1V15, bits);
        assert!(matches!(
            result,
            Err(CertFactoryError::InvalidParameter(_))
        ));
    }
}

/// PKCS#8 export followed by import reconstructs the algorithm metadata.
#[test]
fn export_import_private_key() -> Result<()> {
    let rsa_pss_2048 = KeyPair::generate_rsa(RsaSignatureScheme::Pss, 2048)?;
    let pkcs8 = rsa_pss_2048.private.to_pkcs8_der()?;
    let imported = PrivateKey::import_rsa(&pkcs8, RsaSignatureScheme::Pss)?;
    assert_eq!(imported.algorithm, rsa_pss_2048.private.algorithm);
    assert!(imported.extractable);

    let rsa_ssa_2048 = KeyPair::generate_rsa(RsaSignatureScheme::Pkcs1V15, 2048)?;
    let pkcs8 = rsa_ssa_2048.private.to_pkcs8_der()?;
    let imported = PrivateKey::import_rsa(&pkcs8, RsaSignatureScheme::Pkcs1V15)?;
    assert_eq!(imported.algorithm, rsa_ssa_2048.private.algorithm);
    assert!(imported.extractable);

    let ecdsa_p521 = KeyPair::generate_ecdsa(NamedCurve::P521);
    let pkcs8 = ecdsa_p521.private.to_pkcs8_der()?;
    let imported = PrivateKey::import_ecdsa(&pkcs8, NamedCurve::P521)?;
    assert_eq!(imported.algorithm, ecdsa_p521.private.algorithm);
    assert!(imported.extractable);

    Ok(())
}

#[test]
fn export_requires_extractable_key() {
    let mut key_pair = KeyPair::generate_ecdsa(NamedCurve::P256);
    key_pair.private.extractable = false;
    assert!(matches!(
        key_pair.private.to_pkcs8_der(),
        Err(CertFactoryError::InvalidParameter(_))
    ));
    assert!(matches!(
        key_pair.private.to_pkcs8_pem(),
        Err(CertFactoryError::InvalidParameter(_))
    ));
}

#[test]
fn import_rejects_malformed_or_mismatched_keys() {
    assert!(matches!(
        PrivateKey::import_rsa(b"not a key", RsaSignatureScheme::Pkcs1V15),
        Err(CertFactoryError::Decode(_))
    ));
    assert!(matches!(
        PrivateKey::import_ecdsa(b"not a key", NamedCurve::P256),
        Err(CertFactoryError::Decode(_))
    ));

    // A P-256 key declared as P-521 must not import.
    let p256 = KeyPair::generate_ecdsa(NamedCurve::P256);
    let pkcs8 = p256.private.to_pkcs8_der().unwrap();
    assert!(matches!(
        PrivateKey::import_ecdsa(&pkcs8, NamedCurve::P521),
        Err(CertFactoryError::Decode(_))
    ));
}

/// The concrete scenario: serial 3456, issuer = subject = "CN=dan test,C=US",
/// 100-day lifetime, KeyCertSign|KeyAgreement|DigitalSignature, and the
/// three-entry extended key usage list, signed with an RSA PKCS#1 v1.5 key.
#[test]
fn create_parse_raw_certificate() -> Result<()> {
    let rsa_ssa_4096 = KeyPair::generate_rsa(RsaSignatureScheme::Pkcs1V15, 4096)?;
    let params = util::dan_test_params();
    let certificate = Certificate::create(&rsa_ssa_4096, &rsa_ssa_4096.public, &params)?;

    let der = certificate.to_der()?;
    let parsed = Certificate::from_der(&der)?;

    assert_eq!(parsed.serial_number(), 3456);
    assert_eq!(certificate.serial_number(), parsed.serial_number());
    assert_eq!(parsed.issuer(), util::DAN_TEST_DN);
    assert_eq!(certificate.issuer(), parsed.issuer());
    assert_eq!(parsed.subject(), util::DAN_TEST_DN);
    assert_eq!(certificate.subject(), parsed.subject());

    assert_eq!(certificate.not_before(), parsed.not_before());
    assert_eq!(certificate.not_after(), parsed.not_after());
    assert_eq!(
        parsed.not_after() - parsed.not_before(),
        time::Duration::days(100)
    );

    assert_eq!(
        parsed.key_usages()?,
        Some(KeyUsages::KeyCertSign | KeyUsages::KeyAgreement | KeyUsages::DigitalSignature)
    );
    assert_eq!(
        parsed.extended_key_usages()?,
        vec![
            ExtendedKeyUsagePurpose::MsCertificateTrustListSigning,
            ExtendedKeyUsagePurpose::ServerAuth,
            ExtendedKeyUsagePurpose::ClientAuth,
        ]
    );
    assert_eq!(
        certificate.extended_key_usages()?,
        parsed.extended_key_usages()?
    );

    // Re-encoding the parsed certificate must reproduce the bytes exactly.
    assert_eq!(parsed.to_der()?, der);

    Ok(())
}

/// The same scenario signed with an ECDSA P-521 key over a P-256 subject key.
#[test]
fn create_parse_ecdsa_certificate() -> Result<()> {
    let issuer = KeyPair::generate_ecdsa(NamedCurve::P521);
    let subject = KeyPair::generate_ecdsa(NamedCurve::P256);
    let params = util::dan_test_params();
    let certificate = Certificate::create(&issuer, &subject.public, &params)?;

    let parsed = Certificate::from_der(&certificate.to_der()?)?;
    assert_eq!(parsed.serial_number(), 3456);
    assert_eq!(parsed.issuer(), parsed.subject());
    assert_eq!(
        certificate.extended_key_usages()?,
        parsed.extended_key_usages()?
    );

    let subject_key = parsed.subject_public_key()?;
    assert_eq!(subject_key.algorithm.name(), "ECDSA");
    assert_eq!(
        subject_key.algorithm.named_curve(),
        Some(NamedCurve::P256)
    );

    Ok(())
}

/// An RSA-PSS issuer key produces a certificate carrying the id-RSASSA-PSS
/// signature algorithm, and the result still round-trips.
#[test]
fn create_certificate_with_pss_issuer() -> Result<()> {
    let issuer = KeyPair::generate_rsa(RsaSignatureScheme::Pss, 2048)?;
    let params = util::dan_test_params();
    let certificate = Certificate::create(&issuer, &issuer.public, &params)?;

    assert_eq!(
        certificate.inner.signature_algorithm.oid,
        const_oid::db::rfc5912::ID_RSASSA_PSS
    );

    let parsed = Certificate::from_der(&certificate.to_der()?)?;
    assert_eq!(parsed.serial_number(), 3456);
    assert_eq!(
        parsed.inner.signature_algorithm,
        certificate.inner.signature_algorithm
    );

    Ok(())
}

#[test]
fn parse_rejects_malformed_certificate() -> Result<()> {
    assert!(matches!(
        Certificate::from_der(b"not a certificate"),
        Err(CertFactoryError::Decode(_))
    ));
    assert!(matches!(
        Certificate::from_der(&[]),
        Err(CertFactoryError::Decode(_))
    ));

    // A truncated but well-prefixed certificate must not parse either.
    let key_pair = KeyPair::generate_ecdsa(NamedCurve::P256);
    let certificate = Certificate::create(&key_pair, &key_pair.public, &util::dan_test_params())?;
    let der = certificate.to_der()?;
    assert!(matches!(
        Certificate::from_der(&der[..der.len() / 2]),
        Err(CertFactoryError::Decode(_))
    ));

    Ok(())
}

/// PEM encoding wraps the same DER, so a PEM round trip preserves the fields
/// too.
#[test]
fn pem_round_trip() -> Result<()> {
    let key_pair = KeyPair::generate_ecdsa(NamedCurve::P384);
    let certificate = Certificate::create(&key_pair, &key_pair.public, &util::dan_test_params())?;

    let pem = certificate.to_pem()?;
    assert!(pem.starts_with("-----BEGIN CERTIFICATE-----"));
    let parsed = Certificate::from_pem(&pem)?;
    assert_eq!(parsed.to_der()?, certificate.to_der()?);

    Ok(())
}

/// Cross-check the emitted DER against an independent parser.
#[test]
fn emitted_der_parses_with_x509_parser() -> Result<()> {
    use x509_parser::prelude::FromDer;

    let key_pair = KeyPair::generate_ecdsa(NamedCurve::P256);
    let certificate = Certificate::create(&key_pair, &key_pair.public, &util::dan_test_params())?;
    let der = certificate.to_der()?;

    let (rest, parsed) = x509_parser::certificate::X509Certificate::from_der(&der)
        .expect("independent parser rejected the certificate");
    assert!(rest.is_empty());
    assert_eq!(parsed.tbs_certificate.serial.to_bytes_be(), vec![0x0d, 0x80]);
    assert!(parsed.subject().to_string().contains("CN=dan test"));
    assert_eq!(
        parsed.validity().not_before.timestamp(),
        certificate.not_before().unix_timestamp()
    );
    assert_eq!(
        parsed.validity().not_after.timestamp(),
        certificate.not_after().unix_timestamp()
    );

    Ok(())
}
