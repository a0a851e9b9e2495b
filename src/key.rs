use pkcs8::{DecodePrivateKey, EncodePrivateKey, LineEnding};
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::signature::{RandomizedSigner, SignatureEncoding, Signer};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::error::CertFactoryError;

type Result<T> = std::result::Result<T, CertFactoryError>;

/// RSA modulus lengths accepted by [`KeyPair::generate_rsa`].
pub const SUPPORTED_RSA_MODULUS_LENGTHS: [u32; 3] = [2048, 3072, 4096];

/// RSA signature scheme associated with a generated or imported key.
///
/// PKCS#8 does not record the scheme, so it travels as key metadata the same
/// way it does in a cryptographic provider's algorithm descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RsaSignatureScheme {
    /// RSASSA-PKCS1-v1_5 signatures.
    Pkcs1V15,
    /// RSASSA-PSS signatures.
    Pss,
}

impl RsaSignatureScheme {
    pub fn name(&self) -> &'static str {
        match self {
            RsaSignatureScheme::Pkcs1V15 => "RSASSA-PKCS1-v1_5",
            RsaSignatureScheme::Pss => "RSA-PSS",
        }
    }
}

/// Supported named elliptic curves for ECDSA keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NamedCurve {
    P256,
    P384,
    P521,
}

impl NamedCurve {
    pub fn name(&self) -> &'static str {
        match self {
            NamedCurve::P256 => "P-256",
            NamedCurve::P384 => "P-384",
            NamedCurve::P521 => "P-521",
        }
    }
}

/// Hash function tied to a key's signature algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "SHA-256",
            HashAlgorithm::Sha384 => "SHA-384",
            HashAlgorithm::Sha512 => "SHA-512",
        }
    }
}

/// Algorithm metadata carried by both halves of a key pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyAlgorithm {
    Rsa {
        scheme: RsaSignatureScheme,
        modulus_length: u32,
        hash: HashAlgorithm,
    },
    Ecdsa {
        named_curve: NamedCurve,
    },
}

impl KeyAlgorithm {
    /// Algorithm name, e.g. "RSASSA-PKCS1-v1_5", "RSA-PSS" or "ECDSA".
    pub fn name(&self) -> &'static str {
        match self {
            KeyAlgorithm::Rsa { scheme, .. } => scheme.name(),
            KeyAlgorithm::Ecdsa { .. } => "ECDSA",
        }
    }

    pub fn modulus_length(&self) -> Option<u32> {
        match self {
            KeyAlgorithm::Rsa { modulus_length, .. } => Some(*modulus_length),
            KeyAlgorithm::Ecdsa { .. } => None,
        }
    }

    pub fn named_curve(&self) -> Option<NamedCurve> {
        match self {
            KeyAlgorithm::Rsa { .. } => None,
            KeyAlgorithm::Ecdsa { named_curve } => Some(*named_curve),
        }
    }

    pub fn hash(&self) -> Option<HashAlgorithm> {
        match self {
            KeyAlgorithm::Rsa { hash, .. } => Some(*hash),
            KeyAlgorithm::Ecdsa { .. } => None,
        }
    }
}

/// Private key material for the supported key types.
#[derive(Clone, Debug)]
pub enum PrivateKeyMaterial {
    Rsa(Box<RsaPrivateKey>),
    EcdsaP256(p256::ecdsa::SigningKey),
    EcdsaP384(p384::ecdsa::SigningKey),
    EcdsaP521(ecdsa::SigningKey<p521::NistP521>),
}

/// A private key together with its algorithm metadata.
#[derive(Clone, Debug)]
pub struct PrivateKey {
    pub algorithm: KeyAlgorithm,
    /// Whether the key material may be exported via [`PrivateKey::to_pkcs8_der`].
    pub extractable: bool,
    pub material: PrivateKeyMaterial,
}

impl PrivateKey {
    /// Exports the key in PKCS#8 DER form.
    ///
    /// Fails with `InvalidParameter` if the key is not extractable.
    pub fn to_pkcs8_der(&self) -> Result<Vec<u8>> {
        self.check_extractable()?;
        let doc = match &self.material {
            PrivateKeyMaterial::Rsa(private) => private.to_pkcs8_der(),
            PrivateKeyMaterial::EcdsaP256(signing_key) => signing_key.to_pkcs8_der(),
            PrivateKeyMaterial::EcdsaP384(signing_key) => signing_key.to_pkcs8_der(),
            PrivateKeyMaterial::EcdsaP521(signing_key) => signing_key.to_pkcs8_der(),
        };
        doc.map(|doc| doc.as_bytes().to_vec())
            .map_err(|e| CertFactoryError::Encode(e.to_string()))
    }

    /// Exports the key in PKCS#8 PEM form.
    pub fn to_pkcs8_pem(&self) -> Result<String> {
        self.check_extractable()?;
        let pem = match &self.material {
            PrivateKeyMaterial::Rsa(private) => private.to_pkcs8_pem(LineEnding::LF),
            PrivateKeyMaterial::EcdsaP256(signing_key) => signing_key.to_pkcs8_pem(LineEnding::LF),
            PrivateKeyMaterial::EcdsaP384(signing_key) => signing_key.to_pkcs8_pem(LineEnding::LF),
            PrivateKeyMaterial::EcdsaP521(signing_key) => signing_key.to_pkcs8_pem(LineEnding::LF),
        };
        pem.map(|pem| pem.to_string())
            .map_err(|e| CertFactoryError::Encode(e.to_string()))
    }

    fn check_extractable(&self) -> Result<()> {
        if !self.extractable {
            return Err(CertFactoryError::InvalidParameter(
                "private key is not extractable".to_string(),
            ));
        }
        Ok(())
    }

    /// Imports an RSA private key from PKCS#8 DER bytes.
    ///
    /// PKCS#8 records only `rsaEncryption`, so the caller declares the
    /// signature scheme the key is meant for, exactly as on generation.
    pub fn import_rsa(pkcs8_der: &[u8], scheme: RsaSignatureScheme) -> Result<Self> {
        let private = RsaPrivateKey::from_pkcs8_der(pkcs8_der)?;
        let modulus_length = (private.size() * 8) as u32;
        Ok(PrivateKey {
            algorithm: KeyAlgorithm::Rsa {
                scheme,
                modulus_length,
                hash: HashAlgorithm::Sha256,
            },
            extractable: true,
            material: PrivateKeyMaterial::Rsa(Box::new(private)),
        })
    }

    /// Imports an ECDSA private key from PKCS#8 DER bytes.
    ///
    /// Fails with a decode error if the bytes are malformed or encode a key
    /// on a different curve than the one declared.
    pub fn import_ecdsa(pkcs8_der: &[u8], curve: NamedCurve) -> Result<Self> {
        let material = match curve {
            NamedCurve::P256 => {
                PrivateKeyMaterial::EcdsaP256(p256::ecdsa::SigningKey::from_pkcs8_der(pkcs8_der)?)
            }
            NamedCurve::P384 => {
                PrivateKeyMaterial::EcdsaP384(p384::ecdsa::SigningKey::from_pkcs8_der(pkcs8_der)?)
            }
            NamedCurve::P521 => {
                PrivateKeyMaterial::EcdsaP521(ecdsa::SigningKey::<p521::NistP521>::from_pkcs8_der(
                    pkcs8_der,
                )?)
            }
        };
        Ok(PrivateKey {
            algorithm: KeyAlgorithm::Ecdsa { named_curve: curve },
            extractable: true,
            material,
        })
    }

    /// Signs `data` with the scheme implied by the key's algorithm metadata.
    ///
    /// RSA keys sign with SHA-256 (PKCS#1 v1.5 or PSS per the scheme); ECDSA
    /// keys sign with the curve's matched digest and produce DER-encoded
    /// signature values as required inside certificates.
    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut rng = rand_core::OsRng;
        let signature = match (&self.material, &self.algorithm) {
            (
                PrivateKeyMaterial::Rsa(private),
                KeyAlgorithm::Rsa {
                    scheme: RsaSignatureScheme::Pkcs1V15,
                    ..
                },
            ) => {
                let signing_key = rsa::pkcs1v15::SigningKey::<Sha256>::new(private.as_ref().clone());
                signing_key.sign(data).to_vec()
            }
            (
                PrivateKeyMaterial::Rsa(private),
                KeyAlgorithm::Rsa {
                    scheme: RsaSignatureScheme::Pss,
                    ..
                },
            ) => {
                let signing_key = rsa::pss::SigningKey::<Sha256>::new(private.as_ref().clone());
                signing_key.sign_with_rng(&mut rng, data).to_vec()
            }
            (PrivateKeyMaterial::EcdsaP256(signing_key), _) => {
                let signature: p256::ecdsa::Signature = signing_key.sign(data);
                signature.to_der().as_bytes().to_vec()
            }
            (PrivateKeyMaterial::EcdsaP384(signing_key), _) => {
                let signature: p384::ecdsa::Signature = signing_key.sign(data);
                signature.to_der().as_bytes().to_vec()
            }
            (PrivateKeyMaterial::EcdsaP521(signing_key), _) => {
                // p521's generic `ecdsa::SigningKey` has no `Signer` impl (NistP521
                // lacks `DigestPrimitive`); the p521 wrapper type provides SHA-512
                // ECDSA signing.
                let signature: p521::ecdsa::Signature =
                    p521::ecdsa::SigningKey::from(signing_key.clone()).sign(data);
                signature.to_der().as_bytes().to_vec()
            }
            (PrivateKeyMaterial::Rsa(_), KeyAlgorithm::Ecdsa { .. }) => {
                return Err(CertFactoryError::Signing(
                    "key material does not match algorithm metadata".to_string(),
                ));
            }
        };
        Ok(signature)
    }
}

/// Public key material for the supported key types.
#[derive(Clone, Debug)]
pub enum PublicKeyMaterial {
    Rsa(RsaPublicKey),
    EcdsaP256(p256::ecdsa::VerifyingKey),
    EcdsaP384(p384::ecdsa::VerifyingKey),
    EcdsaP521(ecdsa::VerifyingKey<p521::NistP521>),
}

/// A public key together with its algorithm metadata.
#[derive(Clone, Debug)]
pub struct PublicKey {
    pub algorithm: KeyAlgorithm,
    pub extractable: bool,
    pub material: PublicKeyMaterial,
}

impl PublicKey {
    /// Clones the public half out of a key pair.
    pub fn from_key_pair(key_pair: &KeyPair) -> Self {
        key_pair.public.clone()
    }

    /// Converts the key into X.509 SubjectPublicKeyInfo form.
    pub fn as_spki(&self) -> Result<SubjectPublicKeyInfoOwned> {
        let spki = match &self.material {
            PublicKeyMaterial::Rsa(public) => SubjectPublicKeyInfoOwned::from_key(public.clone()),
            PublicKeyMaterial::EcdsaP256(verifying_key) => {
                SubjectPublicKeyInfoOwned::from_key(*verifying_key)
            }
            PublicKeyMaterial::EcdsaP384(verifying_key) => {
                SubjectPublicKeyInfoOwned::from_key(*verifying_key)
            }
            PublicKeyMaterial::EcdsaP521(verifying_key) => {
                SubjectPublicKeyInfoOwned::from_key(*verifying_key)
            }
        };
        spki.map_err(|e| CertFactoryError::Encode(e.to_string()))
    }

    /// Reconstructs a public key from X.509 SubjectPublicKeyInfo.
    ///
    /// SPKI does not record which RSA signature scheme a key is meant for,
    /// so RSA keys come back tagged as PKCS#1 v1.5.
    pub fn from_x509spki(spki: &SubjectPublicKeyInfoOwned) -> Result<Self> {
        let key_bytes = spki
            .subject_public_key
            .as_bytes()
            .ok_or_else(|| CertFactoryError::Decode("public key has unused bits".to_string()))?;

        match spki.algorithm.oid {
            const_oid::db::rfc5912::RSA_ENCRYPTION => {
                let public = RsaPublicKey::from_pkcs1_der(key_bytes)
                    .map_err(|e| CertFactoryError::Decode(e.to_string()))?;
                let modulus_length = (public.size() * 8) as u32;
                Ok(PublicKey {
                    algorithm: KeyAlgorithm::Rsa {
                        scheme: RsaSignatureScheme::Pkcs1V15,
                        modulus_length,
                        hash: HashAlgorithm::Sha256,
                    },
                    extractable: true,
                    material: PublicKeyMaterial::Rsa(public),
                })
            }
            const_oid::db::rfc5912::ID_EC_PUBLIC_KEY => {
                let params = spki.algorithm.parameters.as_ref().ok_or_else(|| {
                    CertFactoryError::Decode("missing EC curve parameters".to_string())
                })?;
                let curve_oid: const_oid::ObjectIdentifier = params
                    .decode_as()
                    .map_err(|e| CertFactoryError::Decode(e.to_string()))?;
                let (named_curve, material) = match curve_oid {
                    const_oid::db::rfc5912::SECP_256_R_1 => (
                        NamedCurve::P256,
                        PublicKeyMaterial::EcdsaP256(
                            p256::ecdsa::VerifyingKey::from_sec1_bytes(key_bytes)
                                .map_err(|e| CertFactoryError::Decode(e.to_string()))?,
                        ),
                    ),
                    const_oid::db::rfc5912::SECP_384_R_1 => (
                        NamedCurve::P384,
                        PublicKeyMaterial::EcdsaP384(
                            p384::ecdsa::VerifyingKey::from_sec1_bytes(key_bytes)
                                .map_err(|e| CertFactoryError::Decode(e.to_string()))?,
                        ),
                    ),
                    const_oid::db::rfc5912::SECP_521_R_1 => (
                        NamedCurve::P521,
                        PublicKeyMaterial::EcdsaP521(
                            ecdsa::VerifyingKey::<p521::NistP521>::from_sec1_bytes(key_bytes)
                                .map_err(|e| CertFactoryError::Decode(e.to_string()))?,
                        ),
                    ),
                    other => {
                        return Err(CertFactoryError::Decode(format!(
                            "unsupported named curve: {other}"
                        )));
                    }
                };
                Ok(PublicKey {
                    algorithm: KeyAlgorithm::Ecdsa { named_curve },
                    extractable: true,
                    material,
                })
            }
            other => Err(CertFactoryError::Decode(format!(
                "unsupported public key algorithm: {other}"
            ))),
        }
    }
}

/// A public and private key generated together.
#[derive(Clone, Debug)]
pub struct KeyPair {
    pub public: PublicKey,
    pub private: PrivateKey,
}

impl KeyPair {
    /// Generates an RSA key pair for the given signature scheme.
    ///
    /// SHA-256 is the associated hash for both schemes. Fails with
    /// `InvalidParameter` on an unsupported modulus length.
    pub fn generate_rsa(scheme: RsaSignatureScheme, modulus_length: u32) -> Result<Self> {
        if !SUPPORTED_RSA_MODULUS_LENGTHS.contains(&modulus_length) {
            return Err(CertFactoryError::InvalidParameter(format!(
                "unsupported RSA modulus length: {modulus_length}"
            )));
        }
        let mut rng = rand_core::OsRng;
        let private = RsaPrivateKey::new(&mut rng, modulus_length as usize)
            .map_err(|e| CertFactoryError::KeyGeneration(e.to_string()))?;
        let public = RsaPublicKey::from(&private);
        let algorithm = KeyAlgorithm::Rsa {
            scheme,
            modulus_length,
            hash: HashAlgorithm::Sha256,
        };
        Ok(KeyPair {
            public: PublicKey {
                algorithm: algorithm.clone(),
                extractable: true,
                material: PublicKeyMaterial::Rsa(public),
            },
            private: PrivateKey {
                algorithm,
                extractable: true,
                material: PrivateKeyMaterial::Rsa(Box::new(private)),
            },
        })
    }

    /// Generates an ECDSA key pair on the given named curve.
    pub fn generate_ecdsa(curve: NamedCurve) -> Self {
        let mut rng = rand_core::OsRng;
        let (public_material, private_material) = match curve {
            NamedCurve::P256 => {
                let signing_key = p256::ecdsa::SigningKey::random(&mut rng);
                (
                    PublicKeyMaterial::EcdsaP256(*signing_key.verifying_key()),
                    PrivateKeyMaterial::EcdsaP256(signing_key),
                )
            }
            NamedCurve::P384 => {
                let signing_key = p384::ecdsa::SigningKey::random(&mut rng);
                (
                    PublicKeyMaterial::EcdsaP384(*signing_key.verifying_key()),
                    PrivateKeyMaterial::EcdsaP384(signing_key),
                )
            }
            NamedCurve::P521 => {
                let signing_key = ecdsa::SigningKey::<p521::NistP521>::random(&mut rng);
                (
                    PublicKeyMaterial::EcdsaP521(*signing_key.verifying_key()),
                    PrivateKeyMaterial::EcdsaP521(signing_key),
                )
            }
        };
        let algorithm = KeyAlgorithm::Ecdsa { named_curve: curve };
        KeyPair {
            public: PublicKey {
                algorithm: algorithm.clone(),
                extractable: true,
                material: public_material,
            },
            private: PrivateKey {
                algorithm,
                extractable: true,
                material: private_material,
            },
        }
    }
}
