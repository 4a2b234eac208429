use paseto_core::PasetoError;
use paseto_core::key::{Key, KeyEncoding, KeyRole};
use paseto_core::pae::pre_auth_encode;
use paseto_core::version::{Construction, Header, Purpose, Version};
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey, EncodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::pss::Signature;
use rsa::rand_core::OsRng;
use rsa::signature::{DigestVerifier, Keypair, RandomizedDigestSigner};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha384};
use zeroize::Zeroizing;

use super::{PreAuthEncodeDigest, PublicKey, SecretKey, reject_assertion};

const HEADER: Header = Header::new(Version::V1, Purpose::Public);

const MODULUS_BITS: usize = 2048;

/// `v1.public`
#[derive(Clone, Copy, Debug, Default)]
pub struct V1Public;

impl PublicKey {
    fn new(key: RsaPublicKey) -> Result<Self, PasetoError> {
        if key.n().bits() != MODULUS_BITS {
            return Err(PasetoError::InvalidKey(
                "v1 keys must have a 2048 bit modulus".into(),
            ));
        }
        let der = key
            .to_pkcs1_der()
            .map_err(|_| PasetoError::InvalidKey("RSA public key cannot be encoded".into()))?;
        Ok(Self {
            der: der.into_vec(),
            key: rsa::pss::VerifyingKey::new(key),
        })
    }
}

impl KeyEncoding for PublicKey {
    const VERSION: Version = Version::V1;
    const ROLE: KeyRole = KeyRole::Public;

    /// PKCS#1 `RSAPublicKey` DER. SPKI DER is accepted as well.
    fn decode(bytes: &[u8]) -> Result<Self, PasetoError> {
        RsaPublicKey::from_pkcs1_der(bytes)
            .or_else(|_| RsaPublicKey::from_public_key_der(bytes))
            .map_err(|_| PasetoError::InvalidKey("not an RSA public key".into()))
            .and_then(Self::new)
    }

    fn encode(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.der.clone())
    }

    fn from_pem(pem: &str) -> Result<Self, PasetoError> {
        RsaPublicKey::from_public_key_pem(pem)
            .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
            .map_err(|_| PasetoError::InvalidKey("not an RSA public key PEM document".into()))
            .and_then(Self::new)
    }

    fn from_der(der: &[u8]) -> Result<Self, PasetoError> {
        Self::decode(der)
    }
}

impl SecretKey {
    fn new(key: RsaPrivateKey) -> Result<Self, PasetoError> {
        let der = key
            .to_pkcs1_der()
            .map_err(|_| PasetoError::InvalidKey("RSA private key cannot be encoded".into()))?;
        Self::with_der(key, Zeroizing::new(der.as_bytes().to_vec()))
    }

    /// `der` is kept verbatim as the PASERK body.
    fn with_der(key: RsaPrivateKey, der: Zeroizing<Vec<u8>>) -> Result<Self, PasetoError> {
        if key.n().bits() != MODULUS_BITS {
            return Err(PasetoError::InvalidKey(
                "v1 keys must have a 2048 bit modulus".into(),
            ));
        }
        Ok(Self {
            der,
            key: rsa::pss::SigningKey::new(key),
        })
    }

    /// Generate a random 2048 bit secret key
    pub fn random() -> Result<Self, PasetoError> {
        let key = RsaPrivateKey::new(&mut OsRng, MODULUS_BITS)
            .map_err(|_| PasetoError::Backend("RSA key generation failed"))?;
        Self::new(key)
    }

    /// Derive the associated public key
    pub fn public_key(&self) -> Result<PublicKey, PasetoError> {
        PublicKey::new(self.key.verifying_key().into())
    }
}

impl KeyEncoding for SecretKey {
    const VERSION: Version = Version::V1;
    const ROLE: KeyRole = KeyRole::Secret;

    /// PKCS#1 `RSAPrivateKey` DER.
    fn decode(bytes: &[u8]) -> Result<Self, PasetoError> {
        let key = RsaPrivateKey::from_pkcs1_der(bytes)
            .map_err(|_| PasetoError::InvalidKey("not a PKCS#1 RSA private key".into()))?;
        Self::with_der(key, Zeroizing::new(bytes.to_vec()))
    }

    fn encode(&self) -> Zeroizing<Vec<u8>> {
        self.der.clone()
    }

    /// PKCS#1 (`RSA PRIVATE KEY`) or PKCS#8 (`PRIVATE KEY`).
    fn from_pem(pem: &str) -> Result<Self, PasetoError> {
        RsaPrivateKey::from_pkcs1_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs8_pem(pem))
            .map_err(|_| PasetoError::InvalidKey("not an RSA private key PEM document".into()))
            .and_then(Self::new)
    }

    fn from_der(der: &[u8]) -> Result<Self, PasetoError> {
        RsaPrivateKey::from_pkcs1_der(der)
            .or_else(|_| RsaPrivateKey::from_pkcs8_der(der))
            .map_err(|_| PasetoError::InvalidKey("not an RSA private key DER document".into()))
            .and_then(Self::new)
    }
}

impl Construction for V1Public {
    fn header(&self) -> Header {
        HEADER
    }

    /// PSS salts are drawn from the OS by the signer.
    fn nonce_len(&self) -> usize {
        0
    }

    fn seal(
        &self,
        key: &Key,
        _nonce: &[u8],
        payload: &[u8],
        footer: &[u8],
        assertion: &[u8],
    ) -> Result<Vec<u8>, PasetoError> {
        reject_assertion(assertion)?;
        let key = SecretKey::from_key(key)?;

        let digest = preauth_public(payload, footer)?;
        let signature: Box<[u8]> = key
            .key
            .try_sign_digest_with_rng(&mut OsRng, digest)
            .map_err(|_| PasetoError::Backend("RSA-PSS signing failed"))?
            .into();

        let mut body = Vec::with_capacity(payload.len() + signature.len());
        body.extend_from_slice(payload);
        body.extend_from_slice(&signature);
        Ok(body)
    }

    fn unseal(
        &self,
        key: &Key,
        body: &[u8],
        footer: &[u8],
        assertion: &[u8],
    ) -> Result<Vec<u8>, PasetoError> {
        reject_assertion(assertion)?;
        let key = PublicKey::from_key(key)?;

        let (payload, signature) = body
            .split_last_chunk::<256>()
            .ok_or(PasetoError::Invalid("token is too short"))?;
        let signature = Signature::try_from(&signature[..])
            .map_err(|_| PasetoError::VerificationFailed)?;

        let digest = preauth_public(payload, footer)?;
        DigestVerifier::<Sha384, Signature>::verify_digest(&key.key, digest, &signature)
            .map_err(|_| PasetoError::VerificationFailed)?;

        Ok(payload.to_vec())
    }
}

fn preauth_public(payload: &[u8], footer: &[u8]) -> Result<Sha384, PasetoError> {
    let mut digest = Sha384::new();
    pre_auth_encode(
        [&[HEADER.as_str().as_bytes()], &[payload], &[footer]],
        PreAuthEncodeDigest(&mut digest),
    )?;
    Ok(digest)
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use paseto_core::PasetoError;
    use paseto_core::key::KeyEncoding;
    use paseto_core::version::Construction;

    use super::V1Public;
    use crate::{KeyObject, PublicKey, SecretKey, bytes_to_key_object, key_object_to_bytes};

    // key generation is slow, share one pair across the tests
    static SECRET: LazyLock<SecretKey> = LazyLock::new(|| SecretKey::random().unwrap());

    #[test]
    fn round_trip() {
        let sk = &*SECRET;
        let pk = sk.public_key().unwrap();

        let body = V1Public
            .seal(&sk.to_key(), &[], b"hello", b"footer", b"")
            .unwrap();
        assert_eq!(body.len(), 5 + 256);

        let payload = V1Public
            .unseal(&pk.to_key(), &body, b"footer", b"")
            .unwrap();
        assert_eq!(payload, b"hello");

        assert!(matches!(
            V1Public.unseal(&pk.to_key(), &body, b"", b""),
            Err(PasetoError::VerificationFailed)
        ));
    }

    #[test]
    fn signatures_are_randomized() {
        let sk = SECRET.to_key();
        let a = V1Public.seal(&sk, &[], b"hello", b"", b"").unwrap();
        let b = V1Public.seal(&sk, &[], b"hello", b"", b"").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn pkcs1_key_objects() {
        let secret = SECRET.encode();
        let obj = bytes_to_key_object(&secret).unwrap();
        assert!(matches!(obj, KeyObject::Secret(_)));
        assert_eq!(key_object_to_bytes(&obj), secret);

        let public = SECRET.public_key().unwrap().encode();
        let obj = bytes_to_key_object(&public).unwrap();
        assert!(matches!(obj, KeyObject::Public(_)));
        assert_eq!(key_object_to_bytes(&obj), public);

        assert!(matches!(
            bytes_to_key_object(&[0x30, 0x00]),
            Err(PasetoError::InvalidKey(_))
        ));
    }

    #[test]
    fn public_key_is_not_a_secret_key() {
        let public = SECRET.public_key().unwrap().encode();
        assert!(SecretKey::decode(&public).is_err());
        assert!(PublicKey::decode(&public).is_ok());
    }
}
