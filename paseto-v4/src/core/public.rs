use ed25519_dalek::pkcs8::{DecodePrivateKey, DecodePublicKey};
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use paseto_core::PasetoError;
use paseto_core::key::{Key, KeyEncoding, KeyRole};
use paseto_core::pae::pae;
use paseto_core::version::{Construction, Header, Purpose, Version};
use zeroize::Zeroizing;

use super::{PublicKey, SecretKey, random_bytes};

const HEADER: Header = Header::new(Version::V4, Purpose::Public);

/// `v4.public`
#[derive(Clone, Copy, Debug, Default)]
pub struct V4Public;

impl KeyEncoding for PublicKey {
    const VERSION: Version = Version::V4;
    const ROLE: KeyRole = KeyRole::Public;

    fn decode(bytes: &[u8]) -> Result<Self, PasetoError> {
        let bytes = bytes
            .try_into()
            .map_err(|_| PasetoError::InvalidKey("v4 public keys must be 32 bytes".into()))?;
        VerifyingKey::from_bytes(bytes)
            .map(Self)
            .map_err(|_| PasetoError::InvalidKey("not an Ed25519 point".into()))
    }

    fn encode(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.0.as_bytes().to_vec())
    }

    fn from_pem(pem: &str) -> Result<Self, PasetoError> {
        VerifyingKey::from_public_key_pem(pem)
            .map(Self)
            .map_err(|_| PasetoError::InvalidKey("not an Ed25519 SPKI PEM document".into()))
    }

    fn from_der(der: &[u8]) -> Result<Self, PasetoError> {
        VerifyingKey::from_public_key_der(der)
            .map(Self)
            .map_err(|_| PasetoError::InvalidKey("not an Ed25519 SPKI DER document".into()))
    }
}

impl KeyEncoding for SecretKey {
    const VERSION: Version = Version::V4;
    const ROLE: KeyRole = KeyRole::Secret;

    /// `seed || public`, the public half must match the seed.
    fn decode(bytes: &[u8]) -> Result<Self, PasetoError> {
        let bytes = bytes
            .try_into()
            .map_err(|_| PasetoError::InvalidKey("v4 secret keys must be 64 bytes".into()))?;
        SigningKey::from_keypair_bytes(bytes)
            .map(Self)
            .map_err(|_| PasetoError::InvalidKey("public half does not match the secret key".into()))
    }

    fn encode(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.0.to_keypair_bytes().to_vec())
    }

    fn from_pem(pem: &str) -> Result<Self, PasetoError> {
        SigningKey::from_pkcs8_pem(pem)
            .map(Self)
            .map_err(|_| PasetoError::InvalidKey("not an Ed25519 PKCS#8 PEM document".into()))
    }

    fn from_der(der: &[u8]) -> Result<Self, PasetoError> {
        SigningKey::from_pkcs8_der(der)
            .map(Self)
            .map_err(|_| PasetoError::InvalidKey("not an Ed25519 PKCS#8 DER document".into()))
    }
}

impl SecretKey {
    /// Generate a random secret key
    pub fn random() -> Result<Self, PasetoError> {
        let seed = random_bytes::<32>()?;
        Ok(Self(SigningKey::from_bytes(&seed)))
    }

    /// Derive the associated public key
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.verifying_key())
    }
}

impl Construction for V4Public {
    fn header(&self) -> Header {
        HEADER
    }

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
        let key = SecretKey::from_key(key)?;

        let m2 = preauth_public(payload, footer, assertion)?;
        let signature = key.0.sign(&m2);

        let mut body = Vec::with_capacity(payload.len() + Signature::BYTE_SIZE);
        body.extend_from_slice(payload);
        body.extend_from_slice(&signature.to_bytes());
        Ok(body)
    }

    fn unseal(
        &self,
        key: &Key,
        body: &[u8],
        footer: &[u8],
        assertion: &[u8],
    ) -> Result<Vec<u8>, PasetoError> {
        let key = PublicKey::from_key(key)?;

        let (payload, signature) = body
            .split_last_chunk::<64>()
            .ok_or(PasetoError::Invalid("token is too short"))?;
        let signature = Signature::from_bytes(signature);

        let m2 = preauth_public(payload, footer, assertion)?;
        key.0
            .verify_strict(&m2, &signature)
            .map_err(|_| PasetoError::VerificationFailed)?;

        Ok(payload.to_vec())
    }
}

fn preauth_public(payload: &[u8], footer: &[u8], assertion: &[u8]) -> Result<Vec<u8>, PasetoError> {
    pae([
        &[HEADER.as_str().as_bytes()],
        &[payload],
        &[footer],
        &[assertion],
    ])
}

#[cfg(test)]
mod tests {
    use paseto_core::PasetoError;
    use paseto_core::key::KeyEncoding;
    use paseto_core::version::Construction;

    use super::V4Public;
    use crate::{KeyObject, PublicKey, SecretKey, bytes_to_key_object, key_object_to_bytes};

    const SECRET: &str = "b4cbfb43df4ce210727d953e4a713307fa19bb7d9f85041438d9e11b942a37741eb9dbbbbc047c03fd70604e0071f0987e16b28b757225c11f00415d0e20b1a2";
    const PUBLIC: &str = "1eb9dbbbbc047c03fd70604e0071f0987e16b28b757225c11f00415d0e20b1a2";

    #[test]
    fn round_trip() {
        let sk = SecretKey::decode(&hex::decode(SECRET).unwrap()).unwrap();
        let pk = PublicKey::decode(&hex::decode(PUBLIC).unwrap()).unwrap();
        assert_eq!(sk.public_key(), pk);

        let body = V4Public
            .seal(&sk.to_key(), &[], b"hello", b"footer", b"assertion")
            .unwrap();
        let payload = V4Public
            .unseal(&pk.to_key(), &body, b"footer", b"assertion")
            .unwrap();
        assert_eq!(payload, b"hello");

        assert!(matches!(
            V4Public.unseal(&pk.to_key(), &body, b"footer", b"other"),
            Err(PasetoError::VerificationFailed)
        ));
    }

    #[test]
    fn mismatched_public_half() {
        let mut bytes = hex::decode(SECRET).unwrap();
        bytes[63] ^= 1;
        assert!(matches!(
            SecretKey::decode(&bytes),
            Err(PasetoError::InvalidKey(_))
        ));
    }

    #[test]
    fn key_objects() {
        let secret = hex::decode(SECRET).unwrap();
        let public = hex::decode(PUBLIC).unwrap();

        let obj = bytes_to_key_object(&secret).unwrap();
        assert!(matches!(obj, KeyObject::Secret(_)));
        assert_eq!(&**key_object_to_bytes(&obj), &secret[..]);

        let obj = bytes_to_key_object(&public).unwrap();
        assert!(matches!(obj, KeyObject::Public(_)));
        assert_eq!(&**key_object_to_bytes(&obj), &public[..]);

        assert!(bytes_to_key_object(&public[..31]).is_err());
    }

    #[test]
    fn wrong_role_is_rejected_before_signing() {
        let pk = PublicKey::decode(&hex::decode(PUBLIC).unwrap()).unwrap();
        assert!(matches!(
            V4Public.seal(&pk.to_key(), &[], b"hello", b"", b""),
            Err(PasetoError::InvalidKey(_))
        ));
    }
}
