use ed25519_dalek::pkcs8::{DecodePrivateKey, DecodePublicKey};
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use paseto_core::PasetoError;
use paseto_core::key::{Key, KeyEncoding, KeyRole};
use paseto_core::pae::pae;
use paseto_core::version::{Construction, Header, Purpose, Version};
use zeroize::Zeroizing;

use super::{PublicKey, SecretKey, random_bytes, reject_assertion};

const HEADER: Header = Header::new(Version::V2, Purpose::Public);

/// `v2.public`
#[derive(Clone, Copy, Debug, Default)]
pub struct V2Public;

impl KeyEncoding for PublicKey {
    const VERSION: Version = Version::V2;
    const ROLE: KeyRole = KeyRole::Public;

    fn decode(bytes: &[u8]) -> Result<Self, PasetoError> {
        let bytes = bytes
            .try_into()
            .map_err(|_| PasetoError::InvalidKey("v2 public keys must be 32 bytes".into()))?;
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
    const VERSION: Version = Version::V2;
    const ROLE: KeyRole = KeyRole::Secret;

    /// `seed || public`, the public half must match the seed.
    fn decode(bytes: &[u8]) -> Result<Self, PasetoError> {
        let bytes = bytes
            .try_into()
            .map_err(|_| PasetoError::InvalidKey("v2 secret keys must be 64 bytes".into()))?;
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

impl Construction for V2Public {
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
        reject_assertion(assertion)?;
        let key = SecretKey::from_key(key)?;

        let m2 = preauth_public(payload, footer)?;
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
        reject_assertion(assertion)?;
        let key = PublicKey::from_key(key)?;

        let (payload, signature) = body
            .split_last_chunk::<64>()
            .ok_or(PasetoError::Invalid("token is too short"))?;
        let signature = Signature::from_bytes(signature);

        let m2 = preauth_public(payload, footer)?;
        key.0
            .verify_strict(&m2, &signature)
            .map_err(|_| PasetoError::VerificationFailed)?;

        Ok(payload.to_vec())
    }
}

fn preauth_public(payload: &[u8], footer: &[u8]) -> Result<Vec<u8>, PasetoError> {
    pae([&[HEADER.as_str().as_bytes()], &[payload], &[footer]])
}
