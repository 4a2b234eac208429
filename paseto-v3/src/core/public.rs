use p384::ecdsa::signature::{DigestSigner, DigestVerifier};
use p384::ecdsa::{Signature, SigningKey, VerifyingKey};
use p384::pkcs8::{DecodePrivateKey, DecodePublicKey};
use paseto_core::PasetoError;
use paseto_core::key::{Key, KeyEncoding, KeyRole};
use paseto_core::pae::pre_auth_encode;
use paseto_core::version::{Construction, Header, Purpose, Version};
use sha2::{Digest, Sha384};
use zeroize::Zeroizing;

use super::{PreAuthEncodeDigest, PublicKey, SecretKey, random_bytes};

const HEADER: Header = Header::new(Version::V3, Purpose::Public);

/// `v3.public`
#[derive(Clone, Copy, Debug, Default)]
pub struct V3Public;

impl KeyEncoding for PublicKey {
    const VERSION: Version = Version::V3;
    const ROLE: KeyRole = KeyRole::Public;

    /// Compressed (49 bytes) or uncompressed (97 bytes) SEC1.
    fn decode(bytes: &[u8]) -> Result<Self, PasetoError> {
        if !matches!(bytes.len(), 49 | 97) {
            return Err(PasetoError::InvalidKey(
                "v3 public keys must be 49 or 97 bytes".into(),
            ));
        }
        VerifyingKey::from_sec1_bytes(bytes)
            .map(Self)
            .map_err(|_| PasetoError::InvalidKey("not a P-384 point".into()))
    }

    fn encode(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.0.to_encoded_point(true).as_bytes().to_vec())
    }

    /// PASERK only carries the compressed point.
    fn decode_paserk(bytes: &[u8]) -> Result<Self, PasetoError> {
        if bytes.len() != 49 {
            return Err(PasetoError::InvalidKey(
                "k3.public keys must be 49 bytes".into(),
            ));
        }
        Self::decode(bytes)
    }

    fn from_pem(pem: &str) -> Result<Self, PasetoError> {
        VerifyingKey::from_public_key_pem(pem)
            .map(Self)
            .map_err(|_| PasetoError::InvalidKey("not a P-384 SPKI PEM document".into()))
    }

    fn from_der(der: &[u8]) -> Result<Self, PasetoError> {
        VerifyingKey::from_public_key_der(der)
            .map(Self)
            .map_err(|_| PasetoError::InvalidKey("not a P-384 SPKI DER document".into()))
    }
}

impl KeyEncoding for SecretKey {
    const VERSION: Version = Version::V3;
    const ROLE: KeyRole = KeyRole::Secret;

    fn decode(bytes: &[u8]) -> Result<Self, PasetoError> {
        if bytes.len() != 48 {
            return Err(PasetoError::InvalidKey(
                "v3 secret keys must be 48 bytes".into(),
            ));
        }
        SigningKey::from_slice(bytes)
            .map(Self)
            .map_err(|_| PasetoError::InvalidKey("not a P-384 scalar".into()))
    }

    fn encode(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.0.to_bytes().to_vec())
    }

    /// PKCS#8 or SEC1 (`EC PRIVATE KEY`).
    fn from_pem(pem: &str) -> Result<Self, PasetoError> {
        SigningKey::from_pkcs8_pem(pem)
            .or_else(|_| p384::SecretKey::from_sec1_pem(pem).map(SigningKey::from))
            .map(Self)
            .map_err(|_| PasetoError::InvalidKey("not a P-384 private key PEM document".into()))
    }

    fn from_der(der: &[u8]) -> Result<Self, PasetoError> {
        SigningKey::from_pkcs8_der(der)
            .or_else(|_| p384::SecretKey::from_sec1_der(der).map(SigningKey::from))
            .map(Self)
            .map_err(|_| PasetoError::InvalidKey("not a P-384 private key DER document".into()))
    }
}

impl SecretKey {
    /// Generate a random secret key
    pub fn random() -> Result<Self, PasetoError> {
        // out of range scalars are vanishingly rare, but must be retried
        loop {
            let bytes = random_bytes::<48>()?;
            if let Ok(key) = SigningKey::from_slice(&*bytes) {
                break Ok(Self(key));
            }
        }
    }

    /// Derive the associated public key
    pub fn public_key(&self) -> PublicKey {
        PublicKey(*self.0.verifying_key())
    }
}

impl Construction for V3Public {
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

        let digest = preauth_public(key.0.verifying_key(), payload, footer, assertion)?;
        let signature: Signature = key
            .0
            .try_sign_digest(digest)
            .map_err(|_| PasetoError::Backend("ECDSA signing failed"))?;
        let signature = signature.normalize_s().unwrap_or(signature);

        let mut body = Vec::with_capacity(payload.len() + 96);
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
            .split_last_chunk::<96>()
            .ok_or(PasetoError::Invalid("token is too short"))?;
        let signature =
            Signature::from_slice(signature).map_err(|_| PasetoError::VerificationFailed)?;

        let digest = preauth_public(&key.0, payload, footer, assertion)?;
        DigestVerifier::<Sha384, Signature>::verify_digest(&key.0, digest, &signature)
            .map_err(|_| PasetoError::VerificationFailed)?;

        Ok(payload.to_vec())
    }
}

/// The compressed public key is bound into the signature.
fn preauth_public(
    key: &VerifyingKey,
    payload: &[u8],
    footer: &[u8],
    assertion: &[u8],
) -> Result<Sha384, PasetoError> {
    let key = key.to_encoded_point(true);

    let mut digest = Sha384::new();
    pre_auth_encode(
        [
            &[key.as_bytes()],
            &[HEADER.as_str().as_bytes()],
            &[payload],
            &[footer],
            &[assertion],
        ],
        PreAuthEncodeDigest(&mut digest),
    )?;
    Ok(digest)
}
