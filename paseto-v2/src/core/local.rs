use blake2::Blake2bMac;
use chacha20poly1305::aead::{AeadInPlace, KeyInit};
use chacha20poly1305::{Tag, XChaCha20Poly1305, XNonce};
use digest::Mac;
use digest::consts::U24;
use paseto_core::PasetoError;
use paseto_core::key::{Key, KeyEncoding, KeyRole};
use paseto_core::pae::pae;
use paseto_core::version::{Construction, Header, Purpose, Version};
use zeroize::Zeroizing;

use super::{LocalKey, random_bytes, reject_assertion};

const HEADER: Header = Header::new(Version::V2, Purpose::Local);

/// `v2.local`
#[derive(Clone, Copy, Debug, Default)]
pub struct V2Local;

impl KeyEncoding for LocalKey {
    const VERSION: Version = Version::V2;
    const ROLE: KeyRole = KeyRole::Local;

    fn decode(bytes: &[u8]) -> Result<Self, PasetoError> {
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| PasetoError::InvalidKey("v2 local keys must be 32 bytes".into()))?;
        Ok(Self(Zeroizing::new(bytes)))
    }

    fn encode(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.0.to_vec())
    }
}

impl LocalKey {
    /// Generate a random local key
    pub fn random() -> Result<Self, PasetoError> {
        random_bytes().map(Self)
    }

    fn cipher(&self) -> Result<XChaCha20Poly1305, PasetoError> {
        XChaCha20Poly1305::new_from_slice(&*self.0)
            .map_err(|_| PasetoError::Backend("invalid XChaCha20-Poly1305 key"))
    }
}

impl Construction for V2Local {
    fn header(&self) -> Header {
        HEADER
    }

    /// The random input is only used to key the nonce hash.
    fn nonce_len(&self) -> usize {
        24
    }

    fn seal(
        &self,
        key: &Key,
        nonce: &[u8],
        payload: &[u8],
        footer: &[u8],
        assertion: &[u8],
    ) -> Result<Vec<u8>, PasetoError> {
        reject_assertion(assertion)?;
        let key = LocalKey::from_key(key)?;

        if nonce.len() != 24 {
            return Err(PasetoError::Usage("v2.local needs a 24 byte nonce".into()));
        }
        let mut n = <Blake2bMac<U24> as Mac>::new_from_slice(nonce)
            .map_err(|_| PasetoError::Backend("invalid BLAKE2b key"))?;
        n.update(payload);
        let n: [u8; 24] = n.finalize().into_bytes().into();

        let mut body = Vec::with_capacity(24 + payload.len() + 16);
        body.extend_from_slice(&n);
        body.extend_from_slice(payload);

        let aad = preauth_local(&n, footer)?;
        let tag = key
            .cipher()?
            .encrypt_in_place_detached(XNonce::from_slice(&n), &aad, &mut body[24..])
            .map_err(|_| PasetoError::Backend("XChaCha20-Poly1305 encryption failed"))?;
        body.extend_from_slice(&tag);

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
        let key = LocalKey::from_key(key)?;

        let (ciphertext, tag) = body
            .split_last_chunk::<16>()
            .ok_or(PasetoError::Invalid("token is too short"))?;
        let (nonce, ciphertext) = ciphertext
            .split_first_chunk::<24>()
            .ok_or(PasetoError::Invalid("token is too short"))?;

        let aad = preauth_local(nonce, footer)?;
        let mut payload = ciphertext.to_vec();
        key.cipher()?
            .decrypt_in_place_detached(
                XNonce::from_slice(nonce),
                &aad,
                &mut payload,
                Tag::from_slice(tag),
            )
            .map_err(|_| PasetoError::DecryptionFailed)?;

        Ok(payload)
    }
}

fn preauth_local(nonce: &[u8], footer: &[u8]) -> Result<Vec<u8>, PasetoError> {
    pae([&[HEADER.as_str().as_bytes()], &[nonce], &[footer]])
}

#[cfg(test)]
mod tests {
    use paseto_core::PasetoError;
    use paseto_core::key::KeyEncoding;
    use paseto_core::version::Construction;

    use super::V2Local;
    use crate::LocalKey;

    fn key() -> LocalKey {
        let bytes = hex::decode("707172737475767778797a7b7c7d7e7f808182838485868788898a8b8c8d8e8f")
            .unwrap();
        LocalKey::decode(&bytes).unwrap()
    }

    #[test]
    fn round_trip() {
        let key = key().to_key();
        let body = V2Local.seal(&key, &[0; 24], b"hello", b"footer", b"").unwrap();
        assert_eq!(body.len(), 24 + 5 + 16);

        let payload = V2Local.unseal(&key, &body, b"footer", b"").unwrap();
        assert_eq!(payload, b"hello");
    }

    #[test]
    fn nonce_depends_on_payload() {
        let key = key().to_key();
        let a = V2Local.seal(&key, &[0; 24], b"hello", b"", b"").unwrap();
        let b = V2Local.seal(&key, &[0; 24], b"world", b"", b"").unwrap();
        assert_ne!(a[..24], b[..24]);
    }

    #[test]
    fn footer_is_authenticated() {
        let key = key().to_key();
        let body = V2Local.seal(&key, &[0; 24], b"hello", b"footer", b"").unwrap();
        assert!(matches!(
            V2Local.unseal(&key, &body, b"other", b""),
            Err(PasetoError::DecryptionFailed)
        ));
    }

    #[test]
    fn assertions_are_rejected() {
        let key = key().to_key();
        assert!(matches!(
            V2Local.seal(&key, &[0; 24], b"hello", b"", b"assertion"),
            Err(PasetoError::Usage(_))
        ));
    }

    #[test]
    fn nonce_must_be_24_bytes() {
        let key = key().to_key();
        for nonce in [&[0; 23][..], &[0; 32][..]] {
            assert!(matches!(
                V2Local.seal(&key, nonce, b"hello", b"", b""),
                Err(PasetoError::Usage(_))
            ));
        }
    }

    #[test]
    fn short_body() {
        let key = key().to_key();
        assert!(matches!(
            V2Local.unseal(&key, &[0; 39], b"", b""),
            Err(PasetoError::Invalid(_))
        ));
    }
}
