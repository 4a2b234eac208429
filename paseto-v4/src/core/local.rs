use blake2::Blake2bMac;
use chacha20::XChaCha20;
use cipher::{KeyIvInit, StreamCipher};
use digest::Mac;
use digest::consts::{U32, U56};
use paseto_core::PasetoError;
use paseto_core::key::{Key, KeyEncoding, KeyRole};
use paseto_core::pae::pre_auth_encode;
use paseto_core::version::{Construction, Header, Purpose, Version};
use zeroize::Zeroizing;

use super::{LocalKey, PreAuthEncodeDigest, random_bytes};

const HEADER: Header = Header::new(Version::V4, Purpose::Local);

/// `v4.local`
#[derive(Clone, Copy, Debug, Default)]
pub struct V4Local;

impl KeyEncoding for LocalKey {
    const VERSION: Version = Version::V4;
    const ROLE: KeyRole = KeyRole::Local;

    fn decode(bytes: &[u8]) -> Result<Self, PasetoError> {
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| PasetoError::InvalidKey("v4 local keys must be 32 bytes".into()))?;
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

    fn keys(&self, nonce: &[u8; 32]) -> Result<(XChaCha20, Blake2bMac<U32>), PasetoError> {
        let mut kdf = <Blake2bMac<U56> as Mac>::new_from_slice(&*self.0)
            .map_err(|_| PasetoError::Backend("invalid BLAKE2b key"))?;
        kdf.update(b"paseto-encryption-key");
        kdf.update(nonce);
        let tmp = Zeroizing::new(kdf.finalize().into_bytes().to_vec());
        let (ek, n2) = tmp.split_at(32);

        let mut kdf = <Blake2bMac<U32> as Mac>::new_from_slice(&*self.0)
            .map_err(|_| PasetoError::Backend("invalid BLAKE2b key"))?;
        kdf.update(b"paseto-auth-key-for-aead");
        kdf.update(nonce);
        let ak = Zeroizing::new(kdf.finalize().into_bytes().to_vec());

        let cipher = XChaCha20::new_from_slices(ek, n2)
            .map_err(|_| PasetoError::Backend("invalid XChaCha20 key"))?;
        let mac = <Blake2bMac<U32> as Mac>::new_from_slice(&ak)
            .map_err(|_| PasetoError::Backend("invalid BLAKE2b key"))?;
        Ok((cipher, mac))
    }
}

impl Construction for V4Local {
    fn header(&self) -> Header {
        HEADER
    }

    fn nonce_len(&self) -> usize {
        32
    }

    fn seal(
        &self,
        key: &Key,
        nonce: &[u8],
        payload: &[u8],
        footer: &[u8],
        assertion: &[u8],
    ) -> Result<Vec<u8>, PasetoError> {
        let key = LocalKey::from_key(key)?;
        let nonce: &[u8; 32] = nonce
            .try_into()
            .map_err(|_| PasetoError::Usage("v4.local needs a 32 byte nonce".into()))?;

        let mut body = Vec::with_capacity(32 + payload.len() + 32);
        body.extend_from_slice(nonce);
        body.extend_from_slice(payload);

        let (mut cipher, mut mac) = key.keys(nonce)?;
        cipher.apply_keystream(&mut body[32..]);
        preauth_local(&mut mac, nonce, &body[32..], footer, assertion)?;
        body.extend_from_slice(&mac.finalize().into_bytes());

        Ok(body)
    }

    fn unseal(
        &self,
        key: &Key,
        body: &[u8],
        footer: &[u8],
        assertion: &[u8],
    ) -> Result<Vec<u8>, PasetoError> {
        let key = LocalKey::from_key(key)?;

        let (ciphertext, tag) = body
            .split_last_chunk::<32>()
            .ok_or(PasetoError::Invalid("token is too short"))?;
        let (nonce, ciphertext) = ciphertext
            .split_first_chunk::<32>()
            .ok_or(PasetoError::Invalid("token is too short"))?;

        let (mut cipher, mut mac) = key.keys(nonce)?;
        preauth_local(&mut mac, nonce, ciphertext, footer, assertion)?;
        mac.verify_slice(tag)
            .map_err(|_| PasetoError::DecryptionFailed)?;

        let mut payload = ciphertext.to_vec();
        cipher.apply_keystream(&mut payload);
        Ok(payload)
    }
}

fn preauth_local(
    mac: &mut Blake2bMac<U32>,
    nonce: &[u8],
    ciphertext: &[u8],
    footer: &[u8],
    assertion: &[u8],
) -> Result<(), PasetoError> {
    pre_auth_encode(
        [
            &[HEADER.as_str().as_bytes()],
            &[nonce],
            &[ciphertext],
            &[footer],
            &[assertion],
        ],
        PreAuthEncodeDigest(mac),
    )
}
