use cipher::{KeyIvInit, StreamCipher};
use hmac::{Hmac, Mac};
use paseto_core::PasetoError;
use paseto_core::key::{Key, KeyEncoding, KeyRole};
use paseto_core::pae::pre_auth_encode;
use paseto_core::version::{Construction, Header, Purpose, Version};
use sha2::Sha384;
use zeroize::Zeroizing;

use super::{LocalKey, PreAuthEncodeDigest, random_bytes};

const HEADER: Header = Header::new(Version::V3, Purpose::Local);

type Cipher = ctr::Ctr128BE<aes::Aes256>;

/// `v3.local`
#[derive(Clone, Copy, Debug, Default)]
pub struct V3Local;

impl KeyEncoding for LocalKey {
    const VERSION: Version = Version::V3;
    const ROLE: KeyRole = KeyRole::Local;

    fn decode(bytes: &[u8]) -> Result<Self, PasetoError> {
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| PasetoError::InvalidKey("v3 local keys must be 32 bytes".into()))?;
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

    fn keys(&self, nonce: &[u8; 32]) -> Result<(Cipher, Hmac<Sha384>), PasetoError> {
        let tmp = kdf::<48>(&*self.0, b"paseto-encryption-key", nonce)?;
        let (ek, n2) = tmp.split_at(32);
        let ak = kdf::<48>(&*self.0, b"paseto-auth-key-for-aead", nonce)?;

        let cipher = Cipher::new_from_slices(ek, n2)
            .map_err(|_| PasetoError::Backend("invalid AES-256-CTR key"))?;
        let mac = <Hmac<Sha384> as Mac>::new_from_slice(&*ak)
            .map_err(|_| PasetoError::Backend("invalid HMAC key"))?;
        Ok((cipher, mac))
    }
}

fn kdf<const N: usize>(
    key: &[u8],
    sep: &'static [u8],
    nonce: &[u8],
) -> Result<Zeroizing<[u8; N]>, PasetoError> {
    let mut output = Zeroizing::new([0; N]);
    hkdf::Hkdf::<Sha384>::new(None, key)
        .expand_multi_info(&[sep, nonce], &mut *output)
        .map_err(|_| PasetoError::Backend("HKDF output too long"))?;
    Ok(output)
}

impl Construction for V3Local {
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
            .map_err(|_| PasetoError::Usage("v3.local needs a 32 byte nonce".into()))?;

        let mut body = Vec::with_capacity(32 + payload.len() + 48);
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
            .split_last_chunk::<48>()
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
    mac: &mut Hmac<Sha384>,
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
