use cipher::{KeyIvInit, StreamCipher};
use hmac::{Hmac, Mac};
use paseto_core::PasetoError;
use paseto_core::key::{Key, KeyEncoding, KeyRole};
use paseto_core::pae::pre_auth_encode;
use paseto_core::version::{Construction, Header, Purpose, Version};
use sha2::Sha384;
use zeroize::Zeroizing;

use super::{LocalKey, PreAuthEncodeDigest, reject_assertion};

const HEADER: Header = Header::new(Version::V1, Purpose::Local);

type Cipher = ctr::Ctr128BE<aes::Aes256>;

/// `v1.local`
#[derive(Clone, Copy, Debug, Default)]
pub struct V1Local;

impl KeyEncoding for LocalKey {
    const VERSION: Version = Version::V1;
    const ROLE: KeyRole = KeyRole::Local;

    fn decode(bytes: &[u8]) -> Result<Self, PasetoError> {
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| PasetoError::InvalidKey("v1 local keys must be 32 bytes".into()))?;
        Ok(Self(Zeroizing::new(bytes)))
    }

    fn encode(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(self.0.to_vec())
    }
}

impl LocalKey {
    /// Generate a random local key
    pub fn random() -> Result<Self, PasetoError> {
        let mut bytes = Zeroizing::new([0; 32]);
        getrandom::fill(&mut *bytes).map_err(|_| PasetoError::Backend("CSPRNG failure"))?;
        Ok(Self(bytes))
    }

    /// The first half of the nonce salts the key derivation, the second half is the CTR iv.
    fn keys(&self, nonce: &[u8; 32]) -> Result<(Cipher, Hmac<Sha384>), PasetoError> {
        let (salt, iv) = nonce.split_at(16);
        let hkdf = hkdf::Hkdf::<Sha384>::new(Some(salt), &*self.0);

        let mut ek = Zeroizing::new([0; 32]);
        let mut ak = Zeroizing::new([0; 32]);
        hkdf.expand(b"paseto-encryption-key", &mut *ek)
            .and_then(|()| hkdf.expand(b"paseto-auth-key-for-aead", &mut *ak))
            .map_err(|_| PasetoError::Backend("HKDF output too long"))?;

        let cipher = Cipher::new_from_slices(&*ek, iv)
            .map_err(|_| PasetoError::Backend("invalid AES-256-CTR key"))?;
        let mac = <Hmac<Sha384> as Mac>::new_from_slice(&*ak)
            .map_err(|_| PasetoError::Backend("invalid HMAC key"))?;
        Ok((cipher, mac))
    }
}

impl Construction for V1Local {
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
        reject_assertion(assertion)?;
        let key = LocalKey::from_key(key)?;
        if nonce.len() != 32 {
            return Err(PasetoError::Usage("v1.local needs a 32 byte nonce".into()));
        }

        // the nonce actually used is bound to the payload
        let mut n = <Hmac<Sha384> as Mac>::new_from_slice(nonce)
            .map_err(|_| PasetoError::Backend("invalid HMAC key"))?;
        n.update(payload);
        let n = n.finalize().into_bytes();
        let n: &[u8; 32] = n[..32]
            .try_into()
            .map_err(|_| PasetoError::Backend("HMAC output too short"))?;

        let mut body = Vec::with_capacity(32 + payload.len() + 48);
        body.extend_from_slice(n);
        body.extend_from_slice(payload);

        let (mut cipher, mut mac) = key.keys(n)?;
        cipher.apply_keystream(&mut body[32..]);
        preauth_local(&mut mac, n, &body[32..], footer)?;
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
        reject_assertion(assertion)?;
        let key = LocalKey::from_key(key)?;

        let (ciphertext, tag) = body
            .split_last_chunk::<48>()
            .ok_or(PasetoError::Invalid("token is too short"))?;
        let (nonce, ciphertext) = ciphertext
            .split_first_chunk::<32>()
            .ok_or(PasetoError::Invalid("token is too short"))?;

        let (mut cipher, mut mac) = key.keys(nonce)?;
        preauth_local(&mut mac, nonce, ciphertext, footer)?;
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
) -> Result<(), PasetoError> {
    pre_auth_encode(
        [
            &[HEADER.as_str().as_bytes()],
            &[nonce],
            &[ciphertext],
            &[footer],
        ],
        PreAuthEncodeDigest(mac),
    )
}
