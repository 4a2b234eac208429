mod local;
mod public;

pub use local::V3Local;
pub use public::V3Public;

use p384::ecdsa::{SigningKey, VerifyingKey};
use paseto_core::PasetoError;
use paseto_core::key::KeyEncoding;
use paseto_core::pae::WriteBytes;
use zeroize::Zeroizing;

/// Symmetric key for `v3.local` tokens.
#[derive(Clone)]
pub struct LocalKey(Zeroizing<[u8; 32]>);

/// P-384 signing key for `v3.public` tokens.
#[derive(Clone)]
pub struct SecretKey(SigningKey);

/// P-384 verifying key for `v3.public` tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey(VerifyingKey);

/// Either half of a P-384 key pair.
#[derive(Clone)]
pub enum KeyObject {
    Secret(SecretKey),
    Public(PublicKey),
}

/// Convert raw key bytes into a key object.
///
/// A 48 byte scalar is a secret key. A 49 byte compressed or 97 byte
/// uncompressed SEC1 point is a public key.
pub fn bytes_to_key_object(bytes: &[u8]) -> Result<KeyObject, PasetoError> {
    match bytes.len() {
        48 => SecretKey::decode(bytes).map(KeyObject::Secret),
        49 | 97 => PublicKey::decode(bytes).map(KeyObject::Public),
        _ => Err(PasetoError::InvalidKey(
            "P-384 keys are 48 (secret), 49 or 97 (public) bytes".into(),
        )),
    }
}

/// Public keys always come back compressed.
pub fn key_object_to_bytes(key: &KeyObject) -> Zeroizing<Vec<u8>> {
    match key {
        KeyObject::Secret(key) => key.encode(),
        KeyObject::Public(key) => key.encode(),
    }
}

struct PreAuthEncodeDigest<'a, M: digest::Update>(&'a mut M);

impl<M: digest::Update> WriteBytes for PreAuthEncodeDigest<'_, M> {
    fn write(&mut self, slice: &[u8]) {
        self.0.update(slice)
    }
}

fn random_bytes<const N: usize>() -> Result<Zeroizing<[u8; N]>, PasetoError> {
    let mut bytes = Zeroizing::new([0; N]);
    getrandom::fill(&mut *bytes).map_err(|_| PasetoError::Backend("CSPRNG failure"))?;
    Ok(bytes)
}
