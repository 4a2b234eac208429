mod local;
mod public;

pub use local::V2Local;
pub use public::V2Public;

use paseto_core::PasetoError;
use paseto_core::key::KeyEncoding;
use zeroize::Zeroizing;

/// Symmetric key for `v2.local` tokens.
#[derive(Clone)]
pub struct LocalKey(Zeroizing<[u8; 32]>);

/// Ed25519 signing key for `v2.public` tokens.
#[derive(Clone)]
pub struct SecretKey(ed25519_dalek::SigningKey);

/// Ed25519 verifying key for `v2.public` tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey(ed25519_dalek::VerifyingKey);

/// Either half of an Ed25519 key pair.
#[derive(Clone)]
pub enum KeyObject {
    Secret(SecretKey),
    Public(PublicKey),
}

/// 64 bytes (`seed || public`) is a secret key, 32 bytes a public key.
pub fn bytes_to_key_object(bytes: &[u8]) -> Result<KeyObject, PasetoError> {
    match bytes.len() {
        64 => SecretKey::decode(bytes).map(KeyObject::Secret),
        32 => PublicKey::decode(bytes).map(KeyObject::Public),
        _ => Err(PasetoError::InvalidKey(
            "Ed25519 keys are 64 (secret) or 32 (public) bytes".into(),
        )),
    }
}

pub fn key_object_to_bytes(key: &KeyObject) -> Zeroizing<Vec<u8>> {
    match key {
        KeyObject::Secret(key) => key.encode(),
        KeyObject::Public(key) => key.encode(),
    }
}

fn random_bytes<const N: usize>() -> Result<Zeroizing<[u8; N]>, PasetoError> {
    let mut bytes = Zeroizing::new([0; N]);
    getrandom::fill(&mut *bytes).map_err(|_| PasetoError::Backend("CSPRNG failure"))?;
    Ok(bytes)
}

fn reject_assertion(assertion: &[u8]) -> Result<(), PasetoError> {
    if assertion.is_empty() {
        Ok(())
    } else {
        Err(PasetoError::Usage(
            "v2 does not support implicit assertions".into(),
        ))
    }
}
