mod local;
mod public;

pub use local::V1Local;
pub use public::V1Public;

use paseto_core::PasetoError;
use paseto_core::key::KeyEncoding;
use paseto_core::pae::WriteBytes;
use zeroize::Zeroizing;

/// Symmetric key for `v1.local` tokens.
#[derive(Clone)]
pub struct LocalKey(Zeroizing<[u8; 32]>);

/// RSA-2048 signing key for `v1.public` tokens.
///
/// Keeps its PKCS#1 encoding alongside the parsed key.
#[derive(Clone)]
pub struct SecretKey {
    key: rsa::pss::SigningKey<sha2::Sha384>,
    der: Zeroizing<Vec<u8>>,
}

/// RSA-2048 verifying key for `v1.public` tokens.
#[derive(Clone)]
pub struct PublicKey {
    key: rsa::pss::VerifyingKey<sha2::Sha384>,
    der: Vec<u8>,
}

/// Either half of an RSA key pair.
#[derive(Clone)]
pub enum KeyObject {
    Secret(SecretKey),
    Public(PublicKey),
}

/// Convert PKCS#1 DER into a key object.
///
/// RSA keys have no fixed length, so this tries the private key form first.
pub fn bytes_to_key_object(bytes: &[u8]) -> Result<KeyObject, PasetoError> {
    SecretKey::decode(bytes)
        .map(KeyObject::Secret)
        .or_else(|_| PublicKey::decode(bytes).map(KeyObject::Public))
        .map_err(|_| PasetoError::InvalidKey("not a PKCS#1 RSA-2048 key".into()))
}

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

fn reject_assertion(assertion: &[u8]) -> Result<(), PasetoError> {
    if assertion.is_empty() {
        Ok(())
    } else {
        Err(PasetoError::Usage(
            "v1 does not support implicit assertions".into(),
        ))
    }
}
