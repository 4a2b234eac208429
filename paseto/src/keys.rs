//! Key import and generation for every version.

use paseto_core::PasetoError;
use paseto_core::key::{self, Key, KeyEncoding, KeyInput, KeyRole};
use paseto_core::version::{Purpose, Version};
use zeroize::Zeroizing;

use crate::Protocol;

/// Parse key material for the given protocol and role.
///
/// Accepts a PASERK string (`k4.local.…`), the raw PASERK body, or PEM/DER for
/// asymmetric keys. A PASERK for another version or role is rejected.
pub fn parse_key<'a>(
    protocol: Protocol,
    role: KeyRole,
    input: impl Into<KeyInput<'a>>,
) -> Result<Key, PasetoError> {
    if role.purpose() != protocol.purpose() {
        return Err(PasetoError::InvalidKey(
            format!("{protocol} does not use {} keys", role.header().trim_matches('.')).into(),
        ));
    }

    let input = input.into();
    match (protocol.version(), role) {
        (Version::V1, KeyRole::Local) => key::parse::<paseto_v1::LocalKey>(input),
        (Version::V1, KeyRole::Secret) => key::parse::<paseto_v1::SecretKey>(input),
        (Version::V1, KeyRole::Public) => key::parse::<paseto_v1::PublicKey>(input),
        (Version::V2, KeyRole::Local) => key::parse::<paseto_v2::LocalKey>(input),
        (Version::V2, KeyRole::Secret) => key::parse::<paseto_v2::SecretKey>(input),
        (Version::V2, KeyRole::Public) => key::parse::<paseto_v2::PublicKey>(input),
        (Version::V3, KeyRole::Local) => key::parse::<paseto_v3::LocalKey>(input),
        (Version::V3, KeyRole::Secret) => key::parse::<paseto_v3::SecretKey>(input),
        (Version::V3, KeyRole::Public) => key::parse::<paseto_v3::PublicKey>(input),
        (Version::V4, KeyRole::Local) => key::parse::<paseto_v4::LocalKey>(input),
        (Version::V4, KeyRole::Secret) => key::parse::<paseto_v4::SecretKey>(input),
        (Version::V4, KeyRole::Public) => key::parse::<paseto_v4::PublicKey>(input),
    }
}

/// A freshly generated key.
#[derive(Clone, Debug)]
pub enum GeneratedKey {
    Local(Key),
    KeyPair { secret: Key, public: Key },
}

impl GeneratedKey {
    /// The key that seals tokens.
    pub fn sealing_key(&self) -> &Key {
        match self {
            GeneratedKey::Local(key) => key,
            GeneratedKey::KeyPair { secret, .. } => secret,
        }
    }

    /// The key that unseals tokens.
    pub fn unsealing_key(&self) -> &Key {
        match self {
            GeneratedKey::Local(key) => key,
            GeneratedKey::KeyPair { public, .. } => public,
        }
    }
}

/// Generate a key (or key pair) for the protocol using the OS random source.
///
/// v1 key pairs are 2048 bit RSA and take a while to generate.
pub fn generate_key(protocol: Protocol) -> Result<GeneratedKey, PasetoError> {
    let key = match protocol {
        Protocol::V1Local => GeneratedKey::Local(paseto_v1::LocalKey::random()?.to_key()),
        Protocol::V2Local => GeneratedKey::Local(paseto_v2::LocalKey::random()?.to_key()),
        Protocol::V3Local => GeneratedKey::Local(paseto_v3::LocalKey::random()?.to_key()),
        Protocol::V4Local => GeneratedKey::Local(paseto_v4::LocalKey::random()?.to_key()),
        Protocol::V1Public => {
            let secret = paseto_v1::SecretKey::random()?;
            GeneratedKey::KeyPair {
                public: secret.public_key()?.to_key(),
                secret: secret.to_key(),
            }
        }
        Protocol::V2Public => {
            let secret = paseto_v2::SecretKey::random()?;
            GeneratedKey::KeyPair {
                public: secret.public_key().to_key(),
                secret: secret.to_key(),
            }
        }
        Protocol::V3Public => {
            let secret = paseto_v3::SecretKey::random()?;
            GeneratedKey::KeyPair {
                public: secret.public_key().to_key(),
                secret: secret.to_key(),
            }
        }
        Protocol::V4Public => {
            let secret = paseto_v4::SecretKey::random()?;
            GeneratedKey::KeyPair {
                public: secret.public_key().to_key(),
                secret: secret.to_key(),
            }
        }
    };
    tracing::debug!(%protocol, "generated key");
    Ok(key)
}

/// Convert a compact PASERK body into a key, inferring the role from its shape.
///
/// `local` keys have no distinguishing shape and are always parsed with
/// [`parse_key`].
pub fn bytes_to_key_object(version: Version, bytes: &[u8]) -> Result<Key, PasetoError> {
    Ok(match version {
        Version::V1 => match paseto_v1::bytes_to_key_object(bytes)? {
            paseto_v1::KeyObject::Secret(key) => key.to_key(),
            paseto_v1::KeyObject::Public(key) => key.to_key(),
        },
        Version::V2 => match paseto_v2::bytes_to_key_object(bytes)? {
            paseto_v2::KeyObject::Secret(key) => key.to_key(),
            paseto_v2::KeyObject::Public(key) => key.to_key(),
        },
        Version::V3 => match paseto_v3::bytes_to_key_object(bytes)? {
            paseto_v3::KeyObject::Secret(key) => key.to_key(),
            paseto_v3::KeyObject::Public(key) => key.to_key(),
        },
        Version::V4 => match paseto_v4::bytes_to_key_object(bytes)? {
            paseto_v4::KeyObject::Secret(key) => key.to_key(),
            paseto_v4::KeyObject::Public(key) => key.to_key(),
        },
    })
}

/// The compact PASERK body of an asymmetric key.
pub fn key_object_to_bytes(key: &Key) -> Result<Zeroizing<Vec<u8>>, PasetoError> {
    if key.purpose() != Purpose::Public {
        return Err(PasetoError::InvalidKey(
            "only secret and public keys are key objects".into(),
        ));
    }
    Ok(Zeroizing::new(key.expose_bytes().to_vec()))
}
