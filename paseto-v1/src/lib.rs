//! PASETO v1 (RustCrypto)
//!
//! * `v1.local`: HKDF-SHA384, AES-256-CTR, HMAC-SHA384
//! * `v1.public`: RSASSA-PSS with SHA-384 over 2048 bit keys
//!
//! v1 is a legacy version. Prefer v3 for NIST algorithms and v4 otherwise.

#![forbid(unsafe_code)]

/// Low level implementation primitives.
pub mod core;

pub use crate::core::{
    KeyObject, LocalKey, PublicKey, SecretKey, V1Local, V1Public, bytes_to_key_object,
    key_object_to_bytes,
};
pub use paseto_core::PasetoError;
