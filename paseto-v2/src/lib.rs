//! PASETO v2 (RustCrypto)
//!
//! * `v2.local`: XChaCha20-Poly1305 with a BLAKE2b derived nonce
//! * `v2.public`: Ed25519
//!
//! v2 predates implicit assertions, both constructions reject a non-empty one.
//!
//! ```
//! use paseto_core::key::KeyEncoding;
//! use paseto_core::version::Construction;
//! use paseto_v2::{LocalKey, V2Local};
//!
//! let key = LocalKey::random().unwrap().to_key();
//!
//! let body = V2Local.seal(&key, &[0; 24], b"hello", b"footer", b"").unwrap();
//! let payload = V2Local.unseal(&key, &body, b"footer", b"").unwrap();
//! assert_eq!(payload, b"hello");
//! ```

#![forbid(unsafe_code)]

/// Low level implementation primitives.
pub mod core;

pub use crate::core::{
    KeyObject, LocalKey, PublicKey, SecretKey, V2Local, V2Public, bytes_to_key_object,
    key_object_to_bytes,
};
pub use paseto_core::PasetoError;
