//! PASETO v4 (RustCrypto)
//!
//! * `v4.local`: BLAKE2b key derivation, XChaCha20, BLAKE2b-MAC
//! * `v4.public`: Ed25519
//!
//! ```
//! use paseto_core::key::KeyEncoding;
//! use paseto_core::version::Construction;
//! use paseto_v4::{SecretKey, V4Public};
//!
//! let secret_key = SecretKey::random().unwrap();
//! let public_key = secret_key.public_key();
//!
//! let body = V4Public
//!     .seal(&secret_key.to_key(), &[], b"{\"sub\":\"conradludgate\"}", b"", b"")
//!     .unwrap();
//! let payload = V4Public
//!     .unseal(&public_key.to_key(), &body, b"", b"")
//!     .unwrap();
//! assert_eq!(payload, b"{\"sub\":\"conradludgate\"}");
//! ```

#![forbid(unsafe_code)]

/// Low level implementation primitives.
pub mod core;

pub use crate::core::{
    KeyObject, LocalKey, PublicKey, SecretKey, V4Local, V4Public, bytes_to_key_object,
    key_object_to_bytes,
};
pub use paseto_core::PasetoError;
