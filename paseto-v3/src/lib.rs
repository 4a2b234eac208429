//! PASETO v3 (RustCrypto)
//!
//! * `v3.local`: HKDF-SHA384, AES-256-CTR, HMAC-SHA384
//! * `v3.public`: ECDSA over P-384 with SHA-384
//!
//! ```
//! use paseto_core::key::KeyEncoding;
//! use paseto_core::version::Construction;
//! use paseto_v3::{SecretKey, V3Public};
//!
//! let secret_key = SecretKey::random().unwrap();
//! let public_key = secret_key.public_key();
//!
//! let body = V3Public
//!     .seal(&secret_key.to_key(), &[], b"{}", b"", b"{\"kid\":1}")
//!     .unwrap();
//! let payload = V3Public
//!     .unseal(&public_key.to_key(), &body, b"", b"{\"kid\":1}")
//!     .unwrap();
//! assert_eq!(payload, b"{}");
//! ```

#![forbid(unsafe_code)]

/// Low level implementation primitives.
pub mod core;

pub use crate::core::{
    KeyObject, LocalKey, PublicKey, SecretKey, V3Local, V3Public, bytes_to_key_object,
    key_object_to_bytes,
};
pub use paseto_core::PasetoError;
