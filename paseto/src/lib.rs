//! PASETO: Platform-Agnostic SEcurity TOkens.
//!
//! Seal and unseal tokens for every version and purpose, import and generate
//! keys, and produce or consume JSON claims.
//!
//! ```
//! use paseto::{ConsumeOptions, Paseto, ProduceOptions, Protocol, Version, generate_key};
//!
//! let key = generate_key(Protocol::V4Local).unwrap();
//! let engine = Paseto::new();
//!
//! let mut claims = paseto::ClaimsSet::new();
//! claims.insert("sub".into(), "conradludgate".into());
//!
//! let options = ProduceOptions {
//!     expires_in: Some("2h".into()),
//!     ..Default::default()
//! };
//! let token = engine
//!     .encrypt(Version::V4, &claims, key.sealing_key(), &options)
//!     .unwrap();
//!
//! let consumed = engine
//!     .decrypt(Version::V4, &token, key.unsealing_key(), &ConsumeOptions::default())
//!     .unwrap();
//! assert_eq!(consumed.claims().unwrap()["sub"], "conradludgate");
//! ```
//!
//! Cryptography runs on an [`Executor`](backend::Executor). By default that is
//! the calling thread; use [`Paseto::builder`] for a worker pool.

#![forbid(unsafe_code)]

mod claims;
mod decode;
mod engine;
mod keys;
mod protocol;

pub use claims::{Complete, Consumed, Contents, Payload};
pub use decode::{Decoded, decode};
pub use engine::{Builder, Paseto, Unsealed};
pub use keys::{GeneratedKey, bytes_to_key_object, generate_key, key_object_to_bytes, parse_key};
pub use protocol::Protocol;

pub use paseto_core::key::{Key, KeyInput, KeyRole};
pub use paseto_core::pae::pae;
pub use paseto_core::tokens::Token;
pub use paseto_core::version::{Purpose, Version};
pub use paseto_core::{ClaimReason, PasetoError, backend};
pub use paseto_json::{
    Assertion, ClaimsSet, ConsumeOptions, Footer, ProduceOptions, jiff, parse_duration,
};
