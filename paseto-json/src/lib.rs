//! JSON claims sets for PASETO.
//!
//! PASETO payloads are JSON objects. This crate turns a [`ClaimsSet`] plus
//! [`ProduceOptions`] into payload bytes, and checks a decrypted or verified
//! payload against [`ConsumeOptions`].
//!
//! When using a JSON footer, you should be aware of the risks of parsing user provided JSON.
//! <https://github.com/paseto-standard/paseto-spec/blob/master/docs/02-Implementation-Guide/01-Payload-Processing.md#storing-json-in-the-footer>.

#![forbid(unsafe_code)]

mod consume;
mod duration;
mod produce;

pub use jiff;
pub use paseto_core::validation::Validate;

pub use consume::{ConsumeOptions, Expiry, IssuedAt, MaxTokenAge, NotBefore, StringClaim};
pub use duration::parse_duration;
pub use produce::ProduceOptions;

use paseto_core::PasetoError;
use serde::Deserialize;

/// A JSON object, keys kept in insertion order.
pub type ClaimsSet = serde_json::Map<String, serde_json::Value>;

/// Parse a payload, which must be a JSON object.
pub fn parse_payload(payload: &[u8]) -> Result<ClaimsSet, PasetoError> {
    match serde_json::from_slice(payload) {
        Ok(serde_json::Value::Object(claims)) => Ok(claims),
        _ => Err(PasetoError::Invalid("All PASETO payloads MUST be a JSON object")),
    }
}

/// Serialize a claims set compactly.
pub fn encode_payload(claims: &ClaimsSet) -> Result<Vec<u8>, PasetoError> {
    serde_json::to_vec(claims).map_err(|_| PasetoError::Usage("claims cannot be serialized".into()))
}

/// The footer of a token to produce.
///
/// Footers are authenticated but never encrypted.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Footer {
    Text(String),
    /// Serialized compactly.
    Json(ClaimsSet),
    Bytes(Vec<u8>),
}

impl Footer {
    pub fn to_bytes(&self) -> Result<Vec<u8>, PasetoError> {
        match self {
            Footer::Text(text) => Ok(text.as_bytes().to_vec()),
            Footer::Json(claims) => encode_payload(claims),
            Footer::Bytes(bytes) => Ok(bytes.clone()),
        }
    }
}

impl From<&str> for Footer {
    fn from(value: &str) -> Self {
        Footer::Text(value.to_owned())
    }
}

impl From<String> for Footer {
    fn from(value: String) -> Self {
        Footer::Text(value)
    }
}

impl From<ClaimsSet> for Footer {
    fn from(value: ClaimsSet) -> Self {
        Footer::Json(value)
    }
}

impl From<Vec<u8>> for Footer {
    fn from(value: Vec<u8>) -> Self {
        Footer::Bytes(value)
    }
}

impl From<&[u8]> for Footer {
    fn from(value: &[u8]) -> Self {
        Footer::Bytes(value.to_vec())
    }
}

/// An implicit assertion: authenticated, never transmitted.
///
/// Only v3 and v4 support implicit assertions.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Assertion {
    Text(String),
    Bytes(Vec<u8>),
}

impl Assertion {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Assertion::Text(text) => text.as_bytes(),
            Assertion::Bytes(bytes) => bytes,
        }
    }
}

impl From<&str> for Assertion {
    fn from(value: &str) -> Self {
        Assertion::Text(value.to_owned())
    }
}

impl From<String> for Assertion {
    fn from(value: String) -> Self {
        Assertion::Text(value)
    }
}

impl From<Vec<u8>> for Assertion {
    fn from(value: Vec<u8>) -> Self {
        Assertion::Bytes(value)
    }
}

impl From<&[u8]> for Assertion {
    fn from(value: &[u8]) -> Self {
        Assertion::Bytes(value.to_vec())
    }
}
