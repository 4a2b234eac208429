//! Core types and traits for PASETO.
//!
//! This crate holds everything the individual PASETO versions have in common:
//! the pre-authentication encoding, the token and PASERK wire formats, the
//! [`Construction`](version::Construction) interface each version implements,
//! and the executor that runs cryptographic work.
//!
//! It performs no cryptography itself. See `paseto-v1` through `paseto-v4`
//! for the constructions, and the `paseto` crate for the engine tying them together.

use std::borrow::Cow;
use std::fmt;

pub mod backend;
mod base64;
pub mod key;
pub mod pae;
pub mod tokens;
pub mod validation;
pub mod version;

pub use rand_core;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
/// Error returned for all PASETO and PASERK operations that can fail
pub enum PasetoError {
    /// The version or purpose is unknown, or a length cannot be encoded.
    #[error("not supported: {0}")]
    NotSupported(&'static str),
    /// The token was not of a valid form.
    #[error("invalid token: {0}")]
    Invalid(&'static str),
    /// A `local` token could not be authenticated.
    #[error("decryption operation failed")]
    DecryptionFailed,
    /// A `public` token signature did not match.
    #[error("signature verification failed")]
    VerificationFailed,
    /// A registered claim failed validation.
    #[error("invalid `{claim}` claim: {reason}")]
    ClaimInvalid {
        /// Name of the offending claim, eg `exp`.
        claim: &'static str,
        /// Why the claim was rejected.
        reason: ClaimReason,
    },
    /// The key could not be used for this operation.
    #[error("invalid key: {0}")]
    InvalidKey(Cow<'static, str>),
    /// The operation was called with arguments that can never succeed.
    #[error("{0}")]
    Usage(Cow<'static, str>),
    /// The random number generator or the crypto executor failed.
    #[error("crypto backend failure: {0}")]
    Backend(&'static str),
}

impl PasetoError {
    pub(crate) fn invalid_key(msg: impl Into<Cow<'static, str>>) -> Self {
        PasetoError::InvalidKey(msg.into())
    }

    /// The reason code, if this is a claims error.
    pub fn claim_reason(&self) -> Option<ClaimReason> {
        match self {
            PasetoError::ClaimInvalid { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

/// Reason a claim was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ClaimReason {
    InvalidType,
    InvalidFormat,
    Mismatch,
    Missing,
    IssuedInFuture,
    NotActive,
    Expired,
    MaxTokenAgeExceeded,
}

impl ClaimReason {
    /// Stable machine readable code.
    pub const fn code(self) -> &'static str {
        match self {
            ClaimReason::InvalidType => "invalid_type",
            ClaimReason::InvalidFormat => "invalid_format",
            ClaimReason::Mismatch => "mismatch",
            ClaimReason::Missing => "missing",
            ClaimReason::IssuedInFuture => "issued_in_future",
            ClaimReason::NotActive => "not_active",
            ClaimReason::Expired => "expired",
            ClaimReason::MaxTokenAgeExceeded => "max_token_age_exceeded",
        }
    }
}

impl fmt::Display for ClaimReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ClaimReason::InvalidType => "must be a string",
            ClaimReason::InvalidFormat => "must be a valid ISO8601 string",
            ClaimReason::Mismatch => "mismatch",
            ClaimReason::Missing => "is required",
            ClaimReason::IssuedInFuture => "token issued in the future",
            ClaimReason::NotActive => "token is not active yet",
            ClaimReason::Expired => "token is expired",
            ClaimReason::MaxTokenAgeExceeded => "maxTokenAge exceeded",
        })
    }
}

#[cfg(feature = "serde")]
macro_rules! serde_str {
    (
        impl $ty:ty {
            fn expecting() { $($expecting:tt)* }
        }
    ) => {
        impl serde_core::Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde_core::Serializer,
            {
                serializer.collect_str(self)
            }
        }

        impl<'de> serde_core::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde_core::Deserializer<'de>,
            {
                struct FromStrVisitor;
                impl serde_core::de::Visitor<'_> for FromStrVisitor {
                    type Value = $ty;

                    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                        formatter.write_str($($expecting)*)
                    }

                    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
                    where
                        E: serde_core::de::Error,
                    {
                        v.parse().map_err(E::custom)
                    }
                }
                deserializer.deserialize_str(FromStrVisitor)
            }
        }
    };
}

#[cfg(feature = "serde")]
pub(crate) use serde_str;
