//! PASETO versions and purposes, and the interface each construction implements.

use core::fmt;
use core::str::FromStr;

use crate::PasetoError;
use crate::key::Key;

/// A PASETO protocol version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Version {
    V1,
    V2,
    V3,
    V4,
}

impl Version {
    pub const ALL: [Version; 4] = [Version::V1, Version::V2, Version::V3, Version::V4];

    /// Header for PASETO, eg `"v4"`.
    pub const fn header(self) -> &'static str {
        match self {
            Version::V1 => "v1",
            Version::V2 => "v2",
            Version::V3 => "v3",
            Version::V4 => "v4",
        }
    }

    /// Header for PASERK, eg `"k4"`.
    pub const fn paserk_header(self) -> &'static str {
        match self {
            Version::V1 => "k1",
            Version::V2 => "k2",
            Version::V3 => "k3",
            Version::V4 => "k4",
        }
    }

    /// Only v3 and v4 authenticate an implicit assertion.
    pub const fn supports_implicit_assertion(self) -> bool {
        matches!(self, Version::V3 | Version::V4)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

impl FromStr for Version {
    type Err = PasetoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "v1" => Ok(Version::V1),
            "v2" => Ok(Version::V2),
            "v3" => Ok(Version::V3),
            "v4" => Ok(Version::V4),
            _ => Err(PasetoError::NotSupported("unsupported PASETO version")),
        }
    }
}

/// Whether a token is encrypted or signed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Purpose {
    /// Symmetrically encrypted.
    Local,
    /// Asymmetrically signed, readable by anyone.
    Public,
}

impl Purpose {
    /// `"local"` or `"public"`
    pub const fn header(self) -> &'static str {
        match self {
            Purpose::Local => "local",
            Purpose::Public => "public",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

impl FromStr for Purpose {
    type Err = PasetoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Purpose::Local),
            "public" => Ok(Purpose::Public),
            _ => Err(PasetoError::NotSupported("unsupported PASETO purpose")),
        }
    }
}

/// The `v4.local.` prefix of a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Header {
    pub version: Version,
    pub purpose: Purpose,
}

impl Header {
    pub const fn new(version: Version, purpose: Purpose) -> Self {
        Self { version, purpose }
    }

    /// The header as it is written in a token and authenticated by PAE,
    /// including the trailing `.`.
    pub const fn as_str(self) -> &'static str {
        match (self.version, self.purpose) {
            (Version::V1, Purpose::Local) => "v1.local.",
            (Version::V1, Purpose::Public) => "v1.public.",
            (Version::V2, Purpose::Local) => "v2.local.",
            (Version::V2, Purpose::Public) => "v2.public.",
            (Version::V3, Purpose::Local) => "v3.local.",
            (Version::V3, Purpose::Public) => "v3.public.",
            (Version::V4, Purpose::Local) => "v4.local.",
            (Version::V4, Purpose::Public) => "v4.public.",
        }
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.version, self.purpose)
    }
}

/// One PASETO construction, eg `v4.local`.
///
/// Implementations are stateless. Keys arrive as validated [`Key`]s and are
/// checked against the construction before any cryptography runs.
pub trait Construction: Send + Sync + 'static {
    /// The version and purpose this construction implements.
    fn header(&self) -> Header;

    /// Number of random bytes [`seal`](Construction::seal) expects.
    fn nonce_len(&self) -> usize;

    fn supports_implicit_assertion(&self) -> bool {
        self.header().version.supports_implicit_assertion()
    }

    /// Encrypt or sign the payload, returning the token body
    /// (`nonce || ciphertext || tag` or `payload || signature`).
    ///
    /// `nonce` must be exactly [`nonce_len`](Construction::nonce_len) bytes.
    fn seal(
        &self,
        key: &Key,
        nonce: &[u8],
        payload: &[u8],
        footer: &[u8],
        assertion: &[u8],
    ) -> Result<Vec<u8>, PasetoError>;

    /// Authenticate the token body and return the payload.
    fn unseal(
        &self,
        key: &Key,
        body: &[u8],
        footer: &[u8],
        assertion: &[u8],
    ) -> Result<Vec<u8>, PasetoError>;
}

#[cfg(feature = "serde")]
crate::serde_str!(
    impl Version {
        fn expecting() { "a PASETO version" }
    }
);

#[cfg(feature = "serde")]
crate::serde_str!(
    impl Purpose {
        fn expecting() { "a PASETO purpose" }
    }
);
