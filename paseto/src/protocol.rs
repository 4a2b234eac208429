use std::fmt;
use std::str::FromStr;

use paseto_core::PasetoError;
use paseto_core::version::{Construction, Header, Purpose, Version};

/// One of the eight PASETO constructions.
///
/// Every operation dispatches through this enum, once, to a stateless
/// [`Construction`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Protocol {
    V1Local,
    V1Public,
    V2Local,
    V2Public,
    V3Local,
    V3Public,
    V4Local,
    V4Public,
}

impl Protocol {
    pub const ALL: [Protocol; 8] = [
        Protocol::V1Local,
        Protocol::V1Public,
        Protocol::V2Local,
        Protocol::V2Public,
        Protocol::V3Local,
        Protocol::V3Public,
        Protocol::V4Local,
        Protocol::V4Public,
    ];

    pub const fn new(version: Version, purpose: Purpose) -> Self {
        match (version, purpose) {
            (Version::V1, Purpose::Local) => Protocol::V1Local,
            (Version::V1, Purpose::Public) => Protocol::V1Public,
            (Version::V2, Purpose::Local) => Protocol::V2Local,
            (Version::V2, Purpose::Public) => Protocol::V2Public,
            (Version::V3, Purpose::Local) => Protocol::V3Local,
            (Version::V3, Purpose::Public) => Protocol::V3Public,
            (Version::V4, Purpose::Local) => Protocol::V4Local,
            (Version::V4, Purpose::Public) => Protocol::V4Public,
        }
    }

    pub const fn version(self) -> Version {
        match self {
            Protocol::V1Local | Protocol::V1Public => Version::V1,
            Protocol::V2Local | Protocol::V2Public => Version::V2,
            Protocol::V3Local | Protocol::V3Public => Version::V3,
            Protocol::V4Local | Protocol::V4Public => Version::V4,
        }
    }

    pub const fn purpose(self) -> Purpose {
        match self {
            Protocol::V1Local | Protocol::V2Local | Protocol::V3Local | Protocol::V4Local => {
                Purpose::Local
            }
            Protocol::V1Public | Protocol::V2Public | Protocol::V3Public | Protocol::V4Public => {
                Purpose::Public
            }
        }
    }

    pub const fn header(self) -> Header {
        Header::new(self.version(), self.purpose())
    }

    /// The construction implementing this protocol.
    pub fn construction(self) -> &'static dyn Construction {
        match self {
            Protocol::V1Local => &paseto_v1::V1Local,
            Protocol::V1Public => &paseto_v1::V1Public,
            Protocol::V2Local => &paseto_v2::V2Local,
            Protocol::V2Public => &paseto_v2::V2Public,
            Protocol::V3Local => &paseto_v3::V3Local,
            Protocol::V3Public => &paseto_v3::V3Public,
            Protocol::V4Local => &paseto_v4::V4Local,
            Protocol::V4Public => &paseto_v4::V4Public,
        }
    }

    /// Length of the signature appended to a `public` token's payload.
    pub const fn signature_len(self) -> Option<usize> {
        match self {
            Protocol::V1Public => Some(256),
            Protocol::V3Public => Some(96),
            Protocol::V2Public | Protocol::V4Public => Some(64),
            _ => None,
        }
    }
}

/// eg `v4.local`
impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.header().fmt(f)
    }
}

impl FromStr for Protocol {
    type Err = PasetoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (version, purpose) = s
            .split_once('.')
            .ok_or(PasetoError::NotSupported("unsupported PASETO protocol"))?;
        Ok(Protocol::new(version.parse()?, purpose.parse()?))
    }
}

#[cfg(test)]
mod tests {
    use paseto_core::PasetoError;

    use super::Protocol;

    #[test]
    fn registry_is_consistent() {
        for protocol in Protocol::ALL {
            let construction = protocol.construction();
            assert_eq!(construction.header(), protocol.header());
            assert_eq!(
                Protocol::new(protocol.version(), protocol.purpose()),
                protocol
            );
            assert_eq!(protocol.to_string().parse::<Protocol>().unwrap(), protocol);
        }
    }

    #[test]
    fn nonce_lengths() {
        let lens: Vec<_> = Protocol::ALL
            .iter()
            .map(|p| p.construction().nonce_len())
            .collect();
        assert_eq!(lens, [32, 0, 24, 0, 32, 0, 32, 0]);
    }

    #[test]
    fn implicit_assertions() {
        for protocol in Protocol::ALL {
            let supported = protocol.construction().supports_implicit_assertion();
            assert_eq!(supported, *protocol.to_string() >= *"v3");
        }
    }

    #[test]
    fn unknown() {
        assert!(matches!(
            "v5.local".parse::<Protocol>(),
            Err(PasetoError::NotSupported(_))
        ));
        assert!(matches!(
            "v4.secret".parse::<Protocol>(),
            Err(PasetoError::NotSupported(_))
        ));
        assert!(matches!(
            "v4".parse::<Protocol>(),
            Err(PasetoError::NotSupported(_))
        ));
    }
}
