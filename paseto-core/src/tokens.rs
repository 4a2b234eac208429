//! The PASETO wire format.
//!
//! `v<N>.<purpose>.<base64url(body)>[.<base64url(footer)>]`

use core::fmt;
use core::str::FromStr;

use crate::PasetoError;
use crate::version::Header;

/// A token split into its parts.
///
/// Nothing in here has been authenticated. The footer in particular should
/// only be trusted after the token has been unsealed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub header: Header,
    /// `nonce || ciphertext || tag` for local tokens, `payload || signature` for public tokens.
    pub body: Vec<u8>,
    /// Empty when the token has no footer segment.
    pub footer: Vec<u8>,
}

impl Token {
    /// Parse a token that must carry the given header.
    ///
    /// A token for any other version or purpose is rejected as
    /// [`Invalid`](PasetoError::Invalid) before its body is even decoded.
    pub fn parse_as(s: &str, header: Header) -> Result<Self, PasetoError> {
        let rest = s
            .strip_prefix(header.as_str())
            .ok_or(PasetoError::Invalid("token header does not match"))?;
        let (body, footer) = split_segments(rest)?;
        Ok(Self {
            header,
            body: crate::base64::decode(body)?,
            footer: footer.map(crate::base64::decode).transpose()?.unwrap_or_default(),
        })
    }
}

fn split_segments(s: &str) -> Result<(&str, Option<&str>), PasetoError> {
    let mut segments = s.split('.');
    let body = segments.next().unwrap_or_default();
    let footer = segments.next();

    if segments.next().is_some() {
        return Err(PasetoError::Invalid("token has too many segments"));
    }
    if footer == Some("") {
        return Err(PasetoError::Invalid("token has an empty footer segment"));
    }
    Ok((body, footer))
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header.as_str())?;
        f.write_str(&crate::base64::encode(&self.body))?;

        if !self.footer.is_empty() {
            f.write_str(".")?;
            f.write_str(&crate::base64::encode(&self.footer))?;
        }

        Ok(())
    }
}

/// Parse a token of any version and purpose.
///
/// Fails with [`Invalid`](PasetoError::Invalid) if the token does not have 3 or 4
/// segments, and [`NotSupported`](PasetoError::NotSupported) if the version or
/// purpose is unknown.
impl FromStr for Token {
    type Err = PasetoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments = s.split('.').count();
        if !(3..=4).contains(&segments) {
            return Err(PasetoError::Invalid("token must have 3 or 4 segments"));
        }

        let mut parts = s.splitn(3, '.');
        let version = parts.next().unwrap_or_default().parse()?;
        let purpose = parts.next().unwrap_or_default().parse()?;

        Self::parse_as(s, Header::new(version, purpose))
    }
}

#[cfg(feature = "serde")]
crate::serde_str!(
    impl Token {
        fn expecting() { "a PASETO token" }
    }
);

#[cfg(test)]
mod tests {
    use super::Token;
    use crate::PasetoError;
    use crate::version::{Header, Purpose, Version};

    const V4_LOCAL: Header = Header::new(Version::V4, Purpose::Local);

    #[test]
    fn round_trip() {
        let token = Token {
            header: V4_LOCAL,
            body: b"body".to_vec(),
            footer: vec![],
        };
        let s = token.to_string();
        assert_eq!(s, "v4.local.Ym9keQ");
        assert_eq!(s.parse::<Token>().unwrap(), token);

        let token = Token {
            header: Header::new(Version::V2, Purpose::Public),
            body: b"body".to_vec(),
            footer: b"{\"kid\":1}".to_vec(),
        };
        let s = token.to_string();
        assert_eq!(s, "v2.public.Ym9keQ.eyJraWQiOjF9");
        assert_eq!(s.parse::<Token>().unwrap(), token);
    }

    #[test]
    fn segment_count() {
        for s in ["v4.local", "v4", "", "v4.local.Ym9keQ.Zm9v.YmFy"] {
            assert!(
                matches!(s.parse::<Token>(), Err(PasetoError::Invalid(_))),
                "{s:?}"
            );
        }
        assert!(Token::parse_as("v4.local.Ym9keQ.Zm9v.YmFy", V4_LOCAL).is_err());
    }

    #[test]
    fn empty_footer_segment() {
        assert!(matches!(
            "v4.local.Ym9keQ.".parse::<Token>(),
            Err(PasetoError::Invalid(_))
        ));
    }

    #[test]
    fn unknown_version_or_purpose() {
        assert!(matches!(
            "v5.local.Ym9keQ".parse::<Token>(),
            Err(PasetoError::NotSupported(_))
        ));
        assert!(matches!(
            "v4.secret.Ym9keQ".parse::<Token>(),
            Err(PasetoError::NotSupported(_))
        ));
    }

    #[test]
    fn header_mismatch() {
        let err = Token::parse_as("v2.local.Ym9keQ", Header::new(Version::V1, Purpose::Local))
            .unwrap_err();
        assert!(matches!(err, PasetoError::Invalid(_)));

        let err = Token::parse_as("v4.public.Ym9keQ", V4_LOCAL).unwrap_err();
        assert!(matches!(err, PasetoError::Invalid(_)));
    }

    #[test]
    fn bad_base64() {
        assert!(matches!(
            Token::parse_as("v4.local.Ym9ke+", V4_LOCAL),
            Err(PasetoError::Invalid(_))
        ));
        assert!(matches!(
            Token::parse_as("v4.local.Ym9keQ.Zm9v=", V4_LOCAL),
            Err(PasetoError::Invalid(_))
        ));
    }
}
