use paseto_core::PasetoError;
use paseto_core::tokens::Token;
use paseto_core::version::{Purpose, Version};
use paseto_json::{ClaimsSet, parse_payload};

use crate::Protocol;

/// The unauthenticated contents of a token.
#[derive(Clone, Debug, PartialEq)]
pub struct Decoded {
    pub version: Version,
    pub purpose: Purpose,
    /// `None` when the token had no footer.
    pub footer: Option<Vec<u8>>,
    /// The claims of a `public` token. `local` payloads are encrypted.
    pub payload: Option<ClaimsSet>,
}

/// Read a token without verifying it.
///
/// Nothing returned here can be trusted. Use it to pick a key (eg from a
/// `kid` in the footer), then verify the token properly.
pub fn decode(token: &str) -> Result<Decoded, PasetoError> {
    let Token {
        header,
        body,
        footer,
    } = token.parse()?;
    let protocol = Protocol::new(header.version, header.purpose);

    let payload = match protocol.signature_len() {
        None => None,
        Some(len) => {
            let message = body
                .len()
                .checked_sub(len)
                .map(|end| &body[..end])
                .ok_or(PasetoError::Invalid("token is too short"))?;
            Some(parse_payload(message)?)
        }
    };

    Ok(Decoded {
        version: protocol.version(),
        purpose: protocol.purpose(),
        footer: (!footer.is_empty()).then_some(footer),
        payload,
    })
}
