use jiff::civil::Date;
use jiff::tz::TimeZone;
use jiff::{SignedDuration, Timestamp};
use paseto_core::validation::Validate;
use paseto_core::{ClaimReason, PasetoError};
use serde::Deserialize;
use serde_json::Value;

use crate::{Assertion, ClaimsSet, parse_duration};

/// Options for consuming a token.
///
/// Durations are human readable spans, see [`parse_duration`].
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConsumeOptions {
    /// Expected `aud` claim.
    pub audience: Option<String>,
    /// Loosens the `iat`, `nbf`, `exp` and max age checks.
    pub clock_tolerance: Option<String>,
    /// Return the footer, version and purpose alongside the payload.
    pub complete: bool,
    pub ignore_exp: bool,
    pub ignore_iat: bool,
    pub ignore_nbf: bool,
    /// Expected `iss` claim.
    pub issuer: Option<String>,
    /// Require an `iat` claim no older than this.
    pub max_token_age: Option<String>,
    /// Defaults to the current time.
    pub now: Option<Timestamp>,
    /// Expected `sub` claim.
    pub subject: Option<String>,
    pub assertion: Option<Assertion>,
    /// Return the raw payload bytes without parsing or validating claims.
    pub buffer: bool,
}

impl ConsumeOptions {
    /// Whether any claim validation option is set.
    ///
    /// `complete`, `buffer` and `assertion` are not claim options.
    pub fn has_claim_options(&self) -> bool {
        self.audience.is_some()
            || self.clock_tolerance.is_some()
            || self.ignore_exp
            || self.ignore_iat
            || self.ignore_nbf
            || self.issuer.is_some()
            || self.max_token_age.is_some()
            || self.now.is_some()
            || self.subject.is_some()
    }

    /// Build the claims validator.
    ///
    /// Claims are checked in a fixed order (`iss`, `sub`, `aud`, `iat`, `nbf`,
    /// `exp`, max token age, then the types of `jti` and `kid`) and the first
    /// failure is returned.
    pub fn validator(&self) -> Result<impl Validate<Claims = ClaimsSet> + '_, PasetoError> {
        let now = self.now.unwrap_or_else(Timestamp::now);
        let tolerance = self
            .clock_tolerance
            .as_deref()
            .map(parse_duration)
            .transpose()?
            .map_or(SignedDuration::ZERO, SignedDuration::from_millis);
        let max_age = self
            .max_token_age
            .as_deref()
            .map(parse_duration)
            .transpose()?
            .map(SignedDuration::from_millis);

        Ok(StringClaim::expect("iss", self.issuer.as_deref())
            .then(StringClaim::expect("sub", self.subject.as_deref()))
            .then(StringClaim::expect("aud", self.audience.as_deref()))
            .then(IssuedAt {
                now,
                tolerance,
                ignore: self.ignore_iat,
            })
            .then(NotBefore {
                now,
                tolerance,
                ignore: self.ignore_nbf,
            })
            .then(Expiry {
                now,
                tolerance,
                ignore: self.ignore_exp,
            })
            .then(max_age.map(|max_age| MaxTokenAge {
                now,
                tolerance,
                max_age,
            }))
            .then(StringClaim::expect("jti", None))
            .then(StringClaim::expect("kid", None)))
    }
}

/// A claim that must be a string when present, and equal `expected` when set.
pub struct StringClaim<'a> {
    pub claim: &'static str,
    pub expected: Option<&'a str>,
}

impl<'a> StringClaim<'a> {
    pub fn expect(claim: &'static str, expected: Option<&'a str>) -> Self {
        Self { claim, expected }
    }
}

impl Validate for StringClaim<'_> {
    type Claims = ClaimsSet;

    fn validate(&self, claims: &ClaimsSet) -> Result<(), PasetoError> {
        let value = match claims.get(self.claim) {
            None => None,
            Some(Value::String(s)) => Some(s.as_str()),
            Some(_) => return Err(claim_error(self.claim, ClaimReason::InvalidType)),
        };

        match self.expected {
            Some(expected) if value != Some(expected) => {
                Err(claim_error(self.claim, ClaimReason::Mismatch))
            }
            _ => Ok(()),
        }
    }
}

/// `iat` must not be in the future.
pub struct IssuedAt {
    pub now: Timestamp,
    pub tolerance: SignedDuration,
    /// Only skips the time check, the claim must still be well formed.
    pub ignore: bool,
}

impl Validate for IssuedAt {
    type Claims = ClaimsSet;

    fn validate(&self, claims: &ClaimsSet) -> Result<(), PasetoError> {
        if let Some(iat) = timestamp(claims, "iat")?
            && !self.ignore
            && millis(iat) > millis(self.now) + self.tolerance.as_millis()
        {
            return Err(claim_error("iat", ClaimReason::IssuedInFuture));
        }
        Ok(())
    }
}

/// `nbf` must have passed.
pub struct NotBefore {
    pub now: Timestamp,
    pub tolerance: SignedDuration,
    pub ignore: bool,
}

impl Validate for NotBefore {
    type Claims = ClaimsSet;

    fn validate(&self, claims: &ClaimsSet) -> Result<(), PasetoError> {
        if let Some(nbf) = timestamp(claims, "nbf")?
            && !self.ignore
            && millis(nbf) > millis(self.now) + self.tolerance.as_millis()
        {
            return Err(claim_error("nbf", ClaimReason::NotActive));
        }
        Ok(())
    }
}

/// `exp` must be in the future. A token expiring exactly now is expired.
pub struct Expiry {
    pub now: Timestamp,
    pub tolerance: SignedDuration,
    pub ignore: bool,
}

impl Validate for Expiry {
    type Claims = ClaimsSet;

    fn validate(&self, claims: &ClaimsSet) -> Result<(), PasetoError> {
        if let Some(exp) = timestamp(claims, "exp")?
            && !self.ignore
            && millis(exp) <= millis(self.now) - self.tolerance.as_millis()
        {
            return Err(claim_error("exp", ClaimReason::Expired));
        }
        Ok(())
    }
}

/// Requires `iat`, and rejects tokens issued more than `max_age` ago.
///
/// The tolerance extends the allowed age.
pub struct MaxTokenAge {
    pub now: Timestamp,
    pub tolerance: SignedDuration,
    pub max_age: SignedDuration,
}

impl Validate for MaxTokenAge {
    type Claims = ClaimsSet;

    fn validate(&self, claims: &ClaimsSet) -> Result<(), PasetoError> {
        let iat = timestamp(claims, "iat")?.ok_or(claim_error("iat", ClaimReason::Missing))?;
        if millis(iat) + self.max_age.as_millis()
            < millis(self.now) - self.tolerance.as_millis()
        {
            return Err(claim_error("iat", ClaimReason::MaxTokenAgeExceeded));
        }
        Ok(())
    }
}

fn claim_error(claim: &'static str, reason: ClaimReason) -> PasetoError {
    PasetoError::ClaimInvalid { claim, reason }
}

fn millis(ts: Timestamp) -> i128 {
    i128::from(ts.as_millisecond())
}

/// A present temporal claim must be an ISO 8601 string.
///
/// Date-times need an offset. A bare date is midnight UTC.
fn timestamp(claims: &ClaimsSet, claim: &'static str) -> Result<Option<Timestamp>, PasetoError> {
    match claims.get(claim) {
        None => Ok(None),
        Some(Value::String(s)) => parse_timestamp(s)
            .map(Some)
            .ok_or_else(|| claim_error(claim, ClaimReason::InvalidFormat)),
        Some(_) => Err(claim_error(claim, ClaimReason::InvalidType)),
    }
}

fn parse_timestamp(s: &str) -> Option<Timestamp> {
    if let Ok(ts) = s.parse() {
        return Some(ts);
    }
    // `Date` parsing would also accept a date-time and drop the time
    if s.contains(['T', 't', ' ']) {
        return None;
    }
    let date: Date = s.parse().ok()?;
    date.to_zoned(TimeZone::UTC).ok().map(|zdt| zdt.timestamp())
}
