use jiff::Timestamp;
use paseto_core::PasetoError;
use serde::Deserialize;
use serde_json::Value;

use crate::{Assertion, ClaimsSet, Footer, parse_duration};

/// Options for producing a token.
///
/// Durations are human readable spans, see [`parse_duration`].
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProduceOptions {
    /// Sets the `aud` claim.
    pub audience: Option<String>,
    /// Sets `exp` to `now + expires_in`.
    pub expires_in: Option<String>,
    pub footer: Option<Footer>,
    /// Sets `iat` to `now`. Defaults to `true`.
    pub iat: bool,
    /// Sets the `iss` claim.
    pub issuer: Option<String>,
    /// Sets the `jti` claim.
    pub jti: Option<String>,
    /// Sets the `kid` claim.
    pub kid: Option<String>,
    /// Sets `nbf` to `now + not_before`.
    pub not_before: Option<String>,
    /// Defaults to the current time.
    pub now: Option<Timestamp>,
    /// Sets the `sub` claim.
    pub subject: Option<String>,
    pub assertion: Option<Assertion>,
}

impl Default for ProduceOptions {
    fn default() -> Self {
        Self {
            audience: None,
            expires_in: None,
            footer: None,
            iat: true,
            issuer: None,
            jti: None,
            kid: None,
            not_before: None,
            now: None,
            subject: None,
            assertion: None,
        }
    }
}

impl ProduceOptions {
    /// Whether any option would write into the claims set.
    ///
    /// `footer` and `assertion` are not claims.
    pub fn has_claim_options(&self) -> bool {
        self.audience.is_some()
            || self.expires_in.is_some()
            || !self.iat
            || self.issuer.is_some()
            || self.jti.is_some()
            || self.kid.is_some()
            || self.not_before.is_some()
            || self.now.is_some()
            || self.subject.is_some()
    }

    /// Overlay the options onto a copy of `claims`.
    ///
    /// Option values overwrite claims of the same name.
    pub fn apply(&self, claims: &ClaimsSet) -> Result<ClaimsSet, PasetoError> {
        let now = self.now.unwrap_or_else(Timestamp::now);

        // parse everything before touching the claims
        let exp = self
            .expires_in
            .as_deref()
            .map(|span| offset(now, span))
            .transpose()?;
        let nbf = self
            .not_before
            .as_deref()
            .map(|span| offset(now, span))
            .transpose()?;

        let mut claims = claims.clone();
        if self.iat {
            claims.insert("iat".to_owned(), render(now));
        }
        if let Some(exp) = exp {
            claims.insert("exp".to_owned(), render(exp));
        }
        if let Some(nbf) = nbf {
            claims.insert("nbf".to_owned(), render(nbf));
        }

        let strings = [
            ("aud", &self.audience),
            ("iss", &self.issuer),
            ("sub", &self.subject),
            ("kid", &self.kid),
            ("jti", &self.jti),
        ];
        for (claim, value) in strings {
            if let Some(value) = value {
                claims.insert(claim.to_owned(), Value::String(value.clone()));
            }
        }

        Ok(claims)
    }
}

fn offset(now: Timestamp, span: &str) -> Result<Timestamp, PasetoError> {
    let ms = parse_duration(span)?;
    now.checked_add(jiff::SignedDuration::from_millis(ms))
        .map_err(|_| PasetoError::Usage(format!("time span {span:?} is out of range").into()))
}

/// RFC 3339 in UTC with millisecond precision, eg `2019-01-01T00:00:00.000Z`.
fn render(ts: Timestamp) -> Value {
    Value::String(format!("{ts:.3}"))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use paseto_core::PasetoError;
    use serde_json::json;

    use super::ProduceOptions;
    use crate::ClaimsSet;

    fn now() -> Timestamp {
        "2024-02-29T12:00:00Z".parse().unwrap()
    }

    fn claims(value: serde_json::Value) -> ClaimsSet {
        match value {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn defaults_add_iat() {
        let options = ProduceOptions {
            now: Some(now()),
            ..Default::default()
        };
        let out = options.apply(&ClaimsSet::new()).unwrap();
        assert_eq!(out["iat"], "2024-02-29T12:00:00.000Z");
    }

    #[test]
    fn overlay() {
        let options = ProduceOptions {
            audience: Some("aud".into()),
            expires_in: Some("2h".into()),
            iat: false,
            issuer: Some("iss".into()),
            jti: Some("jti".into()),
            kid: Some("kid".into()),
            not_before: Some("1.5 s".into()),
            now: Some(now()),
            subject: Some("sub".into()),
            ..Default::default()
        };

        let input = claims(json!({ "sub": "original", "data": true }));
        let out = options.apply(&input).unwrap();

        assert_eq!(
            serde_json::Value::Object(out),
            json!({
                "sub": "sub",
                "data": true,
                "exp": "2024-02-29T14:00:00.000Z",
                "nbf": "2024-02-29T12:00:01.500Z",
                "aud": "aud",
                "iss": "iss",
                "kid": "kid",
                "jti": "jti",
            })
        );
        // the caller's claims are untouched
        assert_eq!(input["sub"], "original");
    }

    #[test]
    fn bad_span_is_a_usage_error() {
        let options = ProduceOptions {
            expires_in: Some("soon".into()),
            ..Default::default()
        };
        assert!(matches!(
            options.apply(&ClaimsSet::new()),
            Err(PasetoError::Usage(_))
        ));
    }

    #[test]
    fn deserialize_from_config() {
        let options: ProduceOptions = serde_json::from_value(json!({
            "expiresIn": "1 day",
            "footer": { "kid": "a" },
            "assertion": "bound",
        }))
        .unwrap();
        assert!(options.iat);
        assert_eq!(options.expires_in.as_deref(), Some("1 day"));
        assert!(options.has_claim_options());
        assert_eq!(options.footer.unwrap().to_bytes().unwrap(), br#"{"kid":"a"}"#);

        let options: ProduceOptions = serde_json::from_value(json!({ "footer": "f" })).unwrap();
        assert!(!options.has_claim_options());
    }
}
