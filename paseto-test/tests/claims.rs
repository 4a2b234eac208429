use paseto::jiff::{SignedDuration, Timestamp};
use paseto::{
    ClaimReason, ClaimsSet, ConsumeOptions, Footer, KeyRole, Paseto, PasetoError, ProduceOptions,
    Protocol, Purpose, Version, decode, generate_key, parse_key,
};
use serde_json::json;

fn now() -> Timestamp {
    "2024-02-29T12:00:00Z".parse().unwrap()
}

fn later(ms: i64) -> Timestamp {
    now() + SignedDuration::from_millis(ms)
}

fn claims(value: serde_json::Value) -> ClaimsSet {
    match value {
        serde_json::Value::Object(map) => map,
        _ => unreachable!(),
    }
}

fn reason(err: PasetoError) -> (&'static str, ClaimReason) {
    match err {
        PasetoError::ClaimInvalid { claim, reason } => (claim, reason),
        other => panic!("expected a claims error, got {other:?}"),
    }
}

#[test]
fn produced_claims_are_enforced_for_every_version() {
    let engine = Paseto::new();
    let produce = ProduceOptions {
        audience: Some("urn:example:client".into()),
        expires_in: Some("2 hours".into()),
        issuer: Some("urn:example:issuer".into()),
        not_before: Some("1m".into()),
        now: Some(now()),
        subject: Some("user".into()),
        ..Default::default()
    };

    for version in [Version::V2, Version::V3, Version::V4] {
        let local = generate_key(Protocol::new(version, Purpose::Local)).unwrap();
        let public = generate_key(Protocol::new(version, Purpose::Public)).unwrap();

        let encrypted = engine
            .encrypt(version, &ClaimsSet::new(), local.sealing_key(), &produce)
            .unwrap();
        let signed = engine
            .sign(version, &ClaimsSet::new(), public.sealing_key(), &produce)
            .unwrap();

        let consume = |options: &ConsumeOptions| {
            (
                engine.decrypt(version, &encrypted, local.unsealing_key(), options),
                engine.verify(version, &signed, public.unsealing_key(), options),
            )
        };

        // active between nbf and exp
        let ok = ConsumeOptions {
            audience: Some("urn:example:client".into()),
            issuer: Some("urn:example:issuer".into()),
            subject: Some("user".into()),
            now: Some(later(60_000)),
            ..Default::default()
        };
        let (a, b) = consume(&ok);
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a.claims(), b.claims());
        assert_eq!(a.claims().unwrap()["exp"], "2024-02-29T14:00:00.000Z");

        let early = ConsumeOptions {
            now: Some(later(59_999)),
            ..Default::default()
        };
        let (a, b) = consume(&early);
        assert_eq!(reason(a.unwrap_err()), ("nbf", ClaimReason::NotActive));
        assert_eq!(reason(b.unwrap_err()), ("nbf", ClaimReason::NotActive));

        let expired = ConsumeOptions {
            now: Some(later(2 * 3_600_000)),
            ..Default::default()
        };
        let (a, b) = consume(&expired);
        assert_eq!(reason(a.unwrap_err()), ("exp", ClaimReason::Expired));
        assert_eq!(reason(b.unwrap_err()), ("exp", ClaimReason::Expired));

        let wrong_audience = ConsumeOptions {
            audience: Some("urn:example:other".into()),
            now: Some(later(60_000)),
            ..Default::default()
        };
        let (a, b) = consume(&wrong_audience);
        assert_eq!(reason(a.unwrap_err()), ("aud", ClaimReason::Mismatch));
        assert_eq!(reason(b.unwrap_err()), ("aud", ClaimReason::Mismatch));
    }
}

#[test]
fn first_failure_wins() {
    let engine = Paseto::new();
    let key = parse_key(Protocol::V4Local, KeyRole::Local, &[9u8; 32]).unwrap();
    let payload = claims(json!({
        "iss": "a",
        "sub": "b",
        "aud": "c",
        "iat": "2024-02-29T13:00:00Z",
        "nbf": "2024-02-29T13:00:00Z",
        "exp": "2024-02-29T11:00:00Z",
    }));
    let produce = ProduceOptions {
        iat: false,
        ..Default::default()
    };
    let token = engine.encrypt(Version::V4, &payload, &key, &produce).unwrap();

    let mut options = ConsumeOptions {
        issuer: Some("x".into()),
        subject: Some("x".into()),
        audience: Some("x".into()),
        max_token_age: Some("1s".into()),
        now: Some(now()),
        ..Default::default()
    };
    let mut order = vec![];
    loop {
        match engine.decrypt(Version::V4, &token, &key, &options) {
            Ok(_) => break,
            Err(err) => {
                let (claim, reason) = reason(err);
                order.push(claim);
                match (claim, reason) {
                    ("iss", _) => options.issuer = None,
                    ("sub", _) => options.subject = None,
                    ("aud", _) => options.audience = None,
                    ("iat", ClaimReason::IssuedInFuture) => options.ignore_iat = true,
                    ("nbf", _) => options.ignore_nbf = true,
                    ("exp", _) => options.ignore_exp = true,
                    ("iat", ClaimReason::MaxTokenAgeExceeded) => options.max_token_age = None,
                    other => panic!("unexpected failure {other:?}"),
                }
            }
        }
    }
    // iat is in the future, so it is never too old
    assert_eq!(order, ["iss", "sub", "aud", "iat", "nbf", "exp"]);
}

#[test]
fn max_token_age() {
    let engine = Paseto::new();
    let key = parse_key(Protocol::V3Local, KeyRole::Local, &[9u8; 32]).unwrap();
    let produce = ProduceOptions {
        now: Some(now()),
        ..Default::default()
    };
    let token = engine
        .encrypt(Version::V3, &ClaimsSet::new(), &key, &produce)
        .unwrap();

    let options = |ms, tolerance: Option<&str>| ConsumeOptions {
        max_token_age: Some("1 minute".into()),
        clock_tolerance: tolerance.map(Into::into),
        now: Some(later(ms)),
        ..Default::default()
    };

    engine
        .decrypt(Version::V3, &token, &key, &options(60_000, None))
        .unwrap();
    let err = engine
        .decrypt(Version::V3, &token, &key, &options(60_001, None))
        .unwrap_err();
    assert_eq!(reason(err), ("iat", ClaimReason::MaxTokenAgeExceeded));
    engine
        .decrypt(Version::V3, &token, &key, &options(61_000, Some("1s")))
        .unwrap();

    let no_iat = ProduceOptions {
        iat: false,
        ..Default::default()
    };
    let token = engine
        .encrypt(Version::V3, &ClaimsSet::new(), &key, &no_iat)
        .unwrap();
    let err = engine
        .decrypt(Version::V3, &token, &key, &options(0, None))
        .unwrap_err();
    assert_eq!(reason(err), ("iat", ClaimReason::Missing));
}

#[test]
fn tolerance_only_loosens() {
    let engine = Paseto::new();
    let key = parse_key(Protocol::V4Local, KeyRole::Local, &[9u8; 32]).unwrap();
    let produce = ProduceOptions {
        expires_in: Some("10s".into()),
        not_before: Some("5s".into()),
        now: Some(now()),
        ..Default::default()
    };
    let token = engine
        .encrypt(Version::V4, &ClaimsSet::new(), &key, &produce)
        .unwrap();

    let tolerances = ["0s", "1s", "3s", "6s", "20s", "1h"];
    for offset in (-30..=30).map(|s| s * 1000) {
        let mut passed = false;
        for tolerance in tolerances {
            let options = ConsumeOptions {
                clock_tolerance: Some(tolerance.into()),
                max_token_age: Some("8s".into()),
                now: Some(later(offset)),
                ..Default::default()
            };
            let ok = engine.decrypt(Version::V4, &token, &key, &options).is_ok();
            assert!(
                ok || !passed,
                "offset {offset}ms passed with a smaller tolerance but not with {tolerance}"
            );
            passed |= ok;
        }
    }
}

#[test]
fn json_footers_and_decode() {
    let engine = Paseto::new();
    let pair = generate_key(Protocol::V4Public).unwrap();
    let footer = claims(json!({ "kid": "k4.pid.abc" }));
    let produce = ProduceOptions {
        footer: Some(Footer::Json(footer)),
        ..Default::default()
    };
    let token = engine
        .sign(Version::V4, &claims(json!({ "sub": "a" })), pair.sealing_key(), &produce)
        .unwrap();

    let decoded = decode(&token).unwrap();
    assert_eq!(decoded.footer.as_deref(), Some(&br#"{"kid":"k4.pid.abc"}"#[..]));
    assert_eq!(decoded.payload.unwrap()["sub"], "a");

    let complete = ConsumeOptions {
        complete: true,
        ..Default::default()
    };
    let consumed = engine
        .verify(Version::V4, &token, pair.unsealing_key(), &complete)
        .unwrap();
    assert_eq!(consumed.footer(), Some(&br#"{"kid":"k4.pid.abc"}"#[..]));
}

#[test]
fn options_from_config() {
    let produce: ProduceOptions = serde_json::from_value(json!({
        "expiresIn": "1 week",
        "issuer": "config",
        "now": "2024-02-29T12:00:00Z",
    }))
    .unwrap();
    let consume: ConsumeOptions = serde_json::from_value(json!({
        "issuer": "config",
        "clockTolerance": "30 seconds",
        "now": "2024-03-07T12:00:29Z",
    }))
    .unwrap();

    let engine = Paseto::new();
    let key = parse_key(Protocol::V2Local, KeyRole::Local, &[9u8; 32]).unwrap();
    let token = engine
        .encrypt(Version::V2, &ClaimsSet::new(), &key, &produce)
        .unwrap();
    let consumed = engine.decrypt(Version::V2, &token, &key, &consume).unwrap();
    assert_eq!(consumed.claims().unwrap()["exp"], "2024-03-07T12:00:00.000Z");
}
