use libtest_mimic::{Arguments, Failed, Trial};
use paseto::{KeyRole, Paseto, PasetoError, Protocol, Purpose, Version, parse_key};
use paseto_test::{Bool, FakeRng, TestFile, read_test};
use serde::Deserialize;

fn main() {
    paseto_test::init_tracing();
    let args = Arguments::from_args();

    let mut tests = vec![];
    for version in Version::ALL {
        PasetoTest::add_tests(version, &mut tests);
    }

    libtest_mimic::run(&args, tests).exit();
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "kebab-case")]
struct PasetoTest {
    token: String,
    footer: String,
    implicit_assertion: String,
    #[serde(flatten)]
    purpose: PasetoPurpose,
    #[serde(flatten)]
    result: TestResult,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum PasetoPurpose {
    #[serde(rename_all = "kebab-case")]
    Local {
        nonce: String,
        key: String,
        paserk_local: String,
    },
    #[serde(rename_all = "kebab-case")]
    Public {
        public_key: String,
        secret_key: String,
        paserk_public: String,
        paserk_secret: String,
    },
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum TestResult {
    #[serde(rename_all = "kebab-case")]
    Success {
        #[allow(dead_code)]
        expect_fail: Bool<false>,
        payload: String,
    },
    #[serde(rename_all = "kebab-case")]
    Failure {
        #[allow(dead_code)]
        expect_fail: Bool<true>,
        #[allow(dead_code)]
        payload: (),
    },
}

impl PasetoTest {
    fn add_tests(version: Version, tests: &mut Vec<Trial>) {
        let test_file: TestFile<Self> = read_test(&format!("{version}.json"));
        for test in test_file.tests {
            let name = format!("{version}::{}", test.name);
            tests.push(Trial::test(name, move || test.test_data.test(version, &test.name)));
        }
    }

    fn test(self, version: Version, name: &str) -> Result<(), Failed> {
        if let TestResult::Failure { .. } = self.result {
            return self.test_failure(version);
        }
        let TestResult::Success { payload, .. } = self.result else {
            unreachable!()
        };
        let payload = payload.as_bytes();

        let engine = Paseto::new();
        let assertion = self.implicit_assertion.as_bytes();

        match self.purpose {
            PasetoPurpose::Local {
                nonce,
                key,
                paserk_local,
            } => {
                let protocol = Protocol::new(version, Purpose::Local);
                let key = parse_key(protocol, KeyRole::Local, &hex::decode(key)?)?;
                assert_eq!(key.to_string(), paserk_local);
                let from_paserk = parse_key(protocol, KeyRole::Local, &paserk_local)?;
                assert_eq!(from_paserk.expose_bytes(), key.expose_bytes());

                let unsealed = engine.unseal(protocol, &key, &self.token, assertion)?;
                assert_eq!(unsealed.payload, payload);
                assert_eq!(unsealed.footer.unwrap_or_default(), self.footer.as_bytes());

                let mut rng = FakeRng::new(hex::decode(nonce)?);
                let token = engine.seal_with_rng(
                    protocol,
                    &key,
                    payload,
                    self.footer.as_bytes(),
                    assertion,
                    &mut rng,
                )?;
                assert_eq!(token, self.token);
                assert_eq!(rng.remaining(), 0);
            }
            PasetoPurpose::Public {
                public_key,
                secret_key,
                paserk_public,
                paserk_secret,
            } => {
                let protocol = Protocol::new(version, Purpose::Public);
                let public_key = parse_key(protocol, KeyRole::Public, &hex::decode(public_key)?)?;
                let secret_key = parse_key(protocol, KeyRole::Secret, &hex::decode(secret_key)?)?;
                assert_eq!(public_key.to_string(), paserk_public);
                assert_eq!(secret_key.to_string(), paserk_secret);

                let unsealed = engine.unseal(protocol, &public_key, &self.token, assertion)?;
                assert_eq!(unsealed.payload, payload);
                assert_eq!(unsealed.footer.unwrap_or_default(), self.footer.as_bytes());

                let token = engine.seal(
                    protocol,
                    &secret_key,
                    payload,
                    self.footer.as_bytes(),
                    assertion,
                )?;

                // RSA-PSS and ECDSA signatures here are randomized
                match version {
                    Version::V1 | Version::V3 => {
                        let unsealed = engine.unseal(protocol, &public_key, &token, assertion)?;
                        assert_eq!(unsealed.payload, payload);
                    }
                    Version::V2 | Version::V4 => assert_eq!(token, self.token, "{name}"),
                }
            }
        }

        Ok(())
    }

    fn test_failure(self, version: Version) -> Result<(), Failed> {
        let engine = Paseto::new();
        let assertion = self.implicit_assertion.as_bytes();

        let (protocol, key) = match self.purpose {
            PasetoPurpose::Local { key, .. } => {
                let protocol = Protocol::new(version, Purpose::Local);
                (protocol, parse_key(protocol, KeyRole::Local, &hex::decode(key)?)?)
            }
            PasetoPurpose::Public { public_key, .. } => {
                let protocol = Protocol::new(version, Purpose::Public);
                let key = parse_key(protocol, KeyRole::Public, &hex::decode(public_key)?)?;
                (protocol, key)
            }
        };

        let result = engine.unseal(protocol, &key, &self.token, assertion);
        if assertion.is_empty() || protocol.construction().supports_implicit_assertion() {
            match result {
                Ok(_) => Err("unsealing the token should fail".into()),
                Err(_) => Ok(()),
            }
        } else {
            // v1 and v2 have no implicit assertions at all
            match result {
                Err(PasetoError::Usage(_)) => Ok(()),
                Ok(_) => Err("unsealing the token should fail".into()),
                Err(err) => Err(format!("expected a usage error, got {err}").into()),
            }
        }
    }
}
