//! Producing and consuming tokens with JSON claims.

use paseto_core::PasetoError;
use paseto_core::key::Key;
use paseto_core::rand_core::{OsRng, TryCryptoRng};
use paseto_core::validation::Validate;
use paseto_core::version::{Purpose, Version};
use paseto_json::{ClaimsSet, ConsumeOptions, ProduceOptions, encode_payload, parse_payload};

use crate::{Paseto, Protocol};

/// The payload of a token to produce.
#[derive(Clone, Copy, Debug)]
pub enum Payload<'a> {
    /// Serialized as JSON after the produce options are applied.
    Claims(&'a ClaimsSet),
    /// Sealed as is. Claim options cannot be combined with raw bytes.
    Bytes(&'a [u8]),
}

impl<'a> From<&'a ClaimsSet> for Payload<'a> {
    fn from(value: &'a ClaimsSet) -> Self {
        Payload::Claims(value)
    }
}

impl<'a> From<&'a [u8]> for Payload<'a> {
    fn from(value: &'a [u8]) -> Self {
        Payload::Bytes(value)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Payload<'a> {
    fn from(value: &'a [u8; N]) -> Self {
        Payload::Bytes(value)
    }
}

impl<'a> From<&'a Vec<u8>> for Payload<'a> {
    fn from(value: &'a Vec<u8>) -> Self {
        Payload::Bytes(value)
    }
}

/// A verified payload.
#[derive(Clone, Debug, PartialEq)]
pub enum Contents {
    /// The validated claims set.
    Claims(ClaimsSet),
    /// The raw payload, when consumed with `buffer`.
    Bytes(Vec<u8>),
}

/// Everything learned from a verified token, when consumed with `complete`.
#[derive(Clone, Debug, PartialEq)]
pub struct Complete {
    pub payload: Contents,
    /// `None` when the token had no footer.
    pub footer: Option<Vec<u8>>,
    pub version: Version,
    pub purpose: Purpose,
}

/// The result of decrypting or verifying a token.
#[derive(Clone, Debug, PartialEq)]
pub enum Consumed {
    Claims(ClaimsSet),
    Bytes(Vec<u8>),
    Complete(Complete),
}

impl Consumed {
    pub fn claims(&self) -> Option<&ClaimsSet> {
        match self {
            Consumed::Claims(claims)
            | Consumed::Complete(Complete {
                payload: Contents::Claims(claims),
                ..
            }) => Some(claims),
            _ => None,
        }
    }

    pub fn into_claims(self) -> Option<ClaimsSet> {
        match self {
            Consumed::Claims(claims)
            | Consumed::Complete(Complete {
                payload: Contents::Claims(claims),
                ..
            }) => Some(claims),
            _ => None,
        }
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            Consumed::Bytes(bytes)
            | Consumed::Complete(Complete {
                payload: Contents::Bytes(bytes),
                ..
            }) => Some(bytes),
            _ => None,
        }
    }

    pub fn footer(&self) -> Option<&[u8]> {
        match self {
            Consumed::Complete(complete) => complete.footer.as_deref(),
            _ => None,
        }
    }
}

impl Paseto {
    /// Produce a `local` token.
    pub fn encrypt<'a>(
        &self,
        version: Version,
        payload: impl Into<Payload<'a>>,
        key: &Key,
        options: &ProduceOptions,
    ) -> Result<String, PasetoError> {
        self.encrypt_with_rng(version, payload, key, options, &mut OsRng)
    }

    pub fn encrypt_with_rng<'a, R: TryCryptoRng>(
        &self,
        version: Version,
        payload: impl Into<Payload<'a>>,
        key: &Key,
        options: &ProduceOptions,
        rng: &mut R,
    ) -> Result<String, PasetoError> {
        let protocol = Protocol::new(version, Purpose::Local);
        self.produce(protocol, payload.into(), key, options, rng)
    }

    /// Produce a `public` token.
    pub fn sign<'a>(
        &self,
        version: Version,
        payload: impl Into<Payload<'a>>,
        key: &Key,
        options: &ProduceOptions,
    ) -> Result<String, PasetoError> {
        self.sign_with_rng(version, payload, key, options, &mut OsRng)
    }

    pub fn sign_with_rng<'a, R: TryCryptoRng>(
        &self,
        version: Version,
        payload: impl Into<Payload<'a>>,
        key: &Key,
        options: &ProduceOptions,
        rng: &mut R,
    ) -> Result<String, PasetoError> {
        let protocol = Protocol::new(version, Purpose::Public);
        self.produce(protocol, payload.into(), key, options, rng)
    }

    /// Decrypt a `local` token and validate its claims.
    pub fn decrypt(
        &self,
        version: Version,
        token: &str,
        key: &Key,
        options: &ConsumeOptions,
    ) -> Result<Consumed, PasetoError> {
        self.consume(Protocol::new(version, Purpose::Local), token, key, options)
    }

    /// Verify a `public` token and validate its claims.
    pub fn verify(
        &self,
        version: Version,
        token: &str,
        key: &Key,
        options: &ConsumeOptions,
    ) -> Result<Consumed, PasetoError> {
        self.consume(Protocol::new(version, Purpose::Public), token, key, options)
    }

    fn produce<R: TryCryptoRng>(
        &self,
        protocol: Protocol,
        payload: Payload<'_>,
        key: &Key,
        options: &ProduceOptions,
        rng: &mut R,
    ) -> Result<String, PasetoError> {
        let message = match payload {
            Payload::Claims(claims) => encode_payload(&options.apply(claims)?)?,
            Payload::Bytes(_) if options.has_claim_options() => {
                return Err(PasetoError::Usage(
                    "claim options cannot be used with a byte payload".into(),
                ));
            }
            Payload::Bytes(bytes) => bytes.to_vec(),
        };

        let footer = options
            .footer
            .as_ref()
            .map(|footer| footer.to_bytes())
            .transpose()?
            .unwrap_or_default();
        let assertion = options
            .assertion
            .as_ref()
            .map(|assertion| assertion.as_bytes())
            .unwrap_or_default();

        self.seal_with_rng(protocol, key, &message, &footer, assertion, rng)
    }

    fn consume(
        &self,
        protocol: Protocol,
        token: &str,
        key: &Key,
        options: &ConsumeOptions,
    ) -> Result<Consumed, PasetoError> {
        if options.buffer && options.has_claim_options() {
            return Err(PasetoError::Usage(
                "claim options cannot be used with buffer".into(),
            ));
        }
        let validator = options.validator()?;
        let assertion = options
            .assertion
            .as_ref()
            .map(|assertion| assertion.as_bytes())
            .unwrap_or_default();

        let unsealed = self.unseal(protocol, key, token, assertion)?;

        let payload = if options.buffer {
            Contents::Bytes(unsealed.payload)
        } else {
            let claims = parse_payload(&unsealed.payload)?;
            validator.validate(&claims).inspect_err(|err| {
                tracing::debug!(%protocol, %err, "claims rejected");
            })?;
            Contents::Claims(claims)
        };

        Ok(match (options.complete, payload) {
            (true, payload) => Consumed::Complete(Complete {
                payload,
                footer: unsealed.footer,
                version: protocol.version(),
                purpose: protocol.purpose(),
            }),
            (false, Contents::Claims(claims)) => Consumed::Claims(claims),
            (false, Contents::Bytes(bytes)) => Consumed::Bytes(bytes),
        })
    }
}
