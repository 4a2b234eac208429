//! Sealing and unsealing raw payloads.

use std::sync::Arc;

use paseto_core::PasetoError;
use paseto_core::backend::{Executor, Inline, WorkerPool, submit};
use paseto_core::key::{Key, KeyRole};
use paseto_core::rand_core::{OsRng, TryCryptoRng};
use paseto_core::tokens::Token;
use paseto_core::version::Purpose;

use crate::Protocol;

/// The protocol engine.
///
/// Holds the [`Executor`] every seal and unseal runs on. Cloning is cheap and
/// clones share the executor.
#[derive(Clone)]
pub struct Paseto {
    executor: Arc<dyn Executor>,
}

impl Default for Paseto {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Paseto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paseto").finish_non_exhaustive()
    }
}

/// Builds a [`Paseto`] engine.
#[derive(Default)]
pub struct Builder {
    workers: usize,
    executor: Option<Arc<dyn Executor>>,
}

impl Builder {
    /// Run crypto on a pool of `n` background threads. `0` runs it inline.
    pub fn workers(mut self, n: usize) -> Self {
        self.workers = n;
        self
    }

    /// Run crypto on a caller provided executor. Takes precedence over [`workers`](Self::workers).
    pub fn executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn build(self) -> Result<Paseto, PasetoError> {
        let executor: Arc<dyn Executor> = match (self.executor, self.workers) {
            (Some(executor), _) => executor,
            (None, 0) => Arc::new(Inline),
            (None, n) => Arc::new(WorkerPool::new(n)?),
        };
        Ok(Paseto { executor })
    }
}

/// An authenticated payload and footer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unsealed {
    pub payload: Vec<u8>,
    /// `None` when the token had no footer.
    pub footer: Option<Vec<u8>>,
}

impl Paseto {
    /// An engine running crypto inline on the caller's thread.
    pub fn new() -> Self {
        Self::with_executor(Arc::new(Inline))
    }

    pub fn with_executor(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }

    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Seal `payload` into a token, drawing the nonce from the OS.
    ///
    /// `key` must be a local key for `local` protocols and a secret key for
    /// `public` protocols.
    pub fn seal(
        &self,
        protocol: Protocol,
        key: &Key,
        payload: &[u8],
        footer: &[u8],
        assertion: &[u8],
    ) -> Result<String, PasetoError> {
        self.seal_with_rng(protocol, key, payload, footer, assertion, &mut OsRng)
    }

    /// Seal `payload` into a token, drawing the nonce from `rng`.
    ///
    /// The nonce is read before any crypto runs. `v1.public` signatures use
    /// their own salt from the OS regardless of `rng`.
    pub fn seal_with_rng<R: TryCryptoRng>(
        &self,
        protocol: Protocol,
        key: &Key,
        payload: &[u8],
        footer: &[u8],
        assertion: &[u8],
        rng: &mut R,
    ) -> Result<String, PasetoError> {
        tracing::debug!(
            %protocol,
            payload_len = payload.len(),
            footer_len = footer.len(),
            "sealing token"
        );

        let construction = protocol.construction();
        check_assertion(protocol, assertion)?;
        key.expect(protocol.version(), sealing_role(protocol))?;

        let mut nonce = vec![0; construction.nonce_len()];
        if !nonce.is_empty() {
            rng.try_fill_bytes(&mut nonce)
                .map_err(|_| PasetoError::Backend("CSPRNG failure"))?;
        }

        let body = {
            let key = key.clone();
            let payload = payload.to_vec();
            let footer = footer.to_vec();
            let assertion = assertion.to_vec();
            submit(&*self.executor, move || {
                construction.seal(&key, &nonce, &payload, &footer, &assertion)
            })
            .wait()?
        };

        let token = Token {
            header: protocol.header(),
            body,
            footer: footer.to_vec(),
        };
        Ok(token.to_string())
    }

    /// Authenticate a token and return its payload and footer.
    ///
    /// `key` must be a local key for `local` protocols and a public key for
    /// `public` protocols. Malformed tokens are rejected before any crypto runs.
    pub fn unseal(
        &self,
        protocol: Protocol,
        key: &Key,
        token: &str,
        assertion: &[u8],
    ) -> Result<Unsealed, PasetoError> {
        tracing::debug!(%protocol, token_len = token.len(), "unsealing token");

        let construction = protocol.construction();
        check_assertion(protocol, assertion)?;
        key.expect(protocol.version(), unsealing_role(protocol))?;

        let Token { body, footer, .. } =
            Token::parse_as(token, protocol.header()).inspect_err(|err| {
                tracing::trace!(%protocol, %err, "rejected malformed token");
            })?;

        let payload = {
            let key = key.clone();
            let footer = footer.clone();
            let assertion = assertion.to_vec();
            submit(&*self.executor, move || {
                construction.unseal(&key, &body, &footer, &assertion)
            })
            .wait()
            .inspect_err(|err| tracing::debug!(%protocol, %err, "token failed authentication"))?
        };

        Ok(Unsealed {
            payload,
            footer: (!footer.is_empty()).then_some(footer),
        })
    }
}

fn check_assertion(protocol: Protocol, assertion: &[u8]) -> Result<(), PasetoError> {
    if !assertion.is_empty() && !protocol.construction().supports_implicit_assertion() {
        return Err(PasetoError::Usage(
            format!("{protocol} does not support implicit assertions").into(),
        ));
    }
    Ok(())
}

fn sealing_role(protocol: Protocol) -> KeyRole {
    match protocol.purpose() {
        Purpose::Local => KeyRole::Local,
        Purpose::Public => KeyRole::Secret,
    }
}

fn unsealing_role(protocol: Protocol) -> KeyRole {
    match protocol.purpose() {
        Purpose::Local => KeyRole::Local,
        Purpose::Public => KeyRole::Public,
    }
}
