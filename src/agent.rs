//! Agent state and process-wide facade.
//!
//! An [`Agent`] owns everything a capture needs: the decoded credential,
//! the delivery client, the source resolver, and the mutable settings
//! sections. Components take it as an explicit dependency, so the whole
//! pipeline is testable without process globals.
//!
//! The module-level functions ([`init`], [`send`], [`set_context`],
//! [`set_user`]) operate on the one process-scoped agent committed into
//! a `OnceLock`. `init` is the only synchronization point: racing first
//! calls each build an agent, the lock commits exactly one, and the
//! rest are no-ops. After that commit the settings maps are the only
//! mutable state, each behind its own `RwLock`; captures clone a
//! snapshot, so an in-flight event never observes later mutation.

use std::sync::{OnceLock, PoisonError, RwLock};

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::compose::{compose, CaptureInput};
use crate::config::{AgentConfig, BeforeSend};
use crate::delivery::DeliveryClient;
use crate::error::AgentError;
use crate::event::Event;
use crate::interceptor;
use crate::source::SourceContextResolver;
use crate::token::{decode_token, Credential};

/// How a single capture ended. None of these are errors: suppression is
/// deliberate, and a delivery failure is logged and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The collector accepted the event.
    Delivered,
    /// The before-send hook cancelled the event; no network call made.
    Suppressed,
    /// Delivery failed (transport error, timeout, or non-2xx status).
    Failed,
}

/// Process-scoped capture state, committed once at [`init`].
pub struct Agent {
    token: String,
    credential: Credential,
    context: RwLock<Map<String, Value>>,
    user: RwLock<Map<String, Value>>,
    before_send: Option<BeforeSend>,
    delivery: DeliveryClient,
    resolver: SourceContextResolver,
}

impl Agent {
    /// Builds an agent from configuration.
    ///
    /// Fails with [`AgentError::InvalidToken`] when the token cannot be
    /// decoded; no partial state escapes a failed build.
    pub fn from_config(config: AgentConfig) -> Result<Self, AgentError> {
        let credential = decode_token(&config.token)?;

        let delivery = match &config.collector_base {
            Some(base) => DeliveryClient::new(base.clone())?,
            None => DeliveryClient::for_integration(&credential.integration_id)?,
        };

        Ok(Self {
            token: config.token,
            credential,
            context: RwLock::new(config.context),
            user: RwLock::new(config.user),
            before_send: config.before_send,
            delivery,
            resolver: SourceContextResolver::new(config.source_roots),
        })
    }

    /// The decoded integration credential.
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Sets a static context entry for subsequent captures.
    pub fn set_context(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.context
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
    }

    /// Sets a user identity entry for subsequent captures.
    pub fn set_user(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.user
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
    }

    /// Runs the full capture pipeline on the calling thread:
    /// compose, transform, deliver.
    ///
    /// Blocks for at most the delivery timeouts. A panicking before-send
    /// hook propagates: that is a bug in the hook, not a capture
    /// failure.
    pub fn capture(&self, input: impl Into<CaptureInput>) -> CaptureOutcome {
        let context = self
            .context
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let user = self
            .user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let event = compose(&self.token, context, user, &self.resolver, input.into());

        let Event {
            token,
            catcher_type,
            payload,
        } = event;

        let payload = match &self.before_send {
            Some(hook) => match hook(payload) {
                Some(payload) => payload,
                None => {
                    debug!("event suppressed by before-send hook");
                    return CaptureOutcome::Suppressed;
                }
            },
            None => payload,
        };

        let event = Event {
            token,
            catcher_type,
            payload,
        };

        if self.delivery.deliver(&event).is_delivered() {
            CaptureOutcome::Delivered
        } else {
            CaptureOutcome::Failed
        }
    }
}

static AGENT: OnceLock<Agent> = OnceLock::new();

/// Initializes the process-wide agent and installs the panic
/// interceptor.
///
/// Idempotent: only the first successful call takes effect; later calls
/// (and racing callers that lose the commit) are no-ops returning `Ok`.
/// A malformed token fails the call and commits nothing.
pub fn init(config: AgentConfig) -> Result<(), AgentError> {
    if AGENT.get().is_some() {
        return Ok(());
    }

    let agent = Agent::from_config(config)?;

    // Racing first calls each build an agent; the lock commits exactly
    // one and drops the rest.
    if AGENT.set(agent).is_ok() {
        info!("agent initialized");
    }
    interceptor::install();

    Ok(())
}

/// Initializes the process-wide agent with just a token.
pub fn init_with_token(token: impl Into<String>) -> Result<(), AgentError> {
    init(AgentConfig::new(token.into()))
}

/// The committed process-wide agent, if any.
pub(crate) fn global() -> Option<&'static Agent> {
    AGENT.get()
}

/// The credential committed at [`init`], if the agent is initialized.
pub fn credential() -> Option<&'static Credential> {
    global().map(|agent| agent.credential())
}

/// Captures a message or failure through the process-wide agent.
///
/// Runs entirely on the calling thread, blocking for at most the
/// delivery timeouts.
pub fn send(input: impl Into<CaptureInput>) -> Result<CaptureOutcome, AgentError> {
    let agent = global().ok_or(AgentError::NotInitialized)?;
    Ok(agent.capture(input))
}

/// Sets a static context entry on the process-wide agent.
pub fn set_context(
    key: impl Into<String>,
    value: impl Into<Value>,
) -> Result<(), AgentError> {
    let agent = global().ok_or(AgentError::NotInitialized)?;
    agent.set_context(key, value);
    Ok(())
}

/// Sets a user identity entry on the process-wide agent.
pub fn set_user(key: impl Into<String>, value: impl Into<Value>) -> Result<(), AgentError> {
    let agent = global().ok_or(AgentError::NotInitialized)?;
    agent.set_user(key, value);
    Ok(())
}
