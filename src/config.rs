//! Agent configuration.
//!
//! Everything the host glue hands to `init`: the integration token,
//! static context, user identity, the optional before-send transform,
//! and knobs that only matter for tests or self-hosted collectors.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::event::Payload;

/// Last-chance transform applied to each payload before delivery.
///
/// Runs at most once per event, synchronously on the capturing thread.
/// Returning `None` cancels delivery of that event only; this is an
/// intentional suppression, not an error.
pub type BeforeSend = Arc<dyn Fn(Payload) -> Option<Payload> + Send + Sync>;

/// Configuration for [`crate::init`].
///
/// Built with chainable setters:
///
/// ```
/// use talon::AgentConfig;
///
/// let config = AgentConfig::new("<token>")
///     .with_context("version", "1.4.2")
///     .with_user("id", 42)
///     .with_before_send(|payload| Some(payload));
/// ```
#[derive(Clone)]
pub struct AgentConfig {
    /// Opaque integration token (base64 JSON).
    pub token: String,
    /// Static key/value context attached to every event.
    pub context: Map<String, Value>,
    /// User identity attached to every event.
    pub user: Map<String, Value>,
    /// Optional transform hook.
    pub before_send: Option<BeforeSend>,
    /// Source roots probed for snippet resolution.
    pub source_roots: Vec<PathBuf>,
    /// Collector base URL override. When unset the endpoint is derived
    /// from the integration id.
    pub collector_base: Option<String>,
}

impl AgentConfig {
    /// Creates a configuration with the given integration token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            context: Map::new(),
            user: Map::new(),
            before_send: None,
            source_roots: vec![PathBuf::from("src"), PathBuf::from(".")],
            collector_base: None,
        }
    }

    /// Sets a static context entry.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a user identity entry.
    pub fn with_user(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.user.insert(key.into(), value.into());
        self
    }

    /// Sets the before-send transform hook.
    pub fn with_before_send<F>(mut self, hook: F) -> Self
    where
        F: Fn(Payload) -> Option<Payload> + Send + Sync + 'static,
    {
        self.before_send = Some(Arc::new(hook));
        self
    }

    /// Replaces the probed source roots.
    pub fn with_source_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.source_roots = roots;
        self
    }

    /// Overrides the collector base URL (self-hosted collectors, tests).
    pub fn with_collector_base(mut self, base: impl Into<String>) -> Self {
        self.collector_base = Some(base.into());
        self
    }
}

impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("token", &"<redacted>")
            .field("context", &self.context)
            .field("user", &self.user)
            .field("before_send", &self.before_send.is_some())
            .field("source_roots", &self.source_roots)
            .field("collector_base", &self.collector_base)
            .finish()
    }
}
