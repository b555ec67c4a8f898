//! Agent error taxonomy.
//!
//! Only configuration-time and call-site mistakes surface as errors:
//! a malformed token, or use of the agent before initialization.
//! Everything that happens while capturing — unresolvable source,
//! a cancelling hook, a failed delivery — is absorbed and at most
//! logged, so the host's own failure handling is never disrupted.

use thiserror::Error;

use crate::token::TokenError;

/// Errors surfaced by the agent facade.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The integration token could not be decoded. Fatal at `init`:
    /// no agent state is committed.
    #[error("invalid integration token: {0}")]
    InvalidToken(#[from] TokenError),

    /// `send`/`set_context`/`set_user` called before `init`.
    #[error("agent is not initialized; call init() first")]
    NotInitialized,

    /// The HTTP client could not be constructed at `init`.
    #[error("failed to construct delivery client: {0}")]
    Transport(#[from] reqwest::Error),
}
