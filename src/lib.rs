//! Talon - in-process crash and error reporting agent.
//!
//! Talon intercepts otherwise-unhandled panics in a running program,
//! turns them (or explicit messages and errors) into structured
//! diagnostic events enriched with source context, and delivers those
//! events to a remote collector over HTTPS - best-effort, bounded
//! timeout, at most once. It never retries, never queues, and never
//! disturbs the host's own failure handling: the previously installed
//! panic hook always runs, whatever the delivery outcome.
//!
//! # Example
//!
//! ```rust,no_run
//! use talon::AgentConfig;
//!
//! fn main() -> Result<(), talon::AgentError> {
//!     talon::init(
//!         AgentConfig::new(std::env::var("TALON_TOKEN").unwrap_or_default())
//!             .with_context("version", env!("CARGO_PKG_VERSION"))
//!             .with_user("id", "backend-7"),
//!     )?;
//!
//!     // Panics anywhere in the program are now reported automatically.
//!     // Errors and messages can be reported explicitly:
//!     talon::send("subsystem started")?;
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod backtrace;
pub mod compose;
pub mod config;
pub mod delivery;
pub mod error;
pub mod event;
pub mod source;
pub mod token;

mod interceptor;

pub use agent::{
    credential, init, init_with_token, send, set_context, set_user, Agent, CaptureOutcome,
};
pub use compose::{CaptureInput, FailureInfo};
pub use config::{AgentConfig, BeforeSend};
pub use delivery::{DeliveryClient, DeliveryError, DeliveryOutcome};
pub use error::AgentError;
pub use event::{Event, Payload, SourceLine, StackFrame, CATCHER_TYPE};
pub use source::SourceContextResolver;
pub use token::{decode_token, Credential, TokenError};
