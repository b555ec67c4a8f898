//! Diagnostic event wire types.
//!
//! These structs serialize to the exact JSON shape the collector accepts:
//! an outer envelope carrying the raw token and catcher type, and a
//! payload with the human-facing details. Field naming follows the wire
//! (`catcherType`, `sourceCode`), not Rust convention.
//!
//! Events are created fresh per capture, consumed synchronously by the
//! delivery client, and dropped. Nothing here persists.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Catcher type reported in every event envelope.
pub const CATCHER_TYPE: &str = "errors/rust";

/// Placeholder used when the runtime reports no file for a frame.
pub const UNKNOWN_FILE: &str = "Unknown file";

/// Outer event envelope sent to the collector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Raw integration token, as configured.
    pub token: String,

    /// Always [`CATCHER_TYPE`].
    #[serde(rename = "catcherType")]
    pub catcher_type: String,

    /// Event details.
    pub payload: Payload,
}

/// Event details: what happened, where, and under which identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payload {
    /// Human-readable headline (failure string form, or the message).
    pub title: String,

    /// Concrete failure kind, absent for plain messages.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Failure message, absent for plain messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Captured call stack, innermost frame first. Empty for messages.
    pub backtrace: Vec<StackFrame>,

    /// Snapshot of the configured static context.
    pub context: Map<String, Value>,

    /// Snapshot of the configured user identity.
    pub user: Map<String, Value>,

    /// Release identifier, sourced from a `version` context key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
}

/// One entry of a captured call stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackFrame {
    /// Source file, or [`UNKNOWN_FILE`] when the runtime gave none.
    pub file: String,

    /// 1-based line number, 0 when unavailable.
    pub line: u32,

    /// 1-based column number, 0 when unavailable.
    pub column: u32,

    /// Function or method name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,

    /// Surrounding source lines, or explicit JSON `null` when the file
    /// could not be resolved. The collector distinguishes null from
    /// omission here, so this field is never skipped.
    #[serde(rename = "sourceCode")]
    pub source_code: Option<Vec<SourceLine>>,
}

/// A single numbered line of source context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLine {
    /// 1-based line number in the resolved file.
    pub line: u32,

    /// Line content, without the trailing newline.
    pub content: String,
}

impl Event {
    /// Serializes the event to its wire JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
