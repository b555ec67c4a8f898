//! Event composition.
//!
//! Turns a capture input (a failure or a plain message) plus the agent's
//! settings snapshot into a wire [`Event`]. Inputs are a tagged sum
//! resolved at the call boundary; there is no runtime type sniffing and
//! no "unsupported input" path.
//!
//! Frame enrichment is independent per frame: one frame's missing source
//! never affects its neighbours.

use serde_json::{Map, Value};
use tracing::debug;

use crate::backtrace::{capture_frames, RawFrame};
use crate::event::{Event, Payload, StackFrame, CATCHER_TYPE, UNKNOWN_FILE};
use crate::source::SourceContextResolver;

/// What is being captured.
#[derive(Debug, Clone)]
pub enum CaptureInput {
    /// A free-text message; composes with an empty backtrace.
    Message(String),
    /// A failure with a captured stack.
    Failure(FailureInfo),
}

impl From<&str> for CaptureInput {
    fn from(message: &str) -> Self {
        Self::Message(message.to_string())
    }
}

impl From<String> for CaptureInput {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

impl From<FailureInfo> for CaptureInput {
    fn from(failure: FailureInfo) -> Self {
        Self::Failure(failure)
    }
}

/// A failure ready for composition: headline, kind, message, stack.
#[derive(Debug, Clone)]
pub struct FailureInfo {
    /// Canonical string form, used as the event title.
    pub title: String,
    /// Concrete failure kind name.
    pub kind: String,
    /// Failure message, when there is one.
    pub message: Option<String>,
    /// Raw stack frames, innermost first.
    pub frames: Vec<RawFrame>,
}

impl FailureInfo {
    /// Builds failure info from an error, capturing the current stack.
    ///
    /// The title mirrors the conventional `Type: message` string form;
    /// the kind is the error's type name without its module path.
    pub fn from_error<E>(error: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        let type_name = std::any::type_name_of_val(error);
        let message = error.to_string();
        Self {
            title: format!("{}: {}", type_name, message),
            kind: short_type_name(type_name).to_string(),
            message: Some(message),
            frames: capture_frames(),
        }
    }

    /// Builds failure info from a panic, for use inside a panic hook.
    ///
    /// The panic location becomes the innermost frame; it is the only
    /// frame with a reliable column number. The captured stack follows.
    pub fn from_panic(info: &std::panic::PanicHookInfo<'_>) -> Self {
        let message = panic_message(info);

        let mut frames = Vec::new();
        if let Some(location) = info.location() {
            frames.push(RawFrame {
                file: Some(location.file().to_string()),
                line: Some(location.line()),
                column: Some(location.column()),
                ..RawFrame::default()
            });
        }
        frames.extend(capture_frames());

        Self {
            title: message.clone(),
            kind: "panic".to_string(),
            message: Some(message),
            frames,
        }
    }
}

/// Extracts a printable message from a panic payload.
fn panic_message(info: &std::panic::PanicHookInfo<'_>) -> String {
    let payload = info.payload();
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

/// Drops the module path (and any generic arguments) from a type name.
fn short_type_name(type_name: &str) -> &str {
    let base = type_name.split('<').next().unwrap_or(type_name);
    base.rsplit("::").next().unwrap_or(base)
}

/// Composes a wire event from an input and the settings snapshot.
///
/// `context` and `user` are the caller's own copies: a later mutation of
/// the live settings cannot alter an event already composed.
pub(crate) fn compose(
    token: &str,
    context: Map<String, Value>,
    user: Map<String, Value>,
    resolver: &SourceContextResolver,
    input: CaptureInput,
) -> Event {
    let (title, kind, description, frames) = match input {
        CaptureInput::Message(message) => (message, None, None, Vec::new()),
        CaptureInput::Failure(failure) => (
            failure.title,
            Some(failure.kind),
            failure.message,
            failure.frames,
        ),
    };

    let backtrace: Vec<StackFrame> = frames
        .into_iter()
        .map(|frame| enrich_frame(frame, resolver))
        .collect();

    let release = context
        .get("version")
        .and_then(Value::as_str)
        .map(String::from);

    debug!(%title, frames = backtrace.len(), "composed event");

    Event {
        token: token.to_string(),
        catcher_type: CATCHER_TYPE.to_string(),
        payload: Payload {
            title,
            kind,
            description,
            backtrace,
            context,
            user,
            release,
        },
    }
}

/// Fills in a frame's source window; resolution failure leaves the
/// frame intact with a null snippet.
fn enrich_frame(raw: RawFrame, resolver: &SourceContextResolver) -> StackFrame {
    let source_code = match (raw.file.as_deref(), raw.line) {
        (Some(file), Some(line)) => resolver.resolve(raw.module.as_deref(), file, line),
        _ => None,
    };

    StackFrame {
        file: raw.file.unwrap_or_else(|| UNKNOWN_FILE.to_string()),
        line: raw.line.unwrap_or(0),
        column: raw.column.unwrap_or(0),
        function: raw.function,
        source_code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn resolver() -> SourceContextResolver {
        SourceContextResolver::new(vec![PathBuf::from("/nonexistent")])
    }

    #[test]
    fn message_input_composes_bare_payload() {
        let event = compose(
            "tok",
            Map::new(),
            Map::new(),
            &resolver(),
            CaptureInput::from("hello"),
        );

        assert_eq!(event.token, "tok");
        assert_eq!(event.catcher_type, CATCHER_TYPE);
        assert_eq!(event.payload.title, "hello");
        assert_eq!(event.payload.kind, None);
        assert_eq!(event.payload.description, None);
        assert!(event.payload.backtrace.is_empty());
        assert_eq!(event.payload.release, None);
    }

    #[test]
    fn failure_input_keeps_frame_count_and_order() {
        let failure = FailureInfo {
            title: "boom".into(),
            kind: "Error".into(),
            message: Some("boom".into()),
            frames: vec![
                RawFrame {
                    function: Some("inner".into()),
                    ..RawFrame::default()
                },
                RawFrame {
                    function: Some("outer".into()),
                    ..RawFrame::default()
                },
            ],
        };

        let event = compose("tok", Map::new(), Map::new(), &resolver(), failure.into());
        let backtrace = &event.payload.backtrace;

        assert_eq!(backtrace.len(), 2);
        assert_eq!(backtrace[0].function.as_deref(), Some("inner"));
        assert_eq!(backtrace[1].function.as_deref(), Some("outer"));
    }

    #[test]
    fn frame_without_location_uses_placeholders() {
        let failure = FailureInfo {
            title: "boom".into(),
            kind: "Error".into(),
            message: None,
            frames: vec![RawFrame::default()],
        };

        let event = compose("tok", Map::new(), Map::new(), &resolver(), failure.into());
        let frame = &event.payload.backtrace[0];

        assert_eq!(frame.file, UNKNOWN_FILE);
        assert_eq!(frame.line, 0);
        assert_eq!(frame.column, 0);
        assert!(frame.source_code.is_none());
    }

    #[test]
    fn frame_enrichment_failures_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("known.rs");
        let mut file = std::fs::File::create(&path).unwrap();
        for i in 1..=20 {
            writeln!(file, "line {}", i).unwrap();
        }

        let failure = FailureInfo {
            title: "boom".into(),
            kind: "Error".into(),
            message: None,
            frames: vec![
                RawFrame {
                    file: Some(path.to_str().unwrap().to_string()),
                    line: Some(10),
                    ..RawFrame::default()
                },
                RawFrame {
                    file: Some("ghost.rs".into()),
                    line: Some(10),
                    ..RawFrame::default()
                },
            ],
        };

        let event = compose("tok", Map::new(), Map::new(), &resolver(), failure.into());

        assert!(event.payload.backtrace[0].source_code.is_some());
        assert!(event.payload.backtrace[1].source_code.is_none());
    }

    #[test]
    fn release_comes_from_version_context_key() {
        let mut context = Map::new();
        context.insert("version".into(), "2.1.0".into());

        let event = compose(
            "tok",
            context,
            Map::new(),
            &resolver(),
            CaptureInput::from("hello"),
        );

        assert_eq!(event.payload.release.as_deref(), Some("2.1.0"));
    }

    #[test]
    fn non_string_version_is_ignored() {
        let mut context = Map::new();
        context.insert("version".into(), serde_json::json!(3));

        let event = compose(
            "tok",
            context,
            Map::new(),
            &resolver(),
            CaptureInput::from("hello"),
        );

        assert_eq!(event.payload.release, None);
    }

    #[test]
    fn from_error_sets_kind_and_message() {
        let error = std::io::Error::other("disk on fire");
        let failure = FailureInfo::from_error(&error);

        assert_eq!(failure.kind, "Error");
        assert!(failure.title.contains("disk on fire"));
        assert_eq!(failure.message.as_deref(), Some("disk on fire"));
    }

    #[test]
    fn short_type_name_strips_path_and_generics() {
        assert_eq!(short_type_name("std::io::Error"), "Error");
        assert_eq!(short_type_name("Error"), "Error");
        assert_eq!(
            short_type_name("my_app::FetchError<my_app::Backend>"),
            "FetchError"
        );
    }
}
