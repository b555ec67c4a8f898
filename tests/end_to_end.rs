//! Facade round trip: init with a token, send a message, assert the
//! exact wire shape the collector receives.
//!
//! Own test binary: initializes the process-wide agent.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use talon::{AgentConfig, CaptureOutcome};

#[test]
fn init_then_send_delivers_canonical_message_event() {
    let token = BASE64.encode(r#"{"integrationId":"abc123"}"#);

    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/")
        .match_header("content-type", "application/json")
        .match_body(mockito::Matcher::Json(serde_json::json!({
            "token": token.clone(),
            "catcherType": "errors/rust",
            "payload": {
                "title": "hello",
                "backtrace": [],
                "context": {},
                "user": {},
            },
        })))
        .with_status(200)
        .create();

    talon::init(AgentConfig::new(token).with_collector_base(format!("{}/", server.url())))
        .unwrap();

    assert_eq!(talon::credential().unwrap().integration_id, "abc123");
    assert_eq!(talon::send("hello").unwrap(), CaptureOutcome::Delivered);
    mock.assert();
}
