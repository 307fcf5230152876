//! DevTools protocol message types.
//!
//! Defines the command/response framing used over the browser's DevTools
//! WebSocket endpoint: integer-id requests, correlated responses with a
//! `result` or `error` payload, and id-less event notifications.

// ============================================================================
// Imports
// ============================================================================

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{Error, Result};

// ============================================================================
// Command Ids
// ============================================================================

/// Monotonically increasing command id source.
static NEXT_COMMAND_ID: AtomicU64 = AtomicU64::new(1);

/// Returns the next command id.
#[inline]
#[must_use]
pub fn next_command_id() -> u64 {
    NEXT_COMMAND_ID.fetch_add(1, Ordering::Relaxed)
}

// ============================================================================
// CdpRequest
// ============================================================================

/// A command request to the browser.
///
/// # Format
///
/// ```json
/// {
///   "id": 7,
///   "method": "Target.createTarget",
///   "sessionId": "ABC...",
///   "params": { ... }
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct CdpRequest {
    /// Identifier for request/response correlation.
    pub id: u64,

    /// Protocol method in `Domain.method` format.
    pub method: String,

    /// Target session for session-scoped commands.
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Method parameters.
    pub params: Value,
}

impl CdpRequest {
    /// Creates a browser-scoped request with an auto-generated id.
    #[inline]
    #[must_use]
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            id: next_command_id(),
            method: method.into(),
            session_id: None,
            params,
        }
    }

    /// Creates a session-scoped request with an auto-generated id.
    #[inline]
    #[must_use]
    pub fn with_session(
        method: impl Into<String>,
        params: Value,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            id: next_command_id(),
            method: method.into(),
            session_id: Some(session_id.into()),
            params,
        }
    }
}

// ============================================================================
// CdpRequest - Command Constructors
// ============================================================================

impl CdpRequest {
    /// `Target.getTargets`: lists all attachable targets.
    #[must_use]
    pub fn get_targets() -> Self {
        Self::new("Target.getTargets", json!({}))
    }

    /// `Target.createTarget`: opens a new page at `url`.
    #[must_use]
    pub fn create_target(url: &str) -> Self {
        Self::new("Target.createTarget", json!({ "url": url }))
    }

    /// `Target.closeTarget`: closes the page with `target_id`.
    #[must_use]
    pub fn close_target(target_id: &str) -> Self {
        Self::new("Target.closeTarget", json!({ "targetId": target_id }))
    }

    /// `Target.attachToTarget`: attaches a flat session to `target_id`.
    #[must_use]
    pub fn attach_to_target(target_id: &str) -> Self {
        Self::new(
            "Target.attachToTarget",
            json!({ "targetId": target_id, "flatten": true }),
        )
    }

    /// `Page.captureScreenshot`: captures the session's page as PNG.
    #[must_use]
    pub fn capture_screenshot(session_id: &str) -> Self {
        Self::with_session("Page.captureScreenshot", json!({ "format": "png" }), session_id)
    }

    /// `Browser.close`: asks the browser to shut down gracefully.
    #[must_use]
    pub fn close_browser() -> Self {
        Self::new("Browser.close", json!({}))
    }
}

// ============================================================================
// CdpResponse
// ============================================================================

/// A correlated response from the browser.
///
/// # Format
///
/// Success:
/// ```json
/// { "id": 7, "result": { ... } }
/// ```
///
/// Error:
/// ```json
/// { "id": 7, "error": { "code": -32000, "message": "..." } }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct CdpResponse {
    /// Matches the request `id`.
    pub id: u64,

    /// Result payload (if success).
    #[serde(default)]
    pub result: Option<Value>,

    /// Error payload (if error).
    #[serde(default)]
    pub error: Option<CdpErrorPayload>,
}

/// Error payload of a failed command.
#[derive(Debug, Clone, Deserialize)]
pub struct CdpErrorPayload {
    /// Protocol error code.
    pub code: i64,

    /// Human-readable message.
    pub message: String,
}

impl CdpResponse {
    /// Returns `true` if this is a success response.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Extracts the result value, returning an error if the command failed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] carrying the browser's error message.
    pub fn into_result(self) -> Result<Value> {
        match self.error {
            None => Ok(self.result.unwrap_or(Value::Null)),
            Some(payload) => Err(Error::protocol(format!(
                "{} (code {})",
                payload.message, payload.code
            ))),
        }
    }

    /// Gets a string value from the result.
    ///
    /// Returns an empty string if the key is missing or not a string.
    #[inline]
    #[must_use]
    pub fn get_string(&self, key: &str) -> String {
        self.result
            .as_ref()
            .and_then(|v| v.get(key))
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    }
}

// ============================================================================
// CdpEvent
// ============================================================================

/// An unsolicited notification from the browser.
///
/// Events carry a `method` but no `id`; this crate observes them only for
/// diagnostics.
#[derive(Debug, Clone, Deserialize)]
pub struct CdpEvent {
    /// Event method in `Domain.event` format.
    pub method: String,

    /// Event parameters.
    #[serde(default)]
    pub params: Value,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_ids_increase() {
        let a = next_command_id();
        let b = next_command_id();
        assert!(b > a);
    }

    #[test]
    fn test_request_serialization() {
        let request = CdpRequest::create_target("about:blank");
        let json = serde_json::to_string(&request).expect("serialize");

        assert!(json.contains("\"method\":\"Target.createTarget\""));
        assert!(json.contains("\"url\":\"about:blank\""));
        // Browser-scoped requests carry no sessionId key at all.
        assert!(!json.contains("sessionId"));
    }

    #[test]
    fn test_session_scoped_request_serialization() {
        let request = CdpRequest::capture_screenshot("SESSION-1");
        let json = serde_json::to_string(&request).expect("serialize");

        assert!(json.contains("\"sessionId\":\"SESSION-1\""));
        assert!(json.contains("\"format\":\"png\""));
    }

    #[test]
    fn test_attach_requests_flat_session() {
        let request = CdpRequest::attach_to_target("TARGET-1");
        let json = serde_json::to_string(&request).expect("serialize");
        assert!(json.contains("\"flatten\":true"));
    }

    #[test]
    fn test_success_response() {
        let json_str = r#"{"id": 3, "result": {"targetId": "T1"}}"#;
        let response: CdpResponse = serde_json::from_str(json_str).expect("parse");

        assert!(response.is_success());
        assert_eq!(response.get_string("targetId"), "T1");

        let result = response.into_result().expect("success");
        assert_eq!(result.get("targetId").and_then(|v| v.as_str()), Some("T1"));
    }

    #[test]
    fn test_error_response() {
        let json_str = r#"{"id": 3, "error": {"code": -32000, "message": "no target"}}"#;
        let response: CdpResponse = serde_json::from_str(json_str).expect("parse");

        assert!(!response.is_success());
        let err = response.into_result().expect_err("error response");
        assert!(err.to_string().contains("no target"));
        assert!(err.to_string().contains("-32000"));
    }

    #[test]
    fn test_event_parses_without_id() {
        let json_str = r#"{"method": "Target.targetCreated", "params": {"targetInfo": {}}}"#;
        let event: CdpEvent = serde_json::from_str(json_str).expect("parse");
        assert_eq!(event.method, "Target.targetCreated");
    }

    #[test]
    fn test_event_text_is_not_a_response() {
        let json_str = r#"{"method": "Target.targetCreated", "params": {}}"#;
        assert!(serde_json::from_str::<CdpResponse>(json_str).is_err());
    }
}
