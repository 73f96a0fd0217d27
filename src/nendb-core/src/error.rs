//! Classified errors shared by the NenDB crates.
//!
//! Every failure is a single [`NenError`] value tagged with an [`ErrorKind`],
//! a human-readable message, a map of contextual details and the time at
//! which it was raised.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Detail context attached to an error
pub type ErrorDetails = BTreeMap<String, serde_json::Value>;

/// Kind tag of a [`NenError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Server unreachable while building a client or probing health
    Connection,
    /// Retry budget exhausted, deadline expired or call cancelled
    Timeout,
    /// Malformed request or violated domain invariant
    Validation,
    /// Server reported that an algorithm run did not complete
    Algorithm,
    /// Definitive 4xx/5xx from the server, or an undecodable response body
    Response,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Connection => "connection",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Validation => "validation",
            ErrorKind::Algorithm => "algorithm",
            ErrorKind::Response => "response",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// NenError is the single error type returned by the driver
#[derive(Debug, Clone, Serialize, thiserror::Error)]
#[error("{message}{}", details_suffix(.details))]
pub struct NenError {
    kind: ErrorKind,
    message: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    details: ErrorDetails,
    timestamp: DateTime<Utc>,
}

fn details_suffix(details: &ErrorDetails) -> String {
    if details.is_empty() {
        return String::new();
    }
    let rendered: Vec<String> = details.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    format!(" - details: {{{}}}", rendered.join(", "))
}

pub type Result<T> = std::result::Result<T, NenError>;

impl NenError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: ErrorDetails::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Connection, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn algorithm(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Algorithm, message)
    }

    pub fn response(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Response, message)
    }

    /// Attach a single detail entry
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Merge a whole detail map, e.g. a decoded error body
    pub fn with_details<I>(mut self, details: I) -> Self
    where
        I: IntoIterator<Item = (String, serde_json::Value)>,
    {
        self.details.extend(details);
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> &ErrorDetails {
        &self.details
    }

    pub fn detail(&self, key: &str) -> Option<&serde_json::Value> {
        self.details.get(key)
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// HTTP status recorded on a response error, if any
    pub fn status(&self) -> Option<u16> {
        self.details
            .get("status")
            .and_then(|v| v.as_u64())
            .and_then(|s| u16::try_from(s).ok())
    }

    pub fn is_connection(&self) -> bool {
        self.kind == ErrorKind::Connection
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == ErrorKind::Timeout
    }

    pub fn is_validation(&self) -> bool {
        self.kind == ErrorKind::Validation
    }

    pub fn is_algorithm(&self) -> bool {
        self.kind == ErrorKind::Algorithm
    }

    pub fn is_response(&self) -> bool {
        self.kind == ErrorKind::Response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_tag_kind() {
        assert_eq!(NenError::connection("x").kind(), ErrorKind::Connection);
        assert_eq!(NenError::timeout("x").kind(), ErrorKind::Timeout);
        assert_eq!(NenError::validation("x").kind(), ErrorKind::Validation);
        assert_eq!(NenError::algorithm("x").kind(), ErrorKind::Algorithm);
        assert_eq!(NenError::response("x").kind(), ErrorKind::Response);
    }

    #[test]
    fn test_display_without_details() {
        let err = NenError::validation("node ID must be a non-negative integer");
        assert_eq!(err.to_string(), "node ID must be a non-negative integer");
        assert!(err.details().is_empty());
    }

    #[test]
    fn test_display_with_details() {
        let err = NenError::response("not found").with_detail("status", 404);
        assert_eq!(err.to_string(), "not found - details: {status=404}");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_with_details_merges() {
        let mut body = serde_json::Map::new();
        body.insert("message".to_string(), "boom".into());
        body.insert("code".to_string(), 7.into());

        let err = NenError::response("boom")
            .with_detail("status", 500)
            .with_details(body);

        assert_eq!(err.details().len(), 3);
        assert_eq!(err.detail("code"), Some(&serde_json::json!(7)));
    }

    #[test]
    fn test_timestamp_is_recent() {
        let before = Utc::now();
        let err = NenError::timeout("slow");
        let after = Utc::now();
        assert!(err.timestamp() >= before && err.timestamp() <= after);
    }

    #[test]
    fn test_serialize_shape() {
        let err = NenError::connection("down").with_detail("error", "refused");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "connection");
        assert_eq!(json["message"], "down");
        assert_eq!(json["details"]["error"], "refused");
        assert!(json["timestamp"].is_string());

        let bare = serde_json::to_value(NenError::timeout("t")).unwrap();
        assert!(bare.get("details").is_none());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ErrorKind::Response.to_string(), "response");
        assert_eq!(ErrorKind::Algorithm.as_str(), "algorithm");
    }
}
