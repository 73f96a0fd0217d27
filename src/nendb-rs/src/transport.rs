use bytes::Bytes;
use nendb_core::{NenError, Result};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode, Url};
use serde::Serialize;

use crate::context::Context;
use crate::retry::{Action, AttemptOutcome, RetryMachine, RetryPolicy};

/// Value of the `User-Agent` header sent with every request
pub const USER_AGENT: &str = concat!("nendb-rs/", env!("CARGO_PKG_VERSION"));

/// Retrying JSON-over-HTTP transport bound to one base URL
#[derive(Debug, Clone)]
pub(crate) struct Transport {
    http: reqwest::Client,
    base_url: String,
    policy: RetryPolicy,
}

impl Transport {
    pub(crate) fn new(http: reqwest::Client, base_url: String, policy: RetryPolicy) -> Self {
        Self {
            http,
            base_url,
            policy,
        }
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send `method path` with an optional JSON body and query string,
    /// retrying connection-level failures, and return the raw 2xx body.
    pub(crate) async fn request<B>(
        &self,
        ctx: &Context,
        method: Method,
        path: &str,
        body: Option<&B>,
        query: Option<&[(&str, String)]>,
    ) -> Result<Bytes>
    where
        B: Serialize + ?Sized,
    {
        let url = self.build_url(path, query)?;

        let payload = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| {
                NenError::validation("Failed to marshal request data").with_detail("error", e.to_string())
            })?
            .map(Bytes::from);

        let mut machine = RetryMachine::new(self.policy);
        loop {
            match machine.next_action() {
                Action::Attempt(attempt) => {
                    tracing::debug!(attempt, %method, %url, "sending request");
                    let outcome = ctx
                        .run(self.attempt(&method, &url, payload.as_ref()))
                        .await?;
                    if let AttemptOutcome::Retryable(reason) = &outcome {
                        tracing::warn!(attempt, %method, %url, error = %reason, "request attempt failed");
                    }
                    machine.record(outcome);
                }
                Action::Wait(delay) => {
                    tracing::debug!(?delay, "backing off before retry");
                    ctx.run(tokio::time::sleep(delay)).await?;
                    machine.resume();
                }
                Action::Finish => return machine.finish(),
            }
        }
    }

    fn build_url(&self, path: &str, query: Option<&[(&str, String)]>) -> Result<Url> {
        let raw = format!("{}{}", self.base_url, path);
        let mut url = Url::parse(&raw).map_err(|e| {
            NenError::validation("Invalid URL")
                .with_detail("url", raw.clone())
                .with_detail("error", e.to_string())
        })?;

        if let Some(params) = query.filter(|p| !p.is_empty()) {
            url.query_pairs_mut()
                .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    async fn attempt(&self, method: &Method, url: &Url, payload: Option<&Bytes>) -> AttemptOutcome<Bytes> {
        let mut builder = self
            .http
            .request(method.clone(), url.clone())
            .header(reqwest::header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
        if let Some(body) = payload {
            builder = builder
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(body.clone());
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) if e.is_builder() => {
                return AttemptOutcome::Rejected(
                    NenError::validation("Failed to create request").with_detail("error", e.to_string()),
                )
            }
            Err(e) => return AttemptOutcome::Retryable(e.to_string()),
        };

        let status = response.status();
        match response.bytes().await {
            Ok(body) => classify(status, body),
            Err(e) => AttemptOutcome::Retryable(e.to_string()),
        }
    }
}

/// Map an HTTP status and body to an attempt outcome
pub(crate) fn classify(status: StatusCode, body: Bytes) -> AttemptOutcome<Bytes> {
    if status.is_success() {
        AttemptOutcome::Success(body)
    } else if status.is_client_error() || status.is_server_error() {
        AttemptOutcome::Rejected(response_error(status, &body))
    } else {
        AttemptOutcome::Retryable(format!("unexpected status code: {}", status.as_u16()))
    }
}

fn response_error(status: StatusCode, body: &[u8]) -> NenError {
    let fallback = format!(
        "HTTP {}: {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown Status")
    );

    match serde_json::from_slice::<serde_json::Map<String, serde_json::Value>>(body) {
        Ok(parsed) => {
            let message = parsed
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .unwrap_or(fallback);
            NenError::response(message)
                .with_details(parsed)
                .with_detail("status", status.as_u16())
        }
        Err(_) => NenError::response(fallback).with_detail("status", status.as_u16()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nendb_core::ErrorKind;
    use std::time::Duration;

    fn rejected(outcome: AttemptOutcome<Bytes>) -> NenError {
        match outcome {
            AttemptOutcome::Rejected(err) => err,
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_success() {
        let outcome = classify(StatusCode::OK, Bytes::from_static(b"{}"));
        assert!(matches!(outcome, AttemptOutcome::Success(b) if b.as_ref() == b"{}"));

        let outcome = classify(StatusCode::NO_CONTENT, Bytes::new());
        assert!(matches!(outcome, AttemptOutcome::Success(_)));
    }

    #[test]
    fn test_classify_error_with_message() {
        let err = rejected(classify(
            StatusCode::NOT_FOUND,
            Bytes::from_static(br#"{"message":"not found"}"#),
        ));
        assert_eq!(err.kind(), ErrorKind::Response);
        assert_eq!(err.message(), "not found");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_classify_error_json_without_message() {
        let err = rejected(classify(
            StatusCode::BAD_REQUEST,
            Bytes::from_static(br#"{"error":"bad"}"#),
        ));
        assert_eq!(err.message(), "HTTP 400: Bad Request");
        assert_eq!(err.detail("error"), Some(&serde_json::json!("bad")));
    }

    #[test]
    fn test_classify_error_non_json() {
        let err = rejected(classify(
            StatusCode::INTERNAL_SERVER_ERROR,
            Bytes::from_static(b"<html>oops</html>"),
        ));
        assert_eq!(err.message(), "HTTP 500: Internal Server Error");
        assert_eq!(err.details().len(), 1);
    }

    #[test]
    fn test_classify_redirect_is_retryable() {
        let outcome = classify(StatusCode::FOUND, Bytes::new());
        assert!(
            matches!(outcome, AttemptOutcome::Retryable(ref r) if r == "unexpected status code: 302")
        );
    }

    #[test]
    fn test_build_url_with_query() {
        let transport = Transport::new(
            reqwest::Client::new(),
            "http://localhost:8080".to_string(),
            RetryPolicy::new(0, Duration::ZERO),
        );
        let params = [("limit", "5".to_string()), ("q", "a b".to_string())];
        let url = transport.build_url("/nodes", Some(&params)).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/nodes?limit=5&q=a+b");

        let url = transport.build_url("/nodes", Some(&[])).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/nodes");
    }

    #[test]
    fn test_build_url_invalid() {
        let transport = Transport::new(
            reqwest::Client::new(),
            "not a url".to_string(),
            RetryPolicy::new(0, Duration::ZERO),
        );
        let err = transport.build_url("/health", None).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.message(), "Invalid URL");
    }

    #[test]
    fn test_user_agent() {
        assert!(USER_AGENT.starts_with("nendb-rs/"));
    }
}
