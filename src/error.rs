//! Error taxonomy shared by all research sources.
//!
//! Every failure that escapes an adapter is one of the five [`ApiError`]
//! kinds. Native transport and parse errors never leak past the adapter
//! boundary: each adapter maps them into this taxonomy with a machine-readable
//! `"<source>:<reason>"` code and a retryability flag.

use std::collections::HashMap;

use serde_json::Value;

/// Structured failure payload attached to every taxonomy error.
#[derive(Debug, Clone, Default)]
pub struct ErrorDetail {
    /// Machine-readable code of the form `"<source>:<reason>"`,
    /// e.g. `arxiv:http_error`, `ieee:missing_api_key`.
    pub code: String,

    /// Whether re-issuing the identical request could plausibly succeed.
    pub retryable: bool,

    /// Open diagnostic bag (raw HTTP status, offending field name, URL, ...).
    pub metadata: HashMap<String, Value>,
}

impl ErrorDetail {
    pub fn new(code: impl Into<String>, retryable: bool) -> Self {
        Self {
            code: code.into(),
            retryable,
            metadata: HashMap::new(),
        }
    }
}

/// Taxonomy error raised by research source adapters.
///
/// All five kinds carry the same payload: a human-readable message, the
/// adapter that raised the error, an optional HTTP status, and an
/// [`ErrorDetail`]. Auth errors are never retryable; Quota and Service
/// errors always are; Request and Response errors carry it per-detail.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// Transport/network/HTTP-level failure.
    #[error("[{}] {message}", .detail.code)]
    Request {
        message: String,
        source_name: String,
        status_code: Option<u16>,
        detail: ErrorDetail,
    },

    /// Backend returned well-formed but invalid/incomplete data, or zero results.
    #[error("[{}] {message}", .detail.code)]
    Response {
        message: String,
        source_name: String,
        status_code: Option<u16>,
        detail: ErrorDetail,
    },

    /// Missing or invalid credentials.
    #[error("[{}] {message}", .detail.code)]
    Auth {
        message: String,
        source_name: String,
        status_code: Option<u16>,
        detail: ErrorDetail,
    },

    /// Rate limit or quota exceeded.
    #[error("[{}] {message}", .detail.code)]
    Quota {
        message: String,
        source_name: String,
        status_code: Option<u16>,
        detail: ErrorDetail,
    },

    /// Backend service malfunction (e.g. a transient empty page).
    #[error("[{}] {message}", .detail.code)]
    Service {
        message: String,
        source_name: String,
        status_code: Option<u16>,
        detail: ErrorDetail,
    },
}

impl ApiError {
    /// Transport-level failure. Retryability is caller-specified.
    pub fn request(
        source: impl Into<String>,
        reason: &str,
        message: impl Into<String>,
        retryable: bool,
    ) -> Self {
        let source = source.into();
        let detail = ErrorDetail::new(format!("{}:{}", source, reason), retryable);
        ApiError::Request {
            message: message.into(),
            source_name: source,
            status_code: None,
            detail,
        }
    }

    /// Invalid or incomplete backend data. Retryability is caller-specified
    /// (usually false; zero-result responses are the retryable exception).
    pub fn response(
        source: impl Into<String>,
        reason: &str,
        message: impl Into<String>,
        retryable: bool,
    ) -> Self {
        let source = source.into();
        let detail = ErrorDetail::new(format!("{}:{}", source, reason), retryable);
        ApiError::Response {
            message: message.into(),
            source_name: source,
            status_code: None,
            detail,
        }
    }

    /// Credential failure. Never retryable.
    pub fn auth(source: impl Into<String>, reason: &str, message: impl Into<String>) -> Self {
        let source = source.into();
        let detail = ErrorDetail::new(format!("{}:{}", source, reason), false);
        ApiError::Auth {
            message: message.into(),
            source_name: source,
            status_code: None,
            detail,
        }
    }

    /// Rate limit or quota violation. Always retryable.
    pub fn quota(source: impl Into<String>, reason: &str, message: impl Into<String>) -> Self {
        let source = source.into();
        let detail = ErrorDetail::new(format!("{}:{}", source, reason), true);
        ApiError::Quota {
            message: message.into(),
            source_name: source,
            status_code: None,
            detail,
        }
    }

    /// Backend malfunction. Always retryable.
    pub fn service(source: impl Into<String>, reason: &str, message: impl Into<String>) -> Self {
        let source = source.into();
        let detail = ErrorDetail::new(format!("{}:{}", source, reason), true);
        ApiError::Service {
            message: message.into(),
            source_name: source,
            status_code: None,
            detail,
        }
    }

    /// Attach an HTTP status code.
    pub fn with_status(mut self, status: u16) -> Self {
        match &mut self {
            ApiError::Request { status_code, .. }
            | ApiError::Response { status_code, .. }
            | ApiError::Auth { status_code, .. }
            | ApiError::Quota { status_code, .. }
            | ApiError::Service { status_code, .. } => *status_code = Some(status),
        }
        self.with_meta("status", Value::from(status))
    }

    /// Attach one diagnostic key/value pair.
    pub fn with_meta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.detail_mut().metadata.insert(key.into(), value);
        self
    }

    fn detail_mut(&mut self) -> &mut ErrorDetail {
        match self {
            ApiError::Request { detail, .. }
            | ApiError::Response { detail, .. }
            | ApiError::Auth { detail, .. }
            | ApiError::Quota { detail, .. }
            | ApiError::Service { detail, .. } => detail,
        }
    }

    pub fn detail(&self) -> &ErrorDetail {
        match self {
            ApiError::Request { detail, .. }
            | ApiError::Response { detail, .. }
            | ApiError::Auth { detail, .. }
            | ApiError::Quota { detail, .. }
            | ApiError::Service { detail, .. } => detail,
        }
    }

    /// The `"<source>:<reason>"` code.
    pub fn code(&self) -> &str {
        &self.detail().code
    }

    /// Whether re-issuing the identical request could plausibly succeed.
    pub fn retryable(&self) -> bool {
        match self {
            ApiError::Auth { .. } => false,
            ApiError::Quota { .. } | ApiError::Service { .. } => true,
            ApiError::Request { detail, .. } | ApiError::Response { detail, .. } => {
                detail.retryable
            }
        }
    }

    /// The adapter that raised this error.
    pub fn source_id(&self) -> &str {
        match self {
            ApiError::Request { source_name, .. }
            | ApiError::Response { source_name, .. }
            | ApiError::Auth { source_name, .. }
            | ApiError::Quota { source_name, .. }
            | ApiError::Service { source_name, .. } => source_name,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Request { status_code, .. }
            | ApiError::Response { status_code, .. }
            | ApiError::Auth { status_code, .. }
            | ApiError::Quota { status_code, .. }
            | ApiError::Service { status_code, .. } => *status_code,
        }
    }

    /// Machine-readable category tag.
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Request { .. } => "request_failure",
            ApiError::Response { .. } => "invalid_response",
            ApiError::Auth { .. } => "auth_failure",
            ApiError::Quota { .. } => "quota_exceeded",
            ApiError::Service { .. } => "service_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_format() {
        let err = ApiError::response("arxiv", "no_results", "nothing matched", true);
        assert_eq!(err.code(), "arxiv:no_results");
        assert_eq!(err.source_id(), "arxiv");
        assert!(err.retryable());
    }

    #[test]
    fn auth_is_never_retryable() {
        let err = ApiError::auth("ieee", "missing_api_key", "no key configured");
        assert!(!err.retryable());
        assert_eq!(err.error_type(), "auth_failure");
    }

    #[test]
    fn quota_and_service_always_retryable() {
        assert!(ApiError::quota("ieee", "rate_limited", "slow down").retryable());
        assert!(ApiError::service("arxiv", "empty_page", "transient").retryable());
    }

    #[test]
    fn display_is_code_then_message() {
        let err = ApiError::request("ieee", "http_error", "GET failed", true).with_status(502);
        assert_eq!(err.to_string(), "[ieee:http_error] GET failed");
        assert_eq!(err.status_code(), Some(502));
        assert_eq!(err.detail().metadata.get("status"), Some(&Value::from(502)));
    }

    #[test]
    fn adapter_name_is_not_a_cause_chain() {
        use std::error::Error;
        let err = ApiError::request("arxiv", "timeout", "request timed out", true);
        assert_eq!(err.source_id(), "arxiv");
        // Taxonomy errors are leaves; the raising adapter is data, not a
        // wrapped underlying error.
        assert!(err.source().is_none());
    }

    #[test]
    fn metadata_bag_is_open() {
        let err = ApiError::response("ieee", "missing_field", "record incomplete", false)
            .with_meta("field", Value::from("article_number"));
        assert_eq!(
            err.detail().metadata.get("field"),
            Some(&Value::from("article_number"))
        );
    }
}
