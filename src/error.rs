//! Error types for the palaver crate.
//!
//! Every failure mode of a completion exchange maps onto one variant of
//! [`Error`]. Provider failures are surfaced to the caller as-is; the crate
//! never retries and nothing here is fatal to the process.

use std::error;
use std::fmt;
use std::sync::Arc;

/// Shared handle to an underlying error cause.
type Cause = Arc<dyn error::Error + Send + Sync>;

/// The main error type for the palaver crate.
#[derive(Clone, Debug)]
pub enum Error {
    /// The service answered with a status this crate has no dedicated
    /// variant for.
    Api {
        /// HTTP status code.
        status_code: u16,
        /// Machine-readable error type reported by the service.
        error_type: Option<String>,
        /// Human-readable message.
        message: String,
        /// Request ID for correlating with service-side logs.
        request_id: Option<String>,
    },

    /// The API key was missing, malformed, or rejected.
    Authentication {
        /// Human-readable message.
        message: String,
    },

    /// The key is valid but not allowed to perform this operation.
    Permission {
        /// Human-readable message.
        message: String,
    },

    /// The requested resource does not exist.
    NotFound {
        /// Human-readable message.
        message: String,
    },

    /// The service refused the request to shed load.
    RateLimit {
        /// Human-readable message.
        message: String,
        /// Seconds to wait, as reported by the service.
        retry_after: Option<u64>,
    },

    /// The request was malformed or carried invalid parameters.
    BadRequest {
        /// Human-readable message.
        message: String,
        /// The offending parameter, when the service names one.
        param: Option<String>,
    },

    /// The exchange did not complete in time.
    Timeout {
        /// Human-readable message.
        message: String,
        /// The timeout that elapsed, in seconds.
        duration: Option<f64>,
    },

    /// The connection could not be established or was dropped.
    Connection {
        /// Human-readable message.
        message: String,
        /// Underlying cause.
        source: Option<Cause>,
    },

    /// The service reported an internal fault.
    InternalServer {
        /// Human-readable message.
        message: String,
        /// Request ID for correlating with service-side logs.
        request_id: Option<String>,
    },

    /// The service is overloaded or down for maintenance.
    ServiceUnavailable {
        /// Human-readable message.
        message: String,
        /// Seconds to wait, as reported by the service.
        retry_after: Option<u64>,
    },

    /// A payload could not be serialized or deserialized.
    Serialization {
        /// Human-readable message.
        message: String,
        /// Underlying cause.
        source: Option<Cause>,
    },

    /// The HTTP client failed before a response arrived.
    HttpClient {
        /// Human-readable message.
        message: String,
        /// Underlying cause.
        source: Option<Cause>,
    },

    /// A request parameter failed local validation.
    Validation {
        /// Human-readable message.
        message: String,
        /// The parameter that failed.
        param: Option<String>,
    },

    /// A streaming response broke mid-flight.
    Streaming {
        /// Human-readable message.
        message: String,
        /// Underlying cause.
        source: Option<Cause>,
    },

    /// Bytes on the wire were not valid text.
    Encoding {
        /// Human-readable message.
        message: String,
        /// Underlying cause.
        source: Option<Cause>,
    },
}

impl Error {
    /// Creates a new API error.
    pub fn api(
        status_code: u16,
        error_type: Option<String>,
        message: String,
        request_id: Option<String>,
    ) -> Self {
        Error::Api {
            status_code,
            error_type,
            message,
            request_id,
        }
    }

    /// Creates a new authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Error::Authentication {
            message: message.into(),
        }
    }

    /// Creates a new permission error.
    pub fn permission(message: impl Into<String>) -> Self {
        Error::Permission {
            message: message.into(),
        }
    }

    /// Creates a new not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Error::NotFound {
            message: message.into(),
        }
    }

    /// Creates a new rate limit error.
    pub fn rate_limit(message: impl Into<String>, retry_after: Option<u64>) -> Self {
        Error::RateLimit {
            message: message.into(),
            retry_after,
        }
    }

    /// Creates a new bad request error.
    pub fn bad_request(message: impl Into<String>, param: Option<String>) -> Self {
        Error::BadRequest {
            message: message.into(),
            param,
        }
    }

    /// Creates a new timeout error.
    pub fn timeout(message: impl Into<String>, duration: Option<f64>) -> Self {
        Error::Timeout {
            message: message.into(),
            duration,
        }
    }

    /// Creates a new connection error.
    pub fn connection(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Connection {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new internal server error.
    pub fn internal_server(message: impl Into<String>, request_id: Option<String>) -> Self {
        Error::InternalServer {
            message: message.into(),
            request_id,
        }
    }

    /// Creates a new service unavailable error.
    pub fn service_unavailable(message: impl Into<String>, retry_after: Option<u64>) -> Self {
        Error::ServiceUnavailable {
            message: message.into(),
            retry_after,
        }
    }

    /// Creates a new serialization error.
    pub fn serialization(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Serialization {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new HTTP client error.
    pub fn http_client(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::HttpClient {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new validation error.
    pub fn validation(message: impl Into<String>, param: Option<String>) -> Self {
        Error::Validation {
            message: message.into(),
            param,
        }
    }

    /// Creates a new streaming error.
    pub fn streaming(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Streaming {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new encoding error.
    pub fn encoding(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Encoding {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// True for authentication failures.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Error::Authentication { .. })
    }

    /// True for permission failures.
    pub fn is_permission(&self) -> bool {
        matches!(self, Error::Permission { .. })
    }

    /// True for rate limiting.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Error::RateLimit { .. })
    }

    /// True for malformed requests rejected by the service.
    pub fn is_bad_request(&self) -> bool {
        matches!(self, Error::BadRequest { .. })
    }

    /// True for timeouts.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// True for connection failures.
    pub fn is_connection(&self) -> bool {
        matches!(self, Error::Connection { .. })
    }

    /// True for failures on the service's side.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Error::InternalServer { .. } | Error::ServiceUnavailable { .. }
        )
    }

    /// True for parameters rejected before a request was sent.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    /// Returns true if retrying this request could plausibly succeed.
    ///
    /// The crate itself never retries; this exists so callers can decide.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Api { status_code, .. } => {
                matches!(status_code, 408 | 409 | 429 | 500..=599)
            }
            Error::Timeout { .. }
            | Error::Connection { .. }
            | Error::RateLimit { .. }
            | Error::ServiceUnavailable { .. }
            | Error::InternalServer { .. } => true,
            _ => false,
        }
    }

    /// Returns the request ID associated with this error, if any.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Error::Api { request_id, .. } | Error::InternalServer { request_id, .. } => {
                request_id.as_deref()
            }
            _ => None,
        }
    }

    /// Returns the status code associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Api { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    fn cause(&self) -> Option<&Cause> {
        match self {
            Error::Connection { source, .. }
            | Error::Serialization { source, .. }
            | Error::HttpClient { source, .. }
            | Error::Streaming { source, .. }
            | Error::Encoding { source, .. } => source.as_ref(),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Api {
                message,
                error_type,
                request_id,
                ..
            } => {
                match error_type {
                    Some(error_type) => write!(f, "{error_type}: {message}")?,
                    None => write!(f, "API error: {message}")?,
                }
                if let Some(request_id) = request_id {
                    write!(f, " (request ID: {request_id})")?;
                }
                Ok(())
            }
            Error::Authentication { message } => {
                write!(f, "authentication failed: {message}")
            }
            Error::Permission { message } => {
                write!(f, "permission denied: {message}")
            }
            Error::NotFound { message } => {
                write!(f, "not found: {message}")
            }
            Error::RateLimit {
                message,
                retry_after,
            } => {
                write!(f, "rate limited: {message}")?;
                if let Some(retry_after) = retry_after {
                    write!(f, " (retry after {retry_after}s)")?;
                }
                Ok(())
            }
            Error::BadRequest { message, param } => {
                write!(f, "bad request: {message}")?;
                if let Some(param) = param {
                    write!(f, " (parameter: {param})")?;
                }
                Ok(())
            }
            Error::Timeout { message, duration } => {
                write!(f, "timed out: {message}")?;
                if let Some(duration) = duration {
                    write!(f, " (after {duration}s)")?;
                }
                Ok(())
            }
            Error::Connection { message, .. } => {
                write!(f, "connection failed: {message}")
            }
            Error::InternalServer {
                message,
                request_id,
            } => {
                write!(f, "internal server error: {message}")?;
                if let Some(request_id) = request_id {
                    write!(f, " (request ID: {request_id})")?;
                }
                Ok(())
            }
            Error::ServiceUnavailable {
                message,
                retry_after,
            } => {
                write!(f, "service unavailable: {message}")?;
                if let Some(retry_after) = retry_after {
                    write!(f, " (retry after {retry_after}s)")?;
                }
                Ok(())
            }
            Error::Serialization { message, .. } => {
                write!(f, "serialization failed: {message}")
            }
            Error::HttpClient { message, .. } => {
                write!(f, "HTTP client error: {message}")
            }
            Error::Validation { message, param } => {
                write!(f, "invalid parameter: {message}")?;
                if let Some(param) = param {
                    write!(f, " (parameter: {param})")?;
                }
                Ok(())
            }
            Error::Streaming { message, .. } => {
                write!(f, "stream failed: {message}")
            }
            Error::Encoding { message, .. } => {
                write!(f, "encoding error: {message}")
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        self.cause()
            .map(|cause| cause.as_ref() as &(dyn error::Error + 'static))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::serialization(err.to_string(), Some(Box::new(err)))
    }
}

/// A specialized Result type for palaver operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_request_id() {
        let err = Error::api(
            529,
            Some("overloaded_error".to_string()),
            "try later".to_string(),
            Some("req_42".to_string()),
        );
        let rendered = err.to_string();
        assert!(rendered.contains("overloaded_error"));
        assert!(rendered.contains("req_42"));
    }

    #[test]
    fn retryable_classification() {
        assert!(Error::rate_limit("slow down", Some(5)).is_retryable());
        assert!(Error::connection("refused", None).is_retryable());
        assert!(Error::timeout("too slow", Some(60.0)).is_retryable());
        assert!(!Error::authentication("bad key").is_retryable());
        assert!(!Error::bad_request("bad param", None).is_retryable());
    }

    #[test]
    fn status_code_only_for_api_errors() {
        let err = Error::api(418, None, "teapot".to_string(), None);
        assert_eq!(err.status_code(), Some(418));
        assert_eq!(Error::permission("nope").status_code(), None);
    }

    #[test]
    fn source_reaches_the_cause() {
        let inner = serde_json::from_str::<i32>("not json").unwrap_err();
        let err = Error::from(inner);
        assert!(error::Error::source(&err).is_some());
        assert!(error::Error::source(&Error::not_found("gone")).is_none());
    }
}
