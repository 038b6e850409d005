use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use super::context::{HttpResponseContext, ResponseBodyError, ResponseContext};
use super::severity::Severity;

/// Underlying error attached to a record
pub type Cause = Arc<dyn StdError + Send + Sync + 'static>;

/// Response attached to a record, shared with whoever produced it
pub type SharedResponse = Arc<dyn ResponseContext>;

const UNSPECIFIED_ERROR: &str = "Unspecified error";

/// A single failure with enough context to log or display it later
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    message: String,
    severity: Severity,
    cause: Option<Cause>,
    response: Option<SharedResponse>,
}

impl ErrorRecord {
    /// Create a record from optional parts.
    ///
    /// Without an explicit message, the cause's message is used, then the
    /// response's status code, then `"Unspecified error"`.
    pub fn from_parts(
        message: Option<String>,
        severity: Severity,
        cause: Option<Cause>,
        response: Option<SharedResponse>,
    ) -> Self {
        let message = message
            .or_else(|| cause.as_ref().map(|cause| cause.to_string()))
            .or_else(|| {
                response
                    .as_ref()
                    .map(|response| response.status_code().to_string())
            })
            .unwrap_or_else(|| UNSPECIFIED_ERROR.to_string());

        Self {
            message,
            severity,
            cause,
            response,
        }
    }

    pub fn new(message: impl Into<String>) -> Self {
        Self::from_parts(Some(message.into()), Severity::default(), None, None)
    }

    /// Create a record whose message is taken from `cause`
    pub fn from_cause(cause: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::from_parts(None, Severity::default(), Some(into_cause(cause)), None)
    }

    /// Create a record whose message is the response's status code
    pub fn from_response(response: SharedResponse) -> Self {
        Self::from_parts(None, Severity::default(), None, Some(response))
    }

    pub fn from_http_response(response: reqwest::Response) -> Self {
        Self::from_response(Arc::new(HttpResponseContext::new(response)))
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_cause(mut self, cause: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        self.cause = Some(into_cause(cause));
        self
    }

    pub fn with_response(mut self, response: SharedResponse) -> Self {
        self.response = Some(response);
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }

    pub fn response(&self) -> Option<&SharedResponse> {
        self.response.as_ref()
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    pub fn set_severity(&mut self, severity: Severity) {
        self.severity = severity;
    }

    pub fn set_cause(&mut self, cause: Option<Cause>) {
        self.cause = cause;
    }

    pub fn set_response(&mut self, response: Option<SharedResponse>) {
        self.response = response;
    }

    /// Render the record without the response body
    pub fn to_display_string(&self) -> String {
        self.to_string()
    }

    /// Render the record including the response body.
    ///
    /// Reading the body may fail if the response does not support reading it
    /// more than once.
    pub async fn to_display_string_with_body(&self) -> Result<String, ResponseBodyError> {
        let mut rendered = self.to_display_string();

        if let Some(response) = &self.response {
            let body = response.read_body().await?;
            rendered.push_str("\nHttpResponse: ");
            rendered.push_str(&body);
        }

        Ok(rendered)
    }
}

/// Helpers for creating records at a given severity
impl ErrorRecord {
    pub fn trace(message: impl Into<String>) -> Self {
        Self::new(message).with_severity(Severity::Trace)
    }

    pub fn debug(message: impl Into<String>) -> Self {
        Self::new(message).with_severity(Severity::Debug)
    }

    pub fn information(message: impl Into<String>) -> Self {
        Self::new(message).with_severity(Severity::Information)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message).with_severity(Severity::Warning)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message).with_severity(Severity::Error)
    }

    pub fn critical(message: impl Into<String>) -> Self {
        Self::new(message).with_severity(Severity::Critical)
    }
}

fn into_cause(cause: impl Into<Box<dyn StdError + Send + Sync>>) -> Cause {
    Arc::from(cause.into())
}

fn write_cause_chain(f: &mut fmt::Formatter<'_>, cause: &(dyn StdError + 'static)) -> fmt::Result {
    write!(f, "{}", cause)?;

    let mut source = cause.source();
    while let Some(inner) = source {
        write!(f, "\nCaused by: {}", inner)?;
        source = inner.source();
    }

    Ok(())
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.severity, self.message)?;

        if let Some(cause) = &self.cause {
            f.write_str("\nException: ")?;
            write_cause_chain(f, &**cause)?;
        }

        if let Some(response) = &self.response {
            write!(f, "\nStatusCode: {}", response.status_code())?;
        }

        Ok(())
    }
}

fn same_shared<T: ?Sized>(a: &Option<Arc<T>>, b: &Option<Arc<T>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
        _ => false,
    }
}

/// Records are equal when message and severity match and they point at the
/// same cause and response objects.
impl PartialEq for ErrorRecord {
    fn eq(&self, other: &Self) -> bool {
        self.message == other.message
            && self.severity == other.severity
            && same_shared(&self.cause, &other.cause)
            && same_shared(&self.response, &other.response)
    }
}

impl Eq for ErrorRecord {}
