use async_trait::async_trait;
use reqwest::StatusCode;
use std::fmt;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ResponseBodyError {
    #[error("response body has already been consumed")]
    AlreadyConsumed,

    #[error("failed to read response body: {0}")]
    Read(#[from] reqwest::Error),
}

/// HTTP response attached to an error record.
///
/// The status code is available synchronously. Reading the body may suspend
/// and, depending on the implementation, may only succeed once.
#[async_trait]
pub trait ResponseContext: Send + Sync + fmt::Debug {
    fn status_code(&self) -> StatusCode;

    async fn read_body(&self) -> Result<String, ResponseBodyError>;
}

/// [`ResponseContext`] backed by a `reqwest` response.
///
/// The first body read consumes the underlying response; later reads return
/// [`ResponseBodyError::AlreadyConsumed`].
#[derive(Debug)]
pub struct HttpResponseContext {
    status: StatusCode,
    response: Mutex<Option<reqwest::Response>>,
}

impl HttpResponseContext {
    pub fn new(response: reqwest::Response) -> Self {
        Self {
            status: response.status(),
            response: Mutex::new(Some(response)),
        }
    }

    /// Whether the body has not been read yet
    pub async fn is_readable(&self) -> bool {
        self.response.lock().await.is_some()
    }
}

impl From<reqwest::Response> for HttpResponseContext {
    fn from(response: reqwest::Response) -> Self {
        Self::new(response)
    }
}

#[async_trait]
impl ResponseContext for HttpResponseContext {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    async fn read_body(&self) -> Result<String, ResponseBodyError> {
        let response = self
            .response
            .lock()
            .await
            .take()
            .ok_or(ResponseBodyError::AlreadyConsumed)?;

        debug!(status = %self.status, "Reading response body");
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &'static str) -> reqwest::Response {
        http::Response::builder()
            .status(status)
            .body(body)
            .unwrap()
            .into()
    }

    #[test]
    fn test_status_code_is_synchronous() {
        let context = HttpResponseContext::new(response(404, "missing"));
        assert_eq!(context.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_body_can_be_read_once() {
        let context = HttpResponseContext::from(response(502, "upstream down"));
        assert!(context.is_readable().await);

        let body = context.read_body().await.unwrap();
        assert_eq!(body, "upstream down");
        assert!(!context.is_readable().await);

        let second = context.read_body().await;
        assert!(matches!(second, Err(ResponseBodyError::AlreadyConsumed)));

        // Status survives the body being consumed
        assert_eq!(context.status_code(), StatusCode::BAD_GATEWAY);
    }
}
