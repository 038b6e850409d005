//! Logger collaborator used to report accumulated errors

mod subscriber;
mod tracing_logger;

use std::error::Error as StdError;
use std::sync::Arc;

use crate::errors::Severity;

pub use subscriber::init_tracing;
pub use tracing_logger::TracingLogger;

/// Sink for log calls issued by [`ServiceResponse`](crate::ServiceResponse)
pub trait Logger: Send + Sync {
    fn log(
        &self,
        severity: Severity,
        cause: Option<&(dyn StdError + Send + Sync + 'static)>,
        message: &str,
    );
}

impl<L: Logger + ?Sized> Logger for &L {
    fn log(
        &self,
        severity: Severity,
        cause: Option<&(dyn StdError + Send + Sync + 'static)>,
        message: &str,
    ) {
        (**self).log(severity, cause, message)
    }
}

impl<L: Logger + ?Sized> Logger for Box<L> {
    fn log(
        &self,
        severity: Severity,
        cause: Option<&(dyn StdError + Send + Sync + 'static)>,
        message: &str,
    ) {
        (**self).log(severity, cause, message)
    }
}

impl<L: Logger + ?Sized> Logger for Arc<L> {
    fn log(
        &self,
        severity: Severity,
        cause: Option<&(dyn StdError + Send + Sync + 'static)>,
        message: &str,
    ) {
        (**self).log(severity, cause, message)
    }
}
