//! Uniform success / partial-failure / failure envelope for service-layer
//! functions, with helpers to render and log the errors it carries.

pub mod config;
pub mod errors;
pub mod logging;
pub mod response;

pub use config::{ReportMode, ReportingConfig};
pub use errors::{
    Cause, ErrorRecord, HttpResponseContext, ResponseBodyError, ResponseContext, Severity,
    SharedResponse,
};
pub use logging::{init_tracing, Logger, TracingLogger};
pub use response::{ServiceResponse, ServiceResponseError, DEFAULT_DELIMITER};
