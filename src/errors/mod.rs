//! Error records carried by service responses

pub mod context;
pub mod record;
pub mod severity;

pub use context::{HttpResponseContext, ResponseBodyError, ResponseContext};
pub use record::{Cause, ErrorRecord, SharedResponse};
pub use severity::{ParseSeverityError, Severity};
