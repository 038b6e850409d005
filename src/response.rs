use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{ReportMode, ReportingConfig};
use crate::errors::{ErrorRecord, Severity};
use crate::logging::Logger;

/// Delimiter used when joining error strings unless one is given
pub const DEFAULT_DELIMITER: &str = ", ";

const NO_ERRORS: &str = "No errors.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceResponseError {
    #[error("a logger is required for {operation}")]
    MissingLogger { operation: &'static str },
}

/// Payload returned by a service together with any errors raised while
/// producing it.
///
/// Error storage is only allocated once the first error is added; an
/// error-free response exposes an empty slice.
#[derive(Debug, Clone)]
pub struct ServiceResponse<T> {
    payload: Option<T>,
    // Never `Some` with an empty vec
    errors: Option<Vec<ErrorRecord>>,
}

impl<T> Default for ServiceResponse<T> {
    fn default() -> Self {
        Self {
            payload: None,
            errors: None,
        }
    }
}

impl<T> ServiceResponse<T> {
    pub fn new(payload: Option<T>, errors: impl IntoIterator<Item = ErrorRecord>) -> Self {
        Self {
            payload,
            errors: non_empty(errors.into_iter().collect()),
        }
    }

    pub fn with_payload(payload: T) -> Self {
        Self::new(Some(payload), [])
    }

    pub fn from_errors(errors: impl IntoIterator<Item = ErrorRecord>) -> Self {
        Self::new(None, errors)
    }

    pub fn from_error(error: ErrorRecord) -> Self {
        Self::from_errors([error])
    }

    pub fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    pub fn payload_mut(&mut self) -> Option<&mut T> {
        self.payload.as_mut()
    }

    pub fn take_payload(&mut self) -> Option<T> {
        self.payload.take()
    }

    pub fn errors(&self) -> &[ErrorRecord] {
        self.errors.as_deref().unwrap_or(&[])
    }

    /// Mutable access to stored records, e.g. to enrich one in place
    pub fn errors_mut(&mut self) -> &mut [ErrorRecord] {
        self.errors.as_deref_mut().unwrap_or(&mut [])
    }

    /// Whether a payload is present. A payload equal to its type's default
    /// still counts.
    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }

    pub fn has_errors(&self) -> bool {
        self.errors.is_some()
    }

    pub fn set_payload(&mut self, payload: impl Into<Option<T>>) {
        self.payload = payload.into();
    }

    pub fn add_error(&mut self, error: ErrorRecord) {
        self.errors.get_or_insert_with(Vec::new).push(error);
    }

    pub fn add_errors(&mut self, errors: impl IntoIterator<Item = ErrorRecord>) {
        let mut errors = errors.into_iter().peekable();
        if errors.peek().is_none() {
            return;
        }

        self.errors.get_or_insert_with(Vec::new).extend(errors);
    }

    /// Replace all errors. An empty input leaves the response error-free.
    pub fn set_errors(&mut self, errors: impl IntoIterator<Item = ErrorRecord>) {
        self.errors = non_empty(errors.into_iter().collect());
    }

    /// Remove the first record equal to `error`
    pub fn remove_error(&mut self, error: &ErrorRecord) -> bool {
        let Some(errors) = self.errors.as_mut() else {
            return false;
        };
        let Some(index) = errors.iter().position(|existing| existing == error) else {
            return false;
        };

        errors.remove(index);
        self.release_if_empty();
        true
    }

    /// Remove every record matching `predicate`, returning how many were removed
    pub fn remove_errors(&mut self, mut predicate: impl FnMut(&ErrorRecord) -> bool) -> usize {
        let Some(errors) = self.errors.as_mut() else {
            return 0;
        };

        let before = errors.len();
        errors.retain(|error| !predicate(error));
        let removed = before - errors.len();

        self.release_if_empty();
        removed
    }

    pub fn clear_errors(&mut self) {
        self.errors = None;
    }

    fn release_if_empty(&mut self) {
        if self.errors.as_ref().is_some_and(Vec::is_empty) {
            self.errors = None;
        }
    }

    fn filtered(&self, minimum: Option<Severity>) -> impl Iterator<Item = &ErrorRecord> {
        self.errors()
            .iter()
            .filter(move |error| minimum.map_or(true, |minimum| error.severity() >= minimum))
    }

    /// Join the display strings of all errors at or above `minimum`.
    ///
    /// Returns `"No errors."` when the response has no errors at all, but an
    /// empty string when errors exist and none pass the threshold.
    pub fn joined_error_string(&self, delimiter: &str, minimum: Option<Severity>) -> String {
        if !self.has_errors() {
            return NO_ERRORS.to_string();
        }

        self.filtered(minimum)
            .map(ErrorRecord::to_display_string)
            .collect::<Vec<_>>()
            .join(delimiter)
    }

    /// [`joined_error_string`](Self::joined_error_string) using the configured
    /// delimiter and threshold
    pub fn joined_error_string_for(&self, config: &ReportingConfig) -> String {
        self.joined_error_string(&config.delimiter, config.minimum_severity)
    }

    /// Issue a single log call covering every error at or above `minimum`.
    ///
    /// The call is made at the highest severity among those errors, with the
    /// first cause found among them.
    pub fn log_messages(
        &self,
        logger: Option<&dyn Logger>,
        minimum: Option<Severity>,
    ) -> Result<(), ServiceResponseError> {
        self.log_messages_with_delimiter(logger, DEFAULT_DELIMITER, minimum)
    }

    pub fn log_messages_with_delimiter(
        &self,
        logger: Option<&dyn Logger>,
        delimiter: &str,
        minimum: Option<Severity>,
    ) -> Result<(), ServiceResponseError> {
        let logger = require_logger(logger, "log_messages")?;

        let filtered: Vec<&ErrorRecord> = self.filtered(minimum).collect();
        let Some(highest) = filtered.iter().map(|error| error.severity()).max() else {
            return Ok(());
        };
        let cause = filtered.iter().find_map(|error| error.cause());

        let message = format!("Errors: {}", self.joined_error_string(delimiter, minimum));
        logger.log(highest, cause.map(|cause| &**cause), &message);

        Ok(())
    }

    /// Issue one log call per error at or above `minimum`, each at the
    /// error's own severity
    pub fn log_messages_individually(
        &self,
        logger: Option<&dyn Logger>,
        minimum: Option<Severity>,
    ) -> Result<(), ServiceResponseError> {
        let logger = require_logger(logger, "log_messages_individually")?;

        for error in self.filtered(minimum) {
            logger.log(
                error.severity(),
                error.cause().map(|cause| &**cause),
                &error.to_display_string(),
            );
        }

        Ok(())
    }

    /// Log errors the way `config` asks for
    pub fn report(
        &self,
        logger: Option<&dyn Logger>,
        config: &ReportingConfig,
    ) -> Result<(), ServiceResponseError> {
        debug!(
            mode = ?config.mode,
            minimum_severity = ?config.minimum_severity,
            errors = self.errors().len(),
            "Reporting service response errors"
        );

        match config.mode {
            ReportMode::Aggregate => {
                self.log_messages_with_delimiter(logger, &config.delimiter, config.minimum_severity)
            }
            ReportMode::Individual => {
                self.log_messages_individually(logger, config.minimum_severity)
            }
        }
    }

    pub fn into_parts(self) -> (Option<T>, Vec<ErrorRecord>) {
        (self.payload, self.errors.unwrap_or_default())
    }

    /// `Ok` only when a payload is present and there are no errors
    pub fn into_result(self) -> Result<T, Vec<ErrorRecord>> {
        match (self.payload, self.errors) {
            (Some(payload), None) => Ok(payload),
            (_, errors) => Err(errors.unwrap_or_default()),
        }
    }
}

impl<T> From<ErrorRecord> for ServiceResponse<T> {
    fn from(error: ErrorRecord) -> Self {
        Self::from_error(error)
    }
}

impl<T> Extend<ErrorRecord> for ServiceResponse<T> {
    fn extend<I: IntoIterator<Item = ErrorRecord>>(&mut self, iter: I) {
        self.add_errors(iter);
    }
}

fn non_empty(errors: Vec<ErrorRecord>) -> Option<Vec<ErrorRecord>> {
    (!errors.is_empty()).then_some(errors)
}

fn require_logger<'a>(
    logger: Option<&'a dyn Logger>,
    operation: &'static str,
) -> Result<&'a dyn Logger, ServiceResponseError> {
    logger.ok_or_else(|| {
        warn!(operation, "Logging requested without a logger");
        ServiceResponseError::MissingLogger { operation }
    })
}
