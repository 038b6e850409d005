use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use thiserror::Error;

use crate::errors::Severity;
use crate::response::DEFAULT_DELIMITER;

pub const DELIMITER_VAR: &str = "SERVICE_RESPONSE_DELIMITER";
pub const MIN_SEVERITY_VAR: &str = "SERVICE_RESPONSE_MIN_SEVERITY";
pub const LOG_MODE_VAR: &str = "SERVICE_RESPONSE_LOG_MODE";

/// How a response's errors are reported to a logger
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportMode {
    /// One call at the highest severity covering all errors
    #[default]
    Aggregate,
    /// One call per error
    Individual,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown report mode: {0:?}")]
pub struct ParseReportModeError(String);

impl FromStr for ReportMode {
    type Err = ParseReportModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aggregate" => Ok(Self::Aggregate),
            "individual" => Ok(Self::Individual),
            _ => Err(ParseReportModeError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportingConfig {
    pub delimiter: String,
    pub minimum_severity: Option<Severity>,
    pub mode: ReportMode,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            minimum_severity: None,
            mode: ReportMode::default(),
        }
    }
}

impl ReportingConfig {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup, applying the same defaults as
    /// [`from_env`](Self::from_env)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let minimum_severity = lookup(MIN_SEVERITY_VAR)
            .filter(|value| !value.trim().is_empty())
            .map(|value| value.parse::<Severity>())
            .transpose()
            .context("SERVICE_RESPONSE_MIN_SEVERITY must be a valid severity level")?;

        let mode = lookup(LOG_MODE_VAR)
            .filter(|value| !value.trim().is_empty())
            .map(|value| value.parse::<ReportMode>())
            .transpose()
            .context("SERVICE_RESPONSE_LOG_MODE must be 'aggregate' or 'individual'")?
            .unwrap_or_default();

        Ok(ReportingConfig {
            delimiter: lookup(DELIMITER_VAR).unwrap_or_else(|| DEFAULT_DELIMITER.to_string()),
            minimum_severity,
            mode,
        })
    }
}
