use std::error::Error as StdError;

use super::Logger;
use crate::errors::Severity;

const DEFAULT_CATEGORY: &str = "service_response";

macro_rules! emit {
    ($level:ident, $category:expr, $severity:expr, $cause:expr, $message:expr) => {
        match $cause {
            Some(cause) => tracing::$level!(
                category = %$category,
                severity = %$severity,
                cause = %cause,
                "{}",
                $message
            ),
            None => tracing::$level!(
                category = %$category,
                severity = %$severity,
                "{}",
                $message
            ),
        }
    };
}

/// [`Logger`] that emits one `tracing` event per call
#[derive(Debug, Clone)]
pub struct TracingLogger {
    category: String,
}

impl TracingLogger {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
        }
    }

    /// Logger whose category is the name of the service type `T`
    pub fn for_type<T: ?Sized>() -> Self {
        Self::new(std::any::type_name::<T>())
    }

    pub fn category(&self) -> &str {
        &self.category
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new(DEFAULT_CATEGORY)
    }
}

impl Logger for TracingLogger {
    fn log(
        &self,
        severity: Severity,
        cause: Option<&(dyn StdError + Send + Sync + 'static)>,
        message: &str,
    ) {
        let category = self.category.as_str();

        // `tracing` macros need a constant level, so the mapping lives here
        match severity {
            Severity::Trace => emit!(trace, category, severity, cause, message),
            Severity::Debug => emit!(debug, category, severity, cause, message),
            Severity::Information => emit!(info, category, severity, cause, message),
            Severity::Warning => emit!(warn, category, severity, cause, message),
            Severity::Error | Severity::Critical => {
                emit!(error, category, severity, cause, message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::fmt;
    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    #[derive(Debug)]
    struct CapturedEvent {
        level: Level,
        fields: BTreeMap<String, String>,
    }

    #[derive(Clone, Default)]
    struct CaptureLayer(Arc<Mutex<Vec<CapturedEvent>>>);

    #[derive(Default)]
    struct FieldVisitor(BTreeMap<String, String>);

    impl Visit for FieldVisitor {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.0.insert(field.name().to_string(), format!("{:?}", value));
        }
    }

    impl<S: Subscriber> Layer<S> for CaptureLayer {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut visitor = FieldVisitor::default();
            event.record(&mut visitor);
            self.0.lock().unwrap().push(CapturedEvent {
                level: *event.metadata().level(),
                fields: visitor.0,
            });
        }
    }

    fn capture(f: impl FnOnce()) -> Vec<CapturedEvent> {
        let layer = CaptureLayer::default();
        let subscriber = tracing_subscriber::registry().with(layer.clone());
        tracing::subscriber::with_default(subscriber, f);

        let events = std::mem::take(&mut *layer.0.lock().unwrap());
        events
    }

    #[test]
    fn test_emits_event_at_mapped_level() {
        let logger = TracingLogger::new("CardService");
        let events = capture(|| {
            logger.log(Severity::Warning, None, "rate limit close");
            logger.log(Severity::Critical, None, "database unreachable");
        });

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].level, Level::WARN);
        assert_eq!(events[0].fields["message"], "rate limit close");
        assert_eq!(events[0].fields["category"], "CardService");
        assert_eq!(events[0].fields["severity"], "Warning");
        assert!(!events[0].fields.contains_key("cause"));

        assert_eq!(events[1].level, Level::ERROR);
        assert_eq!(events[1].fields["severity"], "Critical");
    }

    #[test]
    fn test_records_cause_field() {
        let logger = TracingLogger::default();
        let cause = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
        let events = capture(|| {
            logger.log(Severity::Information, Some(&cause), "retrying");
        });

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, Level::INFO);
        assert_eq!(events[0].fields["cause"], "timed out");
        assert_eq!(events[0].fields["category"], "service_response");
    }

    #[test]
    fn test_category_for_type() {
        struct CardService;
        let logger = TracingLogger::for_type::<CardService>();
        assert!(logger.category().ends_with("CardService"));
    }
}
