//! Logger backed by `tracing`.

use switchyard_core::Logger;

/// A [`Logger`] that forwards to `tracing`.
///
/// Notices become `INFO` events and debug output becomes `DEBUG` events,
/// both tagged with the logger's name. Without the `tracing` feature the
/// logger discards everything.
///
/// # Example
///
/// ```rust,ignore
/// let dispatch = Dispatch::command(message)?
///     .with_logger(Arc::new(TracingLogger::named("command-bus")));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TracingLogger {
    name: &'static str,
}

impl TracingLogger {
    /// Create a new `TracingLogger` with a default name.
    pub fn new() -> Self {
        Self { name: "switchyard" }
    }

    /// Create a new `TracingLogger` with a custom name.
    pub fn named(name: &'static str) -> Self {
        Self { name }
    }

    /// The name attached to every record.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger for TracingLogger {
    fn notice(&self, message: &str) {
        #[cfg(feature = "tracing")]
        {
            tracing::info!(logger = %self.name, "{message}");
        }

        #[cfg(not(feature = "tracing"))]
        {
            let _ = (self.name, message);
        }
    }

    fn debug(&self, message: &str) {
        #[cfg(feature = "tracing")]
        {
            tracing::debug!(logger = %self.name, "{message}");
        }

        #[cfg(not(feature = "tracing"))]
        {
            let _ = (self.name, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logging_never_fails() {
        let logger = TracingLogger::named("bus");
        logger.notice("no message name");
        logger.debug("routed");
        assert_eq!(logger.name(), "bus");
        assert_eq!(TracingLogger::default().name(), "switchyard");
    }
}
