//! Logger capability handed to dispatch contexts.

/// Where routers report non-fatal conditions.
///
/// The context carries a logger so routers can report without knowing
/// which backend the bus uses.
pub trait Logger: Send + Sync + 'static {
    /// Report a noteworthy but harmless condition.
    fn notice(&self, message: &str);

    /// Report routing detail.
    fn debug(&self, message: &str) {
        let _ = message;
    }
}

/// A logger that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn notice(&self, _message: &str) {}
}
