//! Error types for Switchyard.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`SwitchyardError`] - Top-level error type for all routing operations
//! - [`InvalidArgument`] - A value handed to the router or a context was malformed
//! - [`RuntimeError`] - A call arrived in a state that does not permit it

use crate::message::MessageKind;
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all Switchyard operations.
#[derive(Error, Debug)]
pub enum SwitchyardError {
    /// A malformed argument was rejected.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgument),

    /// An operation was attempted in a state that forbids it.
    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    /// An error raised by a user-provided route listener.
    #[error(transparent)]
    Custom(BoxError),
}

impl SwitchyardError {
    /// Returns the runtime error, if this is one.
    pub fn as_runtime(&self) -> Option<&RuntimeError> {
        match self {
            SwitchyardError::Runtime(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the invalid-argument error, if this is one.
    pub fn as_invalid_argument(&self) -> Option<&InvalidArgument> {
        match self {
            SwitchyardError::InvalidArgument(err) => Some(err),
            _ => None,
        }
    }
}

/// Rejected input: malformed patterns, handlers, or messages.
#[derive(Error, Debug)]
pub enum InvalidArgument {
    /// An empty string was given as a route pattern.
    #[error("route pattern must not be empty")]
    EmptyPattern,

    /// The route pattern is not a valid regular expression.
    #[error("route pattern {pattern} is not a valid regular expression")]
    InvalidPattern {
        /// The pattern as written by the caller.
        pattern: String,
        /// The compiler's complaint.
        #[source]
        source: BoxError,
    },

    /// The handler reference is not a usable handler.
    #[error("invalid handler provided: {reason}")]
    MalformedHandler {
        /// Why the handler was rejected.
        reason: String,
    },

    /// A message declared a kind that does not fit the dispatch being built.
    #[error("message {name} cannot be handled: message is not of type {expected} (declared {declared})")]
    KindMismatch {
        /// The message name, or `<unnamed>`.
        name: String,
        /// The kind of dispatch being built.
        expected: MessageKind,
        /// The kind the message declared.
        declared: MessageKind,
    },

    /// The message declares no kind, so it cannot be classified.
    #[error("message {name} does not declare a kind")]
    Unclassified {
        /// The message name, or `<unnamed>`.
        name: String,
    },
}

/// Misuse of the builder or of a dispatch context.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// `route()` was called while an earlier pattern still waits for `to()`.
    #[error("pattern {pattern} is not mapped to a handler")]
    UnterminatedPatternBinding {
        /// The pattern that is still pending.
        pattern: String,
    },

    /// `to()` was called with no pending pattern.
    #[error("cannot map handler {handler} to a pattern: call route before to")]
    UnboundPattern {
        /// Description of the orphaned handler.
        handler: String,
    },

    /// More than one pattern matched a command or query name.
    #[error("multiple handlers detected for message {message_name}: the patterns {first} and {second} both match")]
    AmbiguousRoute {
        /// The message name that was being routed.
        message_name: String,
        /// The first matching pattern in table order.
        first: String,
        /// The next matching pattern that conflicts with `first`.
        second: String,
    },

    /// A handler or listener was assigned after routing finished.
    #[error("cannot assign handlers: dispatch is already in the {phase} phase")]
    LateMutation {
        /// The phase the dispatch was in.
        phase: &'static str,
    },
}

impl From<BoxError> for SwitchyardError {
    fn from(err: BoxError) -> Self {
        SwitchyardError::Custom(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambiguous_route_names_both_patterns() {
        let err = RuntimeError::AmbiguousRoute {
            message_name: "order.create".into(),
            first: "/^order\\..*/".into(),
            second: "/.*/".into(),
        };
        let text = err.to_string();
        assert!(text.contains("order.create"));
        assert!(text.contains("/^order\\..*/"));
        assert!(text.contains("/.*/"));
    }

    #[test]
    fn conversions_into_top_level() {
        let err: SwitchyardError = RuntimeError::UnboundPattern {
            handler: "h".into(),
        }
        .into();
        assert!(matches!(
            err.as_runtime(),
            Some(RuntimeError::UnboundPattern { .. })
        ));
        assert!(err.as_invalid_argument().is_none());

        let err: SwitchyardError = InvalidArgument::EmptyPattern.into();
        assert!(matches!(
            err.as_invalid_argument(),
            Some(InvalidArgument::EmptyPattern)
        ));
    }
}
