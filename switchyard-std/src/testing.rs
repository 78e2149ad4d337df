//! Testing utilities for Switchyard.
//!
//! This module provides utilities to make testing routers and buses easier.
//!
//! # Features
//!
//! - [`TestMessage`]: A message with a builder for every trait knob
//! - [`RecordingLogger`]: A logger that keeps every notice
//! - [`RecordingProducer`]: A producer that keeps every message it receives
//! - [`SpyRouter`]: A route listener that records what it saw

use std::sync::{Arc, Mutex};
use switchyard_core::{
    BoxError, Dispatch, HandlerRef, Logger, Message, MessageKind, MessageProducer, Metadata,
    MetadataValue, RouteListener, SwitchyardError,
};

// ============================================================================
// Test Message
// ============================================================================

/// A message whose name, declared kind, and async flag are set by the test.
///
/// # Example
///
/// ```rust,ignore
/// let message = TestMessage::named("order.create")
///     .async_eligible()
///     .with_meta("tenant", "acme");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestMessage {
    name: Option<String>,
    declared: Option<MessageKind>,
    async_eligible: bool,
    payload: String,
    metadata: Metadata,
}

impl TestMessage {
    /// A message with no name.
    pub fn unnamed() -> Self {
        Self::default()
    }

    /// A message with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Make the message declare a kind, as a transport-wrapped message would.
    pub fn declared_as(mut self, kind: MessageKind) -> Self {
        self.declared = Some(kind);
        self
    }

    /// Mark the message for async redirection.
    pub fn async_eligible(mut self) -> Self {
        self.async_eligible = true;
        self
    }

    /// Attach a payload.
    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Add a metadata entry.
    pub fn with_meta(mut self, key: &str, value: impl Into<MetadataValue>) -> Self {
        self.metadata = self.metadata.with_added_entry(key, value);
        self
    }

    /// The payload.
    pub fn payload(&self) -> &str {
        &self.payload
    }
}

impl Message for TestMessage {
    fn message_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn declared_kind(&self) -> Option<MessageKind> {
        self.declared
    }

    fn is_async(&self) -> bool {
        self.async_eligible
    }

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    fn with_added_metadata(&self, key: &str, value: MetadataValue) -> Self {
        Self {
            metadata: self.metadata.with_added_entry(key, value),
            ..self.clone()
        }
    }
}

// ============================================================================
// Recording Logger
// ============================================================================

/// A logger that records every notice.
///
/// Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct RecordingLogger {
    notices: Arc<Mutex<Vec<String>>>,
}

impl RecordingLogger {
    /// Create an empty recording logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a clone of the recorded notices.
    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().unwrap().clone()
    }
}

impl Logger for RecordingLogger {
    fn notice(&self, message: &str) {
        self.notices.lock().unwrap().push(message.to_owned());
    }
}

// ============================================================================
// Recording Producer
// ============================================================================

/// A producer that records every message handed to it.
pub struct RecordingProducer<M> {
    messages: Mutex<Vec<M>>,
}

impl<M: Clone> RecordingProducer<M> {
    /// Create an empty recording producer.
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
        }
    }

    /// Get a clone of the produced messages.
    pub fn messages(&self) -> Vec<M> {
        self.messages.lock().unwrap().clone()
    }
}

impl<M: Clone> Default for RecordingProducer<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Message + Clone> MessageProducer<M> for RecordingProducer<M> {
    fn handle(&self, message: &M) -> Result<(), BoxError> {
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }
}

// ============================================================================
// Spy Router
// ============================================================================

/// A route listener that records the names it routes and can assign a handler.
///
/// Clones share the same record.
///
/// # Example
///
/// ```rust,ignore
/// let spy = SpyRouter::assigning("fallback");
/// pipeline.attach(spy.clone());
///
/// pipeline.route(&mut dispatch)?;
/// assert_eq!(spy.seen(), vec!["order.create"]);
/// ```
#[derive(Debug, Clone)]
pub struct SpyRouter {
    name: String,
    assign: Option<String>,
    seen: Arc<Mutex<Vec<String>>>,
}

impl SpyRouter {
    /// A spy that only records.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            assign: None,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A spy that also assigns `handler` as the exclusive handler.
    pub fn assigning(handler: impl Into<String>) -> Self {
        Self {
            assign: Some(handler.into()),
            ..Self::named("spy")
        }
    }

    /// Message names routed so far; `<unnamed>` for messages without one.
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

impl<M: Message> RouteListener<M> for SpyRouter {
    fn on_route(&self, dispatch: &mut Dispatch<M>) -> Result<(), SwitchyardError> {
        let name = dispatch.message_name().unwrap_or("<unnamed>").to_owned();
        self.seen.lock().unwrap().push(name);

        if let Some(handler) = &self.assign {
            dispatch.assign_exclusive(HandlerRef::named(handler.clone()))?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
