//! # Handler references
//!
//! Routers do not run handlers; they only decide *which* handler a
//! dispatch should run. [`HandlerRef`] is that decision: a closed set of
//! shapes a handler can take.
//!
//! # Shapes
//!
//! 1. **Named**: an identifier resolved later, e.g. through a service locator
//! 2. **Handle**: an opaque object the invoking layer knows how to drive
//! 3. **Invocable**: something implementing [`Invoke`], including closures

use crate::{
    error::{BoxError, InvalidArgument},
    message::Message,
};
use std::{any::Any, fmt, sync::Arc};

/// Something that can be called with a message.
pub trait Invoke<M>: Send + Sync + 'static {
    /// Run the handler.
    fn invoke(&self, message: &M) -> Result<(), BoxError>;
}

// Blanket impl for closures
impl<M, F> Invoke<M> for F
where
    F: Fn(&M) -> Result<(), BoxError> + Send + Sync + 'static,
{
    fn invoke(&self, message: &M) -> Result<(), BoxError> {
        (self)(message)
    }
}

/// The sink for messages redirected to asynchronous processing.
///
/// A producer typically serializes the message onto a queue; the consumer on
/// the other side sends it back into a bus, where it is routed normally.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot produce messages of type `{M}`",
    label = "missing `MessageProducer<{M}>` implementation"
)]
pub trait MessageProducer<M: Message>: Send + Sync + 'static {
    /// Hand the message over to the async channel.
    fn handle(&self, message: &M) -> Result<(), BoxError>;
}

/// Adapts a [`MessageProducer`] so it can be assigned as a handler.
pub struct ProducerInvoker<M: Message> {
    producer: Arc<dyn MessageProducer<M>>,
}

impl<M: Message> ProducerInvoker<M> {
    /// Wrap a shared producer.
    pub fn new(producer: Arc<dyn MessageProducer<M>>) -> Self {
        Self { producer }
    }

    /// The wrapped producer.
    pub fn producer(&self) -> &Arc<dyn MessageProducer<M>> {
        &self.producer
    }
}

impl<M: Message> Invoke<M> for ProducerInvoker<M> {
    fn invoke(&self, message: &M) -> Result<(), BoxError> {
        self.producer.handle(message)
    }
}

/// A reference to the handler, finder, or listener assigned to a dispatch.
///
/// Equality is by name for [`HandlerRef::Named`] and by identity
/// (`Arc::ptr_eq`) for the other shapes, so cloning a reference yields an
/// equal reference.
pub enum HandlerRef<M> {
    /// A handler identified by name.
    Named(String),
    /// An opaque handler object.
    Handle(Arc<dyn Any + Send + Sync>),
    /// A callable handler.
    Invocable(Arc<dyn Invoke<M>>),
}

impl<M> HandlerRef<M> {
    /// Reference a handler by name.
    pub fn named(id: impl Into<String>) -> Self {
        HandlerRef::Named(id.into())
    }

    /// Reference an opaque handler object.
    pub fn handle<T: Any + Send + Sync>(object: T) -> Self {
        HandlerRef::Handle(Arc::new(object))
    }

    /// Reference a callable handler.
    pub fn invocable<I: Invoke<M>>(invoke: I) -> Self {
        HandlerRef::Invocable(Arc::new(invoke))
    }

    /// Reference a message producer.
    pub fn producer(producer: Arc<dyn MessageProducer<M>>) -> Self
    where
        M: Message,
    {
        HandlerRef::Invocable(Arc::new(ProducerInvoker::new(producer)))
    }

    /// Check that the reference can be used as a handler.
    ///
    /// Only named references can be malformed: the identifier must not be blank.
    pub fn validate(&self) -> Result<(), InvalidArgument> {
        match self {
            HandlerRef::Named(id) if id.trim().is_empty() => {
                Err(InvalidArgument::MalformedHandler {
                    reason: "handler name must not be empty".into(),
                })
            }
            _ => Ok(()),
        }
    }

    /// The name, if this is a named reference.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            HandlerRef::Named(id) => Some(id),
            _ => None,
        }
    }

    /// Downcast a handle reference to its concrete type.
    pub fn downcast_handle<T: Any + Send + Sync>(&self) -> Option<&T> {
        match self {
            HandlerRef::Handle(object) => object.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// The callable, if this is an invocable reference.
    pub fn as_invocable(&self) -> Option<&Arc<dyn Invoke<M>>> {
        match self {
            HandlerRef::Invocable(invoke) => Some(invoke),
            _ => None,
        }
    }

    /// Short description for logs and error messages.
    pub fn describe(&self) -> String {
        match self {
            HandlerRef::Named(id) => id.clone(),
            HandlerRef::Handle(_) => "<handle>".into(),
            HandlerRef::Invocable(_) => "<invocable>".into(),
        }
    }
}

impl<M> Clone for HandlerRef<M> {
    fn clone(&self) -> Self {
        match self {
            HandlerRef::Named(id) => HandlerRef::Named(id.clone()),
            HandlerRef::Handle(object) => HandlerRef::Handle(Arc::clone(object)),
            HandlerRef::Invocable(invoke) => HandlerRef::Invocable(Arc::clone(invoke)),
        }
    }
}

impl<M> PartialEq for HandlerRef<M> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (HandlerRef::Named(a), HandlerRef::Named(b)) => a == b,
            (HandlerRef::Handle(a), HandlerRef::Handle(b)) => Arc::ptr_eq(a, b),
            (HandlerRef::Invocable(a), HandlerRef::Invocable(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<M> fmt::Debug for HandlerRef<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerRef::Named(id) => f.debug_tuple("Named").field(id).finish(),
            HandlerRef::Handle(_) => f.write_str("Handle(..)"),
            HandlerRef::Invocable(_) => f.write_str("Invocable(..)"),
        }
    }
}

impl<M> From<&str> for HandlerRef<M> {
    fn from(id: &str) -> Self {
        HandlerRef::named(id)
    }
}

impl<M> From<String> for HandlerRef<M> {
    fn from(id: String) -> Self {
        HandlerRef::Named(id)
    }
}
