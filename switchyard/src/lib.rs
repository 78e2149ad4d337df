//! # switchyard - Message Dispatch & Routing
//!
//! `switchyard` decides which handler runs a command or query, and which
//! listeners receive an event. It does not run them: it fills in a
//! per-message [`Dispatch`] context that the bus then executes.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use switchyard::prelude::*;
//!
//! let mut router = RegexRouter::new();
//! router.route(r"/^order\..*/")?.to("order-handler")?;
//!
//! let mut pipeline = RoutePipeline::new();
//! pipeline.attach(AsyncSwitchRouter::new(router, producer));
//!
//! let mut dispatch = Dispatch::command(message)?;
//! pipeline.prepare(&mut dispatch)?;
//! let handler = dispatch.handler();
//! ```
//!
//! ## Routing rules
//!
//! - Commands and queries get at most one handler. Two distinct patterns
//!   matching the same name is a [`RuntimeError::AmbiguousRoute`].
//! - Events get one listener per matching rule, in rule order.
//! - Async-eligible messages are sent to the producer exactly once.

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use switchyard_core::{
    // Errors
    BoxError,
    // Dispatch contexts
    CommandDispatch,
    DEFAULT_PRIORITY,
    Dispatch,
    EventDispatch,
    HANDLED_ASYNC,
    // Handlers
    HandlerRef,
    InvalidArgument,
    Invoke,
    ListenersMut,
    // Logging
    Logger,
    // Messages
    Message,
    MessageKind,
    MessageProducer,
    Metadata,
    MetadataValue,
    NullLogger,
    Phase,
    ProducerInvoker,
    QueryDispatch,
    // Route listeners
    RouteFn,
    RouteListener,
    RuntimeError,
    SwitchyardError,
    route_fn,
};

pub use switchyard_std::{
    AsyncSwitchRouter, ListenerHandle, RegexRouter, RouteTarget, RoutePipeline, Rule,
    TracingLogger, regex_routes,
};

/// Standard route listeners.
pub mod routing {
    pub use switchyard_std::routing::{AsyncSwitchRouter, RegexRouter, RouteTarget, Rule};
}

/// Testing utilities.
pub mod testing {
    pub use switchyard_std::testing::{RecordingLogger, RecordingProducer, SpyRouter, TestMessage};
}

/// Prelude module - common imports for Switchyard.
///
/// # Usage
///
/// ```rust,ignore
/// use switchyard::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        AsyncSwitchRouter, Dispatch, HandlerRef, Message, MessageKind, MessageProducer, Metadata,
        MetadataValue, RegexRouter, RouteListener, RoutePipeline, RuntimeError, SwitchyardError,
    };
}
