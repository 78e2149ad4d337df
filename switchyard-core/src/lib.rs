//! # switchyard-core
//!
//! Core traits and types for the Switchyard message router.
//!
//! This crate has minimal dependencies and is meant to be imported by
//! buses, transports, and plugins that do not need the standard routers
//! in `switchyard-std`.
//!
//! # Pieces
//!
//! ## Message contract ([`Message`])
//!
//! What a router needs from a message: a name, optionally a declared
//! kind, an async-eligibility flag, and immutable [`Metadata`] with a
//! copy-on-write update.
//!
//! ## Handler references ([`HandlerRef`])
//!
//! The closed set of shapes a handler can take: a name, an opaque handle,
//! or something [`Invoke`]-able.
//!
//! ## Dispatch contexts ([`Dispatch`])
//!
//! Per-message state with a phase. Routers may assign a command handler,
//! a finder, or event listeners only while the context is initializing.
//!
//! ## Route listeners ([`RouteListener`])
//!
//! The single-method seam routers and router decorators implement.
//!
//! # Error Types
//!
//! - [`SwitchyardError`] - Top-level error type
//! - [`InvalidArgument`] - Malformed patterns, handlers, or messages
//! - [`RuntimeError`] - Builder misuse, ambiguous routes, late assignment

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod dispatch;
mod error;
mod handler;
mod logger;
mod message;
mod route;

// Re-exports
pub use dispatch::{CommandDispatch, Dispatch, EventDispatch, ListenersMut, Phase, QueryDispatch};
pub use error::{BoxError, InvalidArgument, RuntimeError, SwitchyardError};
pub use handler::{HandlerRef, Invoke, MessageProducer, ProducerInvoker};
pub use logger::{Logger, NullLogger};
pub use message::{HANDLED_ASYNC, Message, MessageKind, Metadata, MetadataValue};
pub use route::{DEFAULT_PRIORITY, RouteFn, RouteListener, route_fn};
