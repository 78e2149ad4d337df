//! # switchyard-std
//!
//! Standard implementations for the Switchyard message router.
//!
//! This crate provides:
//! - **Pattern routing**: [`RegexRouter`], [`regex_routes!`] macro
//! - **Async switching**: [`AsyncSwitchRouter`]
//! - **Route pipeline**: [`RoutePipeline`]
//! - **Logging**: [`TracingLogger`]
//! - **Testing utilities**: [`testing`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use switchyard_core;

// Modules
pub mod logging;
pub mod pipeline;
pub mod routing;
pub mod testing;

pub use logging::TracingLogger;
pub use pipeline::{ListenerHandle, RoutePipeline};
pub use routing::{AsyncSwitchRouter, RegexRouter, RouteTarget, Rule};
