//! # Routing Implementations
//!
//! This module provides the standard route listeners:
//!
//! - **Pattern routing**: [`RegexRouter`] matches message names against an ordered rule table.
//! - **Async switching**: [`AsyncSwitchRouter`] sends async messages to a producer once.
//!
//! # Choosing a Router
//!
//! | Router | Use Case |
//! |--------|----------|
//! | `RegexRouter` | Name-based routing of commands, queries, and events |
//! | `AsyncSwitchRouter` | Wrapping any router when some messages go over a queue |

pub mod async_switch;
pub mod pattern;

pub use async_switch::AsyncSwitchRouter;
pub use pattern::{RegexRouter, RouteTarget, Rule};

/// Build a [`RegexRouter`] from `pattern => target` pairs.
///
/// Targets are anything convertible into a [`RouteTarget`]: a handler
/// name, a [`HandlerRef`](switchyard_core::HandlerRef), or a `Vec` of
/// either. Evaluates to `Result<RegexRouter<M>, SwitchyardError>`.
///
/// # Example
///
/// ```rust,ignore
/// let router: RegexRouter<MyMessage> = regex_routes! {
///     r"/^order\..*/" => "order-handler",
///     "/.*/" => vec!["audit", "metrics"],
/// }?;
/// ```
#[macro_export]
macro_rules! regex_routes {
    ($($pattern:expr => $target:expr),* $(,)?) => {
        $crate::routing::RegexRouter::from_routes([
            $(($pattern, $crate::routing::RouteTarget::from($target))),*
        ])
    };
}
