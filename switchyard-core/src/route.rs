//! # Route listeners
//!
//! A route listener is one step of the bus's `route` stage: it receives the
//! dispatch context and assigns handlers to it, or delegates to another
//! route listener. Routers and router decorators all implement
//! [`RouteListener`], so any number of decorators can be layered over a
//! router.
//!
//! Routing is synchronous. A listener that wants to stop the chain simply
//! does not delegate.

use crate::{dispatch::Dispatch, error::SwitchyardError, message::Message};
use std::{marker::PhantomData, sync::Arc};

/// Priority a route listener is attached with unless it says otherwise.
pub const DEFAULT_PRIORITY: i32 = 1;

/// One step of the route stage.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot route messages of type `{M}`",
    label = "missing `RouteListener` implementation",
    note = "Implement `RouteListener<{M}>` to take part in routing."
)]
pub trait RouteListener<M: Message>: Send + Sync + 'static {
    /// Assign handlers to `dispatch`.
    fn on_route(&self, dispatch: &mut Dispatch<M>) -> Result<(), SwitchyardError>;

    /// Priority used when attaching to a pipeline. Higher runs earlier.
    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<M: Message, R: RouteListener<M> + ?Sized> RouteListener<M> for Arc<R> {
    fn on_route(&self, dispatch: &mut Dispatch<M>) -> Result<(), SwitchyardError> {
        (**self).on_route(dispatch)
    }

    fn priority(&self) -> i32 {
        (**self).priority()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<M: Message> RouteListener<M> for Box<dyn RouteListener<M>> {
    fn on_route(&self, dispatch: &mut Dispatch<M>) -> Result<(), SwitchyardError> {
        (**self).on_route(dispatch)
    }

    fn priority(&self) -> i32 {
        (**self).priority()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// A route listener built from a closure. See [`route_fn`].
pub struct RouteFn<F, M> {
    func: F,
    _marker: PhantomData<fn(M)>,
}

impl<M, F> RouteListener<M> for RouteFn<F, M>
where
    M: Message,
    F: Fn(&mut Dispatch<M>) -> Result<(), SwitchyardError> + Send + Sync + 'static,
{
    fn on_route(&self, dispatch: &mut Dispatch<M>) -> Result<(), SwitchyardError> {
        (self.func)(dispatch)
    }

    fn name(&self) -> &str {
        "route_fn"
    }
}

/// Wrap a closure as a route listener.
///
/// ```rust,ignore
/// let deny_all = route_fn(|dispatch: &mut Dispatch<MyMessage>| {
///     Err(SwitchyardError::Custom("rejected".into()))
/// });
/// ```
pub fn route_fn<M, F>(func: F) -> RouteFn<F, M>
where
    M: Message,
    F: Fn(&mut Dispatch<M>) -> Result<(), SwitchyardError> + Send + Sync + 'static,
{
    RouteFn {
        func,
        _marker: PhantomData,
    }
}
