//! Route pipeline: priority-ordered route listeners.
//!
//! The pipeline runs every attached route listener against a dispatch, in
//! descending priority. Listeners with equal priority run in the order
//! they were attached. Each listener sees the changes earlier listeners
//! made to the dispatch.

use switchyard_core::{Dispatch, Message, Phase, RouteListener, SwitchyardError};

/// Identifies an attached listener so it can be detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u64);

/// A route listener with its attach metadata.
struct ListenerEntry<M: Message> {
    id: u64,
    priority: i32,
    listener: Box<dyn RouteListener<M>>,
}

/// Priority-ordered chain of route listeners.
///
/// # Example
/// ```ignore
/// let mut pipeline = RoutePipeline::new();
/// pipeline.attach(AsyncSwitchRouter::new(router, producer));
/// pipeline.attach_with_priority(audit_router, 10);
///
/// let mut dispatch = Dispatch::command(message)?;
/// pipeline.route(&mut dispatch)?;
/// ```
pub struct RoutePipeline<M: Message> {
    entries: Vec<ListenerEntry<M>>,
    next_id: u64,
}

impl<M: Message> RoutePipeline<M> {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Attach a listener at its own [`RouteListener::priority`].
    pub fn attach<L: RouteListener<M>>(&mut self, listener: L) -> ListenerHandle {
        let priority = listener.priority();
        self.attach_with_priority(listener, priority)
    }

    /// Attach a listener at an explicit priority.
    pub fn attach_with_priority<L: RouteListener<M>>(
        &mut self,
        listener: L,
        priority: i32,
    ) -> ListenerHandle {
        let id = self.next_id;
        self.next_id += 1;

        // After every entry with the same or higher priority.
        let at = self
            .entries
            .partition_point(|entry| entry.priority >= priority);

        #[cfg(feature = "tracing")]
        tracing::trace!(listener = listener.name(), priority, position = at, "attached route listener");

        self.entries.insert(
            at,
            ListenerEntry {
                id,
                priority,
                listener: Box::new(listener),
            },
        );
        ListenerHandle(id)
    }

    /// Detach a listener. Returns `false` if it was not attached.
    pub fn detach(&mut self, handle: ListenerHandle) -> bool {
        match self.entries.iter().position(|entry| entry.id == handle.0) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Run every listener against `dispatch`, stopping at the first error.
    pub fn route(&self, dispatch: &mut Dispatch<M>) -> Result<(), SwitchyardError> {
        for entry in &self.entries {
            #[cfg(feature = "tracing")]
            tracing::trace!(
                listener = entry.listener.name(),
                priority = entry.priority,
                message_name = dispatch.message_name().unwrap_or("<unnamed>"),
                "running route listener"
            );

            entry.listener.on_route(dispatch)?;
        }
        Ok(())
    }

    /// Route `dispatch` and move it into the locate phase.
    ///
    /// After this, the handler set of the dispatch can no longer change.
    pub fn prepare(&self, dispatch: &mut Dispatch<M>) -> Result<(), SwitchyardError> {
        self.route(dispatch)?;
        if dispatch.phase() == Phase::Initialize {
            dispatch.advance();
        }
        Ok(())
    }

    /// Names and priorities of attached listeners, in run order.
    pub fn listeners(&self) -> impl Iterator<Item = (&str, i32)> {
        self.entries
            .iter()
            .map(|entry| (entry.listener.name(), entry.priority))
    }

    /// Number of attached listeners.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no listener is attached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<M: Message> Default for RoutePipeline<M> {
    fn default() -> Self {
        Self::new()
    }
}
