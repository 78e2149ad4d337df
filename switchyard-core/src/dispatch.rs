//! # Dispatch contexts
//!
//! One dispatch context accompanies each message through the bus. Routers
//! read the message name from it and write their decision (the handler,
//! finder, or listeners) back into it.
//!
//! # Phases
//!
//! ```text
//! Initialize ──► Locate ──► Invoke
//! ```
//!
//! Routing happens during `Initialize`. Once the bus advances the context,
//! every assignment method fails with [`RuntimeError::LateMutation`]; the
//! handler set is frozen for the stages that locate and run it.
//!
//! # Kinds
//!
//! - [`CommandDispatch`] holds at most one command handler
//! - [`QueryDispatch`] holds at most one finder
//! - [`EventDispatch`] holds an ordered list of listeners

use crate::{
    error::{InvalidArgument, RuntimeError, SwitchyardError},
    handler::HandlerRef,
    logger::{Logger, NullLogger},
    message::{Message, MessageKind},
};
use std::{slice, sync::Arc};

/// Lifecycle stage of a dispatch context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Phase {
    /// Routers may assign handlers.
    #[default]
    Initialize,
    /// The bus is resolving the assigned handlers.
    Locate,
    /// The bus is running the assigned handlers.
    Invoke,
}

impl Phase {
    /// Name of this phase for a context of the given kind.
    pub const fn name_for(self, kind: MessageKind) -> &'static str {
        match (self, kind) {
            (Phase::Initialize, _) => "initialize",
            (Phase::Locate, MessageKind::Event) => "locate-listener",
            (Phase::Locate, _) => "locate-handler",
            (Phase::Invoke, MessageKind::Event) => "invoke-listener",
            (Phase::Invoke, _) => "invoke-handler",
        }
    }

    const fn next(self) -> Self {
        match self {
            Phase::Initialize => Phase::Locate,
            Phase::Locate | Phase::Invoke => Phase::Invoke,
        }
    }
}

/// State every kind of dispatch carries.
struct DispatchCore<M> {
    kind: MessageKind,
    message: M,
    message_name: Option<String>,
    phase: Phase,
    logger: Arc<dyn Logger>,
    logging_enabled: bool,
}

impl<M: Message> DispatchCore<M> {
    fn new(kind: MessageKind, message: M) -> Result<Self, InvalidArgument> {
        let message_name = message.message_name().map(str::to_owned);

        if let Some(declared) = message.declared_kind() {
            if declared != kind {
                return Err(InvalidArgument::KindMismatch {
                    name: message_name.unwrap_or_else(|| "<unnamed>".into()),
                    expected: kind,
                    declared,
                });
            }
        }

        Ok(Self {
            kind,
            message,
            message_name,
            phase: Phase::Initialize,
            logger: Arc::new(NullLogger),
            logging_enabled: false,
        })
    }
}

impl<M> DispatchCore<M> {
    fn ensure_initializing(&self) -> Result<(), RuntimeError> {
        match self.phase {
            Phase::Initialize => Ok(()),
            phase => Err(RuntimeError::LateMutation {
                phase: phase.name_for(self.kind),
            }),
        }
    }
}

/// Accessors shared by all three dispatch kinds.
macro_rules! impl_dispatch_common {
    ($ty:ident, $kind:expr) => {
        impl<M: Message> $ty<M> {
            /// Start a dispatch for `message`.
            ///
            /// Fails if the message declares a different kind.
            pub fn new(message: M) -> Result<Self, InvalidArgument> {
                Ok(Self::from_core(DispatchCore::new($kind, message)?))
            }
        }

        impl<M> $ty<M> {
            /// The message name, if the message reported one.
            pub fn message_name(&self) -> Option<&str> {
                self.core.message_name.as_deref()
            }

            /// The message being dispatched.
            pub fn message(&self) -> &M {
                &self.core.message
            }

            /// Replace the message. The message name is kept.
            pub fn set_message(&mut self, message: M) {
                self.core.message = message;
            }

            /// Consume the dispatch and return the message.
            pub fn into_message(self) -> M {
                self.core.message
            }

            /// Current phase.
            pub fn phase(&self) -> Phase {
                self.core.phase
            }

            /// Move to the next phase and return it. `Invoke` is terminal.
            pub fn advance(&mut self) -> Phase {
                self.core.phase = self.core.phase.next();
                self.core.phase
            }

            /// Whether routers should report through [`Self::logger`].
            pub fn is_logging_enabled(&self) -> bool {
                self.core.logging_enabled
            }

            /// The logger attached to this dispatch.
            pub fn logger(&self) -> &dyn Logger {
                &*self.core.logger
            }

            /// Attach a logger and enable logging.
            pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
                self.core.logger = logger;
                self.core.logging_enabled = true;
                self
            }
        }
    };
}

/// Dispatch context for a command.
pub struct CommandDispatch<M> {
    core: DispatchCore<M>,
    command_handler: Option<HandlerRef<M>>,
}

impl<M> CommandDispatch<M> {
    fn from_core(core: DispatchCore<M>) -> Self {
        Self {
            core,
            command_handler: None,
        }
    }

    /// The assigned command handler.
    pub fn command_handler(&self) -> Option<&HandlerRef<M>> {
        self.command_handler.as_ref()
    }

    /// Assign the command handler.
    pub fn set_command_handler(&mut self, handler: HandlerRef<M>) -> Result<(), SwitchyardError> {
        self.core.ensure_initializing()?;
        handler.validate()?;
        self.command_handler = Some(handler);
        Ok(())
    }
}

impl_dispatch_common!(CommandDispatch, MessageKind::Command);

/// Dispatch context for a query.
pub struct QueryDispatch<M> {
    core: DispatchCore<M>,
    finder: Option<HandlerRef<M>>,
}

impl<M> QueryDispatch<M> {
    fn from_core(core: DispatchCore<M>) -> Self {
        Self { core, finder: None }
    }

    /// The assigned finder.
    pub fn finder(&self) -> Option<&HandlerRef<M>> {
        self.finder.as_ref()
    }

    /// Assign the finder.
    pub fn set_finder(&mut self, finder: HandlerRef<M>) -> Result<(), SwitchyardError> {
        self.core.ensure_initializing()?;
        finder.validate()?;
        self.finder = Some(finder);
        Ok(())
    }
}

impl_dispatch_common!(QueryDispatch, MessageKind::Query);

/// Dispatch context for an event.
pub struct EventDispatch<M> {
    core: DispatchCore<M>,
    listeners: Vec<HandlerRef<M>>,
    current_listener: Option<HandlerRef<M>>,
}

impl<M> EventDispatch<M> {
    fn from_core(core: DispatchCore<M>) -> Self {
        Self {
            core,
            listeners: Vec::new(),
            current_listener: None,
        }
    }

    /// The event name; same as [`Self::message_name`].
    pub fn event_name(&self) -> Option<&str> {
        self.message_name()
    }

    /// Listeners assigned so far, in assignment order.
    pub fn listeners(&self) -> &[HandlerRef<M>] {
        &self.listeners
    }

    /// Borrow the listener list for appending.
    ///
    /// Every router in a chain appends into this same list.
    pub fn listeners_mut(&mut self) -> Result<ListenersMut<'_, M>, RuntimeError> {
        self.core.ensure_initializing()?;
        Ok(ListenersMut {
            listeners: &mut self.listeners,
        })
    }

    /// Append one listener.
    pub fn add_listener(&mut self, listener: HandlerRef<M>) -> Result<(), SwitchyardError> {
        self.listeners_mut()?.push(listener)?;
        Ok(())
    }

    /// Replace all listeners.
    ///
    /// Nothing is replaced if any listener is malformed.
    pub fn set_listeners<I>(&mut self, listeners: I) -> Result<(), SwitchyardError>
    where
        I: IntoIterator<Item = HandlerRef<M>>,
    {
        self.core.ensure_initializing()?;
        let listeners: Vec<_> = listeners.into_iter().collect();
        for listener in &listeners {
            listener.validate()?;
        }
        self.listeners = listeners;
        Ok(())
    }

    /// The listener currently being invoked.
    pub fn current_listener(&self) -> Option<&HandlerRef<M>> {
        self.current_listener.as_ref()
    }

    /// Record which listener the invoke stage is running.
    pub fn set_current_listener(&mut self, listener: HandlerRef<M>) -> Result<(), InvalidArgument> {
        listener.validate()?;
        self.current_listener = Some(listener);
        Ok(())
    }
}

impl_dispatch_common!(EventDispatch, MessageKind::Event);

/// Scoped append access to an event's listener list.
pub struct ListenersMut<'a, M> {
    listeners: &'a mut Vec<HandlerRef<M>>,
}

impl<M> ListenersMut<'_, M> {
    /// Append a listener after validating it.
    pub fn push(&mut self, listener: HandlerRef<M>) -> Result<(), InvalidArgument> {
        listener.validate()?;
        self.listeners.push(listener);
        Ok(())
    }

    /// Number of listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no listener is assigned.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Iterate over the listeners.
    pub fn iter(&self) -> slice::Iter<'_, HandlerRef<M>> {
        self.listeners.iter()
    }
}

/// A dispatch context of any kind.
pub enum Dispatch<M> {
    /// A command dispatch.
    Command(CommandDispatch<M>),
    /// A query dispatch.
    Query(QueryDispatch<M>),
    /// An event dispatch.
    Event(EventDispatch<M>),
}

impl<M: Message> Dispatch<M> {
    /// Start a dispatch of the given kind.
    pub fn new(kind: MessageKind, message: M) -> Result<Self, InvalidArgument> {
        Ok(match kind {
            MessageKind::Command => Dispatch::Command(CommandDispatch::new(message)?),
            MessageKind::Query => Dispatch::Query(QueryDispatch::new(message)?),
            MessageKind::Event => Dispatch::Event(EventDispatch::new(message)?),
        })
    }

    /// Start a dispatch of the kind the message declares.
    pub fn classify(message: M) -> Result<Self, InvalidArgument> {
        match message.declared_kind() {
            Some(kind) => Self::new(kind, message),
            None => Err(InvalidArgument::Unclassified {
                name: message.message_name().unwrap_or("<unnamed>").to_owned(),
            }),
        }
    }

    /// Start a command dispatch.
    pub fn command(message: M) -> Result<Self, InvalidArgument> {
        Self::new(MessageKind::Command, message)
    }

    /// Start a query dispatch.
    pub fn query(message: M) -> Result<Self, InvalidArgument> {
        Self::new(MessageKind::Query, message)
    }

    /// Start an event dispatch.
    pub fn event(message: M) -> Result<Self, InvalidArgument> {
        Self::new(MessageKind::Event, message)
    }
}

impl<M> Dispatch<M> {
    fn core(&self) -> &DispatchCore<M> {
        match self {
            Dispatch::Command(d) => &d.core,
            Dispatch::Query(d) => &d.core,
            Dispatch::Event(d) => &d.core,
        }
    }

    fn core_mut(&mut self) -> &mut DispatchCore<M> {
        match self {
            Dispatch::Command(d) => &mut d.core,
            Dispatch::Query(d) => &mut d.core,
            Dispatch::Event(d) => &mut d.core,
        }
    }

    /// The kind of this dispatch.
    pub fn kind(&self) -> MessageKind {
        self.core().kind
    }

    /// The message name, if the message reported one.
    pub fn message_name(&self) -> Option<&str> {
        self.core().message_name.as_deref()
    }

    /// The message being dispatched.
    pub fn message(&self) -> &M {
        &self.core().message
    }

    /// Replace the message. The message name is kept.
    pub fn set_message(&mut self, message: M) {
        self.core_mut().message = message;
    }

    /// Consume the dispatch and return the message.
    pub fn into_message(self) -> M {
        match self {
            Dispatch::Command(d) => d.into_message(),
            Dispatch::Query(d) => d.into_message(),
            Dispatch::Event(d) => d.into_message(),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.core().phase
    }

    /// Name of the current phase, e.g. `locate-listener`.
    pub fn phase_name(&self) -> &'static str {
        let core = self.core();
        core.phase.name_for(core.kind)
    }

    /// Move to the next phase and return it. `Invoke` is terminal.
    pub fn advance(&mut self) -> Phase {
        let core = self.core_mut();
        core.phase = core.phase.next();
        core.phase
    }

    /// Whether routers should report through [`Self::logger`].
    pub fn is_logging_enabled(&self) -> bool {
        self.core().logging_enabled
    }

    /// The logger attached to this dispatch.
    pub fn logger(&self) -> &dyn Logger {
        &*self.core().logger
    }

    /// Attach a logger and enable logging.
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        let core = self.core_mut();
        core.logger = logger;
        core.logging_enabled = true;
        self
    }

    /// The command handler or finder; `None` for events.
    pub fn handler(&self) -> Option<&HandlerRef<M>> {
        match self {
            Dispatch::Command(d) => d.command_handler(),
            Dispatch::Query(d) => d.finder(),
            Dispatch::Event(_) => None,
        }
    }

    /// Assigned listeners; empty for commands and queries.
    pub fn listeners(&self) -> &[HandlerRef<M>] {
        match self {
            Dispatch::Event(d) => d.listeners(),
            _ => &[],
        }
    }

    /// Make `handler` the only thing this dispatch will run.
    ///
    /// Commands and queries get it as their handler or finder; events get a
    /// listener list containing just `handler`.
    pub fn assign_exclusive(&mut self, handler: HandlerRef<M>) -> Result<(), SwitchyardError> {
        match self {
            Dispatch::Command(d) => d.set_command_handler(handler),
            Dispatch::Query(d) => d.set_finder(handler),
            Dispatch::Event(d) => d.set_listeners([handler]),
        }
    }
}

impl<M> From<CommandDispatch<M>> for Dispatch<M> {
    fn from(dispatch: CommandDispatch<M>) -> Self {
        Dispatch::Command(dispatch)
    }
}

impl<M> From<QueryDispatch<M>> for Dispatch<M> {
    fn from(dispatch: QueryDispatch<M>) -> Self {
        Dispatch::Query(dispatch)
    }
}

impl<M> From<EventDispatch<M>> for Dispatch<M> {
    fn from(dispatch: EventDispatch<M>) -> Self {
        Dispatch::Event(dispatch)
    }
}
