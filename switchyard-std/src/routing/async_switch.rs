//! Async switch - redirect async-eligible messages to a producer.
//!
//! [`AsyncSwitchRouter`] decorates another route listener. A message that
//! reports [`Message::is_async`] and has not been through the producer yet
//! is tagged with `handled-async = true` and routed to the producer alone.
//! When the consumer on the far side of the async channel sends the tagged
//! message back into a bus, the switch sees the tag and lets the decorated
//! router handle it normally.

use std::sync::Arc;
use switchyard_core::{
    Dispatch, HANDLED_ASYNC, HandlerRef, Message, MessageProducer, MetadataValue, RouteListener,
    SwitchyardError,
};

/// Sends async-eligible messages to a producer once, delegating everything else.
pub struct AsyncSwitchRouter<M: Message, R> {
    router: R,
    producer: Arc<dyn MessageProducer<M>>,
    producer_handler: HandlerRef<M>,
}

impl<M: Message, R> AsyncSwitchRouter<M, R> {
    /// Decorate `router`, redirecting async messages to `producer`.
    pub fn new(router: R, producer: Arc<dyn MessageProducer<M>>) -> Self {
        let producer_handler = HandlerRef::producer(Arc::clone(&producer));
        Self {
            router,
            producer,
            producer_handler,
        }
    }

    /// The handler reference assigned to redirected dispatches.
    pub fn producer_handler(&self) -> &HandlerRef<M> {
        &self.producer_handler
    }

    /// The producer.
    pub fn producer(&self) -> &Arc<dyn MessageProducer<M>> {
        &self.producer
    }

    /// The decorated router.
    pub fn inner(&self) -> &R {
        &self.router
    }

    /// Unwrap the decorated router.
    pub fn into_inner(self) -> R {
        self.router
    }

    fn should_redirect(message: &M) -> bool {
        message.is_async() && !message.was_handled_async()
    }
}

impl<M, R> RouteListener<M> for AsyncSwitchRouter<M, R>
where
    M: Message,
    R: RouteListener<M>,
{
    fn on_route(&self, dispatch: &mut Dispatch<M>) -> Result<(), SwitchyardError> {
        if !Self::should_redirect(dispatch.message()) {
            return self.router.on_route(dispatch);
        }

        let tagged = dispatch
            .message()
            .with_added_metadata(HANDLED_ASYNC, MetadataValue::Bool(true));

        dispatch.assign_exclusive(self.producer_handler.clone())?;
        dispatch.set_message(tagged);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            message_name = dispatch.message_name().unwrap_or("<unnamed>"),
            kind = %dispatch.kind(),
            "redirected message to async producer"
        );

        Ok(())
    }

    // Takes the place of the decorated router in a pipeline.
    fn priority(&self) -> i32 {
        self.router.priority()
    }

    fn name(&self) -> &str {
        "AsyncSwitchRouter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        routing::RegexRouter,
        testing::{RecordingProducer, SpyRouter, TestMessage},
    };

    fn switch(
        producer: &Arc<RecordingProducer<TestMessage>>,
    ) -> AsyncSwitchRouter<TestMessage, SpyRouter> {
        AsyncSwitchRouter::new(SpyRouter::assigning("sync-handler"), producer.clone())
    }

    #[test]
    fn redirects_async_message_once() {
        let producer = Arc::new(RecordingProducer::<TestMessage>::new());
        let switch = switch(&producer);

        let mut dispatch = Dispatch::command(TestMessage::named("report.build").async_eligible())
            .unwrap();
        switch.on_route(&mut dispatch).unwrap();

        assert_eq!(dispatch.handler(), Some(switch.producer_handler()));
        assert!(dispatch.message().was_handled_async());
        assert_eq!(switch.inner().seen(), Vec::<String>::new());

        // The consumer replays the tagged message into a fresh dispatch.
        let replayed = dispatch.into_message();
        let mut dispatch = Dispatch::command(replayed).unwrap();
        switch.on_route(&mut dispatch).unwrap();

        assert_eq!(dispatch.handler(), Some(&HandlerRef::named("sync-handler")));
        assert_eq!(switch.inner().seen(), vec!["report.build".to_string()]);
    }

    #[test]
    fn sync_message_is_delegated_unchanged() {
        let producer = Arc::new(RecordingProducer::<TestMessage>::new());
        let switch = switch(&producer);

        let message = TestMessage::named("report.build");
        let mut dispatch = Dispatch::query(message.clone()).unwrap();
        switch.on_route(&mut dispatch).unwrap();

        assert_eq!(dispatch.message(), &message);
        assert_eq!(dispatch.handler(), Some(&HandlerRef::named("sync-handler")));
    }

    #[test]
    fn event_listeners_are_replaced_by_producer() {
        let producer = Arc::new(RecordingProducer::<TestMessage>::new());
        let mut router = RegexRouter::new();
        router.route(RegexRouter::<TestMessage>::ALL).unwrap().to("audit").unwrap();
        let switch: AsyncSwitchRouter<TestMessage, _> =
            AsyncSwitchRouter::new(router, producer.clone());

        let mut dispatch =
            Dispatch::event(TestMessage::named("report.built").async_eligible()).unwrap();
        if let Dispatch::Event(event) = &mut dispatch {
            event.add_listener("earlier".into()).unwrap();
        }
        switch.on_route(&mut dispatch).unwrap();

        assert_eq!(dispatch.listeners(), std::slice::from_ref(switch.producer_handler()));

        // The assigned handler forwards to the producer.
        let invoke = dispatch.listeners()[0].as_invocable().unwrap();
        invoke.invoke(dispatch.message()).unwrap();
        assert_eq!(producer.messages().len(), 1);
        assert!(producer.messages()[0].was_handled_async());
    }

    #[test]
    fn late_redirect_leaves_message_untouched() {
        let producer = Arc::new(RecordingProducer::<TestMessage>::new());
        let switch = switch(&producer);

        let mut dispatch =
            Dispatch::command(TestMessage::named("report.build").async_eligible()).unwrap();
        dispatch.advance();

        assert!(switch.on_route(&mut dispatch).is_err());
        assert!(!dispatch.message().was_handled_async());
    }
}
