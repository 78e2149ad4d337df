//! Integration tests for route pipelines.
//!
//! These tests verify:
//! - Several routers and decorators layered in one pipeline
//! - Classification of transport-wrapped messages
//! - Listeners shared between pipelines

use std::sync::Arc;
use switchyard::{
    AsyncSwitchRouter, Dispatch, InvalidArgument, MessageKind, RegexRouter, RouteListener,
    RoutePipeline, SwitchyardError, TracingLogger, route_fn,
    testing::{RecordingLogger, RecordingProducer, SpyRouter, TestMessage},
};

mod common;
use common::{disjoint_router, named};

#[test]
fn test_event_routers_append_in_priority_order() {
    let audit = RegexRouter::<TestMessage>::from_routes([("/.*/", "audit")]).unwrap();

    let boxed: Box<dyn RouteListener<TestMessage>> = Box::new(audit);

    let mut pipeline = RoutePipeline::new();
    pipeline.attach_with_priority(boxed, 5);
    pipeline.attach(disjoint_router());

    let mut dispatch = Dispatch::event(TestMessage::named("order.shipped")).unwrap();
    pipeline.route(&mut dispatch).unwrap();

    assert_eq!(
        dispatch.listeners(),
        &[named("order-handler"), named("audit")]
    );
}

#[test]
fn test_lower_priority_router_overrides_command_handler() {
    let mut pipeline = RoutePipeline::new();
    pipeline.attach(disjoint_router());
    pipeline.attach_with_priority(SpyRouter::assigning("override"), 0);

    let mut dispatch = Dispatch::command(TestMessage::named("order.create")).unwrap();
    pipeline.route(&mut dispatch).unwrap();

    assert_eq!(dispatch.handler(), Some(&named("override")));
}

#[test]
fn test_guard_stops_routing() {
    let after = SpyRouter::named("after");

    let mut pipeline = RoutePipeline::new();
    pipeline.attach_with_priority(
        route_fn(|dispatch: &mut Dispatch<TestMessage>| {
            if dispatch.message_name().is_some_and(|name| name.starts_with("admin.")) {
                return Err(SwitchyardError::Custom("admin messages are disabled".into()));
            }
            Ok(())
        }),
        1000,
    );
    pipeline.attach(after.clone());

    let mut dispatch = Dispatch::command(TestMessage::named("admin.reset")).unwrap();
    let err = pipeline.route(&mut dispatch).unwrap_err();
    assert_eq!(err.to_string(), "admin messages are disabled");
    assert!(after.seen().is_empty());

    let mut dispatch = Dispatch::command(TestMessage::named("order.create")).unwrap();
    pipeline.route(&mut dispatch).unwrap();
    assert_eq!(after.seen(), vec!["order.create".to_string()]);
}

#[test]
fn test_decorators_layer_over_one_router() {
    let outer = Arc::new(RecordingProducer::<TestMessage>::new());
    let inner = Arc::new(RecordingProducer::<TestMessage>::new());

    let layered: AsyncSwitchRouter<TestMessage, _> = AsyncSwitchRouter::new(
        AsyncSwitchRouter::<TestMessage, _>::new(disjoint_router(), inner.clone()),
        outer.clone(),
    );

    let mut pipeline = RoutePipeline::new();
    pipeline.attach(layered);

    let mut dispatch =
        Dispatch::command(TestMessage::named("order.create").async_eligible()).unwrap();
    pipeline.route(&mut dispatch).unwrap();

    // The outer switch tags the message, so the inner one delegates on replay.
    let invoke = dispatch.handler().unwrap().as_invocable().unwrap();
    invoke.invoke(dispatch.message()).unwrap();
    assert_eq!(outer.messages().len(), 1);

    let mut dispatch = Dispatch::command(outer.messages().remove(0)).unwrap();
    pipeline.route(&mut dispatch).unwrap();
    assert_eq!(dispatch.handler(), Some(&named("order-handler")));
    assert!(inner.messages().is_empty());
}

#[test]
fn test_classify_uses_declared_kind() {
    let remote = TestMessage::named("payment.status").declared_as(MessageKind::Query);
    let mut dispatch = Dispatch::classify(remote).unwrap();
    assert_eq!(dispatch.kind(), MessageKind::Query);

    let mut pipeline = RoutePipeline::new();
    pipeline.attach(disjoint_router());
    pipeline.route(&mut dispatch).unwrap();
    assert_eq!(dispatch.handler(), Some(&named("payment-handler")));

    let err = Dispatch::classify(TestMessage::named("payment.status")).err().unwrap();
    assert!(matches!(err, InvalidArgument::Unclassified { ref name } if name == "payment.status"));
}

#[test]
fn test_kind_mismatch_names_both_kinds() {
    let remote = TestMessage::named("order.created").declared_as(MessageKind::Event);

    let err = Dispatch::new(MessageKind::Command, remote).err().unwrap();
    match err {
        InvalidArgument::KindMismatch {
            name,
            expected,
            declared,
        } => {
            assert_eq!(name, "order.created");
            assert_eq!(expected, MessageKind::Command);
            assert_eq!(declared, MessageKind::Event);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_shared_router_in_two_pipelines() {
    let router: Arc<dyn RouteListener<TestMessage>> = Arc::new(disjoint_router());

    let mut commands = RoutePipeline::new();
    commands.attach(router.clone());
    let mut events = RoutePipeline::new();
    events.attach(router.clone());

    assert_eq!(commands.listeners().next(), Some(("RegexRouter", 100)));

    let mut command = Dispatch::command(TestMessage::named("payment.capture")).unwrap();
    commands.route(&mut command).unwrap();
    let mut event = Dispatch::event(TestMessage::named("payment.capture")).unwrap();
    events.route(&mut event).unwrap();

    assert_eq!(command.handler(), Some(&named("payment-handler")));
    assert_eq!(event.listeners(), &[named("payment-handler")]);
}

#[test]
fn test_unnamed_message_with_loggers() {
    let mut pipeline = RoutePipeline::new();
    pipeline.attach(disjoint_router());

    let recorder = RecordingLogger::new();
    let mut dispatch = Dispatch::query(TestMessage::unnamed())
        .unwrap()
        .with_logger(Arc::new(recorder.clone()));
    pipeline.route(&mut dispatch).unwrap();
    assert_eq!(recorder.notices().len(), 1);

    let mut dispatch = Dispatch::query(TestMessage::unnamed())
        .unwrap()
        .with_logger(Arc::new(TracingLogger::new()));
    assert!(dispatch.is_logging_enabled());
    pipeline.route(&mut dispatch).unwrap();
    assert!(dispatch.handler().is_none());
}
