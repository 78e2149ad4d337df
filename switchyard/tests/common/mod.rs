#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};
use switchyard::{BoxError, HandlerRef, MessageProducer, RegexRouter, testing::TestMessage};

// ============================================================================
// Routers
// ============================================================================

pub const ORDERS: &str = r"/^order\..*/";

/// `order.*` goes to the order handler, everything else to the fallback.
pub fn order_router() -> RegexRouter<TestMessage> {
    let mut router = RegexRouter::new();
    router
        .route(ORDERS)
        .unwrap()
        .to("order-handler")
        .unwrap()
        .route(RegexRouter::<TestMessage>::ALL)
        .unwrap()
        .to("fallback")
        .unwrap();
    router
}

/// `order.*` and `payment.*` with no catch-all.
pub fn disjoint_router() -> RegexRouter<TestMessage> {
    RegexRouter::from_routes([
        (ORDERS, "order-handler"),
        (r"/^payment\..*/", "payment-handler"),
    ])
    .unwrap()
}

pub fn named(id: &str) -> HandlerRef<TestMessage> {
    HandlerRef::named(id)
}

// ============================================================================
// Async channel
// ============================================================================

/// A producer backed by an in-memory queue, standing in for a broker.
#[derive(Default)]
pub struct QueueProducer {
    queue: Mutex<VecDeque<TestMessage>>,
}

impl QueueProducer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Take the next message off the queue, as a consumer would.
    pub fn consume(&self) -> Option<TestMessage> {
        self.queue.lock().unwrap().pop_front()
    }

    pub fn depth(&self) -> usize {
        self.queue.lock().unwrap().len()
    }
}

impl MessageProducer<TestMessage> for QueueProducer {
    fn handle(&self, message: &TestMessage) -> Result<(), BoxError> {
        self.queue.lock().unwrap().push_back(message.clone());
        Ok(())
    }
}
