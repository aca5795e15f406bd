//! Code-keyed publish/subscribe message bus.
//!
//! Messages carry a string code, an optional sender label and an optional
//! payload. High-priority messages are delivered synchronously to every
//! current subscriber before `post` returns; normal-priority messages are
//! queued as one (message, handler) node per subscriber and drained by
//! [`MessageBus::update`] under a fixed per-tick budget.
//!
//! The bus is a cheap handle: cloning it shares the underlying subscription
//! table and queue, which is how the asset manager and the engine loop see
//! the same traffic on a single logical thread.

use std::{any::Any, cell::RefCell, collections::HashMap, rc::Rc};

/// Maximum number of queued deliveries performed per [`MessageBus::update`].
pub const MESSAGE_QUEUE_BUDGET: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessagePriority {
    Normal,
    High,
}

/// A single message in flight.
#[derive(Clone)]
pub struct Message {
    pub code: String,
    pub sender: Option<String>,
    pub context: Option<Rc<dyn Any>>,
    pub priority: MessagePriority,
}

impl Message {
    pub fn new(
        code: &str,
        sender: Option<&str>,
        context: Option<Rc<dyn Any>>,
        priority: MessagePriority,
    ) -> Self {
        Self {
            code: code.to_string(),
            sender: sender.map(str::to_string),
            context,
            priority,
        }
    }
}

/// Receives messages for the codes it subscribed to.
pub trait MessageHandler {
    fn on_message(&mut self, message: &Message);
}

pub type HandlerRef = Rc<RefCell<dyn MessageHandler>>;

struct QueuedDelivery {
    message: Message,
    handler: HandlerRef,
}

#[derive(Default)]
struct BusState {
    subscriptions: HashMap<String, Vec<HandlerRef>>,
    queue: Vec<QueuedDelivery>,
}

/// Shared handle to the engine-wide message bus.
#[derive(Clone, Default)]
pub struct MessageBus {
    state: Rc<RefCell<BusState>>,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `handler` to all messages posted with `code`.
    pub fn subscribe(&self, code: &str, handler: HandlerRef) {
        self.state
            .borrow_mut()
            .subscriptions
            .entry(code.to_string())
            .or_default()
            .push(handler);
    }

    /// Removes a previously registered handler from `code`.
    pub fn unsubscribe(&self, code: &str, handler: &HandlerRef) {
        if let Some(handlers) = self.state.borrow_mut().subscriptions.get_mut(code) {
            handlers.retain(|existing| !Rc::ptr_eq(existing, handler));
        }
    }

    /// Posts a message to every subscriber of its code.
    ///
    /// High priority delivers synchronously before this call returns; normal
    /// priority enqueues one delivery per current subscriber for a later
    /// [`update`](Self::update).
    pub fn post(
        &self,
        code: &str,
        sender: Option<&str>,
        context: Option<Rc<dyn Any>>,
        priority: MessagePriority,
    ) {
        let message = Message::new(code, sender, context, priority);
        // Collect the recipients first so handlers are free to post or
        // subscribe from inside their callback without re-entering the bus.
        let handlers: Vec<HandlerRef> = self
            .state
            .borrow()
            .subscriptions
            .get(code)
            .map(|handlers| handlers.to_vec())
            .unwrap_or_default();

        if handlers.is_empty() {
            log::debug!("message '{}' posted with no subscribers", code);
            return;
        }

        match priority {
            MessagePriority::High => {
                for handler in &handlers {
                    handler.borrow_mut().on_message(&message);
                }
            }
            MessagePriority::Normal => {
                let mut state = self.state.borrow_mut();
                for handler in handlers {
                    state.queue.push(QueuedDelivery {
                        message: message.clone(),
                        handler,
                    });
                }
            }
        }
    }

    /// Drains up to [`MESSAGE_QUEUE_BUDGET`] queued deliveries.
    ///
    /// Deliveries pop from the end of the queue, so depths beyond the budget
    /// drain in LIFO order relative to enqueue order. Remaining nodes wait
    /// for the next update.
    pub fn update(&self) {
        for _ in 0..MESSAGE_QUEUE_BUDGET {
            let next = self.state.borrow_mut().queue.pop();
            match next {
                Some(delivery) => delivery.handler.borrow_mut().on_message(&delivery.message),
                None => break,
            }
        }
    }

    /// Number of deliveries still waiting in the queue.
    pub fn pending(&self) -> usize {
        self.state.borrow().queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        received: Vec<String>,
    }

    impl MessageHandler for Recorder {
        fn on_message(&mut self, message: &Message) {
            self.received.push(message.code.clone());
        }
    }

    fn recorder() -> Rc<RefCell<Recorder>> {
        Rc::new(RefCell::new(Recorder::default()))
    }

    #[test]
    fn high_priority_delivers_before_post_returns() {
        let bus = MessageBus::new();
        let handler = recorder();
        bus.subscribe("PING", handler.clone());

        bus.post("PING", None, None, MessagePriority::High);
        assert_eq!(handler.borrow().received, vec!["PING"]);
        assert_eq!(bus.pending(), 0);
    }

    #[test]
    fn normal_priority_waits_for_update() {
        let bus = MessageBus::new();
        let handler = recorder();
        bus.subscribe("PING", handler.clone());

        bus.post("PING", None, None, MessagePriority::Normal);
        assert!(handler.borrow().received.is_empty());

        bus.update();
        assert_eq!(handler.borrow().received, vec!["PING"]);
    }

    #[test]
    fn update_budget_splits_fifteen_messages_ten_then_five() {
        let bus = MessageBus::new();
        let handler = recorder();
        bus.subscribe("TICK", handler.clone());

        for _ in 0..15 {
            bus.post("TICK", None, None, MessagePriority::Normal);
        }

        bus.update();
        assert_eq!(handler.borrow().received.len(), 10);
        assert_eq!(bus.pending(), 5);

        bus.update();
        assert_eq!(handler.borrow().received.len(), 15);
        assert_eq!(bus.pending(), 0);
    }

    #[test]
    fn queued_drain_is_lifo_beyond_the_budget() {
        let bus = MessageBus::new();
        let handler = recorder();
        for i in 0..12 {
            bus.subscribe(&format!("M{}", i), handler.clone());
        }
        for i in 0..12 {
            bus.post(&format!("M{}", i), None, None, MessagePriority::Normal);
        }

        bus.update();
        // The most recently queued message drains first.
        assert_eq!(handler.borrow().received.first().unwrap(), "M11");
        assert_eq!(handler.borrow().received.len(), 10);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let bus = MessageBus::new();
        let handler = recorder();
        let as_handler: HandlerRef = handler.clone();
        bus.subscribe("PING", as_handler.clone());
        bus.unsubscribe("PING", &as_handler);

        bus.post("PING", None, None, MessagePriority::High);
        assert!(handler.borrow().received.is_empty());
    }

    #[test]
    fn handlers_may_post_from_inside_a_callback() {
        struct Reposter {
            bus: MessageBus,
            seen: usize,
        }
        impl MessageHandler for Reposter {
            fn on_message(&mut self, message: &Message) {
                self.seen += 1;
                if message.code == "FIRST" {
                    self.bus
                        .post("SECOND", None, None, MessagePriority::Normal);
                }
            }
        }

        let bus = MessageBus::new();
        let handler = Rc::new(RefCell::new(Reposter {
            bus: bus.clone(),
            seen: 0,
        }));
        bus.subscribe("FIRST", handler.clone());
        bus.subscribe("SECOND", handler.clone());

        bus.post("FIRST", None, None, MessagePriority::High);
        assert_eq!(handler.borrow().seen, 1);

        bus.update();
        assert_eq!(handler.borrow().seen, 2);
    }
}
