//! The named-topic event bus.
//!
//! Subscriptions are collected by a [`BusBuilder`] and frozen into an
//! [`EventBus`] before serving begins. The frozen bus holds no
//! request-scoped state: it is safe to share across threads and reuse for
//! any number of contexts, as long as no two concurrent triggers touch the
//! same context.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;
use trellis_core::{ListenerResult, RequestContext, StageListener, StageOutput, Topic};

struct Subscription {
    priority: i32,
    seq: u64,
    listener: Arc<dyn StageListener>,
}

/// Builder collecting `(topic, priority, listener)` subscriptions.
///
/// Higher priority runs first; ties preserve attachment order. The same
/// listener may be attached any number of times, to any number of topics.
///
/// # Example
/// ```ignore
/// let bus = BusBuilder::new()
///     .attach(Topic::Route, 1, RouteListener::new(matcher))
///     .attach(Topic::Finish, 1, LoggingListener)
///     .build();
/// ```
#[derive(Default)]
pub struct BusBuilder {
    subscriptions: HashMap<Topic, Vec<Subscription>>,
    next_seq: u64,
}

impl BusBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a listener to a topic.
    pub fn attach<L>(self, topic: Topic, priority: i32, listener: L) -> Self
    where
        L: StageListener + 'static,
    {
        self.attach_shared(topic, priority, Arc::new(listener))
    }

    /// Attach an already shared listener. Use this to attach one listener
    /// value to several topics.
    pub fn attach_shared(
        mut self,
        topic: Topic,
        priority: i32,
        listener: Arc<dyn StageListener>,
    ) -> Self {
        self.attach_shared_mut(topic, priority, listener);
        self
    }

    /// Attach an already shared listener (mutable version).
    pub fn attach_shared_mut(
        &mut self,
        topic: Topic,
        priority: i32,
        listener: Arc<dyn StageListener>,
    ) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.subscriptions.entry(topic).or_default().push(Subscription {
            priority,
            seq,
            listener,
        });
    }

    /// Freeze into an immutable, thread-safe [`EventBus`].
    ///
    /// Each topic's listeners are sorted by descending priority, attachment
    /// order within equal priorities.
    pub fn build(self) -> EventBus {
        let mut topics: HashMap<Topic, Vec<Arc<dyn StageListener>>> = HashMap::new();
        for (topic, mut subs) in self.subscriptions {
            subs.sort_by_key(|s| (Reverse(s.priority), s.seq));
            topics.insert(topic, subs.into_iter().map(|s| s.listener).collect());
        }
        EventBus { topics }
    }
}

/// The frozen publish/subscribe registry driving the stages.
pub struct EventBus {
    topics: HashMap<Topic, Vec<Arc<dyn StageListener>>>,
}

impl EventBus {
    /// Number of listeners attached to a topic.
    pub fn listener_count(&self, topic: Topic) -> usize {
        self.topics.get(&topic).map_or(0, Vec::len)
    }

    // Subscriber list is snapshotted per trigger so iteration never
    // observes a list mutated underneath it.
    fn snapshot(&self, topic: Topic) -> Vec<Arc<dyn StageListener>> {
        self.topics.get(&topic).cloned().unwrap_or_default()
    }

    /// Invoke all listeners of `topic` in priority order.
    ///
    /// Before the first invocation the context's topic is set and its
    /// propagation flag cleared, so a stop in one stage never suppresses
    /// the next. Iteration halts after any listener that stops propagation.
    /// Returns the last non-`None` output; a listener error halts iteration
    /// and is returned as-is.
    pub async fn trigger(&self, topic: Topic, cx: &mut RequestContext) -> ListenerResult {
        self.trigger_until(topic, cx, |_, _| false).await
    }

    /// Like [`trigger`](Self::trigger), but also stops as soon as
    /// `predicate(context, last_output)` is true, independent of the
    /// propagation flag.
    pub async fn trigger_until<P>(
        &self,
        topic: Topic,
        cx: &mut RequestContext,
        predicate: P,
    ) -> ListenerResult
    where
        P: Fn(&RequestContext, Option<&StageOutput>) -> bool + Send + Sync,
    {
        cx.topic = topic;
        cx.propagation_stopped = false;

        let mut last = None;
        for listener in self.snapshot(topic) {
            if let Some(output) = listener.on_event(cx).await? {
                last = Some(output);
            }
            if predicate(cx, last.as_ref()) {
                break;
            }
            if cx.propagation_stopped {
                tracing::trace!(topic = %topic, "propagation stopped");
                break;
            }
        }
        Ok(last)
    }
}
