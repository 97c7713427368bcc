use std::sync::Arc;

use tracing::debug;

use super::{config::DispatcherConfig, dispatcher::Dispatcher};
use crate::{events::EventCatalog, listeners::Subscriber, queue::QueueManager};

/// Builder for constructing a Dispatcher with optional collaborators.
pub struct DispatcherBuilder {
    cfg: DispatcherConfig,
    queue: Option<Arc<dyn QueueManager>>,
    subscribers: Vec<Arc<dyn Subscriber>>,
    catalog: EventCatalog,
}

impl DispatcherBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: DispatcherConfig) -> Self {
        Self {
            cfg,
            queue: None,
            subscribers: Vec::new(),
            catalog: EventCatalog::new(),
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, cfg: DispatcherConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Sets the queue manager used for queueable events and listeners.
    ///
    /// Without one, everything runs inline.
    pub fn with_queue(mut self, queue: Arc<dyn QueueManager>) -> Self {
        self.queue = Some(queue);
        self
    }

    /// Sets subscribers to register when the dispatcher is built.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscriber>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds one subscriber to register when the dispatcher is built.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscriber>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Sets the catalog of known event types.
    pub fn with_catalog(mut self, catalog: EventCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Builds and returns the Dispatcher instance.
    ///
    /// This consumes the builder, creates the event stream and registry, then
    /// lets every subscriber register its listeners (in the order given).
    pub fn build(self) -> Arc<Dispatcher> {
        let dispatcher = Arc::new(Dispatcher::new_internal(self.cfg, self.queue, self.catalog));

        for subscriber in &self.subscribers {
            debug!(subscriber = subscriber.name(), "booting subscriber");
            dispatcher.subscribe(subscriber.as_ref());
        }
        dispatcher
    }
}
