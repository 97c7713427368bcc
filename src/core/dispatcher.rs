//! # Dispatcher: listener registry, dispatch/until loops, queue redirection and the event stream.
//!
//! The [`Dispatcher`] owns the [`Registry`], the stream [`Bus`] and an optional
//! [`QueueManager`]. Every dispatch is recorded on the stream first, then
//! either redirected to the queue or handed to the listeners in registration order.
//!
//! ## High-level flow
//! ```text
//! dispatch(name, payload) / dispatch_event(event)
//!   ├─► resolve name (event: name_of(&event), payload = Payload::from_event(event))
//!   ├─► Bus.publish(record)                       (always, before anything else)
//!   ├─► payload.queue_options() && queue configured?
//!   │       └─ yes ─► queue.push/later(Event job) ─► Ok([])
//!   └─► for job in registry.snapshot(name):       (sequential, registration order)
//!           ├─ Queued(l, opts) && queue configured ─► queue.push/later(Listener job), no reply
//!           ├─ otherwise ─► l.handle(payload).await ─► push reply
//!           └─ Err(e) ─► log ─► return Err        (later listeners never run)
//!
//! until(name, payload) / until_event(event)
//!   ├─► resolve name, Bus.publish(record)
//!   └─► for job in snapshot: reply = l.handle(payload).await?
//!           └─ reply is Some(non-empty) ─► return it      (no queue redirection here)
//! ```
//!
//! ## Rules
//! - Listeners of one call run strictly one after another, never concurrently.
//! - Replies gathered before a failure are dropped; side effects are not undone.
//! - Concurrent calls may interleave at await points; each iterates its own snapshot.
//!
//! ## Example
//! ```rust
//! use herald::{Dispatcher, DispatcherConfig, ListenerError, Payload};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dispatcher = Dispatcher::new(DispatcherConfig::default());
//!
//!     let _sub = dispatcher.listen_fn("user.created", |p: Payload| async move {
//!         let id = *p.downcast_ref::<u64>().unwrap_or(&0);
//!         Ok::<_, ListenerError>(Some(Payload::new(format!("welcome #{id}"))))
//!     });
//!
//!     let replies = dispatcher.dispatch("user.created", Payload::new(7_u64)).await?;
//!     assert_eq!(replies.len(), 1);
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use tracing::{debug, error};

use super::builder::DispatcherBuilder;
use super::config::DispatcherConfig;
use crate::error::{DispatchError, ListenerError, QueueError};
use crate::events::{is_meaningful, name_of, name_of_type, Event, EventCatalog, Payload, Reply};
use crate::listeners::{
    EventFn, Job, ListenerFn, ListenerRef, Registry, Subscriber, Subscription,
};
use crate::queue::{JobMetadata, JobWorker, QueueJob, QueueManager, QueueOptions};
use crate::stream::{self, Bus, EventStream, PayloadStream, TypedStream};

/// Routes named events to listeners and records them on the event stream.
pub struct Dispatcher {
    cfg: DispatcherConfig,
    registry: Registry,
    bus: Bus,
    queue: Option<Arc<dyn QueueManager>>,
    catalog: EventCatalog,
}

impl Dispatcher {
    /// Creates a dispatcher without a queue manager (everything runs inline).
    pub fn new(cfg: DispatcherConfig) -> Self {
        Self::new_internal(cfg, None, EventCatalog::new())
    }

    /// Returns a builder for a dispatcher with collaborators.
    pub fn builder(cfg: DispatcherConfig) -> DispatcherBuilder {
        DispatcherBuilder::new(cfg)
    }

    pub(super) fn new_internal(
        cfg: DispatcherConfig,
        queue: Option<Arc<dyn QueueManager>>,
        catalog: EventCatalog,
    ) -> Self {
        let bus = Bus::new(cfg.stream_capacity_clamped());
        Self {
            cfg,
            registry: Registry::new(),
            bus,
            queue,
            catalog,
        }
    }

    // ---------------------------
    // Registration
    // ---------------------------

    /// Registers a listener for `event`.
    pub fn listen(&self, event: impl Into<String>, listener: ListenerRef) -> Subscription {
        self.registry.listen(event, listener)
    }

    /// Registers a closure for `event`.
    pub fn listen_fn<F, Fut>(&self, event: impl Into<String>, f: F) -> Subscription
    where
        F: Fn(Payload) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Reply, ListenerError>> + Send + 'static,
    {
        let event = event.into();
        let listener = ListenerFn::arc(format!("{event}#fn"), f);
        self.registry.listen(event, listener)
    }

    /// Registers a listener under the resolved name of event type `E`.
    pub fn listen_event<E: Event>(&self, listener: ListenerRef) -> Subscription {
        self.registry.listen(name_of_type::<E>(), listener)
    }

    /// Registers a typed closure under the resolved name of event type `E`.
    pub fn listen_event_fn<E, F, Fut>(&self, f: F) -> Subscription
    where
        E: Event,
        F: Fn(Arc<E>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Reply, ListenerError>> + Send + 'static,
    {
        let event = name_of_type::<E>();
        let listener = EventFn::<E, F>::arc(format!("{event}#fn"), f);
        self.registry.listen(event, listener)
    }

    /// Lets `subscriber` register its listeners.
    pub fn subscribe(&self, subscriber: &dyn Subscriber) {
        subscriber.subscribe(self);
    }

    /// Number of listeners registered for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.registry.listener_count(event)
    }

    /// True if `event` has at least one listener.
    pub fn has_listeners(&self, event: &str) -> bool {
        self.registry.has_listeners(event)
    }

    /// Removes every listener for `event`.
    pub fn forget(&self, event: &str) {
        self.registry.forget(event);
    }

    /// Removes every listener.
    pub fn forget_all(&self) {
        self.registry.forget_all();
    }

    // ---------------------------
    // Dispatch
    // ---------------------------

    /// Dispatches a named event and collects every listener reply in order.
    ///
    /// A payload built with [`Payload::from_event`] for a queueable event is
    /// redirected like [`dispatch_event`](Self::dispatch_event) does.
    pub async fn dispatch(
        &self,
        event: &str,
        payload: Payload,
    ) -> Result<Vec<Reply>, DispatchError> {
        self.fire(event, payload).await
    }

    /// Dispatches a typed event; the event value is the payload.
    ///
    /// A queueable event is handed to the queue manager (when configured) and
    /// no listener runs; the result is then an empty list.
    pub async fn dispatch_event<E: Event>(&self, event: E) -> Result<Vec<Reply>, DispatchError> {
        let name = name_of(&event);
        self.fire(&name, Payload::from_event(event)).await
    }

    /// Dispatches a named event and returns the first meaningful reply.
    ///
    /// Stops at the first listener returning something other than `None` or
    /// the empty payload. Queue redirection never applies here.
    pub async fn until(
        &self,
        event: &str,
        payload: Payload,
    ) -> Result<Option<Payload>, DispatchError> {
        self.bus.publish(event, payload.clone());
        self.first_reply(event, &payload).await
    }

    /// Typed variant of [`until`](Self::until); the event value is the payload.
    pub async fn until_event<E: Event>(&self, event: E) -> Result<Option<Payload>, DispatchError> {
        let name = name_of(&event);
        let payload = Payload::from_event(event);
        self.bus.publish(&name, payload.clone());
        self.first_reply(&name, &payload).await
    }

    // ---------------------------
    // Event stream
    // ---------------------------

    /// Every dispatched record.
    pub fn events(&self) -> EventStream {
        stream::records(&self.bus)
    }

    /// Every dispatch as a `(name, payload)` pair.
    pub fn event_stream(&self) -> BoxStream<'static, (Arc<str>, Payload)> {
        stream::pairs(&self.bus)
    }

    /// Records dispatched under `event`.
    pub fn of_type(&self, event: &str) -> EventStream {
        stream::named(&self.bus, event)
    }

    /// Records dispatched under the resolved name of event type `E`.
    pub fn of_class<E: Event>(&self) -> EventStream {
        stream::named(&self.bus, name_of_type::<E>())
    }

    /// Payloads dispatched under `event`.
    pub fn on(&self, event: &str) -> PayloadStream {
        stream::payloads(&self.bus, event)
    }

    /// Typed payloads dispatched under the resolved name of event type `E`.
    pub fn on_event<E: Event>(&self) -> TypedStream<E> {
        stream::typed::<E>(&self.bus, name_of_type::<E>())
    }

    // ---------------------------
    // Accessors
    // ---------------------------

    /// Active configuration.
    pub fn config(&self) -> &DispatcherConfig {
        &self.cfg
    }

    /// Catalog of known event types.
    pub fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    /// Configured queue manager, if any.
    pub fn queue(&self) -> Option<&Arc<dyn QueueManager>> {
        self.queue.as_ref()
    }

    /// Listener registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    // ---------------------------
    // Helpers
    // ---------------------------

    /// Runs the listeners of `name` in order, redirecting queued ones.
    /// Publishes the record, then redirects a queueable payload or runs the listeners.
    async fn fire(&self, name: &str, payload: Payload) -> Result<Vec<Reply>, DispatchError> {
        self.bus.publish(name, payload.clone());

        let redirect = payload.queue_options().filter(|_| self.queue.is_some()).cloned();
        if let Some(opts) = redirect {
            let job = QueueJob::Event {
                name: name.to_string(),
                payload,
            };
            self.enqueue(name, job, JobMetadata::default(), &opts).await?;
            return Ok(Vec::new());
        }

        self.run_listeners(name, &payload).await
    }

    async fn run_listeners(&self, name: &str, payload: &Payload) -> Result<Vec<Reply>, DispatchError> {
        let jobs = self.registry.snapshot(name);
        let mut replies = Vec::with_capacity(jobs.len());

        for job in &jobs {
            match job {
                Job::Queued(listener, opts) if self.queue.is_some() => {
                    let queued = QueueJob::Listener {
                        name: name.to_string(),
                        listener: Arc::clone(listener),
                        event: payload.clone(),
                    };
                    self.enqueue(name, queued, JobMetadata::with_event(payload.clone()), opts)
                        .await?;
                }
                _ => replies.push(self.invoke(name, job.listener(), payload).await?),
            }
        }
        Ok(replies)
    }

    /// Runs listeners inline until one returns a meaningful reply.
    async fn first_reply(&self, name: &str, payload: &Payload) -> Result<Option<Payload>, DispatchError> {
        for job in self.registry.snapshot(name) {
            let reply = self.invoke(name, job.listener(), payload).await?;
            if is_meaningful(&reply) {
                return Ok(reply);
            }
        }
        Ok(None)
    }

    /// Invokes one listener; failures are logged and wrapped.
    async fn invoke(
        &self,
        name: &str,
        listener: &ListenerRef,
        payload: &Payload,
    ) -> Result<Reply, DispatchError> {
        listener.handle(payload.clone()).await.map_err(|source| {
            if self.cfg.log_listener_errors {
                error!(event = name, listener = listener.name(), error = %source, "error in event listener");
            }
            DispatchError::Listener {
                event: name.to_string(),
                listener: listener.name().to_string(),
                source,
            }
        })
    }

    /// Hands a job to the queue manager (`later` when delayed, `push` otherwise).
    async fn enqueue(
        &self,
        name: &str,
        job: QueueJob,
        metadata: JobMetadata,
        opts: &QueueOptions,
    ) -> Result<(), DispatchError> {
        let queue = self.queue.as_ref().ok_or(DispatchError::QueueNotConfigured)?;
        let listener_job = job.is_listener();

        let result = if opts.is_delayed() {
            queue
                .later(opts.delay(), job, metadata, opts.connection(), opts.queue())
                .await
        } else {
            queue
                .push(job, metadata, opts.connection(), opts.queue())
                .await
        };

        match result {
            Ok(()) => {
                debug!(
                    event = name,
                    listener_job,
                    delay = ?opts.delay(),
                    connection = opts.connection(),
                    queue = opts.queue(),
                    "job redirected to queue"
                );
                Ok(())
            }
            Err(source) => {
                error!(event = name, error = %source, "failed to enqueue job");
                Err(DispatchError::Enqueue {
                    event: name.to_string(),
                    source,
                })
            }
        }
    }
}

#[async_trait]
impl JobWorker for Dispatcher {
    /// Runs a queued job: a listener job calls that listener, an event job runs
    /// the event's listeners (listener redirection still applies, the event is
    /// not queued again and not re-published on the stream).
    async fn run_job(&self, job: &QueueJob, _metadata: &JobMetadata) -> Result<(), QueueError> {
        let result = match job {
            QueueJob::Event { name, payload } => self.run_listeners(name, payload).await.map(|_| ()),
            QueueJob::Listener {
                name,
                listener,
                event,
            } => self.invoke(name, listener, event).await.map(|_| ()),
        };

        result.map_err(|err| QueueError::JobFailed {
            job: job.name().to_string(),
            error: err.to_string(),
        })
    }
}
