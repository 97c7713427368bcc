//! # herald
//!
//! **Herald** is an in-process async event dispatcher for Rust.
//!
//! Listeners are registered under event names and invoked in registration
//! order. Every dispatch is also recorded on a live event stream, and events
//! or listeners may ask to be handed to a queue manager instead of running inline.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   caller
//!     │ dispatch(name, payload) / dispatch_event(event)
//!     │ until(name, payload)    / until_event(event)
//!     ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Dispatcher                                                       │
//! │  - name resolution (Event::event_name / Event::NAME / type name)  │
//! │  - Registry (name ─► ordered [Job::Inline | Job::Queued])         │
//! │  - Bus (broadcast of EventRecord)                                 │
//! │  - QueueManager (optional collaborator)                           │
//! └──────┬──────────────────────┬──────────────────────┬──────────────┘
//!        │ 1. publish           │ 2. redirect?         │ 3. run listeners
//!        ▼                      ▼                      ▼
//! ┌──────────────┐      ┌──────────────┐      ┌─────────────────────┐
//! │  Bus         │      │ QueueManager │      │ Listener::handle    │
//! │ (records)    │      │ push / later │      │ (sequential, awaited│
//! └──────┬───────┘      └──────┬───────┘      │  in order)          │
//!        ▼                     ▼              └─────────────────────┘
//!  events() / of_type()   MemoryQueue ─► process(worker = Dispatcher)
//!  on() / on_event()           ▲
//!  StreamLogger                └── EventCommand (`event process|clear|list`)
//! ```
//!
//! ### Dispatch
//! ```text
//! dispatch_event(event)
//!   ├─► name = name_of(&event), payload = event
//!   ├─► Bus.publish(name, payload)
//!   ├─► event.should_queue() && queue? ─► push/later(Event job) ─► Ok([])
//!   └─► for job in snapshot(name):
//!         ├─ Queued && queue? ─► push/later(Listener job), no reply
//!         ├─ handle(payload).await ─► Ok(reply) ─► replies.push(reply)
//!         └─ Err(e) ─► log ─► Err(DispatchError::Listener)   (rest skipped)
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                          |
//! |-------------------|----------------------------------------------------------|---------------------------------------------|
//! | **Dispatch**      | Collect-all and first-responder dispatch.                | [`Dispatcher`]                              |
//! | **Listeners**     | Closures, typed closures, listener objects, subscribers. | [`Listener`], [`ListenerFn`], [`EventFn`], [`Subscriber`] |
//! | **Events**        | Typed events with resolvable names, opaque payloads.     | [`Event`], [`Payload`], [`EventCatalog`]    |
//! | **Queueing**      | Redirect queueable events/listeners to a queue manager.  | [`QueueManager`], [`MemoryQueue`]           |
//! | **Stream**        | Observe every dispatch as an async `Stream`.             | [`EventRecord`], [`EventStream`]            |
//! | **Errors**        | Typed errors for dispatch, listeners, queues, commands.  | [`DispatchError`], [`ListenerError`]        |
//! | **Commands**      | `event list / process / clear`.                          | [`EventCommand`], [`Output`]                |
//! | **Configuration** | Centralize dispatcher settings.                          | [`DispatcherConfig`]                        |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`StreamLogger`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use herald::{Dispatcher, DispatcherConfig, Event, ListenerError, Payload};
//!
//! struct UserCreated { id: u64 }
//!
//! impl Event for UserCreated {
//!     const NAME: Option<&'static str> = Some("user.created");
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dispatcher = Dispatcher::builder(DispatcherConfig::default()).build();
//!
//!     let _sub = dispatcher.listen_event_fn(|ev: Arc<UserCreated>| async move {
//!         Ok::<_, ListenerError>(Some(Payload::new(format!("welcome #{}", ev.id))))
//!     });
//!
//!     let replies = dispatcher.dispatch_event(UserCreated { id: 7 }).await?;
//!     let greeting = replies[0].as_ref().and_then(|p| p.downcast_ref::<String>());
//!     assert_eq!(greeting.map(String::as_str), Some("welcome #7"));
//!     Ok(())
//! }
//! ```
mod commands;
mod core;
mod error;
mod events;
mod listeners;
mod queue;
mod stream;

// ---- Public re-exports ----

pub use commands::{EventCommand, MemoryOutput, Output, WriterOutput};
pub use crate::core::{Dispatcher, DispatcherBuilder, DispatcherConfig};
pub use error::{CommandError, DispatchError, ListenerError, QueueError};
pub use events::{name_of, name_of_type, Event, EventCatalog, EventDescriptor, Payload, Reply};
pub use listeners::{EventFn, Listener, ListenerFn, ListenerRef, Registry, Subscriber, Subscription};
pub use queue::{
    JobMetadata, JobWorker, MemoryConnection, MemoryQueue, QueueConnection, QueueJob,
    QueueManager, QueueOptions, DEFAULT_CONNECTION, DEFAULT_QUEUE,
};
pub use stream::{Bus, EventRecord, EventStream, PayloadStream, TypedStream};

// Optional: expose a simple built-in stream logger (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use stream::StreamLogger;
