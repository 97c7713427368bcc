//! # Listeners and their registry.
//!
//! ## Architecture
//! ```text
//! listen(name, ListenerRef) ──► Registry ──► [Job::Inline | Job::Queued] per name
//!                                  │
//! Dispatcher::dispatch(name) ──────┴──► snapshot(name) ──► Listener::handle(payload)
//! ```
//!
//! ## Listener types
//! - **Function listeners** ([`ListenerFn`], [`EventFn`]) - closures, always inline
//! - **Listener objects** (custom [`Listener`] impls) - may ask to be queued
//! - **Subscribers** ([`Subscriber`]) - register several listeners at once

mod listener;
mod listener_fn;
mod registry;
mod subscriber;

pub use listener::{Listener, ListenerRef};
pub use listener_fn::{EventFn, ListenerFn};
pub use registry::{Registry, Subscription};
pub use subscriber::Subscriber;

pub(crate) use registry::Job;
