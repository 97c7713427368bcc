//! # Subscribers: bulk listener registration.
//!
//! A [`Subscriber`] groups several listeners that belong together and
//! registers them in one go through [`Dispatcher::subscribe`](crate::Dispatcher::subscribe)
//! or [`DispatcherBuilder::with_subscribers`](crate::DispatcherBuilder::with_subscribers).
//!
//! ## Example
//! ```rust
//! use herald::{Dispatcher, DispatcherConfig, ListenerError, ListenerFn, Payload, Subscriber};
//!
//! struct UserEvents;
//!
//! impl Subscriber for UserEvents {
//!     fn subscribe(&self, dispatcher: &Dispatcher) {
//!         let _ = dispatcher.listen("user.created", ListenerFn::arc("welcome", |_p: Payload| async {
//!             Ok::<_, ListenerError>(None)
//!         }));
//!         let _ = dispatcher.listen("user.deleted", ListenerFn::arc("cleanup", |_p: Payload| async {
//!             Ok::<_, ListenerError>(None)
//!         }));
//!     }
//! }
//!
//! let dispatcher = Dispatcher::new(DispatcherConfig::default());
//! dispatcher.subscribe(&UserEvents);
//! assert!(dispatcher.has_listeners("user.created"));
//! assert!(dispatcher.has_listeners("user.deleted"));
//! ```

use crate::core::Dispatcher;

/// Contract for bulk listener registration.
pub trait Subscriber: Send + Sync + 'static {
    /// Registers this subscriber's listeners on `dispatcher`.
    fn subscribe(&self, dispatcher: &Dispatcher);

    /// Human-readable name (for logs).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
