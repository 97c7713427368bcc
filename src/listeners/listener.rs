//! # Listener abstraction.
//!
//! A [`Listener`] handles one event payload and may return a [`Reply`].
//! The common handle type is [`ListenerRef`], an `Arc<dyn Listener>` whose
//! pointer identity is what `Subscription::unsubscribe` matches on.
//!
//! A listener object may also ask to be queued instead of invoked inline by
//! returning [`QueueOptions`] from [`Listener::should_queue`]. The answer is
//! read once, when the listener is registered.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ListenerError;
use crate::events::{Payload, Reply};
use crate::queue::QueueOptions;

/// # Event handler.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use herald::{Listener, ListenerError, Payload, Reply};
///
/// struct Audit;
///
/// #[async_trait]
/// impl Listener for Audit {
///     async fn handle(&self, _payload: Payload) -> Result<Reply, ListenerError> {
///         // write audit record...
///         Ok(None)
///     }
///
///     fn name(&self) -> &str { "audit" }
/// }
/// ```
#[async_trait]
pub trait Listener: Send + Sync + 'static {
    /// Handles a single event payload.
    async fn handle(&self, payload: Payload) -> Result<Reply, ListenerError>;

    /// Human-readable name (for logs and errors).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Queue options if this listener should run through the queue manager.
    fn should_queue(&self) -> Option<QueueOptions> {
        None
    }
}

/// Shared listener handle.
pub type ListenerRef = Arc<dyn Listener>;

/// Pointer identity of a listener handle.
pub(crate) fn same_listener(a: &ListenerRef, b: &ListenerRef) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
