//! # Type-erased event payloads and listener replies.
//!
//! A [`Payload`] is a cheaply clonable, type-erased value shared between the
//! dispatcher, the listeners, the event stream and queued jobs. Cloning a
//! payload clones an `Arc`, never the value.
//!
//! The unit payload ([`Payload::empty`]) has two roles:
//! - it is what string-named dispatches carry when the caller has no payload;
//! - as a listener reply it is the "no value" marker that `until` skips.
//!
//! ## Example
//! ```rust
//! use herald::Payload;
//!
//! let p = Payload::new(7_u32);
//! assert_eq!(p.downcast_ref::<u32>(), Some(&7));
//! assert!(p.downcast_ref::<String>().is_none());
//! assert!(Payload::empty().is_empty());
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::events::Event;
use crate::queue::QueueOptions;

/// Opaque, shareable event payload.
///
/// A payload built with [`Payload::from_event`] also remembers whether the
/// event asked to be queued, so string-named dispatches of it are redirected
/// the same way typed dispatches are.
#[derive(Clone)]
pub struct Payload {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
    queue: Option<QueueOptions>,
}

/// Result of a single listener invocation.
///
/// `None` means the listener returned nothing; `Some(Payload::empty())` is the
/// explicit "no value" marker. Both are skipped by `until`.
pub type Reply = Option<Payload>;

impl Payload {
    /// Wraps a value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            type_name: std::any::type_name::<T>(),
            queue: None,
        }
    }

    /// Wraps a typed event together with its [`Event::should_queue`] answer.
    pub fn from_event<E: Event>(event: E) -> Self {
        let queue = event.should_queue();
        Self {
            queue,
            ..Self::new(event)
        }
    }

    /// The unit payload.
    pub fn empty() -> Self {
        Self::new(())
    }

    /// True for the unit payload.
    pub fn is_empty(&self) -> bool {
        self.is::<()>()
    }

    /// True if the payload holds a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Borrows the payload as `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Returns a shared handle to the payload as `T`.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.value).downcast::<T>().ok()
    }

    /// Full Rust type name of the wrapped value.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Queue options recorded by [`Payload::from_event`], if the event is queueable.
    pub fn queue_options(&self) -> Option<&QueueOptions> {
        self.queue.as_ref()
    }

    /// True if both payloads share the same allocation.
    pub fn ptr_eq(&self, other: &Payload) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.value), Arc::as_ptr(&other.value))
    }
}

impl Default for Payload {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Payload").field(&self.type_name).finish()
    }
}

/// Returns true if a reply is "meaningful": present and not the empty marker.
pub(crate) fn is_meaningful(reply: &Reply) -> bool {
    matches!(reply, Some(p) if !p.is_empty())
}
