//! # Event trait and name resolution.
//!
//! Every dispatched event has a canonical string name. For string-named
//! dispatches the caller supplies it; for typed events it is resolved by
//! [`name_of`] / [`name_of_type`], first rule wins:
//!
//! ```text
//! name_of(&event)
//!   ├─► event.event_name()   Some(name)  ─► name          (instance self-naming)
//!   ├─► E::NAME              Some(name)  ─► name          (type metadata)
//!   └─► short type name of E             ─► "UserCreated" (fallback)
//! ```
//!
//! ## Example
//! ```rust
//! use herald::{Event, name_of, name_of_type};
//!
//! struct UserCreated { id: u64 }
//! impl Event for UserCreated {
//!     const NAME: Option<&'static str> = Some("user.created");
//! }
//!
//! struct Ping;
//! impl Event for Ping {}
//!
//! assert_eq!(name_of(&UserCreated { id: 1 }), "user.created");
//! assert_eq!(name_of_type::<Ping>(), "Ping");
//! ```

use std::any::Any;
use std::borrow::Cow;

use crate::queue::QueueOptions;

/// # A typed event.
///
/// Implementing the trait is the explicit form of "marking a type as an event".
/// All items have defaults, so `impl Event for MyEvent {}` is enough.
pub trait Event: Any + Send + Sync {
    /// Explicit event name for the type. `None` falls back to the type name.
    const NAME: Option<&'static str> = None;

    /// Instance-level name. Takes priority over [`Event::NAME`].
    fn event_name(&self) -> Option<Cow<'_, str>> {
        None
    }

    /// Queue options when the event should be redirected to a queue instead of
    /// being handled inline. `None` (the default) means handle inline.
    fn should_queue(&self) -> Option<QueueOptions> {
        None
    }
}

/// Resolves the canonical name of an event value.
pub fn name_of<E: Event>(event: &E) -> String {
    match event.event_name() {
        Some(name) => name.into_owned(),
        None => name_of_type::<E>(),
    }
}

/// Resolves the canonical name of an event type.
pub fn name_of_type<E: Event>() -> String {
    match E::NAME {
        Some(name) => name.to_string(),
        None => short_type_name(std::any::type_name::<E>()).to_string(),
    }
}

/// Strips module path and generic arguments: `a::b::Foo<c::Bar>` -> `Foo`.
pub(crate) fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
