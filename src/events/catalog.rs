//! # Catalog of known event types.
//!
//! [`EventCatalog`] is an explicit list of the event types an application
//! knows about. It is built at startup, handed to the dispatcher through the
//! builder, and read by the management command (`event list`).

use std::sync::{Arc, RwLock};

use super::event::{name_of_type, Event};

/// Description of one registered event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDescriptor {
    /// Canonical event name.
    pub name: String,
    /// Full Rust type name.
    pub type_name: &'static str,
}

impl EventDescriptor {
    /// Describes the event type `E`.
    pub fn of<E: Event>() -> Self {
        Self {
            name: name_of_type::<E>(),
            type_name: std::any::type_name::<E>(),
        }
    }
}

/// Ordered, de-duplicated set of event descriptors.
///
/// Cheap to clone; clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct EventCatalog {
    entries: Arc<RwLock<Vec<EventDescriptor>>>,
}

impl EventCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `E`. Registering the same type twice is a no-op.
    pub fn register<E: Event>(&self) -> &Self {
        let descriptor = EventDescriptor::of::<E>();
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if !entries.iter().any(|d| d.type_name == descriptor.type_name) {
            entries.push(descriptor);
        }
        self
    }

    /// Builder-style variant of [`register`](Self::register).
    #[must_use]
    pub fn with<E: Event>(self) -> Self {
        self.register::<E>();
        self
    }

    /// Snapshot of all descriptors in registration order.
    pub fn descriptors(&self) -> Vec<EventDescriptor> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// True if an event with this canonical name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|d| d.name == name)
    }

    /// Number of registered event types.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OrderPlaced;
    impl Event for OrderPlaced {
        const NAME: Option<&'static str> = Some("order.placed");
    }

    struct OrderShipped;
    impl Event for OrderShipped {}

    #[test]
    fn keeps_registration_order_without_duplicates() {
        let catalog = EventCatalog::new()
            .with::<OrderPlaced>()
            .with::<OrderShipped>()
            .with::<OrderPlaced>();

        let names: Vec<_> = catalog.descriptors().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["order.placed", "OrderShipped"]);
        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains("order.placed"));
        assert!(!catalog.contains("OrderPlaced"));
    }

    #[test]
    fn clones_share_entries() {
        let catalog = EventCatalog::new();
        let view = catalog.clone();
        assert!(view.is_empty());
        catalog.register::<OrderShipped>();
        assert_eq!(view.len(), 1);
    }
}
