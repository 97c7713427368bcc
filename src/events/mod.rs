//! Events: naming, payloads and the catalog of known event types.
//!
//! ## Contents
//! - [`Event`] trait for typed events, with [`name_of`] / [`name_of_type`] resolution
//! - [`Payload`] type-erased payload shared by listeners, the stream and queued jobs
//! - [`Reply`] a single listener result
//! - [`EventCatalog`], [`EventDescriptor`] explicit list of known event types

mod catalog;
mod event;
mod payload;

pub use catalog::{EventCatalog, EventDescriptor};
pub use event::{name_of, name_of_type, Event};
pub use payload::{Payload, Reply};

pub(crate) use payload::is_meaningful;
