//! Event stream: every dispatch, observable independently of listeners.
//!
//! This module groups the record type, the broadcast [`Bus`] and the
//! `Stream` views handed out by the dispatcher (`events`, `of_type`, `on`, ...).
//!
//! ## Quick reference
//! - **Publishers**: `Dispatcher::dispatch*` and `Dispatcher::until*`, once per call,
//!   before any listener or queue interaction.
//! - **Consumers**: anything holding a stream from the dispatcher; the optional
//!   `StreamLogger` (feature `logging`).

mod bus;
mod streams;

#[cfg(feature = "logging")]
mod log;

pub use bus::{Bus, EventRecord};
pub use streams::{EventStream, PayloadStream, TypedStream};

pub(crate) use streams::{named, pairs, payloads, records, typed};

#[cfg(feature = "logging")]
pub use log::StreamLogger;
