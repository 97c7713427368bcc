//! Dispatcher core: configuration, construction and the dispatch engine.
//!
//! Internal modules:
//! - [`config`]: dispatcher settings;
//! - [`builder`]: wires the queue manager, catalog and subscribers;
//! - [`dispatcher`]: registration, dispatch/until loops, queue redirection, event stream.

mod builder;
mod config;
mod dispatcher;

pub use builder::DispatcherBuilder;
pub use config::DispatcherConfig;
pub use dispatcher::Dispatcher;
