//! Management command: list known events, process or clear the default queue connection.
//!
//! - [`EventCommand`] the `event` command (`list`, `process [queue]`, `clear [queue]`)
//! - [`Output`] line sink, with [`WriterOutput`] and [`MemoryOutput`]

mod event_command;
mod output;

pub use event_command::EventCommand;
pub use output::{MemoryOutput, Output, WriterOutput};
