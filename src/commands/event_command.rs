//! # `event` management command.
//!
//! Lists known event types and drives the default queue connection.
//!
//! ```text
//! event [list]          catalog names with listener counts
//! event process [queue] run due jobs of `queue` (default "default") through the dispatcher
//! event clear [queue]   drop pending jobs of `queue`
//! ```
//!
//! ## Exit codes
//! - `0` the subcommand completed
//! - `1` unknown subcommand, or the queue operation failed (reported on the sink)

use std::sync::Arc;

use tracing::warn;

use super::output::Output;
use crate::core::Dispatcher;
use crate::error::CommandError;
use crate::queue::{QueueConnection, DEFAULT_QUEUE};

/// Management command over a dispatcher and its queue manager.
pub struct EventCommand {
    dispatcher: Arc<Dispatcher>,
}

impl EventCommand {
    /// Command name.
    pub const NAME: &'static str = "event";
    /// One-line description.
    pub const DESCRIPTION: &'static str = "Manage events and event listeners";

    /// Creates the command over `dispatcher`; queue subcommands use its queue manager.
    ///
    /// # Example
    /// ```
    /// use std::sync::Arc;
    /// use herald::{Dispatcher, DispatcherConfig, EventCommand};
    ///
    /// let dispatcher = Arc::new(Dispatcher::new(DispatcherConfig::default()));
    /// let command = EventCommand::new(Arc::clone(&dispatcher));
    /// # drop(command);
    /// ```
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Runs the subcommand named by `args[0]` (`list` when empty) and returns an exit code.
    pub async fn execute(&self, args: &[&str], out: &mut dyn Output) -> i32 {
        let sub = args.first().copied().unwrap_or("list");
        let queue = args.get(1).copied();

        let result = match sub {
            "list" => {
                self.list(out);
                Ok(())
            }
            "process" => self
                .process(queue, out)
                .await
                .map_err(|e| ("Error processing queue", e)),
            "clear" => self
                .clear(queue, out)
                .await
                .map_err(|e| ("Error clearing queue", e)),
            other => Err((
                "Unknown subcommand",
                CommandError::UnknownSubcommand(other.to_string()),
            )),
        };

        match result {
            Ok(()) => 0,
            Err((context, err)) => {
                warn!(command = Self::NAME, subcommand = sub, error = %err, label = err.as_label(), "command failed");
                match err {
                    CommandError::UnknownSubcommand(name) => out.error(&format!("{context}: {name}")),
                    other => out.error(&format!("{context}: {other}")),
                }
                1
            }
        }
    }

    fn list(&self, out: &mut dyn Output) {
        let descriptors = self.dispatcher.catalog().descriptors();
        if descriptors.is_empty() {
            out.info("No events registered");
            return;
        }

        out.info("Registered events:");
        for d in descriptors {
            let listeners = self.dispatcher.listener_count(&d.name);
            out.line(&format!(" - {} ({listeners} listeners)", d.name));
        }
    }

    async fn process(&self, queue: Option<&str>, out: &mut dyn Output) -> Result<(), CommandError> {
        let connection = self.connection()?;
        out.info(&format!("Processing queue: {}", queue.unwrap_or(DEFAULT_QUEUE)));
        let processed = connection.process(queue, &*self.dispatcher).await?;
        out.success(&format!("Queue processed successfully ({processed} jobs)"));
        Ok(())
    }

    async fn clear(&self, queue: Option<&str>, out: &mut dyn Output) -> Result<(), CommandError> {
        let connection = self.connection()?;
        out.info(&format!("Clearing queue: {}", queue.unwrap_or(DEFAULT_QUEUE)));
        let dropped = connection.clear(queue).await?;
        out.success(&format!("Queue cleared successfully ({dropped} jobs)"));
        Ok(())
    }

    /// Default connection of the dispatcher's queue manager.
    fn connection(&self) -> Result<Arc<dyn QueueConnection>, CommandError> {
        let manager = self.dispatcher.queue().ok_or(CommandError::NoQueue)?;
        Ok(manager.connection(None)?)
    }
}
