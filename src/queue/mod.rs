//! Queue redirection: options, jobs, collaborator contracts and an in-memory manager.
//!
//! ## Contents
//! - [`QueueOptions`] delay / connection / queue reported by queueable events and listeners
//! - [`QueueJob`], [`JobMetadata`] what the dispatcher hands over
//! - [`QueueManager`], [`QueueConnection`], [`JobWorker`] collaborator contracts
//! - [`MemoryQueue`] process-local manager (tests, demos, single-process apps)

mod job;
mod manager;
mod memory;
mod options;

pub use job::{JobMetadata, QueueJob};
pub use manager::{JobWorker, QueueConnection, QueueManager};
pub use memory::{MemoryConnection, MemoryQueue, DEFAULT_CONNECTION, DEFAULT_QUEUE};
pub use options::QueueOptions;
