//! # Queue collaborator contracts.
//!
//! The dispatcher consumes a [`QueueManager`]; it does not implement durable
//! queueing itself. A manager exposes named [`QueueConnection`]s which may
//! optionally support processing and clearing their queues.
//!
//! ## Contract
//! - `push` / `later` resolve once the job is **accepted**, not when it runs.
//! - `later` is only used for jobs with a non-zero delay.
//! - `process` runs due jobs through a [`JobWorker`] (the dispatcher implements it).
//! - Connections that cannot process or clear return [`QueueError::Unsupported`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::QueueError;
use crate::queue::job::{JobMetadata, QueueJob};

/// Contract for the queue manager the dispatcher redirects jobs to.
#[async_trait]
pub trait QueueManager: Send + Sync + 'static {
    /// Enqueues a job for immediate processing.
    async fn push(
        &self,
        job: QueueJob,
        metadata: JobMetadata,
        connection: Option<&str>,
        queue: Option<&str>,
    ) -> Result<(), QueueError>;

    /// Enqueues a job that becomes available after `delay`.
    async fn later(
        &self,
        delay: Duration,
        job: QueueJob,
        metadata: JobMetadata,
        connection: Option<&str>,
        queue: Option<&str>,
    ) -> Result<(), QueueError>;

    /// Resolves a connection by name (`None` = default connection).
    fn connection(&self, name: Option<&str>) -> Result<Arc<dyn QueueConnection>, QueueError>;
}

/// A single queue connection.
#[async_trait]
pub trait QueueConnection: Send + Sync {
    /// Connection name (for logs).
    fn name(&self) -> &str;

    /// Runs every due job of `queue` (`None` = default queue) and returns how many ran.
    async fn process(
        &self,
        _queue: Option<&str>,
        _worker: &dyn JobWorker,
    ) -> Result<usize, QueueError> {
        Err(QueueError::Unsupported {
            operation: "processing",
        })
    }

    /// Drops every pending job of `queue` and returns how many were dropped.
    async fn clear(&self, _queue: Option<&str>) -> Result<usize, QueueError> {
        Err(QueueError::Unsupported {
            operation: "clearing",
        })
    }
}

/// Executes queued jobs.
#[async_trait]
pub trait JobWorker: Send + Sync {
    /// Runs one job to completion.
    async fn run_job(&self, job: &QueueJob, metadata: &JobMetadata) -> Result<(), QueueError>;
}
