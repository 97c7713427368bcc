//! # In-memory queue manager.
//!
//! [`MemoryQueue`] keeps redirected jobs in process memory. It is meant for
//! tests, demos and single-process apps that want deferred listeners without
//! a broker. Nothing survives a restart.
//!
//! ## Layout
//! ```text
//! MemoryQueue
//!   ├─► "memory"  (default connection) ─► MemoryConnection
//!   │                                       ├─► "default" ─► [job, job, ...]   (FIFO)
//!   │                                       └─► "mail"    ─► [job, ...]
//!   └─► "sync"    (extra connection)   ─► MemoryConnection ...
//! ```
//!
//! ## Rules
//! - A job is **due** once `now >= enqueued_at + delay` (tokio clock, so
//!   `tokio::time::pause` / `advance` drive it in tests).
//! - `process` runs due jobs in FIFO order and leaves jobs that are not due yet.
//! - Jobs are taken one at a time; a pass only runs jobs queued before it started.
//! - The first failing job stops processing; it is dropped and the error is
//!   returned, jobs after it stay queued.
//! - A pass cancelled mid-job puts that job back at the front of its queue.
//! - A delay past the clock's range is rejected with [`QueueError::Rejected`].

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::QueueError;
use crate::queue::job::{JobMetadata, QueueJob};
use crate::queue::manager::{JobWorker, QueueConnection, QueueManager};

/// Name of the connection created by [`MemoryQueue::new`].
pub const DEFAULT_CONNECTION: &str = "memory";

/// Queue name used when a job or command does not name one.
pub const DEFAULT_QUEUE: &str = "default";

struct Pending {
    id: u64,
    job: QueueJob,
    metadata: JobMetadata,
    available_at: Instant,
}

/// One in-memory connection holding named FIFO queues.
pub struct MemoryConnection {
    name: String,
    queues: Mutex<HashMap<String, VecDeque<Pending>>>,
    next_id: AtomicU64,
}

impl MemoryConnection {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            queues: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    fn enqueue(
        &self,
        queue: Option<&str>,
        job: QueueJob,
        metadata: JobMetadata,
        delay: Duration,
    ) -> Result<(), QueueError> {
        let queue = queue.unwrap_or(DEFAULT_QUEUE);
        let available_at = Instant::now()
            .checked_add(delay)
            .ok_or_else(|| QueueError::Rejected {
                reason: "delay out of range".to_string(),
            })?;
        debug!(connection = %self.name, queue, job = job.name(), ?delay, "job queued");

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut queues = self.queues.lock().unwrap_or_else(|e| e.into_inner());
        queues.entry(queue.to_string()).or_default().push_back(Pending {
            id,
            job,
            metadata,
            available_at,
        });
        Ok(())
    }

    /// Number of jobs waiting in `queue` (`None` = default queue), due or not.
    pub fn pending(&self, queue: Option<&str>) -> usize {
        let queues = self.queues.lock().unwrap_or_else(|e| e.into_inner());
        queues
            .get(queue.unwrap_or(DEFAULT_QUEUE))
            .map_or(0, VecDeque::len)
    }

    /// Removes the oldest job of `queue` that is due at `now` and was queued before `horizon`.
    fn take_next(&self, queue: &str, now: Instant, horizon: u64) -> Option<Pending> {
        let mut queues = self.queues.lock().unwrap_or_else(|e| e.into_inner());
        let jobs = queues.get_mut(queue)?;
        let index = jobs
            .iter()
            .position(|p| p.id < horizon && p.available_at <= now)?;
        jobs.remove(index)
    }

    /// Puts a job back at the front of `queue`.
    fn restore(&self, queue: &str, pending: Pending) {
        let mut queues = self.queues.lock().unwrap_or_else(|e| e.into_inner());
        queues.entry(queue.to_string()).or_default().push_front(pending);
    }

    /// Processes `queue` every `interval` until `token` is cancelled.
    ///
    /// A failing pass is logged and the loop keeps going; the failed job is
    /// dropped and the jobs behind it run on a later pass. Returns the number
    /// of jobs that ran successfully.
    pub async fn work(
        &self,
        queue: Option<&str>,
        worker: &dyn JobWorker,
        interval: Duration,
        token: CancellationToken,
    ) -> usize {
        let mut total = 0;
        loop {
            match self.process(queue, worker).await {
                Ok(processed) => total += processed,
                Err(err) => {
                    warn!(
                        connection = %self.name,
                        queue = queue.unwrap_or(DEFAULT_QUEUE),
                        error = %err,
                        "queue pass failed"
                    );
                }
            }
            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }
        total
    }
}

/// Job taken out of a queue while it runs.
///
/// Dropped before completion (the `process` future was cancelled), it puts
/// the job back at the front of its queue.
struct InFlight<'a> {
    connection: &'a MemoryConnection,
    queue: &'a str,
    pending: Option<Pending>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            debug!(connection = %self.connection.name, queue = self.queue, job = pending.job.name(), "interrupted job restored");
            self.connection.restore(self.queue, pending);
        }
    }
}

#[async_trait]
impl QueueConnection for MemoryConnection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn process(&self, queue: Option<&str>, worker: &dyn JobWorker) -> Result<usize, QueueError> {
        let queue = queue.unwrap_or(DEFAULT_QUEUE);
        let now = Instant::now();
        let horizon = self.next_id.load(Ordering::Relaxed);
        let mut processed = 0;

        while let Some(pending) = self.take_next(queue, now, horizon) {
            let job = pending.job.name().to_string();
            let mut in_flight = InFlight {
                connection: self,
                queue,
                pending: Some(pending),
            };
            let result = match in_flight.pending.as_ref() {
                Some(p) => worker.run_job(&p.job, &p.metadata).await,
                None => Ok(()),
            };
            in_flight.pending = None;

            if let Err(err) = result {
                warn!(connection = %self.name, queue, job = %job, error = %err, "queued job failed");
                return Err(err);
            }
            processed += 1;
        }

        debug!(connection = %self.name, queue, processed, "queue processed");
        Ok(processed)
    }

    async fn clear(&self, queue: Option<&str>) -> Result<usize, QueueError> {
        let queue = queue.unwrap_or(DEFAULT_QUEUE);
        let mut queues = self.queues.lock().unwrap_or_else(|e| e.into_inner());
        let dropped = queues.remove(queue).map_or(0, |jobs| jobs.len());
        debug!(connection = %self.name, queue, dropped, "queue cleared");
        Ok(dropped)
    }
}

/// Queue manager backed by in-memory connections.
pub struct MemoryQueue {
    default: String,
    connections: HashMap<String, Arc<MemoryConnection>>,
}

impl MemoryQueue {
    /// Creates a manager with a single default connection named `"memory"`.
    pub fn new() -> Self {
        let mut connections = HashMap::new();
        connections.insert(
            DEFAULT_CONNECTION.to_string(),
            Arc::new(MemoryConnection::new(DEFAULT_CONNECTION)),
        );
        Self {
            default: DEFAULT_CONNECTION.to_string(),
            connections,
        }
    }

    /// Adds another named connection.
    #[must_use]
    pub fn with_connection(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.connections
            .entry(name.clone())
            .or_insert_with(|| Arc::new(MemoryConnection::new(name)));
        self
    }

    /// Typed access to a connection (`None` = default).
    pub fn memory_connection(&self, name: Option<&str>) -> Result<Arc<MemoryConnection>, QueueError> {
        let name = name.unwrap_or(self.default.as_str());
        self.connections
            .get(name)
            .cloned()
            .ok_or_else(|| QueueError::UnknownConnection {
                name: name.to_string(),
            })
    }

    /// Number of jobs waiting on the default connection in `queue`.
    pub fn pending(&self, queue: Option<&str>) -> usize {
        self.memory_connection(None)
            .map_or(0, |conn| conn.pending(queue))
    }
}

impl Default for MemoryQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueueManager for MemoryQueue {
    async fn push(
        &self,
        job: QueueJob,
        metadata: JobMetadata,
        connection: Option<&str>,
        queue: Option<&str>,
    ) -> Result<(), QueueError> {
        self.memory_connection(connection)?
            .enqueue(queue, job, metadata, Duration::ZERO)
    }

    async fn later(
        &self,
        delay: Duration,
        job: QueueJob,
        metadata: JobMetadata,
        connection: Option<&str>,
        queue: Option<&str>,
    ) -> Result<(), QueueError> {
        self.memory_connection(connection)?
            .enqueue(queue, job, metadata, delay)
    }

    fn connection(&self, name: Option<&str>) -> Result<Arc<dyn QueueConnection>, QueueError> {
        let conn: Arc<dyn QueueConnection> = self.memory_connection(name)?;
        Ok(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Payload;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Records job names; fails on jobs named "bad".
    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
        runs: AtomicUsize,
    }

    #[async_trait]
    impl JobWorker for Recorder {
        async fn run_job(&self, job: &QueueJob, _metadata: &JobMetadata) -> Result<(), QueueError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            if job.name() == "bad" {
                return Err(QueueError::JobFailed {
                    job: job.name().to_string(),
                    error: "boom".into(),
                });
            }
            self.seen.lock().unwrap().push(job.name().to_string());
            Ok(())
        }
    }

    fn job(name: &str) -> QueueJob {
        QueueJob::Event {
            name: name.to_string(),
            payload: Payload::empty(),
        }
    }

    #[tokio::test]
    async fn processes_in_fifo_order() {
        let q = MemoryQueue::new();
        for name in ["a", "b", "c"] {
            q.push(job(name), JobMetadata::default(), None, None).await.unwrap();
        }
        assert_eq!(q.pending(None), 3);

        let worker = Recorder::default();
        let conn = q.connection(None).unwrap();
        assert_eq!(conn.process(None, &worker).await.unwrap(), 3);
        assert_eq!(*worker.seen.lock().unwrap(), vec!["a", "b", "c"]);
        assert_eq!(q.pending(None), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn delayed_jobs_wait_until_due() {
        let q = MemoryQueue::new();
        q.later(Duration::from_secs(30), job("late"), JobMetadata::default(), None, None)
            .await
            .unwrap();
        q.push(job("now"), JobMetadata::default(), None, None).await.unwrap();

        let worker = Recorder::default();
        let conn = q.connection(None).unwrap();
        assert_eq!(conn.process(None, &worker).await.unwrap(), 1);
        assert_eq!(q.pending(None), 1);

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(conn.process(None, &worker).await.unwrap(), 1);
        assert_eq!(*worker.seen.lock().unwrap(), vec!["now", "late"]);
    }

    #[tokio::test]
    async fn failure_stops_processing_and_keeps_the_rest() {
        let q = MemoryQueue::new();
        for name in ["a", "bad", "c"] {
            q.push(job(name), JobMetadata::default(), None, None).await.unwrap();
        }

        let worker = Recorder::default();
        let conn = q.connection(None).unwrap();
        let err = conn.process(None, &worker).await.unwrap_err();
        assert_eq!(err.as_label(), "queue_job_failed");
        assert_eq!(worker.runs.load(Ordering::SeqCst), 2);
        assert_eq!(q.pending(None), 1);

        assert_eq!(conn.process(None, &worker).await.unwrap(), 1);
        assert_eq!(*worker.seen.lock().unwrap(), vec!["a", "c"]);
    }

    #[tokio::test]
    async fn named_queues_and_connections_are_isolated() {
        let q = MemoryQueue::new().with_connection("sync");
        q.push(job("mail"), JobMetadata::default(), None, Some("mail")).await.unwrap();
        q.push(job("other"), JobMetadata::default(), Some("sync"), None).await.unwrap();

        assert_eq!(q.pending(None), 0);
        assert_eq!(q.pending(Some("mail")), 1);
        assert_eq!(q.memory_connection(Some("sync")).unwrap().pending(None), 1);

        let conn = q.connection(None).unwrap();
        assert_eq!(conn.clear(Some("mail")).await.unwrap(), 1);
        assert_eq!(conn.clear(Some("mail")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unknown_connection_is_rejected() {
        let q = MemoryQueue::new();
        let err = q
            .push(job("x"), JobMetadata::default(), Some("redis"), None)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            QueueError::UnknownConnection {
                name: "redis".into()
            }
        );
        assert!(q.connection(Some("redis")).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn worker_loop_stops_on_cancel() {
        let q = Arc::new(MemoryQueue::new());
        let conn = q.memory_connection(None).unwrap();
        let token = CancellationToken::new();
        let worker = Arc::new(Recorder::default());

        let handle = {
            let conn = Arc::clone(&conn);
            let worker = Arc::clone(&worker);
            let token = token.clone();
            tokio::spawn(async move {
                conn.work(None, &*worker, Duration::from_millis(100), token)
                    .await
            })
        };

        q.push(job("tick"), JobMetadata::default(), None, None).await.unwrap();
        tokio::time::sleep(Duration::from_millis(250)).await;
        token.cancel();

        let total = handle.await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(*worker.seen.lock().unwrap(), vec!["tick"]);
    }

    #[tokio::test(start_paused = true)]
    async fn worker_loop_survives_a_failing_job() {
        let q = Arc::new(MemoryQueue::new());
        let conn = q.memory_connection(None).unwrap();
        let token = CancellationToken::new();
        let worker = Arc::new(Recorder::default());

        q.push(job("bad"), JobMetadata::default(), None, None).await.unwrap();
        q.push(job("good"), JobMetadata::default(), None, None).await.unwrap();

        let handle = {
            let conn = Arc::clone(&conn);
            let worker = Arc::clone(&worker);
            let token = token.clone();
            tokio::spawn(async move {
                conn.work(None, &*worker, Duration::from_millis(100), token)
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(250)).await;
        token.cancel();

        assert_eq!(handle.await.unwrap(), 1);
        assert_eq!(worker.runs.load(Ordering::SeqCst), 2);
        assert_eq!(*worker.seen.lock().unwrap(), vec!["good"]);
        assert_eq!(q.pending(None), 0);
    }

    #[tokio::test]
    async fn out_of_range_delay_is_rejected() {
        let q = MemoryQueue::new();
        let err = q
            .later(Duration::MAX, job("never"), JobMetadata::default(), None, None)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            QueueError::Rejected {
                reason: "delay out of range".into()
            }
        );
        assert_eq!(q.pending(None), 0);
    }

    /// Takes five seconds per job.
    struct Slow;

    #[async_trait]
    impl JobWorker for Slow {
        async fn run_job(&self, _job: &QueueJob, _metadata: &JobMetadata) -> Result<(), QueueError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_pass_keeps_unfinished_jobs() {
        let q = MemoryQueue::new();
        for name in ["a", "b", "c"] {
            q.push(job(name), JobMetadata::default(), None, None).await.unwrap();
        }

        let conn = q.connection(None).unwrap();
        let pass = tokio::time::timeout(Duration::from_millis(50), conn.process(None, &Slow)).await;
        assert!(pass.is_err());
        assert_eq!(q.pending(None), 3);

        let worker = Recorder::default();
        assert_eq!(conn.process(None, &worker).await.unwrap(), 3);
        assert_eq!(*worker.seen.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn jobs_queued_during_a_pass_wait_for_the_next() {
        /// Queues a follow-up job while handling "first".
        struct Chain(Arc<MemoryQueue>, AtomicUsize);

        #[async_trait]
        impl JobWorker for Chain {
            async fn run_job(&self, queued: &QueueJob, _metadata: &JobMetadata) -> Result<(), QueueError> {
                self.1.fetch_add(1, Ordering::SeqCst);
                if queued.name() == "first" {
                    self.0.push(job("second"), JobMetadata::default(), None, None).await?;
                }
                Ok(())
            }
        }

        let q = Arc::new(MemoryQueue::new());
        q.push(job("first"), JobMetadata::default(), None, None).await.unwrap();

        let worker = Chain(Arc::clone(&q), AtomicUsize::new(0));
        let conn = q.connection(None).unwrap();
        assert_eq!(conn.process(None, &worker).await.unwrap(), 1);
        assert_eq!(q.pending(None), 1);
        assert_eq!(conn.process(None, &worker).await.unwrap(), 1);
        assert_eq!(worker.1.load(Ordering::SeqCst), 2);
    }
}
