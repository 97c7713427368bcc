//! # Queued events and listeners
//!
//! Shows how queueable events and listeners are redirected to a queue manager
//! and processed later:
//! - A listener object that asks to be queued (mailer)
//! - A queueable event with a delay (nightly report)
//! - A background worker draining the in-memory queue
//! - The `event` management command
//!
//! ## Run
//! ```bash
//! RUST_LOG=herald=debug cargo run --example queued
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use herald::{
    Dispatcher, DispatcherConfig, Event, EventCatalog, EventCommand, Listener, ListenerError,
    MemoryQueue, Payload, QueueOptions, Reply, WriterOutput,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

struct OrderPlaced {
    order: u64,
}

impl Event for OrderPlaced {
    const NAME: Option<&'static str> = Some("order.placed");
}

struct ReportRequested;

impl Event for ReportRequested {
    const NAME: Option<&'static str> = Some("report.requested");

    fn should_queue(&self) -> Option<QueueOptions> {
        Some(QueueOptions::new().with_delay(Duration::from_millis(300)))
    }
}

/// Sends the confirmation mail through the queue.
struct ConfirmationMailer;

#[async_trait]
impl Listener for ConfirmationMailer {
    async fn handle(&self, payload: Payload) -> Result<Reply, ListenerError> {
        let order = payload
            .downcast_ref::<OrderPlaced>()
            .ok_or(ListenerError::UnexpectedPayload {
                expected: "OrderPlaced",
            })?;
        println!("✉️  [worker] confirmation mail for order #{}", order.order);
        Ok(None)
    }

    fn name(&self) -> &str {
        "confirmation-mailer"
    }

    fn should_queue(&self) -> Option<QueueOptions> {
        Some(QueueOptions::new())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let queue = Arc::new(MemoryQueue::new());
    let dispatcher = Dispatcher::builder(DispatcherConfig::default())
        .with_queue(queue.clone())
        .with_catalog(
            EventCatalog::new()
                .with::<OrderPlaced>()
                .with::<ReportRequested>(),
        )
        .build();

    let _mailer = dispatcher.listen_event::<OrderPlaced>(Arc::new(ConfirmationMailer));
    let _stock = dispatcher.listen_event_fn(|ev: Arc<OrderPlaced>| async move {
        println!("📦 [inline] stock reserved for order #{}", ev.order);
        Ok::<_, ListenerError>(Some(Payload::new(ev.order)))
    });
    let _report = dispatcher.listen_event_fn(|_ev: Arc<ReportRequested>| async move {
        println!("📊 [worker] nightly report generated");
        Ok::<_, ListenerError>(None)
    });

    let mut out = WriterOutput::stdout();
    let command = EventCommand::new(Arc::clone(&dispatcher));
    command.execute(&["list"], &mut out).await;

    for order in 1..=3 {
        let replies = dispatcher.dispatch_event(OrderPlaced { order }).await?;
        println!("↩️  order #{order}: {} inline replies", replies.len());
    }
    let replies = dispatcher.dispatch_event(ReportRequested).await?;
    println!("↩️  report: {} inline replies (redirected)", replies.len());
    println!("⏳ pending jobs: {}", queue.pending(None));

    // Drain the queue in the background until cancelled.
    let token = CancellationToken::new();
    let worker = {
        let queue = Arc::clone(&queue);
        let dispatcher = Arc::clone(&dispatcher);
        let token = token.clone();
        let connection = queue.memory_connection(None)?;
        tokio::spawn(async move {
            connection
                .work(None, &*dispatcher, Duration::from_millis(100), token)
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(600)).await;
    token.cancel();
    let processed = worker.await?;
    println!("✅ worker processed {processed} jobs");

    // Nothing left; the command reports it.
    command.execute(&["process"], &mut out).await;
    command.execute(&["clear"], &mut out).await;
    Ok(())
}
