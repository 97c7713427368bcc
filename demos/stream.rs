//! # Observing the event stream
//!
//! Every dispatch is recorded on a broadcast stream, whether or not anyone
//! listens and whether or not it was queued.
//!
//! The example shows:
//! - The built-in `StreamLogger` (feature `logging`)
//! - A filtered record stream (`of_type`)
//! - A typed payload stream (`on_event`)
//!
//! ## Run
//! ```bash
//! RUST_LOG=herald=debug cargo run --example stream --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use herald::{Dispatcher, DispatcherConfig, Event, ListenerError, Payload, StreamLogger};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct TemperatureRead {
    sensor: &'static str,
    celsius: f32,
}

impl Event for TemperatureRead {
    const NAME: Option<&'static str> = Some("sensor.temperature");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let dispatcher = Dispatcher::new(DispatcherConfig::default());
    let logger = StreamLogger::new().spawn(dispatcher.events());

    let mut heartbeats = dispatcher.of_type("system.heartbeat").take(2);
    let heartbeat_watch = tokio::spawn(async move {
        while let Some(record) = heartbeats.next().await {
            println!("💓 heartbeat #{} at {:?}", record.seq, record.at);
        }
    });

    let mut readings = dispatcher.on_event::<TemperatureRead>().take(3);
    let alarm = tokio::spawn(async move {
        let mut max = f32::MIN;
        while let Some(reading) = readings.next().await {
            println!("🌡️  {} = {:.1}°C", reading.sensor, reading.celsius);
            max = max.max(reading.celsius);
        }
        max
    });

    let _threshold = dispatcher.listen_event_fn(|ev: Arc<TemperatureRead>| async move {
        if ev.celsius > 30.0 {
            return Ok::<_, ListenerError>(Some(Payload::new("too hot")));
        }
        Ok(None)
    });

    for (i, celsius) in [21.5_f32, 24.0, 31.2].into_iter().enumerate() {
        dispatcher.dispatch("system.heartbeat", Payload::empty()).await?;
        let replies = dispatcher
            .dispatch_event(TemperatureRead {
                sensor: "greenhouse",
                celsius,
            })
            .await?;
        if let Some(Some(reply)) = replies.first() {
            println!("⚠️  reading {i}: {:?}", reply.downcast_ref::<&str>());
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    heartbeat_watch.await?;
    println!("📈 max temperature: {:.1}°C", alarm.await?);

    drop(dispatcher);
    logger.abort();
    Ok(())
}
