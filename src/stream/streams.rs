//! # Stream views over the event bus.
//!
//! Each constructor subscribes **immediately** (at call time, not on first
//! poll), so records published after the call are never missed.
//!
//! ```text
//! Bus.subscribe() ─► BroadcastStream ─► drop Lagged (warn) ─► [filter name] ─► [map payload / downcast]
//! ```

use std::sync::Arc;

use futures::stream::{BoxStream, StreamExt};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::warn;

use super::bus::{Bus, EventRecord};
use crate::events::Payload;

/// Stream of event records.
pub type EventStream = BoxStream<'static, EventRecord>;

/// Stream of bare payloads.
pub type PayloadStream = BoxStream<'static, Payload>;

/// Stream of typed payloads.
pub type TypedStream<E> = BoxStream<'static, Arc<E>>;

/// Every record, in publish order.
pub(crate) fn records(bus: &Bus) -> EventStream {
    BroadcastStream::new(bus.subscribe())
        .filter_map(|item| async move {
            match item {
                Ok(record) => Some(record),
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    warn!(skipped, "event stream subscriber lagged");
                    None
                }
            }
        })
        .boxed()
}

/// `(name, payload)` pairs.
pub(crate) fn pairs(bus: &Bus) -> BoxStream<'static, (Arc<str>, Payload)> {
    records(bus)
        .map(|record| (record.name, record.payload))
        .boxed()
}

/// Records whose name equals `name`.
pub(crate) fn named(bus: &Bus, name: impl Into<Arc<str>>) -> EventStream {
    let name: Arc<str> = name.into();
    records(bus)
        .filter(move |record| futures::future::ready(record.name == name))
        .boxed()
}

/// Payloads of records named `name`.
pub(crate) fn payloads(bus: &Bus, name: impl Into<Arc<str>>) -> PayloadStream {
    named(bus, name).map(|record| record.payload).boxed()
}

/// Payloads of records named `name` that downcast to `E`; others are skipped.
pub(crate) fn typed<E>(bus: &Bus, name: impl Into<Arc<str>>) -> TypedStream<E>
where
    E: Send + Sync + 'static,
{
    named(bus, name)
        .filter_map(|record| futures::future::ready(record.payload.downcast::<E>()))
        .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn filters_by_name_and_keeps_order() {
        let bus = Bus::new(16);
        let mut all = records(&bus);
        let mut only_b = named(&bus, "b");
        let mut b_payloads = payloads(&bus, "b");

        bus.publish("a", Payload::new(1_u32));
        bus.publish("b", Payload::new(2_u32));
        bus.publish("b", Payload::new(3_u32));

        let names: Vec<String> = all.by_ref().take(3).map(|r| r.name.to_string()).collect().await;
        assert_eq!(names, vec!["a", "b", "b"]);

        let first_b = only_b.next().await.unwrap();
        assert_eq!(first_b.payload.downcast_ref::<u32>(), Some(&2));

        let values: Vec<u32> = b_payloads
            .take(2)
            .map(|p| *p.downcast_ref::<u32>().unwrap())
            .collect()
            .await;
        assert_eq!(values, vec![2, 3]);
    }

    #[tokio::test]
    async fn typed_skips_foreign_payloads() {
        let bus = Bus::new(16);
        let mut ids = typed::<u64>(&bus, "user.created");

        bus.publish("user.created", Payload::new("not an id"));
        bus.publish("user.created", Payload::new(7_u64));

        assert_eq!(*ids.next().await.unwrap(), 7);
    }

    #[tokio::test]
    async fn lagged_subscriber_resumes_with_newest() {
        let bus = Bus::new(2);
        let mut all = records(&bus);

        for n in 0..5_u32 {
            bus.publish("tick", Payload::new(n));
        }

        let first = all.next().await.unwrap();
        assert_eq!(first.payload.downcast_ref::<u32>(), Some(&3));
    }

    #[tokio::test]
    async fn pairs_carry_name_and_payload() {
        let bus = Bus::new(4);
        let mut stream = pairs(&bus);
        bus.publish("x", Payload::new('x'));

        let (name, payload) = stream.next().await.unwrap();
        assert_eq!(&*name, "x");
        assert_eq!(payload.downcast_ref::<char>(), Some(&'x'));
    }
}
