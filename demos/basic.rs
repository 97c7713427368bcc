//! # Basic dispatch
//!
//! Demonstrates the core herald features:
//! - Closure and object listeners, invoked in registration order
//! - Typed events with explicit and fallback names
//! - `until` (first responder wins)
//! - Unsubscribing a single listener
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example basic
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use herald::{
    Dispatcher, DispatcherConfig, Event, Listener, ListenerError, Payload, Reply, Subscriber,
};
use tracing_subscriber::EnvFilter;

struct UserCreated {
    id: u64,
    email: String,
}

impl Event for UserCreated {
    const NAME: Option<&'static str> = Some("user.created");
}

/// Named after its type: "AccessRequested".
struct AccessRequested {
    user: u64,
    resource: &'static str,
}

impl Event for AccessRequested {}

struct AuditTrail;

#[async_trait]
impl Listener for AuditTrail {
    async fn handle(&self, payload: Payload) -> Result<Reply, ListenerError> {
        println!("📝 Audit: recorded {}", payload.type_name());
        Ok(None)
    }

    fn name(&self) -> &str {
        "audit-trail"
    }
}

struct Accounts;

impl Subscriber for Accounts {
    fn subscribe(&self, dispatcher: &Dispatcher) {
        let _ = dispatcher.listen_event_fn(|ev: Arc<UserCreated>| async move {
            println!("✉️  Welcome mail to {} (user #{})", ev.email, ev.id);
            Ok::<_, ListenerError>(Some(Payload::new(format!("welcomed #{}", ev.id))))
        });
        let _ = dispatcher.listen("user.created", Arc::new(AuditTrail));
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let dispatcher = Dispatcher::builder(DispatcherConfig::default())
        .with_subscriber(Arc::new(Accounts))
        .build();

    // Collect-all dispatch
    let replies = dispatcher
        .dispatch_event(UserCreated {
            id: 7,
            email: "ada@example.com".into(),
        })
        .await?;
    for reply in replies.iter().flatten() {
        if let Some(text) = reply.downcast_ref::<String>() {
            println!("↩️  Reply: {text}");
        }
    }

    // First responder wins
    let deny = dispatcher.listen_event_fn(|ev: Arc<AccessRequested>| async move {
        if ev.resource == "admin" && ev.user != 1 {
            return Ok::<_, ListenerError>(Some(Payload::new(false)));
        }
        Ok(None)
    });
    let _allow = dispatcher.listen_event_fn(|_ev: Arc<AccessRequested>| async move {
        Ok::<_, ListenerError>(Some(Payload::new(true)))
    });

    for resource in ["reports", "admin"] {
        let verdict = dispatcher
            .until_event(AccessRequested { user: 7, resource })
            .await?
            .and_then(|p| p.downcast_ref::<bool>().copied())
            .unwrap_or(false);
        println!("🔐 user #7 → {resource}: {}", if verdict { "allowed" } else { "denied" });
    }

    // Remove one listener
    deny.unsubscribe();
    let verdict = dispatcher
        .until_event(AccessRequested { user: 7, resource: "admin" })
        .await?
        .and_then(|p| p.downcast_ref::<bool>().copied());
    println!("🔐 after unsubscribe: {verdict:?}");
    println!(
        "📊 AccessRequested listeners: {}",
        dispatcher.listener_count("AccessRequested")
    );
    Ok(())
}
