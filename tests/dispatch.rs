use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use herald::{
    Dispatcher, DispatcherConfig, Event, EventCatalog, EventCommand, Listener, ListenerError,
    ListenerFn, ListenerRef, MemoryOutput, MemoryQueue, Payload, QueueConnection, QueueManager,
    QueueOptions, Reply, Subscriber,
};

#[derive(Debug, PartialEq)]
struct UserCreated {
    id: u64,
}

impl Event for UserCreated {
    const NAME: Option<&'static str> = Some("user.created");
}

struct ReportRequested {
    delay: Duration,
}

impl Event for ReportRequested {
    const NAME: Option<&'static str> = Some("report.requested");

    fn should_queue(&self) -> Option<QueueOptions> {
        Some(QueueOptions::new().with_delay(self.delay).with_queue("reports"))
    }
}

struct SendWelcomeMail {
    sent: Arc<Mutex<Vec<u64>>>,
}

#[async_trait]
impl Listener for SendWelcomeMail {
    async fn handle(&self, payload: Payload) -> Result<Reply, ListenerError> {
        let event = payload
            .downcast_ref::<UserCreated>()
            .ok_or(ListenerError::UnexpectedPayload {
                expected: "UserCreated",
            })?;
        self.sent.lock().unwrap().push(event.id);
        Ok(None)
    }

    fn name(&self) -> &str {
        "send-welcome-mail"
    }

    fn should_queue(&self) -> Option<QueueOptions> {
        Some(QueueOptions::new())
    }
}

fn tagged(tag: &'static str) -> ListenerRef {
    ListenerFn::arc(tag, move |p: Payload| async move {
        let id = p.downcast_ref::<UserCreated>().map_or(0, |e| e.id);
        Ok::<Reply, ListenerError>(Some(Payload::new(format!("{tag}:{id}"))))
    })
}

fn texts(replies: &[Reply]) -> Vec<String> {
    replies
        .iter()
        .map(|r| {
            r.as_ref()
                .and_then(|p| p.downcast_ref::<String>())
                .cloned()
                .unwrap_or_default()
        })
        .collect()
}

#[tokio::test]
async fn user_created_reaches_both_listeners_in_order() {
    let d = Dispatcher::new(DispatcherConfig::default());
    let _a = d.listen("user.created", tagged("A"));
    let _b = d.listen("user.created", tagged("B"));

    let replies = d.dispatch_event(UserCreated { id: 7 }).await.unwrap();
    assert_eq!(texts(&replies), vec!["A:7", "B:7"]);
}

#[tokio::test]
async fn orphan_event_returns_empty_and_is_still_streamed() {
    let d = Dispatcher::new(DispatcherConfig::default());
    let mut stream = d.events();

    let replies = d.dispatch("orphan.event", Payload::empty()).await.unwrap();
    assert!(replies.is_empty());
    assert_eq!(d.listener_count("orphan.event"), 0);
    assert!(!d.has_listeners("orphan.event"));

    let record = stream.next().await.unwrap();
    assert_eq!(&*record.name, "orphan.event");
    assert!(record.payload.is_empty());
}

#[tokio::test]
async fn unsubscribe_removes_one_occurrence_only() {
    let d = Dispatcher::new(DispatcherConfig::default());
    let shared = tagged("A");

    let first = d.listen("user.created", Arc::clone(&shared));
    let _second = d.listen("user.created", Arc::clone(&shared));
    assert_eq!(d.listener_count("user.created"), 2);

    first.unsubscribe();
    assert_eq!(d.listener_count("user.created"), 1);
    first.unsubscribe();
    assert_eq!(d.listener_count("user.created"), 1);

    let replies = d.dispatch_event(UserCreated { id: 1 }).await.unwrap();
    assert_eq!(texts(&replies), vec!["A:1"]);
}

#[tokio::test]
async fn forget_and_forget_all_clear_registrations() {
    let d = Dispatcher::new(DispatcherConfig::default());
    let _ = d.listen("a", tagged("A"));
    let _ = d.listen("b", tagged("B"));

    d.forget("a");
    d.forget("never.registered");
    assert!(!d.has_listeners("a"));
    assert!(d.has_listeners("b"));

    d.forget_all();
    assert_eq!(d.listener_count("b"), 0);
    assert!(d.registry().events().is_empty());
}

#[tokio::test]
async fn queued_listener_runs_when_the_queue_is_processed() {
    let queue = Arc::new(MemoryQueue::new());
    let d = Dispatcher::builder(DispatcherConfig::default())
        .with_queue(queue.clone())
        .build();
    let sent = Arc::new(Mutex::new(Vec::new()));

    let _mail = d.listen_event::<UserCreated>(Arc::new(SendWelcomeMail {
        sent: Arc::clone(&sent),
    }));
    let _audit = d.listen("user.created", tagged("audit"));

    let replies = d.dispatch_event(UserCreated { id: 7 }).await.unwrap();
    assert_eq!(texts(&replies), vec!["audit:7"]);
    assert!(sent.lock().unwrap().is_empty());
    assert_eq!(queue.pending(None), 1);

    let connection = queue.connection(None).unwrap();
    let processed = connection.process(None, &*d).await.unwrap();
    assert_eq!(processed, 1);
    assert_eq!(*sent.lock().unwrap(), vec![7]);
    assert_eq!(queue.pending(None), 0);
}

#[tokio::test(start_paused = true)]
async fn delayed_event_job_runs_listeners_once_due() {
    let queue = Arc::new(MemoryQueue::new());
    let d = Dispatcher::builder(DispatcherConfig::default())
        .with_queue(queue.clone())
        .build();
    let calls = Arc::new(AtomicUsize::new(0));
    {
        let calls = Arc::clone(&calls);
        let _ = d.listen_event_fn(move |ev: Arc<ReportRequested>| {
            let calls = Arc::clone(&calls);
            async move {
                assert_eq!(ev.delay, Duration::from_secs(30));
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<Reply, ListenerError>(None)
            }
        });
    }

    let replies = d
        .dispatch_event(ReportRequested {
            delay: Duration::from_secs(30),
        })
        .await
        .unwrap();
    assert!(replies.is_empty());
    assert_eq!(queue.pending(Some("reports")), 1);

    let connection = queue.connection(None).unwrap();
    assert_eq!(connection.process(Some("reports"), &*d).await.unwrap(), 0);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    tokio::time::advance(Duration::from_secs(31)).await;
    assert_eq!(connection.process(Some("reports"), &*d).await.unwrap(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn named_dispatch_honours_event_queue_options() {
    let queue = Arc::new(MemoryQueue::new());
    let d = Dispatcher::builder(DispatcherConfig::default())
        .with_queue(queue.clone())
        .build();
    let calls = Arc::new(AtomicUsize::new(0));
    {
        let calls = Arc::clone(&calls);
        let _ = d.listen_fn("report.requested", move |_p: Payload| {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<Reply, ListenerError>(None)
            }
        });
    }

    let report = ReportRequested {
        delay: Duration::ZERO,
    };
    let replies = d
        .dispatch("report.requested", Payload::from_event(report))
        .await
        .unwrap();
    assert!(replies.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(queue.pending(Some("reports")), 1);

    let connection = queue.connection(None).unwrap();
    assert_eq!(connection.process(Some("reports"), &*d).await.unwrap(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(queue.pending(Some("reports")), 0);
}

#[tokio::test]
async fn until_bypasses_the_queue() {
    let queue = Arc::new(MemoryQueue::new());
    let d = Dispatcher::builder(DispatcherConfig::default())
        .with_queue(queue.clone())
        .build();
    let sent = Arc::new(Mutex::new(Vec::new()));
    let _ = d.listen_event::<UserCreated>(Arc::new(SendWelcomeMail {
        sent: Arc::clone(&sent),
    }));
    let _ = d.listen("user.created", tagged("B"));

    let first = d.until_event(UserCreated { id: 3 }).await.unwrap().unwrap();
    assert_eq!(first.downcast_ref::<String>().map(String::as_str), Some("B:3"));
    assert_eq!(*sent.lock().unwrap(), vec![3]);
    assert_eq!(queue.pending(None), 0);
}

#[tokio::test]
async fn failure_aborts_and_surfaces_listener_error() {
    let d = Dispatcher::new(DispatcherConfig {
        log_listener_errors: false,
        ..DispatcherConfig::default()
    });
    let later = Arc::new(AtomicUsize::new(0));
    let _ = d.listen_fn("user.created", |_p: Payload| async {
        Err::<Reply, _>(ListenerError::fail("mailbox full"))
    });
    {
        let later = Arc::clone(&later);
        let _ = d.listen_fn("user.created", move |_p: Payload| {
            let later = Arc::clone(&later);
            async move {
                later.fetch_add(1, Ordering::SeqCst);
                Ok::<Reply, ListenerError>(None)
            }
        });
    }

    let err = d.dispatch_event(UserCreated { id: 1 }).await.unwrap_err();
    assert_eq!(err.listener_error(), Some(&ListenerError::fail("mailbox full")));
    assert!(err.to_string().contains("user.created"));
    assert_eq!(later.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn subscribers_register_on_build_and_stream_views_filter() {
    struct Accounts;

    impl Subscriber for Accounts {
        fn subscribe(&self, dispatcher: &Dispatcher) {
            let _ = dispatcher.listen("user.created", tagged("welcome"));
            let _ = dispatcher.listen("user.deleted", tagged("cleanup"));
        }
    }

    let d = Dispatcher::builder(DispatcherConfig::default())
        .with_subscriber(Arc::new(Accounts))
        .with_catalog(EventCatalog::new().with::<UserCreated>())
        .build();
    assert!(d.has_listeners("user.created"));
    assert!(d.has_listeners("user.deleted"));

    let mut created = d.on_event::<UserCreated>();
    let mut deleted = d.on("user.deleted");

    d.dispatch("user.deleted", Payload::new(9_u64)).await.unwrap();
    d.dispatch_event(UserCreated { id: 5 }).await.unwrap();

    assert_eq!(*created.next().await.unwrap(), UserCreated { id: 5 });
    assert_eq!(deleted.next().await.unwrap().downcast_ref::<u64>(), Some(&9));

    let mut out = MemoryOutput::new();
    assert_eq!(EventCommand::new(d).execute(&["list"], &mut out).await, 0);
    assert!(out.contains(" - user.created (1 listeners)"));
}
