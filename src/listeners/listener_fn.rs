//! # Function-backed listeners (`ListenerFn`, `EventFn`)
//!
//! [`ListenerFn`] wraps a closure `F: Fn(Payload) -> Fut`, producing a fresh
//! future per invocation. [`EventFn`] does the same for a typed event: it
//! downcasts the payload to `Arc<E>` and fails with
//! [`ListenerError::UnexpectedPayload`] on any other type.
//!
//! Function listeners are always invoked inline; only listener objects can
//! ask to be queued.
//!
//! ## Example
//! ```rust
//! use herald::{Listener, ListenerError, ListenerFn, ListenerRef, Payload};
//!
//! let l: ListenerRef = ListenerFn::arc("echo", |p: Payload| async move {
//!     Ok::<_, ListenerError>(Some(p))
//! });
//!
//! assert_eq!(l.name(), "echo");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ListenerError;
use crate::events::{Event, Payload, Reply};
use crate::listeners::listener::Listener;

/// Function-backed listener.
#[derive(Debug)]
pub struct ListenerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F, Fut> ListenerFn<F>
where
    F: Fn(Payload) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Reply, ListenerError>> + Send + 'static,
{
    /// Creates a new function-backed listener.
    ///
    /// Prefer [`ListenerFn::arc`] when you immediately need a [`ListenerRef`](crate::ListenerRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the listener and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Listener for ListenerFn<F>
where
    F: Fn(Payload) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Reply, ListenerError>> + Send + 'static,
{
    async fn handle(&self, payload: Payload) -> Result<Reply, ListenerError> {
        (self.f)(payload).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Typed function-backed listener for event type `E`.
pub struct EventFn<E, F> {
    name: Cow<'static, str>,
    f: F,
    _event: PhantomData<fn(Arc<E>)>,
}

impl<E, F, Fut> EventFn<E, F>
where
    E: Event,
    F: Fn(Arc<E>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Reply, ListenerError>> + Send + 'static,
{
    /// Creates a new typed listener.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
            _event: PhantomData,
        }
    }

    /// Creates the listener and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<E, F, Fut> Listener for EventFn<E, F>
where
    E: Event,
    F: Fn(Arc<E>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Reply, ListenerError>> + Send + 'static,
{
    async fn handle(&self, payload: Payload) -> Result<Reply, ListenerError> {
        let event = payload
            .downcast::<E>()
            .ok_or(ListenerError::UnexpectedPayload {
                expected: std::any::type_name::<E>(),
            })?;
        (self.f)(event).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
