//! Event publishing/subscription abstraction (mechanics only).
//!
//! The bus is fire-and-forget from the publisher's point of view: a
//! successful `publish` means the transport accepted the message, not that
//! any consumer processed it. Delivery is at-most-once for pub/sub transports
//! (offline subscribers miss messages), so consumers must not rely on the bus
//! as a store.

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use async_trait::async_trait;

/// A subscription to a bus. Each subscription receives its own copy of every
/// message published after it was created.
///
/// ```ignore
/// let sub = bus.subscribe();
/// loop {
///     match sub.recv_timeout(Duration::from_secs(1)) {
///         Ok(msg) => handle(msg),
///         Err(RecvTimeoutError::Timeout) => continue,
///         Err(RecvTimeoutError::Disconnected) => break,
///     }
/// }
/// ```
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next message is available.
    pub fn recv(&self) -> Result<M, std::sync::mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Drain everything that is already queued without blocking.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}

/// Transport-agnostic pub/sub.
///
/// Implementations are process-wide, long-lived resources: construct one at
/// start-up and share it (`Arc`) across requests. `publish` must not tear
/// down the underlying connection, and network-backed buses must bound it
/// with a timeout so a stalled broker cannot hold a request forever.
#[async_trait]
pub trait EventBus<M>: Send + Sync
where
    M: Send + 'static,
{
    type Error: core::fmt::Debug + core::fmt::Display + Send + Sync + 'static;

    async fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

#[async_trait]
impl<M, B> EventBus<M> for Arc<B>
where
    M: Send + 'static,
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    async fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message).await
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
