//! Redis pub/sub-backed event bus (optional).
//!
//! Pub/sub is fire-and-forget: subscribers that are offline miss messages.
//! Payloads are the event's JSON body (`{"orderNumber":"..."}`), published on
//! a single channel.

use std::marker::PhantomData;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use storefront_events::{Event, EventBus, Subscription};

/// Upper bound for connecting to Redis and for each reply.
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, thiserror::Error)]
pub enum RedisBusError {
    #[error("redis error: {0}")]
    Redis(String),

    #[error("serialization error: {0}")]
    Serialize(String),
}

/// Redis pub/sub bus for one event type on one channel.
///
/// Publishing shares one multiplexed connection, opened on first use and
/// cloned per call. A failed publish drops it so the next call reconnects.
/// Connecting and every reply are bounded by the I/O timeout.
pub struct RedisPubSubEventBus<M> {
    client: redis::Client,
    channel: String,
    io_timeout: Duration,
    conn: Mutex<Option<MultiplexedConnection>>,
    _event: PhantomData<fn() -> M>,
}

impl<M> std::fmt::Debug for RedisPubSubEventBus<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisPubSubEventBus")
            .field("channel", &self.channel)
            .field("io_timeout", &self.io_timeout)
            .finish_non_exhaustive()
    }
}

impl<M> RedisPubSubEventBus<M> {
    /// Parses the URL only; no connection is made until the first publish.
    pub fn new(redis_url: impl AsRef<str>, channel: impl Into<String>) -> Result<Self, RedisBusError> {
        let client = redis::Client::open(redis_url.as_ref())
            .map_err(|e| RedisBusError::Redis(e.to_string()))?;
        Ok(Self {
            client,
            channel: channel.into(),
            io_timeout: DEFAULT_IO_TIMEOUT,
            conn: Mutex::new(None),
            _event: PhantomData,
        })
    }

    pub fn with_io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    async fn connection(&self) -> Result<MultiplexedConnection, RedisBusError> {
        let mut slot = self.conn.lock().await;
        if let Some(conn) = slot.as_ref() {
            return Ok(conn.clone());
        }

        let conn = self
            .client
            .get_multiplexed_async_connection_with_timeouts(self.io_timeout, self.io_timeout)
            .await
            .map_err(|e| RedisBusError::Redis(e.to_string()))?;
        *slot = Some(conn.clone());
        Ok(conn)
    }

    async fn publish_payload(&self, payload: String) -> Result<i64, RedisBusError> {
        let mut conn = self.connection().await?;

        match conn.publish::<_, _, i64>(&self.channel, payload).await {
            Ok(receivers) => Ok(receivers),
            Err(e) => {
                *self.conn.lock().await = None;
                Err(RedisBusError::Redis(e.to_string()))
            }
        }
    }
}

#[async_trait]
impl<M> EventBus<M> for RedisPubSubEventBus<M>
where
    M: Event + DeserializeOwned,
{
    type Error = RedisBusError;

    #[instrument(skip_all, fields(channel = %self.channel, event_type = message.event_type()), err)]
    async fn publish(&self, message: M) -> Result<(), Self::Error> {
        let payload = serde_json::to_string(&message)
            .map_err(|e| RedisBusError::Serialize(e.to_string()))?;

        let receivers = self.publish_payload(payload).await?;
        debug!(receivers, "event published");

        Ok(())
    }

    fn subscribe(&self) -> Subscription<M> {
        let (tx, rx) = mpsc::channel();

        let client = self.client.clone();
        let channel = self.channel.clone();
        let io_timeout = self.io_timeout;

        thread::spawn(move || {
            let mut conn = match client.get_connection_with_timeout(io_timeout) {
                Ok(c) => c,
                Err(e) => {
                    warn!(error = %e, "redis subscriber could not connect");
                    return;
                }
            };

            let mut pubsub = conn.as_pubsub();
            if let Err(e) = pubsub.subscribe(&channel) {
                warn!(error = %e, channel = %channel, "redis subscribe failed");
                return;
            }

            loop {
                let msg = match pubsub.get_message() {
                    Ok(m) => m,
                    Err(_) => return,
                };

                let payload: String = match msg.get_payload() {
                    Ok(p) => p,
                    Err(_) => continue,
                };

                let event: M = match serde_json::from_str(&payload) {
                    Ok(e) => e,
                    Err(e) => {
                        warn!(error = %e, "skipping undecodable event payload");
                        continue;
                    }
                };

                if tx.send(event).is_err() {
                    return;
                }
            }
        });

        Subscription::new(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::time::Instant;

    use rust_decimal::Decimal;
    use storefront_orders::{OrderPlacedEvent, PlaceOrder, PlaceOrderLine};

    use crate::inventory::StaticInventory;
    use crate::order_placement::{OrderPlacementService, PlacementError};
    use crate::repository::InMemoryOrderRepository;

    fn event() -> OrderPlacedEvent {
        OrderPlacedEvent {
            order_number: storefront_core::OrderNumber::new(),
        }
    }

    /// A TCP endpoint that completes the handshake and never answers.
    fn silent_server() -> (std::net::TcpListener, String) {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("redis://{}", listener.local_addr().unwrap());
        (listener, url)
    }

    #[test]
    fn invalid_url_is_rejected_up_front() {
        let res = RedisPubSubEventBus::<OrderPlacedEvent>::new("not a url", "notificationTopic");
        assert!(matches!(res, Err(RedisBusError::Redis(_))));
    }

    #[test]
    fn construction_does_not_connect() {
        // Nothing listens on this port; `new` must still succeed.
        let bus = RedisPubSubEventBus::<OrderPlacedEvent>::new("redis://127.0.0.1:1", "notificationTopic")
            .unwrap();
        assert_eq!(bus.channel(), "notificationTopic");
    }

    #[tokio::test]
    async fn publish_to_unreachable_server_is_an_error() {
        let bus = RedisPubSubEventBus::<OrderPlacedEvent>::new("redis://127.0.0.1:1", "notificationTopic")
            .unwrap();
        let event = event();

        let err = bus.publish(event.clone()).await.unwrap_err();
        assert!(matches!(err, RedisBusError::Redis(_)));

        // The bus stays usable: a second attempt fails the same way.
        let err = bus.publish(event).await.unwrap_err();
        assert!(matches!(err, RedisBusError::Redis(_)));
    }

    #[tokio::test]
    async fn silent_server_fails_within_the_io_timeout() {
        let (_listener, url) = silent_server();
        let bus = RedisPubSubEventBus::<OrderPlacedEvent>::new(url, "notificationTopic")
            .unwrap()
            .with_io_timeout(Duration::from_millis(200));

        let started = Instant::now();
        let err = bus.publish(event()).await.unwrap_err();

        assert!(matches!(err, RedisBusError::Redis(_)));
        assert!(started.elapsed() < Duration::from_secs(3), "took {:?}", started.elapsed());
    }

    #[tokio::test]
    async fn stalled_broker_does_not_hold_order_placement() {
        let (_listener, url) = silent_server();
        let bus = RedisPubSubEventBus::<OrderPlacedEvent>::new(url, "notificationTopic")
            .unwrap()
            .with_io_timeout(Duration::from_millis(200));
        let repo = Arc::new(InMemoryOrderRepository::new());
        let service = OrderPlacementService::new(
            repo.clone(),
            StaticInventory::new().with_stock("A", true),
            Arc::new(bus),
        );
        let request = PlaceOrder::new(vec![PlaceOrderLine {
            sku_code: "A".to_string(),
            price: Decimal::ONE,
            quantity: 1,
        }]);

        // Runs on the single-threaded test runtime: the outer timeout can only
        // fire if the publish yields back to it.
        let outcome = tokio::time::timeout(Duration::from_secs(3), service.place_order(request))
            .await
            .expect("place_order did not return while the broker was stalled");

        assert!(matches!(outcome, Err(PlacementError::Publish(_))));
        assert_eq!(repo.len(), 1);
    }
}
