use std::sync::Arc;

use anyhow::Context;

use storefront_catalog::{Product, ProductDraft};
use storefront_core::{OrderNumber, ProductId};
use storefront_events::{EventBus, InMemoryEventBus, Subscription};
use storefront_infra::{
    OrderPlacementService, PlacementError,
    inventory::HttpInventoryClient,
    repository::{
        InMemoryOrderRepository, InMemoryProductRepository, PostgresProductRepository, ProductRepository,
        RepositoryError,
    },
};
use storefront_orders::{Order, OrderPlacedEvent, PlaceOrder};

#[cfg(feature = "redis")]
use storefront_infra::{event_bus::RedisPubSubEventBus, repository::PostgresOrderRepository};

use sqlx::PgPool;

use crate::config::AppConfig;

type InMemoryPlacement = OrderPlacementService<
    Arc<InMemoryOrderRepository>,
    Arc<HttpInventoryClient>,
    Arc<InMemoryEventBus<OrderPlacedEvent>>,
>;

#[cfg(feature = "redis")]
type PersistentPlacement = OrderPlacementService<
    Arc<PostgresOrderRepository>,
    Arc<HttpInventoryClient>,
    Arc<RedisPubSubEventBus<OrderPlacedEvent>>,
>;

/// Order service wiring. The inventory client and the bus are built once and
/// shared by every request.
#[derive(Clone)]
pub enum OrderServices {
    InMemory {
        placement: Arc<InMemoryPlacement>,
        event_bus: Arc<InMemoryEventBus<OrderPlacedEvent>>,
    },
    #[cfg(feature = "redis")]
    Persistent {
        placement: Arc<PersistentPlacement>,
        event_bus: Arc<RedisPubSubEventBus<OrderPlacedEvent>>,
    },
}

impl OrderServices {
    /// In-memory store and bus, real HTTP inventory client.
    pub fn in_memory(inventory: HttpInventoryClient) -> Self {
        let event_bus: Arc<InMemoryEventBus<OrderPlacedEvent>> = Arc::new(InMemoryEventBus::new());
        let placement = OrderPlacementService::new(
            Arc::new(InMemoryOrderRepository::new()),
            Arc::new(inventory),
            event_bus.clone(),
        );
        OrderServices::InMemory {
            placement: Arc::new(placement),
            event_bus,
        }
    }

    pub async fn place_order(&self, request: PlaceOrder) -> Result<Order, PlacementError> {
        match self {
            OrderServices::InMemory { placement, .. } => placement.place_order(request).await,
            #[cfg(feature = "redis")]
            OrderServices::Persistent { placement, .. } => placement.place_order(request).await,
        }
    }

    pub async fn find_order(&self, order_number: &OrderNumber) -> Result<Option<Order>, PlacementError> {
        match self {
            OrderServices::InMemory { placement, .. } => placement.find_order(order_number).await,
            #[cfg(feature = "redis")]
            OrderServices::Persistent { placement, .. } => placement.find_order(order_number).await,
        }
    }

    /// Listen to order placed notifications.
    pub fn subscribe(&self) -> Subscription<OrderPlacedEvent> {
        match self {
            OrderServices::InMemory { event_bus, .. } => event_bus.subscribe(),
            #[cfg(feature = "redis")]
            OrderServices::Persistent { event_bus, .. } => event_bus.subscribe(),
        }
    }
}

/// Product catalog wiring.
#[derive(Clone)]
pub enum ProductServices {
    InMemory { repo: Arc<InMemoryProductRepository> },
    Persistent { repo: Arc<PostgresProductRepository> },
}

impl ProductServices {
    pub fn in_memory() -> Self {
        ProductServices::InMemory {
            repo: Arc::new(InMemoryProductRepository::new()),
        }
    }

    fn repo(&self) -> &dyn ProductRepository {
        match self {
            ProductServices::InMemory { repo } => repo.as_ref(),
            ProductServices::Persistent { repo } => repo.as_ref(),
        }
    }

    pub async fn create(&self, draft: ProductDraft) -> Result<Product, RepositoryError> {
        self.repo().create(draft).await
    }

    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        self.repo().get(id).await
    }

    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        self.repo().list().await
    }

    pub async fn update(&self, id: ProductId, draft: ProductDraft) -> Result<Option<Product>, RepositoryError> {
        self.repo().update(id, draft).await
    }

    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        self.repo().delete(id).await
    }
}

fn inventory_client(config: &AppConfig) -> anyhow::Result<HttpInventoryClient> {
    HttpInventoryClient::new(&config.inventory_url, config.inventory_timeout)
        .context("failed to build inventory HTTP client")
}

async fn connect_postgres(config: &AppConfig) -> anyhow::Result<PgPool> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set when USE_PERSISTENT_STORES=true")?;
    PgPool::connect(database_url)
        .await
        .context("failed to connect to Postgres")
}

pub async fn build_order_services(config: &AppConfig) -> anyhow::Result<OrderServices> {
    if config.use_persistent_stores {
        #[cfg(feature = "redis")]
        {
            return build_persistent_order_services(config).await;
        }
        #[cfg(not(feature = "redis"))]
        {
            tracing::warn!(
                "USE_PERSISTENT_STORES=true but redis feature not enabled, falling back to in-memory"
            );
        }
    }

    tracing::info!(inventory_url = %config.inventory_url, "order services: in-memory store and bus");
    Ok(OrderServices::in_memory(inventory_client(config)?))
}

#[cfg(feature = "redis")]
async fn build_persistent_order_services(config: &AppConfig) -> anyhow::Result<OrderServices> {
    let pool = connect_postgres(config).await?;

    let event_bus = Arc::new(
        RedisPubSubEventBus::new(&config.redis_url, config.notification_topic.clone())
            .context("failed to create Redis pub/sub event bus")?,
    );

    let placement = OrderPlacementService::new(
        Arc::new(PostgresOrderRepository::new(pool)),
        Arc::new(inventory_client(config)?),
        event_bus.clone(),
    );

    tracing::info!(
        inventory_url = %config.inventory_url,
        topic = %config.notification_topic,
        "order services: postgres store, redis bus"
    );

    Ok(OrderServices::Persistent {
        placement: Arc::new(placement),
        event_bus,
    })
}

pub async fn build_product_services(config: &AppConfig) -> anyhow::Result<ProductServices> {
    if config.use_persistent_stores {
        let pool = connect_postgres(config).await?;
        tracing::info!("product services: postgres store");
        return Ok(ProductServices::Persistent {
            repo: Arc::new(PostgresProductRepository::new(pool)),
        });
    }

    tracing::info!("product services: in-memory store");
    Ok(ProductServices::in_memory())
}
