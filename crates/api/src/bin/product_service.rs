use std::sync::Arc;

use anyhow::Context;

use storefront_api::{AppConfig, app};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    storefront_observability::init();

    let config = AppConfig::from_env()?;
    let services = app::services::build_product_services(&config).await?;
    let router = app::build_product_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.product_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.product_addr))?;

    tracing::info!(addr = %listener.local_addr()?, "product service listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(app::shutdown_signal())
        .await?;
    Ok(())
}
