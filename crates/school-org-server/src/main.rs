use std::sync::Arc;

use school_org_server::{router, Registry, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "school_org=info,school_org_server=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    let registry = Arc::new(Registry::from_config(&config));
    let app = router(registry);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("School org server listening on http://{}", listener.local_addr()?);
    if config.enforce_access {
        tracing::info!(
            superusers = config.superusers.len(),
            "Access enforcement on, callers identified by x-user-id"
        );
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
