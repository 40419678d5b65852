use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;

use medthing_api::app;
use medthing_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    medthing_observability::init();

    let config = AppConfig::from_env()?;
    let addr = config.bind_addr()?;

    let services = Arc::new(app::build_services(&config).await?);
    let sweeper = services.governor.spawn_sweeper();
    let router = app::build_app(&config.jwt_secret, services);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    sweeper.shutdown().await;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
