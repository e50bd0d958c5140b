use deployment::Deployment;
use server::{DeploymentImpl, routes};
use services::services::config::Config;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    utils::logging::init_tracing();

    let config = Config::from_env();
    let addr = config.bind_address();
    let deployment = DeploymentImpl::new(config).await?;

    let app = routes::router(deployment);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
