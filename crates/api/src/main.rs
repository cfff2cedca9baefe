use anyhow::Context;

use brujula_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    brujula_observability::init();

    let config = AppConfig::from_env()?;
    let services = brujula_api::app::services::build_services(&config)?;
    let app = brujula_api::app::build_app(services);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
