use anyhow::Context;

use ironstart_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ironstart_observability::init();

    let config = AppConfig::from_env()?;
    let bind_addr = config.bind_addr;

    let app = ironstart_api::app::build_app(config).await?;

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
