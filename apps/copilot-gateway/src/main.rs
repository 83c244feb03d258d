use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use copilot_client::{CopilotClient, CopilotClientConfig};
use copilot_router::{PassthroughTokens, TokenProvider, gateway_router};

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("copilot-gateway failed: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Cli::parse()
        .into_patch()?
        .into_config()
        .context("finalize global config")?;
    info!(
        host = %config.host,
        port = config.port,
        proxy = %config.proxy.as_deref().unwrap_or(""),
        completions_url = %config.completions_url,
        models_url = %config.models_url,
        max_sse_line_bytes = config.max_sse_line_bytes,
        token_configured = config.token.is_some(),
        "config loaded"
    );

    let client = CopilotClient::new(CopilotClientConfig::from_global(&config))
        .context("build backend client")?;
    let tokens: Arc<dyn TokenProvider> = Arc::new(PassthroughTokens::new(config.token.clone()));
    let app = gateway_router(Arc::new(client), tokens);

    let bind = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("bind {bind}"))?;
    info!(addr = %bind, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve")?;
    info!("shutdown complete");
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(
            "copilot_gateway=info,copilot_router=info,copilot_client=info",
        )
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "ctrl-c handler unavailable");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
