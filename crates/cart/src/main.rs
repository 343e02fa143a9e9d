mod domain;
mod http;
mod loms_client;
mod product_client;
mod service;
mod settings;
mod store;

use std::sync::Arc;

use clap::Parser;
use httpclient::{RetryPolicy, RetryingClient, TokenBucket};
use reqwest::Url;
use tokio_util::sync::CancellationToken;

use loms_client::LomsClient;
use product_client::ProductClient;
use service::CartService;
use settings::Settings;
use store::CartStore;

#[derive(Parser)]
struct Cli {
    #[command(flatten)]
    log: telemetry::LogArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init_logging(&cli.log);

    let settings: Settings = appconfig::load("CART")?;

    let base_url = Url::parse(&settings.product_service.base_url)?;
    let limiter = Arc::new(TokenBucket::new(settings.product_service.rps));
    let policy = RetryPolicy::new(
        settings.product_service.retry_trigger_statuses.clone(),
        settings.product_service.max_retries,
    );
    let retrying_client = RetryingClient::new(reqwest::Client::new(), policy);
    let product_client = ProductClient::new(
        retrying_client,
        limiter,
        base_url,
        settings.product_service.token.clone(),
    );

    let loms_client = LomsClient::connect(settings.loms.address.clone()).await?;

    let store = CartStore::new();
    let service = Arc::new(CartService::new(store, product_client, loms_client));

    let shutdown = CancellationToken::new();
    let observer_shutdown = shutdown.clone();
    let observer_service = service.clone();
    let observer_interval = settings.repo_observer_interval;
    let observer_task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(observer_interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let count = observer_service.cart_count().await;
                    tracing::info!(count, "cart repo size");
                }
                _ = observer_shutdown.cancelled() => break,
            }
        }
    });

    let addr = format!("{}:{}", settings.http.host, settings.http.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "cart HTTP server starting");

    let router = http::router(service);
    let server_shutdown = shutdown.clone();
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            wait_for_shutdown_signal().await;
            server_shutdown.cancel();
        })
        .await?;

    let _ = tokio::time::timeout(settings.graceful_shutdown_timeout, observer_task).await;

    Ok(())
}

async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        let mut sig = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        sig.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
