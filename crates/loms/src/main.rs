use std::sync::Arc;

use bus::BusProducer;
use clap::Parser;
use loms_proto::loms_server::LomsServer;
use sqlx::postgres::PgPoolOptions;
use storage::PoolManager;
use tokio_util::sync::CancellationToken;

use loms::grpc::LomsGrpc;
use loms::order::OrderService;
use loms::outbox_publisher::OutboxPublisher;
use loms::settings::Settings;
use loms::stock::StockService;

#[derive(Parser)]
struct Cli {
    #[command(flatten)]
    log: telemetry::LogArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init_logging(&cli.log);

    let settings: Settings = appconfig::load("LOMS")?;

    let master = PgPoolOptions::new()
        .max_connections(10)
        .connect(&settings.db.master_dsn)
        .await?;
    let mut replicas = Vec::with_capacity(settings.db.replica_dsns.len());
    for dsn in &settings.db.replica_dsns {
        replicas.push(PgPoolOptions::new().max_connections(10).connect(dsn).await?);
    }
    let pool = Arc::new(PoolManager::new(master, replicas));

    let producer = Arc::new(BusProducer::new(&settings.kafka)?);

    let stock = Arc::new(StockService::new(pool.clone()));
    let order = Arc::new(OrderService::new(pool.clone(), stock.clone()));

    let shutdown = CancellationToken::new();

    let publisher = OutboxPublisher::new(
        pool.clone(),
        producer,
        settings.outbox.batch_size,
        settings.outbox.period,
    );
    let publisher_shutdown = shutdown.clone();
    let publisher_task = tokio::spawn(async move { publisher.run(publisher_shutdown).await });

    let addr = format!("{}:{}", settings.grpc.host, settings.grpc.port).parse()?;
    let grpc_service = LomsGrpc { order, stock };

    tracing::info!(%addr, "loms gRPC server starting");

    let server_shutdown = shutdown.clone();
    tonic::transport::Server::builder()
        .add_service(LomsServer::new(grpc_service))
        .serve_with_shutdown(addr, async move {
            wait_for_shutdown_signal().await;
            server_shutdown.cancel();
        })
        .await?;

    let _ = tokio::time::timeout(settings.graceful_shutdown_timeout, publisher_task).await;

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
