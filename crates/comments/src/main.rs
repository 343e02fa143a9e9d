use std::sync::Arc;

use clap::Parser;
use comments::grpc::CommentsGrpc;
use comments::service::CommentService;
use comments::settings::Settings;
use comments_proto::comments_server::CommentsServer;
use shard::{Shard, ShardRing};
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
struct Cli {
    #[command(flatten)]
    log: telemetry::LogArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init_logging(&cli.log);

    let settings: Settings = appconfig::load("COMMENTS")?;

    let mut shards = Vec::with_capacity(settings.shard_table.shards.len());
    for shard in &settings.shard_table.shards {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(&shard.dsn)
            .await?;
        shards.push(Shard {
            pool,
            bucket_position: shard.bucket_position,
        });
    }
    let ring = ShardRing::new(settings.shard_table.bucket_count, shards)?;

    let service = Arc::new(CommentService::new(
        ring,
        settings.edit_interval,
        settings.limit_rows_by_sku,
    ));

    let addr = format!("{}:{}", settings.grpc.host, settings.grpc.port).parse()?;
    let grpc_service = CommentsGrpc { service };

    tracing::info!(%addr, "comments gRPC server starting");

    let shutdown = CancellationToken::new();
    let server_shutdown = shutdown.clone();
    let serve = tonic::transport::Server::builder()
        .add_service(CommentsServer::new(grpc_service))
        .serve_with_shutdown(addr, async move { server_shutdown.cancelled().await });
    tokio::pin!(serve);

    tokio::select! {
        result = &mut serve => result?,
        _ = wait_for_shutdown_signal() => {
            shutdown.cancel();
            if tokio::time::timeout(settings.graceful_shutdown_timeout, serve).await.is_err() {
                tracing::warn!("graceful shutdown timeout elapsed before server stopped");
            }
        }
    }

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
