//! Order-event notifier: consumes the `order_events` topic and logs each
//! event. Grounded on the source's `order_event_service.go` (log-only
//! processing) and `order_event_topic_sub.go` (consumer-group driver).

mod settings;

use clap::Parser;
use settings::Settings;
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

    let settings: Settings = appconfig::load("NOTIFIER")?;
    let consumer = bus::BusConsumer::new(&settings.kafka)?;

    let shutdown = CancellationToken::new();
    let consumer_shutdown = shutdown.clone();
    let consumer_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                result = consumer.recv() => {
                    match result {
                        Ok((event, message)) => {
                            tracing::info!(
                                order_id = event.order_id,
                                status = %event.status,
                                moment = %event.moment,
                                "order event changed"
                            );
                            if let Err(err) = consumer.mark(&message) {
                                tracing::warn!(%err, "failed to mark message as processed");
                            }
                        }
                        Err(err) => tracing::error!(%err, "failed to receive order event"),
                    }
                }
                _ = consumer_shutdown.cancelled() => break,
            }
        }
    });

    tracing::info!("notifier consumer started");
    wait_for_shutdown_signal().await;
    shutdown.cancel();

    let _ = tokio::time::timeout(settings.graceful_shutdown_timeout, consumer_task).await;

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
