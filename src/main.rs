use anyhow::Result;
use std::sync::Arc;
use sysview::*;
use tokio::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    let monitoring = &app_config.monitoring;

    let source: Arc<dyn metrics_source::MetricsSource> =
        Arc::new(metrics_source::SysinfoSource::new());
    let collector = Arc::new(collector::MetricsCollector::new(
        source,
        monitoring.history_capacity,
    ));
    let broadcaster = Arc::new(broadcaster::Broadcaster::new(
        collector,
        Duration::from_millis(monitoring.send_timeout_ms),
    ));

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let worker_handle = worker::spawn(
        broadcaster.clone(),
        worker::WorkerConfig {
            sample_interval_ms: monitoring.sample_interval_ms,
            stats_log_interval_secs: monitoring.stats_log_interval_secs,
        },
        shutdown_rx,
    );

    let app = routes::app(broadcaster, app_config.clone());
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Starting System Viewer on http://{}", addr);

    let in_container = std::path::Path::new("/.dockerenv").exists()
        || std::env::var("CONTAINER").as_deref() == Ok("1");

    if in_container {
        // In Docker: run server until error or SIGTERM (no signal handler; avoids immediate exit)
        axum::serve(listener, app).await?;
    } else {
        tokio::select! {
            result = axum::serve(listener, app) => {
                result?;
            }
            _ = async {
                #[cfg(unix)]
                {
                    let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                        Ok(s) => s,
                        Err(_) => {
                            let _ = tokio::signal::ctrl_c().await;
                            return;
                        }
                    };
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {}
                        _ = sigterm.recv() => {}
                    }
                }
                #[cfg(not(unix))]
                {
                    let _ = tokio::signal::ctrl_c().await;
                }
            } => {
                tracing::info!("Received shutdown signal");
                let _ = shutdown_tx.send(());
                let _ = worker_handle.await;
            }
        }
    }

    Ok(())
}
