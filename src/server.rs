use tokio::net::TcpListener;
use tracing::{info, error};
use crate::config::ServerConfig;
use crate::session::Session;
use crate::metrics::{MetricsCollector, start_metrics_server};
use std::sync::Arc;

pub async fn run(config: &ServerConfig) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&config.listen_address).await?;
    info!("Server listening on {}", config.listen_address);
    serve(listener, config).await
}

/// Accept connections on an already bound listener, one task per client.
pub async fn serve(listener: TcpListener, config: &ServerConfig) -> anyhow::Result<()> {
    let metrics = Arc::new(MetricsCollector::new());

    if let Some(metrics_addr) = config.metrics_address.clone() {
        let metrics_clone = Arc::clone(&metrics);
        tokio::spawn(async move {
            if let Err(e) = start_metrics_server(&metrics_addr, metrics_clone).await {
                error!("Metrics server failed: {}", e);
            }
        });
    }

    loop {
        match listener.accept().await {
            Ok((socket, peer)) => {
                info!("New connection from {}", peer);
                metrics.connection_opened();

                let engine = config.engine.clone();
                let max_frame_size = config.max_frame_size;
                let metrics_clone = Arc::clone(&metrics);

                tokio::spawn(async move {
                    let session = Session::new(
                        socket,
                        engine,
                        max_frame_size,
                        Some(Arc::clone(&metrics_clone)),
                    );
                    if let Err(e) = session.run().await {
                        error!("Session error for {}: {}", peer, e);
                    } else {
                        info!("Session completed for {}", peer);
                    }
                    metrics_clone.connection_closed();
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
