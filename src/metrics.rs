use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Ratios kept for the running average.
const RATIO_WINDOW: usize = 1000;

#[derive(Debug, Clone, Serialize)]
pub struct Metrics {
    pub uptime_seconds: u64,
    pub frequency_requests: u64,
    pub tree_requests: u64,
    pub encode_requests: u64,
    pub decode_requests: u64,
    pub invalid_input_errors: u64,
    pub lookup_errors: u64,
    pub malformed_stream_errors: u64,
    pub total_original_bits: u64,
    pub total_compressed_bits: u64,
    pub active_connections: u64,
    pub compression_ratio_avg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    AnalyzeFrequency,
    BuildTree,
    Encode,
    Decode,
}

pub struct MetricsCollector {
    start_time: std::time::SystemTime,
    frequency_requests: AtomicU64,
    tree_requests: AtomicU64,
    encode_requests: AtomicU64,
    decode_requests: AtomicU64,
    invalid_input_errors: AtomicU64,
    lookup_errors: AtomicU64,
    malformed_stream_errors: AtomicU64,
    original_bits: AtomicU64,
    compressed_bits: AtomicU64,
    active_connections: AtomicU64,
    compression_ratios: Mutex<Vec<f64>>,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            start_time: std::time::SystemTime::now(),
            frequency_requests: AtomicU64::new(0),
            tree_requests: AtomicU64::new(0),
            encode_requests: AtomicU64::new(0),
            decode_requests: AtomicU64::new(0),
            invalid_input_errors: AtomicU64::new(0),
            lookup_errors: AtomicU64::new(0),
            malformed_stream_errors: AtomicU64::new(0),
            original_bits: AtomicU64::new(0),
            compressed_bits: AtomicU64::new(0),
            active_connections: AtomicU64::new(0),
            compression_ratios: Mutex::new(Vec::new()),
        }
    }

    pub fn record_request(&self, op: Operation) {
        let counter = match op {
            Operation::AnalyzeFrequency => &self.frequency_requests,
            Operation::BuildTree => &self.tree_requests,
            Operation::Encode => &self.encode_requests,
            Operation::Decode => &self.decode_requests,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// `kind` is the wire name of the codec error.
    pub fn record_error(&self, kind: &str) {
        let counter = match kind {
            "LookupError" => &self.lookup_errors,
            "MalformedStream" => &self.malformed_stream_errors,
            _ => &self.invalid_input_errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_encode(&self, original_bits: u64, compressed_bits: u64, ratio: Option<f64>) {
        self.original_bits.fetch_add(original_bits, Ordering::Relaxed);
        self.compressed_bits.fetch_add(compressed_bits, Ordering::Relaxed);
        if let (Some(ratio), Ok(mut ratios)) = (ratio, self.compression_ratios.lock()) {
            ratios.push(ratio);
            if ratios.len() > RATIO_WINDOW {
                ratios.remove(0);
            }
        }
    }

    pub fn connection_opened(&self) {
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn get_metrics(&self) -> Metrics {
        let uptime = self.start_time.elapsed().unwrap_or_default().as_secs();
        let avg_ratio = if let Ok(ratios) = self.compression_ratios.lock() {
            if ratios.is_empty() { 0.0 } else { ratios.iter().sum::<f64>() / ratios.len() as f64 }
        } else { 0.0 };

        Metrics {
            uptime_seconds: uptime,
            frequency_requests: self.frequency_requests.load(Ordering::Relaxed),
            tree_requests: self.tree_requests.load(Ordering::Relaxed),
            encode_requests: self.encode_requests.load(Ordering::Relaxed),
            decode_requests: self.decode_requests.load(Ordering::Relaxed),
            invalid_input_errors: self.invalid_input_errors.load(Ordering::Relaxed),
            lookup_errors: self.lookup_errors.load(Ordering::Relaxed),
            malformed_stream_errors: self.malformed_stream_errors.load(Ordering::Relaxed),
            total_original_bits: self.original_bits.load(Ordering::Relaxed),
            total_compressed_bits: self.compressed_bits.load(Ordering::Relaxed),
            active_connections: self.active_connections.load(Ordering::Relaxed),
            compression_ratio_avg: avg_ratio,
        }
    }
}

pub async fn start_metrics_server(
    addr: &str,
    metrics: Arc<MetricsCollector>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Metrics server listening on {}", addr);

    loop {
        let (mut socket, _) = listener.accept().await?;
        let metrics = Arc::clone(&metrics);

        tokio::spawn(async move {
            let mut buffer = [0; 1024];
            if let Ok(n) = socket.read(&mut buffer).await {
                let request = String::from_utf8_lossy(&buffer[..n]);

                if request.starts_with("GET /metrics") {
                    let json = serde_json::to_string_pretty(&metrics.get_metrics()).unwrap_or_default();
                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
                        json.len(),
                        json
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                } else if request.starts_with("GET /health") {
                    let response = "HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nOK";
                    let _ = socket.write_all(response.as_bytes()).await;
                } else {
                    let response = "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n";
                    let _ = socket.write_all(response.as_bytes()).await;
                }
            }
        });
    }
}
