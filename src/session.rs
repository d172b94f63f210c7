use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};

use crate::engine::config::EngineConfig;
use crate::engine::{analyze_frequency, build_tree, decode, encode, CodecError, WireNode};
use crate::metrics::{MetricsCollector, Operation};
use crate::protocol::{
    handshake::{read_handshake, write_handshake},
    message::{DecodedResponse, TreeResponse},
    read_frame, write_frame, Request, Response,
};

/// One client connection. Every request is answered independently; codec
/// errors are reported back and the connection stays open.
pub struct Session<S> {
    stream: S,
    engine: EngineConfig,
    max_frame_size: usize,
    metrics: Option<Arc<MetricsCollector>>,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Session<S> {
    pub fn new(
        stream: S,
        engine: EngineConfig,
        max_frame_size: usize,
        metrics: Option<Arc<MetricsCollector>>,
    ) -> Self {
        Self {
            stream,
            engine,
            max_frame_size,
            metrics,
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        let _client = read_handshake(&mut self.stream).await?;
        write_handshake(&mut self.stream).await?;

        info!("Handshake completed, entering main loop");

        loop {
            let frame = match read_frame(&mut self.stream, self.max_frame_size).await {
                Ok(f) => f,
                Err(e) => {
                    if let Some(io) = e.downcast_ref::<std::io::Error>() {
                        if io.kind() == std::io::ErrorKind::UnexpectedEof {
                            debug!("Client went away");
                            break;
                        }
                    }
                    return Err(e);
                }
            };

            let request = match Request::from_frame(&frame)? {
                Ok(Request::Close) => {
                    info!("Client requested close");
                    break;
                }
                Ok(request) => self.handle(request),
                Err(e) => Err(e),
            };

            let response = match request {
                Ok(response) => response,
                Err(e) => {
                    warn!("Request failed: {}", e);
                    if let Some(metrics) = &self.metrics {
                        metrics.record_error(e.kind());
                    }
                    Response::error(&e)
                }
            };

            write_frame(&mut self.stream, &response.to_frame()?).await?;
        }

        info!("Session ended");
        Ok(())
    }

    fn record(&self, op: Operation) {
        if let Some(metrics) = &self.metrics {
            metrics.record_request(op);
        }
    }

    fn check_length(&self, text: &str) -> Result<(), CodecError> {
        let symbols = text.chars().count();
        if symbols > self.engine.max_input_symbols {
            return Err(CodecError::invalid(format!(
                "input has {} symbols, limit is {}",
                symbols, self.engine.max_input_symbols
            )));
        }
        Ok(())
    }

    fn handle(&self, request: Request) -> Result<Response, CodecError> {
        match request {
            Request::AnalyzeFrequency(body) => {
                self.record(Operation::AnalyzeFrequency);
                let text = body.text.ok_or_else(|| CodecError::invalid("text is required"))?;
                self.check_length(&text)?;
                let table = analyze_frequency(&text);
                debug!("Frequency table: {} symbols", table.len());
                Ok(Response::Frequencies(table))
            }

            Request::BuildTree(body) => {
                self.record(Operation::BuildTree);
                let table = body
                    .frequencies
                    .ok_or_else(|| CodecError::invalid("frequency table is required"))?;
                let tree = build_tree(&table)?;
                Ok(Response::Tree(TreeResponse {
                    tree: WireNode::from_tree(&tree),
                }))
            }

            Request::Encode(body) => {
                self.record(Operation::Encode);
                let (Some(text), Some(tree)) = (body.text, body.tree) else {
                    return Err(CodecError::invalid("text and tree are required"));
                };
                self.check_length(&text)?;
                let tree = tree.into_tree()?;
                let encoded = encode(&text, &tree)?;
                if let Some(metrics) = &self.metrics {
                    metrics.record_encode(
                        encoded.original_size_bits,
                        encoded.compressed_size_bits,
                        encoded.compression_ratio,
                    );
                }
                Ok(Response::Encoded(encoded))
            }

            Request::Decode(body) => {
                self.record(Operation::Decode);
                let (Some(bits), Some(tree)) = (body.bits, body.tree) else {
                    return Err(CodecError::invalid("bits and tree are required"));
                };
                let tree = tree.into_tree()?;
                let text = decode(&tree, &bits)?;
                Ok(Response::Decoded(DecodedResponse { text }))
            }

            Request::Close => Err(CodecError::invalid("close carries no response")),
        }
    }
}
