//! Minimal client for the framed protocol, mirroring the four operations.

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::debug;

use crate::engine::{BitString, EncodedOutput, FrequencyTable, WireNode};
use crate::protocol::{
    handshake::{read_handshake, write_handshake},
    message::{
        AnalyzeFrequencyRequest, BuildTreeRequest, DecodeRequest, EncodeRequest, ErrorResponse,
    },
    read_frame, write_frame, Request, Response, DEFAULT_MAX_FRAME_SIZE,
};

pub struct Client<S> {
    stream: S,
}

impl Client<TcpStream> {
    pub async fn connect(addr: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        debug!("Connected to {}", addr);
        Self::handshake(stream).await
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> Client<S> {
    pub async fn handshake(mut stream: S) -> anyhow::Result<Self> {
        write_handshake(&mut stream).await?;
        read_handshake(&mut stream).await?;
        Ok(Self { stream })
    }

    /// Send a request and return the raw response, error frames included.
    pub async fn call(&mut self, request: &Request) -> anyhow::Result<Response> {
        write_frame(&mut self.stream, &request.to_frame()?).await?;
        let frame = read_frame(&mut self.stream, DEFAULT_MAX_FRAME_SIZE).await?;
        Response::from_frame(&frame)
    }

    pub async fn analyze_frequency(&mut self, text: &str) -> anyhow::Result<FrequencyTable> {
        let request = Request::AnalyzeFrequency(AnalyzeFrequencyRequest {
            text: Some(text.to_string()),
        });
        match self.call(&request).await? {
            Response::Frequencies(table) => Ok(table),
            other => Err(unexpected(other)),
        }
    }

    pub async fn build_tree(&mut self, frequencies: &FrequencyTable) -> anyhow::Result<WireNode> {
        let request = Request::BuildTree(BuildTreeRequest {
            frequencies: Some(frequencies.clone()),
        });
        match self.call(&request).await? {
            Response::Tree(body) => Ok(body.tree),
            other => Err(unexpected(other)),
        }
    }

    pub async fn encode(&mut self, text: &str, tree: &WireNode) -> anyhow::Result<EncodedOutput> {
        let request = Request::Encode(EncodeRequest {
            text: Some(text.to_string()),
            tree: Some(tree.clone()),
        });
        match self.call(&request).await? {
            Response::Encoded(encoded) => Ok(encoded),
            other => Err(unexpected(other)),
        }
    }

    pub async fn decode(&mut self, bits: &BitString, tree: &WireNode) -> anyhow::Result<String> {
        let request = Request::Decode(DecodeRequest {
            bits: Some(bits.clone()),
            tree: Some(tree.clone()),
        });
        match self.call(&request).await? {
            Response::Decoded(body) => Ok(body.text),
            other => Err(unexpected(other)),
        }
    }

    pub async fn close(mut self) -> anyhow::Result<()> {
        write_frame(&mut self.stream, &Request::Close.to_frame()?).await
    }
}

fn unexpected(response: Response) -> anyhow::Error {
    match response {
        Response::Error(ErrorResponse { kind, message }) => anyhow::anyhow!("{}: {}", kind, message),
        other => anyhow::anyhow!("unexpected response: {:?}", other),
    }
}
