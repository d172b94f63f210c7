//! JSON bodies carried by request and response frames.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::engine::{BitString, CodecError, EncodedOutput, FrequencyTable, WireNode};
use crate::protocol::constants::*;
use crate::protocol::error::ProtocolError;
use crate::protocol::frame::Frame;
use crate::utils::json;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeFrequencyRequest {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildTreeRequest {
    pub frequencies: Option<FrequencyTable>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncodeRequest {
    pub text: Option<String>,
    pub tree: Option<WireNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecodeRequest {
    pub bits: Option<BitString>,
    pub tree: Option<WireNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeResponse {
    pub tree: WireNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedResponse {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub kind: String,
    pub message: String,
}

impl From<&CodecError> for ErrorResponse {
    fn from(err: &CodecError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    AnalyzeFrequency(AnalyzeFrequencyRequest),
    BuildTree(BuildTreeRequest),
    Encode(EncodeRequest),
    Decode(DecodeRequest),
    Close,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Frequencies(FrequencyTable),
    Tree(TreeResponse),
    Encoded(EncodedOutput),
    Decoded(DecodedResponse),
    Error(ErrorResponse),
}

fn to_frame<T: Serialize>(frame_type: u8, body: &T) -> anyhow::Result<Frame> {
    let payload = serde_json::to_vec(body).map_err(|e| {
        error!("Cannot serialize body for frame {:#04x}: {}", frame_type, e);
        anyhow::anyhow!("cannot serialize body for frame {:#04x}: {}", frame_type, e)
    })?;
    Ok(Frame::new(frame_type, payload))
}

fn parse_body<T: DeserializeOwned>(frame: &Frame) -> Result<T, CodecError> {
    json::from_slice(&frame.payload)
        .map_err(|e| CodecError::invalid(format!("malformed request body: {}", e)))
}

impl Request {
    /// Parse a request frame.
    ///
    /// An unknown frame type is a protocol fault; a body that does not
    /// parse is the caller's error and comes back as `InvalidInput`.
    pub fn from_frame(frame: &Frame) -> Result<Result<Self, CodecError>, ProtocolError> {
        let parsed = match frame.frame_type {
            FRAME_ANALYZE_FREQUENCY => parse_body(frame).map(Request::AnalyzeFrequency),
            FRAME_BUILD_TREE => parse_body(frame).map(Request::BuildTree),
            FRAME_ENCODE => parse_body(frame).map(Request::Encode),
            FRAME_DECODE => parse_body(frame).map(Request::Decode),
            FRAME_CLOSE => Ok(Request::Close),
            other => return Err(ProtocolError::UnknownFrameType(other)),
        };
        Ok(parsed)
    }

    pub fn to_frame(&self) -> anyhow::Result<Frame> {
        match self {
            Request::AnalyzeFrequency(body) => to_frame(FRAME_ANALYZE_FREQUENCY, body),
            Request::BuildTree(body) => to_frame(FRAME_BUILD_TREE, body),
            Request::Encode(body) => to_frame(FRAME_ENCODE, body),
            Request::Decode(body) => to_frame(FRAME_DECODE, body),
            Request::Close => Ok(Frame::new(FRAME_CLOSE, Vec::new())),
        }
    }
}

impl Response {
    pub fn error(err: &CodecError) -> Self {
        Response::Error(ErrorResponse::from(err))
    }

    pub fn from_frame(frame: &Frame) -> anyhow::Result<Self> {
        let payload = &frame.payload;
        let response = match frame.frame_type {
            FRAME_FREQUENCIES => Response::Frequencies(json::from_slice(payload)?),
            FRAME_TREE => Response::Tree(json::from_slice(payload)?),
            FRAME_ENCODED => Response::Encoded(json::from_slice(payload)?),
            FRAME_DECODED => Response::Decoded(json::from_slice(payload)?),
            FRAME_ERROR => Response::Error(json::from_slice(payload)?),
            other => return Err(ProtocolError::UnknownFrameType(other).into()),
        };
        Ok(response)
    }

    pub fn to_frame(&self) -> anyhow::Result<Frame> {
        match self {
            Response::Frequencies(body) => to_frame(FRAME_FREQUENCIES, body),
            Response::Tree(body) => to_frame(FRAME_TREE, body),
            Response::Encoded(body) => to_frame(FRAME_ENCODED, body),
            Response::Decoded(body) => to_frame(FRAME_DECODED, body),
            Response::Error(body) => to_frame(FRAME_ERROR, body),
        }
    }
}
