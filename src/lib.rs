//! huffvizd: Huffman coding engine and the service that walks a visualizer
//! through it.
//!
//! - `engine`: frequency analysis, tree building, code assignment,
//!   encoding, decoding, and the wire/packed representations
//! - `walkthrough`: step-by-step state over one input text
//! - `protocol`, `session`, `server`, `client`: framed request/response
//!   transport for the four operations
//! - `metrics`, `config`: service plumbing

pub mod client;
pub mod config;
pub mod engine;
pub mod metrics;
pub mod protocol;
pub mod server;
pub mod session;
pub mod utils;
pub mod walkthrough;

pub use engine::CodecError;
