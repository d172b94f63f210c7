pub mod bits;
pub mod compressor;
pub mod config;
pub mod decoder;
pub mod decompressor;
pub mod encoder;
pub mod error;
pub mod frequency;
pub mod hash;
pub mod huffman;
pub mod wire;

pub use bits::BitString;
pub use compressor::{compress, PackedArtifact};
pub use decoder::decode;
pub use decompressor::decompress;
pub use encoder::{encode, encode_with, EncodedOutput};
pub use error::CodecError;
pub use frequency::{analyze_frequency, FrequencyEntry, FrequencyTable};
pub use huffman::{assign_codes, build_tree, CodeMap, HuffmanNode};
pub use wire::WireNode;
