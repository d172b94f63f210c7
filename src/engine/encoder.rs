use serde::{Deserialize, Serialize};
use crate::engine::bits::BitString;
use crate::engine::error::{CodecError, Result};
use crate::engine::huffman::{CodeMap, HuffmanNode};

/// Width of the uncompressed baseline every symbol is measured against.
pub const BITS_PER_SYMBOL: u64 = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedOutput {
    #[serde(rename = "encodedText")]
    pub bits: BitString,
    #[serde(rename = "originalSize")]
    pub original_size_bits: u64,
    #[serde(rename = "compressedSize")]
    pub compressed_size_bits: u64,
    pub compression_ratio: Option<f64>,
}

impl EncodedOutput {
    fn new(bits: BitString, symbol_count: u64) -> Self {
        let original_size_bits = symbol_count * BITS_PER_SYMBOL;
        let compressed_size_bits = bits.len() as u64;
        Self {
            bits,
            original_size_bits,
            compressed_size_bits,
            compression_ratio: compression_ratio(original_size_bits, compressed_size_bits),
        }
    }
}

/// Space saved as a percentage; `None` when there is nothing to compare.
pub fn compression_ratio(original_size_bits: u64, compressed_size_bits: u64) -> Option<f64> {
    if original_size_bits == 0 {
        return None;
    }
    Some((1.0 - compressed_size_bits as f64 / original_size_bits as f64) * 100.0)
}

pub fn encode(text: &str, root: &HuffmanNode) -> Result<EncodedOutput> {
    encode_with(text, &CodeMap::from_tree(root))
}

pub fn encode_with(text: &str, codes: &CodeMap) -> Result<EncodedOutput> {
    let mut bits = BitString::new();
    let mut symbol_count = 0u64;

    for (position, symbol) in text.chars().enumerate() {
        let code = codes
            .get(symbol)
            .ok_or(CodecError::Lookup { symbol, position })?;
        bits.extend_from(code);
        symbol_count += 1;
    }

    Ok(EncodedOutput::new(bits, symbol_count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::frequency::analyze_frequency;
    use crate::engine::huffman::build_tree;

    #[test]
    fn single_symbol_encodes_one_bit_each() {
        let tree = build_tree(&analyze_frequency("AAAA")).unwrap();
        let out = encode("AAAA", &tree).unwrap();
        assert_eq!(out.bits.to_string(), "0000");
        assert_eq!(out.original_size_bits, 32);
        assert_eq!(out.compressed_size_bits, 4);
        assert_eq!(out.compression_ratio, Some(87.5));
    }

    #[test]
    fn unknown_symbol_is_a_lookup_error() {
        let tree = build_tree(&analyze_frequency("ABC")).unwrap();
        let err = encode("ABD", &tree).unwrap_err();
        assert_eq!(err, CodecError::Lookup { symbol: 'D', position: 2 });
        assert_eq!(err.kind(), "LookupError");
    }

    #[test]
    fn empty_text_has_no_ratio() {
        let tree = build_tree(&analyze_frequency("AB")).unwrap();
        let out = encode("", &tree).unwrap();
        assert!(out.bits.is_empty());
        assert_eq!(out.original_size_bits, 0);
        assert_eq!(out.compression_ratio, None);
    }

    #[test]
    fn hello_world_sizes() {
        let text = "HELLO WORLD";
        let tree = build_tree(&analyze_frequency(text)).unwrap();
        let out = encode(text, &tree).unwrap();
        assert_eq!(out.original_size_bits, 88);
        assert_eq!(out.compressed_size_bits, 32);
        assert_eq!(out.compressed_size_bits, out.bits.len() as u64);
    }

    #[test]
    fn json_uses_display_names() {
        let tree = build_tree(&analyze_frequency("AAAA")).unwrap();
        let out = encode("AA", &tree).unwrap();
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["encodedText"], "00");
        assert_eq!(json["originalSize"], 16);
        assert_eq!(json["compressedSize"], 2);
        assert_eq!(json["compressionRatio"], 87.5);
    }
}
