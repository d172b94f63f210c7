use crate::engine::bits::BitString;
use crate::engine::compressor::{PackedArtifact, PACKED_MAGIC};
use crate::engine::decoder::decode;
use crate::engine::error::{CodecError, Result};
use crate::engine::huffman::build_tree;
use crate::utils::crc::verify_crc32;

/// Read `bit_len` bits MSB-first out of `bytes`.
pub fn unpack_bits(bytes: &[u8], bit_len: u64) -> Result<BitString> {
    let available = bytes.len() as u64 * 8;
    if bit_len > available || available - bit_len >= 8 {
        return Err(CodecError::malformed(
            0,
            format!("{} bits do not fit a {}-byte payload", bit_len, bytes.len()),
        ));
    }

    let mut bits = Vec::with_capacity(bit_len as usize);
    for i in 0..bit_len as usize {
        let byte = bytes[i / 8];
        bits.push((byte >> (7 - i % 8)) & 1 == 1);
    }
    Ok(BitString::from(bits))
}

impl PackedArtifact {
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < PACKED_MAGIC.len() || data[..PACKED_MAGIC.len()] != PACKED_MAGIC {
            return Err(CodecError::malformed(0, "missing packed artifact magic"));
        }
        bincode::deserialize(&data[PACKED_MAGIC.len()..])
            .map_err(|e| CodecError::malformed(0, format!("unreadable artifact: {}", e)))
    }

    /// Verify the checksum, rebuild the tree from the table, and decode.
    pub fn unpack(self) -> Result<String> {
        if !verify_crc32(&self.payload, self.checksum) {
            return Err(CodecError::malformed(0, "payload checksum mismatch"));
        }
        let bits = unpack_bits(&self.payload, self.bit_len)?;
        let tree = build_tree(&self.frequencies)
            .map_err(|e| CodecError::malformed(0, format!("unusable frequency table: {}", e)))?;
        decode(&tree, &bits)
    }
}

pub fn decompress(data: &[u8]) -> Result<String> {
    PackedArtifact::from_bytes(data)?.unpack()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::compressor::compress;
    use crate::engine::frequency::FrequencyTable;

    #[test]
    fn packed_text_comes_back() {
        for text in ["HELLO WORLD", "AAAA", "ab", "Zürich, Zürich!"] {
            let bytes = compress(text).unwrap().to_bytes().unwrap();
            assert_eq!(decompress(&bytes).unwrap(), text);
        }
    }

    #[test]
    fn corrupted_payload_is_detected() {
        let mut artifact = compress("HELLO WORLD").unwrap();
        artifact.payload[0] ^= 0x80;
        let err = decompress(&artifact.to_bytes().unwrap()).unwrap_err();
        assert!(matches!(err, CodecError::MalformedStream { .. }));
    }

    #[test]
    fn bit_length_must_fit_payload() {
        assert!(unpack_bits(&[0xff], 9).is_err());
        assert!(unpack_bits(&[0xff, 0x00], 8).is_err());
        assert_eq!(unpack_bits(&[0b1010_0000], 3).unwrap().to_string(), "101");
    }

    #[test]
    fn artifact_carries_table_in_original_order() {
        let artifact = compress("ABCCDD").unwrap();
        let back = PackedArtifact::from_bytes(&artifact.to_bytes().unwrap()).unwrap();
        let order: Vec<char> = back.frequencies.iter().map(|e| e.symbol).collect();
        assert_eq!(order, vec!['A', 'B', 'C', 'D']);
        assert_eq!(back.unpack().unwrap(), "ABCCDD");
    }

    #[test]
    fn deeply_nested_bytes_are_malformed() {
        // A tree record nested 200k levels deep: label "A", frequency 1,
        // empty code, then a present `children` tag.
        let mut level = Vec::new();
        level.extend_from_slice(&1u64.to_le_bytes());
        level.push(b'A');
        level.extend_from_slice(&1u64.to_le_bytes());
        level.extend_from_slice(&0u64.to_le_bytes());
        level.push(1);

        let mut data = PACKED_MAGIC.to_vec();
        for _ in 0..200_000 {
            data.extend_from_slice(&level);
        }
        let err = decompress(&data).unwrap_err();
        assert_eq!(err.kind(), "MalformedStream");
    }

    #[test]
    fn empty_table_is_malformed() {
        let artifact = PackedArtifact {
            frequencies: FrequencyTable::default(),
            bit_len: 0,
            checksum: crate::utils::crc::crc32(&[]),
            payload: Vec::new(),
        };
        let err = decompress(&artifact.to_bytes().unwrap()).unwrap_err();
        assert!(matches!(err, CodecError::MalformedStream { .. }));
    }

    #[test]
    fn rejects_foreign_bytes() {
        assert!(decompress(b"nope").is_err());
        assert!(decompress(b"HUFP\x01").is_err());
    }
}
