use serde::{Deserialize, Serialize};
use crate::engine::bits::BitString;
use crate::engine::encoder::{encode, EncodedOutput};
use crate::engine::error::{CodecError, Result};
use crate::engine::frequency::{analyze_frequency, FrequencyTable};
use crate::engine::huffman::build_tree;
use crate::utils::crc::crc32;

/// Leading bytes of a packed artifact: "HUFP"
pub const PACKED_MAGIC: [u8; 4] = *b"HUFP";

/// Encoded text packed into bytes, with the frequency table the tree is
/// rebuilt from. Tie-breaking is deterministic, so the table in its original
/// order reproduces the exact tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedArtifact {
    pub frequencies: FrequencyTable,
    /// Exact number of meaningful bits in `payload`.
    pub bit_len: u64,
    /// CRC32 of `payload`.
    pub checksum: u32,
    pub payload: Vec<u8>,
}

impl PackedArtifact {
    pub fn new(frequencies: &FrequencyTable, encoded: &EncodedOutput) -> Self {
        let payload = pack_bits(&encoded.bits);
        Self {
            frequencies: frequencies.clone(),
            bit_len: encoded.bits.len() as u64,
            checksum: crc32(&payload),
            payload,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let body = bincode::serialize(self)
            .map_err(|e| CodecError::invalid(format!("cannot serialize artifact: {}", e)))?;
        let mut out = Vec::with_capacity(PACKED_MAGIC.len() + body.len());
        out.extend_from_slice(&PACKED_MAGIC);
        out.extend(body);
        Ok(out)
    }
}

/// Pack bits MSB-first; the last byte is padded with zeros.
pub fn pack_bits(bits: &BitString) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(bits.len().div_ceil(8));
    let mut current_byte = 0u8;
    let mut bit_count = 0;

    for &bit in bits.as_slice() {
        if bit {
            current_byte |= 1 << (7 - bit_count);
        }
        bit_count += 1;

        if bit_count == 8 {
            bytes.push(current_byte);
            current_byte = 0;
            bit_count = 0;
        }
    }

    if bit_count > 0 {
        bytes.push(current_byte);
    }

    bytes
}

/// Run the whole pipeline over `text` and pack the result.
pub fn compress(text: &str) -> Result<PackedArtifact> {
    let frequencies = analyze_frequency(text);
    let tree = build_tree(&frequencies)?;
    let encoded = encode(text, &tree)?;
    Ok(PackedArtifact::new(&frequencies, &encoded))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_msb_first_with_zero_padding() {
        let bits: BitString = "1011000011".parse().unwrap();
        assert_eq!(pack_bits(&bits), vec![0b1011_0000, 0b1100_0000]);
        assert!(pack_bits(&BitString::new()).is_empty());
    }

    #[test]
    fn artifact_records_exact_bit_length() {
        let artifact = compress("HELLO WORLD").unwrap();
        assert_eq!(artifact.bit_len, 32);
        assert_eq!(artifact.payload.len(), 4);
        assert_eq!(artifact.checksum, crc32(&artifact.payload));
        assert_eq!(artifact.frequencies.total(), 11);
        assert_eq!(artifact.frequencies.get('L'), Some(3));

        let bytes = artifact.to_bytes().unwrap();
        assert_eq!(&bytes[..4], b"HUFP");
    }

    #[test]
    fn empty_text_cannot_be_packed() {
        assert!(matches!(compress(""), Err(CodecError::InvalidInput(_))));
    }
}
