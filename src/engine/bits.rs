use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use crate::engine::error::CodecError;

/// Ordered sequence of bits. Text form is a run of `0` and `1`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BitString {
    bits: Vec<bool>,
}

impl BitString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    pub fn extend_from(&mut self, other: &BitString) {
        self.bits.extend_from_slice(&other.bits);
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    pub fn starts_with(&self, prefix: &BitString) -> bool {
        self.bits.starts_with(&prefix.bits)
    }

    /// Copy with `bit` appended.
    pub fn with(&self, bit: bool) -> BitString {
        let mut next = self.clone();
        next.push(bit);
        next
    }
}

impl From<Vec<bool>> for BitString {
    fn from(bits: Vec<bool>) -> Self {
        Self { bits }
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl FromStr for BitString {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bits = Vec::with_capacity(s.len());
        for (i, c) in s.chars().enumerate() {
            match c {
                '0' => bits.push(false),
                '1' => bits.push(true),
                other => {
                    return Err(CodecError::invalid(format!(
                        "bit string holds {:?} at position {}",
                        other, i
                    )))
                }
            }
        }
        Ok(Self { bits })
    }
}

impl Serialize for BitString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BitString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_prints() {
        let bits: BitString = "01101".parse().unwrap();
        assert_eq!(bits.len(), 5);
        assert_eq!(bits.to_string(), "01101");
        assert_eq!(bits.as_slice()[1], true);
    }

    #[test]
    fn rejects_non_binary_characters() {
        let err = "01x".parse::<BitString>().unwrap_err();
        assert!(matches!(err, CodecError::InvalidInput(_)));
    }

    #[test]
    fn empty_string_is_empty_bits() {
        let bits: BitString = "".parse().unwrap();
        assert!(bits.is_empty());
    }

    #[test]
    fn prefix_check() {
        let a: BitString = "01".parse().unwrap();
        let b: BitString = "011".parse().unwrap();
        assert!(b.starts_with(&a));
        assert!(!a.starts_with(&b));
    }
}
