use sha2::{Digest, Sha256};

pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hex digest of a text, used to compare round-tripped output.
pub fn text_digest(text: &str) -> String {
    hex::encode(sha256(text.as_bytes()))
}
