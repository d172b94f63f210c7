use crate::engine::bits::BitString;
use crate::engine::error::{CodecError, Result};
use crate::engine::huffman::HuffmanNode;

/// Walk the tree bit by bit, emitting a symbol at each leaf.
pub fn decode(root: &HuffmanNode, bits: &BitString) -> Result<String> {
    let (root_left, root_right) = match root {
        HuffmanNode::Leaf { symbol, .. } => return decode_single(*symbol, bits),
        HuffmanNode::Internal { left, right, .. } => (&**left, &**right),
    };

    let mut out = String::new();
    // Children of the node the walk stands on; a leaf resets to the root's.
    let (mut left, mut right) = (root_left, root_right);
    let mut path_start = 0;

    for (position, &bit) in bits.as_slice().iter().enumerate() {
        let next = if bit { right } else { left };
        match next {
            HuffmanNode::Leaf { symbol, .. } => {
                out.push(*symbol);
                (left, right) = (root_left, root_right);
                path_start = position + 1;
            }
            HuffmanNode::Internal { left: l, right: r, .. } => {
                (left, right) = (&**l, &**r);
            }
        }
    }

    if path_start < bits.len() {
        return Err(CodecError::malformed(
            path_start,
            "stream ends in the middle of a code",
        ));
    }

    Ok(out)
}

/// A lone leaf spends one `0` per symbol.
fn decode_single(symbol: char, bits: &BitString) -> Result<String> {
    let mut out = String::with_capacity(bits.len());
    for (position, &bit) in bits.as_slice().iter().enumerate() {
        if bit {
            return Err(CodecError::malformed(
                position,
                "single-symbol stream may only hold 0 bits",
            ));
        }
        out.push(symbol);
    }
    Ok(out)
}
