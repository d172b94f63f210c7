//! JSON reading for bodies that carry wire trees.
//!
//! serde_json stops at 128 levels, which is about 63 tree levels once each
//! node spends an object and a `children` array. A Huffman tree over `u64`
//! frequencies can be deeper than that, so the built-in limit is replaced by
//! an iterative nesting scan sized for the deepest legal tree.

use serde::de::{DeserializeOwned, Error as _};

/// Deepest tree `build_tree` can produce. A leaf at depth `d` needs a total
/// frequency of at least F(d + 2), and F(94) no longer fits in a `u64`.
pub const MAX_TREE_DEPTH: usize = 91;

/// Object and array per tree level, plus room for the enclosing body.
pub const MAX_JSON_NESTING: usize = 2 * (MAX_TREE_DEPTH + 1) + 8;

/// Deepest `{`/`[` nesting in `bytes`, ignoring brackets inside strings.
pub fn nesting_depth(bytes: &[u8]) -> usize {
    let mut depth = 0usize;
    let mut max = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for &b in bytes {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                max = max.max(depth);
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    max
}

/// Parse `bytes` as `T`, allowing nesting up to [`MAX_JSON_NESTING`].
pub fn from_slice<T: DeserializeOwned>(bytes: &[u8]) -> serde_json::Result<T> {
    let depth = nesting_depth(bytes);
    if depth > MAX_JSON_NESTING {
        return Err(serde_json::Error::custom(format!(
            "nesting depth {} exceeds limit {}",
            depth, MAX_JSON_NESTING
        )));
    }

    let mut de = serde_json::Deserializer::from_slice(bytes);
    de.disable_recursion_limit();
    let value = T::deserialize(&mut de)?;
    de.end()?;
    Ok(value)
}
