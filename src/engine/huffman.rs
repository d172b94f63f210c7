use std::collections::{BinaryHeap, HashMap};
use std::cmp::Ordering;
use serde::{Serialize, Serializer};
use tracing::debug;
use crate::engine::bits::BitString;
use crate::engine::error::{CodecError, Result};
use crate::engine::frequency::FrequencyTable;

/// Node of a Huffman prefix tree. Internal nodes always have two children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffmanNode {
    Leaf {
        symbol: char,
        frequency: u64,
    },
    Internal {
        /// Concatenated labels of both subtrees, for display only.
        label: String,
        frequency: u64,
        left: Box<HuffmanNode>,
        right: Box<HuffmanNode>,
    },
}

impl HuffmanNode {
    pub fn leaf(symbol: char, frequency: u64) -> Self {
        HuffmanNode::Leaf { symbol, frequency }
    }

    fn merge(left: HuffmanNode, right: HuffmanNode, frequency: u64) -> Self {
        let mut label = left.label();
        label.push_str(&right.label());
        HuffmanNode::Internal {
            label,
            frequency,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn frequency(&self) -> u64 {
        match self {
            HuffmanNode::Leaf { frequency, .. } => *frequency,
            HuffmanNode::Internal { frequency, .. } => *frequency,
        }
    }

    pub fn label(&self) -> String {
        match self {
            HuffmanNode::Leaf { symbol, .. } => symbol.to_string(),
            HuffmanNode::Internal { label, .. } => label.clone(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, HuffmanNode::Leaf { .. })
    }

    pub fn children(&self) -> Option<(&HuffmanNode, &HuffmanNode)> {
        match self {
            HuffmanNode::Leaf { .. } => None,
            HuffmanNode::Internal { left, right, .. } => Some((&**left, &**right)),
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self.children() {
            None => 1,
            Some((left, right)) => left.leaf_count() + right.leaf_count(),
        }
    }

    pub fn internal_count(&self) -> usize {
        match self.children() {
            None => 0,
            Some((left, right)) => 1 + left.internal_count() + right.internal_count(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.leaf_count() + self.internal_count()
    }

    /// Longest root-to-leaf path, in edges.
    pub fn depth(&self) -> usize {
        match self.children() {
            None => 0,
            Some((left, right)) => 1 + left.depth().max(right.depth()),
        }
    }

    /// Leaves left to right as `(symbol, frequency)`.
    pub fn leaves(&self) -> Vec<(char, u64)> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves(&self, out: &mut Vec<(char, u64)>) {
        match self {
            HuffmanNode::Leaf { symbol, frequency } => out.push((*symbol, *frequency)),
            HuffmanNode::Internal { left, right, .. } => {
                left.collect_leaves(out);
                right.collect_leaves(out);
            }
        }
    }
}

/// Working-set entry. Ordered so the max-heap pops the lowest
/// `(frequency, seq)` first; `seq` is insertion order.
struct Pending {
    frequency: u64,
    seq: u64,
    node: HuffmanNode,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.frequency == other.frequency && self.seq == other.seq
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.frequency, other.seq).cmp(&(self.frequency, self.seq)) // Reverse for min-heap
    }
}

/// Build the prefix tree by repeatedly merging the two lightest nodes.
///
/// Ties go to the node inserted first: leaves in table order, then merged
/// nodes in the order they were created. The first node taken becomes the
/// left child.
pub fn build_tree(table: &FrequencyTable) -> Result<HuffmanNode> {
    let mut heap = BinaryHeap::with_capacity(table.len());
    let mut seq = 0u64;

    for entry in table.iter() {
        heap.push(Pending {
            frequency: entry.count,
            seq,
            node: HuffmanNode::leaf(entry.symbol, entry.count),
        });
        seq += 1;
    }

    loop {
        let Some(first) = heap.pop() else {
            return Err(CodecError::invalid(
                "cannot build a tree from an empty frequency table",
            ));
        };
        let Some(second) = heap.pop() else {
            debug!(
                "Built tree: {} leaves, depth {}",
                first.node.leaf_count(),
                first.node.depth()
            );
            return Ok(first.node);
        };

        let frequency = first
            .frequency
            .checked_add(second.frequency)
            .ok_or_else(|| CodecError::invalid("total frequency overflows u64"))?;

        heap.push(Pending {
            frequency,
            seq,
            node: HuffmanNode::merge(first.node, second.node, frequency),
        });
        seq += 1;
    }
}

/// Symbol to code assignment, leaves in left-to-right order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeMap {
    codes: Vec<(char, BitString)>,
    index: HashMap<char, usize>,
}

impl CodeMap {
    pub fn from_tree(root: &HuffmanNode) -> Self {
        let mut codes = Vec::new();

        fn build_codes(node: &HuffmanNode, code: BitString, table: &mut Vec<(char, BitString)>) {
            match node {
                HuffmanNode::Leaf { symbol, .. } => {
                    // A lone root leaf still needs one bit per symbol.
                    let code = if code.is_empty() { BitString::from(vec![false]) } else { code };
                    table.push((*symbol, code));
                }
                HuffmanNode::Internal { left, right, .. } => {
                    build_codes(left, code.with(false), table);
                    build_codes(right, code.with(true), table);
                }
            }
        }

        build_codes(root, BitString::new(), &mut codes);

        let index = codes
            .iter()
            .enumerate()
            .map(|(slot, (symbol, _))| (*symbol, slot))
            .collect();

        Self { codes, index }
    }

    pub fn get(&self, symbol: char) -> Option<&BitString> {
        self.index.get(&symbol).map(|&slot| &self.codes[slot].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &BitString)> {
        self.codes.iter().map(|(symbol, code)| (*symbol, code))
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn is_prefix_free(&self) -> bool {
        self.codes.iter().enumerate().all(|(i, (_, a))| {
            self.codes
                .iter()
                .enumerate()
                .all(|(j, (_, b))| i == j || !b.starts_with(a))
        })
    }

    /// Mean code length weighted by the table's counts.
    pub fn average_length(&self, table: &FrequencyTable) -> f64 {
        let total = table.total();
        if total == 0 {
            return 0.0;
        }
        let weighted: u64 = table
            .iter()
            .filter_map(|e| self.get(e.symbol).map(|code| code.len() as u64 * e.count))
            .sum();
        weighted as f64 / total as f64
    }
}

#[derive(Serialize)]
struct CodeEntry<'a> {
    symbol: char,
    code: &'a BitString,
}

impl Serialize for CodeMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(
            self.codes
                .iter()
                .map(|(symbol, code)| CodeEntry { symbol: *symbol, code }),
        )
    }
}

pub fn assign_codes(root: &HuffmanNode) -> CodeMap {
    CodeMap::from_tree(root)
}
