//! Record shape of a tree as exchanged with the UI:
//! `{ symbolLabel, frequency, code, children: [left, right] | null }`.

use std::collections::HashSet;
use serde::{Deserialize, Serialize};
use crate::engine::error::{CodecError, Result};
use crate::engine::huffman::HuffmanNode;
use crate::utils::json;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireNode {
    pub symbol_label: String,
    pub frequency: u64,
    /// Path from the root. Informational; ignored when rebuilding.
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub children: Option<Box<[WireNode; 2]>>,
}

impl WireNode {
    pub fn from_tree(root: &HuffmanNode) -> Self {
        if root.is_leaf() {
            return Self::build(root, "0".to_string());
        }
        Self::build(root, String::new())
    }

    fn build(node: &HuffmanNode, code: String) -> Self {
        let children = node.children().map(|(left, right)| {
            Box::new([
                Self::build(left, format!("{}0", code)),
                Self::build(right, format!("{}1", code)),
            ])
        });
        Self {
            symbol_label: node.label(),
            frequency: node.frequency(),
            code,
            children,
        }
    }

    /// Read a tree from JSON, either the bare record or an object that holds
    /// it under `tree` (the shape `tree --json` prints).
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let document: TreeDocument = json::from_slice(bytes)
            .map_err(|e| CodecError::invalid(format!("unreadable tree: {}", e)))?;
        Ok(match document {
            TreeDocument::Wrapped { tree } => tree,
            TreeDocument::Bare(tree) => tree,
        })
    }

    /// Validate and rebuild the tree this record describes.
    pub fn into_tree(self) -> Result<HuffmanNode> {
        let mut seen = HashSet::new();
        self.rebuild(&mut seen)
    }

    fn rebuild(self, seen: &mut HashSet<char>) -> Result<HuffmanNode> {
        if self.frequency == 0 {
            return Err(CodecError::invalid(format!(
                "node {:?} has non-positive frequency",
                self.symbol_label
            )));
        }

        let Some(children) = self.children else {
            let mut chars = self.symbol_label.chars();
            let (Some(symbol), None) = (chars.next(), chars.next()) else {
                return Err(CodecError::invalid(format!(
                    "leaf label {:?} is not a single symbol",
                    self.symbol_label
                )));
            };
            if !seen.insert(symbol) {
                return Err(CodecError::invalid(format!(
                    "symbol {:?} appears on more than one leaf",
                    symbol
                )));
            }
            return Ok(HuffmanNode::leaf(symbol, self.frequency));
        };

        let [left, right] = *children;
        let left = left.rebuild(seen)?;
        let right = right.rebuild(seen)?;

        let sum = left.frequency().checked_add(right.frequency());
        if sum != Some(self.frequency) {
            return Err(CodecError::invalid(format!(
                "node {:?} has frequency {} but its children sum to {}",
                self.symbol_label,
                self.frequency,
                left.frequency() as u128 + right.frequency() as u128
            )));
        }

        let mut label = left.label();
        label.push_str(&right.label());
        if label != self.symbol_label {
            return Err(CodecError::invalid(format!(
                "node label {:?} does not match its children ({:?})",
                self.symbol_label, label
            )));
        }

        Ok(HuffmanNode::Internal {
            label,
            frequency: self.frequency,
            left: Box::new(left),
            right: Box::new(right),
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TreeDocument {
    Wrapped { tree: WireNode },
    Bare(WireNode),
}

impl From<&HuffmanNode> for WireNode {
    fn from(root: &HuffmanNode) -> Self {
        Self::from_tree(root)
    }
}

impl TryFrom<WireNode> for HuffmanNode {
    type Error = CodecError;

    fn try_from(node: WireNode) -> Result<Self> {
        node.into_tree()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::frequency::{analyze_frequency, FrequencyTable};
    use crate::engine::huffman::{assign_codes, build_tree};

    fn fibonacci_table(n: usize) -> FrequencyTable {
        let mut counts = vec![1u64, 1];
        while counts.len() < n {
            counts.push(counts[counts.len() - 1] + counts[counts.len() - 2]);
        }
        let entries = counts
            .into_iter()
            .take(n)
            .enumerate()
            .map(|(i, count)| (char::from_u32(0x100 + i as u32).unwrap(), count));
        FrequencyTable::from_entries(entries).unwrap()
    }

    #[test]
    fn json_shape_matches_ui_records() {
        let tree = build_tree(&analyze_frequency("ABC")).unwrap();
        let json = serde_json::to_value(WireNode::from_tree(&tree)).unwrap();

        assert_eq!(json["symbolLabel"], "CAB");
        assert_eq!(json["frequency"], 3);
        assert_eq!(json["code"], "");
        assert_eq!(json["children"][0]["symbolLabel"], "C");
        assert_eq!(json["children"][0]["code"], "0");
        assert!(json["children"][0]["children"].is_null());
        assert_eq!(json["children"][1]["children"][1]["code"], "11");
    }

    #[test]
    fn lone_leaf_carries_code_zero() {
        let tree = build_tree(&analyze_frequency("AAAA")).unwrap();
        let wire = WireNode::from_tree(&tree);
        assert_eq!(wire.code, "0");
        assert!(wire.children.is_none());
        assert_eq!(wire.into_tree().unwrap(), tree);
    }

    #[test]
    fn survives_json_round_trip() {
        let tree = build_tree(&analyze_frequency("HELLO WORLD")).unwrap();
        let json = serde_json::to_string(&WireNode::from_tree(&tree)).unwrap();
        let back: WireNode = serde_json::from_str(&json).unwrap();
        assert_eq!(HuffmanNode::try_from(back).unwrap(), tree);
    }

    #[test]
    fn deep_tree_survives_json_round_trip() {
        let tree = build_tree(&fibonacci_table(70)).unwrap();
        assert_eq!(tree.depth(), 69);

        let json = serde_json::to_vec(&WireNode::from_tree(&tree)).unwrap();
        let back = WireNode::from_json(&json).unwrap();
        assert_eq!(back.into_tree().unwrap(), tree);
    }

    #[test]
    fn deepest_buildable_tree_is_readable() {
        // 91 Fibonacci counts still sum below u64::MAX; 92 do not.
        assert!(matches!(build_tree(&fibonacci_table(92)), Err(CodecError::InvalidInput(_))));
        let tree = build_tree(&fibonacci_table(91)).unwrap();
        assert_eq!(tree.depth(), 90);
        assert!(tree.depth() <= json::MAX_TREE_DEPTH);

        let body = serde_json::to_vec(&serde_json::json!({ "tree": WireNode::from_tree(&tree) })).unwrap();
        assert_eq!(WireNode::from_json(&body).unwrap().into_tree().unwrap(), tree);
    }

    #[test]
    fn reads_wrapped_tree_output() {
        let tree = build_tree(&analyze_frequency("ABRACADABRA")).unwrap();
        let printed = serde_json::json!({
            "tree": WireNode::from_tree(&tree),
            "codes": assign_codes(&tree),
        })
        .to_string();

        let wire = WireNode::from_json(printed.as_bytes()).unwrap();
        assert_eq!(wire.into_tree().unwrap(), tree);

        let bare = serde_json::to_vec(&WireNode::from_tree(&tree)).unwrap();
        assert_eq!(WireNode::from_json(&bare).unwrap().into_tree().unwrap(), tree);

        assert!(matches!(
            WireNode::from_json(br#"{"codes":[]}"#),
            Err(CodecError::InvalidInput(_))
        ));
    }

    #[test]
    fn rejects_inconsistent_frequency() {
        let json = r#"{"symbolLabel":"AB","frequency":5,"code":"","children":[
            {"symbolLabel":"A","frequency":1,"code":"0","children":null},
            {"symbolLabel":"B","frequency":1,"code":"1","children":null}]}"#;
        let wire: WireNode = serde_json::from_str(json).unwrap();
        assert!(matches!(wire.into_tree(), Err(CodecError::InvalidInput(_))));
    }

    #[test]
    fn rejects_bad_leaves() {
        let multi = WireNode {
            symbol_label: "AB".into(),
            frequency: 1,
            code: String::new(),
            children: None,
        };
        assert!(multi.into_tree().is_err());

        let zero = WireNode {
            symbol_label: "A".into(),
            frequency: 0,
            code: String::new(),
            children: None,
        };
        assert!(zero.into_tree().is_err());

        let json = r#"{"symbolLabel":"AA","frequency":2,"children":[
            {"symbolLabel":"A","frequency":1,"children":null},
            {"symbolLabel":"A","frequency":1,"children":null}]}"#;
        let dup: WireNode = serde_json::from_str(json).unwrap();
        assert!(dup.into_tree().is_err());
    }

    #[test]
    fn single_child_is_not_representable() {
        let json = r#"{"symbolLabel":"A","frequency":1,"children":[
            {"symbolLabel":"A","frequency":1,"children":null}]}"#;
        assert!(serde_json::from_str::<WireNode>(json).is_err());
    }
}
