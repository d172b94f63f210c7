//! Step-by-step state for one input text: the same chain the visualizer
//! walks through, one stage per `advance()`.

use serde::Serialize;
use tracing::{debug, info};

use crate::engine::config::EngineConfig;
use crate::engine::error::{CodecError, Result};
use crate::engine::hash::text_digest;
use crate::engine::{
    analyze_frequency, assign_codes, build_tree, decode, encode, CodeMap, EncodedOutput,
    FrequencyTable, HuffmanNode,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Step {
    Input,
    Frequencies,
    Tree,
    Encoded,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoundTrip {
    pub original_digest: String,
    pub decoded_digest: String,
    pub matches: bool,
}

#[derive(Debug, Clone)]
pub struct Walkthrough {
    config: EngineConfig,
    text: String,
    step: Step,
    frequencies: Option<FrequencyTable>,
    tree: Option<HuffmanNode>,
    encoded: Option<EncodedOutput>,
}

impl Walkthrough {
    pub fn new(text: &str, config: EngineConfig) -> Result<Self> {
        let mut walk = Self {
            config,
            text: String::new(),
            step: Step::Input,
            frequencies: None,
            tree: None,
            encoded: None,
        };
        walk.set_input(text)?;
        Ok(walk)
    }

    /// Replace the text. Everything derived from the old one is dropped.
    pub fn set_input(&mut self, text: &str) -> Result<()> {
        let symbols = text.chars().count();
        if symbols > self.config.max_input_symbols {
            return Err(CodecError::invalid(format!(
                "input has {} symbols, limit is {}",
                symbols, self.config.max_input_symbols
            )));
        }

        self.text = if self.config.uppercase_input {
            text.to_uppercase()
        } else {
            text.to_string()
        };
        self.reset();
        Ok(())
    }

    pub fn reset(&mut self) {
        self.step = Step::Input;
        self.frequencies = None;
        self.tree = None;
        self.encoded = None;
    }

    /// Compute the next stage. A failed stage leaves the step unchanged.
    pub fn advance(&mut self) -> Result<Step> {
        match self.step {
            Step::Input => {
                let table = analyze_frequency(&self.text);
                debug!("Counted {} distinct symbols", table.len());
                self.frequencies = Some(table);
                self.step = Step::Frequencies;
            }
            Step::Frequencies => {
                let table = self
                    .frequencies
                    .as_ref()
                    .ok_or_else(|| CodecError::invalid("no frequency table"))?;
                let tree = build_tree(table)?;
                debug!("Tree has {} nodes", tree.node_count());
                self.tree = Some(tree);
                self.step = Step::Tree;
            }
            Step::Tree => {
                let tree = self
                    .tree
                    .as_ref()
                    .ok_or_else(|| CodecError::invalid("no tree"))?;
                let encoded = encode(&self.text, tree)?;
                info!(
                    "Encoded {} -> {} bits",
                    encoded.original_size_bits, encoded.compressed_size_bits
                );
                self.encoded = Some(encoded);
                self.step = Step::Encoded;
            }
            Step::Encoded => {}
        }
        Ok(self.step)
    }

    pub fn run_to_end(&mut self) -> Result<&EncodedOutput> {
        while self.step != Step::Encoded {
            self.advance()?;
        }
        self.encoded
            .as_ref()
            .ok_or_else(|| CodecError::invalid("nothing encoded"))
    }

    /// Decode the encoded stage and compare digests with the input.
    pub fn verify(&self) -> Result<RoundTrip> {
        let (Some(tree), Some(encoded)) = (&self.tree, &self.encoded) else {
            return Err(CodecError::invalid("walkthrough has not reached the encoded step"));
        };
        let decoded = decode(tree, &encoded.bits)?;
        let original_digest = text_digest(&self.text);
        let decoded_digest = text_digest(&decoded);
        Ok(RoundTrip {
            matches: original_digest == decoded_digest,
            original_digest,
            decoded_digest,
        })
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn frequencies(&self) -> Option<&FrequencyTable> {
        self.frequencies.as_ref()
    }

    pub fn tree(&self) -> Option<&HuffmanNode> {
        self.tree.as_ref()
    }

    pub fn codes(&self) -> Option<CodeMap> {
        self.tree.as_ref().map(assign_codes)
    }

    pub fn encoded(&self) -> Option<&EncodedOutput> {
        self.encoded.as_ref()
    }
}
