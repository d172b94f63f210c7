use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Longest accepted input text, in symbols.
    pub max_input_symbols: usize,
    /// Fold input to upper case before analysis, like the visualizer does.
    pub uppercase_input: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_input_symbols: 64 * 1024,
            uppercase_input: true,
        }
    }
}
