use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use crate::engine::error::{CodecError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyEntry {
    pub symbol: char,
    pub count: u64,
}

/// Symbol counts in first-occurrence order.
///
/// The order is the insertion order the tree builder uses to break ties,
/// so two tables with the same counts in a different order can yield
/// different (equally optimal) trees.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FrequencyEntry>", into = "Vec<FrequencyEntry>")]
pub struct FrequencyTable {
    entries: Vec<FrequencyEntry>,
    index: HashMap<char, usize>,
}

impl FrequencyTable {
    pub fn analyze(text: &str) -> Self {
        let mut table = Self::default();
        for symbol in text.chars() {
            match table.index.get(&symbol) {
                Some(&slot) => table.entries[slot].count += 1,
                None => {
                    table.index.insert(symbol, table.entries.len());
                    table.entries.push(FrequencyEntry { symbol, count: 1 });
                }
            }
        }
        table
    }

    /// Build a table from caller-supplied counts, keeping their order.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (char, u64)>,
    {
        let mut table = Self::default();
        for (symbol, count) in entries {
            if count == 0 {
                return Err(CodecError::invalid(format!(
                    "symbol {:?} has non-positive count",
                    symbol
                )));
            }
            if table.index.contains_key(&symbol) {
                return Err(CodecError::invalid(format!(
                    "symbol {:?} listed more than once",
                    symbol
                )));
            }
            table.index.insert(symbol, table.entries.len());
            table.entries.push(FrequencyEntry { symbol, count });
        }
        Ok(table)
    }

    pub fn get(&self, symbol: char) -> Option<u64> {
        self.index.get(&symbol).map(|&slot| self.entries[slot].count)
    }

    pub fn entries(&self) -> &[FrequencyEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &FrequencyEntry> {
        self.entries.iter()
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts, i.e. the length of the analyzed text.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|e| e.count).sum()
    }
}

impl TryFrom<Vec<FrequencyEntry>> for FrequencyTable {
    type Error = CodecError;

    fn try_from(entries: Vec<FrequencyEntry>) -> Result<Self> {
        Self::from_entries(entries.into_iter().map(|e| (e.symbol, e.count)))
    }
}

impl From<FrequencyTable> for Vec<FrequencyEntry> {
    fn from(table: FrequencyTable) -> Self {
        table.entries
    }
}

pub fn analyze_frequency(text: &str) -> FrequencyTable {
    FrequencyTable::analyze(text)
}
