//! Column-pass strategies and the wisdom table that remembers them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use fftbench_core::{BenchError, Result};

/// Problems at least this large (complex elements) prefer tiling when no
/// measurement is available.
const ESTIMATE_TILED_THRESHOLD: usize = 1 << 22;

/// Current wisdom file format.
const WISDOM_VERSION: u32 = 1;

/// How the column transforms of a row-major matrix are carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnStrategy {
    /// Transpose into scratch, run contiguous batched FFTs, transpose back.
    Transposed,
    /// Gather narrow column tiles into scratch, transform, scatter back.
    Tiled,
}

impl ColumnStrategy {
    /// Every strategy, in measurement order.
    pub const ALL: [ColumnStrategy; 2] = [ColumnStrategy::Transposed, ColumnStrategy::Tiled];

    /// Heuristic choice used by `ESTIMATE` planning.
    pub fn estimate(rows: usize, width: usize) -> Self {
        if rows.saturating_mul(width) >= ESTIMATE_TILED_THRESHOLD {
            ColumnStrategy::Tiled
        } else {
            ColumnStrategy::Transposed
        }
    }
}

impl fmt::Display for ColumnStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnStrategy::Transposed => write!(f, "transposed"),
            ColumnStrategy::Tiled => write!(f, "tiled"),
        }
    }
}

/// Measured strategy choices keyed by column-pass geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyWisdom {
    version: u32,
    entries: BTreeMap<String, ColumnStrategy>,
}

impl Default for StrategyWisdom {
    fn default() -> Self {
        Self {
            version: WISDOM_VERSION,
            entries: BTreeMap::new(),
        }
    }
}

impl StrategyWisdom {
    /// Key for a column pass of `rows`-point FFTs over `width` columns.
    pub fn key(rows: usize, width: usize, inverse: bool, threads: usize) -> String {
        format!(
            "{}x{}:{}:t{}",
            rows,
            width,
            if inverse { "inv" } else { "fwd" },
            threads
        )
    }

    pub fn get(&self, key: &str) -> Option<ColumnStrategy> {
        self.entries.get(key).copied()
    }

    pub fn insert(&mut self, key: String, strategy: ColumnStrategy) {
        self.entries.insert(key, strategy);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merges entries from serialised wisdom; imported entries win.
    pub fn merge_json(&mut self, text: &str) -> Result<()> {
        let other: StrategyWisdom = serde_json::from_str(text)
            .map_err(|e| BenchError::Engine(format!("invalid wisdom: {}", e)))?;
        if other.version != WISDOM_VERSION {
            return Err(BenchError::Engine(format!(
                "wisdom version {} is not supported (expected {})",
                other.version, WISDOM_VERSION
            )));
        }
        self.entries.extend(other.entries);
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| BenchError::Engine(format!("cannot serialise wisdom: {}", e)))
    }
}
