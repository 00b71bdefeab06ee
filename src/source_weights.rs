//! # Source Weights
//!
//! Static per-source multipliers used by balanced ranking. Sources that are
//! not listed get `default_weight` (neutral 1.0), so a new feed needs no code
//! change to join the ranking.
//!
//! - Case-insensitive lookup with normalization of punctuation, dashes, etc.
//!   Labels are normalized once, when the table is built.
//! - Weights are *not* clamped to `[0, 1]`: values above 1.0 boost a source.
//! - Negative or non-finite weights are ignored and fall back to the default.

use serde::{Deserialize, Serialize};
use std::collections::{hash_map::Entry, BTreeMap, HashMap};
use tracing::warn;

/// Label → weight table, built from the `[weights]` config section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "WeightTable")]
pub struct SourceWeights {
    default_weight: f64,
    /// Keyed by normalized label.
    sources: HashMap<String, f64>,
}

/// `[weights]` as written in the config file.
#[derive(Deserialize)]
struct WeightTable {
    #[serde(default = "default_default_weight")]
    default_weight: f64,
    // sorted, so label collisions resolve the same way on every load
    #[serde(default)]
    sources: BTreeMap<String, f64>,
}

impl From<WeightTable> for SourceWeights {
    fn from(t: WeightTable) -> Self {
        Self::new(t.default_weight, t.sources)
    }
}

fn default_default_weight() -> f64 {
    1.0
}

impl Default for SourceWeights {
    /// Built-in table: Autosport and Motorsport are favoured.
    fn default() -> Self {
        Self::new(
            default_default_weight(),
            [("Autosport", 1.2), ("Motorsport", 1.1)],
        )
    }
}

impl SourceWeights {
    /// When two labels normalize to the same key, the first one wins.
    pub fn new<K: AsRef<str>>(
        default_weight: f64,
        sources: impl IntoIterator<Item = (K, f64)>,
    ) -> Self {
        let mut table = HashMap::new();
        for (label, weight) in sources {
            let label = label.as_ref();
            match table.entry(normalize(label)) {
                Entry::Occupied(_) => warn!(label, "duplicate source weight label ignored"),
                Entry::Vacant(slot) => {
                    slot.insert(weight);
                }
            }
        }
        Self {
            default_weight,
            sources: table,
        }
    }

    /// Weight for a source label.
    pub fn weight_for(&self, source: &str) -> f64 {
        self.sources
            .get(&normalize(source))
            .copied()
            .filter(|w| usable(*w))
            .unwrap_or_else(|| self.fallback())
    }

    fn fallback(&self) -> f64 {
        if usable(self.default_weight) {
            self.default_weight
        } else {
            default_default_weight()
        }
    }
}

fn usable(w: f64) -> bool {
    w.is_finite() && w >= 0.0
}

/// Normalize input string: lowercase, replace punctuation/dashes with spaces,
/// collapse multiple spaces into one.
fn normalize(s: &str) -> String {
    let mut out = s.trim().to_lowercase();

    for ch in ['—', '–', '-', '_', '/', '\\'] {
        out = out.replace(ch, " ");
    }

    out = out.replace(['\n', '\r', '\t', '.', ','], " ");

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
