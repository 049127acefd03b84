//! Symbol catalog and reel strips

use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};

/// Identifier reserved for the bonus symbol
pub const BONUS_SYMBOL_ID: &str = "bonus";

/// Paying ids used to fill generated strips. Reduced set for a higher hit rate.
pub const GENERATED_FILL_IDS: [&str; 3] = ["cherry", "seven", "diamond"];

/// A symbol definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    /// Unique symbol ID (e.g., "cherry", "seven")
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Line pay multiplier (bet × multiplier for a 3-match)
    pub multiplier: f64,
    /// Glyph the UI draws on the panel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glyph: Option<String>,
    /// Glyph color (CSS)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Symbol {
    /// Create a paying symbol
    pub fn paying(id: impl Into<String>, name: impl Into<String>, multiplier: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            multiplier: multiplier.max(0.0),
            glyph: None,
            color: None,
        }
    }

    /// Create the bonus symbol
    pub fn bonus(name: impl Into<String>) -> Self {
        Self::paying(BONUS_SYMBOL_ID, name, 0.0)
    }

    /// Attach glyph and color
    pub fn with_art(mut self, glyph: impl Into<String>, color: impl Into<String>) -> Self {
        self.glyph = Some(glyph.into());
        self.color = Some(color.into());
        self
    }
}

fn default_bonus_id() -> String {
    BONUS_SYMBOL_ID.to_string()
}

/// Symbol catalog
///
/// Immutable after construction. Lookups of ids that are not in the
/// catalog return `None` and evaluate as "no match".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolCatalog {
    pub symbols: Vec<Symbol>,
    /// Id that triggers the bonus instead of paying
    #[serde(default = "default_bonus_id")]
    pub bonus_id: String,
}

impl SymbolCatalog {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self {
            symbols,
            bonus_id: default_bonus_id(),
        }
    }

    /// Classic fruit set
    pub fn classic() -> Self {
        Self::new(vec![
            Symbol::paying("cherry", "Cherry", 2.0).with_art("🍒", "#ff0000"),
            Symbol::paying("lemon", "Lemon", 3.0).with_art("🍋", "#ffff00"),
            Symbol::paying("grape", "Grape", 5.0).with_art("🍇", "#800080"),
            Symbol::paying("bell", "Bell", 10.0).with_art("🔔", "#ffd700"),
            Symbol::paying("diamond", "Diamond", 20.0).with_art("💎", "#00ffff"),
            Symbol::paying("seven", "Seven", 50.0).with_art("7️⃣", "#ff00ff"),
            Symbol::bonus("Star").with_art("⭐", "#ffa500"),
        ])
    }

    /// Import catalog from JSON
    pub fn from_json(json: &str) -> SlotResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| SlotError::Config(format!("Invalid symbol catalog: {}", e)))
    }

    /// Get symbol by ID
    pub fn get(&self, id: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.id == id)
    }

    /// Line multiplier for an id, `None` if unknown
    pub fn multiplier(&self, id: &str) -> Option<f64> {
        self.get(id).map(|s| s.multiplier)
    }

    pub fn is_bonus(&self, id: &str) -> bool {
        id == self.bonus_id
    }

    /// All ids that can pay a line win
    pub fn paying_ids(&self) -> Vec<&str> {
        self.symbols
            .iter()
            .filter(|s| !self.is_bonus(&s.id))
            .map(|s| s.id.as_str())
            .collect()
    }
}

impl Default for SymbolCatalog {
    fn default() -> Self {
        Self::classic()
    }
}

/// The ordered symbols printed around one reel's drum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReelStrip {
    /// Symbol IDs in order
    pub symbols: Vec<String>,
    /// Reel index
    pub reel_index: usize,
}

impl ReelStrip {
    /// Create a new reel strip
    pub fn new(reel_index: usize, symbols: Vec<String>) -> Self {
        Self {
            symbols,
            reel_index,
        }
    }

    /// Get symbol at position (wraps around). `None` for an empty strip.
    pub fn symbol_at(&self, position: usize) -> Option<&str> {
        if self.symbols.is_empty() {
            return None;
        }
        Some(self.symbols[position % self.symbols.len()].as_str())
    }

    /// Get total strip length
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Tolerated irregularity in a loaded strip table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StripIssue {
    /// Strip has no symbols; every row on this reel is a no-match
    EmptyStrip { reel: usize },
    /// Strip shorter than the nominal length
    ShortStrip { reel: usize, len: usize, expected: usize },
    /// Strip longer than the nominal length
    LongStrip { reel: usize, len: usize, expected: usize },
    /// Id not present in the catalog
    UnknownSymbol { reel: usize, position: usize, id: String },
}

/// On-disk layout: `{ "reels": [[id, ...], ...] }`
#[derive(Debug, Serialize, Deserialize)]
struct StripTableDocument {
    reels: Vec<Vec<String>>,
}

/// One strip per reel, loaded once and shared read-only
#[derive(Debug, Clone, PartialEq)]
pub struct ReelStripTable {
    strips: Vec<ReelStrip>,
}

impl ReelStripTable {
    /// Build from raw reel lists
    pub fn from_reels(reels: Vec<Vec<String>>) -> SlotResult<Self> {
        if reels.is_empty() {
            return Err(SlotError::MalformedStripData(
                "strip table has no reels".into(),
            ));
        }
        let strips = reels
            .into_iter()
            .enumerate()
            .map(|(i, symbols)| ReelStrip::new(i, symbols))
            .collect();
        Ok(Self { strips })
    }

    /// Parse the JSON strip table
    pub fn from_json(json: &str) -> SlotResult<Self> {
        let doc: StripTableDocument = serde_json::from_str(json)
            .map_err(|e| SlotError::MalformedStripData(format!("JSON parse error: {}", e)))?;
        Self::from_reels(doc.reels)
    }

    /// Parse the YAML strip table
    pub fn from_yaml(yaml: &str) -> SlotResult<Self> {
        let doc: StripTableDocument = serde_yml::from_str(yaml)
            .map_err(|e| SlotError::MalformedStripData(format!("YAML parse error: {}", e)))?;
        Self::from_reels(doc.reels)
    }

    /// Export in the same layout `from_json` reads
    pub fn to_json(&self) -> String {
        let doc = StripTableDocument {
            reels: self.strips.iter().map(|s| s.symbols.clone()).collect(),
        };
        serde_json::to_string_pretty(&doc).unwrap_or_default()
    }

    /// Generate a shuffled table
    ///
    /// Each strip gets `bonus_per_reel` bonus symbols, the rest drawn
    /// uniformly from `fill_ids`, then shuffled. Ids in `fill_ids` that the
    /// catalog does not pay are skipped; an empty pool falls back to every
    /// paying symbol.
    pub fn generate<R: Rng + ?Sized>(
        catalog: &SymbolCatalog,
        fill_ids: &[&str],
        reel_count: usize,
        strip_length: usize,
        bonus_per_reel: usize,
        rng: &mut R,
    ) -> Self {
        let mut paying: Vec<&str> = fill_ids
            .iter()
            .copied()
            .filter(|id| catalog.get(id).is_some() && !catalog.is_bonus(id))
            .collect();
        if paying.len() != fill_ids.len() {
            log::warn!(
                "strip generation: {} fill ids not paid by the catalog",
                fill_ids.len() - paying.len()
            );
        }
        if paying.is_empty() {
            paying = catalog.paying_ids();
        }
        let bonus_count = bonus_per_reel.min(strip_length);

        let strips = (0..reel_count.max(1))
            .map(|reel_idx| {
                let mut symbols = Vec::with_capacity(strip_length);
                symbols.extend(std::iter::repeat_n(catalog.bonus_id.clone(), bonus_count));

                for _ in bonus_count..strip_length {
                    let id = if paying.is_empty() {
                        catalog.bonus_id.as_str()
                    } else {
                        paying[rng.random_range(0..paying.len())]
                    };
                    symbols.push(id.to_string());
                }

                symbols.shuffle(&mut *rng);
                ReelStrip::new(reel_idx, symbols)
            })
            .collect();

        Self { strips }
    }

    pub fn reel_count(&self) -> usize {
        self.strips.len()
    }

    pub fn strip(&self, reel: usize) -> Option<&ReelStrip> {
        self.strips.get(reel)
    }

    pub fn strips(&self) -> &[ReelStrip] {
        &self.strips
    }

    /// Report irregularities without rejecting the table
    pub fn validate(&self, catalog: &SymbolCatalog, symbols_per_reel: usize) -> Vec<StripIssue> {
        let mut issues = Vec::new();

        for strip in &self.strips {
            let reel = strip.reel_index;
            let len = strip.len();

            if len == 0 {
                issues.push(StripIssue::EmptyStrip { reel });
                continue;
            }
            if len < symbols_per_reel {
                issues.push(StripIssue::ShortStrip {
                    reel,
                    len,
                    expected: symbols_per_reel,
                });
            } else if len > symbols_per_reel {
                issues.push(StripIssue::LongStrip {
                    reel,
                    len,
                    expected: symbols_per_reel,
                });
            }

            for (position, id) in strip.symbols.iter().enumerate() {
                if catalog.get(id).is_none() && !catalog.is_bonus(id) {
                    issues.push(StripIssue::UnknownSymbol {
                        reel,
                        position,
                        id: id.clone(),
                    });
                }
            }
        }

        for issue in &issues {
            log::warn!("strip table: {:?}", issue);
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_classic_catalog() {
        let catalog = SymbolCatalog::classic();
        assert_eq!(catalog.multiplier("cherry"), Some(2.0));
        assert_eq!(catalog.multiplier("seven"), Some(50.0));
        assert_eq!(catalog.multiplier("banana"), None);
        assert!(catalog.is_bonus("bonus"));
        assert!(!catalog.paying_ids().contains(&"bonus"));
        assert_eq!(catalog.paying_ids().len(), 6);
    }

    #[test]
    fn test_reel_strip_wrap() {
        let strip = ReelStrip::new(0, ids(&["a", "b", "c", "d", "e"]));
        assert_eq!(strip.symbol_at(0), Some("a"));
        assert_eq!(strip.symbol_at(5), Some("a")); // Wraps
        assert_eq!(strip.symbol_at(7), Some("c")); // Wraps
        assert_eq!(ReelStrip::new(1, Vec::new()).symbol_at(3), None);
    }

    #[test]
    fn test_parse_json_table() {
        let table = ReelStripTable::from_json(r#"{ "reels": [["cherry", "bonus"], ["seven"]] }"#)
            .unwrap();
        assert_eq!(table.reel_count(), 2);
        assert_eq!(table.strip(0).unwrap().symbol_at(1), Some("bonus"));
        assert_eq!(table.strip(1).unwrap().symbol_at(9), Some("seven"));
    }

    #[test]
    fn test_parse_yaml_table() {
        let yaml = "reels:\n  - [cherry, lemon]\n  - [grape]\n";
        let table = ReelStripTable::from_yaml(yaml).unwrap();
        assert_eq!(table.reel_count(), 2);
        assert_eq!(table.strip(0).unwrap().len(), 2);
    }

    #[test]
    fn test_malformed_table() {
        assert!(matches!(
            ReelStripTable::from_json(r#"{ "strips": [] }"#),
            Err(SlotError::MalformedStripData(_))
        ));
        assert!(matches!(
            ReelStripTable::from_json(r#"{ "reels": [] }"#),
            Err(SlotError::MalformedStripData(_))
        ));
    }

    #[test]
    fn test_validate_reports_issues() {
        let catalog = SymbolCatalog::classic();
        let table = ReelStripTable::from_reels(vec![
            ids(&["cherry", "lemon", "grape"]),
            ids(&["cherry", "mystery", "grape"]),
            Vec::new(),
            ids(&["cherry"]),
            ids(&["cherry", "lemon", "grape", "bell"]),
        ])
        .unwrap();

        let issues = table.validate(&catalog, 3);
        assert!(issues.contains(&StripIssue::UnknownSymbol {
            reel: 1,
            position: 1,
            id: "mystery".into()
        }));
        assert!(issues.contains(&StripIssue::EmptyStrip { reel: 2 }));
        assert!(issues.contains(&StripIssue::ShortStrip {
            reel: 3,
            len: 1,
            expected: 3
        }));
        assert!(issues.contains(&StripIssue::LongStrip {
            reel: 4,
            len: 4,
            expected: 3
        }));
        assert_eq!(issues.len(), 4);
    }

    #[test]
    fn test_generate_places_bonus_symbols() {
        let catalog = SymbolCatalog::classic();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let table =
            ReelStripTable::generate(&catalog, &GENERATED_FILL_IDS, 5, 50, 5, &mut rng);

        assert_eq!(table.reel_count(), 5);
        for strip in table.strips() {
            assert_eq!(strip.len(), 50);
            let bonus = strip.symbols.iter().filter(|s| catalog.is_bonus(s)).count();
            assert_eq!(bonus, 5);
            assert!(strip.symbols.iter().all(|s| catalog.get(s).is_some()));
        }
        assert!(table.validate(&catalog, 50).is_empty());
    }

    #[test]
    fn test_generate_is_reproducible_for_seed() {
        let catalog = SymbolCatalog::classic();
        let pool = catalog.paying_ids();
        let a = ReelStripTable::generate(&catalog, &pool, 3, 20, 2, &mut ChaCha8Rng::seed_from_u64(99));
        let b = ReelStripTable::generate(&catalog, &pool, 3, 20, 2, &mut ChaCha8Rng::seed_from_u64(99));
        assert_eq!(a, b);
        assert_eq!(ReelStripTable::from_json(&a.to_json()).unwrap(), a);
    }

    #[test]
    fn test_generate_fills_only_from_pool() {
        let catalog = SymbolCatalog::classic();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let table =
            ReelStripTable::generate(&catalog, &GENERATED_FILL_IDS, 5, 50, 5, &mut rng);

        let mut seen: Vec<&str> = table
            .strips()
            .iter()
            .flat_map(|s| s.symbols.iter().map(String::as_str))
            .collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen, vec!["bonus", "cherry", "diamond", "seven"]);
    }

    #[test]
    fn test_generate_skips_unpaid_pool_ids() {
        let catalog = SymbolCatalog::classic();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let table = ReelStripTable::generate(&catalog, &["bell", "banana", "bonus"], 2, 30, 0, &mut rng);
        assert!(table.strips().iter().all(|s| s.symbols.iter().all(|id| id == "bell")));

        let table = ReelStripTable::generate(&catalog, &[], 2, 30, 0, &mut rng);
        assert!(table.validate(&catalog, 30).is_empty());
    }
}
