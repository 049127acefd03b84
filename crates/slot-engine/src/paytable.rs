//! Paytable and win calculation
//!
//! Rows are read straight off the strips: row offset 0 is the payline, and
//! offset `k` is the symbol `k` positions further along each strip. Only a
//! left-anchored run counts: the run starts at reel 0 and stops at the first
//! reel that differs.

use serde::{Deserialize, Serialize};

use crate::symbols::{ReelStripTable, SymbolCatalog};
use crate::Credits;

/// Shortest run that pays
pub const MIN_MATCH: usize = 3;

/// A win on a single row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowWin {
    /// Row offset from the payline
    pub row_offset: usize,
    /// Winning symbol ID
    pub symbol_id: String,
    /// Number of matching symbols from reel 0
    pub match_count: usize,
    /// Win amount
    pub amount: Credits,
}

/// Result of evaluating every row as a payline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    /// Sum of all row wins
    pub total: Credits,
    /// Winning rows in ascending offset order
    pub row_wins: Vec<RowWin>,
}

impl SweepResult {
    /// Offsets with a positive win
    pub fn winning_offsets(&self) -> Vec<usize> {
        self.row_wins.iter().map(|w| w.row_offset).collect()
    }
}

/// Presentation tier of a settled win
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WinTier {
    None,
    Normal,
    Big,
}

impl WinTier {
    /// `Big` when `win >= big_win_ratio × bet`
    pub fn classify(win: Credits, bet: u64, big_win_ratio: f64) -> Self {
        if win <= 0.0 {
            Self::None
        } else if win >= bet as f64 * big_win_ratio {
            Self::Big
        } else {
            Self::Normal
        }
    }
}

/// Symbols on one row; `None` where a reel has no strip data
pub fn row_symbols<'a>(
    targets: &[usize],
    strips: &'a ReelStripTable,
    row_offset: usize,
) -> Vec<Option<&'a str>> {
    targets
        .iter()
        .enumerate()
        .map(|(reel, &target)| {
            strips
                .strip(reel)
                .and_then(|strip| strip.symbol_at(target.wrapping_add(row_offset)))
        })
        .collect()
}

/// Id and length of the run starting at reel 0
///
/// A missing cell never matches anything, itself included.
pub fn leading_run<'a>(cells: &[Option<&'a str>]) -> Option<(&'a str, usize)> {
    let first = (*cells.first()?)?;
    let run = cells
        .iter()
        .take_while(|cell| **cell == Some(first))
        .count();
    Some((first, run))
}

/// Win evaluator over a symbol catalog
#[derive(Debug, Clone)]
pub struct PayoutEvaluator {
    catalog: SymbolCatalog,
}

impl PayoutEvaluator {
    pub fn new(catalog: SymbolCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &SymbolCatalog {
        &self.catalog
    }

    /// Line win for a row of ids
    ///
    /// `bet × multiplier × (run − 2)` for a run of 3 or more; the bonus
    /// symbol and unknown ids never pay.
    pub fn line_win<S: AsRef<str>>(&self, ids: &[S], bet: u64) -> Credits {
        let cells: Vec<Option<&str>> = ids.iter().map(|id| Some(id.as_ref())).collect();
        self.row_win(&cells, bet)
    }

    /// Line win for a row read from the strips
    pub fn row_win(&self, cells: &[Option<&str>], bet: u64) -> Credits {
        self.evaluate_row(cells, 0, bet)
            .map(|w| w.amount)
            .unwrap_or(0.0)
    }

    /// Evaluate a row, `None` if it does not pay
    pub fn evaluate_row(&self, cells: &[Option<&str>], row_offset: usize, bet: u64) -> Option<RowWin> {
        let (symbol_id, run) = leading_run(cells)?;

        // Minimum 3 for a win
        if run < MIN_MATCH || self.catalog.is_bonus(symbol_id) {
            return None;
        }

        let multiplier = self.catalog.multiplier(symbol_id)?;
        let amount = bet as f64 * multiplier * (run - 2) as f64;
        if amount <= 0.0 {
            return None;
        }

        Some(RowWin {
            row_offset,
            symbol_id: symbol_id.to_string(),
            match_count: run,
            amount,
        })
    }

    /// Evaluate every row offset in `[0, symbols_per_reel)` as a payline
    pub fn bonus_sweep_win(
        &self,
        targets: &[usize],
        strips: &ReelStripTable,
        symbols_per_reel: usize,
        bet: u64,
    ) -> SweepResult {
        let row_wins: Vec<RowWin> = (0..symbols_per_reel)
            .filter_map(|offset| {
                let cells = row_symbols(targets, strips, offset);
                self.evaluate_row(&cells, offset, bet)
            })
            .collect();

        SweepResult {
            total: row_wins.iter().map(|w| w.amount).sum(),
            row_wins,
        }
    }

    /// True if any payline cell shows the bonus symbol
    pub fn bonus_triggered(&self, cells: &[Option<&str>]) -> bool {
        cells
            .iter()
            .flatten()
            .any(|id| self.catalog.is_bonus(id))
    }
}

impl Default for PayoutEvaluator {
    fn default() -> Self {
        Self::new(SymbolCatalog::classic())
    }
}
