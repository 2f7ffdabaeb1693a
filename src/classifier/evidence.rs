//! Per-field evidence consumed by the decision tables.

use super::ranking::RankedCode;
use super::rotation::SymbolTally;
use crate::models::Category;

/// Everything the decision rules look at for one field
#[derive(Debug, Clone)]
pub struct Evidence<'a> {
    pub rotation: &'a str,
    pub tally: SymbolTally,
    pub ranked: Vec<RankedCode<'a>>,
    /// Window years with coverage below the low-coverage threshold
    pub low_coverage_years: usize,
}

impl<'a> Evidence<'a> {
    pub fn new(rotation: &'a str, ranked: Vec<RankedCode<'a>>, low_coverage_years: usize) -> Self {
        Self {
            rotation,
            tally: SymbolTally::from_rotation(rotation),
            ranked,
            low_coverage_years,
        }
    }

    /// Year count at rank `i` (0 when fewer codes are present)
    pub fn count_at(&self, i: usize) -> usize {
        self.ranked.get(i).map_or(0, |r| r.count)
    }

    pub fn counts(&self) -> Vec<usize> {
        self.ranked.iter().map(|r| r.count).collect()
    }

    pub fn category_at(&self, i: usize) -> Option<Category> {
        self.ranked.get(i).map(|r| r.category())
    }

    pub fn name_at(&self, i: usize) -> &str {
        self.ranked.get(i).map_or("", |r| r.name())
    }

    /// Prime names of the top three ranked codes
    pub fn top_names(&self) -> [&str; 3] {
        [self.name_at(0), self.name_at(1), self.name_at(2)]
    }
}
