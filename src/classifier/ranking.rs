//! Frequency ranking of land-cover codes across the window.
//!
//! Corn variants are folded into the primary corn code, then codes are
//! ordered by descending year count with ties broken by ascending code.

use crate::constants::codes;
use crate::error::Result;
use crate::lookup::CodeLookupTable;
use crate::models::{Category, CodeLookupEntry};
use std::cmp::Ordering;
use std::collections::HashMap;

/// A code and the number of window years it holds the majority
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeCount {
    pub code: i64,
    pub count: usize,
}

/// Fold corn variant codes into the primary corn code
pub fn normalize_code(code: i64) -> i64 {
    if codes::CORN_VARIANTS.contains(&code) {
        codes::CORN
    } else {
        code
    }
}

/// Count descending, then code ascending
fn rank_order(a: &CodeCount, b: &CodeCount) -> Ordering {
    b.count.cmp(&a.count).then(a.code.cmp(&b.code))
}

/// Rank normalised codes by frequency
pub fn rank_codes(window: &[i64]) -> Vec<CodeCount> {
    let mut counts: HashMap<i64, usize> = HashMap::new();
    for &code in window {
        *counts.entry(normalize_code(code)).or_insert(0) += 1;
    }

    let mut ranked: Vec<CodeCount> = counts
        .into_iter()
        .map(|(code, count)| CodeCount { code, count })
        .collect();
    ranked.sort_by(rank_order);
    ranked
}

/// A ranked code resolved against the lookup table
#[derive(Debug, Clone, Copy)]
pub struct RankedCode<'a> {
    pub code: i64,
    pub count: usize,
    pub entry: &'a CodeLookupEntry,
}

impl RankedCode<'_> {
    pub fn name(&self) -> &str {
        &self.entry.prime_name
    }

    pub fn category(&self) -> Category {
        self.entry.category
    }
}

/// Rank codes and resolve each against the lookup table
pub fn rank_and_resolve<'a>(
    window: &[i64],
    lookup: &'a CodeLookupTable,
) -> Result<Vec<RankedCode<'a>>> {
    rank_codes(window)
        .into_iter()
        .map(|CodeCount { code, count }| {
            Ok(RankedCode {
                code,
                count,
                entry: lookup.resolve(Some(code))?,
            })
        })
        .collect()
}
