//! Rotation string encoding and anomaly counts.
//!
//! A rotation string holds one rotation symbol per year of the window.
//! The summary re-encodes it as `<symbol><count>` runs in canonical scan
//! order, e.g. `CCBCCB` becomes `C4B2`.

use crate::constants::{WINDOW_TRANSITIONS, WINDOW_YEARS, symbols};
use crate::error::Result;
use crate::lookup::CodeLookupTable;
use std::collections::HashMap;

/// Occurrence count of each rotation symbol
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTally {
    counts: HashMap<char, usize>,
}

impl SymbolTally {
    pub fn from_rotation(rotation: &str) -> Self {
        let mut counts = HashMap::new();
        for symbol in rotation.chars() {
            *counts.entry(symbol).or_insert(0) += 1;
        }
        Self { counts }
    }

    pub fn count(&self, symbol: char) -> usize {
        self.counts.get(&symbol).copied().unwrap_or(0)
    }

    pub fn corn(&self) -> usize {
        self.count(symbols::CORN)
    }

    pub fn soybeans(&self) -> usize {
        self.count(symbols::SOYBEANS)
    }

    pub fn pasture(&self) -> usize {
        self.count(symbols::PASTURE)
    }

    pub fn forest(&self) -> usize {
        self.count(symbols::FOREST)
    }

    pub fn urban(&self) -> usize {
        self.count(symbols::URBAN)
    }

    pub fn water(&self) -> usize {
        self.count(symbols::WATER)
    }

    pub fn no_data(&self) -> usize {
        self.count(symbols::NO_DATA)
    }

    /// Forest, urban, water and no-data years
    pub fn non_ag(&self) -> usize {
        self.forest() + self.urban() + self.water() + self.no_data()
    }

    /// Corn, soybean and pasture years
    pub fn corn_soy_pasture(&self) -> usize {
        self.corn() + self.soybeans() + self.pasture()
    }
}

/// Build the rotation string from majority codes, oldest year first
///
/// Returns `Ok(None)` when any year has no majority code; partial
/// histories are not classified.
pub fn rotation_string(
    codes: &[Option<i64>],
    lookup: &CodeLookupTable,
) -> Result<Option<String>> {
    if codes.iter().any(Option::is_none) {
        return Ok(None);
    }

    let mut rotation = String::with_capacity(codes.len());
    for code in codes {
        rotation.push(lookup.resolve(*code)?.rotation_symbol);
    }
    Ok(Some(rotation))
}

/// Encode a rotation string as `<symbol><count>` in the given scan order
///
/// Symbols missing from the scan order follow in order of first
/// appearance, so the summary always decodes to the full tally.
pub fn encode_summary(rotation: &str, scan_order: &[char]) -> String {
    let tally = SymbolTally::from_rotation(rotation);
    let mut unlisted: Vec<char> = Vec::new();
    for symbol in rotation.chars() {
        if !scan_order.contains(&symbol) && !unlisted.contains(&symbol) {
            unlisted.push(symbol);
        }
    }

    let mut summary = String::new();
    for &symbol in scan_order.iter().chain(unlisted.iter()) {
        let count = tally.count(symbol);
        if count > 0 {
            summary.push(symbol);
            summary.push_str(&count.to_string());
        }
    }
    summary
}

/// Decode a rotation summary back into `(symbol, count)` pairs
///
/// Returns `None` for text that is not a sequence of symbol-count runs.
pub fn decode_summary(summary: &str) -> Option<Vec<(char, usize)>> {
    let mut pairs = Vec::new();
    let mut chars = summary.chars().peekable();

    while let Some(symbol) = chars.next() {
        if symbol.is_ascii_digit() {
            return None;
        }
        let mut digits = String::new();
        while let Some(d) = chars.peek().filter(|c| c.is_ascii_digit()) {
            digits.push(*d);
            chars.next();
        }
        pairs.push((symbol, digits.parse().ok()?));
    }

    Some(pairs)
}

/// Number of adjacent `CC` pairs in the rotation
pub fn corn_after_corn(rotation: &str) -> usize {
    let symbols: Vec<char> = rotation.chars().collect();
    symbols
        .windows(2)
        .filter(|pair| pair[0] == symbols::CORN && pair[1] == symbols::CORN)
        .count()
}

/// Number of years whose coverage is present and below the threshold
pub fn low_coverage_years(coverage: &[Option<f64>], threshold: f64) -> usize {
    coverage
        .iter()
        .filter(|pct| pct.is_some_and(|p| p < threshold))
        .count()
}

/// `<k>:<n>` count string used by the corn-after-corn and mixed-year fields
pub fn ratio(count: usize, of: usize) -> String {
    format!("{}:{}", count, of)
}

/// Corn-after-corn count string, always over the window's five transitions
pub fn corn_after_corn_ratio(rotation: &str) -> String {
    ratio(corn_after_corn(rotation), WINDOW_TRANSITIONS)
}

/// Low-coverage count string, always over the six window years
pub fn low_coverage_ratio(coverage: &[Option<f64>], threshold: f64) -> String {
    ratio(low_coverage_years(coverage, threshold), WINDOW_YEARS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CANONICAL_SCAN_ORDER;
    use crate::error::LandUseError;
    use crate::models::{Category, CodeLookupEntry};

    fn scan_order() -> Vec<char> {
        CANONICAL_SCAN_ORDER.chars().collect()
    }

    #[test]
    fn test_rotation_string_from_codes() {
        let lookup = CodeLookupTable::builtin();
        let codes = [Some(1), Some(5), Some(12), Some(5), Some(176), Some(0)];
        let rotation = rotation_string(&codes, &lookup).unwrap();
        assert_eq!(rotation.as_deref(), Some("CBCBPX"));
    }

    #[test]
    fn test_rotation_string_incomplete() {
        let lookup = CodeLookupTable::builtin();
        let codes = [Some(1), None, Some(1), Some(1), Some(1), Some(1)];
        assert_eq!(rotation_string(&codes, &lookup).unwrap(), None);
    }

    #[test]
    fn test_rotation_string_unknown_code() {
        let lookup = CodeLookupTable::builtin();
        let codes = [Some(1), Some(1), Some(777), Some(1), Some(1), Some(1)];
        assert!(rotation_string(&codes, &lookup).is_err());
    }

    #[test]
    fn test_summary_uses_scan_order_not_occurrence() {
        assert_eq!(encode_summary("CCBCCB", &scan_order()), "C4B2");
        assert_eq!(encode_summary("BCBCBC", &scan_order()), "C3B3");
        assert_eq!(encode_summary("DDAAAC", &scan_order()), "C1A3D2");
        assert_eq!(encode_summary("XTUFPC", &scan_order()), "C1F1P1T1U1X1");
    }

    #[test]
    fn test_summary_keeps_symbols_outside_scan_order() {
        assert_eq!(encode_summary("CCSCSZ", &scan_order()), "C3S2Z1");

        let decoded = decode_summary(&encode_summary("CSCSCS", &scan_order())).unwrap();
        let total: usize = decoded.iter().map(|(_, n)| n).sum();
        assert_eq!(total, 6);
    }

    #[test]
    fn test_lookup_rejects_symbols_the_summary_cannot_order() {
        let result = CodeLookupTable::new(vec![
            CodeLookupEntry::new(1, 'C', "Corn", Category::Other),
            CodeLookupEntry::new(4, 'S', "Sorghum", Category::Other),
        ]);
        assert!(matches!(result, Err(LandUseError::LookupTable { .. })));
    }

    #[test]
    fn test_decode_summary_matches_tally() {
        let rotation = "DCCBAD";
        let summary = encode_summary(rotation, &scan_order());
        let decoded = decode_summary(&summary).unwrap();
        let tally = SymbolTally::from_rotation(rotation);

        let total: usize = decoded.iter().map(|(_, n)| n).sum();
        assert_eq!(total, rotation.len());
        for (symbol, count) in decoded {
            assert_eq!(tally.count(symbol), count);
        }
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert_eq!(decode_summary("4C"), None);
        assert_eq!(decode_summary("C"), None);
        assert_eq!(decode_summary(""), Some(vec![]));
        assert_eq!(decode_summary("C12"), Some(vec![('C', 12)]));
    }

    #[test]
    fn test_corn_after_corn_counts() {
        assert_eq!(corn_after_corn_ratio("CCCCCC"), "5:5");
        assert_eq!(corn_after_corn_ratio("CCBCCB"), "2:5");
        assert_eq!(corn_after_corn_ratio("CBCBCB"), "0:5");
        assert_eq!(corn_after_corn_ratio("CCCBBB"), "2:5");
    }

    #[test]
    fn test_low_coverage_ignores_nulls() {
        let coverage = [Some(90.0), Some(74.9), None, Some(75.0), Some(10.0), None];
        assert_eq!(low_coverage_years(&coverage, 75.0), 2);
        assert_eq!(low_coverage_ratio(&coverage, 75.0), "2:6");
        assert_eq!(low_coverage_ratio(&[None; 6], 75.0), "0:6");
    }

    #[test]
    fn test_tally_groups() {
        let tally = SymbolTally::from_rotation("CBPFUT");
        assert_eq!(tally.corn_soy_pasture(), 3);
        assert_eq!(tally.non_ag(), 3);
        assert_eq!(tally.no_data(), 0);
        assert_eq!(tally.count('Z'), 0);
    }
}
