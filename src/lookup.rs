//! Land-cover code lookup table.
//!
//! Maps raw land-cover codes to their rotation symbol, prime display name
//! and coarse category. Null, empty and zero codes resolve to a reserved
//! no-data entry; any other unmapped code is an error.

use crate::constants::{CANONICAL_SCAN_ORDER, NO_DATA_NAME, codes, lookup_columns, symbols};
use crate::error::{LandUseError, Result};
use crate::models::{Category, CodeLookupEntry};
use crate::table::{i64_column, read_table, string_column};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Immutable code lookup table, shared read-only across workers
#[derive(Debug, Clone)]
pub struct CodeLookupTable {
    entries: HashMap<i64, CodeLookupEntry>,
    no_data: CodeLookupEntry,
    scan_order: Vec<char>,
}

impl CodeLookupTable {
    /// Build a table from reference entries
    ///
    /// Duplicate codes and symbols outside the canonical scan order are
    /// rejected. Code 0 always resolves to the reserved no-data entry, even
    /// when the reference set lists it.
    pub fn new(entries: impl IntoIterator<Item = CodeLookupEntry>) -> Result<Self> {
        let mut map = HashMap::new();

        for entry in entries {
            if entry.code == codes::NO_DATA {
                debug!("Ignoring reference entry for reserved code 0");
                continue;
            }
            if let Some(existing) = map.insert(entry.code, entry) {
                return Err(LandUseError::LookupTable {
                    path: "<entries>".into(),
                    reason: format!("duplicate code {}", existing.code),
                });
            }
        }

        let table = Self {
            entries: map,
            no_data: Self::no_data_entry(),
            scan_order: CANONICAL_SCAN_ORDER.chars().collect(),
        };
        table.check_scan_order()?;
        Ok(table)
    }

    /// Override the canonical symbol scan order used for rotation summaries
    ///
    /// Every symbol in the table, including the no-data symbol, must appear
    /// in the new order.
    pub fn with_scan_order(mut self, order: &str) -> Result<Self> {
        self.scan_order = order.chars().collect();
        self.check_scan_order()?;
        Ok(self)
    }

    /// A symbol missing from the scan order would vanish from summaries
    fn check_scan_order(&self) -> Result<()> {
        let mut missing: Vec<(i64, char)> = std::iter::once(&self.no_data)
            .chain(self.entries.values())
            .filter(|entry| !self.scan_order.contains(&entry.rotation_symbol))
            .map(|entry| (entry.code, entry.rotation_symbol))
            .collect();

        if missing.is_empty() {
            return Ok(());
        }
        missing.sort_unstable();
        let listed = missing
            .iter()
            .map(|(code, symbol)| format!("{} ({})", symbol, code))
            .collect::<Vec<_>>()
            .join(", ");
        Err(LandUseError::LookupTable {
            path: "<entries>".into(),
            reason: format!(
                "rotation symbols not in scan order '{}': {}",
                self.scan_order.iter().collect::<String>(),
                listed
            ),
        })
    }

    fn no_data_entry() -> CodeLookupEntry {
        CodeLookupEntry::new(
            codes::NO_DATA,
            symbols::NO_DATA,
            NO_DATA_NAME,
            Category::Other,
        )
    }

    /// Resolve a nullable code
    pub fn resolve(&self, code: Option<i64>) -> Result<&CodeLookupEntry> {
        match code {
            None | Some(codes::NO_DATA) => Ok(&self.no_data),
            Some(code) => self
                .entries
                .get(&code)
                .ok_or_else(|| LandUseError::unknown_code(code)),
        }
    }

    /// Resolve a code given as text (`""` and `"None"` mean no data)
    pub fn resolve_text(&self, code: &str) -> Result<&CodeLookupEntry> {
        let trimmed = code.trim();
        if trimmed.is_empty() || trimmed == "None" {
            return Ok(&self.no_data);
        }
        match trimmed.parse::<i64>() {
            Ok(value) => self.resolve(Some(value)),
            Err(_) => Err(LandUseError::unknown_code(trimmed)),
        }
    }

    /// Canonical symbol scan order
    pub fn scan_order(&self) -> &[char] {
        &self.scan_order
    }

    /// Number of reference entries (excluding the reserved no-data entry)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load a reference table from a CSV or Parquet file
    ///
    /// Expects `Value`, `ROTVAL`, `PrimeName` and `OneName` columns.
    /// Rows with a null code are skipped.
    pub fn load(path: &Path) -> Result<Self> {
        let df = read_table(path)?;

        let column_error = |reason: String| LandUseError::LookupTable {
            path: path.to_path_buf(),
            reason,
        };

        for name in [
            lookup_columns::CODE,
            lookup_columns::ROTATION_SYMBOL,
            lookup_columns::PRIME_NAME,
            lookup_columns::CATEGORY,
        ] {
            if !crate::table::has_column(&df, name) {
                return Err(column_error(format!("missing column '{}'", name)));
            }
        }

        let code_values = i64_column(&df, lookup_columns::CODE)?;
        let symbol_values = string_column(&df, lookup_columns::ROTATION_SYMBOL)?;
        let name_values = string_column(&df, lookup_columns::PRIME_NAME)?;
        let category_values = string_column(&df, lookup_columns::CATEGORY)?;

        let mut entries = Vec::with_capacity(code_values.len());
        let mut skipped = 0usize;

        for (row, code) in code_values.into_iter().enumerate() {
            let Some(code) = code else {
                skipped += 1;
                continue;
            };

            let symbol = symbol_values[row]
                .as_deref()
                .map(str::trim)
                .and_then(|s| {
                    let mut chars = s.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => Some(c),
                        _ => None,
                    }
                })
                .ok_or_else(|| {
                    column_error(format!(
                        "code {} has no single-character rotation symbol",
                        code
                    ))
                })?;

            let prime_name = name_values[row]
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| column_error(format!("code {} has no prime name", code)))?;

            let category = category_values[row]
                .as_deref()
                .map(Category::from_tag)
                .unwrap_or(Category::Other);

            entries.push(CodeLookupEntry::new(code, symbol, prime_name, category));
        }

        if skipped > 0 {
            warn!(
                "Skipped {} lookup rows with no code in {}",
                skipped,
                path.display()
            );
        }

        let table = Self::new(entries).map_err(|e| match e {
            LandUseError::LookupTable { reason, .. } => column_error(reason),
            other => other,
        })?;

        info!(
            "Loaded {} land-cover codes from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    /// Compact built-in reference table of common NASS CDL codes
    pub fn builtin() -> Self {
        use Category::{DoubleCrop, Other, Perennial};

        let rows: &[(i64, char, &str, Category)] = &[
            (1, 'C', "Corn", Other),
            (4, 'R', "Sorghum", Other),
            (5, 'B', "Soybeans", Other),
            (12, 'C', "Sweet Corn", Other),
            (13, 'C', "Pop or Orn Corn", Other),
            (21, 'G', "Barley", Other),
            (23, 'W', "Spring Wheat", Other),
            (24, 'W', "Winter Wheat", Other),
            (26, 'D', "WinWht/Soybeans", DoubleCrop),
            (28, 'G', "Oats", Other),
            (36, 'A', "Alfalfa", Perennial),
            (37, 'P', "Hay", Perennial),
            (42, 'N', "Dry Beans", Other),
            (59, 'P', "Sod/Grass Seed", Perennial),
            (61, 'E', "Fallow/Idle", Other),
            (111, 'T', "Open Water", Other),
            (121, 'U', "Developed", Other),
            (122, 'U', "Developed", Other),
            (123, 'U', "Developed", Other),
            (124, 'U', "Developed", Other),
            (141, 'F', "Forest", Other),
            (142, 'F', "Forest", Other),
            (143, 'F', "Forest", Other),
            (176, 'P', "Grass/Pasture", Perennial),
            (190, 'T', "Wetlands", Other),
            (195, 'T', "Wetlands", Other),
            (225, 'D', "WinWht/Corn", DoubleCrop),
            (236, 'D', "WinWht/Sorghum", DoubleCrop),
            (241, 'D', "Corn/Soybeans", DoubleCrop),
        ];

        let entries = rows
            .iter()
            .map(|(code, symbol, name, category)| {
                CodeLookupEntry::new(*code, *symbol, *name, *category)
            })
            .collect::<Vec<_>>();

        Self {
            entries: entries.into_iter().map(|e| (e.code, e)).collect(),
            no_data: Self::no_data_entry(),
            scan_order: CANONICAL_SCAN_ORDER.chars().collect(),
        }
    }
}
