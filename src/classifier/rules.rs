//! Ordered categorical override rules.
//!
//! Checked before the general rotation table; the first rule whose
//! predicate holds assigns the land use. Each rule is a named predicate
//! over the field's symbol tally and an assignment function.

use super::evidence::Evidence;
use crate::constants::{labels, symbols};
use crate::models::{AgClass, LandUse};

/// Land use and agricultural flag chosen by a rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub land_use: LandUse,
    pub ag_class: AgClass,
}

impl Assignment {
    pub fn new(land_use: LandUse, ag_class: AgClass) -> Self {
        Self { land_use, ag_class }
    }
}

/// One entry of the override table
pub struct OverrideRule {
    pub name: &'static str,
    pub applies: fn(&Evidence) -> bool,
    pub assign: fn(&Evidence) -> Assignment,
}

impl std::fmt::Debug for OverrideRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverrideRule").field("name", &self.name).finish()
    }
}

/// Override rules in priority order
pub const OVERRIDE_RULES: &[OverrideRule] = &[
    OverrideRule {
        name: "urban",
        applies: |e| e.tally.urban() >= 4,
        assign: |_| non_ag(labels::URBAN, labels::URBAN_DETAIL),
    },
    OverrideRule {
        name: "water",
        applies: |e| e.tally.water() >= 4,
        assign: |_| non_ag(labels::WATER, labels::WATER_DETAIL),
    },
    OverrideRule {
        name: "forest",
        applies: |e| e.tally.forest() >= 4,
        assign: |_| non_ag(labels::FOREST, labels::FOREST_DETAIL),
    },
    OverrideRule {
        name: "non-ag",
        applies: |e| e.tally.non_ag() >= 4,
        assign: |_| non_ag(labels::NON_AG, labels::NON_AG),
    },
    OverrideRule {
        name: "pasture",
        applies: |e| e.tally.pasture() >= 5,
        assign: |_| grassland(),
    },
    OverrideRule {
        name: "forest-pasture",
        applies: |e| e.tally.forest() + e.tally.pasture() >= 5,
        assign: |_| grassland(),
    },
    OverrideRule {
        name: "forest-pasture-water",
        applies: |e| e.tally.forest() + e.tally.pasture() + e.tally.water() >= 5,
        assign: |_| grassland(),
    },
    OverrideRule {
        name: "flood-prone",
        applies: |e| e.tally.water() >= 2,
        assign: flood_prone,
    },
    OverrideRule {
        name: "corn-soy-perennial-mixed",
        applies: |e| corn_soy_pasture_full(e) && e.low_coverage_years > 0,
        assign: |_| {
            cropland(
                labels::CORN_SOYBEANS,
                format!("{}{}", labels::CONTINUOUS_PREFIX, labels::CORN_SOYBEANS_PERENNIAL),
            )
        },
    },
    OverrideRule {
        name: "corn-soy-perennial",
        applies: corn_soy_pasture_full,
        assign: |_| cropland(labels::CORN_SOYBEANS, labels::CORN_SOYBEANS_PERENNIAL),
    },
    OverrideRule {
        name: "corn-soy-mixed",
        applies: |e| {
            corn_and_soy(e)
                && e.tally.corn() + e.tally.soybeans() == 6
                && e.low_coverage_years > 0
        },
        assign: |_| {
            cropland(
                labels::CORN_SOYBEANS,
                format!("{}{}", labels::CONTINUOUS_PREFIX, labels::CORN_SOYBEANS),
            )
        },
    },
    OverrideRule {
        name: "corn-soy",
        applies: |e| corn_and_soy(e) && e.tally.corn() + e.tally.soybeans() >= 5,
        assign: |_| cropland(labels::CORN_SOYBEANS, labels::CORN_SOYBEANS),
    },
];

/// First override rule that applies, if any
pub fn first_override(evidence: &Evidence) -> Option<&'static OverrideRule> {
    OVERRIDE_RULES.iter().find(|rule| (rule.applies)(evidence))
}

fn corn_and_soy(e: &Evidence) -> bool {
    e.tally.corn() > 0 && e.tally.soybeans() > 0
}

fn corn_soy_pasture_full(e: &Evidence) -> bool {
    corn_and_soy(e) && e.tally.pasture() > 0 && e.tally.corn_soy_pasture() == 6
}

fn non_ag(general: &str, detailed: &str) -> Assignment {
    Assignment::new(LandUse::new(general, detailed), AgClass::NonAg)
}

fn grassland() -> Assignment {
    Assignment::new(LandUse::uniform(labels::PASTURE), AgClass::Grassland)
}

fn cropland(general: impl Into<String>, detailed: impl Into<String>) -> Assignment {
    Assignment::new(LandUse::new(general, detailed), AgClass::Cropland)
}

/// Flood-prone cropland, named after the dominant code that is not water
fn flood_prone(e: &Evidence) -> Assignment {
    let dominant = e
        .ranked
        .iter()
        .find(|r| r.entry.rotation_symbol != symbols::WATER)
        .or_else(|| e.ranked.first())
        .map_or("", |r| r.name());

    Assignment::new(
        LandUse::new(
            labels::FLOOD_PRONE,
            format!("{}{}", labels::FLOOD_PRONE_PREFIX, dominant),
        ),
        AgClass::Grassland,
    )
}
