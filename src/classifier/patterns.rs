//! General rotation table.
//!
//! Fields that pass every override are labelled from the shape of their
//! ranked code counts. Each shape has a base label pair and ordered
//! substitution groups that collapse double-crop and perennial codes
//! into simplified labels. Inside a group the first matching
//! substitution wins; a later group's match overrides an earlier one.
//!
//! Templates name the ranked codes by position: `{0}` is the prime name
//! of the most frequent code, `{1}` the runner-up, `{2}` the third.

use super::evidence::Evidence;
use crate::constants::labels;
use crate::models::Category;

/// Distribution of year counts over the ranked codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotationShape {
    /// 6
    Continuous,
    /// 5,1
    FiveOne,
    /// 4,2
    FourTwo,
    /// 4,1,1
    FourOneOne,
    /// 3,3
    ThreeThree,
    /// 3,2,1
    ThreeTwoOne,
    /// 3,1,1,1
    ThreeMixed,
    /// 2,2,2
    TwoTwoTwo,
    /// 2,2,1,1
    TwoTwoMixed,
    /// 2,1,1,1,1
    TwoMixed,
    /// Six distinct codes
    Fragmented,
}

impl RotationShape {
    /// Classify ranked counts (descending) into a shape
    pub fn from_counts(counts: &[usize]) -> Self {
        let at = |i: usize| counts.get(i).copied().unwrap_or(0);
        match at(0) {
            6 => RotationShape::Continuous,
            5 => RotationShape::FiveOne,
            4 if at(1) == 2 => RotationShape::FourTwo,
            4 => RotationShape::FourOneOne,
            3 if at(1) == 3 => RotationShape::ThreeThree,
            3 if at(1) == 2 => RotationShape::ThreeTwoOne,
            3 => RotationShape::ThreeMixed,
            2 if at(1) == 2 && at(2) == 2 => RotationShape::TwoTwoTwo,
            2 if at(1) == 2 => RotationShape::TwoTwoMixed,
            2 => RotationShape::TwoMixed,
            _ => RotationShape::Fragmented,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RotationShape::Continuous => "6",
            RotationShape::FiveOne => "5,1",
            RotationShape::FourTwo => "4,2",
            RotationShape::FourOneOne => "4,1,1",
            RotationShape::ThreeThree => "3,3",
            RotationShape::ThreeTwoOne => "3,2,1",
            RotationShape::ThreeMixed => "3,1,1,1",
            RotationShape::TwoTwoTwo => "2,2,2",
            RotationShape::TwoTwoMixed => "2,2,1,1",
            RotationShape::TwoMixed => "2,1,1,1,1",
            RotationShape::Fragmented => "1,1,1,1,1,1",
        }
    }

    /// Label table for this shape
    pub fn table(&self) -> &'static ShapeTable {
        match self {
            RotationShape::Continuous => &CONTINUOUS,
            RotationShape::FiveOne => &FIVE_ONE,
            RotationShape::FourTwo => &FOUR_TWO,
            RotationShape::FourOneOne => &FOUR_ONE_ONE,
            RotationShape::ThreeThree => &THREE_THREE,
            RotationShape::ThreeTwoOne => &THREE_TWO_ONE,
            RotationShape::ThreeMixed => &THREE_MIXED,
            RotationShape::TwoTwoTwo => &TWO_TWO_TWO,
            RotationShape::TwoTwoMixed => &TWO_TWO_MIXED,
            RotationShape::TwoMixed => &TWO_MIXED,
            RotationShape::Fragmented => &FRAGMENTED,
        }
    }
}

/// Category requirement on one ranked position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Any,
    Dbl,
    Per,
}

impl Slot {
    fn matches(&self, category: Option<Category>) -> bool {
        match self {
            Slot::Any => true,
            Slot::Dbl => category == Some(Category::DoubleCrop),
            Slot::Per => category == Some(Category::Perennial),
        }
    }
}

/// Replacement labels applied when the top three categories match
#[derive(Debug)]
pub struct Substitution {
    pub when: [Slot; 3],
    pub general: Option<&'static str>,
    pub detailed: Option<&'static str>,
}

impl Substitution {
    fn matches(&self, evidence: &Evidence) -> bool {
        self.when
            .iter()
            .enumerate()
            .all(|(i, slot)| slot.matches(evidence.category_at(i)))
    }
}

/// Base labels and substitution groups for one shape
#[derive(Debug)]
pub struct ShapeTable {
    pub general: &'static str,
    pub detailed: &'static str,
    pub groups: &'static [&'static [Substitution]],
}

impl ShapeTable {
    /// Resolve the label templates that apply to this field
    pub fn select(&self, evidence: &Evidence) -> (&'static str, &'static str) {
        let mut general = self.general;
        let mut detailed = self.detailed;

        for group in self.groups {
            if let Some(sub) = group.iter().find(|s| s.matches(evidence)) {
                general = sub.general.unwrap_or(general);
                detailed = sub.detailed.unwrap_or(detailed);
            }
        }

        (general, detailed)
    }
}

/// Fill `{0}`, `{1}` and `{2}` with ranked prime names
pub fn render(template: &str, names: &[&str; 3]) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let slot = match tail.as_bytes().get(1..3) {
            Some([d, b'}']) if (b'0'..=b'2').contains(d) => Some((d - b'0') as usize),
            _ => None,
        };
        match slot {
            Some(i) => {
                out.push_str(names[i]);
                rest = &tail[3..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

const fn sub(
    when: [Slot; 3],
    general: Option<&'static str>,
    detailed: Option<&'static str>,
) -> Substitution {
    Substitution {
        when,
        general,
        detailed,
    }
}

use Slot::{Any, Dbl, Per};

static CONTINUOUS: ShapeTable = ShapeTable {
    general: "Continuous {0}",
    detailed: "Continuous {0}",
    groups: &[&[sub([Dbl, Any, Any], Some("Continuous Double Crop"), None)]],
};

static FIVE_ONE: ShapeTable = ShapeTable {
    general: "{0} rotation",
    detailed: "Cnt{0}/{1}",
    groups: &[&[sub([Dbl, Any, Any], Some("Double Crop rotation"), None)]],
};

static FOUR_TWO: ShapeTable = ShapeTable {
    general: "{0}/{1}",
    detailed: "Cnt{0}/{1}",
    groups: &[&[
        sub([Dbl, Dbl, Any], Some("Double Crop rotation"), Some("{0}/{1}")),
        sub([Dbl, Any, Any], Some("Double Crop/{1}"), Some("{0}/{1}")),
        sub([Any, Dbl, Any], Some("{0}/Double Crop"), Some("{0}/{1}")),
        sub([Per, Any, Any], Some("{1}/Perennial"), Some("{1}/{0}")),
        sub([Any, Per, Any], Some("{0}/Perennial"), Some("{0}/{1}")),
    ]],
};

static FOUR_ONE_ONE: ShapeTable = ShapeTable {
    general: "{0} rotation",
    detailed: "Cnt{0}/Mixed",
    groups: &[&[
        sub([Dbl, Any, Any], Some("Double Crop rotation"), None),
        sub(
            [Any, Dbl, Dbl],
            Some("{0}/Double Crop"),
            Some("Cnt{0}/Double Crop"),
        ),
        sub([Per, Any, Any], Some("Perennial rotation"), Some("{0}/{1}/{2}")),
        sub([Any, Per, Per], Some("{0}/Perennial"), Some("{0}/{1}/{2}")),
    ]],
};

static THREE_THREE: ShapeTable = ShapeTable {
    general: "{0}/{1}",
    detailed: "{0}/{1}",
    groups: &[&[
        sub([Dbl, Dbl, Any], Some("Double Crop rotation"), None),
        sub([Dbl, Any, Any], Some("Double Crop/{1}"), None),
        sub([Any, Dbl, Any], Some("{0}/Double Crop"), None),
        sub([Per, Any, Any], Some("{1}/Perennial"), Some("{1}/{0}")),
        sub([Any, Per, Any], Some("{0}/Perennial"), None),
    ]],
};

static THREE_TWO_ONE: ShapeTable = ShapeTable {
    general: "{0}/{1}",
    detailed: "{0}/{1}/{2}",
    groups: &[&[
        sub([Dbl, Dbl, Any], Some("Double Crop rotation"), Some("{0}/{1}")),
        sub([Dbl, Any, Any], Some("Double Crop/{1}"), Some("{0}/{1}")),
        sub([Any, Dbl, Any], Some("{0}/Double Crop"), Some("{0}/{1}")),
        sub([Per, Any, Any], Some("{1}/Perennial"), Some("{1}/{0}/{2}")),
        sub([Any, Per, Any], Some("{0}/Perennial"), None),
    ]],
};

static THREE_MIXED: ShapeTable = ShapeTable {
    general: "{0} rotation",
    detailed: "{0}/Mixed",
    groups: &[&[
        sub([Dbl, Any, Any], Some("Double Crop rotation"), None),
        sub([Per, Any, Any], Some("Perennial rotation"), None),
    ]],
};

static TWO_TWO_TWO: ShapeTable = ShapeTable {
    general: "{0}/{1}/{2}",
    detailed: "{0}/{1}/{2}",
    groups: &[&[
        sub([Dbl, Dbl, Dbl], Some("Double Crop rotation"), None),
        sub([Dbl, Dbl, Any], Some("{2}/Double Crop"), None),
        sub([Dbl, Any, Dbl], Some("{1}/Double Crop"), None),
        sub([Any, Dbl, Dbl], Some("{0}/Double Crop"), None),
        sub([Any, Any, Dbl], Some("{0}/{1}/Double Crop"), None),
        sub([Any, Dbl, Any], Some("{0}/{2}/Double Crop"), None),
        sub([Dbl, Any, Any], Some("{1}/{2}/Double Crop"), None),
        sub([Per, Per, Any], Some("{2}/Perennial"), None),
        sub([Per, Any, Per], Some("{1}/Perennial"), None),
        sub([Any, Per, Per], Some("{0}/Perennial"), None),
        sub([Any, Any, Per], Some("{0}/{1}/Perennial"), None),
        sub([Any, Per, Any], Some("{0}/{2}/Perennial"), None),
        sub([Per, Any, Any], Some("{1}/{2}/Perennial"), None),
    ]],
};

static TWO_TWO_MIXED: ShapeTable = ShapeTable {
    general: "{0}/{1}",
    detailed: "{0}/{1}/Mixed",
    groups: &[
        &[
            sub([Dbl, Dbl, Any], Some("Double Crop rotation"), None),
            sub([Dbl, Any, Any], Some("{1}/Double Crop"), None),
            sub([Any, Dbl, Any], Some("{0}/Double Crop"), None),
        ],
        &[
            sub([Per, Per, Any], Some("Perennial rotation"), None),
            sub([Per, Any, Any], Some("{1}/Perennial"), None),
            sub([Any, Per, Any], Some("{0}/Perennial"), None),
        ],
    ],
};

static TWO_MIXED: ShapeTable = ShapeTable {
    general: "{0} rotation",
    detailed: "{0}/Mixed",
    groups: &[&[
        sub([Dbl, Any, Any], Some("Double Crop rotation"), None),
        sub([Per, Any, Any], Some("Perennial rotation"), None),
    ]],
};

static FRAGMENTED: ShapeTable = ShapeTable {
    general: labels::MIXED_AGRICULTURE,
    detailed: labels::MIXED_AGRICULTURE,
    groups: &[],
};
