//! Product lifecycle stages.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProductError;

/// One discrete phase in a product's lifecycle.
///
/// `Concept` through `Production` form the linear path walked by `advance`.
/// `Retreat`, `Standby` and `Cancel` are side states reachable only through an
/// explicit `set_stage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Stage {
    Concept,
    Feasibility,
    Projection,
    Production,
    Retreat,
    Standby,
    Cancel,
}

impl Stage {
    /// Every stage, in ordinal order.
    pub const ALL: [Stage; 7] = [
        Stage::Concept,
        Stage::Feasibility,
        Stage::Projection,
        Stage::Production,
        Stage::Retreat,
        Stage::Standby,
        Stage::Cancel,
    ];

    /// Stage of a freshly created product.
    pub const INITIAL: Stage = Stage::Concept;

    /// 1-based ordinal (`Concept` = 1 ... `Cancel` = 7).
    pub fn ordinal(self) -> u8 {
        match self {
            Stage::Concept => 1,
            Stage::Feasibility => 2,
            Stage::Projection => 3,
            Stage::Production => 4,
            Stage::Retreat => 5,
            Stage::Standby => 6,
            Stage::Cancel => 7,
        }
    }

    pub fn from_ordinal(ordinal: u8) -> Result<Self, ProductError> {
        Stage::ALL
            .into_iter()
            .find(|s| s.ordinal() == ordinal)
            .ok_or_else(|| ProductError::InvalidStage(ordinal.to_string()))
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Concept => "CONCEPT",
            Stage::Feasibility => "FEASIBILITY",
            Stage::Projection => "PROJECTION",
            Stage::Production => "PRODUCTION",
            Stage::Retreat => "RETREAT",
            Stage::Standby => "STANDBY",
            Stage::Cancel => "CANCEL",
        }
    }

    /// Next stage along the linear path, if any.
    pub fn linear_successor(self) -> Option<Stage> {
        match self {
            Stage::Concept => Some(Stage::Feasibility),
            Stage::Feasibility => Some(Stage::Projection),
            Stage::Projection => Some(Stage::Production),
            Stage::Production | Stage::Retreat | Stage::Standby | Stage::Cancel => None,
        }
    }

    /// Whether the stage lies on the `Concept -> Production` path.
    pub fn is_linear(self) -> bool {
        self.ordinal() <= Stage::Production.ordinal()
    }
}

impl core::fmt::Display for Stage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Stage {
    type Err = ProductError;

    /// Parses a stage label, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Stage::ALL
            .into_iter()
            .find(|stage| stage.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ProductError::InvalidStage(s.to_string()))
    }
}
