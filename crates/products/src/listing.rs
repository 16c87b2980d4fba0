//! List-view entries assembled from independently fetched product data and stages.

use serde::{Deserialize, Serialize};

use crate::error::ProductError;
use crate::product::{Product, ProductRecord};
use crate::stage::Stage;

/// Current stage as known to a list view.
///
/// `Unknown` is the fallback for a product whose stage could not be fetched;
/// it is a value, not an error, so one failed lookup never hides the rest of
/// the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum StageStatus {
    Known(Stage),
    Unknown,
}

impl StageStatus {
    pub const UNKNOWN_LABEL: &'static str = "Unknown";

    pub fn stage(self) -> Option<Stage> {
        match self {
            StageStatus::Known(stage) => Some(stage),
            StageStatus::Unknown => None,
        }
    }

    pub fn is_known(self) -> bool {
        matches!(self, StageStatus::Known(_))
    }

    pub fn label(self) -> &'static str {
        match self {
            StageStatus::Known(stage) => stage.label(),
            StageStatus::Unknown => Self::UNKNOWN_LABEL,
        }
    }
}

impl From<Stage> for StageStatus {
    fn from(stage: Stage) -> Self {
        StageStatus::Known(stage)
    }
}

impl From<StageStatus> for String {
    fn from(status: StageStatus) -> Self {
        status.label().to_string()
    }
}

impl TryFrom<String> for StageStatus {
    type Error = ProductError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == StageStatus::UNKNOWN_LABEL {
            return Ok(StageStatus::Unknown);
        }
        value.parse().map(StageStatus::Known)
    }
}

impl core::fmt::Display for StageStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// A product as shown in list views: its record plus the separately fetched stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListing {
    #[serde(flatten)]
    pub record: ProductRecord,
    pub current_stage: StageStatus,
}

impl ProductListing {
    pub fn new(record: ProductRecord, current_stage: StageStatus) -> Self {
        Self {
            record,
            current_stage,
        }
    }
}

impl From<&Product> for ProductListing {
    fn from(product: &Product) -> Self {
        Self::new(product.record().clone(), product.current_stage().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_round_trips_through_its_label() {
        assert_eq!(serde_json::to_string(&StageStatus::Unknown).unwrap(), "\"Unknown\"");
        let parsed: StageStatus = serde_json::from_str("\"Unknown\"").unwrap();
        assert_eq!(parsed, StageStatus::Unknown);
    }

    #[test]
    fn known_stages_use_stage_labels() {
        let status = StageStatus::from(Stage::Projection);
        assert_eq!(status.to_string(), "PROJECTION");
        assert_eq!(status.stage(), Some(Stage::Projection));
        let parsed: StageStatus = serde_json::from_str("\"PROJECTION\"").unwrap();
        assert_eq!(parsed, status);
        assert!(serde_json::from_str::<StageStatus>("\"LAUNCHED\"").is_err());
    }
}
