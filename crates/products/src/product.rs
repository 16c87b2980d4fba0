use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use plm_core::{Aggregate, AggregateRoot, DomainError, DomainResult, ProductId, UserId};
use plm_events::Event;

use crate::bom::Bom;
use crate::error::{ProductError, ProductResult};
use crate::history::{StageHistory, StageTransition};
use crate::stage::Stage;

/// Estimated physical dimensions. All three are non-negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDimensions")]
pub struct Dimensions {
    #[serde(rename = "estimated_height")]
    height: f64,
    #[serde(rename = "estimated_weight")]
    weight: f64,
    #[serde(rename = "estimated_width")]
    width: f64,
}

#[derive(Deserialize)]
struct RawDimensions {
    #[serde(default)]
    estimated_height: f64,
    #[serde(default)]
    estimated_weight: f64,
    #[serde(default)]
    estimated_width: f64,
}

impl TryFrom<RawDimensions> for Dimensions {
    type Error = DomainError;

    fn try_from(raw: RawDimensions) -> Result<Self, Self::Error> {
        Dimensions::new(raw.estimated_height, raw.estimated_weight, raw.estimated_width)
    }
}

impl Dimensions {
    pub fn new(height: f64, weight: f64, width: f64) -> DomainResult<Self> {
        for (label, value) in [("height", height), ("weight", weight), ("width", width)] {
            if !value.is_finite() || value < 0.0 {
                return Err(DomainError::validation(format!(
                    "estimated {label} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(Self {
            height,
            weight,
            width,
        })
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn width(&self) -> f64 {
        self.width
    }
}

/// Descriptive product data as exchanged with the backend (no stage information).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    #[serde(flatten)]
    pub dimensions: Dimensions,
    #[serde(default)]
    pub bom: Bom,
}

/// Field of a `ProductDraft` targeted by `ProductDraft::set`.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftField {
    Name(String),
    Description(String),
    Height(Option<f64>),
    Weight(Option<f64>),
    Width(Option<f64>),
    BomName(String),
}

/// Product being edited before creation.
///
/// Dimensions stay `None` until the user enters a value; `build` persists an
/// unset dimension as `0.0`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub width: Option<f64>,
    pub bom: Bom,
}

impl ProductDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: DraftField) {
        match field {
            DraftField::Name(name) => self.name = name,
            DraftField::Description(description) => self.description = description,
            DraftField::Height(height) => self.height = height,
            DraftField::Weight(weight) => self.weight = weight,
            DraftField::Width(width) => self.width = width,
            DraftField::BomName(name) => self.bom.rename(name),
        }
    }

    /// Validate the draft and produce a product at `Concept` with no history.
    pub fn build(self, id: ProductId) -> DomainResult<Product> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if self.description.trim().is_empty() {
            return Err(DomainError::validation("description cannot be empty"));
        }
        let dimensions = Dimensions::new(
            self.height.unwrap_or(0.0),
            self.weight.unwrap_or(0.0),
            self.width.unwrap_or(0.0),
        )?;

        Ok(Product {
            record: ProductRecord {
                id,
                name: self.name.trim().to_string(),
                description: self.description,
                dimensions,
                bom: self.bom,
            },
            history: StageHistory::new(),
        })
    }
}

/// Aggregate root: Product.
///
/// The current stage is never stored; it is read off the last history record.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    record: ProductRecord,
    history: StageHistory,
}

impl Product {
    /// Rebuild a product from its record and persisted stage history.
    pub fn rehydrate(record: ProductRecord, history: Vec<StageTransition>) -> Self {
        Self {
            record,
            history: StageHistory::from_records(history),
        }
    }

    pub fn product_id(&self) -> ProductId {
        self.record.id
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn description(&self) -> &str {
        &self.record.description
    }

    pub fn dimensions(&self) -> Dimensions {
        self.record.dimensions
    }

    pub fn bom(&self) -> &Bom {
        &self.record.bom
    }

    pub fn record(&self) -> &ProductRecord {
        &self.record
    }

    pub fn history(&self) -> &StageHistory {
        &self.history
    }

    pub fn current_stage(&self) -> Stage {
        self.history.current_stage()
    }

    pub fn into_record(self) -> ProductRecord {
        self.record
    }
}

impl AggregateRoot for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.record.id
    }

    fn version(&self) -> u64 {
        self.history.len() as u64
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleCommand {
    /// Move to the next stage on the linear path.
    Advance {
        actor: UserId,
        occurred_at: DateTime<Utc>,
    },
    /// Jump to any stage, including the current one or an earlier one.
    SetStage {
        target: Stage,
        actor: UserId,
        occurred_at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleEvent {
    StageChanged {
        product_id: ProductId,
        transition: StageTransition,
    },
}

impl LifecycleEvent {
    pub fn product_id(&self) -> ProductId {
        match self {
            LifecycleEvent::StageChanged { product_id, .. } => *product_id,
        }
    }

    pub fn transition(&self) -> &StageTransition {
        match self {
            LifecycleEvent::StageChanged { transition, .. } => transition,
        }
    }
}

impl Event for LifecycleEvent {
    fn event_type(&self) -> &'static str {
        match self {
            LifecycleEvent::StageChanged { .. } => "products.stage.changed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.transition().occurred_at()
    }
}

impl Aggregate for Product {
    type Command = LifecycleCommand;
    type Event = LifecycleEvent;
    type Error = ProductError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            LifecycleEvent::StageChanged { transition, .. } => {
                self.history.append(transition.clone());
            }
        }
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        let event = match *command {
            LifecycleCommand::Advance { actor, occurred_at } => {
                self.advance_event(actor, occurred_at)?
            }
            LifecycleCommand::SetStage {
                target,
                actor,
                occurred_at,
            } => self.set_stage_event(target, actor, occurred_at),
        };
        Ok(vec![event])
    }
}

impl Product {
    pub(crate) fn advance_event(
        &self,
        actor: UserId,
        occurred_at: DateTime<Utc>,
    ) -> ProductResult<LifecycleEvent> {
        let current = self.current_stage();
        let next = current
            .linear_successor()
            .ok_or(ProductError::TerminalStage { stage: current })?;
        Ok(self.stage_changed(StageTransition::new(Some(current), next, occurred_at, actor)))
    }

    pub(crate) fn set_stage_event(
        &self,
        target: Stage,
        actor: UserId,
        occurred_at: DateTime<Utc>,
    ) -> LifecycleEvent {
        let current = self.current_stage();
        self.stage_changed(StageTransition::new(Some(current), target, occurred_at, actor))
    }

    fn stage_changed(&self, transition: StageTransition) -> LifecycleEvent {
        LifecycleEvent::StageChanged {
            product_id: self.record.id,
            transition,
        }
    }
}
