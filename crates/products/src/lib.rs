//! Products domain module: lifecycle stages, bills of materials and list filtering.
//!
//! This crate contains business rules only, implemented as deterministic domain
//! logic (no IO, no HTTP, no storage). Remote collaborators live in `plm-infra`.

pub mod bom;
pub mod error;
pub mod filter;
pub mod history;
pub mod lifecycle;
pub mod listing;
pub mod material;
pub mod product;
pub mod report;
pub mod stage;

pub use bom::{Bom, BomLine, BomLineField};
pub use error::{ProductError, ProductResult};
pub use filter::{FilterSpec, Filterable, MaterialOption, NumericRange};
pub use history::{StageHistory, StageTransition};
pub use lifecycle::{advance, current_stage_of, set_stage, set_stage_by_label};
pub use listing::{ProductListing, StageStatus};
pub use material::{CatalogSnapshot, Material, MaterialCatalog, MaterialId};
pub use product::{
    Dimensions, DraftField, LifecycleCommand, LifecycleEvent, Product, ProductDraft, ProductRecord,
};
pub use stage::Stage;
