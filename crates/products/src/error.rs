//! Errors raised by product, BOM and lifecycle operations.

use thiserror::Error;

use plm_core::DomainError;

use crate::material::MaterialId;
use crate::stage::Stage;

pub type ProductResult<T> = Result<T, ProductError>;

/// Failure of a synchronous product-domain operation.
///
/// Every variant is raised at the point of the invalid operation, before any
/// state was touched.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProductError {
    /// `advance` was called on a stage with no linear successor.
    #[error("stage {stage} has no next stage")]
    TerminalStage { stage: Stage },

    /// A stage label or ordinal did not name one of the known stages.
    #[error("unrecognized stage: {0:?}")]
    InvalidStage(String),

    #[error("material {material_id} is already part of the bill of materials")]
    DuplicateMaterial { material_id: MaterialId },

    #[error("quantity must be a non-negative number, got {quantity}")]
    InvalidQuantity { quantity: f64 },

    #[error("line index {index} is out of range for a bill of materials with {len} lines")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("unit code must not be empty")]
    InvalidUnitCode,

    #[error("material {material_id} is not in the catalog")]
    UnknownMaterial { material_id: MaterialId },

    #[error(transparent)]
    Domain(#[from] DomainError),
}
