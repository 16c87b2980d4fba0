use async_trait::async_trait;
use thiserror::Error;

use plm_core::ProductId;
use plm_products::{Bom, Material, ProductRecord, Stage, StageTransition};

/// Transport-level failure reported by a backend.
///
/// Carries diagnostic detail; convert it into a [`RemoteFailure`] before
/// showing anything to a user.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    #[error("request was not authorized")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(String),

    /// The backend understood the request and refused it.
    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

/// User-facing description of a failed remote operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct RemoteFailure {
    pub message: String,
}

impl RemoteFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<RemoteError> for RemoteFailure {
    fn from(value: RemoteError) -> Self {
        match value {
            RemoteError::Unauthorized => Self::new("User does not exist or is not authorized"),
            RemoteError::NotFound(what) => Self::new(format!("{what} was not found")),
            RemoteError::Rejected(reason) => Self::new(reason),
            RemoteError::Transport(detail) => {
                tracing::debug!(%detail, "transport failure");
                Self::new("The server could not be reached")
            }
            RemoteError::Decode(detail) => {
                tracing::debug!(%detail, "undecodable response");
                Self::new("The server sent an unexpected response")
            }
        }
    }
}

/// Remote store of product records and their stage histories.
///
/// A record fetched from here carries no stage; the current stage is a
/// separate lookup so a listing can degrade one row at a time.
#[async_trait]
pub trait ProductBackend: Send + Sync {
    async fn fetch_all_products(&self) -> Result<Vec<ProductRecord>, RemoteError>;

    async fn fetch_product(&self, id: ProductId) -> Result<ProductRecord, RemoteError>;

    async fn fetch_current_stage(&self, id: ProductId) -> Result<Stage, RemoteError>;

    /// Stage transitions for the product in occurrence order.
    async fn fetch_history(&self, id: ProductId) -> Result<Vec<StageTransition>, RemoteError>;

    async fn create_product(&self, record: &ProductRecord) -> Result<(), RemoteError>;

    async fn persist_transition(
        &self,
        id: ProductId,
        transition: &StageTransition,
    ) -> Result<(), RemoteError>;

    /// Replace the product's bill of materials.
    async fn persist_bom_edit(&self, id: ProductId, bom: &Bom) -> Result<(), RemoteError>;

    /// Delete the product together with its bill of materials and history.
    async fn delete_product(&self, id: ProductId) -> Result<(), RemoteError>;
}

/// Remote source of the material catalog.
#[async_trait]
pub trait MaterialSource: Send + Sync {
    async fn list_materials(&self) -> Result<Vec<Material>, RemoteError>;
}

#[async_trait]
impl<B> ProductBackend for std::sync::Arc<B>
where
    B: ProductBackend + ?Sized,
{
    async fn fetch_all_products(&self) -> Result<Vec<ProductRecord>, RemoteError> {
        (**self).fetch_all_products().await
    }

    async fn fetch_product(&self, id: ProductId) -> Result<ProductRecord, RemoteError> {
        (**self).fetch_product(id).await
    }

    async fn fetch_current_stage(&self, id: ProductId) -> Result<Stage, RemoteError> {
        (**self).fetch_current_stage(id).await
    }

    async fn fetch_history(&self, id: ProductId) -> Result<Vec<StageTransition>, RemoteError> {
        (**self).fetch_history(id).await
    }

    async fn create_product(&self, record: &ProductRecord) -> Result<(), RemoteError> {
        (**self).create_product(record).await
    }

    async fn persist_transition(
        &self,
        id: ProductId,
        transition: &StageTransition,
    ) -> Result<(), RemoteError> {
        (**self).persist_transition(id, transition).await
    }

    async fn persist_bom_edit(&self, id: ProductId, bom: &Bom) -> Result<(), RemoteError> {
        (**self).persist_bom_edit(id, bom).await
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), RemoteError> {
        (**self).delete_product(id).await
    }
}
