//! Product session: the remote-facing orchestration of product mutations.
//!
//! Every mutation follows the same pipeline:
//!
//! ```text
//! fetch record + history
//!   -> rehydrate Product
//!   -> decide (pure, may fail with ProductError)
//!   -> persist remotely (may fail with RemoteFailure)
//!   -> apply locally
//!   -> publish CatalogNotice
//! ```
//!
//! Nothing is applied before the backend accepted the change, so a remote
//! failure leaves no local mutation behind. Concurrent sessions editing the
//! same product are last-writer-wins at the backend; a history forked that
//! way still loads, with the last record deciding the current stage.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use plm_core::{Aggregate, DomainError, ProductId, UserId};
use plm_events::EventBus;
use plm_products::{
    Bom, BomLineField, CatalogSnapshot, LifecycleCommand, Material, Product, ProductDraft,
    ProductError, ProductListing, Stage, StageTransition,
};

use crate::backend::{ProductBackend, RemoteFailure};
use crate::config::SessionConfig;
use crate::loader;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Product(#[from] ProductError),

    #[error(transparent)]
    Remote(#[from] RemoteFailure),
}

impl From<DomainError> for SessionError {
    fn from(value: DomainError) -> Self {
        SessionError::Product(ProductError::Domain(value))
    }
}

/// Published after a mutation was committed remotely. List views reload on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogNotice {
    ProductCreated { product_id: ProductId },
    StageChanged { product_id: ProductId, stage: Stage },
    BomChanged { product_id: ProductId },
    ProductDeleted { product_id: ProductId },
}

impl CatalogNotice {
    pub fn product_id(&self) -> ProductId {
        match self {
            CatalogNotice::ProductCreated { product_id }
            | CatalogNotice::StageChanged { product_id, .. }
            | CatalogNotice::BomChanged { product_id }
            | CatalogNotice::ProductDeleted { product_id } => *product_id,
        }
    }
}

/// One edit to a product's bill of materials.
#[derive(Debug, Clone, PartialEq)]
pub enum BomEdit {
    AddLine {
        material: Material,
        quantity: f64,
        unit_code: String,
    },
    RemoveLine {
        index: usize,
    },
    UpdateLine {
        index: usize,
        field: BomLineField,
    },
    Rename(String),
}

impl BomEdit {
    fn apply_to(self, bom: &mut Bom, catalog: &CatalogSnapshot) -> Result<(), ProductError> {
        match self {
            BomEdit::AddLine {
                material,
                quantity,
                unit_code,
            } => {
                bom.add_line(material, quantity, unit_code)?;
            }
            BomEdit::RemoveLine { index } => {
                bom.remove_line(index)?;
            }
            BomEdit::UpdateLine { index, field } => {
                bom.update_line(index, field, catalog)?;
            }
            BomEdit::Rename(name) => bom.rename(name),
        }
        Ok(())
    }
}

pub struct ProductSession<B, N>
where
    B: ProductBackend + ?Sized,
    N: EventBus<CatalogNotice>,
{
    backend: Arc<B>,
    notices: N,
    config: SessionConfig,
}

impl<B, N> ProductSession<B, N>
where
    B: ProductBackend + ?Sized + 'static,
    N: EventBus<CatalogNotice>,
{
    pub fn new(backend: Arc<B>, notices: N, config: SessionConfig) -> Self {
        Self {
            backend,
            notices,
            config,
        }
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub fn notices(&self) -> &N {
        &self.notices
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Load every product with its current stage for list views.
    pub async fn load(&self) -> Result<Vec<ProductListing>, RemoteFailure> {
        loader::load_listings(Arc::clone(&self.backend), &self.config).await
    }

    /// Fetch one product with its full stage history as persisted.
    #[tracing::instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<Product, SessionError> {
        let record = self
            .backend
            .fetch_product(id)
            .await
            .map_err(RemoteFailure::from)?;
        let history = self
            .backend
            .fetch_history(id)
            .await
            .map_err(RemoteFailure::from)?;
        let product = Product::rehydrate(record, history);
        if let Some(index) = product.history().first_gap() {
            tracing::warn!(
                record = index,
                current = %product.current_stage(),
                "stage history forked by concurrent writers, last record wins"
            );
        }
        Ok(product)
    }

    #[tracing::instrument(skip(self, draft))]
    pub async fn create_product(&self, draft: ProductDraft) -> Result<Product, SessionError> {
        let product = draft.build(ProductId::new())?;
        self.backend
            .create_product(product.record())
            .await
            .map_err(RemoteFailure::from)?;

        tracing::info!(product_id = %product.product_id(), "product created");
        self.publish(CatalogNotice::ProductCreated {
            product_id: product.product_id(),
        });
        Ok(product)
    }

    /// Move the product to the next stage on the linear path.
    pub async fn advance(
        &self,
        id: ProductId,
        actor: UserId,
    ) -> Result<StageTransition, SessionError> {
        self.transition(
            id,
            LifecycleCommand::Advance {
                actor,
                occurred_at: Utc::now(),
            },
        )
        .await
    }

    /// Jump to `target`, whatever the current stage is.
    pub async fn set_stage(
        &self,
        id: ProductId,
        target: Stage,
        actor: UserId,
    ) -> Result<StageTransition, SessionError> {
        self.transition(
            id,
            LifecycleCommand::SetStage {
                target,
                actor,
                occurred_at: Utc::now(),
            },
        )
        .await
    }

    pub async fn set_stage_by_label(
        &self,
        id: ProductId,
        label: &str,
        actor: UserId,
    ) -> Result<StageTransition, SessionError> {
        let target: Stage = label.parse()?;
        self.set_stage(id, target, actor).await
    }

    #[tracing::instrument(skip(self, command), fields(product_id = %id))]
    async fn transition(
        &self,
        id: ProductId,
        command: LifecycleCommand,
    ) -> Result<StageTransition, SessionError> {
        let mut product = self.product(id).await?;
        let events = product.handle(&command)?;

        for event in &events {
            self.backend
                .persist_transition(id, event.transition())
                .await
                .map_err(|err| {
                    tracing::warn!(error = %err, "stage transition rejected by backend");
                    RemoteFailure::from(err)
                })?;
        }
        for event in &events {
            product.apply(event);
        }

        let Some(transition) = product.history().last().cloned() else {
            return Err(ProductError::Domain(DomainError::invariant(
                "transition committed without a history record",
            ))
            .into());
        };
        tracing::info!(from = ?transition.from(), to = %transition.to(), "stage changed");
        self.publish(CatalogNotice::StageChanged {
            product_id: id,
            stage: transition.to(),
        });
        Ok(transition)
    }

    /// Apply one edit to the product's BOM and persist the whole BOM.
    ///
    /// The edit is validated on a working copy first; an invalid edit never
    /// reaches the backend.
    #[tracing::instrument(skip(self, edit, catalog), fields(product_id = %id))]
    pub async fn edit_bom(
        &self,
        id: ProductId,
        edit: BomEdit,
        catalog: &CatalogSnapshot,
    ) -> Result<Bom, SessionError> {
        let product = self.product(id).await?;
        let mut bom = product.bom().clone();
        edit.apply_to(&mut bom, catalog)?;

        self.backend
            .persist_bom_edit(id, &bom)
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "bill of materials edit rejected by backend");
                RemoteFailure::from(err)
            })?;

        tracing::info!(lines = bom.len(), "bill of materials updated");
        self.publish(CatalogNotice::BomChanged { product_id: id });
        Ok(bom)
    }

    /// Delete the product with its BOM and history. Role checks belong to the caller.
    #[tracing::instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), SessionError> {
        self.backend
            .delete_product(id)
            .await
            .map_err(RemoteFailure::from)?;

        tracing::info!("product deleted");
        self.publish(CatalogNotice::ProductDeleted { product_id: id });
        Ok(())
    }

    fn publish(&self, notice: CatalogNotice) {
        if let Err(err) = self.notices.publish(notice) {
            tracing::warn!(error = ?err, "catalog notice not published");
        }
    }
}
