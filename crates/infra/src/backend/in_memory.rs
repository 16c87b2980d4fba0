use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use plm_core::ProductId;
use plm_products::{Bom, Material, ProductRecord, Stage, StageTransition};

use super::r#trait::{MaterialSource, ProductBackend, RemoteError};
use crate::ledger::{InMemoryStageLedger, LedgerError, StageLedger};

/// Process-local backend. Intended for tests/dev.
///
/// Products are listed in id order, which for UUIDv7 ids is creation order.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    products: RwLock<BTreeMap<ProductId, ProductRecord>>,
    materials: RwLock<Vec<Material>>,
    ledger: InMemoryStageLedger,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_materials(materials: impl IntoIterator<Item = Material>) -> Self {
        Self {
            materials: RwLock::new(materials.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Seed a record directly, bypassing `create_product`.
    pub fn insert_product(&self, record: ProductRecord) -> Result<(), RemoteError> {
        let mut products = self.products.write().map_err(poisoned)?;
        products.insert(record.id, record);
        Ok(())
    }

    pub fn ledger(&self) -> &InMemoryStageLedger {
        &self.ledger
    }

    fn ensure_exists(&self, id: ProductId) -> Result<(), RemoteError> {
        let products = self.products.read().map_err(poisoned)?;
        if products.contains_key(&id) {
            Ok(())
        } else {
            Err(not_found(id))
        }
    }
}

#[async_trait]
impl ProductBackend for InMemoryBackend {
    async fn fetch_all_products(&self) -> Result<Vec<ProductRecord>, RemoteError> {
        let products = self.products.read().map_err(poisoned)?;
        Ok(products.values().cloned().collect())
    }

    async fn fetch_product(&self, id: ProductId) -> Result<ProductRecord, RemoteError> {
        let products = self.products.read().map_err(poisoned)?;
        products.get(&id).cloned().ok_or_else(|| not_found(id))
    }

    async fn fetch_current_stage(&self, id: ProductId) -> Result<Stage, RemoteError> {
        self.ensure_exists(id)?;
        let records = self.ledger.records_for(id).map_err(ledger_error)?;
        Ok(records.last().map_or(Stage::INITIAL, |record| record.to()))
    }

    async fn fetch_history(&self, id: ProductId) -> Result<Vec<StageTransition>, RemoteError> {
        self.ensure_exists(id)?;
        let records = self.ledger.records_for(id).map_err(ledger_error)?;
        Ok(records.collect())
    }

    async fn create_product(&self, record: &ProductRecord) -> Result<(), RemoteError> {
        let mut products = self.products.write().map_err(poisoned)?;
        if products.contains_key(&record.id) {
            return Err(RemoteError::Rejected(format!(
                "product {} already exists",
                record.id
            )));
        }
        products.insert(record.id, record.clone());
        Ok(())
    }

    async fn persist_transition(
        &self,
        id: ProductId,
        transition: &StageTransition,
    ) -> Result<(), RemoteError> {
        self.ensure_exists(id)?;
        self.ledger
            .append(id, transition.clone())
            .map_err(ledger_error)?;
        Ok(())
    }

    async fn persist_bom_edit(&self, id: ProductId, bom: &Bom) -> Result<(), RemoteError> {
        let mut products = self.products.write().map_err(poisoned)?;
        let record = products.get_mut(&id).ok_or_else(|| not_found(id))?;
        record.bom = bom.clone();
        Ok(())
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), RemoteError> {
        let mut products = self.products.write().map_err(poisoned)?;
        products.remove(&id).ok_or_else(|| not_found(id))?;
        self.ledger.remove_product(id).map_err(ledger_error)?;
        Ok(())
    }
}

#[async_trait]
impl MaterialSource for InMemoryBackend {
    async fn list_materials(&self) -> Result<Vec<Material>, RemoteError> {
        let materials = self.materials.read().map_err(poisoned)?;
        Ok(materials.clone())
    }
}

fn not_found(id: ProductId) -> RemoteError {
    RemoteError::NotFound(format!("product {id}"))
}

fn poisoned<T>(_: T) -> RemoteError {
    RemoteError::Transport("backend lock poisoned".to_string())
}

fn ledger_error(err: LedgerError) -> RemoteError {
    RemoteError::Transport(err.to_string())
}
