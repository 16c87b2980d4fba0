use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use plm_core::ProductId;
use plm_products::StageTransition;

use super::r#trait::{LedgerError, LedgerRecords, StageLedger};

/// In-memory stage ledger. Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryStageLedger {
    streams: RwLock<HashMap<ProductId, Vec<StageTransition>>>,
}

impl InMemoryStageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a deleted product's whole stream.
    pub(crate) fn remove_product(&self, product_id: ProductId) -> Result<(), LedgerError> {
        let mut streams = self
            .streams
            .write()
            .map_err(|_| LedgerError::Unavailable("lock poisoned".to_string()))?;
        streams.remove(&product_id);
        Ok(())
    }
}

impl StageLedger for InMemoryStageLedger {
    fn append(&self, product_id: ProductId, record: StageTransition) -> Result<u64, LedgerError> {
        let mut streams = self
            .streams
            .write()
            .map_err(|_| LedgerError::Unavailable("lock poisoned".to_string()))?;

        let stream = streams.entry(product_id).or_default();
        stream.push(record);
        Ok(stream.len() as u64)
    }

    fn records_for(&self, product_id: ProductId) -> Result<LedgerRecords, LedgerError> {
        let streams = self
            .streams
            .read()
            .map_err(|_| LedgerError::Unavailable("lock poisoned".to_string()))?;

        Ok(match streams.get(&product_id) {
            Some(stream) => LedgerRecords::new(Arc::from(stream.as_slice())),
            None => LedgerRecords::empty(),
        })
    }
}
