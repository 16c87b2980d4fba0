use std::sync::Arc;

use thiserror::Error;

use plm_core::ProductId;
use plm_products::StageTransition;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger storage unavailable: {0}")]
    Unavailable(String),
}

/// Snapshot of one product's transitions, ordered by occurrence.
///
/// Iterates lazily over a shared immutable snapshot; clone it to restart.
#[derive(Debug, Clone)]
pub struct LedgerRecords {
    records: Arc<[StageTransition]>,
    next: usize,
}

impl LedgerRecords {
    pub fn new(records: Arc<[StageTransition]>) -> Self {
        Self { records, next: 0 }
    }

    pub fn empty() -> Self {
        Self::new(Arc::from(Vec::new()))
    }
}

impl Iterator for LedgerRecords {
    type Item = StageTransition;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.get(self.next)?.clone();
        self.next += 1;
        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.records.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for LedgerRecords {}

/// Per-product, append-only store of stage transitions.
pub trait StageLedger: Send + Sync {
    /// Append `record` to the product's stream, returning the new stream length.
    fn append(&self, product_id: ProductId, record: StageTransition) -> Result<u64, LedgerError>;

    /// All records for the product in occurrence order (empty if none).
    fn records_for(&self, product_id: ProductId) -> Result<LedgerRecords, LedgerError>;
}

impl<L> StageLedger for Arc<L>
where
    L: StageLedger + ?Sized,
{
    fn append(&self, product_id: ProductId, record: StageTransition) -> Result<u64, LedgerError> {
        (**self).append(product_id, record)
    }

    fn records_for(&self, product_id: ProductId) -> Result<LedgerRecords, LedgerError> {
        (**self).records_for(product_id)
    }
}
