//! Stage transition records and the per-product append-only history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use plm_core::UserId;

use crate::stage::Stage;

/// A recorded move from one stage to another.
///
/// Only the lifecycle state machine creates these; once created they are never
/// edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTransition {
    from: Option<Stage>,
    to: Stage,
    occurred_at: DateTime<Utc>,
    actor: UserId,
}

impl StageTransition {
    pub(crate) fn new(
        from: Option<Stage>,
        to: Stage,
        occurred_at: DateTime<Utc>,
        actor: UserId,
    ) -> Self {
        Self {
            from,
            to,
            occurred_at,
            actor,
        }
    }

    pub fn from(&self) -> Option<Stage> {
        self.from
    }

    pub fn to(&self) -> Stage {
        self.to
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn actor(&self) -> UserId {
        self.actor
    }
}

/// Ordered, append-only sequence of a product's transitions.
///
/// There is deliberately no way to remove or rewrite a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StageHistory {
    records: Vec<StageTransition>,
}

impl StageHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a history from persisted records, taken as given.
    ///
    /// The persisted ledger is authoritative: concurrent writers may leave a
    /// record whose `from` differs from the previous `to`, and the current
    /// stage is still the last record's `to`. Use [`StageHistory::first_gap`]
    /// to detect such a fork.
    pub fn from_records(records: Vec<StageTransition>) -> Self {
        Self { records }
    }

    /// Index of the first record that does not start where the previous one
    /// ended. A missing `from` only chains on the first record.
    pub fn first_gap(&self) -> Option<usize> {
        let mut expected = Stage::INITIAL;
        for (idx, record) in self.records.iter().enumerate() {
            let chained = match record.from {
                Some(from) => from == expected,
                None => idx == 0,
            };
            if !chained {
                return Some(idx);
            }
            expected = record.to;
        }
        None
    }

    /// Stage implied by the last record, `Concept` when empty.
    pub fn current_stage(&self) -> Stage {
        self.records.last().map_or(Stage::INITIAL, |r| r.to)
    }

    pub(crate) fn append(&mut self, record: StageTransition) {
        self.records.push(record);
    }

    /// Records ordered by occurrence. The iterator can be cloned to restart it.
    pub fn records(&self) -> std::slice::Iter<'_, StageTransition> {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&StageTransition> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
