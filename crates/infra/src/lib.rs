//! Infrastructure layer: remote backends, the stage ledger, listing loads and
//! the product session that orchestrates mutations against a backend.

pub mod backend;
pub mod config;
pub mod ledger;
pub mod loader;
pub mod session;


pub use backend::{InMemoryBackend, MaterialSource, ProductBackend, RemoteError, RemoteFailure};
pub use config::SessionConfig;
pub use ledger::{InMemoryStageLedger, LedgerRecords, StageLedger};
pub use loader::{load_listings, load_materials};
pub use session::{BomEdit, CatalogNotice, ProductSession, SessionError};
