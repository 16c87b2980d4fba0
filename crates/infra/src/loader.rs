//! Listing load: fetch all records, then each product's current stage.
//!
//! Stage lookups run concurrently (bounded by the session config) and are
//! reassembled by position, so the listing keeps the backend's order. A lookup
//! that fails marks only its own row `Unknown`.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use plm_products::{CatalogSnapshot, ProductListing, StageStatus};

use crate::backend::{MaterialSource, ProductBackend, RemoteFailure};
use crate::config::SessionConfig;

#[tracing::instrument(skip_all, fields(concurrency = config.stage_fetch_concurrency))]
pub async fn load_listings<B>(
    backend: Arc<B>,
    config: &SessionConfig,
) -> Result<Vec<ProductListing>, RemoteFailure>
where
    B: ProductBackend + ?Sized + 'static,
{
    let records = backend.fetch_all_products().await.map_err(|err| {
        tracing::warn!(error = %err, "product list fetch failed");
        RemoteFailure::from(err)
    })?;

    let permits = Arc::new(Semaphore::new(config.stage_fetch_concurrency.max(1)));
    let mut lookups = JoinSet::new();
    for (position, record) in records.iter().enumerate() {
        let backend = Arc::clone(&backend);
        let permits = Arc::clone(&permits);
        let id = record.id;
        lookups.spawn(async move {
            // The semaphore is never closed; a missing permit only loosens the bound.
            let _permit = permits.acquire_owned().await.ok();
            let status = match backend.fetch_current_stage(id).await {
                Ok(stage) => StageStatus::Known(stage),
                Err(err) => {
                    tracing::warn!(product_id = %id, error = %err, "stage lookup failed, showing Unknown");
                    StageStatus::Unknown
                }
            };
            (position, status)
        });
    }

    let mut statuses = vec![StageStatus::Unknown; records.len()];
    while let Some(joined) = lookups.join_next().await {
        match joined {
            Ok((position, status)) => statuses[position] = status,
            Err(err) => tracing::warn!(error = %err, "stage lookup task aborted"),
        }
    }

    let listings: Vec<ProductListing> = records
        .into_iter()
        .zip(statuses)
        .map(|(record, current_stage)| ProductListing {
            record,
            current_stage,
        })
        .collect();

    tracing::info!(
        products = listings.len(),
        unknown = listings.iter().filter(|l| !l.current_stage.is_known()).count(),
        "catalog listing loaded"
    );
    Ok(listings)
}

/// Fetch the material catalog once for derived option lists and BOM edits.
#[tracing::instrument(skip_all)]
pub async fn load_materials<S>(source: &S) -> Result<CatalogSnapshot, RemoteFailure>
where
    S: MaterialSource + ?Sized,
{
    let materials = source.list_materials().await.map_err(|err| {
        tracing::warn!(error = %err, "material list fetch failed");
        RemoteFailure::from(err)
    })?;
    Ok(CatalogSnapshot::new(materials))
}
