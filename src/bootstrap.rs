//! Startup initialization of the data directory
//!
//! `<root>/metadata.json` may list cache documents in a `filepaths` array;
//! each listed document that is missing is created as `{}` so feature code
//! can read it right away.

use serde_json::Value;
use tokio::fs;
use tracing::{info, warn};

use crate::store::{DocumentStore, StoreError, StoreResult, ROOT_MARKER};

/// Logical name of the metadata document
pub fn metadata_name() -> String {
    format!("{}metadata", ROOT_MARKER)
}

/// What bootstrap found and did
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Whether `metadata.json` was present
    pub metadata_found: bool,
    /// Documents created because they did not exist yet
    pub created: Vec<String>,
    /// Documents listed in metadata that already existed
    pub existing: Vec<String>,
}

/// Prepare the data directory and seed cache documents
pub async fn bootstrap(store: &DocumentStore) -> StoreResult<BootstrapReport> {
    let data_dir = store.config().data_dir();
    fs::create_dir_all(&data_dir)
        .await
        .map_err(|e| StoreError::io(&data_dir, e))?;

    let mut report = BootstrapReport::default();
    let metadata = metadata_name();

    if !store.exists(&metadata).await {
        warn!(target: "init", "No metadata.json file detected!");
        return Ok(report);
    }
    report.metadata_found = true;

    let data = store.try_read(&metadata).await?;
    let filepaths = match data.get("filepaths") {
        Some(Value::Array(entries)) => entries,
        _ => {
            warn!(target: "init", "metadata.json has no 'filepaths' array");
            return Ok(report);
        }
    };

    for entry in filepaths {
        let Some(name) = entry.as_str() else {
            warn!(target: "init", "Skipping non-string filepath entry: {}", entry);
            continue;
        };

        if store.exists(name).await {
            report.existing.push(name.to_string());
        } else {
            // read() creates the missing document as {}
            store.try_read(name).await?;
            report.created.push(name.to_string());
        }
    }

    info!(
        target: "init",
        "Cache files written successfully ({} created, {} existing)",
        report.created.len(),
        report.existing.len()
    );
    Ok(report)
}
