//! Persistence layer for fitbuddy-vector.
//!
//! Layout under the database directory:
//!
//! ```text
//! collections.json            names of all collections
//! {name}/metadata.json        dimensions, metric, timestamps
//! {name}/vectors.json         stored vectors in insertion order
//! ```

use crate::collection::Collection;
use crate::distance::DistanceMetric;
use crate::error::{Error, Result};
use crate::types::StoredVector;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

const COLLECTIONS_FILE: &str = "collections.json";
const METADATA_FILE: &str = "metadata.json";
const VECTORS_FILE: &str = "vectors.json";

/// Collection metadata stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CollectionMetadata {
    name: String,
    dimensions: usize,
    metric: DistanceMetric,
    vector_count: usize,
    saved_at: DateTime<Utc>,
}

/// Read the list of persisted collection names. A missing file means none.
pub async fn load_collection_names(base_path: &Path) -> Result<Vec<String>> {
    let path = base_path.join(COLLECTIONS_FILE);
    if !tokio::fs::try_exists(&path).await? {
        return Ok(Vec::new());
    }

    let data = tokio::fs::read_to_string(&path).await?;
    serde_json::from_str(&data)
        .map_err(|e| Error::Persistence(format!("Failed to parse {}: {}", COLLECTIONS_FILE, e)))
}

/// Write the list of collection names.
pub async fn save_collection_names(base_path: &Path, names: &[String]) -> Result<()> {
    tokio::fs::create_dir_all(base_path).await?;
    let data = serde_json::to_string_pretty(names)
        .map_err(|e| Error::Persistence(format!("Failed to serialize collections: {}", e)))?;
    write_atomic(&base_path.join(COLLECTIONS_FILE), data.as_bytes()).await
}

/// Save a collection's metadata and vectors.
pub async fn save_collection(base_path: &Path, collection: &Collection) -> Result<()> {
    let collection_path = base_path.join(collection.name());
    tokio::fs::create_dir_all(&collection_path).await?;

    let vectors = collection.export_all();
    let metadata = CollectionMetadata {
        name: collection.name().to_string(),
        dimensions: collection.dimensions(),
        metric: collection.metric(),
        vector_count: vectors.len(),
        saved_at: Utc::now(),
    };

    let metadata_json = serde_json::to_string_pretty(&metadata)
        .map_err(|e| Error::Persistence(format!("Failed to serialize metadata: {}", e)))?;
    let vectors_json = serde_json::to_string(&vectors)
        .map_err(|e| Error::Persistence(format!("Failed to serialize vectors: {}", e)))?;

    write_atomic(&collection_path.join(VECTORS_FILE), vectors_json.as_bytes()).await?;
    write_atomic(&collection_path.join(METADATA_FILE), metadata_json.as_bytes()).await?;

    info!(
        name = collection.name(),
        count = vectors.len(),
        path = ?collection_path,
        "Saved collection"
    );
    Ok(())
}

/// Load a collection from disk.
pub async fn load_collection(base_path: &Path, name: &str) -> Result<Collection> {
    let collection_path = base_path.join(name);
    let metadata_path = collection_path.join(METADATA_FILE);

    if !tokio::fs::try_exists(&metadata_path).await? {
        return Err(Error::CollectionNotFound(name.to_string()));
    }

    let metadata_json = tokio::fs::read_to_string(&metadata_path).await?;
    let metadata: CollectionMetadata = serde_json::from_str(&metadata_json)
        .map_err(|e| Error::Persistence(format!("Failed to parse metadata: {}", e)))?;

    let collection = Collection::new(metadata.name.clone(), metadata.dimensions, metadata.metric)?;

    let vectors_path = collection_path.join(VECTORS_FILE);
    if tokio::fs::try_exists(&vectors_path).await? {
        let vectors_json = tokio::fs::read_to_string(&vectors_path).await?;
        let vectors: Vec<StoredVector> = serde_json::from_str(&vectors_json)
            .map_err(|e| Error::Persistence(format!("Failed to parse vectors: {}", e)))?;

        let count = collection.insert_batch(
            vectors
                .iter()
                .map(|v| (v.id.as_str(), v.vector.as_slice(), v.metadata.clone())),
        )?;
        debug!(name, count, "Loaded vectors");
    }

    info!(name, dimensions = metadata.dimensions, "Loaded collection");
    Ok(collection)
}

/// Write through a sibling temp file so a crash never leaves a torn file.
async fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, data).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
