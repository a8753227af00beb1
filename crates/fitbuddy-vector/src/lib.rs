//! # fitbuddy-vector
//!
//! An embedded vector database for FitBuddy's document index: named
//! collections of fixed-dimension vectors with exact (exhaustive) similarity
//! search and JSON persistence.
//!
//! Document corpora behind a single assistant are small enough that an exact
//! scan is fast, and it keeps top-k results deterministic.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fitbuddy_vector::{Config, DistanceMetric, VectorDb};
//!
//! let db = VectorDb::open(Config::persistent("./chroma.db")).await?;
//! db.get_or_create_collection("fitness_docs", 768, DistanceMetric::Cosine).await?;
//! db.insert("fitness_docs", "chunk-0", &embedding, None).await?;
//! db.persist().await?;
//!
//! let hits = db.search("fitness_docs", &query, 5).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod collection;
pub mod config;
pub mod distance;
pub mod error;
pub mod persistence;
pub mod types;

pub use collection::Collection;
pub use config::Config;
pub use distance::DistanceMetric;
pub use error::{Error, Result};
pub use types::{MetadataValue, SearchResult, StoredVector, VectorId, VectorMetadata};

use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// The main vector database handle.
///
/// Cheap to clone; clones share the same collections. Collections live in an
/// `scc::HashMap`, which is safe to use across `.await` points.
#[derive(Clone)]
pub struct VectorDb {
    inner: Arc<VectorDbInner>,
}

struct VectorDbInner {
    config: Config,
    collections: scc::HashMap<String, Arc<Collection>>,
}

impl VectorDb {
    /// Open or create a vector database.
    ///
    /// For a persistent configuration the directory is created if needed and
    /// every collection listed in it is loaded. A collection that fails to load
    /// is skipped with a warning.
    #[instrument(skip(config), fields(persistent = config.is_persistent()))]
    pub async fn open(config: Config) -> Result<Self> {
        info!("Opening vector database");

        let db = Self {
            inner: Arc::new(VectorDbInner {
                config,
                collections: scc::HashMap::new(),
            }),
        };

        if let Some(path) = db.inner.config.data_path.clone() {
            tokio::fs::create_dir_all(&path).await?;
            for name in persistence::load_collection_names(&path).await? {
                match persistence::load_collection(&path, &name).await {
                    Ok(collection) => {
                        let _ = db.inner.collections.insert(name, Arc::new(collection));
                    }
                    Err(e) => warn!(name, error = %e, "Failed to load collection, skipping"),
                }
            }
        }

        Ok(db)
    }

    /// Create a new collection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CollectionExists`] if the name is taken.
    #[instrument(skip(self))]
    pub async fn create_collection(
        &self,
        name: &str,
        dimensions: usize,
        metric: DistanceMetric,
    ) -> Result<Arc<Collection>> {
        info!(name, dimensions, %metric, "Creating collection");

        let collection = Arc::new(Collection::new(name.to_string(), dimensions, metric)?);
        if self
            .inner
            .collections
            .insert(name.to_string(), collection.clone())
            .is_err()
        {
            return Err(Error::CollectionExists(name.to_string()));
        }

        self.persist_collection_names().await?;
        Ok(collection)
    }

    /// Return the named collection, creating it if it does not exist.
    ///
    /// An existing collection with different dimensions is an error.
    pub async fn get_or_create_collection(
        &self,
        name: &str,
        dimensions: usize,
        metric: DistanceMetric,
    ) -> Result<Arc<Collection>> {
        match self.get_collection(name) {
            Ok(existing) if existing.dimensions() != dimensions => Err(Error::DimensionMismatch {
                expected: existing.dimensions(),
                actual: dimensions,
            }),
            Ok(existing) => Ok(existing),
            Err(Error::CollectionNotFound(_)) => {
                match self.create_collection(name, dimensions, metric).await {
                    // Lost a creation race; the winner's collection is fine.
                    Err(Error::CollectionExists(_)) => self.get_collection(name),
                    other => other,
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Check if a collection exists.
    pub fn collection_exists(&self, name: &str) -> bool {
        self.inner.collections.contains(name)
    }

    /// List all collection names, sorted.
    pub fn list_collections(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.inner.collections.scan(|k, _| {
            names.push(k.clone());
        });
        names.sort();
        names
    }

    /// Get a handle to a collection.
    pub fn get_collection(&self, name: &str) -> Result<Arc<Collection>> {
        self.inner
            .collections
            .read(name, |_, v| v.clone())
            .ok_or_else(|| Error::CollectionNotFound(name.to_string()))
    }

    /// Insert (or replace) a vector in a collection.
    #[instrument(skip(self, vector, metadata), fields(dim = vector.len()))]
    pub async fn insert(
        &self,
        collection: &str,
        id: &str,
        vector: &[f32],
        metadata: Option<VectorMetadata>,
    ) -> Result<()> {
        let col = self.get_collection(collection)?;
        col.insert(id, vector, metadata)?;
        debug!("Inserted vector");
        Ok(())
    }

    /// Insert (or replace) multiple vectors in a collection.
    ///
    /// Returns the number of vectors written.
    #[instrument(skip(self, vectors))]
    pub async fn insert_batch<'a, I>(&self, collection: &str, vectors: I) -> Result<usize>
    where
        I: IntoIterator<Item = (&'a str, &'a [f32], Option<VectorMetadata>)>,
    {
        let col = self.get_collection(collection)?;
        let count = col.insert_batch(vectors)?;
        debug!(count, "Inserted batch");
        Ok(count)
    }

    /// Search for the `limit` most similar vectors, best first.
    #[instrument(skip(self, query), fields(dim = query.len()))]
    pub async fn search(
        &self,
        collection: &str,
        query: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let col = self.get_collection(collection)?;
        let results = col.search(query, limit)?;
        debug!(count = results.len(), "Search completed");
        Ok(results)
    }

    /// Get a vector and its metadata by ID.
    pub fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<(Vec<f32>, Option<VectorMetadata>)>> {
        Ok(self.get_collection(collection)?.get(id))
    }

    /// Get the number of vectors in a collection.
    pub fn count(&self, collection: &str) -> Result<usize> {
        Ok(self.get_collection(collection)?.len())
    }

    /// Write every collection to disk. No-op for in-memory databases.
    #[instrument(skip(self))]
    pub async fn persist(&self) -> Result<()> {
        let Some(path) = self.inner.config.data_path.as_deref() else {
            debug!("Skipping persist for in-memory database");
            return Ok(());
        };

        let mut to_persist: Vec<Arc<Collection>> = Vec::new();
        self.inner.collections.scan(|_, collection| {
            to_persist.push(collection.clone());
        });

        for collection in to_persist {
            persistence::save_collection(path, &collection).await?;
        }
        self.persist_collection_names().await
    }

    async fn persist_collection_names(&self) -> Result<()> {
        if let Some(path) = self.inner.config.data_path.as_deref() {
            persistence::save_collection_names(path, &self.list_collections()).await?;
        }
        Ok(())
    }
}
