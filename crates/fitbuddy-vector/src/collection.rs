//! Vector collection.
//!
//! A collection is a named container for vectors with a fixed dimensionality
//! and distance metric. Search is exhaustive, so results are exact.

use crate::distance::DistanceMetric;
use crate::error::{Error, Result};
use crate::types::{SearchResult, StoredVector, VectorMetadata};
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::HashMap;

/// A named collection of vectors.
pub struct Collection {
    name: String,
    dimensions: usize,
    metric: DistanceMetric,
    entries: RwLock<Entries>,
}

/// Insertion-ordered records plus an id index into them.
#[derive(Default)]
struct Entries {
    positions: HashMap<String, usize>,
    records: Vec<StoredVector>,
}

impl Collection {
    /// Create a new, empty collection.
    pub fn new(name: String, dimensions: usize, metric: DistanceMetric) -> Result<Self> {
        if dimensions == 0 {
            return Err(Error::InvalidVector("Dimensions must be > 0".to_string()));
        }

        Ok(Self {
            name,
            dimensions,
            metric,
            entries: RwLock::new(Entries::default()),
        })
    }

    /// Get the collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the vector dimensions.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Get the distance metric.
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Get the number of vectors in the collection.
    pub fn len(&self) -> usize {
        self.entries.read().records.len()
    }

    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().records.is_empty()
    }

    /// Insert a vector, replacing any existing vector with the same id.
    pub fn insert(&self, id: &str, vector: &[f32], metadata: Option<VectorMetadata>) -> Result<()> {
        self.validate(vector)?;

        let mut entries = self.entries.write();
        entries.upsert(StoredVector {
            id: id.to_string(),
            vector: vector.to_vec(),
            metadata,
        });
        Ok(())
    }

    /// Insert multiple vectors. All are validated before any is written.
    pub fn insert_batch<'a, I>(&self, vectors: I) -> Result<usize>
    where
        I: IntoIterator<Item = (&'a str, &'a [f32], Option<VectorMetadata>)>,
    {
        let batch: Vec<_> = vectors.into_iter().collect();
        for (_, vector, _) in &batch {
            self.validate(vector)?;
        }

        let mut entries = self.entries.write();
        let count = batch.len();
        for (id, vector, metadata) in batch {
            entries.upsert(StoredVector {
                id: id.to_string(),
                vector: vector.to_vec(),
                metadata,
            });
        }
        Ok(count)
    }

    /// Return the `limit` closest vectors, best first.
    ///
    /// Ties keep insertion order.
    pub fn search(&self, query: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        self.validate(query)?;
        if limit == 0 {
            return Ok(Vec::new());
        }

        let entries = self.entries.read();
        let mut scored: Vec<(usize, f32)> = entries
            .records
            .iter()
            .enumerate()
            .map(|(pos, record)| (pos, self.metric.similarity(query, &record.vector)))
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(limit);

        Ok(scored
            .into_iter()
            .map(|(pos, score)| {
                let record = &entries.records[pos];
                SearchResult {
                    id: record.id.clone(),
                    score,
                    metadata: record.metadata.clone(),
                }
            })
            .collect())
    }

    /// Get a vector by ID.
    pub fn get(&self, id: &str) -> Option<(Vec<f32>, Option<VectorMetadata>)> {
        let entries = self.entries.read();
        entries
            .positions
            .get(id)
            .map(|&pos| &entries.records[pos])
            .map(|record| (record.vector.clone(), record.metadata.clone()))
    }

    /// Snapshot all stored vectors in insertion order.
    pub fn export_all(&self) -> Vec<StoredVector> {
        self.entries.read().records.clone()
    }

    fn validate(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimensions {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions,
                actual: vector.len(),
            });
        }
        if vector.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidVector(
                "Vector contains NaN or infinite values".to_string(),
            ));
        }
        Ok(())
    }
}

impl Entries {
    fn upsert(&mut self, record: StoredVector) {
        match self.positions.get(&record.id) {
            Some(&pos) => self.records[pos] = record,
            None => {
                self.positions.insert(record.id.clone(), self.records.len());
                self.records.push(record);
            }
        }
    }
}
