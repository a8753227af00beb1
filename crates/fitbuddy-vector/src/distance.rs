//! Similarity metric used to rank stored vectors against a query.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Metric a collection ranks its vectors with.
///
/// Exposed as a similarity where **higher is closer**, so search results can
/// always be sorted in descending score order. Recorded in each collection's
/// persisted metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Cosine of the angle between two vectors, in `[-1, 1]`.
    #[default]
    Cosine,
}

impl DistanceMetric {
    /// Similarity between two vectors of equal length.
    #[inline]
    pub fn similarity(&self, a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

        match self {
            DistanceMetric::Cosine => cosine_similarity(a, b),
        }
    }

    /// Stable name used in persisted metadata.
    pub fn name(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "cosine",
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[inline]
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let (dot, norm_a, norm_b) = a
        .iter()
        .zip(b)
        .fold((0.0f32, 0.0f32, 0.0f32), |(dot, na, nb), (x, y)| {
            (dot + x * y, na + x * x, nb + y * y)
        });

    let denom = (norm_a * norm_b).sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical() {
        let sim = DistanceMetric::Cosine.similarity(&[1.0, 0.0, 0.0], &[2.0, 0.0, 0.0]);
        assert!((sim - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_orthogonal() {
        let sim = DistanceMetric::Cosine.similarity(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]);
        assert!(sim.abs() < 0.0001);
    }

    #[test]
    fn test_cosine_zero_vector() {
        let sim = DistanceMetric::Cosine.similarity(&[0.0, 0.0], &[1.0, 1.0]);
        assert_eq!(sim, 0.0);
    }

    #[test]
    fn test_metric_persists_by_name() {
        let json = serde_json::to_value(DistanceMetric::Cosine).unwrap();
        assert_eq!(json, serde_json::json!("cosine"));
        assert_eq!(DistanceMetric::Cosine.to_string(), "cosine");
    }
}
