//! Data types for index interaction: similarity matches.

use serde::{Deserialize, Serialize};

/// A single similarity match returned by the index (ranked by score).
///
/// Serialized as-is into API responses: a match without metadata keeps the
/// key and carries `"metadata": null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryMatch {
    pub id: String,
    pub score: f32,

    /// Arbitrary per-record metadata stored alongside the vector.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}
