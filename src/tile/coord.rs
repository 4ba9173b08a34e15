//! Tile coordinates, transform rules and storage-key construction.
//!
//! Storage keys follow a fixed layout inside the bucket:
//!
//! ```text
//! {map}/{style}/{level}/{col}/{row}.png    - tile imagery
//! {map}/{config}.json                      - map configuration documents
//! {map}/{style}/{transform}.json           - style-scoped transform rules
//! {map}/{transform}.json                   - map-scoped transform rules
//! ```

use serde::{Deserialize, Deserializer};

use crate::error::ResolveError;

// =============================================================================
// TileCoordinate
// =============================================================================

/// A parsed tile request coordinate.
///
/// Built once per request from the URL path and never mutated; applying a
/// transform yields a new coordinate. `level`, `col` and `row` are signed:
/// a transform can legitimately push them negative, and negative values flow
/// into the storage key unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileCoordinate {
    /// Map namespace (top-level prefix in the store)
    pub map: String,

    /// Named visual variant of the map's tile set
    pub style: String,

    /// Zoom level
    pub level: i64,

    /// Grid column
    pub col: i64,

    /// Grid row
    pub row: i64,
}

impl TileCoordinate {
    /// Apply a transform rule, yielding the coordinate of the underlying
    /// source tile.
    ///
    /// The column/row scale factor uses the already-updated level, not the
    /// requested one; the ordering of these three assignments is load-bearing.
    pub fn transformed(self, rule: &TransformRule) -> Self {
        let level = self.level - rule.level;
        Self {
            col: self.col - (level + 1) * rule.col,
            row: self.row - (level + 1) * rule.row,
            level,
            ..self
        }
    }

    /// Storage key of the tile object.
    pub fn storage_key(&self) -> String {
        format!(
            "{}/{}/{}/{}/{}.png",
            self.map, self.style, self.level, self.col, self.row
        )
    }
}

// =============================================================================
// TransformRule
// =============================================================================

/// A coordinate remapping rule loaded from a transform object.
///
/// The JSON document carries numeric `level`, `col` and `row` fields. Any JSON
/// number is accepted and truncated toward zero; a missing or non-numeric
/// field fails deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TransformRule {
    #[serde(deserialize_with = "truncate_number")]
    pub level: i64,

    #[serde(deserialize_with = "truncate_number")]
    pub col: i64,

    #[serde(deserialize_with = "truncate_number")]
    pub row: i64,
}

fn truncate_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    Ok(value as i64)
}

// =============================================================================
// Key Construction
// =============================================================================

/// Storage key of a map configuration object.
pub fn config_key(map: &str, config: &str) -> String {
    format!("{}/{}.json", map, config)
}

/// Storage key of a transform object, scoped to a style when one is given.
pub fn transform_key(map: &str, style: Option<&str>, name: &str) -> String {
    match style {
        Some(style) => format!("{}/{}/{}.json", map, style, name),
        None => format!("{}/{}.json", map, name),
    }
}

/// Validate a text segment before it participates in a storage key.
///
/// Segments come straight from the URL; an empty segment or a traversal token
/// must never reach key construction.
pub fn validate_segment(segment: &str) -> Result<(), ResolveError> {
    if segment.is_empty() || segment == "." || segment == ".." {
        return Err(ResolveError::InvalidSegment {
            segment: segment.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
