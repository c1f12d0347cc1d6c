//! Save/load boundary shapes.
//!
//! The storage mechanics (file, HTTP, browser storage) belong to the
//! surrounding shell; this module pins the JSON shape that round-trips
//! through it.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::geom::{ChartPoint, Transform, transform_parts};
use crate::grid::GridConfig;
use crate::registry::{RefGeometry, TableGeometry};

/// Persisted projection of a chart session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedChart {
    pub zoom: f64,
    pub pan: ChartPoint,
    #[serde(with = "transform_parts")]
    pub transform: Transform,
    /// May be stale relative to `transform` in saved data (the two are saved
    /// independently); always recomputed on load.
    #[serde(with = "transform_parts")]
    pub inverse_transform: Transform,
    #[serde(default)]
    pub tables: IndexMap<String, TableGeometry>,
    #[serde(default)]
    pub refs: IndexMap<String, RefGeometry>,
    /// Absent in older saves; defaults apply.
    #[serde(default)]
    pub grid: GridConfig,
}

/// Minimal shape of the database description handed over by the schema
/// parser. Only `schemas[0]` is consumed; multi-schema diagrams are
/// unsupported.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DatabaseSummary {
    #[serde(default)]
    pub schemas: Vec<SchemaSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaSummary {
    #[serde(default)]
    pub table_groups: Vec<EntityIdRef>,
    #[serde(default)]
    pub tables: Vec<EntityIdRef>,
    #[serde(default)]
    pub refs: Vec<EntityIdRef>,
}

/// Id-only projection of a parser entity; every other parser field is
/// irrelevant to geometry and ignored on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EntityIdRef {
    pub id: String,
}
