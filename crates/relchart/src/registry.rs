use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::geom::{ChartPoint, Rect, point, size};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Table,
    TableGroup,
    Ref,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            EntityKind::Table => "table",
            EntityKind::TableGroup => "table group",
            EntityKind::Ref => "ref",
        })
    }
}

/// Entity addressed by kind plus its externally assigned id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: String,
}

impl EntityRef {
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

/// Placement of a table or table group on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for TableGeometry {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 200.0,
            height: 32.0,
        }
    }
}

impl TableGeometry {
    pub fn bounds(&self) -> Rect {
        Rect::new(point(self.x, self.y), size(self.width, self.height))
    }

    pub fn apply(&mut self, patch: TablePatch) {
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(width) = patch.width {
            self.width = width;
        }
        if let Some(height) = patch.height {
            self.height = height;
        }
    }
}

/// Partial update for a table or table group record; unset fields keep their
/// current values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct TablePatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// Routing state of a relationship reference.
///
/// `endpoints` are produced and consumed by the schema editor; this model
/// stores them verbatim and never looks inside. The optional rect fields are
/// filled in once the editor has measured the routed path; a record with all
/// four set participates in the content bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefGeometry {
    #[serde(default)]
    pub endpoints: Vec<Value>,
    #[serde(default)]
    pub vertices: Vec<ChartPoint>,
    /// Automatic routing; cleared once the user edits the polyline.
    #[serde(default = "default_auto")]
    pub auto: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

fn default_auto() -> bool {
    true
}

impl Default for RefGeometry {
    fn default() -> Self {
        Self {
            endpoints: Vec::new(),
            vertices: Vec::new(),
            auto: true,
            x: None,
            y: None,
            width: None,
            height: None,
        }
    }
}

impl RefGeometry {
    /// Measured bounds, present only when all four rect fields are set.
    pub fn bounds(&self) -> Option<Rect> {
        match (self.x, self.y, self.width, self.height) {
            (Some(x), Some(y), Some(width), Some(height)) => {
                Some(Rect::new(point(x, y), size(width, height)))
            }
            _ => None,
        }
    }

    pub fn apply(&mut self, patch: RefPatch) {
        if let Some(endpoints) = patch.endpoints {
            self.endpoints = endpoints;
        }
        if let Some(vertices) = patch.vertices {
            self.vertices = vertices;
        }
        if let Some(auto) = patch.auto {
            self.auto = auto;
        }
        if let Some(x) = patch.x {
            self.x = Some(x);
        }
        if let Some(y) = patch.y {
            self.y = Some(y);
        }
        if let Some(width) = patch.width {
            self.width = Some(width);
        }
        if let Some(height) = patch.height {
            self.height = Some(height);
        }
    }
}

/// Partial update for a reference record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RefPatch {
    pub endpoints: Option<Vec<Value>>,
    pub vertices: Option<Vec<ChartPoint>>,
    pub auto: Option<bool>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// Keyed record collection with lazy default materialization.
///
/// An id that was never written is not an error while a partially loaded
/// diagram renders: [`RecordMap::get_or_create`] stores and returns the
/// default record instead of failing. [`RecordMap::try_get`] is the pure
/// read, [`RecordMap::require`] the strict one.
#[derive(Debug, Clone)]
pub struct RecordMap<R> {
    kind: EntityKind,
    records: IndexMap<String, R>,
}

impl<R: Default> RecordMap<R> {
    fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            records: IndexMap::new(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Returns the record for `id`, creating and storing the default first if
    /// none exists. Idempotent after the first call for a given id.
    pub fn get_or_create(&mut self, id: &str) -> &mut R {
        self.records
            .entry(id.to_string())
            .or_insert_with(R::default)
    }

    /// Pure read; no record is materialized.
    pub fn try_get(&self, id: &str) -> Option<&R> {
        self.records.get(id)
    }

    /// Strict read; fails with [`Error::MissingEntity`] when `id` has no
    /// record.
    pub fn require(&self, id: &str) -> Result<&R> {
        self.records.get(id).ok_or_else(|| Error::MissingEntity {
            kind: self.kind,
            id: id.to_string(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &R)> {
        self.records.iter().map(|(id, record)| (id.as_str(), record))
    }

    pub fn values(&self) -> impl Iterator<Item = &R> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub(crate) fn replace_all(&mut self, records: IndexMap<String, R>) {
        self.records = records;
    }

    pub(crate) fn to_map(&self) -> IndexMap<String, R>
    where
        R: Clone,
    {
        self.records.clone()
    }
}

/// The three keyed entity collections backing the canvas. Records are
/// referentially stable once created; only a full session load rebuilds them.
#[derive(Debug, Clone)]
pub struct EntityRegistry {
    pub tables: RecordMap<TableGeometry>,
    pub table_groups: RecordMap<TableGeometry>,
    pub refs: RecordMap<RefGeometry>,
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self {
            tables: RecordMap::new(EntityKind::Table),
            table_groups: RecordMap::new(EntityKind::TableGroup),
            refs: RecordMap::new(EntityKind::Ref),
        }
    }
}

impl EntityRegistry {
    /// Merges `patch` into the existing-or-default table record.
    pub fn upsert_table(&mut self, id: &str, patch: TablePatch) {
        self.tables.get_or_create(id).apply(patch);
    }

    pub fn upsert_table_group(&mut self, id: &str, patch: TablePatch) {
        self.table_groups.get_or_create(id).apply(patch);
    }

    pub fn upsert_ref(&mut self, id: &str, patch: RefPatch) {
        self.refs.get_or_create(id).apply(patch);
    }
}
