#![forbid(unsafe_code)]

//! Headless state model for an interactive entity-relationship diagram
//! editor.
//!
//! The crate owns the viewport transform (raw pan/zoom plus the CTM pair),
//! the geometry records of tables, table groups and relationship references,
//! the background grid configuration and the single on-canvas tooltip. A
//! rendering layer paints from this state each frame and forwards
//! pointer/gesture events back into it; parsing schemas and storing the
//! persisted shape are the surrounding shell's jobs.

pub mod error;
pub mod geom;
pub mod grid;
pub mod persist;
pub mod registry;
pub mod tooltip;
pub mod viewport;

pub use error::{Error, Result};
pub use grid::GridConfig;
pub use persist::{DatabaseSummary, EntityIdRef, PersistedChart, SchemaSummary};
pub use registry::{
    EntityKind, EntityRef, EntityRegistry, RecordMap, RefGeometry, RefPatch, TableGeometry,
    TablePatch,
};
pub use tooltip::{ComponentHandle, TooltipState, TooltipTarget};
pub use viewport::Viewport;

use serde_json::Value;
use tracing::debug;

use crate::geom::{ChartPoint, Point, Rect, Size, Transform, point, size};

/// Options for content-bounds aggregation.
///
/// Table groups are excluded by default; set `include_table_groups` when
/// group frames should count as content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FitOptions {
    pub include_table_groups: bool,
}

impl FitOptions {
    pub fn with_table_groups() -> Self {
        Self {
            include_table_groups: true,
        }
    }
}

/// State of one open diagram.
///
/// Construct one session per open diagram; two sessions never share mutable
/// state. All mutations are synchronous and applied in event-delivery order.
/// The tooltip's component handle is an `Rc`, so a session stays on the
/// thread that created it.
#[derive(Debug, Clone, Default)]
pub struct ChartSession {
    viewport: Viewport,
    registry: EntityRegistry,
    grid: GridConfig,
    tooltip: TooltipState,
    loaded: bool,
}

impl ChartSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut EntityRegistry {
        &mut self.registry
    }

    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut GridConfig {
        &mut self.grid
    }

    pub fn tooltip(&self) -> &TooltipState {
        &self.tooltip
    }

    /// True once a database description has been absorbed; cleared only by a
    /// full [`ChartSession::load`].
    pub fn loaded(&self) -> bool {
        self.loaded
    }

    pub fn pan(&self) -> Point {
        self.viewport.pan()
    }

    pub fn zoom(&self) -> f64 {
        self.viewport.zoom()
    }

    pub fn ctm(&self) -> &Transform {
        self.viewport.ctm()
    }

    pub fn inverse_ctm(&self) -> &Transform {
        self.viewport.inverse_ctm()
    }

    /// Replaces the raw pan input without touching the CTM pair; see
    /// [`Viewport::set_pan`] for the consistency caveat.
    pub fn update_pan(&mut self, pan: Point) {
        self.viewport.set_pan(pan);
    }

    /// Replaces the raw zoom input only. Same caveat as
    /// [`ChartSession::update_pan`].
    pub fn update_zoom(&mut self, zoom: f64) {
        self.viewport.set_zoom(zoom);
    }

    /// Authoritative transform update: forward and inverse change together
    /// or, on a singular matrix, not at all.
    pub fn update_ctm(&mut self, ctm: Transform) -> Result<()> {
        self.viewport.set_ctm(ctm)
    }

    /// Pan/zoom update that keeps the CTM pair in sync.
    pub fn update_pan_zoom(&mut self, pan: Point, zoom: f64) -> Result<()> {
        self.viewport.set_pan_zoom(pan, zoom)
    }

    pub fn show_tooltip(
        &mut self,
        target: TooltipTarget,
        component: ComponentHandle,
        binds: Option<Value>,
    ) {
        self.tooltip.show(target, component, binds);
    }

    pub fn hide_tooltip(&mut self) {
        self.tooltip.hide();
    }

    /// Ensures a geometry record exists for every table group, table and ref
    /// in the first schema of `database`. Additive: records for entities the
    /// database no longer mentions stay in place. `loaded` is set even when
    /// the schema is empty or missing.
    pub fn load_database(&mut self, database: &DatabaseSummary) {
        if let Some(schema) = database.schemas.first() {
            for group in &schema.table_groups {
                self.registry.table_groups.get_or_create(&group.id);
            }
            for table in &schema.tables {
                self.registry.tables.get_or_create(&table.id);
            }
            for reference in &schema.refs {
                self.registry.refs.get_or_create(&reference.id);
            }
            debug!(
                table_groups = schema.table_groups.len(),
                tables = schema.tables.len(),
                refs = schema.refs.len(),
                "absorbed database schema"
            );
        }
        self.loaded = true;
    }

    /// Full reset to `state`, discarding everything this session held.
    ///
    /// The persisted inverse transform is ignored and recomputed from the
    /// forward transform, so the CTM invariant holds even for saves whose
    /// matrices drifted apart. A singular forward transform fails the load
    /// before any existing state is dropped. Table groups, the tooltip and
    /// the `loaded` flag are not part of the persisted shape and come back
    /// empty.
    pub fn load(&mut self, state: PersistedChart) -> Result<()> {
        let inverse_ctm = viewport::invert(&state.transform)?;

        *self = Self::default();
        self.viewport =
            Viewport::restore(state.zoom, state.pan.to_point(), state.transform, inverse_ctm);
        self.registry.tables.replace_all(state.tables);
        self.registry.refs.replace_all(state.refs);
        self.grid = state.grid;
        debug!(
            tables = self.registry.tables.len(),
            refs = self.registry.refs.len(),
            "loaded persisted chart"
        );
        Ok(())
    }

    /// Projection of the state that round-trips through external storage.
    pub fn save(&self) -> PersistedChart {
        PersistedChart {
            zoom: self.viewport.zoom(),
            pan: ChartPoint::from_point(self.viewport.pan()),
            transform: *self.viewport.ctm(),
            inverse_transform: *self.viewport.inverse_ctm(),
            tables: self.registry.tables.to_map(),
            refs: self.registry.refs.to_map(),
            grid: self.grid,
        }
    }

    /// Union bounding box of the current content; the zero rect when nothing
    /// qualifies.
    pub fn bounding_box(&self, options: FitOptions) -> Rect {
        self.content_bounds(options)
            .unwrap_or_else(|| Rect::new(point(0.0, 0.0), size(0.0, 0.0)))
    }

    /// Computes the zoom/pan that makes the content bounding box fill a
    /// `viewport`-sized view and applies them through
    /// [`ChartSession::update_zoom`] and [`ChartSession::update_pan`].
    /// Leaves the state untouched when the registry holds no content.
    pub fn zoom_to_fit(&mut self, viewport: Size, options: FitOptions) -> Result<()> {
        let Some(bbox) = self.content_bounds(options) else {
            debug!("zoom_to_fit skipped: no content");
            return Ok(());
        };
        if bbox.size.width == 0.0 || bbox.size.height == 0.0 {
            return Err(Error::DegenerateBoundingBox {
                width: bbox.size.width,
                height: bbox.size.height,
            });
        }

        let scale = (viewport.width / bbox.size.width).min(viewport.height / bbox.size.height);
        self.update_zoom(scale);
        self.update_pan(point(
            (viewport.width - bbox.origin.x * scale) / 2.0,
            (viewport.height - bbox.origin.y * scale) / 2.0,
        ));
        debug!(scale, "fitted content to viewport");
        Ok(())
    }

    fn content_bounds(&self, options: FitOptions) -> Option<Rect> {
        let mut rects = self
            .registry
            .tables
            .values()
            .map(TableGeometry::bounds)
            .collect::<Vec<_>>();
        if options.include_table_groups {
            rects.extend(self.registry.table_groups.values().map(TableGeometry::bounds));
        }
        rects.extend(self.registry.refs.values().filter_map(RefGeometry::bounds));

        let mut rects = rects.into_iter();
        let first = rects.next()?;
        let mut min = first.origin;
        let mut max = first.origin + first.size;
        for rect in rects {
            min = min.min(rect.origin);
            max = max.max(rect.origin + rect.size);
        }
        Some(Rect::new(min, (max - min).to_size()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TablePatch;

    fn session_with_table(id: &str, x: f64, y: f64, width: f64, height: f64) -> ChartSession {
        let mut session = ChartSession::new();
        session.registry_mut().upsert_table(
            id,
            TablePatch {
                x: Some(x),
                y: Some(y),
                width: Some(width),
                height: Some(height),
            },
        );
        session
    }

    #[test]
    fn zoom_to_fit_matches_the_worked_example() {
        let mut session = session_with_table("users", 0.0, 0.0, 200.0, 100.0);
        session
            .zoom_to_fit(size(800.0, 600.0), FitOptions::default())
            .unwrap();

        assert_eq!(session.zoom(), 4.0);
        assert_eq!(session.pan(), point(400.0, 300.0));
    }

    #[test]
    fn zoom_to_fit_on_an_empty_registry_is_a_no_op() {
        let mut session = ChartSession::new();
        session.update_zoom(2.5);
        session.update_pan(point(11.0, 22.0));

        session
            .zoom_to_fit(size(800.0, 600.0), FitOptions::default())
            .unwrap();

        assert_eq!(session.zoom(), 2.5);
        assert_eq!(session.pan(), point(11.0, 22.0));
    }

    #[test]
    fn zoom_to_fit_rejects_a_degenerate_box_before_dividing() {
        let mut session = session_with_table("users", 5.0, 5.0, 0.0, 40.0);
        session.update_zoom(1.5);

        let err = session
            .zoom_to_fit(size(800.0, 600.0), FitOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::DegenerateBoundingBox { width, .. } if width == 0.0));
        // Failed fits leave zoom/pan untouched.
        assert_eq!(session.zoom(), 1.5);
    }

    #[test]
    fn bounding_box_aggregates_tables() {
        let mut session = session_with_table("a", 0.0, 0.0, 100.0, 50.0);
        session.registry_mut().upsert_table(
            "b",
            TablePatch {
                x: Some(200.0),
                y: Some(100.0),
                width: Some(50.0),
                height: Some(50.0),
            },
        );

        let bbox = session.bounding_box(FitOptions::default());
        assert_eq!(bbox.origin, point(0.0, 0.0));
        assert_eq!(bbox.size, size(250.0, 150.0));
    }

    #[test]
    fn bounding_box_is_zero_without_content() {
        let session = ChartSession::new();
        let bbox = session.bounding_box(FitOptions::default());
        assert_eq!(bbox.origin, point(0.0, 0.0));
        assert_eq!(bbox.size, size(0.0, 0.0));
    }

    #[test]
    fn table_groups_only_count_when_asked_for() {
        let mut session = session_with_table("users", 0.0, 0.0, 100.0, 50.0);
        session.registry_mut().upsert_table_group(
            "auth",
            TablePatch {
                x: Some(-50.0),
                y: Some(-50.0),
                width: Some(400.0),
                height: Some(300.0),
            },
        );

        let without = session.bounding_box(FitOptions::default());
        assert_eq!(without.size, size(100.0, 50.0));

        let with = session.bounding_box(FitOptions::with_table_groups());
        assert_eq!(with.origin, point(-50.0, -50.0));
        assert_eq!(with.size, size(400.0, 300.0));
    }

    #[test]
    fn refs_with_measured_bounds_join_the_box() {
        let mut session = session_with_table("users", 0.0, 0.0, 100.0, 50.0);
        session.registry_mut().upsert_ref(
            "fk",
            RefPatch {
                x: Some(200.0),
                y: Some(100.0),
                width: Some(50.0),
                height: Some(50.0),
                ..RefPatch::default()
            },
        );
        // A second, unmeasured ref contributes nothing.
        session.registry_mut().refs.get_or_create("fk_other");

        let bbox = session.bounding_box(FitOptions::default());
        assert_eq!(bbox.size, size(250.0, 150.0));
    }

    #[test]
    fn load_database_is_additive_and_sets_loaded() {
        let mut session = ChartSession::new();
        session.registry_mut().upsert_table(
            "legacy",
            TablePatch {
                x: Some(500.0),
                ..TablePatch::default()
            },
        );

        let database: DatabaseSummary = serde_json::from_value(serde_json::json!({
            "schemas": [
                {
                    "tableGroups": [{ "id": "auth" }],
                    "tables": [{ "id": "users" }, { "id": "orders" }],
                    "refs": [{ "id": "fk_orders_users" }],
                },
                // A second schema is ignored.
                { "tables": [{ "id": "shadow" }] },
            ]
        }))
        .unwrap();

        session.load_database(&database);

        assert!(session.loaded());
        assert_eq!(session.registry().tables.len(), 3);
        assert!(session.registry().tables.try_get("legacy").is_some());
        assert!(session.registry().tables.try_get("shadow").is_none());
        assert_eq!(session.registry().table_groups.len(), 1);
        assert_eq!(session.registry().refs.len(), 1);
        // Materialized records carry the defaults until the editor moves them.
        assert_eq!(
            *session.registry().tables.try_get("users").unwrap(),
            TableGeometry::default()
        );
    }

    #[test]
    fn load_database_with_no_schemas_still_marks_loaded() {
        let mut session = ChartSession::new();
        session.load_database(&DatabaseSummary::default());
        assert!(session.loaded());
        assert!(session.registry().tables.is_empty());
    }

    #[test]
    fn loading_twice_keeps_existing_records_idempotent() {
        let mut session = ChartSession::new();
        let database: DatabaseSummary = serde_json::from_value(serde_json::json!({
            "schemas": [{ "tables": [{ "id": "users" }] }]
        }))
        .unwrap();

        session.load_database(&database);
        session.registry_mut().upsert_table(
            "users",
            TablePatch {
                x: Some(77.0),
                ..TablePatch::default()
            },
        );
        session.load_database(&database);

        assert_eq!(session.registry().tables.len(), 1);
        assert_eq!(session.registry().tables.try_get("users").unwrap().x, 77.0);
    }
}
