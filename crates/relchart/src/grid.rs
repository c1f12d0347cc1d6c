use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::geom::{Point, point};

const DEFAULT_DIVISIONS: NonZeroU32 = NonZeroU32::new(10).unwrap();

/// Background grid configuration. Set once at session start, edited rarely
/// through user preferences, never removed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Major cell size in world units.
    pub size: f64,
    pub divisions: NonZeroU32,
    /// Snap increment for dragged geometry; `<= 0` disables snapping.
    pub snap: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: 100.0,
            divisions: DEFAULT_DIVISIONS,
            snap: 5.0,
        }
    }
}

impl GridConfig {
    /// Derived on every call so a config edit is visible immediately.
    pub fn sub_grid_size(&self) -> f64 {
        self.size / f64::from(self.divisions.get())
    }

    pub fn snap_value(&self, value: f64) -> f64 {
        if self.snap <= 0.0 {
            return value;
        }
        (value / self.snap).round() * self.snap
    }

    pub fn snap_point(&self, p: Point) -> Point {
        point(self.snap_value(p.x), self.snap_value(p.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_grid_size_tracks_config_edits() {
        let mut grid = GridConfig::default();
        assert_eq!(grid.sub_grid_size(), 10.0);

        grid.size = 80.0;
        grid.divisions = NonZeroU32::new(4).unwrap();
        assert_eq!(grid.sub_grid_size(), 20.0);
    }

    #[test]
    fn snapping_rounds_to_the_increment() {
        let grid = GridConfig::default();
        assert_eq!(grid.snap_value(12.4), 10.0);
        assert_eq!(grid.snap_value(12.6), 15.0);
        assert_eq!(grid.snap_point(point(-2.4, 97.5)), point(0.0, 100.0));
    }

    #[test]
    fn zero_snap_disables_snapping() {
        let grid = GridConfig {
            snap: 0.0,
            ..GridConfig::default()
        };
        assert_eq!(grid.snap_value(12.4), 12.4);
    }
}
