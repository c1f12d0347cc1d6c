#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

pub type Unit = euclid::UnknownUnit;

pub type Point = euclid::Point2D<f64, Unit>;
pub type Vector = euclid::Vector2D<f64, Unit>;
pub type Size = euclid::Size2D<f64, Unit>;
pub type Rect = euclid::Rect<f64, Unit>;
pub type Transform = euclid::Transform2D<f64, Unit, Unit>;

pub fn point(x: f64, y: f64) -> Point {
    euclid::point2(x, y)
}

pub fn vector(x: f64, y: f64) -> Vector {
    euclid::vec2(x, y)
}

pub fn size(width: f64, height: f64) -> Size {
    euclid::size2(width, height)
}

/// Serde-facing point. Math paths use [`Point`]; this type pins the
/// `{"x": .., "y": ..}` wire shape of persisted pans and routed vertices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
}

impl ChartPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_point(self) -> Point {
        point(self.x, self.y)
    }

    pub fn from_point(p: Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

/// `[a, b, c, d, e, f]` in the standard 2D affine convention:
/// `x' = a*x + c*y + e`, `y' = b*x + d*y + f`.
pub fn transform_to_parts(m: &Transform) -> [f64; 6] {
    m.to_array()
}

pub fn transform_from_parts(parts: [f64; 6]) -> Transform {
    let [a, b, c, d, e, f] = parts;
    Transform::new(a, b, c, d, e, f)
}

/// Persists a [`Transform`] as its 6-element array.
pub mod transform_parts {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{Transform, transform_from_parts, transform_to_parts};

    pub fn serialize<S: Serializer>(m: &Transform, serializer: S) -> Result<S::Ok, S::Error> {
        transform_to_parts(m).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Transform, D::Error> {
        let parts = <[f64; 6]>::deserialize(deserializer)?;
        Ok(transform_from_parts(parts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parts_round_trip_preserves_the_affine_convention() {
        let m = transform_from_parts([2.0, 0.0, 0.0, 2.0, 7.0, -3.0]);
        // x' = a*x + c*y + e
        let p = m.transform_point(point(1.0, 1.0));
        assert_eq!((p.x, p.y), (9.0, -1.0));
        assert_eq!(transform_to_parts(&m), [2.0, 0.0, 0.0, 2.0, 7.0, -3.0]);
    }
}
