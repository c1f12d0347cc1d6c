use crate::error::{Error, Result};
use crate::geom::{Point, Transform, point};

/// Builds the device transform for a raw pan/zoom pair: scale by `zoom`,
/// then translate by `pan`. Uniform scale only today; the full affine
/// representation leaves room for rotation/skew later.
pub fn compose_pan_zoom(pan: Point, zoom: f64) -> Transform {
    Transform::scale(zoom, zoom).then_translate(pan.to_vector())
}

pub fn invert(m: &Transform) -> Result<Transform> {
    m.inverse().ok_or(Error::SingularTransform)
}

/// Viewport transform state.
///
/// `ctm` and `inverse_ctm` are the authoritative device<->world mapping read
/// by rendering and hit-testing; they are only ever written together. `zoom`
/// and `pan` are raw gesture inputs that may be updated on their own for UI
/// feedback and must not be treated as the geometry source of truth.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    zoom: f64,
    pan: Point,
    ctm: Transform,
    inverse_ctm: Transform,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: point(0.0, 0.0),
            ctm: Transform::identity(),
            inverse_ctm: Transform::identity(),
        }
    }
}

impl Viewport {
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> Point {
        self.pan
    }

    pub fn ctm(&self) -> &Transform {
        &self.ctm
    }

    pub fn inverse_ctm(&self) -> &Transform {
        &self.inverse_ctm
    }

    /// Replaces `pan` only; the CTM pair is left untouched. Follow up with
    /// [`Viewport::set_ctm`], or use [`Viewport::set_pan_zoom`], when the
    /// matrices must track the change.
    pub fn set_pan(&mut self, pan: Point) {
        self.pan = pan;
    }

    /// Replaces `zoom` only. Same caveat as [`Viewport::set_pan`].
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom;
    }

    /// Sets the forward CTM and recomputes the inverse. A singular matrix is
    /// rejected and the previous pair is retained.
    pub fn set_ctm(&mut self, ctm: Transform) -> Result<()> {
        let inverse_ctm = invert(&ctm)?;
        self.ctm = ctm;
        self.inverse_ctm = inverse_ctm;
        Ok(())
    }

    /// Updates pan, zoom and the CTM pair as one step.
    pub fn set_pan_zoom(&mut self, pan: Point, zoom: f64) -> Result<()> {
        self.set_ctm(compose_pan_zoom(pan, zoom))?;
        self.pan = pan;
        self.zoom = zoom;
        Ok(())
    }

    pub fn to_device(&self, world: Point) -> Point {
        self.ctm.transform_point(world)
    }

    pub fn to_world(&self, device: Point) -> Point {
        self.inverse_ctm.transform_point(device)
    }

    pub(crate) fn restore(zoom: f64, pan: Point, ctm: Transform, inverse_ctm: Transform) -> Self {
        Self {
            zoom,
            pan,
            ctm,
            inverse_ctm,
        }
    }
}
