use crate::registry::EntityKind;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("transform is singular (zero determinant) and has no inverse")]
    SingularTransform,

    #[error("content bounding box is degenerate ({width}x{height}); nothing to fit")]
    DegenerateBoundingBox { width: f64, height: f64 },

    #[error("no {kind} record with id `{id}`")]
    MissingEntity { kind: EntityKind, id: String },
}
