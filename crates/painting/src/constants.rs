use crate::types::Rgba;

/// Catalog name of the per-vertex color pseudo-canvas. Always entry zero.
pub const VERTEX_CANVAS_NAME: &str = "Vertex Colors";

/// Neutral canvas content when no original exists.
pub const OPAQUE_WHITE: Rgba = [1.0, 1.0, 1.0, 1.0];

/// Number of faces stored by a cube canvas.
pub const CUBE_FACE_COUNT: u32 = 6;

/// Epsilon for ray intersection and direction length tests.
pub const EPSILON: f32 = 1e-6;
