//! Brush compositing onto raster and vertex canvases
//!
//! Both paths share one weight model:
//!
//! ```text
//! coverage = falloff(distance / effective_radius)   (0 at or beyond the radius)
//! opacity  = blend * coverage * pressure?           (pressure only if Opacity is set)
//! ```
//!
//! The vertex path lerps each element toward the mode's candidate value; the
//! raster path evaluates the mode's blend factor pair per pixel. They agree in
//! intent, not bit for bit.

mod raster;
mod vertex;

use glam::Vec3;

use crate::brush::{BrushError, BrushState, ResolvedDab};
use crate::canvas::RasterCanvas;
use crate::surface::PixelBuffer;
use crate::target::MeshData;
use crate::types::{HitSample, Rgba};

pub use raster::{StampRegion, apply_raster};
pub use vertex::apply_vertex;

/// Mutable view of the canvas a dab lands on
pub enum CanvasMut<'a> {
    Raster(&'a mut RasterCanvas),
    Vertex {
        colors: &'a mut [Rgba],
        positions: &'a [Vec3],
        normals: &'a [Vec3],
    },
}

impl<'a> CanvasMut<'a> {
    /// View a mesh's working color buffer; None if no working copy exists
    pub fn vertex(mesh: &'a mut MeshData) -> Option<Self> {
        let MeshData {
            positions,
            normals,
            working_colors,
            ..
        } = mesh;
        let positions: &'a [Vec3] = positions;
        let normals: &'a [Vec3] = normals;
        working_colors.as_mut().map(|working| CanvasMut::Vertex {
            colors: &mut working.colors,
            positions,
            normals,
        })
    }
}

/// Composite one already-resolved dab. Returns how many elements received
/// a nonzero weight.
pub fn apply_dab(
    canvas: CanvasMut<'_>,
    hit: &HitSample,
    dab: &ResolvedDab,
    stamp: Option<&PixelBuffer>,
) -> usize {
    match canvas {
        CanvasMut::Raster(raster) => apply_raster(raster, hit, dab, stamp)
            .map(|region| region.touched)
            .unwrap_or(0),
        CanvasMut::Vertex {
            colors,
            positions,
            normals,
        } => apply_vertex(colors, positions, normals, hit, dab),
    }
}

/// Resolve the brush against `pressure` and composite it at `hit`.
///
/// Invalid parameters are rejected before any buffer is touched.
pub fn apply(
    canvas: CanvasMut<'_>,
    hit: &HitSample,
    brush: &BrushState,
    pressure: Option<f32>,
) -> Result<usize, BrushError> {
    let dab = brush.resolve(pressure)?;
    Ok(apply_dab(canvas, hit, &dab, brush.stamp.as_ref()))
}
