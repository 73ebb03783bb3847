//! Raster compositing: one stamp pass per dab

use glam::Vec2;
use tracing::debug;

use crate::brush::ResolvedDab;
use crate::canvas::RasterCanvas;
use crate::surface::{PixelBuffer, cube_face_uv};
use crate::types::{HitSample, TextureDimension};

/// Pixel rectangle a stamp pass covered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StampRegion {
    pub layer: u32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Pixels that received a nonzero weight
    pub touched: usize,
}

/// Locate the stamp center: layer plus pixel position.
///
/// Flat canvases address by UV with V pointing up; cube canvases address by
/// the hit's local position taken as a direction from the origin.
fn stamp_center(canvas: &RasterCanvas, hit: &HitSample) -> Option<(u32, Vec2)> {
    let size = Vec2::new(canvas.width() as f32, canvas.height() as f32);
    match canvas.dimension {
        TextureDimension::Flat => {
            Some((0, Vec2::new(hit.uv.x, 1.0 - hit.uv.y) * size))
        }
        TextureDimension::Cube => {
            let (face, uv) = cube_face_uv(hit.position)?;
            Some((face, uv * size))
        }
    }
}

/// Composite a dab onto a raster canvas.
///
/// The stamp is centered on the hit and spans `radius` UV units in each
/// direction. Inside that ellipse the weight is falloff coverage times the
/// stamp's alpha (when a stamp is set) times the brush color's alpha times
/// opacity; the stamp's color tints the brush color. Pixels are combined
/// with the mode's blend factor pair.
///
/// Returns None when the stamp misses the canvas entirely.
pub fn apply_raster(
    canvas: &mut RasterCanvas,
    hit: &HitSample,
    dab: &ResolvedDab,
    stamp: Option<&PixelBuffer>,
) -> Option<StampRegion> {
    let (layer, center) = stamp_center(canvas, hit)?;
    let width = canvas.width();
    let height = canvas.height();

    let radius_x = dab.radius * width as f32;
    let radius_y = dab.radius * height as f32;
    if radius_x <= 0.0 || radius_y <= 0.0 || dab.opacity <= 0.0 {
        return None;
    }

    let x_min = ((center.x - radius_x).floor().max(0.0) as u32).min(width);
    let y_min = ((center.y - radius_y).floor().max(0.0) as u32).min(height);
    let x_max = ((center.x + radius_x).ceil().max(0.0) as u32).min(width);
    let y_max = ((center.y + radius_y).ceil().max(0.0) as u32).min(height);

    if x_min >= x_max || y_min >= y_max {
        debug!("apply_raster: stamp outside canvas bounds");
        return None;
    }

    let mut touched = 0;
    for py in y_min..y_max {
        for px in x_min..x_max {
            // Stamp-space offset, unit circle at the brush edge
            let offset = Vec2::new(
                (px as f32 + 0.5 - center.x) / radius_x,
                (py as f32 + 0.5 - center.y) / radius_y,
            );
            let coverage = dab.coverage(offset.length() * dab.radius);
            if coverage <= 0.0 {
                continue;
            }

            let mut color = dab.color;
            let mut stamp_alpha = 1.0;
            if let Some(stamp) = stamp {
                let sample = stamp.sample(offset * 0.5 + Vec2::splat(0.5));
                color[0] *= sample[0];
                color[1] *= sample[1];
                color[2] *= sample[2];
                stamp_alpha = sample[3];
            }

            let weight = dab.opacity * coverage * stamp_alpha * color[3];
            if weight <= 0.0 {
                continue;
            }

            if let Some(dst) = canvas.pixels.get_pixel(layer, px, py) {
                let out = dab.ops.blend_pixel(dst, color, weight);
                canvas.pixels.set_pixel(layer, px, py, out);
                touched += 1;
            }
        }
    }

    let region = StampRegion {
        layer,
        x: x_min,
        y: y_min,
        width: x_max - x_min,
        height: y_max - y_min,
        touched,
    };
    debug!(
        "apply_raster: center=({:.1}, {:.1}) layer={} radius={:.1}px opacity={:.2} mode={:?} -> {} pixels",
        center.x, center.y, layer, radius_x, dab.opacity, dab.ops.mode, touched
    );
    Some(region)
}
