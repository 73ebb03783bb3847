//! Per-vertex compositing

use glam::Vec3;
use tracing::debug;

use crate::brush::ResolvedDab;
use crate::types::{HitSample, Rgba};

/// Blend a dab into a vertex color buffer.
///
/// Distance is measured in target-local space and compared squared against
/// the radius. Vertices whose normal faces away from the hit normal are
/// skipped so paint does not bleed through thin or folded geometry. Colors
/// accumulate on the live buffer across samples of a stroke.
///
/// Returns the number of vertices that received a nonzero weight.
pub fn apply_vertex(
    colors: &mut [Rgba],
    positions: &[Vec3],
    normals: &[Vec3],
    hit: &HitSample,
    dab: &ResolvedDab,
) -> usize {
    let radius_sq = dab.radius * dab.radius;
    let mut touched = 0;

    for (i, (color, position)) in colors.iter_mut().zip(positions).enumerate() {
        let dist_sq = position.distance_squared(hit.position);
        if dist_sq >= radius_sq {
            continue;
        }
        if let Some(normal) = normals.get(i) {
            if normal.dot(hit.normal) < 0.0 {
                continue;
            }
        }

        let opacity = dab.opacity_at(dist_sq.sqrt());
        if opacity <= 0.0 {
            continue;
        }

        *color = dab.ops.blend_element(*color, dab.color, opacity);
        touched += 1;
    }

    debug!(
        "apply_vertex: hit=({:.3}, {:.3}, {:.3}), radius={:.3}, opacity={:.2}, mode={:?} -> {} vertices",
        hit.position.x, hit.position.y, hit.position.z, dab.radius, dab.opacity, dab.ops.mode, touched
    );

    touched
}
