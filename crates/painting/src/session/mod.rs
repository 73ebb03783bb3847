//! Painter session
//!
//! [`PainterSession`] is the single object a host drives. It owns:
//! - the brush configuration
//! - the surface binding (target, catalog, collision proxy, undo history)
//! - the active canvas and its pre-stroke baseline
//! - stroke state across pointer events
//!
//! All operations are synchronous and run on the host's interaction loop.

mod canvas_ops;
mod stroke;
mod undo;

use glam::{Vec2, Vec3};
use surface_paint_config::PainterConfig;
use tracing::debug;

use crate::binding::SurfaceBinding;
use crate::brush::{BrushState, DirectionEncoder};
use crate::canvas::{CanvasCatalog, CanvasKind, CatalogEntry, Snapshot};
use crate::target::{PaintTarget, TargetProvider};
use crate::types::HitSample;
use crate::view::ViewContext;

pub use stroke::PointerResponse;

/// Whether a stroke is open and whether it has changed anything yet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StrokeSession {
    pub active: bool,
    /// Set by the first sample that touches the canvas, cleared on commit
    pub dirty: bool,
}

/// World-space brush outline for the host to draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushCursor {
    pub position: Vec3,
    pub normal: Vec3,
    pub radius: f32,
}

pub struct PainterSession {
    pub(crate) config: PainterConfig,
    pub(crate) brush: BrushState,
    pub(crate) binding: Option<SurfaceBinding>,
    /// Canvas being painted; None until painting starts
    pub(crate) active: Option<CatalogEntry>,
    pub(crate) stroke: StrokeSession,
    /// Content of the active canvas at the start of the current stroke
    pub(crate) baseline: Option<Snapshot>,
    /// Whether the live buffer currently shows a hover preview
    pub(crate) preview_shown: bool,
    pub(crate) direction: DirectionEncoder,
}

impl Default for PainterSession {
    fn default() -> Self {
        Self::new(PainterConfig::default())
    }
}

impl PainterSession {
    pub fn new(config: PainterConfig) -> Self {
        Self {
            brush: BrushState::from_defaults(&config.brush),
            config,
            binding: None,
            active: None,
            stroke: StrokeSession::default(),
            baseline: None,
            preview_shown: false,
            direction: DirectionEncoder::default(),
        }
    }

    pub fn config(&self) -> &PainterConfig {
        &self.config
    }

    pub fn brush(&self) -> &BrushState {
        &self.brush
    }

    pub fn brush_mut(&mut self) -> &mut BrushState {
        &mut self.brush
    }

    pub fn binding(&self) -> Option<&SurfaceBinding> {
        self.binding.as_ref()
    }

    /// The bound target, including any substituted working copies
    pub fn target(&self) -> Option<&PaintTarget> {
        self.binding.as_ref().map(|b| b.target())
    }

    pub fn catalog(&self) -> Option<&CanvasCatalog> {
        self.binding.as_ref().map(|b| b.catalog())
    }

    pub fn active_canvas(&self) -> Option<&CatalogEntry> {
        self.active.as_ref()
    }

    pub fn stroke(&self) -> StrokeSession {
        self.stroke
    }

    pub fn is_painting(&self) -> bool {
        self.active.is_some()
    }

    /// Rebind if the provider's selection differs from the bound target.
    ///
    /// Returns true when a new target was bound. An empty selection keeps
    /// the current binding.
    pub fn sync_selection(&mut self, provider: &dyn TargetProvider) -> bool {
        let Some(selected) = provider.selected() else {
            return false;
        };
        if self.binding.as_ref().is_some_and(|b| b.id() == selected) {
            return false;
        }
        let Some(target) = provider.fetch(selected) else {
            debug!("sync_selection: target {:?} unavailable", selected);
            return false;
        };
        let catalog = provider.catalog(&target);
        self.bind(target, catalog)
    }

    /// Bind a target, releasing the previous one.
    ///
    /// A target without triangles is ignored and the previous binding stays.
    pub fn bind(&mut self, target: PaintTarget, catalog: CanvasCatalog) -> bool {
        let Some(binding) = SurfaceBinding::bind(target, catalog, &self.config.history) else {
            return false;
        };
        self.release();
        self.binding = Some(binding);
        true
    }

    /// Release the bound target and hand it back, working copies dropped
    pub fn release(&mut self) -> Option<PaintTarget> {
        self.clear_transient();
        self.active = None;
        self.binding.take().map(SurfaceBinding::release)
    }

    /// Scene teardown: drop the binding together with its undo history
    pub fn close_scene(&mut self) {
        if let Some(target) = self.release() {
            debug!("Scene closed, discarded '{}'", target.name);
        }
    }

    /// Resolve a pointer position to a surface hit.
    ///
    /// The binding follows the provider's current transform for the target
    /// before the ray is cast.
    pub fn project(
        &mut self,
        pointer: Vec2,
        view: &dyn ViewContext,
        provider: Option<&dyn TargetProvider>,
    ) -> Option<HitSample> {
        let binding = self.binding.as_mut()?;
        if let Some(transform) = provider.and_then(|p| p.transform(binding.id())) {
            binding.sync_transform(transform);
        }
        let ray = view.ray_through(pointer)?;
        binding.project(&ray)
    }

    /// Outline of the brush under the pointer, in world space
    pub fn brush_cursor(
        &mut self,
        pointer: Vec2,
        view: &dyn ViewContext,
        provider: Option<&dyn TargetProvider>,
    ) -> Option<BrushCursor> {
        let hit = self.project(pointer, view, provider)?;
        let target = self.target()?;
        let transform = target.transform;

        let radius = match self.active.as_ref().map(|e| e.kind) {
            Some(CanvasKind::Vertex) => {
                let m = transform.matrix3;
                let scale = m.x_axis.length().max(m.y_axis.length()).max(m.z_axis.length());
                self.brush.radius * scale
            }
            _ => self.brush.radius * target.world_extents()?.y,
        };

        Some(BrushCursor {
            position: transform.transform_point3(hit.position),
            normal: transform.transform_vector3(hit.normal).normalize_or_zero(),
            radius,
        })
    }

    /// Forget per-stroke state, rolling back any preview first
    pub(crate) fn clear_transient(&mut self) {
        self.clear_preview();
        self.stroke = StrokeSession::default();
        self.baseline = None;
        self.direction.reset();
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use glam::{Affine3A, Vec2, Vec3};

    use crate::raycast::Ray;
    use crate::target::{Drawable, Material, MeshData, PaintTarget, TargetId};
    use crate::types::TextureDimension;
    use crate::view::ViewContext;

    /// Orthographic view looking down -Z: pointer (x, y) maps to world (x, y)
    pub struct OrthoView;

    impl ViewContext for OrthoView {
        fn ray_through(&self, pointer: Vec2) -> Option<Ray> {
            Some(Ray::new(pointer.extend(5.0), Vec3::NEG_Z))
        }
    }

    /// View that never produces a ray
    pub struct BlindView;

    impl ViewContext for BlindView {
        fn ray_through(&self, _pointer: Vec2) -> Option<Ray> {
            None
        }
    }

    /// 2x2 quad at z = 0 facing +Z with UVs spanning [0, 1]
    pub fn quad_target(id: u64) -> PaintTarget {
        let mesh = MeshData::new(
            vec![
                Vec3::new(-1.0, -1.0, 0.0),
                Vec3::new(1.0, -1.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(-1.0, 1.0, 0.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
        )
        .with_uvs(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ]);
        let material = Material::default().with_texture("_MainTex", TextureDimension::Flat, None);
        PaintTarget::new(TargetId(id), format!("quad-{id}"), Drawable::Mesh(mesh))
            .with_material(material)
            .with_transform(Affine3A::IDENTITY)
    }
}
