//! The bound paint target
//!
//! A [`SurfaceBinding`] owns the target being painted together with what is
//! derived from it on bind: the canvas catalog, the collision proxy and the
//! undo history. Dropping the binding releases all of it.

use glam::Affine3A;
use surface_paint_config::HistoryConfig;
use tracing::{debug, info};

use crate::canvas::CanvasCatalog;
use crate::history::UndoHistory;
use crate::lifecycle;
use crate::raycast::{ProxyGeometry, Ray};
use crate::target::{PaintTarget, TargetId};
use crate::types::HitSample;

#[derive(Debug)]
pub struct SurfaceBinding {
    target: PaintTarget,
    catalog: CanvasCatalog,
    proxy: ProxyGeometry,
    pub(crate) history: UndoHistory,
}

impl SurfaceBinding {
    /// Bind a target. Returns None (and hands nothing back) when the target
    /// has no triangles to hit.
    pub fn bind(
        mut target: PaintTarget,
        catalog: CanvasCatalog,
        history: &HistoryConfig,
    ) -> Option<Self> {
        if !target.is_drawable() {
            debug!("bind: '{}' is not drawable, keeping previous binding", target.name);
            return None;
        }
        let transform = target.transform;
        let mesh = target.mesh_mut()?;
        mesh.ensure_normals();
        let proxy = ProxyGeometry::from_mesh(mesh, transform);

        info!(
            "Bound '{}' ({} vertices, {} canvases)",
            target.name,
            proxy.vertex_count(),
            catalog.len()
        );
        Some(Self {
            target,
            catalog,
            proxy,
            history: UndoHistory::new(history),
        })
    }

    pub fn id(&self) -> TargetId {
        self.target.id
    }

    pub fn target(&self) -> &PaintTarget {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut PaintTarget {
        &mut self.target
    }

    pub fn catalog(&self) -> &CanvasCatalog {
        &self.catalog
    }

    pub fn history(&self) -> &UndoHistory {
        &self.history
    }

    /// Follow the target's world transform
    pub fn sync_transform(&mut self, transform: Affine3A) {
        self.target.transform = transform;
        self.proxy.sync_transform(transform);
    }

    /// Closest hit of a world-space ray, in target-local space
    pub fn project(&self, ray: &Ray) -> Option<HitSample> {
        self.proxy.raycast(ray)
    }

    /// Drop working copies and hand the target back to the host
    pub fn release(mut self) -> PaintTarget {
        lifecycle::release_all(&mut self.target);
        info!("Released '{}'", self.target.name);
        let Self { target, .. } = self;
        target
    }
}
