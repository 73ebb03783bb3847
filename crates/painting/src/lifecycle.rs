//! Working copies of canvases
//!
//! Painting never touches a canvas's original content. A working copy is
//! substituted into the target (the material slot for raster canvases, the
//! mesh's live color buffer for vertex canvases) and either promoted to the
//! new original on save or discarded on reset.

use std::path::Path;

use surface_paint_config::CanvasDefaults;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::canvas::{CanvasKind, CatalogEntry, RasterCanvas, Snapshot, VertexCanvas};
use crate::composite::CanvasMut;
use crate::constants::OPAQUE_WHITE;
use crate::persistence::{AssetPersistence, PersistError};
use crate::target::PaintTarget;
use crate::types::TextureDimension;

#[derive(Debug, Error)]
pub enum PromoteError {
    #[error("No canvas is being painted")]
    NotPainting,

    #[error("Canvas '{0}' not found on target")]
    UnknownCanvas(String),

    #[error("Canvas '{0}' has no working copy to save")]
    NoWorkingCopy(String),

    #[error("Canvas '{0}' has no destination path")]
    NoDestination(String),

    #[error("Failed to persist canvas: {0}")]
    Persist(#[from] PersistError),
}

fn default_resolution(dimension: TextureDimension, defaults: &CanvasDefaults) -> u32 {
    match dimension {
        TextureDimension::Flat => defaults.flat_resolution,
        TextureDimension::Cube => defaults.cube_resolution,
    }
}

/// Create the working copy of a canvas, tearing down any existing one first.
///
/// Returns false if the target has no such canvas.
pub fn begin_working_copy(
    target: &mut PaintTarget,
    entry: &CatalogEntry,
    defaults: &CanvasDefaults,
) -> bool {
    if reset(target, entry) {
        debug!("begin_working_copy: replaced existing copy of '{}'", entry.name);
    }

    match entry.kind {
        CanvasKind::Vertex => {
            let Some(mesh) = target.mesh_mut() else {
                return false;
            };
            let count = mesh.vertex_count();
            mesh.working_colors = Some(VertexCanvas::from_mesh_colors(
                mesh.colors.as_deref(),
                count,
            ));
            debug!("Vertex working copy: {} vertices", count);
            true
        }
        CanvasKind::Raster(_) => {
            let Some(slot) = target.material.texture_slot_mut(&entry.name) else {
                return false;
            };
            let working = match &slot.texture {
                Some(texture) => texture.duplicate(),
                None => RasterCanvas::filled(
                    slot.dimension,
                    default_resolution(slot.dimension, defaults),
                    OPAQUE_WHITE,
                ),
            };
            debug!(
                "Raster working copy '{}': {}x{} {:?}",
                entry.name,
                working.width(),
                working.height(),
                working.dimension
            );
            slot.working = Some(working);
            true
        }
    }
}

pub fn has_working_copy(target: &PaintTarget, entry: &CatalogEntry) -> bool {
    match entry.kind {
        CanvasKind::Vertex => target.mesh().is_some_and(|m| m.working_colors.is_some()),
        CanvasKind::Raster(_) => target
            .material
            .texture_slot(&entry.name)
            .is_some_and(|s| s.working.is_some()),
    }
}

/// Discard the working copy so the original shows again.
///
/// Returns true if a copy existed.
pub fn reset(target: &mut PaintTarget, entry: &CatalogEntry) -> bool {
    match entry.kind {
        CanvasKind::Vertex => target
            .mesh_mut()
            .and_then(|m| m.working_colors.take())
            .is_some(),
        CanvasKind::Raster(_) => target
            .material
            .texture_slot_mut(&entry.name)
            .and_then(|s| s.working.take())
            .is_some(),
    }
}

/// Drop every working copy on the target
pub fn release_all(target: &mut PaintTarget) {
    let mut released = 0;
    if let Some(mesh) = target.mesh_mut() {
        released += usize::from(mesh.working_colors.take().is_some());
    }
    for property in &mut target.material.properties {
        if let crate::target::PropertyValue::Texture(slot) = &mut property.value {
            released += usize::from(slot.working.take().is_some());
        }
    }
    if released > 0 {
        debug!("Released {} working copies of '{}'", released, target.name);
    }
}

/// Persist the working copy and make it the canvas's new original.
///
/// Raster canvases go through `persistence` to `destination`; vertex canvases
/// adopt the working colors directly. On failure the working copy is kept so
/// the caller can retry.
pub fn promote(
    target: &mut PaintTarget,
    entry: &CatalogEntry,
    destination: &Path,
    persistence: &mut dyn AssetPersistence,
) -> Result<(), PromoteError> {
    match entry.kind {
        CanvasKind::Vertex => {
            let mesh = target
                .mesh_mut()
                .ok_or_else(|| PromoteError::UnknownCanvas(entry.name.clone()))?;
            let working = mesh
                .working_colors
                .take()
                .ok_or_else(|| PromoteError::NoWorkingCopy(entry.name.clone()))?;
            mesh.colors = Some(working.colors);
            info!("Promoted vertex colors of '{}'", target.name);
            Ok(())
        }
        CanvasKind::Raster(_) => {
            let slot = target
                .material
                .texture_slot_mut(&entry.name)
                .ok_or_else(|| PromoteError::UnknownCanvas(entry.name.clone()))?;
            let working = slot
                .working
                .as_ref()
                .ok_or_else(|| PromoteError::NoWorkingCopy(entry.name.clone()))?;

            let persisted = persistence
                .write_image(destination, working)
                .inspect_err(|e| {
                    warn!("Saving '{}' failed, keeping working copy: {}", entry.name, e)
                })?;
            slot.texture = Some(persisted);
            slot.working = None;
            info!("Promoted '{}' to {}", entry.name, destination.display());
            Ok(())
        }
    }
}

/// Deep copy of the working buffer
pub fn working_snapshot(target: &PaintTarget, entry: &CatalogEntry) -> Option<Snapshot> {
    match entry.kind {
        CanvasKind::Vertex => target
            .mesh()?
            .working_colors
            .as_ref()
            .map(|w| Snapshot::Vertex(w.colors.clone())),
        CanvasKind::Raster(_) => target
            .material
            .texture_slot(&entry.name)?
            .working
            .as_ref()
            .map(|w| Snapshot::Raster(w.pixels.clone())),
    }
}

/// Content the canvas had before any editing, if it has any
pub fn original_snapshot(target: &PaintTarget, entry: &CatalogEntry) -> Option<Snapshot> {
    match entry.kind {
        CanvasKind::Vertex => {
            let mesh = target.mesh()?;
            let colors = mesh.colors.as_deref()?;
            Some(Snapshot::Vertex(
                VertexCanvas::from_mesh_colors(Some(colors), mesh.vertex_count()).colors,
            ))
        }
        CanvasKind::Raster(_) => target
            .material
            .texture_slot(&entry.name)?
            .texture
            .as_ref()
            .map(|t| Snapshot::Raster(t.pixels.clone())),
    }
}

/// Overwrite the working buffer in place. Returns false if there is no
/// working copy or the snapshot has a different shape.
pub fn write_working(target: &mut PaintTarget, entry: &CatalogEntry, snapshot: &Snapshot) -> bool {
    let written = match (entry.kind, snapshot) {
        (CanvasKind::Vertex, Snapshot::Vertex(colors)) => target
            .mesh_mut()
            .and_then(|m| m.working_colors.as_mut())
            .map(|working| {
                let fits = working.colors.len() == colors.len();
                if fits {
                    working.colors.copy_from_slice(colors);
                }
                fits
            }),
        (CanvasKind::Raster(_), Snapshot::Raster(pixels)) => target
            .material
            .texture_slot_mut(&entry.name)
            .and_then(|s| s.working.as_mut())
            .map(|working| {
                let fits = working.pixels.same_dimensions(pixels);
                if fits {
                    working.pixels.pixels_mut().copy_from_slice(pixels.pixels());
                }
                fits
            }),
        _ => Some(false),
    };

    match written {
        Some(true) => true,
        Some(false) => {
            warn!(
                "Snapshot shape does not match working copy of '{}', ignoring",
                entry.name
            );
            false
        }
        None => false,
    }
}

/// Mutable view of the working buffer for compositing
pub fn working_canvas_mut<'a>(
    target: &'a mut PaintTarget,
    entry: &CatalogEntry,
) -> Option<CanvasMut<'a>> {
    match entry.kind {
        CanvasKind::Vertex => CanvasMut::vertex(target.mesh_mut()?),
        CanvasKind::Raster(_) => target
            .material
            .texture_slot_mut(&entry.name)?
            .working
            .as_mut()
            .map(CanvasMut::Raster),
    }
}
