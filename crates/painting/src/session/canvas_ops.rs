//! Canvas selection, reset and save

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::canvas::CanvasKind;
use crate::lifecycle::{self, PromoteError};
use crate::persistence::AssetPersistence;

use super::PainterSession;

impl PainterSession {
    /// Start painting on a named canvas of the bound target.
    ///
    /// Switching canvases discards the previous canvas's working copy. An
    /// existing working copy of the requested canvas is kept, so stopping
    /// and restarting does not lose unsaved paint.
    pub fn start_painting(&mut self, canvas: &str) -> bool {
        let Some(entry) = self.catalog().and_then(|c| c.get(canvas)).cloned() else {
            debug!("start_painting: no canvas named '{}'", canvas);
            return false;
        };

        if self.active.as_ref() != Some(&entry) {
            self.end_stroke();
            self.clear_transient();
            if let (Some(binding), Some(previous)) = (self.binding.as_mut(), self.active.take()) {
                lifecycle::reset(binding.target_mut(), &previous);
            }
            info!("Painting on '{}'", entry.name);
            self.active = Some(entry);
        }
        self.ensure_working_copy()
    }

    /// Alias of [`start_painting`](Self::start_painting) for canvas pickers
    pub fn select_canvas(&mut self, canvas: &str) -> bool {
        self.start_painting(canvas)
    }

    /// Stop routing pointer input to the canvas. The working copy stays
    /// substituted until it is saved, reset or replaced.
    pub fn stop_painting(&mut self) {
        self.end_stroke();
        self.clear_transient();
        if let Some(entry) = self.active.take() {
            debug!("Stopped painting on '{}'", entry.name);
        }
    }

    /// Throw away unsaved paint on the active canvas
    pub fn reset_canvas(&mut self) -> bool {
        self.end_stroke();
        self.clear_transient();
        let (Some(binding), Some(entry)) = (self.binding.as_mut(), self.active.as_ref()) else {
            return false;
        };
        let had_copy = lifecycle::reset(binding.target_mut(), entry);
        info!("Reset '{}'", entry.name);
        had_copy
    }

    /// Save the active canvas to where its original came from
    pub fn save(&mut self, persistence: &mut dyn AssetPersistence) -> Result<(), PromoteError> {
        let destination = self.default_destination()?;
        self.save_as(&destination, persistence)
    }

    /// Save the active canvas to `destination` and make it the new original
    pub fn save_as(
        &mut self,
        destination: &Path,
        persistence: &mut dyn AssetPersistence,
    ) -> Result<(), PromoteError> {
        self.end_stroke();
        self.clear_preview();
        let (Some(binding), Some(entry)) = (self.binding.as_mut(), self.active.as_ref()) else {
            return Err(PromoteError::NotPainting);
        };
        lifecycle::promote(binding.target_mut(), entry, destination, persistence)?;
        // The next sample starts a fresh working copy from the saved content
        self.baseline = None;
        Ok(())
    }

    fn default_destination(&self) -> Result<PathBuf, PromoteError> {
        let entry = self.active.as_ref().ok_or(PromoteError::NotPainting)?;
        match entry.kind {
            CanvasKind::Vertex => Ok(PathBuf::new()),
            CanvasKind::Raster(_) => self
                .target()
                .and_then(|t| t.material.texture_slot(&entry.name))
                .and_then(|slot| slot.texture.as_ref())
                .and_then(|texture| texture.path.clone())
                .ok_or_else(|| PromoteError::NoDestination(entry.name.clone())),
        }
    }
}
