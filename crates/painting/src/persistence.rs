//! Persisting raster working copies
//!
//! Saving a raster canvas hands its working buffer to an [`AssetPersistence`]
//! backend, which writes it and returns the reloaded canvas that becomes the
//! slot's new original.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::canvas::RasterCanvas;
use crate::surface::PixelBuffer;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Canvas has no pixels to write")]
    EmptyBuffer,

    #[error("Reloaded image has unexpected size {width}x{height}")]
    UnexpectedSize { width: u32, height: u32 },
}

/// Image storage used by save / save-as
pub trait AssetPersistence {
    /// Write `canvas` to `path` and return the re-loaded result
    fn write_image(&mut self, path: &Path, canvas: &RasterCanvas)
    -> Result<RasterCanvas, PersistError>;
}

/// Writes 8-bit RGBA PNG files. Cube faces are stacked vertically.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngPersistence;

impl AssetPersistence for PngPersistence {
    fn write_image(
        &mut self,
        path: &Path,
        canvas: &RasterCanvas,
    ) -> Result<RasterCanvas, PersistError> {
        let pixels = &canvas.pixels;
        if pixels.pixel_count() == 0 {
            return Err(PersistError::EmptyBuffer);
        }

        let stacked_height = pixels.height() * pixels.layers();
        let image = image::RgbaImage::from_raw(pixels.width(), stacked_height, pixels.to_rgba8())
            .ok_or(PersistError::EmptyBuffer)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        image.save_with_format(path, image::ImageFormat::Png)?;
        info!(
            "Wrote {}x{} ({} layer) canvas to {}",
            pixels.width(),
            pixels.height(),
            pixels.layers(),
            path.display()
        );

        let reloaded = image::open(path)?.to_rgba8();
        let (width, height) = reloaded.dimensions();
        if width != pixels.width() || height != stacked_height {
            return Err(PersistError::UnexpectedSize { width, height });
        }
        let buffer = PixelBuffer::from_rgba8(width, pixels.height(), pixels.layers(), reloaded.as_raw())
            .ok_or(PersistError::UnexpectedSize { width, height })?;

        Ok(RasterCanvas::new(canvas.dimension, buffer).with_path(path))
    }
}

/// Keeps written canvases in memory, keyed by path
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    images: HashMap<PathBuf, PixelBuffer>,
    /// When set, every write fails with an I/O error
    pub fail_writes: bool,
}

impl MemoryPersistence {
    /// Store that rejects every write
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Default::default()
        }
    }

    pub fn get(&self, path: &Path) -> Option<&PixelBuffer> {
        self.images.get(path)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl AssetPersistence for MemoryPersistence {
    fn write_image(
        &mut self,
        path: &Path,
        canvas: &RasterCanvas,
    ) -> Result<RasterCanvas, PersistError> {
        if self.fail_writes {
            return Err(PersistError::Io(std::io::Error::other("writes disabled")));
        }
        if canvas.pixels.pixel_count() == 0 {
            return Err(PersistError::EmptyBuffer);
        }
        debug!("MemoryPersistence: stored {}", path.display());
        self.images.insert(path.to_path_buf(), canvas.pixels.clone());
        Ok(RasterCanvas::new(canvas.dimension, canvas.pixels.clone()).with_path(path))
    }
}
