//! Canvas variants and the per-target canvas catalog

use std::path::PathBuf;

use crate::constants::{OPAQUE_WHITE, VERTEX_CANVAS_NAME};
use crate::surface::PixelBuffer;
use crate::target::{Material, PropertyValue};
use crate::types::{Rgba, TextureDimension};

/// What kind of buffer a catalog entry addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanvasKind {
    Vertex,
    Raster(TextureDimension),
}

impl CanvasKind {
    pub fn is_raster(&self) -> bool {
        matches!(self, CanvasKind::Raster(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub kind: CanvasKind,
}

/// Addressable canvases of one target.
///
/// Entry zero is always the vertex-color pseudo-canvas; the rest are the
/// texture-valued material properties in declaration order. Names are unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasCatalog {
    entries: Vec<CatalogEntry>,
}

impl Default for CanvasCatalog {
    fn default() -> Self {
        Self {
            entries: vec![CatalogEntry {
                name: VERTEX_CANVAS_NAME.to_string(),
                kind: CanvasKind::Vertex,
            }],
        }
    }
}

impl CanvasCatalog {
    /// Collect texture-valued properties of a material
    pub fn scan(material: &Material) -> Self {
        let mut catalog = Self::default();
        for property in &material.properties {
            if let PropertyValue::Texture(slot) = &property.value {
                if catalog.get(&property.name).is_none() {
                    catalog.entries.push(CatalogEntry {
                        name: property.name.clone(),
                        kind: CanvasKind::Raster(slot.dimension),
                    });
                }
            }
        }
        catalog
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn vertex(&self) -> &CatalogEntry {
        &self.entries[0]
    }

    pub fn raster_count(&self) -> usize {
        self.entries.len() - 1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A 2D (or cube) texture canvas
#[derive(Debug, Clone, PartialEq)]
pub struct RasterCanvas {
    pub dimension: TextureDimension,
    pub pixels: PixelBuffer,
    /// Where the backing asset lives on disk, if it has been persisted
    pub path: Option<PathBuf>,
}

impl RasterCanvas {
    pub fn new(dimension: TextureDimension, pixels: PixelBuffer) -> Self {
        Self {
            dimension,
            pixels,
            path: None,
        }
    }

    /// Square canvas filled with one color; cube canvases get six faces
    pub fn filled(dimension: TextureDimension, resolution: u32, color: Rgba) -> Self {
        Self::new(
            dimension,
            PixelBuffer::filled(resolution, resolution, dimension.layer_count(), color),
        )
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Copy with the same size, dimension and content but no backing path
    pub fn duplicate(&self) -> Self {
        Self::new(self.dimension, self.pixels.clone())
    }
}

/// Per-vertex color buffer of a mesh
#[derive(Debug, Clone, PartialEq)]
pub struct VertexCanvas {
    pub colors: Vec<Rgba>,
}

impl VertexCanvas {
    pub fn filled(vertex_count: usize, color: Rgba) -> Self {
        Self {
            colors: vec![color; vertex_count],
        }
    }

    /// Copy of a mesh color buffer, opaque white where it is missing or short
    pub fn from_mesh_colors(colors: Option<&[Rgba]>, vertex_count: usize) -> Self {
        let mut out = Self::filled(vertex_count, OPAQUE_WHITE);
        if let Some(colors) = colors {
            for (dst, src) in out.colors.iter_mut().zip(colors) {
                *dst = *src;
            }
        }
        out
    }

    pub fn vertex_count(&self) -> usize {
        self.colors.len()
    }
}

/// Deep copy of a canvas buffer, stored by the undo history
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    Raster(PixelBuffer),
    Vertex(Vec<Rgba>),
}

impl Snapshot {
    pub fn is_raster(&self) -> bool {
        matches!(self, Snapshot::Raster(_))
    }

    pub fn kind(&self) -> HistoryKind {
        match self {
            Snapshot::Raster(_) => HistoryKind::Raster,
            Snapshot::Vertex(_) => HistoryKind::Vertex,
        }
    }

    /// Same shape, every element set to `color`
    pub fn filled_like(&self, color: Rgba) -> Self {
        match self {
            Snapshot::Raster(pixels) => Snapshot::Raster(PixelBuffer::filled(
                pixels.width(),
                pixels.height(),
                pixels.layers(),
                color,
            )),
            Snapshot::Vertex(colors) => Snapshot::Vertex(vec![color; colors.len()]),
        }
    }

    /// Whether `other` could replace this buffer in place
    pub fn same_shape(&self, other: &Snapshot) -> bool {
        match (self, other) {
            (Snapshot::Raster(a), Snapshot::Raster(b)) => a.same_dimensions(b),
            (Snapshot::Vertex(a), Snapshot::Vertex(b)) => a.len() == b.len(),
            _ => false,
        }
    }
}

/// Which snapshot sequence a canvas records into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryKind {
    Raster,
    Vertex,
}

impl From<CanvasKind> for HistoryKind {
    fn from(kind: CanvasKind) -> Self {
        match kind {
            CanvasKind::Vertex => HistoryKind::Vertex,
            CanvasKind::Raster(_) => HistoryKind::Raster,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_material_has_vertex_entry() {
        let catalog = CanvasCatalog::scan(&Material::default());
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.vertex().name, VERTEX_CANVAS_NAME);
        assert_eq!(catalog.vertex().kind, CanvasKind::Vertex);
    }

    #[test]
    fn test_scan_keeps_texture_properties() {
        let material = Material::default()
            .with_texture("_MainTex", TextureDimension::Flat, None)
            .with_property("_Color", PropertyValue::Color([1.0; 4]))
            .with_texture("_Sky", TextureDimension::Cube, None)
            .with_property("_Gloss", PropertyValue::Float(0.5))
            .with_texture("_MainTex", TextureDimension::Flat, None);

        let catalog = CanvasCatalog::scan(&material);
        let names: Vec<_> = catalog.names().collect();
        assert_eq!(names, vec![VERTEX_CANVAS_NAME, "_MainTex", "_Sky"]);
        assert_eq!(
            catalog.get("_Sky").unwrap().kind,
            CanvasKind::Raster(TextureDimension::Cube)
        );
        assert_eq!(catalog.raster_count(), 2);
    }

    #[test]
    fn test_vertex_canvas_defaults_to_white() {
        let canvas = VertexCanvas::from_mesh_colors(None, 3);
        assert_eq!(canvas.colors, vec![OPAQUE_WHITE; 3]);

        let short = [[0.0, 0.0, 0.0, 1.0]];
        let canvas = VertexCanvas::from_mesh_colors(Some(&short), 2);
        assert_eq!(canvas.colors, vec![[0.0, 0.0, 0.0, 1.0], OPAQUE_WHITE]);
    }

    #[test]
    fn test_cube_canvas_has_six_faces() {
        let canvas = RasterCanvas::filled(TextureDimension::Cube, 4, OPAQUE_WHITE);
        assert_eq!(canvas.pixels.layers(), 6);
        assert_eq!(canvas.pixels.pixel_count(), 4 * 4 * 6);
    }
}
