//! Paint targets as supplied by the host
//!
//! A [`PaintTarget`] is the drawable the user selected: its geometry, world
//! transform and material. Working copies of canvases are substituted into
//! the target itself (material slot or mesh color buffer) so whatever the
//! host renders from the target shows live edits.

use glam::{Affine3A, Vec2, Vec3};

use crate::canvas::{CanvasCatalog, RasterCanvas, VertexCanvas};
use crate::types::{Rgba, TextureDimension};

/// Host identifier of a drawable object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub u64);

/// Triangle mesh geometry with optional per-vertex attributes
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    /// Same length as positions, or empty
    pub normals: Vec<Vec3>,
    /// Same length as positions, or empty
    pub uvs: Vec<Vec2>,
    /// Three indices per triangle
    pub indices: Vec<u32>,
    /// Persisted per-vertex colors
    pub colors: Option<Vec<Rgba>>,
    /// Working copy substituted as the live color buffer while painting
    pub working_colors: Option<VertexCanvas>,
}

impl MeshData {
    /// Build a mesh from positions and triangles; normals are derived
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        let mut mesh = Self {
            positions,
            indices,
            ..Default::default()
        };
        mesh.ensure_normals();
        mesh
    }

    /// Build the planar mesh of a sprite (z = 0, facing -Z)
    pub fn from_sprite(vertices: &[Vec2], uvs: &[Vec2], triangles: &[u16]) -> Self {
        Self {
            positions: vertices.iter().map(|v| v.extend(0.0)).collect(),
            normals: vec![Vec3::NEG_Z; vertices.len()],
            uvs: uvs.to_vec(),
            indices: triangles.iter().map(|&t| t as u32).collect(),
            ..Default::default()
        }
    }

    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Self {
        self.normals = normals;
        self.ensure_normals();
        self
    }

    pub fn with_uvs(mut self, uvs: Vec<Vec2>) -> Self {
        self.uvs = uvs;
        self
    }

    pub fn with_colors(mut self, colors: Vec<Rgba>) -> Self {
        self.colors = Some(colors);
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Replace missing or mismatched normals with area-weighted face normals
    pub fn ensure_normals(&mut self) {
        if self.normals.len() == self.positions.len() {
            return;
        }
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            if a >= normals.len() || b >= normals.len() || c >= normals.len() {
                continue;
            }
            // Unnormalized cross product weights by triangle area
            let face = (self.positions[b] - self.positions[a])
                .cross(self.positions[c] - self.positions[a]);
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }
        self.normals = normals.into_iter().map(Vec3::normalize_or_zero).collect();
    }

    /// The color buffer renderers should read: working copy if present
    pub fn live_colors(&self) -> Option<&[Rgba]> {
        match &self.working_colors {
            Some(working) => Some(&working.colors),
            None => self.colors.as_deref(),
        }
    }

    /// Axis-aligned bounds in local space
    pub fn local_bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first, first), |(min, max), &p| (min.min(p), max.max(p))),
        )
    }
}

/// Geometry carried by a target
#[derive(Debug, Clone, Default)]
pub enum Drawable {
    Mesh(MeshData),
    Sprite(MeshData),
    /// Selected object has nothing paintable
    #[default]
    None,
}

/// A texture-valued material property
#[derive(Debug, Clone, Default)]
pub struct TextureSlot {
    pub dimension: TextureDimension,
    /// Persisted backing image, if any
    pub texture: Option<RasterCanvas>,
    /// Working copy substituted while painting
    pub working: Option<RasterCanvas>,
}

impl TextureSlot {
    pub fn new(dimension: TextureDimension, texture: Option<RasterCanvas>) -> Self {
        Self {
            dimension,
            texture,
            working: None,
        }
    }

    /// The texture renderers should bind: working copy if present
    pub fn live(&self) -> Option<&RasterCanvas> {
        self.working.as_ref().or(self.texture.as_ref())
    }
}

#[derive(Debug, Clone)]
pub enum PropertyValue {
    Texture(TextureSlot),
    Color(Rgba),
    Float(f32),
}

#[derive(Debug, Clone)]
pub struct MaterialProperty {
    pub name: String,
    pub value: PropertyValue,
}

/// Named shader properties of the target's material
#[derive(Debug, Clone, Default)]
pub struct Material {
    pub properties: Vec<MaterialProperty>,
}

impl Material {
    pub fn with_property(mut self, name: impl Into<String>, value: PropertyValue) -> Self {
        self.properties.push(MaterialProperty {
            name: name.into(),
            value,
        });
        self
    }

    pub fn with_texture(
        self,
        name: impl Into<String>,
        dimension: TextureDimension,
        texture: Option<RasterCanvas>,
    ) -> Self {
        self.with_property(name, PropertyValue::Texture(TextureSlot::new(dimension, texture)))
    }

    pub fn texture_slot(&self, name: &str) -> Option<&TextureSlot> {
        self.properties.iter().find_map(|p| match &p.value {
            PropertyValue::Texture(slot) if p.name == name => Some(slot),
            _ => None,
        })
    }

    pub fn texture_slot_mut(&mut self, name: &str) -> Option<&mut TextureSlot> {
        self.properties.iter_mut().find_map(|p| match &mut p.value {
            PropertyValue::Texture(slot) if p.name == name => Some(slot),
            _ => None,
        })
    }
}

/// The drawable object being painted
#[derive(Debug, Clone)]
pub struct PaintTarget {
    pub id: TargetId,
    pub name: String,
    pub drawable: Drawable,
    pub transform: Affine3A,
    pub material: Material,
}

impl PaintTarget {
    pub fn new(id: TargetId, name: impl Into<String>, drawable: Drawable) -> Self {
        Self {
            id,
            name: name.into(),
            drawable,
            transform: Affine3A::IDENTITY,
            material: Material::default(),
        }
    }

    pub fn with_transform(mut self, transform: Affine3A) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn mesh(&self) -> Option<&MeshData> {
        match &self.drawable {
            Drawable::Mesh(mesh) | Drawable::Sprite(mesh) => Some(mesh),
            Drawable::None => None,
        }
    }

    pub fn mesh_mut(&mut self) -> Option<&mut MeshData> {
        match &mut self.drawable {
            Drawable::Mesh(mesh) | Drawable::Sprite(mesh) => Some(mesh),
            Drawable::None => None,
        }
    }

    /// Whether the target has triangles to hit
    pub fn is_drawable(&self) -> bool {
        self.mesh().is_some_and(|m| m.indices.len() >= 3)
    }

    /// World-space half extent of the target's bounds
    pub fn world_extents(&self) -> Option<Vec3> {
        let (min, max) = self.mesh()?.local_bounds()?;
        let corners = (0..8).map(|i| {
            Vec3::new(
                if i & 1 == 0 { min.x } else { max.x },
                if i & 2 == 0 { min.y } else { max.y },
                if i & 4 == 0 { min.z } else { max.z },
            )
        });
        let (wmin, wmax) = corners
            .map(|c| self.transform.transform_point3(c))
            .fold((Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)), |(lo, hi), p| {
                (lo.min(p), hi.max(p))
            });
        Some((wmax - wmin) * 0.5)
    }
}

/// Host-side source of the current selection.
///
/// Polled on selection-change notifications and before every raycast; any
/// method may return None.
pub trait TargetProvider {
    /// Currently selected drawable, if any
    fn selected(&self) -> Option<TargetId>;

    /// Snapshot of a target's geometry, transform and material
    fn fetch(&self, id: TargetId) -> Option<PaintTarget>;

    /// Current world transform of a target
    fn transform(&self, id: TargetId) -> Option<Affine3A>;

    /// Paintable canvases of a target, computed once per bind
    fn catalog(&self, target: &PaintTarget) -> CanvasCatalog {
        CanvasCatalog::scan(&target.material)
    }
}
