use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Linear RGBA color, one f32 per channel.
pub type Rgba = [f32; 4];

/// How a brush sample combines with the existing canvas value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum CompositeMode {
    #[default]
    Normal = 0,
    /// Paints the stroke direction, encoded into red/green
    Directional = 1,
    Add = 2,
    Subtract = 3,
    Multiply = 4,
}

impl CompositeMode {
    pub const ALL: [CompositeMode; 5] = [
        CompositeMode::Normal,
        CompositeMode::Directional,
        CompositeMode::Add,
        CompositeMode::Subtract,
        CompositeMode::Multiply,
    ];
}

/// Which brush attributes follow the input device pressure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PressureAffects {
    pub opacity: bool,
    pub size: bool,
}

impl PressureAffects {
    pub const NONE: Self = Self {
        opacity: false,
        size: false,
    };

    /// True if any attribute reads pressure
    #[inline]
    pub fn any(&self) -> bool {
        self.opacity || self.size
    }
}

/// Texture shape of a raster canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum TextureDimension {
    #[default]
    Flat = 0,
    Cube = 1,
}

impl TextureDimension {
    /// Number of square layers stored for this dimension
    pub fn layer_count(&self) -> u32 {
        match self {
            TextureDimension::Flat => 1,
            TextureDimension::Cube => crate::constants::CUBE_FACE_COUNT,
        }
    }
}

/// A pointer sample resolved onto the bound surface.
///
/// Position and normal are in target-local space. Recomputed every
/// pointer event and never stored across strokes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitSample {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
    /// Distance along the world-space ray
    pub distance: f32,
    /// Triangle index in the proxy geometry
    pub face_id: u32,
}

/// Modifier keys held during a pointer event.
///
/// Compositing only runs when none are held (modifiers belong to camera
/// navigation in the host).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
    pub command: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
        command: false,
    };

    #[inline]
    pub fn any(&self) -> bool {
        self.shift || self.control || self.alt || self.command
    }
}

/// Pointer event delivered by the host input source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    /// Pointer position in viewport pixels, origin top-left
    pub position: Vec2,
    pub modifiers: Modifiers,
    /// Normalized pen pressure, if the device reports one
    pub pressure: Option<f32>,
}

impl PointerEvent {
    pub fn new(kind: PointerEventKind, position: Vec2) -> Self {
        Self {
            kind,
            position,
            modifiers: Modifiers::NONE,
            pressure: None,
        }
    }

    pub fn with_pressure(mut self, pressure: f32) -> Self {
        self.pressure = Some(pressure);
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    Down,
    Drag,
    /// Hover with no button held
    Move,
    Up,
}

/// Linear interpolation of two colors, exact at both endpoints
#[inline]
pub fn lerp_rgba(a: Rgba, b: Rgba, t: f32) -> Rgba {
    let s = 1.0 - t;
    [
        a[0] * s + b[0] * t,
        a[1] * s + b[1] * t,
        a[2] * s + b[2] * t,
        a[3] * s + b[3] * t,
    ]
}

#[inline]
pub fn clamp_rgba(c: Rgba) -> Rgba {
    [
        c[0].clamp(0.0, 1.0),
        c[1].clamp(0.0, 1.0),
        c[2].clamp(0.0, 1.0),
        c[3].clamp(0.0, 1.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_rgba_endpoints() {
        let a = [0.0, 0.2, 0.4, 1.0];
        let b = [1.0, 0.0, 0.0, 0.5];
        assert_eq!(lerp_rgba(a, b, 0.0), a);
        assert_eq!(lerp_rgba(a, b, 1.0), b);
    }

    #[test]
    fn test_pressure_affects_any() {
        assert!(!PressureAffects::NONE.any());
        assert!(
            PressureAffects {
                opacity: false,
                size: true
            }
            .any()
        );
    }

    #[test]
    fn test_cube_layer_count() {
        assert_eq!(TextureDimension::Flat.layer_count(), 1);
        assert_eq!(TextureDimension::Cube.layer_count(), 6);
    }
}
