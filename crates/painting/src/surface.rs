//! CPU pixel storage for raster canvases and brush stamps

use glam::{Vec2, Vec3};

use crate::types::Rgba;

/// Float RGBA pixels in row-major order, one block per layer.
///
/// A flat texture has one layer; a cube texture has six, ordered
/// +X, -X, +Y, -Y, +Z, -Z.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    layers: u32,
    pixels: Vec<Rgba>,
}

impl PixelBuffer {
    /// Create a buffer initialized to transparent black
    pub fn new(width: u32, height: u32, layers: u32) -> Self {
        Self::filled(width, height, layers, [0.0, 0.0, 0.0, 0.0])
    }

    /// Create a buffer with every pixel set to `color`
    pub fn filled(width: u32, height: u32, layers: u32, color: Rgba) -> Self {
        let count = (width as usize) * (height as usize) * (layers as usize);
        Self {
            width,
            height,
            layers,
            pixels: vec![color; count],
        }
    }

    /// Wrap existing pixel data. Returns None if the length does not match.
    pub fn from_pixels(width: u32, height: u32, layers: u32, pixels: Vec<Rgba>) -> Option<Self> {
        let expected = (width as usize) * (height as usize) * (layers as usize);
        if pixels.len() != expected {
            return None;
        }
        Some(Self {
            width,
            height,
            layers,
            pixels,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn layers(&self) -> u32 {
        self.layers
    }

    /// Same width, height and layer count
    pub fn same_dimensions(&self, other: &PixelBuffer) -> bool {
        self.width == other.width && self.height == other.height && self.layers == other.layers
    }

    pub fn clear(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }

    #[inline]
    fn index(&self, layer: u32, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height || layer >= self.layers {
            return None;
        }
        let layer_size = (self.width as usize) * (self.height as usize);
        Some(layer as usize * layer_size + (y as usize) * (self.width as usize) + x as usize)
    }

    #[inline]
    pub fn get_pixel(&self, layer: u32, x: u32, y: u32) -> Option<Rgba> {
        self.index(layer, x, y).map(|i| self.pixels[i])
    }

    /// Does nothing if coordinates are out of bounds
    #[inline]
    pub fn set_pixel(&mut self, layer: u32, x: u32, y: u32, color: Rgba) {
        if let Some(i) = self.index(layer, x, y) {
            self.pixels[i] = color;
        }
    }

    /// Bilinear sample of layer 0 at normalized coordinates, clamped to edge
    pub fn sample(&self, uv: Vec2) -> Rgba {
        if self.width == 0 || self.height == 0 {
            return [0.0, 0.0, 0.0, 0.0];
        }
        let fx = (uv.x.clamp(0.0, 1.0) * self.width as f32 - 0.5).max(0.0);
        let fy = (uv.y.clamp(0.0, 1.0) * self.height as f32 - 0.5).max(0.0);
        let x0 = (fx.floor() as u32).min(self.width - 1);
        let y0 = (fy.floor() as u32).min(self.height - 1);
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let tx = fx - x0 as f32;
        let ty = fy - y0 as f32;

        let p00 = self.pixels[(y0 * self.width + x0) as usize];
        let p10 = self.pixels[(y0 * self.width + x1) as usize];
        let p01 = self.pixels[(y1 * self.width + x0) as usize];
        let p11 = self.pixels[(y1 * self.width + x1) as usize];

        let mut out = [0.0; 4];
        for c in 0..4 {
            let top = p00[c] + (p10[c] - p00[c]) * tx;
            let bottom = p01[c] + (p11[c] - p01[c]) * tx;
            out[c] = top + (bottom - top) * ty;
        }
        out
    }

    /// Raw pixel data as bytes, suitable for a float texture upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [Rgba] {
        &mut self.pixels
    }

    pub fn into_pixels(self) -> Vec<Rgba> {
        self.pixels
    }

    /// Quantize to 8-bit RGBA, layers stacked vertically
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|p| p.map(|c| (c.clamp(0.0, 1.0) * 255.0 + 0.5) as u8))
            .collect()
    }

    /// Build from 8-bit RGBA data with layers stacked vertically
    pub fn from_rgba8(width: u32, height: u32, layers: u32, bytes: &[u8]) -> Option<Self> {
        let pixels = bytes
            .chunks_exact(4)
            .map(|p| [p[0], p[1], p[2], p[3]].map(|c| c as f32 / 255.0))
            .collect();
        Self::from_pixels(width, height, layers, pixels)
    }
}

/// Select the cube face and face-local UV addressed by a direction.
///
/// Faces follow the usual cube map order (+X, -X, +Y, -Y, +Z, -Z).
/// Returns None for a zero-length direction.
pub fn cube_face_uv(direction: Vec3) -> Option<(u32, Vec2)> {
    let abs = direction.abs();
    let (face, sc, tc, ma) = if abs.x >= abs.y && abs.x >= abs.z {
        if direction.x >= 0.0 {
            (0, -direction.z, -direction.y, abs.x)
        } else {
            (1, direction.z, -direction.y, abs.x)
        }
    } else if abs.y >= abs.z {
        if direction.y >= 0.0 {
            (2, direction.x, direction.z, abs.y)
        } else {
            (3, direction.x, -direction.z, abs.y)
        }
    } else if direction.z >= 0.0 {
        (4, direction.x, -direction.y, abs.z)
    } else {
        (5, -direction.x, -direction.y, abs.z)
    };

    if ma <= crate::constants::EPSILON {
        return None;
    }

    Some((face, Vec2::new((sc / ma + 1.0) * 0.5, (tc / ma + 1.0) * 0.5)))
}
