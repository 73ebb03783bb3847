//! Brush state and per-sample dab resolution
//!
//! [`BrushState`] is the tool configuration edited by the host. Every pointer
//! sample resolves it against the device pressure into a [`ResolvedDab`],
//! which the compositors consume. Invalid parameters are rejected here so no
//! buffer is touched.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use surface_paint_config::BrushDefaults;
use thiserror::Error;
use tracing::debug;

use crate::blend::{ModeOps, mode_ops};
use crate::constants::EPSILON;
use crate::surface::PixelBuffer;
use crate::types::{CompositeMode, PressureAffects, Rgba, clamp_rgba};

#[derive(Debug, Error, PartialEq)]
pub enum BrushError {
    #[error("Invalid brush radius: {0}")]
    InvalidRadius(f32),
    #[error("Invalid blend amount: {0} (expected 0..=1)")]
    InvalidBlend(f32),
    #[error("Invalid pressure: {0} (expected 0..=1)")]
    InvalidPressure(f32),
    #[error("Invalid brush color: {0:?}")]
    InvalidColor(Rgba),
}

/// Coverage curve from normalized distance (0 at center, 1 at edge) to weight.
///
/// Every variant is monotonically non-increasing on [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum Falloff {
    /// Full weight everywhere inside the radius
    Constant,
    #[default]
    Linear,
    /// Smoothstep from 1 at the center to 0 at the edge
    Smooth,
    /// Blend between linear (0.0) and a hard edge (1.0)
    Hardness(f32),
    /// Evenly spaced samples, linearly interpolated
    Curve(Vec<f32>),
}

impl Falloff {
    /// Build a sampled curve, forcing values into [0, 1] and non-increasing order
    pub fn curve(samples: impl IntoIterator<Item = f32>) -> Self {
        let mut previous = 1.0f32;
        let samples = samples
            .into_iter()
            .map(|s| {
                previous = s.clamp(0.0, previous);
                previous
            })
            .collect();
        Falloff::Curve(samples)
    }

    /// Weight at a normalized distance, always within [0, 1]
    pub fn evaluate(&self, distance_normalized: f32) -> f32 {
        let t = distance_normalized.clamp(0.0, 1.0);
        let weight = match self {
            Falloff::Constant => 1.0,
            Falloff::Linear => 1.0 - t,
            Falloff::Smooth => {
                let s = 1.0 - t;
                s * s * (3.0 - 2.0 * s)
            }
            Falloff::Hardness(hardness) => {
                let hardness = hardness.clamp(0.0, 1.0);
                (1.0 - t) * (1.0 - hardness) + hardness
            }
            Falloff::Curve(samples) => match samples.len() {
                0 => 1.0 - t,
                1 => samples[0],
                n => {
                    let pos = t * (n - 1) as f32;
                    let i = (pos.floor() as usize).min(n - 2);
                    let frac = pos - i as f32;
                    samples[i] + (samples[i + 1] - samples[i]) * frac
                }
            },
        };
        // Curve samples built without `Falloff::curve` may leave the range
        weight.clamp(0.0, 1.0)
    }
}

/// Current tool configuration
#[derive(Debug, Clone)]
pub struct BrushState {
    pub color: Rgba,
    /// Vertex canvases: target-local units. Raster canvases: UV units.
    pub radius: f32,
    /// Maximum opacity per sample, 0..=1
    pub blend: f32,
    pub falloff: Falloff,
    pub pressure_affects: PressureAffects,
    /// Stamp image for raster canvases; a plain falloff disc when None
    pub stamp: Option<PixelBuffer>,
    mode: CompositeMode,
    ops: &'static ModeOps,
}

impl Default for BrushState {
    fn default() -> Self {
        Self::from_defaults(&BrushDefaults::default())
    }
}

impl BrushState {
    pub fn from_defaults(defaults: &BrushDefaults) -> Self {
        let mode = if defaults.directional {
            CompositeMode::Directional
        } else {
            CompositeMode::Normal
        };
        Self {
            color: defaults.color,
            radius: defaults.radius,
            blend: defaults.blend,
            falloff: Falloff::Linear,
            pressure_affects: PressureAffects::NONE,
            stamp: None,
            mode,
            ops: mode_ops(mode),
        }
    }

    pub fn mode(&self) -> CompositeMode {
        self.mode
    }

    /// Change the composite mode; the operations record is looked up here only
    pub fn set_mode(&mut self, mode: CompositeMode) {
        if mode != self.mode {
            debug!("Brush mode {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
            self.ops = mode_ops(mode);
        }
    }

    pub fn ops(&self) -> &'static ModeOps {
        self.ops
    }

    /// Resolve the brush against a pressure sample.
    ///
    /// A missing pressure reading counts as full pressure, and so does any
    /// reading when no attribute is pressure-driven.
    pub fn resolve(&self, pressure: Option<f32>) -> Result<ResolvedDab, BrushError> {
        let raw = pressure.unwrap_or(1.0);
        if !(0.0..=1.0).contains(&raw) {
            return Err(BrushError::InvalidPressure(raw));
        }
        if !(0.0..=1.0).contains(&self.blend) {
            return Err(BrushError::InvalidBlend(self.blend));
        }
        if !self.color.iter().all(|c| c.is_finite()) {
            return Err(BrushError::InvalidColor(self.color));
        }

        let pressure = if self.pressure_affects.any() { raw } else { 1.0 };
        let radius = if self.pressure_affects.size {
            self.radius * pressure
        } else {
            self.radius
        };
        if radius <= 0.0 || !radius.is_finite() {
            return Err(BrushError::InvalidRadius(radius));
        }
        let opacity = if self.pressure_affects.opacity {
            self.blend * pressure
        } else {
            self.blend
        };

        Ok(ResolvedDab {
            color: clamp_rgba(self.color),
            radius,
            opacity,
            falloff: self.falloff.clone(),
            ops: self.ops,
        })
    }
}

/// Brush parameters fixed for a single sample
#[derive(Debug, Clone)]
pub struct ResolvedDab {
    pub color: Rgba,
    /// Effective radius after pressure
    pub radius: f32,
    /// Blend amount after pressure, before coverage
    pub opacity: f32,
    pub falloff: Falloff,
    pub ops: &'static ModeOps,
}

impl ResolvedDab {
    /// Replace the paint color (directional mode encodes it per sample)
    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    /// Falloff-weighted influence at a distance; zero at or beyond the radius
    #[inline]
    pub fn coverage(&self, distance: f32) -> f32 {
        if distance >= self.radius {
            return 0.0;
        }
        self.falloff.evaluate(distance / self.radius)
    }

    /// Final blend weight at a distance
    #[inline]
    pub fn opacity_at(&self, distance: f32) -> f32 {
        self.opacity * self.coverage(distance)
    }
}

/// Encodes stroke direction in UV space as a color.
///
/// The last known UV survives raycast misses and is only forgotten when a
/// new stroke starts.
#[derive(Debug, Clone, Default)]
pub struct DirectionEncoder {
    last_uv: Option<Vec2>,
}

impl DirectionEncoder {
    pub fn reset(&mut self) {
        self.last_uv = None;
    }

    pub fn last_uv(&self) -> Option<Vec2> {
        self.last_uv
    }

    /// Record a new UV sample and return the encoded direction from the
    /// previous one, if there was a previous one and the pointer moved.
    pub fn advance(&mut self, uv: Vec2) -> Option<Rgba> {
        let previous = self.last_uv.replace(uv)?;
        let delta = uv - previous;
        if delta.length_squared() <= EPSILON * EPSILON {
            return None;
        }
        Some(encode_direction(delta.normalize()))
    }
}

/// Map a unit direction into red/green in [0, 1]
#[inline]
pub fn encode_direction(direction: Vec2) -> Rgba {
    [direction.x * 0.5 + 0.5, direction.y * 0.5 + 0.5, 0.0, 1.0]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brush() -> BrushState {
        BrushState {
            radius: 2.0,
            blend: 0.5,
            ..Default::default()
        }
    }

    #[test]
    fn test_default_brush_matches_config() {
        let brush = BrushState::default();
        let defaults = BrushDefaults::default();
        assert_eq!(brush.color, defaults.color);
        assert_eq!(brush.radius, defaults.radius);
        assert_eq!(brush.blend, defaults.blend);
        assert_eq!(brush.mode(), CompositeMode::Normal);
    }

    #[test]
    fn test_falloff_monotonic() {
        let curves = [
            Falloff::Constant,
            Falloff::Linear,
            Falloff::Smooth,
            Falloff::Hardness(0.3),
            Falloff::curve([1.0, 0.8, 0.9, 0.2, 0.0]),
        ];
        for falloff in curves {
            let mut previous = falloff.evaluate(0.0);
            assert!(previous <= 1.0);
            for i in 1..=20 {
                let value = falloff.evaluate(i as f32 / 20.0);
                assert!(value <= previous + 1e-6, "{falloff:?} increased at {i}");
                assert!(value >= 0.0);
                previous = value;
            }
        }
    }

    #[test]
    fn test_curve_forced_non_increasing() {
        let falloff = Falloff::curve([0.5, 0.9, 0.1]);
        assert_eq!(falloff, Falloff::Curve(vec![0.5, 0.5, 0.1]));
    }

    #[test]
    fn test_hand_built_curve_stays_in_range() {
        let falloff = Falloff::Curve(vec![3.0, 3.0]);
        assert_eq!(falloff.evaluate(0.0), 1.0);
        assert_eq!(falloff.evaluate(1.0), 1.0);
        assert_eq!(Falloff::Curve(vec![-2.0]).evaluate(0.5), 0.0);

        let dab = BrushState {
            color: [1.0; 4],
            blend: 1.0,
            falloff: Falloff::Curve(vec![3.0, 3.0]),
            ..brush()
        }
        .resolve(None)
        .unwrap();
        assert_eq!(dab.opacity_at(0.0), 1.0);
        let out = dab.ops.blend_element([0.5, 0.5, 0.5, 1.0], dab.color, dab.opacity_at(0.0));
        assert_eq!(out, [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_color_clamped_and_non_finite_rejected() {
        let mut b = brush();
        b.color = [2.0, -1.0, 0.0, 1.0];
        assert_eq!(b.resolve(None).unwrap().color, [1.0, 0.0, 0.0, 1.0]);

        b.color = [f32::NAN, 0.0, 0.0, 1.0];
        assert!(matches!(b.resolve(None), Err(BrushError::InvalidColor(_))));
    }

    #[test]
    fn test_pressure_ignored_without_flags() {
        let dab = brush().resolve(Some(0.25)).unwrap();
        assert_eq!(dab.radius, 2.0);
        assert_eq!(dab.opacity, 0.5);
    }

    #[test]
    fn test_pressure_scales_size_and_opacity() {
        let mut brush = brush();
        brush.pressure_affects = PressureAffects {
            opacity: true,
            size: true,
        };
        let dab = brush.resolve(Some(0.5)).unwrap();
        assert!((dab.radius - 1.0).abs() < 1e-6);
        assert!((dab.opacity - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let mut b = brush();
        assert_eq!(
            b.resolve(Some(1.5)).unwrap_err(),
            BrushError::InvalidPressure(1.5)
        );
        assert!(b.resolve(Some(-0.1)).is_err());

        b.radius = 0.0;
        assert_eq!(b.resolve(None).unwrap_err(), BrushError::InvalidRadius(0.0));

        b.radius = 1.0;
        b.blend = 1.2;
        assert_eq!(b.resolve(None).unwrap_err(), BrushError::InvalidBlend(1.2));
    }

    #[test]
    fn test_size_pressure_zero_is_degenerate() {
        let mut b = brush();
        b.pressure_affects.size = true;
        assert!(matches!(b.resolve(Some(0.0)), Err(BrushError::InvalidRadius(_))));
    }

    #[test]
    fn test_coverage_zero_at_edge() {
        let dab = brush().resolve(None).unwrap();
        assert_eq!(dab.coverage(2.0), 0.0);
        assert_eq!(dab.coverage(3.0), 0.0);
        assert!((dab.coverage(1.0) - 0.5).abs() < 1e-6);
        assert!((dab.opacity_at(0.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_set_mode_updates_ops() {
        let mut b = brush();
        b.set_mode(CompositeMode::Multiply);
        assert_eq!(b.ops().mode, CompositeMode::Multiply);
        assert_eq!(b.resolve(None).unwrap().ops.mode, CompositeMode::Multiply);
    }

    #[test]
    fn test_direction_encoder() {
        let mut encoder = DirectionEncoder::default();
        assert!(encoder.advance(Vec2::new(0.5, 0.5)).is_none());

        let color = encoder.advance(Vec2::new(0.7, 0.5)).unwrap();
        assert!((color[0] - 1.0).abs() < 1e-6);
        assert!((color[1] - 0.5).abs() < 1e-6);

        // No movement, no direction
        assert!(encoder.advance(Vec2::new(0.7, 0.5)).is_none());

        let color = encoder.advance(Vec2::new(0.7, 0.3)).unwrap();
        assert!(color[1].abs() < 1e-6);

        encoder.reset();
        assert!(encoder.last_uv().is_none());
    }
}
