//! Composite mode table
//!
//! Each [`CompositeMode`] maps to a [`ModeOps`] record holding the per-element
//! combine function used by the vertex path and the fixed-function blend
//! factor pair used by the raster path (the same pair a GPU blend state would
//! be configured with). The record is looked up once when the mode changes.

use serde::{Deserialize, Serialize};

use crate::types::{CompositeMode, Rgba, clamp_rgba};

/// Fixed-function blend factor, evaluated per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlendFactor {
    Zero,
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
}

impl BlendFactor {
    #[inline]
    fn eval(self, src: f32, src_alpha: f32, dst: f32) -> f32 {
        match self {
            BlendFactor::Zero => 0.0,
            BlendFactor::One => 1.0,
            BlendFactor::SrcAlpha => src_alpha,
            BlendFactor::OneMinusSrcAlpha => 1.0 - src_alpha,
            BlendFactor::SrcColor => src,
            BlendFactor::OneMinusSrcColor => 1.0 - src,
            BlendFactor::DstColor => dst,
        }
    }
}

/// Source/destination factor pair: `out = src * src_factor + dst * dst_factor`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlendFactors {
    pub src: BlendFactor,
    pub dst: BlendFactor,
}

/// How the brush color is shaped into the blend source for a raster pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourcePrep {
    /// Color as-is, weight carried in source alpha
    Straight,
    /// Color scaled by weight
    Premultiplied,
    /// Color interpolated from white by weight
    TowardWhite,
}

/// Everything a compositor needs to know about one mode
#[derive(Debug, Clone, Copy)]
pub struct ModeOps {
    pub mode: CompositeMode,
    /// Candidate value from (existing, brush color)
    pub combine: fn(Rgba, Rgba) -> Rgba,
    pub factors: BlendFactors,
    pub source: SourcePrep,
    /// Whether the raster pass writes alpha (alpha-over) or keeps the destination alpha
    pub writes_alpha: bool,
}

fn combine_replace(_existing: Rgba, color: Rgba) -> Rgba {
    clamp_rgba(color)
}

fn combine_add(existing: Rgba, color: Rgba) -> Rgba {
    clamp_rgba([
        existing[0] + color[0],
        existing[1] + color[1],
        existing[2] + color[2],
        existing[3],
    ])
}

fn combine_subtract(existing: Rgba, color: Rgba) -> Rgba {
    clamp_rgba([
        existing[0] - color[0],
        existing[1] - color[1],
        existing[2] - color[2],
        existing[3],
    ])
}

fn combine_multiply(existing: Rgba, color: Rgba) -> Rgba {
    clamp_rgba([
        existing[0] * color[0],
        existing[1] * color[1],
        existing[2] * color[2],
        existing[3],
    ])
}

const ALPHA_OVER: BlendFactors = BlendFactors {
    src: BlendFactor::SrcAlpha,
    dst: BlendFactor::OneMinusSrcAlpha,
};

static NORMAL: ModeOps = ModeOps {
    mode: CompositeMode::Normal,
    combine: combine_replace,
    factors: ALPHA_OVER,
    source: SourcePrep::Straight,
    writes_alpha: true,
};

static DIRECTIONAL: ModeOps = ModeOps {
    mode: CompositeMode::Directional,
    combine: combine_replace,
    factors: ALPHA_OVER,
    source: SourcePrep::Straight,
    writes_alpha: true,
};

static ADD: ModeOps = ModeOps {
    mode: CompositeMode::Add,
    combine: combine_add,
    factors: BlendFactors {
        src: BlendFactor::SrcAlpha,
        dst: BlendFactor::One,
    },
    source: SourcePrep::Straight,
    writes_alpha: false,
};

static SUBTRACT: ModeOps = ModeOps {
    mode: CompositeMode::Subtract,
    combine: combine_subtract,
    factors: BlendFactors {
        src: BlendFactor::Zero,
        dst: BlendFactor::OneMinusSrcColor,
    },
    source: SourcePrep::Premultiplied,
    writes_alpha: false,
};

static MULTIPLY: ModeOps = ModeOps {
    mode: CompositeMode::Multiply,
    combine: combine_multiply,
    factors: BlendFactors {
        src: BlendFactor::DstColor,
        dst: BlendFactor::Zero,
    },
    source: SourcePrep::TowardWhite,
    writes_alpha: false,
};

/// Look up the operations record for a mode
pub fn mode_ops(mode: CompositeMode) -> &'static ModeOps {
    match mode {
        CompositeMode::Normal => &NORMAL,
        CompositeMode::Directional => &DIRECTIONAL,
        CompositeMode::Add => &ADD,
        CompositeMode::Subtract => &SUBTRACT,
        CompositeMode::Multiply => &MULTIPLY,
    }
}

impl ModeOps {
    /// Vertex-path blend: combine, then lerp toward the candidate by `opacity`
    #[inline]
    pub fn blend_element(&self, existing: Rgba, color: Rgba, opacity: f32) -> Rgba {
        let candidate = (self.combine)(existing, color);
        crate::types::lerp_rgba(existing, candidate, opacity)
    }

    /// Raster-path blend of one pixel.
    ///
    /// `weight` is the stamp coverage times opacity, already including the
    /// brush color's own alpha.
    #[inline]
    pub fn blend_pixel(&self, dst: Rgba, color: Rgba, weight: f32) -> Rgba {
        let src = match self.source {
            SourcePrep::Straight => color,
            SourcePrep::Premultiplied => [
                color[0] * weight,
                color[1] * weight,
                color[2] * weight,
                weight,
            ],
            SourcePrep::TowardWhite => [
                1.0 + (color[0] - 1.0) * weight,
                1.0 + (color[1] - 1.0) * weight,
                1.0 + (color[2] - 1.0) * weight,
                weight,
            ],
        };

        let mut out = dst;
        for c in 0..3 {
            let fs = self.factors.src.eval(src[c], weight, dst[c]);
            let fd = self.factors.dst.eval(src[c], weight, dst[c]);
            out[c] = (src[c] * fs + dst[c] * fd).clamp(0.0, 1.0);
        }
        if self.writes_alpha {
            out[3] = (weight + dst[3] * (1.0 - weight)).clamp(0.0, 1.0);
        }
        out
    }
}
