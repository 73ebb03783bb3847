//! Surface painting core
//!
//! Paints onto 3D surfaces from a pointer trajectory:
//! - [`binding`] - the bound target, its canvas catalog and collision proxy
//! - [`raycast`] - pointer rays resolved to surface hits
//! - [`brush`] - brush state, falloff and per-sample dab resolution
//! - [`blend`] - composite mode table (combine function + blend factors)
//! - [`composite`] - raster and vertex compositing
//! - [`history`] - per-target undo snapshots
//! - [`lifecycle`] - working copies, reset and promotion
//! - [`session`] - the painter session a host drives

pub mod binding;
pub mod blend;
pub mod brush;
pub mod canvas;
pub mod composite;
pub mod constants;
pub mod history;
pub mod lifecycle;
pub mod persistence;
pub mod raycast;
pub mod session;
pub mod surface;
pub mod target;
pub mod types;
pub mod view;

pub use binding::SurfaceBinding;
pub use blend::{BlendFactor, BlendFactors, ModeOps, mode_ops};
pub use brush::{BrushError, BrushState, DirectionEncoder, Falloff, ResolvedDab};
pub use canvas::{
    CanvasCatalog, CanvasKind, CatalogEntry, HistoryKind, RasterCanvas, Snapshot, VertexCanvas,
};
pub use composite::{CanvasMut, StampRegion, apply, apply_dab};
pub use constants::*;
pub use history::{HistoryEntry, UndoHistory};
pub use lifecycle::PromoteError;
pub use persistence::{AssetPersistence, MemoryPersistence, PersistError, PngPersistence};
pub use raycast::{ProxyGeometry, Ray};
pub use session::{BrushCursor, PainterSession, PointerResponse, StrokeSession};
pub use surface::PixelBuffer;
pub use target::{
    Drawable, Material, MaterialProperty, MeshData, PaintTarget, PropertyValue, TargetId,
    TargetProvider, TextureSlot,
};
pub use types::*;
pub use view::{Camera, ViewContext};

pub use surface_paint_config as config;
