//! Per-target undo history
//!
//! Two append-only snapshot sequences, one per canvas kind. Entries are
//! pre-stroke baselines committed at stroke end, tagged with the canvas
//! they came from so raster canvases sharing a sequence never restore each
//! other's pixels. Restoring reads without
//! truncating; redo belongs to the host's command history, which calls back
//! with an index.

use surface_paint_config::HistoryConfig;
use tracing::debug;

use crate::canvas::{HistoryKind, Snapshot};
use crate::constants::OPAQUE_WHITE;
use crate::surface::PixelBuffer;
use crate::types::Rgba;

/// A committed baseline and the canvas it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry<T> {
    pub canvas: String,
    pub content: T,
}

#[derive(Debug, Clone, Default)]
pub struct UndoHistory {
    raster: Vec<HistoryEntry<PixelBuffer>>,
    vertex: Vec<HistoryEntry<Vec<Rgba>>>,
    max_entries: Option<usize>,
}

impl UndoHistory {
    pub fn new(config: &HistoryConfig) -> Self {
        Self {
            max_entries: config.max_entries,
            ..Default::default()
        }
    }

    /// Append a baseline of `canvas` to the sequence matching its kind
    pub fn commit(&mut self, canvas: &str, snapshot: Snapshot) {
        let kind = snapshot.kind();
        let canvas = canvas.to_string();
        match snapshot {
            Snapshot::Raster(content) => {
                self.raster.push(HistoryEntry { canvas, content });
                trim_front(&mut self.raster, self.max_entries);
            }
            Snapshot::Vertex(content) => {
                self.vertex.push(HistoryEntry { canvas, content });
                trim_front(&mut self.vertex, self.max_entries);
            }
        }
        debug!("History commit: {:?} -> {} entries", kind, self.len(kind));
    }

    /// Most recent snapshot of `canvas`, else `original`, else opaque white
    /// shaped like `shape`.
    ///
    /// Entries committed by other canvases of the same kind are skipped.
    /// Never mutates, so two calls without a commit in between agree.
    pub fn restore(
        &self,
        kind: HistoryKind,
        canvas: &str,
        original: Option<&Snapshot>,
        shape: &Snapshot,
    ) -> Snapshot {
        let last = (0..self.len(kind))
            .rev()
            .find(|&i| self.canvas_at(kind, i) == Some(canvas))
            .and_then(|i| self.restore_at(kind, i));
        if let Some(last) = last {
            return last;
        }
        match original {
            Some(original) => original.clone(),
            None => shape.filled_like(OPAQUE_WHITE),
        }
    }

    /// Snapshot at a host-supplied index
    pub fn restore_at(&self, kind: HistoryKind, index: usize) -> Option<Snapshot> {
        match kind {
            HistoryKind::Raster => self
                .raster
                .get(index)
                .map(|e| Snapshot::Raster(e.content.clone())),
            HistoryKind::Vertex => self
                .vertex
                .get(index)
                .map(|e| Snapshot::Vertex(e.content.clone())),
        }
    }

    /// Name of the canvas that committed the snapshot at `index`
    pub fn canvas_at(&self, kind: HistoryKind, index: usize) -> Option<&str> {
        match kind {
            HistoryKind::Raster => self.raster.get(index).map(|e| e.canvas.as_str()),
            HistoryKind::Vertex => self.vertex.get(index).map(|e| e.canvas.as_str()),
        }
    }

    pub fn len(&self, kind: HistoryKind) -> usize {
        match kind {
            HistoryKind::Raster => self.raster.len(),
            HistoryKind::Vertex => self.vertex.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.raster.is_empty() && self.vertex.is_empty()
    }

    pub fn clear(&mut self) {
        self.raster.clear();
        self.vertex.clear();
    }
}

fn trim_front<T>(entries: &mut Vec<T>, max_entries: Option<usize>) {
    if let Some(max) = max_entries {
        if entries.len() > max {
            let excess = entries.len() - max;
            entries.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::VERTEX_CANVAS_NAME;

    fn vertex(value: f32) -> Snapshot {
        Snapshot::Vertex(vec![[value, value, value, 1.0]; 2])
    }

    #[test]
    fn test_restore_prefers_last_commit() {
        let mut history = UndoHistory::default();
        let original = vertex(0.5);
        history.commit(VERTEX_CANVAS_NAME, vertex(0.1));
        history.commit(VERTEX_CANVAS_NAME, vertex(0.2));
        let restored =
            history.restore(HistoryKind::Vertex, VERTEX_CANVAS_NAME, Some(&original), &original);
        assert_eq!(restored, vertex(0.2));
    }

    #[test]
    fn test_restore_falls_back_to_original_then_white() {
        let history = UndoHistory::default();
        let original = vertex(0.5);
        assert_eq!(
            history.restore(HistoryKind::Vertex, VERTEX_CANVAS_NAME, Some(&original), &original),
            original
        );
        let shape = Snapshot::Raster(PixelBuffer::new(2, 3, 1));
        assert_eq!(
            history.restore(HistoryKind::Raster, "_MainTex", None, &shape),
            Snapshot::Raster(PixelBuffer::filled(2, 3, 1, OPAQUE_WHITE))
        );
    }

    #[test]
    fn test_restore_is_idempotent() {
        let mut history = UndoHistory::default();
        history.commit(VERTEX_CANVAS_NAME, vertex(0.3));
        let shape = vertex(0.0);
        let first = history.restore(HistoryKind::Vertex, VERTEX_CANVAS_NAME, None, &shape);
        let second = history.restore(HistoryKind::Vertex, VERTEX_CANVAS_NAME, None, &shape);
        assert_eq!(first, second);
        assert_eq!(history.len(HistoryKind::Vertex), 1);
    }

    #[test]
    fn test_sequences_are_independent() {
        let mut history = UndoHistory::default();
        history.commit(VERTEX_CANVAS_NAME, vertex(0.3));
        history.commit("_MainTex", Snapshot::Raster(PixelBuffer::new(1, 1, 1)));
        history.commit(VERTEX_CANVAS_NAME, vertex(0.4));
        assert_eq!(history.len(HistoryKind::Vertex), 2);
        assert_eq!(history.len(HistoryKind::Raster), 1);
        assert_eq!(history.restore_at(HistoryKind::Vertex, 0), Some(vertex(0.3)));
        assert_eq!(history.restore_at(HistoryKind::Raster, 1), None);
    }

    #[test]
    fn test_restore_ignores_other_canvases() {
        let mut history = UndoHistory::default();
        let red = Snapshot::Raster(PixelBuffer::filled(2, 2, 1, [1.0, 0.0, 0.0, 1.0]));
        let blue = Snapshot::Raster(PixelBuffer::filled(2, 2, 1, [0.0, 0.0, 1.0, 1.0]));
        history.commit("_MainTex", red.clone());
        history.commit("_Detail", blue.clone());
        history.commit("_MainTex", red.clone());

        let shape = Snapshot::Raster(PixelBuffer::new(2, 2, 1));
        assert_eq!(history.restore(HistoryKind::Raster, "_Detail", None, &shape), blue);
        assert_eq!(history.restore(HistoryKind::Raster, "_MainTex", None, &shape), red);
        assert_eq!(
            history.restore(HistoryKind::Raster, "_Mask", None, &shape),
            shape.filled_like(OPAQUE_WHITE)
        );
        assert_eq!(history.canvas_at(HistoryKind::Raster, 1), Some("_Detail"));
        assert_eq!(history.canvas_at(HistoryKind::Raster, 3), None);
    }

    #[test]
    fn test_cap_drops_oldest() {
        let mut history = UndoHistory::new(&HistoryConfig {
            max_entries: Some(2),
        });
        for i in 0..4 {
            history.commit(VERTEX_CANVAS_NAME, vertex(i as f32 * 0.1));
        }
        assert_eq!(history.len(HistoryKind::Vertex), 2);
        assert_eq!(history.restore_at(HistoryKind::Vertex, 0), Some(vertex(0.2)));
    }

    #[test]
    fn test_clear() {
        let mut history = UndoHistory::default();
        history.commit(VERTEX_CANVAS_NAME, vertex(0.3));
        assert!(!history.is_empty());
        history.clear();
        assert!(history.is_empty());
    }
}
