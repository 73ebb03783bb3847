//! Host-driven undo
//!
//! The host's command history decides when to undo or redo and calls back
//! with a snapshot index. Nothing here truncates history.

use tracing::debug;

use crate::canvas::{HistoryKind, Snapshot};
use crate::lifecycle;

use super::PainterSession;

impl PainterSession {
    /// Number of committed snapshots of one kind on the bound target
    pub fn history_len(&self, kind: HistoryKind) -> usize {
        self.binding
            .as_ref()
            .map(|b| b.history().len(kind))
            .unwrap_or(0)
    }

    /// The active canvas's restore point: its last committed snapshot, else
    /// its original content, else opaque white.
    ///
    /// Read-only; calling it twice without a commit in between gives the
    /// same buffer.
    pub fn restore(&self) -> Option<Snapshot> {
        let binding = self.binding.as_ref()?;
        let entry = self.active.as_ref()?;
        let shape = lifecycle::working_snapshot(binding.target(), entry)?;
        let original = lifecycle::original_snapshot(binding.target(), entry);
        Some(
            binding
                .history()
                .restore(entry.kind.into(), &entry.name, original.as_ref(), &shape),
        )
    }

    /// Write snapshot `index` of the active canvas's kind into the live
    /// buffer and make it the new baseline.
    ///
    /// Returns false when the index is out of range, the snapshot belongs to
    /// another canvas, or it no longer fits the canvas.
    pub fn undo_restore(&mut self, index: usize) -> bool {
        self.end_stroke();
        self.clear_preview();
        if !self.ensure_working_copy() {
            return false;
        }
        let (Some(binding), Some(entry)) = (self.binding.as_mut(), self.active.as_ref()) else {
            return false;
        };
        let kind = HistoryKind::from(entry.kind);
        let Some(owner) = binding.history().canvas_at(kind, index) else {
            debug!("undo_restore: no {:?} snapshot at {}", kind, index);
            return false;
        };
        if owner != entry.name {
            debug!(
                "undo_restore: snapshot {} belongs to '{}', not '{}'",
                index, owner, entry.name
            );
            return false;
        }
        let Some(snapshot) = binding.history().restore_at(kind, index) else {
            return false;
        };
        if !lifecycle::write_working(binding.target_mut(), entry, &snapshot) {
            return false;
        }
        debug!("Restored {:?} snapshot {}", kind, index);
        self.baseline = Some(snapshot);
        true
    }
}
