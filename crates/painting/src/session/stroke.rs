//! Pointer handling and the stroke state machine

use tracing::debug;

use crate::composite::apply_dab;
use crate::lifecycle;
use crate::target::TargetProvider;
use crate::types::{CompositeMode, HitSample, PointerEvent, PointerEventKind};
use crate::view::ViewContext;

use super::PainterSession;

/// What a pointer event did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerResponse {
    /// Modifiers held, nothing bound, or not painting
    Ignored,
    /// No surface under the pointer
    Missed,
    /// Hover preview drawn over the baseline
    Previewed,
    /// Stroke sample composited; the count of touched elements
    Painted(usize),
    /// Stroke ended and one snapshot was committed
    Committed,
    /// Stroke ended without changes
    Ended,
}

impl PainterSession {
    /// Feed one pointer event from the host.
    ///
    /// Down opens a stroke and paints, Drag paints, Up closes the stroke and
    /// commits the baseline if anything changed, Move draws a hover preview.
    pub fn handle_pointer(
        &mut self,
        event: &PointerEvent,
        view: &dyn ViewContext,
        provider: Option<&dyn TargetProvider>,
    ) -> PointerResponse {
        if event.modifiers.any() {
            return PointerResponse::Ignored;
        }
        if self.binding.is_none() || self.active.is_none() {
            return PointerResponse::Ignored;
        }

        match event.kind {
            PointerEventKind::Up => self.end_stroke(),
            PointerEventKind::Down => {
                self.clear_preview();
                self.stroke.active = true;
                self.stroke.dirty = false;
                self.direction.reset();
                self.stroke_sample(event, view, provider)
            }
            PointerEventKind::Drag => {
                if !self.stroke.active {
                    // Press happened outside the session; start here
                    self.clear_preview();
                    self.stroke.active = true;
                    self.direction.reset();
                }
                self.stroke_sample(event, view, provider)
            }
            PointerEventKind::Move => self.hover(event, view, provider),
        }
    }

    /// Composite one Down or Drag sample.
    ///
    /// A miss pauses the stroke and leaves the paint laid down so far in
    /// place: no rollback to the baseline happens, and the next hit resumes
    /// accumulating. Only a hover miss clears the preview.
    fn stroke_sample(
        &mut self,
        event: &PointerEvent,
        view: &dyn ViewContext,
        provider: Option<&dyn TargetProvider>,
    ) -> PointerResponse {
        let Some(hit) = self.project(event.position, view, provider) else {
            return PointerResponse::Missed;
        };
        if !self.ensure_working_copy() {
            return PointerResponse::Ignored;
        }

        let touched = self.composite(&hit, event.pressure, true);
        if touched > 0 && !self.stroke.dirty {
            debug!("Stroke dirty");
            self.stroke.dirty = true;
        }
        PointerResponse::Painted(touched)
    }

    fn hover(
        &mut self,
        event: &PointerEvent,
        view: &dyn ViewContext,
        provider: Option<&dyn TargetProvider>,
    ) -> PointerResponse {
        let Some(hit) = self.project(event.position, view, provider) else {
            self.clear_preview();
            return PointerResponse::Missed;
        };
        if self.stroke.active || !self.ensure_working_copy() {
            return PointerResponse::Ignored;
        }

        self.clear_preview();
        // Direction needs two stroke samples, so directional mode has no preview
        if self.brush.mode() == CompositeMode::Directional {
            return PointerResponse::Previewed;
        }
        if self.composite(&hit, event.pressure, false) > 0 {
            self.preview_shown = true;
        }
        PointerResponse::Previewed
    }

    /// Close the stroke, committing the pre-stroke baseline if it changed
    /// anything
    pub fn end_stroke(&mut self) -> PointerResponse {
        if !self.stroke.active {
            return PointerResponse::Ended;
        }
        let dirty = self.stroke.dirty;
        self.stroke.active = false;
        self.stroke.dirty = false;
        self.direction.reset();
        if !dirty {
            return PointerResponse::Ended;
        }

        let (Some(binding), Some(entry)) = (self.binding.as_mut(), self.active.as_ref()) else {
            return PointerResponse::Ended;
        };
        let live = lifecycle::working_snapshot(binding.target(), entry);
        if let Some(baseline) = self.baseline.take() {
            binding.history.commit(&entry.name, baseline);
        }
        self.baseline = live;
        PointerResponse::Committed
    }

    /// Composite one sample on the active canvas's working copy
    fn composite(&mut self, hit: &HitSample, pressure: Option<f32>, stroking: bool) -> usize {
        let (Some(binding), Some(entry)) = (self.binding.as_mut(), self.active.as_ref()) else {
            return 0;
        };

        let dab = match self.brush.resolve(pressure) {
            Ok(dab) => dab,
            Err(e) => {
                debug!("Sample rejected: {}", e);
                return 0;
            }
        };
        let dab = if stroking && self.brush.mode() == CompositeMode::Directional {
            match self.direction.advance(hit.uv) {
                Some(color) => dab.with_color(color),
                None => return 0,
            }
        } else {
            dab
        };

        let Some(canvas) = lifecycle::working_canvas_mut(binding.target_mut(), entry) else {
            return 0;
        };
        apply_dab(canvas, hit, &dab, self.brush.stamp.as_ref())
    }

    /// Make sure the active canvas has a working copy, creating it (and
    /// capturing the baseline) on first need
    pub(crate) fn ensure_working_copy(&mut self) -> bool {
        let (Some(binding), Some(entry)) = (self.binding.as_mut(), self.active.as_ref()) else {
            return false;
        };
        if !lifecycle::has_working_copy(binding.target(), entry) {
            if !lifecycle::begin_working_copy(binding.target_mut(), entry, &self.config.canvas) {
                return false;
            }
            self.baseline = None;
        }
        if self.baseline.is_none() {
            self.baseline = lifecycle::working_snapshot(binding.target(), entry);
        }
        self.baseline.is_some()
    }

    /// Roll the live buffer back to the baseline if a preview is showing
    pub(crate) fn clear_preview(&mut self) {
        if !self.preview_shown {
            return;
        }
        self.preview_shown = false;
        let (Some(binding), Some(entry), Some(baseline)) =
            (self.binding.as_mut(), self.active.as_ref(), self.baseline.as_ref())
        else {
            return;
        };
        lifecycle::write_working(binding.target_mut(), entry, baseline);
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::brush::Falloff;
    use crate::canvas::{CanvasCatalog, HistoryKind, Snapshot};
    use crate::constants::{OPAQUE_WHITE, VERTEX_CANVAS_NAME};
    use crate::session::test_support::{OrthoView, quad_target};
    use crate::types::Modifiers;

    const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

    fn session(canvas: &str) -> PainterSession {
        let mut session = PainterSession::default();
        let target = quad_target(1);
        let catalog = CanvasCatalog::scan(&target.material);
        assert!(session.bind(target, catalog));
        assert!(session.start_painting(canvas));
        let brush = session.brush_mut();
        brush.color = RED;
        brush.blend = 1.0;
        brush.falloff = Falloff::Constant;
        session
    }

    fn event(kind: PointerEventKind, x: f32, y: f32) -> PointerEvent {
        PointerEvent::new(kind, Vec2::new(x, y))
    }

    fn send(session: &mut PainterSession, kind: PointerEventKind, x: f32, y: f32) -> PointerResponse {
        session.handle_pointer(&event(kind, x, y), &OrthoView, None)
    }

    fn vertex_colors(session: &PainterSession) -> Vec<[f32; 4]> {
        session.target().unwrap().mesh().unwrap().live_colors().unwrap().to_vec()
    }

    #[test]
    fn test_stroke_commits_once() {
        let mut session = session(VERTEX_CANVAS_NAME);
        session.brush_mut().radius = 0.5;

        assert_eq!(
            send(&mut session, PointerEventKind::Down, -0.95, -0.95),
            PointerResponse::Painted(1)
        );
        assert!(session.stroke().dirty);
        send(&mut session, PointerEventKind::Drag, 0.95, -0.95);
        assert_eq!(
            send(&mut session, PointerEventKind::Up, 0.95, -0.95),
            PointerResponse::Committed
        );

        let history = session.binding().unwrap().history();
        assert_eq!(history.len(HistoryKind::Vertex), 1);
        // The commit holds the pre-stroke content
        assert_eq!(
            history.restore_at(HistoryKind::Vertex, 0),
            Some(Snapshot::Vertex(vec![OPAQUE_WHITE; 4]))
        );
        let colors = vertex_colors(&session);
        assert_eq!(colors[0], RED);
        assert_eq!(colors[1], RED);
        assert_eq!(colors[2], OPAQUE_WHITE);
    }

    #[test]
    fn test_only_one_inside_sample_still_commits_once() {
        let mut session = session(VERTEX_CANVAS_NAME);
        session.brush_mut().radius = 0.3;

        // Five drags; only the third lands near a vertex
        send(&mut session, PointerEventKind::Down, 0.0, 0.0);
        let points = [(0.0, 0.1), (0.1, 0.0), (0.9, 0.9), (0.0, -0.1), (-0.1, 0.0)];
        let mut painted = Vec::new();
        for (x, y) in points {
            if let PointerResponse::Painted(n) = send(&mut session, PointerEventKind::Drag, x, y) {
                painted.push(n);
            }
        }
        assert_eq!(painted, vec![0, 0, 1, 0, 0]);
        assert_eq!(
            send(&mut session, PointerEventKind::Up, 0.0, 0.0),
            PointerResponse::Committed
        );
        let history = session.binding().unwrap().history();
        assert_eq!(history.len(HistoryKind::Vertex), 1);
    }

    #[test]
    fn test_drag_miss_keeps_stroke_paint() {
        let mut session = session(VERTEX_CANVAS_NAME);
        session.brush_mut().radius = 0.5;
        send(&mut session, PointerEventKind::Down, -0.95, -0.95);
        assert_eq!(
            send(&mut session, PointerEventKind::Drag, 5.0, 5.0),
            PointerResponse::Missed
        );
        assert_eq!(vertex_colors(&session)[0], RED);
        assert!(session.stroke().active);
        assert_eq!(
            send(&mut session, PointerEventKind::Up, 5.0, 5.0),
            PointerResponse::Committed
        );
    }

    #[test]
    fn test_stroke_without_hits_commits_nothing() {
        let mut session = session(VERTEX_CANVAS_NAME);
        send(&mut session, PointerEventKind::Down, 10.0, 10.0);
        for i in 0..5 {
            assert_eq!(
                send(&mut session, PointerEventKind::Drag, 10.0 + i as f32, 10.0),
                PointerResponse::Missed
            );
        }
        assert_eq!(
            send(&mut session, PointerEventKind::Up, 10.0, 10.0),
            PointerResponse::Ended
        );
        assert_eq!(session.binding().unwrap().history().len(HistoryKind::Vertex), 0);
    }

    #[test]
    fn test_zero_blend_stroke_not_dirty() {
        let mut session = session(VERTEX_CANVAS_NAME);
        session.brush_mut().blend = 0.0;
        session.brush_mut().radius = 2.0;
        send(&mut session, PointerEventKind::Down, 0.0, 0.0);
        send(&mut session, PointerEventKind::Drag, 0.2, 0.0);
        assert_eq!(
            send(&mut session, PointerEventKind::Up, 0.2, 0.0),
            PointerResponse::Ended
        );
        assert_eq!(vertex_colors(&session), vec![OPAQUE_WHITE; 4]);
    }

    #[test]
    fn test_modifiers_block_painting() {
        let mut session = session(VERTEX_CANVAS_NAME);
        session.brush_mut().radius = 2.0;
        let down = event(PointerEventKind::Down, 0.0, 0.0).with_modifiers(Modifiers {
            alt: true,
            ..Modifiers::NONE
        });
        assert_eq!(
            session.handle_pointer(&down, &OrthoView, None),
            PointerResponse::Ignored
        );
        assert!(!session.stroke().active);
        assert_eq!(vertex_colors(&session), vec![OPAQUE_WHITE; 4]);
    }

    #[test]
    fn test_invalid_pressure_rejected() {
        let mut session = session(VERTEX_CANVAS_NAME);
        session.brush_mut().radius = 2.0;
        let down = event(PointerEventKind::Down, 0.0, 0.0).with_pressure(1.5);
        assert_eq!(
            session.handle_pointer(&down, &OrthoView, None),
            PointerResponse::Painted(0)
        );
        assert!(!session.stroke().dirty);
        assert_eq!(vertex_colors(&session), vec![OPAQUE_WHITE; 4]);
    }

    #[test]
    fn test_hover_preview_rolls_back() {
        let mut session = session("_MainTex");
        session.brush_mut().radius = 0.1;

        assert_eq!(
            send(&mut session, PointerEventKind::Move, 0.0, 0.0),
            PointerResponse::Previewed
        );
        let live = |s: &PainterSession| {
            s.target()
                .unwrap()
                .material
                .texture_slot("_MainTex")
                .unwrap()
                .live()
                .unwrap()
                .pixels
                .clone()
        };
        let center = session.config().canvas.flat_resolution / 2;
        assert_eq!(live(&session).get_pixel(0, center, center), Some(RED));

        // Moving somewhere else replaces the preview instead of accumulating
        send(&mut session, PointerEventKind::Move, 0.5, 0.0);
        assert_eq!(live(&session).get_pixel(0, center, center), Some(OPAQUE_WHITE));

        // Moving off the surface restores the baseline
        assert_eq!(
            send(&mut session, PointerEventKind::Move, 9.0, 9.0),
            PointerResponse::Missed
        );
        assert!(live(&session).pixels().iter().all(|p| *p == OPAQUE_WHITE));

        // Rolling back twice is harmless
        send(&mut session, PointerEventKind::Move, 9.0, 9.0);
        assert!(live(&session).pixels().iter().all(|p| *p == OPAQUE_WHITE));
        assert_eq!(session.binding().unwrap().history().len(HistoryKind::Raster), 0);
    }

    #[test]
    fn test_preview_is_not_committed() {
        let mut session = session("_MainTex");
        session.brush_mut().radius = 0.1;
        send(&mut session, PointerEventKind::Move, 0.0, 0.0);
        send(&mut session, PointerEventKind::Down, 0.5, 0.5);
        send(&mut session, PointerEventKind::Up, 0.5, 0.5);

        let history = session.binding().unwrap().history();
        let committed = history.restore_at(HistoryKind::Raster, 0).unwrap();
        match committed {
            Snapshot::Raster(pixels) => {
                assert!(pixels.pixels().iter().all(|p| *p == OPAQUE_WHITE));
            }
            Snapshot::Vertex(_) => panic!("expected raster snapshot"),
        }
    }

    #[test]
    fn test_directional_needs_movement() {
        let mut session = session("_MainTex");
        let brush = session.brush_mut();
        brush.set_mode(CompositeMode::Directional);
        brush.radius = 0.05;

        assert_eq!(
            send(&mut session, PointerEventKind::Down, 0.0, 0.0),
            PointerResponse::Painted(0)
        );
        // Miss keeps the previous UV
        assert_eq!(
            send(&mut session, PointerEventKind::Drag, 5.0, 0.0),
            PointerResponse::Missed
        );
        let response = send(&mut session, PointerEventKind::Drag, 0.4, 0.0);
        assert!(matches!(response, PointerResponse::Painted(n) if n > 0));

        let slot = session.target().unwrap().material.texture_slot("_MainTex").unwrap();
        let canvas = slot.live().unwrap();
        // uv (0.7, 0.5): moving along +U encodes as red 1, green 0.5
        let x = (0.7 * canvas.width() as f32) as u32;
        let y = canvas.height() / 2;
        let pixel = canvas.pixels.get_pixel(0, x, y).unwrap();
        assert!((pixel[0] - 1.0).abs() < 1e-5);
        assert!((pixel[1] - 0.5).abs() < 1e-5);
        assert_eq!(pixel[2], 0.0);
    }

    #[test]
    fn test_accumulates_within_stroke() {
        let mut session = session(VERTEX_CANVAS_NAME);
        let brush = session.brush_mut();
        brush.color = [0.0, 0.0, 0.0, 1.0];
        brush.blend = 0.5;
        brush.radius = 0.1;

        send(&mut session, PointerEventKind::Down, 0.95, 0.95);
        send(&mut session, PointerEventKind::Drag, 0.95, 0.95);
        let colors = vertex_colors(&session);
        assert!((colors[2][0] - 0.25).abs() < 1e-6);
        assert_eq!(colors[2][3], 1.0);
    }
}
