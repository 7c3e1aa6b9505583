use log::debug;

use crate::error::GeometryError;
use crate::geometry::{Point, Quad, Rect};
use crate::handles::{corner_index, edge_corners};
use crate::input::{HitTarget, PointerKind, PointerSample};
use crate::transform::ScreenTransform;

/// The drag gesture currently in progress.
///
/// Both dragging states carry the snapshot taken at pointer-down: every move
/// is computed as snapshot + total pointer offset, never incrementally from
/// the previous frame, so a drag is order-independent and does not
/// accumulate float error.
#[derive(Debug, Clone, PartialEq)]
enum DragState {
    Idle,
    /// Translating the whole polygon.
    Polygon {
        anchor: Point,
        original: [Point; 4],
    },
    /// Dragging one of the eight handles.
    Handle {
        index: usize,
        anchor: Point,
        original: [Point; 4],
    },
}

/// Owns the live crop geometry and the pointer-drag state machine.
///
/// The session is the single writer of the point array; readers always see a
/// consistent quad because the four points are replaced wholesale on every
/// committed move. State lives only in memory for the lifetime of the
/// editing session.
#[derive(Debug)]
pub struct EditSession {
    points: Option<[Point; 4]>,
    /// Natural pixel size of the image under edit, used for the
    /// whole-polygon bounds check.
    image_size: Option<(f32, f32)>,
    /// True when the last supplied geometry was a free quad; false when it
    /// was a rect, which makes corner drags keep the shape axis-aligned.
    using_quad: bool,
    /// Once a touch gesture has been seen, mouse down/up are ignored so the
    /// synthetic mouse events browsers fire after touch events cannot
    /// double-process the same gesture.
    using_touch: bool,
    selected_handle: Option<usize>,
    drag: DragState,
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditSession {
    pub fn new() -> Self {
        Self {
            points: None,
            image_size: None,
            using_quad: false,
            using_touch: false,
            selected_handle: None,
            drag: DragState::Idle,
        }
    }

    /// Set the natural pixel dimensions of the image under edit.
    pub fn set_image_size(&mut self, width: f32, height: f32) {
        self.image_size = Some((width, height));
    }

    pub fn image_size(&self) -> Option<(f32, f32)> {
        self.image_size
    }

    /// Supply an initial rect. Resets the mode flag to axis-aligned editing
    /// and replaces the point array in one step.
    pub fn set_rect(&mut self, rect: Rect) -> Result<(), GeometryError> {
        rect.validate()?;
        self.using_quad = false;
        self.points = Some(rect.to_quad().points);
        self.cancel_drag();
        Ok(())
    }

    /// Supply an initial quad. Resets the mode flag to free editing and
    /// replaces the point array in one step.
    pub fn set_quad(&mut self, quad: Quad) {
        self.using_quad = true;
        self.points = Some(quad.points);
        self.cancel_drag();
    }

    /// The four live corner points, if any geometry has been supplied.
    pub fn points(&self) -> Option<&[Point; 4]> {
        self.points.as_ref()
    }

    /// The live points wrapped as a quad.
    pub fn quad(&self) -> Option<Quad> {
        self.points.map(Quad::new)
    }

    /// The floored axis-aligned bounding rect of the live points.
    pub fn bounding_rect(&self) -> Option<Rect> {
        self.quad().map(|quad| quad.bounding_rect())
    }

    /// True in free-quad mode, false in axis-aligned rect mode.
    pub fn using_quad(&self) -> bool {
        self.using_quad
    }

    /// The handle currently selected for dragging, if any.
    pub fn selected_handle(&self) -> Option<usize> {
        self.selected_handle
    }

    /// True once any touch-originated event has been seen.
    pub fn using_touch(&self) -> bool {
        self.using_touch
    }

    pub fn polygon_drag_active(&self) -> bool {
        matches!(self.drag, DragState::Polygon { .. })
    }

    pub fn is_dragging(&self) -> bool {
        !matches!(self.drag, DragState::Idle)
    }

    /// Pointer-down on the surface. Starts a polygon or handle drag
    /// depending on what the pointer landed on; the two drag modes are
    /// mutually exclusive, so starting one always cancels the other.
    pub fn pointer_down(
        &mut self,
        target: HitTarget,
        sample: PointerSample,
        transform: &ScreenTransform,
    ) {
        if !self.admit(sample.kind) {
            return;
        }
        let Some(points) = self.points else {
            return;
        };
        let anchor = transform.to_image(sample.client);

        match target {
            HitTarget::Handle(index) => {
                debug!("drag start: handle {index}");
                self.selected_handle = Some(index);
                self.drag = DragState::Handle {
                    index,
                    anchor,
                    original: points,
                };
            }
            HitTarget::Polygon => {
                debug!("drag start: polygon");
                self.selected_handle = None;
                self.drag = DragState::Polygon {
                    anchor,
                    original: points,
                };
            }
            HitTarget::Outside => {}
        }
    }

    /// Pointer moved. The transform is taken fresh on every move because the
    /// surface may have been resized or scrolled since the last event.
    pub fn pointer_move(&mut self, sample: PointerSample, transform: &ScreenTransform) {
        let pos = transform.to_image(sample.client);
        match self.drag.clone() {
            DragState::Idle => {}
            DragState::Polygon { anchor, original } => {
                self.move_polygon(original, pos.x - anchor.x, pos.y - anchor.y);
            }
            DragState::Handle {
                index,
                anchor,
                original,
            } => {
                self.move_handle(index, original, pos.x - anchor.x, pos.y - anchor.y);
            }
        }
    }

    /// Pointer released. Mouse release is observed at the surface level
    /// ("mouse up anywhere"), so a drag terminates even when the pointer has
    /// left the polygon and handles; it unconditionally clears both the
    /// selected handle and any polygon drag.
    pub fn pointer_up(&mut self, kind: PointerKind) {
        if !self.admit(kind) {
            return;
        }
        self.cancel_drag();
    }

    /// Explicit end of a touch gesture.
    pub fn touch_ended(&mut self) {
        self.cancel_drag();
    }

    fn cancel_drag(&mut self) {
        self.selected_handle = None;
        self.drag = DragState::Idle;
    }

    /// Device-class guard: a touch event flips the session into touch mode,
    /// after which mouse down/up are dropped.
    fn admit(&mut self, kind: PointerKind) -> bool {
        match kind {
            PointerKind::Touch => {
                self.using_touch = true;
                true
            }
            PointerKind::Mouse => !self.using_touch,
        }
    }

    /// Whole-polygon translation. If any shifted corner would leave
    /// `[0, width] x [0, height]` the entire move is rejected and the points
    /// stay where they were; this is rejection, not projection, and it is
    /// not an error.
    fn move_polygon(&mut self, original: [Point; 4], dx: f32, dy: f32) {
        let Some((width, height)) = self.image_size else {
            return;
        };
        let candidate = original.map(|p| p.translated(dx, dy));
        for point in &candidate {
            if point.x < 0.0 || point.y < 0.0 || point.x > width || point.y > height {
                debug!("polygon drag rejected: corner out of bounds");
                return;
            }
        }
        self.points = Some(candidate);
    }

    /// Handle drag. Corner handles honor the mode flag (rect mode couples
    /// the two adjacent corners to stay axis-aligned); edge-midpoint handles
    /// couple their edge's corners on one axis in both modes. Handle drags
    /// are not bounds-checked, so points may leave the canvas.
    fn move_handle(&mut self, index: usize, original: [Point; 4], dx: f32, dy: f32) {
        let mut next = original;

        if let Some(corner) = corner_index(index) {
            let moved = original[corner].translated(dx, dy);
            next[corner] = moved;
            if !self.using_quad {
                // Keep the rectangle axis-aligned: the horizontal neighbor
                // follows in y, the vertical neighbor follows in x.
                match corner {
                    0 => {
                        next[1].y = moved.y;
                        next[3].x = moved.x;
                    }
                    1 => {
                        next[0].y = moved.y;
                        next[2].x = moved.x;
                    }
                    2 => {
                        next[1].x = moved.x;
                        next[3].y = moved.y;
                    }
                    _ => {
                        next[0].x = moved.x;
                        next[2].y = moved.y;
                    }
                }
            }
        } else if let Some((a, b)) = edge_corners(index) {
            // Odd handles slide their whole edge along one axis, regardless
            // of the mode flag.
            match index {
                1 | 5 => {
                    next[a].y = original[a].y + dy;
                    next[b].y = original[b].y + dy;
                }
                _ => {
                    next[a].x = original[a].x + dx;
                    next[b].x = original[b].x + dx;
                }
            }
        }

        self.points = Some(next);
    }
}
