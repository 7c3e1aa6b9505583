use crate::geometry::Point;

/// The device class a pointer event originated from.
///
/// Browsers fire synthetic mouse events after touch events for the same
/// physical gesture; the edit session uses the kind to suppress those, so it
/// matters that the widget layer reports it honestly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
}

/// One pointer position in viewport/client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub kind: PointerKind,
    pub client: Point,
}

impl PointerSample {
    pub fn mouse(client: Point) -> Self {
        Self {
            kind: PointerKind::Mouse,
            client,
        }
    }

    pub fn touch(client: Point) -> Self {
        Self {
            kind: PointerKind::Touch,
            client,
        }
    }

    /// Touch gestures track the first active touch point; `None` when every
    /// finger has lifted.
    pub fn first_touch(touches: &[Point]) -> Option<Self> {
        touches.first().map(|client| Self::touch(*client))
    }
}

/// Where a pointer-down landed on the cropper surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// On a drag handle, by handle index 0..8.
    Handle(usize),
    /// Inside the polygon body, not on a handle.
    Polygon,
    /// On the surface but outside the polygon.
    Outside,
}
