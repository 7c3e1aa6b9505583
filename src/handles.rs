use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Number of drag handles around the quad: four corners and four edge
/// midpoints.
pub const HANDLE_COUNT: usize = 8;

/// Base handle size in image pixels for touch input.
pub const TOUCH_BASE_SIZE: f32 = 44.0;
/// Base handle size in image pixels for mouse input.
pub const MOUSE_BASE_SIZE: f32 = 20.0;

/// Reference image width that handle sizes are calibrated against. Handles
/// scale with `natural_width / REFERENCE_WIDTH` so they look the same across
/// image resolutions.
pub const REFERENCE_WIDTH: f32 = 750.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Maps a handle index to the corner point it moves directly.
///
/// Even indices 0,2,4,6 are the corners 0..=3; odd indices are edge midpoints
/// with no single corner of their own.
pub fn corner_index(handle: usize) -> Option<usize> {
    debug_assert!(handle < HANDLE_COUNT);
    if handle % 2 == 0 {
        Some(handle / 2)
    } else {
        None
    }
}

/// The two corner indices adjacent to an odd (edge-midpoint) handle, in
/// winding order: handle 1 spans edge 0-1, handle 3 spans 1-2, handle 5
/// spans 2-3, handle 7 spans 3-0.
pub fn edge_corners(handle: usize) -> Option<(usize, usize)> {
    match handle {
        1 => Some((0, 1)),
        3 => Some((1, 2)),
        5 => Some((2, 3)),
        7 => Some((3, 0)),
        _ => None,
    }
}

/// The coordinate of handle `handle` on `axis`: the corner coordinate for
/// even indices, the edge-midpoint average for odd indices.
pub fn handle_position(points: &[Point; 4], handle: usize, axis: Axis) -> f32 {
    let point = handle_point(points, handle);
    match axis {
        Axis::X => point.x,
        Axis::Y => point.y,
    }
}

/// Like [`handle_position`] but for both axes at once.
pub fn handle_point(points: &[Point; 4], handle: usize) -> Point {
    match corner_index(handle) {
        Some(corner) => points[corner],
        None => {
            // Midpoint of the edge the handle sits on.
            let (a, b) = match handle {
                1 => (0, 1),
                3 => (1, 2),
                5 => (2, 3),
                _ => (3, 0),
            };
            Point::new(
                (points[a].x + points[b].x) / 2.0,
                (points[a].y + points[b].y) / 2.0,
            )
        }
    }
}

/// Where to draw the handle square: its anchor point shifted up-left by half
/// the square size so the square is centered on the point.
pub fn render_point(points: &[Point; 4], handle: usize, size: f32) -> Point {
    let p = handle_point(points, handle);
    Point::new(p.x - size / 2.0, p.y - size / 2.0)
}

/// Handle sizing configuration.
///
/// Both knobs are injected rather than probed from the environment so
/// behavior stays deterministic: whether the input device is touch-capable
/// and an optional explicit size override.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HandleConfig {
    /// Touch devices get bigger handles.
    pub touch_device: bool,
    /// Explicit size in image pixels, pre-ratio. Wins over the device default.
    pub size_override: Option<f32>,
}

impl HandleConfig {
    /// Visual handle size in image pixels for an image of the given natural
    /// width: `ceil(base * natural_width / 750)`, ratio 1 when there is no
    /// image yet.
    pub fn size(&self, natural_width: Option<f32>) -> f32 {
        let ratio = self.ratio(natural_width);
        let base = self.size_override.unwrap_or(if self.touch_device {
            TOUCH_BASE_SIZE
        } else {
            MOUSE_BASE_SIZE
        });
        (base * ratio).ceil()
    }

    /// Resolution scale shared by handle squares and polygon stroke widths.
    pub fn ratio(&self, natural_width: Option<f32>) -> f32 {
        match natural_width {
            Some(width) => width / REFERENCE_WIDTH,
            None => 1.0,
        }
    }
}
