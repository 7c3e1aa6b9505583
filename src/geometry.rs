use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

/// A point in image pixel space (not viewport pixels).
///
/// Points are plain value types: every edit produces a new `Point`, nothing
/// mutates one in place. This is what makes drag snapshots reproducible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// This point shifted by `(dx, dy)`.
    pub fn translated(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// An ordered four-corner polygon in image pixel space.
///
/// The corner order is significant: handle indices and edge midpoints are
/// defined positionally against it. When derived from a [`Rect`] the order is
/// top-left, top-right, bottom-right, bottom-left. A quad is not required to
/// be convex or axis-aligned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub points: [Point; 4],
}

impl Quad {
    pub fn new(points: [Point; 4]) -> Self {
        Self { points }
    }

    /// Build a quad from a slice, failing unless it has exactly 4 points.
    pub fn from_points(points: &[Point]) -> Result<Self, GeometryError> {
        match points {
            [p0, p1, p2, p3] => Ok(Self::new([*p0, *p1, *p2, *p3])),
            _ => Err(GeometryError::WrongPointCount {
                count: points.len(),
            }),
        }
    }

    /// The axis-aligned bounding rect of the four corners.
    ///
    /// Coordinates are floored, so `width = floor(max_x) - floor(min_x)` and
    /// the exact vertex positions are lost unless the quad already is an
    /// integer-aligned rectangle. A fully degenerate quad (all corners equal)
    /// yields a well-formed zero-size rect.
    pub fn bounding_rect(&self) -> Rect {
        let mut min_x = self.points[0].x;
        let mut min_y = self.points[0].y;
        let mut max_x = self.points[0].x;
        let mut max_y = self.points[0].y;

        for point in &self.points[1..] {
            min_x = min_x.min(point.x);
            min_y = min_y.min(point.y);
            max_x = max_x.max(point.x);
            max_y = max_y.max(point.y);
        }

        let min_x = min_x.floor();
        let min_y = min_y.floor();
        let max_x = max_x.floor();
        let max_y = max_y.floor();

        Rect {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }

    /// Even-odd test for whether `point` lies inside the polygon.
    ///
    /// Used for hit testing the polygon body; corners on the boundary count
    /// as inside often enough for interaction purposes.
    pub fn contains(&self, point: Point) -> bool {
        let mut inside = false;
        let mut j = 3;
        for i in 0..4 {
            let pi = self.points[i];
            let pj = self.points[j];
            if (pi.y > point.y) != (pj.y > point.y) {
                let cross_x = (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x;
                if point.x < cross_x {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}

impl From<Rect> for Quad {
    fn from(rect: Rect) -> Self {
        rect.to_quad()
    }
}

/// An axis-aligned rectangle with non-negative dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Fail fast on rects with negative dimensions rather than letting them
    /// produce nonsense handle positions downstream.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.width < 0.0 || self.height < 0.0 {
            return Err(GeometryError::NegativeRect {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// The four corners in handle order: top-left, top-right, bottom-right,
    /// bottom-left. Lossless for axis-aligned geometry.
    pub fn to_quad(self) -> Quad {
        Quad::new([
            Point::new(self.x, self.y),
            Point::new(self.x + self.width, self.y),
            Point::new(self.x + self.width, self.y + self.height),
            Point::new(self.x, self.y + self.height),
        ])
    }
}
