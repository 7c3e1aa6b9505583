use crate::geometry::{Point, Rect};

/// The affine transform mapping the rendering surface's local coordinate
/// space to viewport/client pixel space: scale/skew `a,b,c,d` and translation
/// `e,f`, laid out like a DOM/SVG screen CTM.
///
/// The surface can move or rescale between pointer events (window resize,
/// scroll), so callers must re-derive the current transform for every move
/// rather than caching one at the start of a gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenTransform {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl ScreenTransform {
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    /// The transform for an image of `image_width`/`image_height` pixels
    /// drawn into the screen-space rect `surface`.
    pub fn fit(image_width: f32, image_height: f32, surface: Rect) -> Self {
        Self {
            a: surface.width / image_width,
            b: 0.0,
            c: 0.0,
            d: surface.height / image_height,
            e: surface.x,
            f: surface.y,
        }
    }

    /// Convert viewport/client coordinates into image-space coordinates:
    /// `x' = (client_x - e) / a`, `y' = (client_y - f) / d`.
    pub fn to_image(&self, client: Point) -> Point {
        Point::new((client.x - self.e) / self.a, (client.y - self.f) / self.d)
    }

    /// Convert image-space coordinates back to viewport/client coordinates.
    pub fn to_client(&self, point: Point) -> Point {
        Point::new(point.x * self.a + self.e, point.y * self.d + self.f)
    }
}

impl Default for ScreenTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_maps_points_to_themselves() {
        let transform = ScreenTransform::IDENTITY;
        let p = Point::new(12.5, -3.0);
        assert_eq!(transform.to_image(p), p);
        assert_eq!(transform.to_client(p), p);
    }

    #[test]
    fn fit_round_trips_corners() {
        let transform = ScreenTransform::fit(1000.0, 500.0, Rect::new(20.0, 10.0, 400.0, 200.0));
        // Top-left of the surface is image origin.
        assert_eq!(
            transform.to_image(Point::new(20.0, 10.0)),
            Point::new(0.0, 0.0)
        );
        // Bottom-right of the surface is the image's far corner.
        assert_eq!(
            transform.to_image(Point::new(420.0, 210.0)),
            Point::new(1000.0, 500.0)
        );
        assert_eq!(
            transform.to_client(Point::new(500.0, 250.0)),
            Point::new(220.0, 110.0)
        );
    }
}
