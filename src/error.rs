use thiserror::Error;

/// Validation errors for externally supplied crop geometry.
///
/// These are precondition violations: the upstream caller handed us geometry
/// that can never describe a crop region.
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    /// A rect with a negative width or height.
    #[error("rect has negative dimensions: {width}x{height}")]
    NegativeRect { width: f32, height: f32 },
    /// A point list that is not exactly four corners.
    #[error("quad must have exactly 4 points, got {count}")]
    WrongPointCount { count: usize },
}
