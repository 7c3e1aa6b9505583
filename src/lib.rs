#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod error;
pub mod event;
pub mod export;
pub mod geometry;
pub mod handles;
pub mod input;
pub mod normalizer;
pub mod session;
pub mod texture;
pub mod transform;
pub mod util;
pub mod widgets;

pub use app::CropperApp;
pub use error::GeometryError;
pub use event::{CropperEvent, EventBus, EventHandler};
pub use export::{ExportError, ExportOptions, Exporter};
pub use geometry::{Point, Quad, Rect};
pub use handles::{Axis, HandleConfig};
pub use input::{HitTarget, PointerKind, PointerSample};
pub use normalizer::{ColorMode, DocumentNormalizer, NormalizeError, NormalizerInstance};
pub use session::EditSession;
pub use transform::ScreenTransform;
