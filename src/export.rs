use std::io::Cursor;
use std::sync::Arc;

use image::{DynamicImage, ImageFormat, RgbaImage};
use log::{debug, info};
use parking_lot::Mutex;
use thiserror::Error;

use crate::geometry::{Quad, Rect};
use crate::normalizer::{
    runtime_template, ColorMode, DocumentNormalizer, NormalizeError, NormalizerInstance,
};
use crate::session::EditSession;
use crate::util::time;

#[derive(Debug, Error)]
pub enum ExportError {
    /// The session has no points yet; nothing to crop.
    #[error("no crop geometry has been set")]
    NoGeometry,
    /// The bounding rect collapsed to nothing, e.g. all corners dragged onto
    /// one point.
    #[error("crop rect is empty: {width}x{height}")]
    EmptyCrop { width: u32, height: u32 },
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error("failed to encode cropped image: {0}")]
    Encode(#[from] image::ImageError),
}

/// Options for a single export call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions {
    /// Perspective-correct through the document normalizer instead of taking
    /// the axis-aligned bounding crop.
    pub perspective: bool,
    /// Output color mode for the perspective path. `None` keeps whatever the
    /// instance is currently configured with.
    pub color_mode: Option<ColorMode>,
}

/// Produces cropped rasters from the session's live geometry.
///
/// The exporter never mutates the session; it reads the points on demand.
/// The optional normalizer collaborator is injected at construction and its
/// instance is created lazily on the first perspective export. Export calls
/// are not serialized against each other here; callers that overlap exports
/// share the one instance handle.
pub struct Exporter {
    normalizer: Option<Arc<dyn DocumentNormalizer>>,
    license: Option<String>,
    instance: Mutex<Option<Arc<dyn NormalizerInstance>>>,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter {
    /// An exporter without the perspective capability. Plain bounding-rect
    /// crops still work; perspective exports fail with
    /// [`NormalizeError::Unavailable`].
    pub fn new() -> Self {
        Self {
            normalizer: None,
            license: None,
            instance: Mutex::new(None),
        }
    }

    pub fn with_normalizer(
        normalizer: Arc<dyn DocumentNormalizer>,
        license: Option<String>,
    ) -> Self {
        Self {
            normalizer: Some(normalizer),
            license,
            instance: Mutex::new(None),
        }
    }

    pub fn has_normalizer(&self) -> bool {
        self.normalizer.is_some()
    }

    /// Crop the current geometry out of `image` and return encoded PNG
    /// bytes.
    ///
    /// The default path copies the bounding-rect sub-region into a raster of
    /// exactly that size. The perspective path hands the live quad to the
    /// normalizer collaborator; its two delegated calls (lazy instance
    /// creation and the normalize itself) are awaited sequentially.
    pub async fn export(
        &self,
        session: &EditSession,
        image: &DynamicImage,
        options: ExportOptions,
    ) -> Result<Vec<u8>, ExportError> {
        let started = time::current_time_secs();
        let bytes = if options.perspective {
            let quad = session.quad().ok_or(ExportError::NoGeometry)?;
            let corrected = self.normalize(image, quad, options.color_mode).await?;
            encode_png(&corrected.to_rgba8())?
        } else {
            let rect = session.bounding_rect().ok_or(ExportError::NoGeometry)?;
            let cropped = crop_to_rect(image, rect)?;
            encode_png(&cropped)?
        };
        debug!(
            "export finished in {:.1} ms ({} bytes)",
            (time::current_time_secs() - started) * 1000.0,
            bytes.len()
        );
        Ok(bytes)
    }

    /// Ask the normalizer for candidate document boundaries in `image`, best
    /// candidate first.
    pub async fn detect_quad(&self, image: &DynamicImage) -> Result<Vec<Quad>, ExportError> {
        let instance = self.instance().await?;
        let candidates = instance.detect_quad(image).await?;
        info!("detected {} quad candidate(s)", candidates.len());
        Ok(candidates)
    }

    async fn normalize(
        &self,
        image: &DynamicImage,
        quad: Quad,
        color_mode: Option<ColorMode>,
    ) -> Result<DynamicImage, ExportError> {
        let instance = self.instance().await?;
        if let Some(mode) = color_mode {
            instance.set_runtime_settings(&runtime_template(mode))?;
        }
        Ok(instance.normalize(image, quad).await?)
    }

    /// The lazily created normalizer instance. The mutex only guards the
    /// handle; it is not held across the creation await, so two racing first
    /// calls may both create and the later one wins.
    async fn instance(&self) -> Result<Arc<dyn NormalizerInstance>, NormalizeError> {
        let normalizer = self.normalizer.as_ref().ok_or(NormalizeError::Unavailable)?;
        if let Some(existing) = self.instance.lock().clone() {
            return Ok(existing);
        }
        info!("creating normalizer instance");
        let created = normalizer.create_instance(self.license.as_deref()).await?;
        *self.instance.lock() = Some(created.clone());
        Ok(created)
    }
}

/// Copy the axis-aligned sub-region `rect` of `image` into a raster of
/// exactly `rect.width x rect.height` pixels, placed at the origin.
///
/// Handle drags may push the rect partially outside the image; the part
/// with no source pixels stays transparent rather than failing the export.
pub fn crop_to_rect(image: &DynamicImage, rect: Rect) -> Result<RgbaImage, ExportError> {
    let width = rect.width as u32;
    let height = rect.height as u32;
    if width == 0 || height == 0 {
        return Err(ExportError::EmptyCrop { width, height });
    }

    let rx = rect.x as i64;
    let ry = rect.y as i64;
    let source = image.to_rgba8();
    let mut out = RgbaImage::new(width, height);

    // Overlap of the requested rect with the source image.
    let x0 = rx.max(0);
    let y0 = ry.max(0);
    let x1 = (rx + width as i64).min(source.width() as i64);
    let y1 = (ry + height as i64).min(source.height() as i64);

    if x1 > x0 && y1 > y0 {
        let view = image::imageops::crop_imm(
            &source,
            x0 as u32,
            y0 as u32,
            (x1 - x0) as u32,
            (y1 - y0) as u32,
        )
        .to_image();
        image::imageops::replace(&mut out, &view, x0 - rx, y0 - ry);
    } else {
        debug!("crop rect {rect:?} lies entirely outside the source image");
    }

    Ok(out)
}

fn encode_png(raster: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    raster.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}
