use std::sync::Arc;

use futures::executor::block_on;
use futures::future::BoxFuture;
use image::{DynamicImage, Rgba, RgbaImage};
use parking_lot::Mutex;

use eframe_cropper::export::{crop_to_rect, ExportError, ExportOptions, Exporter};
use eframe_cropper::geometry::{Point, Quad, Rect};
use eframe_cropper::normalizer::{
    ColorMode, DocumentNormalizer, NormalizeError, NormalizerInstance,
};
use eframe_cropper::session::EditSession;

/// A source image whose pixel at (x, y) encodes its own coordinates, so
/// crops can be checked for sampling the right region.
fn coordinate_image(width: u32, height: u32) -> DynamicImage {
    let mut img = RgbaImage::new(width, height);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        *pixel = Rgba([x as u8, y as u8, 0, 255]);
    }
    DynamicImage::ImageRgba8(img)
}

fn session_with_rect(width: f32, height: f32, rect: Rect) -> EditSession {
    let mut session = EditSession::new();
    session.set_image_size(width, height);
    session.set_rect(rect).unwrap();
    session
}

#[derive(Default)]
struct StubState {
    created: usize,
    settings: Vec<String>,
    normalized_quads: Vec<Quad>,
}

/// In-memory stand-in for the external normalization engine.
struct StubNormalizer {
    state: Arc<Mutex<StubState>>,
    output_size: (u32, u32),
}

struct StubInstance {
    state: Arc<Mutex<StubState>>,
    output_size: (u32, u32),
}

impl DocumentNormalizer for StubNormalizer {
    fn create_instance(
        &self,
        _license: Option<&str>,
    ) -> BoxFuture<'static, Result<Arc<dyn NormalizerInstance>, NormalizeError>> {
        let state = self.state.clone();
        let output_size = self.output_size;
        Box::pin(async move {
            state.lock().created += 1;
            Ok(Arc::new(StubInstance { state, output_size }) as Arc<dyn NormalizerInstance>)
        })
    }
}

impl NormalizerInstance for StubInstance {
    fn set_runtime_settings(&self, template: &str) -> Result<(), NormalizeError> {
        self.state.lock().settings.push(template.to_owned());
        Ok(())
    }

    fn normalize(
        &self,
        _image: &DynamicImage,
        quad: Quad,
    ) -> BoxFuture<'_, Result<DynamicImage, NormalizeError>> {
        Box::pin(async move {
            self.state.lock().normalized_quads.push(quad);
            Ok(DynamicImage::ImageRgba8(RgbaImage::new(
                self.output_size.0,
                self.output_size.1,
            )))
        })
    }

    fn detect_quad(
        &self,
        _image: &DynamicImage,
    ) -> BoxFuture<'_, Result<Vec<Quad>, NormalizeError>> {
        Box::pin(async {
            Ok(vec![Quad::new([
                Point::new(4.0, 4.0),
                Point::new(60.0, 6.0),
                Point::new(58.0, 28.0),
                Point::new(5.0, 27.0),
            ])])
        })
    }
}

#[test]
fn plain_export_has_exact_crop_dimensions() {
    let source = coordinate_image(64, 32);
    let session = session_with_rect(64.0, 32.0, Rect::new(5.0, 5.0, 20.0, 10.0));
    let exporter = Exporter::new();

    let bytes = block_on(exporter.export(&session, &source, ExportOptions::default())).unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap();

    assert_eq!(decoded.width(), 20);
    assert_eq!(decoded.height(), 10);

    // Pixel (0,0) of the crop is pixel (5,5) of the source.
    let rgba = decoded.to_rgba8();
    assert_eq!(*rgba.get_pixel(0, 0), Rgba([5, 5, 0, 255]));
    assert_eq!(*rgba.get_pixel(19, 9), Rgba([24, 14, 0, 255]));
}

#[test]
fn crop_to_rect_pads_out_of_canvas_regions() {
    let source = coordinate_image(16, 16);
    // Rect reaching above and left of the image: same output size, with
    // transparent pixels where there is no source.
    let cropped = crop_to_rect(&source, Rect::new(-4.0, -4.0, 8.0, 8.0)).unwrap();

    assert_eq!(cropped.width(), 8);
    assert_eq!(cropped.height(), 8);
    assert_eq!(*cropped.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
    assert_eq!(*cropped.get_pixel(4, 4), Rgba([0, 0, 0, 255]));
    assert_eq!(*cropped.get_pixel(7, 7), Rgba([3, 3, 0, 255]));
}

#[test]
fn degenerate_geometry_is_an_empty_crop_error() {
    let source = coordinate_image(16, 16);
    let mut session = EditSession::new();
    session.set_image_size(16.0, 16.0);
    session.set_quad(Quad::new([Point::new(8.0, 8.0); 4]));

    // The bounding rect itself is well-formed (0x0)...
    assert_eq!(
        session.bounding_rect().unwrap(),
        Rect::new(8.0, 8.0, 0.0, 0.0)
    );

    // ...but there is nothing to rasterize.
    let exporter = Exporter::new();
    let result = block_on(exporter.export(&session, &source, ExportOptions::default()));
    assert!(matches!(
        result,
        Err(ExportError::EmptyCrop {
            width: 0,
            height: 0
        })
    ));
}

#[test]
fn export_without_geometry_fails() {
    let source = coordinate_image(16, 16);
    let session = EditSession::new();
    let exporter = Exporter::new();

    let result = block_on(exporter.export(&session, &source, ExportOptions::default()));
    assert!(matches!(result, Err(ExportError::NoGeometry)));
}

#[test]
fn perspective_export_without_the_capability_fails() {
    let source = coordinate_image(16, 16);
    let session = session_with_rect(16.0, 16.0, Rect::new(2.0, 2.0, 8.0, 8.0));
    let exporter = Exporter::new();

    let options = ExportOptions {
        perspective: true,
        color_mode: Some(ColorMode::Color),
    };
    let result = block_on(exporter.export(&session, &source, options));
    assert!(matches!(
        result,
        Err(ExportError::Normalize(NormalizeError::Unavailable))
    ));
}

#[test]
fn perspective_export_passes_the_live_quad_and_template() {
    let state = Arc::new(Mutex::new(StubState::default()));
    let normalizer = Arc::new(StubNormalizer {
        state: state.clone(),
        output_size: (30, 40),
    });
    let exporter = Exporter::with_normalizer(normalizer, Some("license-key".to_owned()));

    let source = coordinate_image(64, 32);
    let mut session = EditSession::new();
    session.set_image_size(64.0, 32.0);
    let quad = Quad::new([
        Point::new(3.0, 2.0),
        Point::new(60.0, 5.0),
        Point::new(58.0, 30.0),
        Point::new(2.0, 28.0),
    ]);
    session.set_quad(quad);

    let options = ExportOptions {
        perspective: true,
        color_mode: Some(ColorMode::Binary),
    };
    let bytes = block_on(exporter.export(&session, &source, options)).unwrap();

    // Output is whatever the normalizer produced, not the bounding crop.
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (30, 40));

    let state = state.lock();
    assert_eq!(state.created, 1);
    assert_eq!(state.normalized_quads, vec![quad]);
    assert_eq!(state.settings.len(), 1);
    assert!(state.settings[0].contains("ICM_BINARY"));
}

#[test]
fn normalizer_instance_is_created_once_and_reused() {
    let state = Arc::new(Mutex::new(StubState::default()));
    let normalizer = Arc::new(StubNormalizer {
        state: state.clone(),
        output_size: (10, 10),
    });
    let exporter = Exporter::with_normalizer(normalizer, None);

    let source = coordinate_image(32, 32);
    let session = session_with_rect(32.0, 32.0, Rect::new(1.0, 1.0, 10.0, 10.0));

    let options = ExportOptions {
        perspective: true,
        color_mode: None,
    };
    block_on(exporter.export(&session, &source, options)).unwrap();
    block_on(exporter.export(&session, &source, options)).unwrap();

    let state = state.lock();
    assert_eq!(state.created, 1);
    assert_eq!(state.normalized_quads.len(), 2);
    // No color mode requested: the instance settings were left alone.
    assert!(state.settings.is_empty());
}

#[test]
fn detect_quad_suggests_an_initial_quad() {
    let state = Arc::new(Mutex::new(StubState::default()));
    let normalizer = Arc::new(StubNormalizer {
        state,
        output_size: (10, 10),
    });
    let exporter = Exporter::with_normalizer(normalizer, None);
    let source = coordinate_image(64, 32);

    let candidates = block_on(exporter.detect_quad(&source)).unwrap();
    assert!(!candidates.is_empty());

    // The best candidate feeds straight back in as the initial quad.
    let mut session = EditSession::new();
    session.set_image_size(64.0, 32.0);
    session.set_quad(candidates[0]);
    assert!(session.using_quad());
    assert_eq!(session.quad(), Some(candidates[0]));
}

#[test]
fn detect_without_the_capability_fails() {
    let exporter = Exporter::new();
    let source = coordinate_image(16, 16);

    let result = block_on(exporter.detect_quad(&source));
    assert!(matches!(
        result,
        Err(ExportError::Normalize(NormalizeError::Unavailable))
    ));
}
