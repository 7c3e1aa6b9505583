use egui::ColorImage;
use futures::executor::block_on;
use image::DynamicImage;
use log::{error, info, warn};

use crate::event::{CropperEvent, EventBus};
use crate::export::{ExportOptions, Exporter};
use crate::geometry::Rect;
use crate::handles::HandleConfig;
use crate::normalizer::ColorMode;
use crate::session::EditSession;
use crate::texture::{TextureRole, TextureStore};
use crate::widgets::ImageCropper;

/// Presentation options, persisted across runs.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CropperOptions {
    /// Hide the accept/cancel footer; embedders that confirm through their
    /// own chrome set this.
    pub hide_footer: bool,
    pub handles: HandleConfig,
    /// Color mode requested for perspective exports.
    pub color_mode: ColorMode,
}

impl Default for CropperOptions {
    fn default() -> Self {
        Self {
            hide_footer: false,
            handles: HandleConfig::default(),
            color_mode: ColorMode::Color,
        }
    }
}

/// We derive Deserialize/Serialize so we can persist options on shutdown.
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct CropperApp {
    options: CropperOptions,
    // Everything below is per-run state, not persisted.
    #[serde(skip)]
    session: EditSession,
    #[serde(skip)]
    exporter: Exporter,
    #[serde(skip)]
    bus: EventBus,
    #[serde(skip)]
    source: Option<DynamicImage>,
    #[serde(skip)]
    source_version: u64,
    #[serde(skip)]
    preview: Option<ColorImage>,
    #[serde(skip)]
    preview_version: u64,
    #[serde(skip)]
    textures: TextureStore,
    #[serde(skip)]
    status: Option<String>,
}

impl Default for CropperApp {
    fn default() -> Self {
        Self {
            options: CropperOptions::default(),
            session: EditSession::new(),
            exporter: Exporter::new(),
            bus: EventBus::new(),
            source: None,
            source_version: 0,
            preview: None,
            preview_version: 0,
            textures: TextureStore::new(),
            status: None,
        }
    }
}

impl CropperApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Restore persisted options if there are any.
        if let Some(storage) = cc.storage {
            return eframe::get_value(storage, eframe::APP_KEY).unwrap_or_default();
        }
        Self::default()
    }

    /// Replace the exporter, e.g. to inject a document normalizer.
    pub fn set_exporter(&mut self, exporter: Exporter) {
        self.exporter = exporter;
    }

    /// The lifecycle event bus; embedders subscribe here for
    /// confirmed/canceled signals.
    pub fn event_bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    /// Load a new source image and reset the crop to a centered rect inset
    /// by a tenth of each dimension.
    pub fn open_image(&mut self, image: DynamicImage) {
        let width = image.width() as f32;
        let height = image.height() as f32;
        info!("opened image: {}x{}", image.width(), image.height());

        self.session.set_image_size(width, height);
        let inset = Rect::new(
            width / 10.0,
            height / 10.0,
            width * 0.8,
            height * 0.8,
        );
        if let Err(err) = self.session.set_rect(inset) {
            // The inset of a positive-size image is always valid.
            error!("initial rect rejected: {err}");
        }

        self.source = Some(image);
        self.source_version += 1;
        self.preview = None;
        self.textures.invalidate(TextureRole::Source);
        self.textures.invalidate(TextureRole::Preview);
        self.status = None;
    }

    fn check_for_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            let name = file
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| file.name.clone());

            let bytes = if let Some(bytes) = &file.bytes {
                Some(bytes.to_vec())
            } else if let Some(path) = &file.path {
                #[cfg(not(target_arch = "wasm32"))]
                {
                    match std::fs::read(path) {
                        Ok(bytes) => Some(bytes),
                        Err(err) => {
                            error!("failed to read {}: {err}", path.display());
                            None
                        }
                    }
                }
                #[cfg(target_arch = "wasm32")]
                {
                    warn!("file path access not supported on wasm: {name}");
                    None
                }
            } else {
                None
            };

            if let Some(bytes) = bytes {
                match image::load_from_memory(&bytes) {
                    Ok(image) => {
                        info!("decoded dropped image: {name}");
                        self.open_image(image);
                    }
                    Err(err) => {
                        warn!("dropped file {name} is not a decodable image: {err}");
                        self.status = Some(format!("could not decode {name}: {err}"));
                    }
                }
            }
        }
    }

    fn run_export(&mut self, perspective: bool) {
        let Some(source) = &self.source else {
            return;
        };
        let options = ExportOptions {
            perspective,
            color_mode: perspective.then_some(self.options.color_mode),
        };
        match block_on(self.exporter.export(&self.session, source, options)) {
            Ok(bytes) => match image::load_from_memory(&bytes) {
                Ok(decoded) => {
                    let rgba = decoded.to_rgba8();
                    let size = [rgba.width() as usize, rgba.height() as usize];
                    self.preview = Some(ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()));
                    self.preview_version += 1;
                    self.status = Some(format!(
                        "exported {}x{} ({} bytes)",
                        size[0],
                        size[1],
                        bytes.len()
                    ));
                }
                Err(err) => {
                    error!("exported bytes failed to decode: {err}");
                    self.status = Some(format!("export failed: {err}"));
                }
            },
            Err(err) => {
                warn!("export failed: {err}");
                self.status = Some(format!("export failed: {err}"));
            }
        }
    }

    fn run_detect(&mut self) {
        let Some(source) = &self.source else {
            return;
        };
        match block_on(self.exporter.detect_quad(source)) {
            Ok(candidates) => {
                if let Some(best) = candidates.first() {
                    self.session.set_quad(*best);
                    self.status = Some(format!(
                        "applied best of {} detected quad(s)",
                        candidates.len()
                    ));
                } else {
                    self.status = Some("no document boundary detected".to_owned());
                }
            }
            Err(err) => {
                warn!("detection failed: {err}");
                self.status = Some(format!("detection failed: {err}"));
            }
        }
    }

    fn footer(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("✅ Use").clicked() {
                info!("crop confirmed");
                self.bus.emit(CropperEvent::Confirmed);
                self.status = Some("crop confirmed".to_owned());
            }
            if ui.button("❌ Cancel").clicked() {
                info!("crop canceled");
                self.bus.emit(CropperEvent::Canceled);
                self.status = Some("crop canceled".to_owned());
            }
        });
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let has_image = self.source.is_some();

            if ui
                .add_enabled(has_image, egui::Button::new("Export crop"))
                .clicked()
            {
                self.run_export(false);
            }

            let can_correct = has_image && self.exporter.has_normalizer();
            let correct_button = ui.add_enabled(can_correct, egui::Button::new("Export corrected"));
            if correct_button.clicked() {
                self.run_export(true);
            }

            if ui
                .add_enabled(can_correct, egui::Button::new("Detect quad"))
                .clicked()
            {
                self.run_detect();
            }

            egui::ComboBox::from_label("color mode")
                .selected_text(format!("{:?}", self.options.color_mode))
                .show_ui(ui, |ui| {
                    for mode in [ColorMode::Binary, ColorMode::Gray, ColorMode::Color] {
                        ui.selectable_value(
                            &mut self.options.color_mode,
                            mode,
                            format!("{mode:?}"),
                        );
                    }
                });

            ui.label(if self.session.using_quad() {
                "free quad mode"
            } else {
                "rectangle mode"
            });
        });
    }

    fn options_window(&mut self, ctx: &egui::Context) {
        egui::Window::new("Cropper Options").show(ctx, |ui| {
            ui.checkbox(&mut self.options.hide_footer, "Hide footer");
            ui.checkbox(&mut self.options.handles.touch_device, "Touch-sized handles");

            let mut override_enabled = self.options.handles.size_override.is_some();
            ui.checkbox(&mut override_enabled, "Override handle size");
            if override_enabled {
                let size = self.options.handles.size_override.get_or_insert(20.0);
                ui.add(egui::Slider::new(size, 4.0..=88.0).text("size"));
            } else {
                self.options.handles.size_override = None;
            }

            if let Some(rect) = self.session.bounding_rect() {
                ui.separator();
                ui.label(format!(
                    "bounding rect: {} x {} at ({}, {})",
                    rect.width, rect.height, rect.x, rect.y
                ));
            }
        });
    }
}

impl eframe::App for CropperApp {
    /// Called by the framework to save options before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_for_dropped_files(ctx);
        self.options_window(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Document Cropper");
            self.controls(ui);
            if let Some(status) = &self.status {
                ui.label(status.clone());
            }
            ui.separator();

            let Some(source) = self.source.as_ref() else {
                ui.label("Drop an image here to start cropping.");
                return;
            };

            // Disjoint field borrows: the texture store uploads from the
            // source image only on a cache miss.
            let textures = &mut self.textures;
            let source_texture =
                textures.get_or_upload(TextureRole::Source, self.source_version, ctx, || {
                    let rgba = source.to_rgba8();
                    let size = [rgba.width() as usize, rgba.height() as usize];
                    Ok(ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
                });

            match source_texture {
                Ok(texture) => {
                    ImageCropper::new(&mut self.session, texture, self.options.handles).show(ui);
                }
                Err(err) => {
                    error!("source texture upload failed: {err}");
                    ui.label(format!("cannot display image: {err}"));
                }
            }

            if !self.options.hide_footer {
                ui.separator();
                self.footer(ui);
            }
        });

        if let Some(preview) = self.preview.as_ref() {
            let textures = &mut self.textures;
            let version = self.preview_version;
            egui::Window::new("Export Preview").show(ctx, |ui| {
                let result = textures.get_or_upload(TextureRole::Preview, version, ctx, || {
                    Ok(preview.clone())
                });
                match result {
                    Ok(texture) => {
                        let aspect = preview.height() as f32 / preview.width().max(1) as f32;
                        let width = ui.available_width().min(480.0);
                        ui.image((texture, egui::vec2(width, width * aspect)));
                    }
                    Err(err) => {
                        ui.label(format!("cannot display preview: {err}"));
                    }
                }
            });
        }
    }
}
