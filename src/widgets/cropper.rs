use egui::{Pos2, Response, Sense, Shape, Stroke, TextureId, Ui};

use crate::geometry::{Point, Quad, Rect};
use crate::handles::{self, HandleConfig, HANDLE_COUNT};
use crate::input::{HitTarget, PointerKind, PointerSample};
use crate::session::EditSession;
use crate::transform::ScreenTransform;
use crate::widgets::handle::{CropHandle, CONTROL_COLOR};

fn to_pos2(point: Point) -> Pos2 {
    Pos2::new(point.x, point.y)
}

fn to_point(pos: Pos2) -> Point {
    Point::new(pos.x, pos.y)
}

/// What a frame of cropper interaction produced.
pub struct CropperResponse {
    /// The underlying surface response.
    pub response: Response,
    /// The screen transform used this frame; also what the points were
    /// mapped through for this frame's pointer events.
    pub transform: ScreenTransform,
    /// True when this frame's pointer events moved the geometry.
    pub changed: bool,
}

/// The interactive crop overlay: draws the image, the quad outline and the
/// eight handles, and routes pointer events into the edit session.
pub struct ImageCropper<'a> {
    session: &'a mut EditSession,
    texture: TextureId,
    config: HandleConfig,
}

impl<'a> ImageCropper<'a> {
    pub fn new(session: &'a mut EditSession, texture: TextureId, config: HandleConfig) -> Self {
        Self {
            session,
            texture,
            config,
        }
    }

    pub fn show(self, ui: &mut Ui) -> CropperResponse {
        let (image_width, image_height) = self.session.image_size().unwrap_or((1280.0, 720.0));

        // Letterbox the image into the available space, preserving aspect
        // ratio so the transform scales both axes equally.
        let available = ui.available_size();
        let scale = (available.x / image_width)
            .min(available.y / image_height)
            .max(f32::EPSILON);
        let size = egui::vec2(image_width * scale, image_height * scale);
        let (response, painter) = ui.allocate_painter(size, Sense::click_and_drag());
        let surface = response.rect;

        // Derived fresh every frame: the surface moves when the panel
        // resizes, and move events must map through the current transform.
        let transform = ScreenTransform::fit(
            image_width,
            image_height,
            Rect::new(surface.min.x, surface.min.y, surface.width(), surface.height()),
        );

        painter.image(
            self.texture,
            surface,
            egui::Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        // egui folds touch input into its pointer, so the kind is derived
        // from whether any touch is active rather than from separate event
        // streams.
        let kind = if ui.input(|i| i.any_touches()) {
            PointerKind::Touch
        } else {
            PointerKind::Mouse
        };

        let before = self.session.points().copied();

        if let Some(points) = before {
            let ratio = self.config.ratio(Some(image_width));
            let outline_width = 2.0 * ratio * transform.a;
            let screen_points: Vec<Pos2> = points
                .iter()
                .map(|p| to_pos2(transform.to_client(*p)))
                .collect();
            painter.add(Shape::closed_line(
                screen_points,
                Stroke::new(outline_width, CONTROL_COLOR),
            ));

            // Handles are interacted after the surface response, which puts
            // them on top: a press on a handle is claimed by the handle, not
            // the polygon underneath it.
            let handle_size = self.config.size(Some(image_width));
            for index in 0..HANDLE_COUNT {
                let anchor = handles::render_point(&points, index, handle_size);
                let min = transform.to_client(anchor);
                let screen_size = handle_size * transform.a;
                let handle_rect = egui::Rect::from_min_size(
                    to_pos2(min),
                    egui::vec2(screen_size, screen_size),
                );
                let selected = self.session.selected_handle() == Some(index);
                let handle_response =
                    CropHandle::new(index, handle_rect, selected, outline_width).show(ui);

                if handle_response.drag_started() {
                    if let Some(pos) = handle_response.interact_pointer_pos() {
                        self.session.pointer_down(
                            HitTarget::Handle(index),
                            PointerSample {
                                kind,
                                client: to_point(pos),
                            },
                            &transform,
                        );
                    }
                }
            }

            // Pointer-down inside the polygon body starts a whole-polygon
            // drag; a press claimed by a handle above never reaches here
            // because the session is already dragging.
            if response.drag_started() && !self.session.is_dragging() {
                if let Some(pos) = response.interact_pointer_pos() {
                    let image_pos = transform.to_image(to_point(pos));
                    let target = if Quad::new(points).contains(image_pos) {
                        HitTarget::Polygon
                    } else {
                        HitTarget::Outside
                    };
                    self.session.pointer_down(
                        target,
                        PointerSample {
                            kind,
                            client: to_point(pos),
                        },
                        &transform,
                    );
                }
            }
        }

        if self.session.is_dragging() {
            if let Some(pos) = ui.input(|i| i.pointer.interact_pos()) {
                self.session.pointer_move(
                    PointerSample {
                        kind,
                        client: to_point(pos),
                    },
                    &transform,
                );
            }

            // Release is observed at the input level, not per-widget, so a
            // drag terminates even when the pointer is released outside the
            // polygon and handles. Touch gestures end when the last finger
            // lifts; the session drops the synthetic mouse release that
            // follows.
            if self.session.using_touch() {
                if !ui.input(|i| i.any_touches()) {
                    self.session.touch_ended();
                }
            } else if ui.input(|i| i.pointer.any_released()) {
                self.session.pointer_up(PointerKind::Mouse);
            }
        }

        let changed = self.session.points().copied() != before;
        if changed {
            ui.ctx().request_repaint();
        }

        CropperResponse {
            response,
            transform,
            changed,
        }
    }
}
