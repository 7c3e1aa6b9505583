use egui::{Color32, CursorIcon, Id, Rect, Response, Sense, Stroke, Ui};

/// Stroke color for the crop overlay and its handles.
pub const CONTROL_COLOR: Color32 = Color32::from_rgb(30, 144, 255);

/// One of the eight drag handles, drawn as a stroked square centered on its
/// anchor point.
pub struct CropHandle {
    index: usize,
    rect: Rect,
    selected: bool,
    stroke_width: f32,
}

impl CropHandle {
    pub fn new(index: usize, rect: Rect, selected: bool, stroke_width: f32) -> Self {
        Self {
            index,
            rect,
            selected,
            stroke_width,
        }
    }

    fn cursor_icon(&self) -> CursorIcon {
        match self.index {
            0 | 4 => CursorIcon::ResizeNwSe,
            2 | 6 => CursorIcon::ResizeNeSw,
            1 | 5 => CursorIcon::ResizeVertical,
            _ => CursorIcon::ResizeHorizontal,
        }
    }

    /// Show the handle and return the response.
    pub fn show(&self, ui: &mut Ui) -> Response {
        let id = Id::new(("crop_handle", self.index));

        // Selected handles get a heavier outline. The fill stays transparent
        // so the image remains visible under the handle.
        let width = if self.selected {
            self.stroke_width * 2.0
        } else {
            self.stroke_width
        };
        ui.painter()
            .rect_stroke(self.rect, 0.0, Stroke::new(width, CONTROL_COLOR));

        ui.interact(self.rect, id, Sense::click_and_drag())
            .on_hover_cursor(self.cursor_icon())
    }
}
