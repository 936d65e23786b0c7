use eframe::egui;

use crate::style::ColorPalette;
use super::adjust::{SLIDER_MAX, SLIDER_MIN};
use super::crop;
use super::session::EditorSession;

/// Actions the control panel hands back to the app shell. Opening and
/// saving go through the shell because it owns the persisted settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelAction {
    None,
    OpenImage,
    SaveImage,
}

impl EditorSession {
    pub fn render_controls(&mut self, ui: &mut egui::Ui) -> PanelAction {
        let mut action: PanelAction = PanelAction::None;
        let has_image: bool = self.has_image();
        let button_size: egui::Vec2 = egui::vec2(ui.available_width(), 28.0);

        ui.add_space(4.0);
        ui.heading("Edit Options");
        ui.separator();

        if ui.add_sized(button_size, egui::Button::new("Load Image...")).clicked() {
            action = PanelAction::OpenImage;
        }
        ui.add_enabled_ui(has_image, |ui: &mut egui::Ui| {
            if ui.add_sized(button_size, egui::Button::new("Save Image...")).clicked() {
                action = PanelAction::SaveImage;
            }
            if ui.add_sized(button_size, egui::Button::new("Rotate 90°")).clicked() {
                self.rotate_cw();
            }
            if ui.add_sized(button_size, egui::Button::new("Flip Horizontal")).clicked() {
                self.flip_horizontal();
            }
        });

        ui.separator();
        ui.add_enabled_ui(has_image, |ui: &mut egui::Ui| {
            ui.spacing_mut().slider_width = (ui.available_width() - 40.0).max(80.0);
            let mut changed: bool = false;
            changed |= adjustment_slider(ui, "Brightness", &mut self.adjustments.brightness);
            changed |= adjustment_slider(ui, "Contrast", &mut self.adjustments.contrast);
            changed |= adjustment_slider(ui, "Saturation", &mut self.adjustments.saturation);
            changed |= adjustment_slider(ui, "Sharpness", &mut self.adjustments.sharpness);
            if changed {
                self.rebuild_working();
            }

            ui.add_space(4.0);
            if ui.add_sized(button_size, egui::Button::new("Reset Adjustments")).clicked() {
                self.adjustments.reset();
                self.rebuild_working();
            }
        });

        ui.separator();
        if has_image {
            ui.label(
                egui::RichText::new("Click and drag on the image to crop.")
                    .size(11.0)
                    .color(ColorPalette::ZINC_400),
            );
            if let Some((w, h)) = self.image_size() {
                ui.label(
                    egui::RichText::new(format!("{}x{}  ({:.0}%)", w, h, self.zoom * 100.0))
                        .size(11.0)
                        .color(ColorPalette::ZINC_400),
                );
            }
        }

        action
    }

    pub fn render_canvas(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let canvas_rect: egui::Rect = ui.available_rect_before_wrap();
        self.canvas_rect = Some(canvas_rect);
        if self.fit_on_next_frame {
            self.fit_image();
            self.fit_on_next_frame = false;
        }
        self.ensure_texture(ctx);

        let (rect, response) = ui.allocate_exact_size(canvas_rect.size(), egui::Sense::click_and_drag());
        let painter: egui::Painter = ui.painter_at(rect);

        self.draw_checkerboard(ui, &painter, rect);

        if !self.has_image() {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "Load an image to begin editing.",
                egui::FontId::proportional(16.0),
                ColorPalette::ZINC_500,
            );
            return;
        }

        if let (Some(tex), Some((img_w, img_h))) = (self.texture, self.image_size()) {
            let img_rect: egui::Rect = egui::Rect::from_center_size(
                canvas_rect.center(),
                egui::vec2(img_w as f32 * self.zoom, img_h as f32 * self.zoom),
            );
            painter.image(
                tex,
                img_rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
            painter.rect_stroke(
                img_rect,
                0.0,
                egui::Stroke::new(1.0, ColorPalette::ZINC_500),
                egui::StrokeKind::Outside,
            );
        }

        self.draw_crop_overlay(&painter, canvas_rect);
        self.handle_crop_pointer(ctx, &response);
    }

    fn draw_checkerboard(&self, ui: &egui::Ui, painter: &egui::Painter, rect: egui::Rect) {
        let checker_size: f32 = 16.0;
        let (c1, c2) = if ui.visuals().dark_mode {
            (egui::Color32::from_rgb(40, 40, 40), egui::Color32::from_rgb(55, 55, 55))
        } else {
            (egui::Color32::from_rgb(200, 200, 200), egui::Color32::from_rgb(220, 220, 220))
        };

        let mut cy: f32 = rect.min.y;
        while cy < rect.max.y {
            let row: i32 = ((cy - rect.min.y) / checker_size) as i32;
            let mut cx: f32 = rect.min.x;
            while cx < rect.max.x {
                let col: i32 = ((cx - rect.min.x) / checker_size) as i32;
                let color: egui::Color32 = if (row + col) % 2 == 0 { c1 } else { c2 };
                painter.rect_filled(
                    egui::Rect::from_min_size(egui::pos2(cx, cy), egui::vec2(checker_size, checker_size)),
                    0.0,
                    color,
                );
                cx += checker_size;
            }
            cy += checker_size;
        }
    }

    fn draw_crop_overlay(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        let (s, e) = match self.crop.selection() {
            Some(sel) => sel,
            None => return,
        };
        let p0: egui::Pos2 = self.image_to_screen(s.0, s.1);
        let p1: egui::Pos2 = self.image_to_screen(e.0, e.1);
        let crop_rect: egui::Rect = egui::Rect::from_two_pos(p0, p1);
        let overlay: egui::Color32 = egui::Color32::from_rgba_premultiplied(0, 0, 0, 60);

        if crop_rect.min.y > canvas_rect.min.y {
            painter.rect_filled(egui::Rect::from_min_max(canvas_rect.min, egui::pos2(canvas_rect.max.x, crop_rect.min.y)), 0.0, overlay);
        }
        if crop_rect.max.y < canvas_rect.max.y {
            painter.rect_filled(egui::Rect::from_min_max(egui::pos2(canvas_rect.min.x, crop_rect.max.y), canvas_rect.max), 0.0, overlay);
        }
        if crop_rect.min.x > canvas_rect.min.x {
            painter.rect_filled(egui::Rect::from_min_max(egui::pos2(canvas_rect.min.x, crop_rect.min.y), egui::pos2(crop_rect.min.x, crop_rect.max.y)), 0.0, overlay);
        }
        if crop_rect.max.x < canvas_rect.max.x {
            painter.rect_filled(egui::Rect::from_min_max(egui::pos2(crop_rect.max.x, crop_rect.min.y), egui::pos2(canvas_rect.max.x, crop_rect.max.y)), 0.0, overlay);
        }

        painter.rect_stroke(crop_rect, 0.0, egui::Stroke::new(2.0, ColorPalette::BLUE_400), egui::StrokeKind::Outside);

        let (img_w, img_h) = self.image_size().unwrap_or((1, 1));
        let label: String = match crop::normalized_box(s, e, img_w, img_h) {
            Some(b) => format!("{} x {}", b.width, b.height),
            None => "0 x 0".to_string(),
        };
        let raw_tp: egui::Pos2 = egui::pos2(crop_rect.min.x + 4.0, crop_rect.min.y - 18.0);
        let text_pos: egui::Pos2 = egui::pos2(
            raw_tp.x.max(canvas_rect.min.x + 4.0),
            raw_tp.y.max(canvas_rect.min.y + 4.0),
        );
        painter.text(text_pos + egui::vec2(1.0, 1.0), egui::Align2::LEFT_TOP, &label, egui::FontId::proportional(12.0), egui::Color32::from_black_alpha(160));
        painter.text(text_pos, egui::Align2::LEFT_TOP, &label, egui::FontId::proportional(12.0), egui::Color32::WHITE);
    }

    fn handle_crop_pointer(&mut self, ctx: &egui::Context, response: &egui::Response) {
        if response.hovered() {
            if let Some(mp) = response.hover_pos() {
                if self.screen_to_image(mp).is_some() {
                    ctx.set_cursor_icon(egui::CursorIcon::Crosshair);
                }
            }
        }

        if response.drag_started_by(egui::PointerButton::Primary) {
            if let Some(pos) = response.interact_pointer_pos() {
                // A press outside the image starts no gesture.
                if let Some((ix, iy)) = self.screen_to_image(pos) {
                    self.crop.press((ix as f32, iy as f32));
                }
            }
        } else if response.dragged_by(egui::PointerButton::Primary) && self.crop.is_active() {
            if let Some(pos) = response.interact_pointer_pos() {
                if let Some(p) = self.screen_to_image_clamped(pos) {
                    self.crop.drag(p);
                }
            }
        }

        if response.drag_stopped_by(egui::PointerButton::Primary) && self.crop.is_active() {
            let fallback: Option<(f32, f32)> = self.crop.selection().map(|(_, end)| end);
            let release: Option<(f32, f32)> = response
                .interact_pointer_pos()
                .and_then(|pos| self.screen_to_image_clamped(pos))
                .or(fallback);
            if let Some(p) = release {
                self.finish_crop(p);
            }
        }
    }
}

fn adjustment_slider(ui: &mut egui::Ui, label: &str, value: &mut i32) -> bool {
    ui.label(egui::RichText::new(label).size(12.0));
    ui.add(egui::Slider::new(value, SLIDER_MIN..=SLIDER_MAX)).changed()
}
