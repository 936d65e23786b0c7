use eframe::egui;
use image::{DynamicImage, ImageBuffer, Rgba};
use std::path::{Path, PathBuf};

use super::adjust::Adjustments;
use super::crop::{CropBox, CropDrag};
use super::io;

/// All editor state. The two-image model drives everything: sliders
/// re-derive `working` from `reference`, structural edits (crop, rotate,
/// flip) commit the current `working` as the new `reference`.
pub struct EditorSession {
    pub(crate) working: Option<DynamicImage>,
    pub(crate) reference: Option<DynamicImage>,
    pub(crate) adjustments: Adjustments,
    pub(crate) crop: CropDrag,
    pub(crate) file_path: Option<PathBuf>,

    pub(crate) texture: Option<egui::TextureId>,
    pub(crate) texture_dirty: bool,
    pub(crate) zoom: f32,
    pub(crate) fit_on_next_frame: bool,
    pub(crate) canvas_rect: Option<egui::Rect>,
}

impl EditorSession {
    pub fn new() -> Self {
        Self {
            working: None,
            reference: None,
            adjustments: Adjustments::default(),
            crop: CropDrag::default(),
            file_path: None,
            texture: None,
            texture_dirty: false,
            zoom: 1.0,
            fit_on_next_frame: false,
            canvas_rect: None,
        }
    }

    pub fn has_image(&self) -> bool {
        self.working.is_some()
    }

    pub fn image_size(&self) -> Option<(u32, u32)> {
        self.working.as_ref().map(|i| (i.width(), i.height()))
    }

    /// Install a freshly decoded image as both working and reference.
    pub fn set_loaded(&mut self, img: DynamicImage, path: Option<PathBuf>) {
        self.reference = Some(img.clone());
        self.working = Some(img);
        self.adjustments.reset();
        self.crop.clear();
        self.file_path = path;
        self.texture_dirty = true;
        self.fit_on_next_frame = true;
    }

    /// Re-derive the working image from the reference through the
    /// adjustment pipeline. Never reads the previous working image.
    pub fn rebuild_working(&mut self) {
        let reference: &DynamicImage = match &self.reference {
            Some(i) => i,
            None => return,
        };
        self.working = Some(self.adjustments.apply(reference));
        self.texture_dirty = true;
    }

    /// Commit the result of a structural edit as the new reference. The
    /// active adjustments are baked into `img`, so the sliders reset.
    fn commit_structural(&mut self, img: DynamicImage) {
        self.reference = Some(img.clone());
        self.working = Some(img);
        self.adjustments.reset();
        self.crop.clear();
        self.texture_dirty = true;
        self.fit_on_next_frame = true;
    }

    pub fn rotate_cw(&mut self) {
        let rotated: DynamicImage = match &self.working {
            Some(img) => img.rotate90(),
            None => return,
        };
        self.commit_structural(rotated);
    }

    pub fn flip_horizontal(&mut self) {
        let flipped: DynamicImage = match &self.working {
            Some(img) => img.fliph(),
            None => return,
        };
        self.commit_structural(flipped);
    }

    pub fn apply_crop(&mut self, bbox: CropBox) {
        let cropped: DynamicImage = match &self.working {
            Some(img) => img.crop_imm(bbox.x, bbox.y, bbox.width, bbox.height),
            None => return,
        };
        self.commit_structural(cropped);
    }

    /// Release the crop gesture at `pos` (image coordinates) and commit
    /// the selection if it survives normalization.
    pub fn finish_crop(&mut self, pos: (f32, f32)) {
        let (img_w, img_h) = match self.image_size() {
            Some(size) => size,
            None => {
                self.crop.clear();
                return;
            }
        };
        if let Some(bbox) = self.crop.release(pos, img_w, img_h) {
            self.apply_crop(bbox);
        }
    }

    // --- dialogs -----------------------------------------------------

    /// Open an image via the native picker. Returns the chosen path on
    /// success so the caller can remember its directory.
    pub fn open_via_dialog(&mut self, start_dir: Option<&Path>) -> Option<PathBuf> {
        let path: PathBuf = io::pick_open_path(start_dir)?;
        match io::load_from_path(&path) {
            Ok(img) => {
                log::info!("loaded {} ({}x{})", path.display(), img.width(), img.height());
                self.set_loaded(img, Some(path.clone()));
                Some(path)
            }
            Err(err) => {
                log::error!("{err}");
                io::error_dialog("Could not open image", &err.to_string());
                None
            }
        }
    }

    /// Save the working image via the native picker. Silent no-op when
    /// nothing is loaded or the dialog is cancelled.
    pub fn save_via_dialog(&mut self) {
        let img: &DynamicImage = match &self.working {
            Some(i) => i,
            None => return,
        };
        let stem: &str = self
            .file_path
            .as_ref()
            .and_then(|p| p.file_stem())
            .and_then(|s| s.to_str())
            .unwrap_or("untitled");
        let path: PathBuf = match io::pick_save_path(&format!("{stem}.png")) {
            Some(p) => p,
            None => return,
        };
        match io::save_to_path(img, &path) {
            Ok(()) => {
                log::info!("saved {}", path.display());
                self.file_path = Some(path);
                io::info_dialog("Image Saved", "Image saved successfully.");
            }
            Err(err) => {
                log::error!("{err}");
                io::error_dialog("Could not save image", &err.to_string());
            }
        }
    }

    // --- canvas mapping and texture upload ---------------------------

    /// Screen position to image pixel, `None` outside the image.
    pub(crate) fn screen_to_image(&self, screen_pos: egui::Pos2) -> Option<(u32, u32)> {
        let (rx, ry) = self.screen_to_image_unclamped(screen_pos)?;
        let (img_w, img_h) = self.image_size()?;
        if rx < 0.0 || ry < 0.0 || rx >= img_w as f32 || ry >= img_h as f32 {
            return None;
        }
        Some((rx as u32, ry as u32))
    }

    /// Screen position to image coordinates, clamped to the image bounds.
    /// Used while dragging so a selection can reach the edges.
    pub(crate) fn screen_to_image_clamped(&self, screen_pos: egui::Pos2) -> Option<(f32, f32)> {
        let (rx, ry) = self.screen_to_image_unclamped(screen_pos)?;
        let (img_w, img_h) = self.image_size()?;
        Some((rx.clamp(0.0, img_w as f32), ry.clamp(0.0, img_h as f32)))
    }

    fn screen_to_image_unclamped(&self, screen_pos: egui::Pos2) -> Option<(f32, f32)> {
        let canvas: egui::Rect = self.canvas_rect?;
        let (img_w, img_h) = self.image_size()?;
        let ox: f32 = canvas.center().x - img_w as f32 * self.zoom / 2.0;
        let oy: f32 = canvas.center().y - img_h as f32 * self.zoom / 2.0;
        Some(((screen_pos.x - ox) / self.zoom, (screen_pos.y - oy) / self.zoom))
    }

    pub(crate) fn image_to_screen(&self, ix: f32, iy: f32) -> egui::Pos2 {
        let canvas: egui::Rect = self.canvas_rect.unwrap_or(egui::Rect::NOTHING);
        let (img_w, img_h) = self.image_size().unwrap_or((1, 1));
        let ox: f32 = canvas.center().x - img_w as f32 * self.zoom / 2.0;
        let oy: f32 = canvas.center().y - img_h as f32 * self.zoom / 2.0;
        egui::pos2(ox + ix * self.zoom, oy + iy * self.zoom)
    }

    pub(crate) fn fit_image(&mut self) {
        if let (Some((img_w, img_h)), Some(canvas)) = (self.image_size(), self.canvas_rect) {
            let sx: f32 = canvas.width() / img_w as f32;
            let sy: f32 = canvas.height() / img_h as f32;
            self.zoom = sx.min(sy).min(1.0).max(0.01);
        }
    }

    pub(crate) fn ensure_texture(&mut self, ctx: &egui::Context) {
        if !self.texture_dirty {
            return;
        }
        let img: &DynamicImage = match &self.working {
            Some(i) => i,
            None => {
                self.texture_dirty = false;
                return;
            }
        };
        let rgba: ImageBuffer<Rgba<u8>, Vec<u8>> = img.to_rgba8();
        let (w, h) = (rgba.width() as usize, rgba.height() as usize);
        let color_image: egui::ColorImage = egui::ColorImage {
            size: [w, h],
            source_size: egui::vec2(w as f32, h as f32),
            pixels: rgba
                .pixels()
                .map(|p| egui::Color32::from_rgba_unmultiplied(p.0[0], p.0[1], p.0[2], p.0[3]))
                .collect(),
        };

        if let Some(texture_id) = self.texture {
            ctx.tex_manager().write().set(
                texture_id,
                egui::epaint::ImageDelta::full(color_image, egui::TextureOptions::default()),
            );
        } else {
            self.texture = Some(ctx.tex_manager().write().alloc(
                "retouch_canvas".into(),
                color_image.into(),
                egui::TextureOptions::default(),
            ));
        }

        self.texture_dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn test_image(w: u32, h: u32) -> DynamicImage {
        let mut buf = RgbaImage::new(w, h);
        for (i, pixel) in buf.pixels_mut().enumerate() {
            *pixel = Rgba([(i * 13 % 256) as u8, (i * 29 % 256) as u8, (i * 47 % 256) as u8, 255]);
        }
        DynamicImage::ImageRgba8(buf)
    }

    fn loaded_session(w: u32, h: u32) -> EditorSession {
        let mut session = EditorSession::new();
        session.set_loaded(test_image(w, h), None);
        session
    }

    #[test]
    fn loading_sets_working_and_reference() {
        let session = loaded_session(4, 3);
        assert_eq!(
            session.working.as_ref().unwrap().to_rgba8(),
            session.reference.as_ref().unwrap().to_rgba8()
        );
        assert_eq!(session.image_size(), Some((4, 3)));
    }

    #[test]
    fn returning_a_slider_to_default_restores_the_reference() {
        let mut session = loaded_session(4, 4);
        session.adjustments.brightness = 100;
        session.rebuild_working();
        assert_ne!(
            session.working.as_ref().unwrap().to_rgba8(),
            session.reference.as_ref().unwrap().to_rgba8()
        );

        session.adjustments.brightness = 50;
        session.rebuild_working();
        assert_eq!(
            session.working.as_ref().unwrap().to_rgba8(),
            session.reference.as_ref().unwrap().to_rgba8()
        );
    }

    #[test]
    fn crop_commits_a_new_reference() {
        let mut session = loaded_session(4, 4);
        let expected = session.working.as_ref().unwrap().crop_imm(1, 1, 2, 2).to_rgba8();

        session.apply_crop(CropBox { x: 1, y: 1, width: 2, height: 2 });
        assert_eq!(session.image_size(), Some((2, 2)));
        assert_eq!(session.reference.as_ref().unwrap().to_rgba8(), expected);
        assert_eq!(session.working.as_ref().unwrap().to_rgba8(), expected);
    }

    #[test]
    fn four_rotations_restore_the_image() {
        let mut session = loaded_session(5, 3);
        let original = session.working.as_ref().unwrap().to_rgba8();

        session.rotate_cw();
        assert_eq!(session.image_size(), Some((3, 5)));
        session.rotate_cw();
        session.rotate_cw();
        session.rotate_cw();
        assert_eq!(session.image_size(), Some((5, 3)));
        assert_eq!(session.working.as_ref().unwrap().to_rgba8(), original);
    }

    #[test]
    fn flip_is_its_own_inverse() {
        let mut session = loaded_session(5, 3);
        let original = session.working.as_ref().unwrap().to_rgba8();

        session.flip_horizontal();
        assert_ne!(session.working.as_ref().unwrap().to_rgba8(), original);
        session.flip_horizontal();
        assert_eq!(session.working.as_ref().unwrap().to_rgba8(), original);
    }

    #[test]
    fn structural_edit_bakes_adjustments_and_resets_sliders() {
        let mut session = loaded_session(4, 4);
        session.adjustments.brightness = 100;
        session.rebuild_working();
        let brightened = session.working.as_ref().unwrap().fliph().to_rgba8();

        session.flip_horizontal();
        assert_eq!(session.adjustments, Adjustments::default());
        assert_eq!(session.reference.as_ref().unwrap().to_rgba8(), brightened);
        // A rebuild after the commit is an identity pass.
        session.rebuild_working();
        assert_eq!(session.working.as_ref().unwrap().to_rgba8(), brightened);
    }

    #[test]
    fn finish_crop_rejects_degenerate_selections() {
        let mut session = loaded_session(4, 4);
        session.crop.press((2.0, 2.0));
        session.finish_crop((2.0, 2.0));
        assert_eq!(session.image_size(), Some((4, 4)));
        assert!(!session.crop.is_active());
    }

    #[test]
    fn finish_crop_commits_the_selection() {
        let mut session = loaded_session(8, 8);
        session.crop.press((6.0, 7.0));
        session.crop.drag((2.0, 3.0));
        session.finish_crop((2.0, 3.0));
        assert_eq!(session.image_size(), Some((4, 4)));
    }

    #[test]
    fn operations_without_an_image_are_no_ops() {
        let mut session = EditorSession::new();
        session.rotate_cw();
        session.flip_horizontal();
        session.rebuild_working();
        session.finish_crop((10.0, 10.0));
        // Bails out before any dialog is shown.
        session.save_via_dialog();
        assert!(!session.has_image());
    }

    #[test]
    fn canvas_mapping_round_trips() {
        let mut session = loaded_session(10, 10);
        session.canvas_rect = Some(egui::Rect::from_min_size(
            egui::pos2(0.0, 0.0),
            egui::vec2(100.0, 100.0),
        ));
        session.zoom = 2.0;

        let screen = session.image_to_screen(3.0, 7.0);
        assert_eq!(session.screen_to_image(screen), Some((3, 7)));
        assert_eq!(session.screen_to_image_clamped(screen), Some((3.0, 7.0)));
        // Far outside the image clamps to its edge.
        assert_eq!(
            session.screen_to_image_clamped(egui::pos2(1000.0, -1000.0)),
            Some((10.0, 0.0))
        );
        assert_eq!(session.screen_to_image(egui::pos2(1000.0, -1000.0)), None);
    }
}
