use image::DynamicImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extensions offered by the open dialog.
pub const OPEN_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff"];

#[derive(Debug, Error)]
pub enum ImageIoError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: image::ImageError },
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: image::ImageError },
}

pub fn load_from_path(path: &Path) -> Result<DynamicImage, ImageIoError> {
    image::open(path).map_err(|source| ImageIoError::Read { path: path.to_path_buf(), source })
}

pub fn save_to_path(img: &DynamicImage, path: &Path) -> Result<(), ImageIoError> {
    img.save(path).map_err(|source| ImageIoError::Write { path: path.to_path_buf(), source })
}

pub fn pick_open_path(start_dir: Option<&Path>) -> Option<PathBuf> {
    let mut dialog = rfd::FileDialog::new().add_filter("Images", OPEN_EXTENSIONS);
    if let Some(dir) = start_dir {
        dialog = dialog.set_directory(dir);
    }
    dialog.pick_file()
}

/// Save dialog defaulting to PNG. A chosen path without an extension gets
/// `.png` appended so the encoder can pick a format.
pub fn pick_save_path(default_name: &str) -> Option<PathBuf> {
    let mut path: PathBuf = rfd::FileDialog::new()
        .set_file_name(default_name)
        .add_filter("PNG", &["png"])
        .add_filter("JPEG", &["jpg", "jpeg"])
        .save_file()?;
    if path.extension().is_none() {
        path.set_extension("png");
    }
    Some(path)
}

pub fn error_dialog(title: &str, message: &str) {
    rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Error)
        .set_title(title)
        .set_description(message)
        .show();
}

pub fn info_dialog(title: &str, message: &str) {
    rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Info)
        .set_title(title)
        .set_description(message)
        .show();
}
