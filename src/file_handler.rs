use eframe::egui;
use image::DynamicImage;
use std::path::Path;

use crate::error::{PadError, PadResult};

/// A dropped file after decoding was attempted
pub struct LoadedFile {
    pub name: String,
    pub image: PadResult<DynamicImage>,
}

/// Collects files dropped onto the window and decodes the images among them
#[derive(Default)]
pub struct FileHandler {
    dropped_files: Vec<egui::DroppedFile>,
}

impl FileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Picks up newly dropped files from the UI context.
    /// Returns true if any arrived this frame.
    pub fn check_for_dropped_files(&mut self, ctx: &egui::Context) -> bool {
        let mut new_dropped_files = false;
        ctx.input(|i| {
            if !i.raw.dropped_files.is_empty() {
                self.dropped_files.extend(i.raw.dropped_files.iter().cloned());
                new_dropped_files = true;
            }
        });
        new_dropped_files
    }

    /// Drains the queue, decoding every file
    pub fn process_dropped_files(&mut self) -> Vec<LoadedFile> {
        self.process_dropped_bytes()
            .into_iter()
            .map(|(name, bytes)| {
                let image = bytes.and_then(|bytes| decode_image_bytes(&bytes));
                if let Err(err) = &image {
                    log::warn!("Could not load dropped file {name}: {err}");
                }
                LoadedFile { name, image }
            })
            .collect()
    }

    /// Drains the queue, returning the raw bytes of every image file
    pub fn process_dropped_bytes(&mut self) -> Vec<(String, PadResult<Vec<u8>>)> {
        self.dropped_files
            .drain(..)
            .map(|file| {
                let name = display_name(&file);
                let bytes = read_dropped(&file, &name);
                (name, bytes)
            })
            .collect()
    }
}

fn display_name(file: &egui::DroppedFile) -> String {
    if let Some(path) = &file.path {
        path.display().to_string()
    } else if !file.name.is_empty() {
        file.name.clone()
    } else {
        "unknown".to_owned()
    }
}

fn read_dropped(file: &egui::DroppedFile, name: &str) -> PadResult<Vec<u8>> {
    if !is_image_file(&file.mime, file.path.as_deref()) {
        return Err(PadError::UnsupportedFile(name.to_owned()));
    }
    if let Some(bytes) = &file.bytes {
        log::info!("Processing image from memory: {name} ({} bytes)", bytes.len());
        return Ok(bytes.to_vec());
    }
    match &file.path {
        #[cfg(not(target_arch = "wasm32"))]
        Some(path) => {
            log::info!("Processing image from path: {}", path.display());
            Ok(std::fs::read(path)?)
        }
        _ => Err(PadError::UnsupportedFile(format!("{name} has no readable data"))),
    }
}

/// Decodes any raster format the `image` crate recognizes
pub fn decode_image_bytes(bytes: &[u8]) -> PadResult<DynamicImage> {
    Ok(image::load_from_memory(bytes)?)
}

/// Check if a file is an image based on MIME type or extension
pub fn is_image_file(mime: &str, path: Option<&Path>) -> bool {
    if !mime.is_empty() {
        return mime.starts_with("image/");
    }
    path.and_then(Path::extension)
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| {
            matches!(
                ext.as_str(),
                "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp"
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Surface;

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file("image/png", None));
        assert!(!is_image_file("text/plain", Some(Path::new("a.png"))));
        assert!(is_image_file("", Some(Path::new("photo.JPG"))));
        assert!(!is_image_file("", Some(Path::new("notes.txt"))));
        assert!(!is_image_file("", None));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_image_bytes(b"definitely not an image"),
            Err(PadError::ImageDecode(_))
        ));
    }

    #[test]
    fn test_decode_png_bytes() {
        let png = Surface::new(3, 2).encode_png().unwrap();
        let image = decode_image_bytes(&png).unwrap();
        assert_eq!((image.width(), image.height()), (3, 2));
    }

    #[test]
    fn test_dropped_non_image_is_rejected() {
        let mut handler = FileHandler::new();
        handler.dropped_files.push(egui::DroppedFile {
            name: "notes.txt".into(),
            mime: "text/plain".into(),
            ..Default::default()
        });
        let loaded = handler.process_dropped_files();
        assert_eq!(loaded.len(), 1);
        assert!(matches!(loaded[0].image, Err(PadError::UnsupportedFile(_))));
    }
}
