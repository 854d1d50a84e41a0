use base64::Engine as _;
use std::path::{Path, PathBuf};

use crate::error::ExportError;
use crate::surface::Surface;

/// Every export is saved under this name
pub const EXPORT_FILE_NAME: &str = "my_Drawing.png";

/// Where a finished export ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    File(PathBuf),
    BrowserDownload,
}

/// PNG `data:` URL for the surface
pub fn to_data_url(surface: &Surface) -> Result<String, ExportError> {
    let png = surface.encode_png()?;
    Ok(format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    ))
}

/// Writes the surface as `my_Drawing.png` inside `dir`.
///
/// The bytes go to a transient `.part` file that is renamed into place, so
/// a failed write never leaves a truncated PNG behind.
pub fn save_png(surface: &Surface, dir: &Path) -> Result<PathBuf, ExportError> {
    let png = surface.encode_png()?;
    std::fs::create_dir_all(dir)?;
    let target = dir.join(EXPORT_FILE_NAME);
    let transient = dir.join(format!("{EXPORT_FILE_NAME}.part"));
    if let Err(err) = std::fs::write(&transient, &png) {
        let _ = std::fs::remove_file(&transient);
        return Err(err.into());
    }
    std::fs::rename(&transient, &target)?;
    log::info!("Exported {} bytes to {}", png.len(), target.display());
    Ok(target)
}

/// Triggers a browser download through a transient anchor element.
#[cfg(target_arch = "wasm32")]
pub fn download_png(surface: &Surface) -> Result<ExportTarget, ExportError> {
    use wasm_bindgen::JsCast as _;

    let browser = |err: wasm_bindgen::JsValue| ExportError::Browser(format!("{err:?}"));
    let url = to_data_url(surface)?;
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| ExportError::Browser("no document".into()))?;
    let body = document
        .body()
        .ok_or_else(|| ExportError::Browser("no body".into()))?;
    let anchor = document
        .create_element("a")
        .map_err(browser)?
        .dyn_into::<web_sys::HtmlAnchorElement>()
        .map_err(|_| ExportError::Browser("anchor element has wrong type".into()))?;
    anchor.set_href(&url);
    anchor.set_download(EXPORT_FILE_NAME);
    body.append_child(&anchor).map_err(browser)?;
    anchor.click();
    body.remove_child(&anchor).map_err(browser)?;
    log::info!("Triggered browser download of {EXPORT_FILE_NAME}");
    Ok(ExportTarget::BrowserDownload)
}

/// Exports the surface the way the current platform supports
pub fn export(surface: &Surface, dir: &Path) -> Result<ExportTarget, ExportError> {
    #[cfg(target_arch = "wasm32")]
    {
        let _ = dir;
        download_png(surface)
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        save_png(surface, dir).map(ExportTarget::File)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Color32;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sketch_pad_{name}_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_data_url_prefix() {
        let surface = Surface::new(4, 4);
        let url = to_data_url(&surface).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_save_png_writes_fixed_name_and_no_leftovers() {
        let dir = scratch_dir("export");
        let mut surface = Surface::new(16, 16);
        surface.fill_all(Color32::RED);

        let path = save_png(&surface, &dir).unwrap();
        assert_eq!(path.file_name().unwrap(), EXPORT_FILE_NAME);
        assert!(!dir.join(format!("{EXPORT_FILE_NAME}.part")).exists());

        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(8, 8).0, [255, 0, 0, 255]);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_save_png_into_file_path_fails() {
        let dir = scratch_dir("export_fail");
        let blocker = dir.join("not_a_dir");
        std::fs::write(&blocker, b"x").unwrap();
        let result = save_png(&Surface::new(4, 4), &blocker);
        assert!(result.is_err());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
