use eframe::egui::{self, Color32, Rect, TextureHandle, TextureOptions, Vec2};

use crate::surface::Surface;

/// Keeps a GPU texture in sync with the surface and paints it on screen.
pub struct Renderer {
    ctx: egui::Context,
    texture: Option<TextureHandle>,
    /// Surface version the texture was last uploaded from
    uploaded_version: Option<u64>,
}

impl Renderer {
    pub fn new(ctx: &egui::Context) -> Self {
        Self {
            ctx: ctx.clone(),
            texture: None,
            uploaded_version: None,
        }
    }

    /// Returns true if the texture needs a fresh upload for this surface
    pub fn is_stale(&self, surface: &Surface) -> bool {
        self.uploaded_version != Some(surface.version())
    }

    fn sync(&mut self, surface: &Surface) -> Option<egui::TextureId> {
        let stale = self.is_stale(surface);
        match &mut self.texture {
            Some(texture) if stale => texture.set(surface.to_color_image(), TextureOptions::LINEAR),
            Some(_) => {}
            None => {
                self.texture = Some(self.ctx.load_texture(
                    "surface",
                    surface.to_color_image(),
                    TextureOptions::LINEAR,
                ));
            }
        }
        self.uploaded_version = Some(surface.version());
        self.texture.as_ref().map(TextureHandle::id)
    }

    /// Paints the surface into `rect`
    pub fn render(&mut self, painter: &egui::Painter, rect: Rect, surface: &Surface) {
        let Some(texture_id) = self.sync(surface) else {
            return;
        };
        painter.image(
            texture_id,
            rect,
            Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            Color32::WHITE,
        );
    }
}

/// Largest size with the surface's aspect ratio that fits into `available`
pub fn fit_display_size(surface_size: Vec2, available: Vec2) -> Vec2 {
    let scale = (available.x / surface_size.x)
        .min(available.y / surface_size.y)
        .max(0.05);
    surface_size * scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_display_size_keeps_aspect() {
        let size = fit_display_size(Vec2::new(800.0, 800.0), Vec2::new(600.0, 400.0));
        assert_eq!(size, Vec2::new(400.0, 400.0));
    }

    #[test]
    fn test_texture_refreshes_only_on_new_version() {
        let ctx = egui::Context::default();
        let mut renderer = Renderer::new(&ctx);
        let mut surface = Surface::new(8, 8);
        assert!(renderer.is_stale(&surface));

        renderer.sync(&surface);
        assert!(!renderer.is_stale(&surface));

        surface.fill_all(Color32::RED);
        assert!(renderer.is_stale(&surface));
    }
}
