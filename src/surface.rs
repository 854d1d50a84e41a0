use egui::{Color32, ColorImage, Pos2, Vec2};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

use crate::error::ExportError;
use crate::stroke::BACKGROUND;

/// The fixed-size pixel buffer everything is painted into.
///
/// Pixels are straight (unmultiplied) RGBA8. Every mutation bumps `version`
/// so the renderer knows when the GPU texture is stale.
#[derive(Clone)]
pub struct Surface {
    pixels: RgbaImage,
    version: u64,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.pixels.width())
            .field("height", &self.pixels.height())
            .field("version", &self.version)
            .finish()
    }
}

impl Surface {
    /// Creates a surface filled with opaque white
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, to_rgba(BACKGROUND)),
            version: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width() as f32, self.height() as f32)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color32 {
        let [r, g, b, a] = self.pixels.get_pixel(x, y).0;
        Color32::from_rgba_unmultiplied(r, g, b, a)
    }

    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Raw RGBA bytes, row-major
    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    /// Swaps in a full buffer of identical dimensions, returning the old one.
    pub(crate) fn replace_pixels(&mut self, pixels: RgbaImage) -> RgbaImage {
        debug_assert_eq!(pixels.dimensions(), self.pixels.dimensions());
        self.touch();
        std::mem::replace(&mut self.pixels, pixels)
    }

    /// Resets every pixel to the background color
    pub fn clear(&mut self) {
        self.fill_all(BACKGROUND);
    }

    /// Overwrites every pixel with `color`, alpha included. Nothing is composited.
    pub fn fill_all(&mut self, color: Color32) {
        let fill = to_rgba(color);
        for pixel in self.pixels.pixels_mut() {
            *pixel = fill;
        }
        self.touch();
    }

    /// Strokes a straight segment with round caps.
    ///
    /// Consecutive segments share endpoints, so round caps also give the
    /// path its round joins.
    pub fn stroke_segment(&mut self, from: Pos2, to: Pos2, width: f32, color: Color32) {
        let radius = (width * 0.5).max(0.5);
        let reach = radius + 1.0;
        let min_x = (from.x.min(to.x) - reach).floor().max(0.0) as u32;
        let min_y = (from.y.min(to.y) - reach).floor().max(0.0) as u32;
        let max_x = ((from.x.max(to.x) + reach).ceil().max(0.0) as u32).min(self.width());
        let max_y = ((from.y.max(to.y) + reach).ceil().max(0.0) as u32).min(self.height());

        for y in min_y..max_y {
            for x in min_x..max_x {
                let center = Pos2::new(x as f32 + 0.5, y as f32 + 0.5);
                let distance = distance_to_segment(center, from, to);
                let coverage = (radius + 0.5 - distance).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x, y, color, coverage);
                }
            }
        }
        self.touch();
    }

    /// Draws an image stretched over the whole surface
    pub fn draw_image_scaled(&mut self, image: &DynamicImage) {
        let resized = imageops::resize(
            &image.to_rgba8(),
            self.width(),
            self.height(),
            FilterType::Triangle,
        );
        imageops::overlay(&mut self.pixels, &resized, 0, 0);
        self.touch();
    }

    /// Composites `color` over the pixel at (x, y) with the given coverage.
    /// Out-of-bounds coordinates are ignored.
    pub(crate) fn blend_at(&mut self, x: i64, y: i64, color: Color32, coverage: f32) {
        if x < 0 || y < 0 || x >= i64::from(self.width()) || y >= i64::from(self.height()) {
            return;
        }
        self.blend(x as u32, y as u32, color, coverage);
    }

    pub(crate) fn touch(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    fn blend(&mut self, x: u32, y: u32, color: Color32, coverage: f32) {
        let [sr, sg, sb, sa] = color.to_srgba_unmultiplied();
        let src_a = f32::from(sa) / 255.0 * coverage;
        let dst = self.pixels.get_pixel_mut(x, y);
        let dst_a = f32::from(dst[3]) / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            *dst = Rgba([0, 0, 0, 0]);
            return;
        }
        let mix = |s: u8, d: u8| -> u8 {
            let value = (f32::from(s) * src_a + f32::from(d) * dst_a * (1.0 - src_a)) / out_a;
            value.round().clamp(0.0, 255.0) as u8
        };
        *dst = Rgba([
            mix(sr, dst[0]),
            mix(sg, dst[1]),
            mix(sb, dst[2]),
            (out_a * 255.0).round() as u8,
        ]);
    }

    /// Encodes the whole surface as a PNG file in memory
    pub fn encode_png(&self) -> Result<Vec<u8>, ExportError> {
        let mut bytes = Vec::new();
        self.pixels
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    /// Converts to an egui image for texture upload
    pub fn to_color_image(&self) -> ColorImage {
        ColorImage::from_rgba_unmultiplied(
            [self.width() as usize, self.height() as usize],
            self.pixels.as_raw(),
        )
    }
}

fn to_rgba(color: Color32) -> Rgba<u8> {
    Rgba(color.to_srgba_unmultiplied())
}

fn distance_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn test_new_surface_is_opaque_white() {
        let surface = Surface::new(16, 8);
        assert!(surface.image().pixels().all(|p| p.0 == [255, 255, 255, 255]));
        assert_eq!(surface.size(), Vec2::new(16.0, 8.0));
    }

    #[test]
    fn test_fill_all_overwrites_every_pixel() {
        let mut surface = Surface::new(10, 10);
        surface.stroke_segment(pos2(1.0, 1.0), pos2(8.0, 8.0), 3.0, Color32::BLUE);
        surface.fill_all(Color32::RED);
        assert!(surface.image().pixels().all(|p| p.0 == [255, 0, 0, 255]));
    }

    #[test]
    fn test_fill_all_writes_translucent_color_as_is() {
        let mut surface = Surface::new(6, 6);
        let translucent = Color32::from_rgba_unmultiplied(255, 0, 0, 128);
        surface.fill_all(translucent);
        let expected = translucent.to_srgba_unmultiplied();
        assert!(surface.image().pixels().all(|p| p.0 == expected));
    }

    #[test]
    fn test_stroke_segment_paints_along_line_only() {
        let mut surface = Surface::new(40, 40);
        surface.stroke_segment(pos2(5.0, 20.0), pos2(35.0, 20.0), 4.0, Color32::BLACK);
        assert_eq!(surface.pixel(20, 20), Color32::BLACK);
        assert_eq!(surface.pixel(20, 5), Color32::WHITE);
        // round cap reaches past the endpoint
        assert_ne!(surface.pixel(4, 20), Color32::WHITE);
    }

    #[test]
    fn test_version_bumps_on_mutation() {
        let mut surface = Surface::new(4, 4);
        let before = surface.version();
        surface.clear();
        assert!(surface.version() > before);
    }

    #[test]
    fn test_draw_image_scaled_fills_surface() {
        let mut surface = Surface::new(20, 20);
        let green = RgbaImage::from_pixel(2, 2, Rgba([0, 255, 0, 255]));
        surface.draw_image_scaled(&DynamicImage::ImageRgba8(green));
        assert_eq!(surface.pixel(0, 0), Color32::from_rgb(0, 255, 0));
        assert_eq!(surface.pixel(19, 19), Color32::from_rgb(0, 255, 0));
    }

    #[test]
    fn test_encode_png_round_trips_dimensions() {
        let surface = Surface::new(12, 7);
        let bytes = surface.encode_png().unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (12, 7));
    }
}
