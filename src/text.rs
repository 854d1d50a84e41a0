use ab_glyph::{Font, FontArc, Glyph, PxScale, ScaleFont, point};
use egui::{Color32, Pos2};
use serde::{Deserialize, Serialize};

use crate::error::{PadError, PadResult};
use crate::surface::Surface;

/// Distance between the baseline and a manual underline
pub const UNDERLINE_OFFSET: f32 = 2.0;
pub const UNDERLINE_WIDTH: f32 = 1.0;
pub const DEFAULT_FONT_SIZE: f32 = 24.0;

/// Horizontal shear applied to synthesize italics
const ITALIC_SHEAR: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontFamilyChoice {
    #[default]
    SansSerif,
    Monospace,
}

impl FontFamilyChoice {
    pub const ALL: [Self; 2] = [Self::SansSerif, Self::Monospace];

    pub fn css_name(self) -> &'static str {
        match self {
            Self::SansSerif => "sans-serif",
            Self::Monospace => "monospace",
        }
    }
}

/// Size, family and the three independent style toggles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    pub size: f32,
    pub family: FontFamilyChoice,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: DEFAULT_FONT_SIZE,
            family: FontFamilyChoice::default(),
            bold: false,
            italic: false,
            underline: false,
        }
    }
}

impl TextStyle {
    pub fn toggle_bold(&mut self) {
        self.bold = !self.bold;
    }

    pub fn toggle_italic(&mut self) {
        self.italic = !self.italic;
    }

    pub fn toggle_underline(&mut self) {
        self.underline = !self.underline;
    }

    /// Size used at stamp time; non-positive or non-finite sizes fall back to the default
    pub fn effective_size(&self) -> f32 {
        if self.size.is_finite() && self.size > 0.0 {
            self.size
        } else {
            DEFAULT_FONT_SIZE
        }
    }

    /// CSS-like font shorthand, e.g. `italic bold 24px sans-serif`
    pub fn font_descriptor(&self) -> String {
        let mut descriptor = String::new();
        if self.italic {
            descriptor.push_str("italic ");
        }
        if self.bold {
            descriptor.push_str("bold ");
        }
        descriptor.push_str(&format!(
            "{}px {}",
            self.effective_size(),
            self.family.css_name()
        ));
        descriptor
    }
}

/// What a text stamp put on the surface
#[derive(Debug, Clone, PartialEq)]
pub struct TextStamp {
    pub text: String,
    pub origin: Pos2,
    pub width: f32,
    pub underline: Option<(Pos2, Pos2)>,
}

/// Rasterizes text straight into a [`Surface`] using egui's bundled fonts.
#[derive(Clone)]
pub struct TextRenderer {
    proportional: FontArc,
    monospace: FontArc,
}

impl std::fmt::Debug for TextRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextRenderer").finish_non_exhaustive()
    }
}

impl TextRenderer {
    /// Loads the first proportional and monospace fonts from egui's defaults
    pub fn from_egui_defaults() -> PadResult<Self> {
        let definitions = egui::FontDefinitions::default();
        let load = |family: egui::FontFamily| -> PadResult<FontArc> {
            let name = definitions
                .families
                .get(&family)
                .and_then(|names| names.first())
                .ok_or_else(|| PadError::Font(format!("no font registered for {family:?}")))?;
            let data = definitions
                .font_data
                .get(name)
                .ok_or_else(|| PadError::Font(format!("missing font data for {name}")))?;
            FontArc::try_from_vec(data.font.to_vec())
                .map_err(|err| PadError::Font(format!("{name}: {err}")))
        };
        Ok(Self {
            proportional: load(egui::FontFamily::Proportional)?,
            monospace: load(egui::FontFamily::Monospace)?,
        })
    }

    fn font(&self, family: FontFamilyChoice) -> &FontArc {
        match family {
            FontFamilyChoice::SansSerif => &self.proportional,
            FontFamilyChoice::Monospace => &self.monospace,
        }
    }

    /// Converts an em size in pixels to ab_glyph's height-based scale
    fn scale_for(font: &FontArc, size: f32) -> PxScale {
        match font.units_per_em() {
            Some(units_per_em) => PxScale::from(size * font.height_unscaled() / units_per_em),
            None => PxScale::from(size),
        }
    }

    /// Positions glyphs on the baseline starting at `origin`; returns them with the advance width.
    fn layout(&self, text: &str, origin: Pos2, style: &TextStyle) -> (Vec<Glyph>, f32) {
        let font = self.font(style.family);
        let scale = Self::scale_for(font, style.effective_size());
        let scaled = font.as_scaled(scale);

        let mut glyphs = Vec::with_capacity(text.len());
        let mut caret = 0.0;
        let mut previous = None;
        for ch in text.chars() {
            let id = font.glyph_id(ch);
            if let Some(previous) = previous {
                caret += scaled.kern(previous, id);
            }
            glyphs.push(id.with_scale_and_position(scale, point(origin.x + caret, origin.y)));
            caret += scaled.h_advance(id);
            previous = Some(id);
        }
        (glyphs, caret)
    }

    /// Width of `text` as it would be stamped with `style`
    pub fn measure(&self, text: &str, style: &TextStyle) -> f32 {
        let (_, advance) = self.layout(text, Pos2::ZERO, style);
        if style.bold { advance + 1.0 } else { advance }
    }

    /// Fills `text` with its baseline at `origin`
    pub fn fill_text(
        &self,
        surface: &mut Surface,
        text: &str,
        origin: Pos2,
        style: &TextStyle,
        color: Color32,
    ) {
        let font = self.font(style.family);
        let (glyphs, _) = self.layout(text, origin, style);
        for glyph in glyphs {
            let Some(outlined) = font.outline_glyph(glyph) else {
                continue; // whitespace
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let y = bounds.min.y + gy as f32;
                let shear = if style.italic {
                    (origin.y - y) * ITALIC_SHEAR
                } else {
                    0.0
                };
                let x = (bounds.min.x + gx as f32 + shear).round() as i64;
                let y = y as i64;
                surface.blend_at(x, y, color, coverage);
                if style.bold {
                    surface.blend_at(x + 1, y, color, coverage);
                }
            });
        }
        surface.touch();
    }

    /// Stamps trimmed `text` at `origin`, drawing a measured underline when requested.
    ///
    /// Returns `None` without touching the surface if the text is blank.
    pub fn stamp(
        &self,
        surface: &mut Surface,
        text: &str,
        origin: Pos2,
        style: &TextStyle,
        color: Color32,
    ) -> Option<TextStamp> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        log::debug!("Stamping {:?} with font {}", text, style.font_descriptor());
        self.fill_text(surface, text, origin, style, color);

        let width = self.measure(text, style);
        let underline = style.underline.then(|| {
            let from = Pos2::new(origin.x, origin.y + UNDERLINE_OFFSET);
            let to = Pos2::new(origin.x + width, origin.y + UNDERLINE_OFFSET);
            surface.stroke_segment(from, to, UNDERLINE_WIDTH, color);
            (from, to)
        });

        Some(TextStamp {
            text: text.to_owned(),
            origin,
            width,
            underline,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn renderer() -> TextRenderer {
        TextRenderer::from_egui_defaults().unwrap()
    }

    #[test]
    fn test_font_descriptor_composition() {
        let mut style = TextStyle::default();
        assert_eq!(style.font_descriptor(), "24px sans-serif");
        style.toggle_bold();
        style.toggle_italic();
        style.family = FontFamilyChoice::Monospace;
        style.size = 30.0;
        assert_eq!(style.font_descriptor(), "italic bold 30px monospace");
    }

    #[test]
    fn test_invalid_size_falls_back_to_default() {
        let style = TextStyle {
            size: f32::NAN,
            ..TextStyle::default()
        };
        assert_eq!(style.effective_size(), DEFAULT_FONT_SIZE);
    }

    #[test]
    fn test_measure_grows_with_text_and_size() {
        let renderer = renderer();
        let style = TextStyle::default();
        let short = renderer.measure("Hi", &style);
        let long = renderer.measure("Hi there", &style);
        assert!(short > 0.0);
        assert!(long > short);

        let big = TextStyle {
            size: 48.0,
            ..TextStyle::default()
        };
        assert!(renderer.measure("Hi", &big) > short);
    }

    #[test]
    fn test_blank_text_is_not_stamped() {
        let renderer = renderer();
        let mut surface = Surface::new(64, 64);
        let before = surface.as_raw().to_vec();
        let stamp = renderer.stamp(&mut surface, "   ", pos2(10.0, 30.0), &TextStyle::default(), Color32::BLACK);
        assert!(stamp.is_none());
        assert_eq!(surface.as_raw(), &before[..]);
    }

    #[test]
    fn test_underline_matches_measured_width() {
        let renderer = renderer();
        let mut surface = Surface::new(400, 100);
        let style = TextStyle {
            underline: true,
            ..TextStyle::default()
        };
        let origin = pos2(20.0, 50.0);
        let stamp = renderer
            .stamp(&mut surface, "  Hello  ", origin, &style, Color32::BLACK)
            .unwrap();

        assert_eq!(stamp.text, "Hello");
        let width = renderer.measure("Hello", &style);
        let (from, to) = stamp.underline.unwrap();
        assert_eq!(from, pos2(20.0, 50.0 + UNDERLINE_OFFSET));
        assert_eq!(to, pos2(20.0 + width, 50.0 + UNDERLINE_OFFSET));
        assert_eq!(to.x - from.x, width);

        let mid_x = (from.x + width / 2.0) as u32;
        let row = (50.0 + UNDERLINE_OFFSET) as u32;
        assert_ne!(surface.pixel(mid_x, row), Color32::WHITE);
    }

    #[test]
    fn test_text_without_underline_leaves_offset_row_clear_past_glyphs() {
        let renderer = renderer();
        let mut surface = Surface::new(400, 100);
        let stamp = renderer
            .stamp(&mut surface, "ab", pos2(20.0, 50.0), &TextStyle::default(), Color32::BLACK)
            .unwrap();
        assert!(stamp.underline.is_none());
        // glyphs put ink somewhere above the baseline
        let inked = (0..50).any(|y| (20..60).any(|x| surface.pixel(x, y) != Color32::WHITE));
        assert!(inked);
    }
}
