//! The drawing pad's interaction state.
//!
//! `PadSession` owns the surface and everything that mutates it, and exposes
//! one method per user action. The UI layer translates egui input into these
//! calls; tests drive them directly.

use egui::{Color32, Pos2};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::error::PadResult;
use crate::export::{self, ExportTarget};
use crate::history::History;
use crate::input::{InputEvent, PointerTracker};
use crate::palette::{DEFAULT_SWATCHES, PaletteManager, color_code};
use crate::stroke::{BACKGROUND, StrokeStyle};
use crate::surface::Surface;
use crate::text::{TextRenderer, TextStamp, TextStyle};
use crate::tools::ToolMode;

/// A message the UI should show the user as an alert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: &'static str,
    pub message: String,
}

/// Settings carried over between runs. Recent colors are deliberately absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub line_width: f32,
    /// Swatch colors as `#rrggbb`
    pub swatches: Vec<String>,
    pub text_style: TextStyle,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            line_width: AppConfig::default().line_width,
            swatches: DEFAULT_SWATCHES.iter().copied().map(color_code).collect(),
            text_style: TextStyle::default(),
        }
    }
}

pub struct PadSession {
    surface: Surface,
    style: StrokeStyle,
    tracker: PointerTracker,
    history: History,
    /// Set once the current stroke has recorded its undo step
    stroke_recorded: bool,
    palette: PaletteManager,
    mode: ToolMode,
    /// Text typed into the text box, stamped on double-click
    pub text_input: String,
    pub text_style: TextStyle,
    text_renderer: Option<TextRenderer>,
    download_dir: PathBuf,
    alert: Option<Alert>,
}

impl std::fmt::Debug for PadSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PadSession")
            .field("surface", &self.surface)
            .field("mode", &self.mode)
            .field("painting", &self.tracker.is_painting())
            .field("undo", &self.history.undo_len())
            .field("redo", &self.history.redo_len())
            .finish()
    }
}

impl PadSession {
    pub fn new(config: &AppConfig) -> Self {
        let initial = Color32::from_hex(&config.initial_color).unwrap_or(DEFAULT_SWATCHES[0]);
        let text_renderer = match TextRenderer::from_egui_defaults() {
            Ok(renderer) => Some(renderer),
            Err(err) => {
                log::error!("Text stamping disabled: {err}");
                None
            }
        };
        Self {
            surface: Surface::new(config.canvas_width, config.canvas_height),
            style: StrokeStyle::new(initial, config.line_width),
            tracker: PointerTracker::new(),
            history: History::new(config.history_limit),
            stroke_recorded: false,
            palette: PaletteManager::new(initial, DEFAULT_SWATCHES.to_vec()),
            mode: ToolMode::Draw,
            text_input: String::new(),
            text_style: TextStyle {
                size: config.font_size,
                ..TextStyle::default()
            },
            text_renderer,
            download_dir: config.download_dir(),
            alert: None,
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn style(&self) -> &StrokeStyle {
        &self.style
    }

    pub fn palette(&self) -> &PaletteManager {
        &self.palette
    }

    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    pub fn tracker(&self) -> &PointerTracker {
        &self.tracker
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    pub fn set_download_dir(&mut self, dir: PathBuf) {
        self.download_dir = dir;
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            line_width: self.style.line_width,
            swatches: self.palette.swatches().iter().copied().map(color_code).collect(),
            text_style: self.text_style.clone(),
        }
    }

    /// Applies saved preferences; unreadable swatch codes keep the default
    pub fn apply_preferences(&mut self, preferences: Preferences) {
        self.set_line_width(preferences.line_width);
        let swatches = preferences
            .swatches
            .iter()
            .enumerate()
            .map(|(index, code)| {
                Color32::from_hex(code)
                    .unwrap_or(DEFAULT_SWATCHES[index % DEFAULT_SWATCHES.len()])
            })
            .collect::<Vec<_>>();
        if !swatches.is_empty() {
            self.palette.set_swatches(swatches);
        }
        self.text_style = preferences.text_style;
    }

    /// Logs an error and queues it as an alert
    pub fn raise(&mut self, title: &'static str, message: String) {
        log::error!("{title}: {message}");
        self.alert = Some(Alert { title, message });
    }

    /// Routes one pointer event to its handler
    pub fn handle_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::PointerDown { location } => self.pointer_down(location.position),
            InputEvent::PointerMove { location } => self.pointer_move(location.position),
            InputEvent::PointerUp { .. } | InputEvent::PointerLeave => self.pointer_up(),
            InputEvent::Click { .. } => self.click(),
            InputEvent::DoubleClick { location } => {
                self.double_click(location.position);
            }
        }
    }

    // ---------------- strokes ----------------

    /// Starts a stroke in either mode. Nothing is recorded until a segment is drawn.
    pub fn pointer_down(&mut self, pos: Pos2) {
        self.tracker.begin(pos);
        self.stroke_recorded = false;
    }

    /// Strokes the next segment; the first one snapshots so a stroke is one undo step
    pub fn pointer_move(&mut self, pos: Pos2) {
        if let Some((from, to)) = self.tracker.advance(pos) {
            if !self.stroke_recorded {
                self.history.snapshot(&self.surface);
                self.stroke_recorded = true;
            }
            self.surface
                .stroke_segment(from, to, self.style.line_width, self.style.stroke_color);
        }
    }

    /// Pointer released or left the surface
    pub fn pointer_up(&mut self) {
        self.tracker.end();
    }

    pub fn set_line_width(&mut self, width: f32) {
        self.style.line_width = width.max(0.1);
    }

    // ---------------- mode & fill ----------------

    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
        log::debug!("Tool mode: {}", self.mode.name());
    }

    /// In Fill mode, paints the whole surface with the fill color
    pub fn click(&mut self) {
        if self.mode == ToolMode::Fill {
            self.history.snapshot(&self.surface);
            self.surface.fill_all(self.style.fill_color);
        }
    }

    /// Paints the surface back to the background color
    pub fn destroy(&mut self) {
        self.history.snapshot(&self.surface);
        self.surface.clear();
        log::info!("Canvas cleared");
    }

    pub fn eraser(&mut self) {
        self.style.stroke_color = BACKGROUND;
        self.mode = ToolMode::Draw;
    }

    // ---------------- palette ----------------

    pub fn select_swatch(&mut self, index: usize) {
        if let Some(color) = self.palette.select_swatch(index) {
            self.style.set_color(color);
        }
    }

    pub fn edit_swatch(&mut self, index: usize, color: Color32) {
        if let Some(color) = self.palette.edit_swatch(index, color) {
            self.style.set_color(color);
        }
    }

    pub fn select_free_color(&mut self, color: Color32) {
        let color = self.palette.select_free(color);
        self.style.set_color(color);
    }

    pub fn select_recent(&mut self, index: usize) {
        if let Some(color) = self.palette.select_recent(index) {
            self.style.set_color(color);
        }
    }

    // ---------------- text ----------------

    /// Stamps the text box contents at `pos` in the palette's active color
    pub fn double_click(&mut self, pos: Pos2) -> Option<TextStamp> {
        if self.text_input.trim().is_empty() {
            return None;
        }
        if self.text_renderer.is_none() {
            self.raise("Text", "No font is available to draw text".into());
            return None;
        }
        let renderer = self.text_renderer.as_ref()?;

        self.history.snapshot(&self.surface);
        let saved_width = self.style.line_width;
        let stamp = renderer.stamp(
            &mut self.surface,
            &self.text_input,
            pos,
            &self.text_style,
            self.palette.current(),
        );
        self.style.line_width = saved_width;
        stamp
    }

    // ---------------- images ----------------

    /// Draws an image stretched over the whole surface
    pub fn insert_image(&mut self, image: &DynamicImage) {
        self.history.snapshot(&self.surface);
        self.surface.draw_image_scaled(image);
        log::info!(
            "Inserted {}x{} image scaled to {}x{}",
            image.width(),
            image.height(),
            self.surface.width(),
            self.surface.height()
        );
    }

    /// Inserts a decoded image, or alerts the user about why it could not be loaded
    pub fn insert_loaded(&mut self, name: &str, image: PadResult<DynamicImage>) {
        match image {
            Ok(image) => self.insert_image(&image),
            Err(err) => self.raise("Image", format!("Could not open {name}: {err}")),
        }
    }

    // ---------------- history ----------------

    pub fn undo(&mut self) -> bool {
        self.tracker.end();
        self.history.undo(&mut self.surface)
    }

    pub fn redo(&mut self) -> bool {
        self.tracker.end();
        self.history.redo(&mut self.surface)
    }

    // ---------------- export ----------------

    /// Exports the surface. Failures become an alert instead of propagating.
    pub fn save(&mut self) -> Option<ExportTarget> {
        match export::export(&self.surface, &self.download_dir) {
            Ok(target) => Some(target),
            Err(err) => {
                self.raise("Save failed", format!("Could not save the drawing: {err}"));
                None
            }
        }
    }
}

impl Default for PadSession {
    fn default() -> Self {
        Self::new(&AppConfig::default())
    }
}
