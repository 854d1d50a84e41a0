use egui::Color32;

/// Maximum number of entries in the recent-colors list
pub const MAX_RECENT: usize = 5;

/// Swatches shown in the palette on first start
pub const DEFAULT_SWATCHES: [Color32; 15] = [
    Color32::from_rgb(0x1a, 0xbc, 0x9c),
    Color32::from_rgb(0x2e, 0xcc, 0x71),
    Color32::from_rgb(0x34, 0x98, 0xdb),
    Color32::from_rgb(0x9b, 0x59, 0xb6),
    Color32::from_rgb(0x34, 0x49, 0x5e),
    Color32::from_rgb(0x16, 0xa0, 0x85),
    Color32::from_rgb(0x27, 0xae, 0x60),
    Color32::from_rgb(0x29, 0x80, 0xb9),
    Color32::from_rgb(0x8e, 0x44, 0xad),
    Color32::from_rgb(0x2c, 0x3e, 0x50),
    Color32::from_rgb(0xf1, 0xc4, 0x0f),
    Color32::from_rgb(0xe6, 0x7e, 0x22),
    Color32::from_rgb(0xe7, 0x4c, 0x3c),
    Color32::from_rgb(0xec, 0xf0, 0xf1),
    Color32::from_rgb(0x95, 0xa5, 0xa6),
];

/// Formats a color as the `#rrggbb` code shown next to the palette
pub fn color_code(color: Color32) -> String {
    let [r, g, b, _] = color.to_srgba_unmultiplied();
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Current color, editable swatches and the most-recently-used list
#[derive(Debug, Clone)]
pub struct PaletteManager {
    current: Color32,
    swatches: Vec<Color32>,
    recent: Vec<Color32>,
    /// Index of the swatch drawn as selected, if the current color came from one
    selected: Option<usize>,
}

impl PaletteManager {
    pub fn new(initial: Color32, swatches: Vec<Color32>) -> Self {
        Self {
            current: initial,
            swatches,
            recent: Vec::new(),
            selected: None,
        }
    }

    pub fn current(&self) -> Color32 {
        self.current
    }

    pub fn color_code(&self) -> String {
        color_code(self.current)
    }

    pub fn swatches(&self) -> &[Color32] {
        &self.swatches
    }

    pub fn recent(&self) -> &[Color32] {
        &self.recent
    }

    pub fn selected_swatch(&self) -> Option<usize> {
        self.selected
    }

    /// Picks a palette swatch and highlights it exclusively
    pub fn select_swatch(&mut self, index: usize) -> Option<Color32> {
        let color = *self.swatches.get(index)?;
        self.current = color;
        self.add_to_recent(color);
        self.selected = Some(index);
        Some(color)
    }

    /// Recolors a swatch in place, then selects it
    pub fn edit_swatch(&mut self, index: usize, color: Color32) -> Option<Color32> {
        let swatch = self.swatches.get_mut(index)?;
        *swatch = color;
        self.select_swatch(index)
    }

    /// Free-form color entry; not a swatch, so the highlight is cleared
    pub fn select_free(&mut self, color: Color32) -> Color32 {
        self.current = color;
        self.add_to_recent(color);
        self.selected = None;
        color
    }

    /// Re-applies a recent chip without reordering the list
    pub fn select_recent(&mut self, index: usize) -> Option<Color32> {
        let color = *self.recent.get(index)?;
        self.current = color;
        self.selected = None;
        Some(color)
    }

    /// Replaces the swatches, e.g. with ones restored from a previous run
    pub fn set_swatches(&mut self, swatches: Vec<Color32>) {
        if self.selected.is_some_and(|index| index >= swatches.len()) {
            self.selected = None;
        }
        self.swatches = swatches;
    }

    pub fn add_to_recent(&mut self, color: Color32) {
        if self.recent.contains(&color) {
            return;
        }
        self.recent.insert(0, color);
        self.recent.truncate(MAX_RECENT);
    }
}

impl Default for PaletteManager {
    fn default() -> Self {
        Self::new(DEFAULT_SWATCHES[0], DEFAULT_SWATCHES.to_vec())
    }
}
