use eframe::egui;

/// A square color chip; clicking it reports the response like a button
pub struct SwatchButton {
    pub color: egui::Color32,
    pub selected: bool,
    pub size: f32,
}

impl SwatchButton {
    pub fn new(color: egui::Color32, selected: bool) -> Self {
        Self {
            color,
            selected,
            size: 22.0,
        }
    }

    pub fn size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    pub fn show(&self, ui: &mut egui::Ui) -> egui::Response {
        let (rect, response) =
            ui.allocate_exact_size(egui::vec2(self.size, self.size), egui::Sense::click());

        if ui.is_rect_visible(rect) {
            let painter = ui.painter();
            painter.rect_filled(rect, 4.0, self.color);

            // Selected chips get a thick ring, hovered ones a thin one
            let stroke = if self.selected {
                egui::Stroke::new(3.0, egui::Color32::from_rgb(33, 150, 243))
            } else if response.hovered() {
                egui::Stroke::new(1.5, egui::Color32::from_gray(160))
            } else {
                egui::Stroke::new(1.0, egui::Color32::from_gray(60))
            };
            painter.rect_stroke(rect, 4.0, stroke);
        }

        response.on_hover_text(crate::palette::color_code(self.color))
    }
}
