use egui::Color32;

use crate::PaintApp;
use crate::app::DropTarget;
use crate::components::SwatchButton;
use crate::export::ExportTarget;
use crate::session::PadSession;
use crate::text::FontFamilyChoice;

pub fn tools_panel(app: &mut PaintApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(220.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Tools");
                mode_section(ui, &mut app.session);
                ui.separator();

                palette_section(ui, &mut app.session);
                ui.separator();

                text_section(ui, &mut app.session);
                ui.separator();

                history_section(ui, &mut app.session);
                ui.separator();

                if ui.button("💾 Save").clicked() {
                    app.last_export = app.session.save();
                }
                match &app.last_export {
                    Some(ExportTarget::File(path)) => {
                        ui.small(format!("Saved to {}", path.display()));
                    }
                    Some(ExportTarget::BrowserDownload) => {
                        ui.small("Download started");
                    }
                    None => {}
                }
                ui.separator();

                ui.label("Dropped images go to");
                ui.horizontal_wrapped(|ui| {
                    for target in DropTarget::ALL {
                        ui.radio_value(&mut app.drop_target, target, target.label());
                    }
                });
                ui.checkbox(&mut app.show_social, "Show timeline");
            });
        });
}

fn mode_section(ui: &mut egui::Ui, session: &mut PadSession) {
    ui.horizontal(|ui| {
        if ui.button(session.mode().toggle_label()).clicked() {
            session.toggle_mode();
        }
        if ui.button("🧽 Eraser").clicked() {
            session.eraser();
        }
        if ui.button("🗑 Destroy").clicked() {
            session.destroy();
        }
    });
    ui.label(format!("Mode: {}", session.mode().name()));

    let mut width = session.style().line_width;
    if ui
        .add(egui::Slider::new(&mut width, 1.0..=50.0).text("Line width"))
        .changed()
    {
        session.set_line_width(width);
    }
}

fn palette_section(ui: &mut egui::Ui, session: &mut PadSession) {
    ui.horizontal(|ui| {
        ui.strong("Color");
        ui.monospace(session.palette().color_code());
        let mut free = session.palette().current();
        if egui::color_picker::color_edit_button_srgba(
            ui,
            &mut free,
            egui::color_picker::Alpha::Opaque,
        )
        .changed()
        {
            session.select_free_color(free);
        }
    });

    let selected = session.palette().selected_swatch();
    let swatches = session.palette().swatches().to_vec();
    ui.horizontal_wrapped(|ui| {
        for (index, color) in swatches.into_iter().enumerate() {
            let response = SwatchButton::new(color, selected == Some(index)).show(ui);
            if response.clicked() {
                session.select_swatch(index);
            }
            // right click to recolor the swatch
            response.context_menu(|ui| {
                let mut edited = color;
                if egui::color_picker::color_picker_color32(
                    ui,
                    &mut edited,
                    egui::color_picker::Alpha::Opaque,
                ) && edited != color
                {
                    session.edit_swatch(index, edited);
                }
            });
        }
    });

    let recent: Vec<Color32> = session.palette().recent().to_vec();
    if !recent.is_empty() {
        ui.label("Recent");
        ui.horizontal(|ui| {
            for (index, color) in recent.into_iter().enumerate() {
                if SwatchButton::new(color, false).size(18.0).show(ui).clicked() {
                    session.select_recent(index);
                }
            }
        });
    }
}

fn text_section(ui: &mut egui::Ui, session: &mut PadSession) {
    ui.strong("Text");
    ui.add(
        egui::TextEdit::singleline(&mut session.text_input)
            .hint_text("Double-click the canvas to stamp"),
    );

    let style = &mut session.text_style;
    ui.add(egui::Slider::new(&mut style.size, 8.0..=96.0).text("Size"));
    egui::ComboBox::from_label("Font")
        .selected_text(style.family.css_name())
        .show_ui(ui, |ui| {
            for family in FontFamilyChoice::ALL {
                ui.selectable_value(&mut style.family, family, family.css_name());
            }
        });
    ui.horizontal(|ui| {
        if ui.selectable_label(style.bold, egui::RichText::new("B").strong()).clicked() {
            style.toggle_bold();
        }
        if ui.selectable_label(style.italic, egui::RichText::new("I").italics()).clicked() {
            style.toggle_italic();
        }
        if ui.selectable_label(style.underline, egui::RichText::new("U").underline()).clicked() {
            style.toggle_underline();
        }
    });
    ui.small(style.font_descriptor());
}

fn history_section(ui: &mut egui::Ui, session: &mut PadSession) {
    ui.horizontal(|ui| {
        let can_undo = session.history().can_undo();
        let can_redo = session.history().can_redo();

        if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() {
            session.undo();
        }
        if ui.add_enabled(can_redo, egui::Button::new("Redo")).clicked() {
            session.redo();
        }
    });

    let history = session.history();
    ui.horizontal(|ui| {
        ui.label(format!("Undo stack size: {}", history.undo_len()));
        ui.label(format!("Redo stack size: {}", history.redo_len()));
    });
}
