use crate::PaintApp;
use crate::renderer::fit_display_size;

pub fn central_panel(app: &mut PaintApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let surface_size = app.session.surface().size();
        let display_size = fit_display_size(surface_size, ui.available_size());

        ui.vertical_centered(|ui| {
            let (response, painter) =
                ui.allocate_painter(display_size, egui::Sense::click_and_drag());
            let canvas_rect = response.rect;

            // Handle input
            for event in app.input.process_input(&response, canvas_rect, surface_size) {
                app.session.handle_event(&event);
            }

            // Render the canvas
            if let Some(renderer) = &mut app.renderer {
                renderer.render(&painter, canvas_rect, app.session.surface());
            }

            if app.session.tracker().is_painting() {
                ctx.set_cursor_icon(egui::CursorIcon::Crosshair);
            }
        });
    });
}
