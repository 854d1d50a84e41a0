use egui::{Color32, Pos2, Rect, pos2, vec2};
use sketch_pad::input::{InputEvent, InputLocation, to_surface};
use sketch_pad::stroke::BACKGROUND;
use sketch_pad::{AppConfig, PadSession, ToolMode};

fn session(size: u32) -> PadSession {
    PadSession::new(&AppConfig {
        canvas_width: size,
        canvas_height: size,
        ..AppConfig::default()
    })
}

fn at(position: Pos2) -> InputLocation {
    InputLocation {
        position,
        is_in_canvas: true,
    }
}

fn drag(session: &mut PadSession, from: Pos2, to: Pos2) {
    session.handle_event(&InputEvent::PointerDown { location: at(from) });
    session.handle_event(&InputEvent::PointerMove { location: at(to) });
    session.handle_event(&InputEvent::PointerUp { location: at(to) });
}

#[test]
fn test_undo_all_restores_initial_pixels() {
    let mut session = session(48);
    let initial = session.surface().as_raw().to_vec();

    drag(&mut session, pos2(2.0, 2.0), pos2(40.0, 40.0));
    session.select_swatch(3);
    drag(&mut session, pos2(40.0, 2.0), pos2(2.0, 40.0));
    session.toggle_mode();
    session.handle_event(&InputEvent::Click { location: at(pos2(5.0, 5.0)) });
    session.destroy();
    assert_eq!(session.history().undo_len(), 4);

    for _ in 0..4 {
        assert!(session.undo());
    }
    assert!(!session.undo());
    assert_eq!(session.surface().as_raw(), initial.as_slice());
}

#[test]
fn test_redo_restores_state_before_undo() {
    let mut session = session(32);
    drag(&mut session, pos2(1.0, 1.0), pos2(30.0, 1.0));
    let drawn = session.surface().as_raw().to_vec();

    session.undo();
    assert_ne!(session.surface().as_raw(), drawn.as_slice());
    assert!(session.redo());
    assert_eq!(session.surface().as_raw(), drawn.as_slice());
}

#[test]
fn test_new_action_after_undo_clears_redo() {
    let mut session = session(32);
    drag(&mut session, pos2(1.0, 1.0), pos2(30.0, 30.0));
    session.undo();
    assert!(session.history().can_redo());

    drag(&mut session, pos2(1.0, 30.0), pos2(30.0, 1.0));
    let after = session.surface().as_raw().to_vec();
    assert!(!session.redo());
    assert_eq!(session.surface().as_raw(), after.as_slice());
}

#[test]
fn test_fill_click_covers_whole_surface() {
    let mut session = session(24);
    drag(&mut session, pos2(0.0, 0.0), pos2(23.0, 23.0));
    session.select_swatch(12);
    let fill = session.style().fill_color;

    session.toggle_mode();
    assert_eq!(session.mode(), ToolMode::Fill);
    session.handle_event(&InputEvent::Click { location: at(pos2(3.0, 3.0)) });

    let [r, g, b, a] = fill.to_srgba_unmultiplied();
    assert!(session.surface().image().pixels().all(|p| p.0 == [r, g, b, a]));
}

#[test]
fn test_moves_while_idle_do_not_paint() {
    let mut session = session(32);
    let blank = session.surface().as_raw().to_vec();
    session.handle_event(&InputEvent::PointerMove { location: at(pos2(3.0, 3.0)) });
    session.handle_event(&InputEvent::PointerMove { location: at(pos2(28.0, 28.0)) });
    assert_eq!(session.surface().as_raw(), blank.as_slice());
    assert!(!session.history().can_undo());
}

#[test]
fn test_leaving_surface_ends_stroke() {
    let mut session = session(32);
    session.handle_event(&InputEvent::PointerDown { location: at(pos2(2.0, 2.0)) });
    session.handle_event(&InputEvent::PointerLeave);
    assert!(!session.tracker().is_painting());

    let before = session.surface().as_raw().to_vec();
    session.handle_event(&InputEvent::PointerMove { location: at(pos2(30.0, 30.0)) });
    assert_eq!(session.surface().as_raw(), before.as_slice());
}

#[test]
fn test_eraser_strokes_with_background() {
    let mut session = session(32);
    session.toggle_mode();
    session.handle_event(&InputEvent::Click { location: at(pos2(1.0, 1.0)) });
    session.eraser();
    drag(&mut session, pos2(0.0, 16.0), pos2(31.0, 16.0));
    assert_eq!(session.surface().pixel(16, 16), BACKGROUND);
}

#[test]
fn test_display_offsets_scale_to_surface() {
    // 800x800 surface shown at 400x200, offset inside the window
    let display = Rect::from_min_size(pos2(10.0, 20.0), vec2(400.0, 200.0));
    let mapped = to_surface(pos2(10.0 + 100.0, 20.0 + 50.0), display, vec2(800.0, 800.0));
    assert_eq!(mapped, pos2(200.0, 200.0));
}

#[test]
fn test_recent_colors_track_selection_sources() {
    let mut session = session(16);
    let picks: Vec<Color32> = (1..=6).map(|level| Color32::from_gray(level * 10)).collect();
    for color in &picks {
        session.select_free_color(*color);
    }
    assert_eq!(
        session.palette().recent(),
        &[picks[5], picks[4], picks[3], picks[2], picks[1]]
    );

    session.select_free_color(picks[3]);
    assert_eq!(session.palette().recent().len(), 5);
    assert_eq!(session.palette().recent()[0], picks[5]);

    session.select_swatch(0);
    assert_eq!(session.palette().selected_swatch(), Some(0));
    session.select_recent(2);
    assert_eq!(session.palette().selected_swatch(), None);
    assert_eq!(session.style().stroke_color, picks[3]);
}

/// What the canvas input handler emits for a real double-click
fn double_click(session: &mut PadSession, position: Pos2) {
    for _ in 0..2 {
        session.handle_event(&InputEvent::PointerDown { location: at(position) });
        session.handle_event(&InputEvent::PointerUp { location: at(position) });
        session.handle_event(&InputEvent::Click { location: at(position) });
    }
    session.handle_event(&InputEvent::DoubleClick { location: at(position) });
}

#[test]
fn test_double_click_stamps_text_as_one_undo_step() {
    let mut session = session(128);
    session.text_input = "Hi".into();
    session.text_style.underline = true;
    let blank = session.surface().as_raw().to_vec();

    double_click(&mut session, pos2(10.0, 60.0));
    assert_ne!(session.surface().as_raw(), blank.as_slice());
    assert_eq!(session.history().undo_len(), 1);

    assert!(session.undo());
    assert_eq!(session.surface().as_raw(), blank.as_slice());
    assert!(!session.undo());
}

#[test]
fn test_fill_mode_drag_still_strokes() {
    let mut session = session(64);
    session.toggle_mode();
    let blank = session.surface().as_raw().to_vec();

    drag(&mut session, pos2(5.0, 5.0), pos2(60.0, 60.0));
    assert_ne!(session.surface().as_raw(), blank.as_slice());
    assert_eq!(session.surface().pixel(32, 32), session.style().stroke_color);
    assert_eq!(session.history().undo_len(), 1);
}

#[test]
fn test_fill_with_translucent_color_overwrites_every_pixel() {
    let mut session = session(24);
    drag(&mut session, pos2(0.0, 0.0), pos2(23.0, 23.0));
    session.select_free_color(Color32::from_rgba_unmultiplied(255, 0, 0, 128));
    let fill = session.style().fill_color.to_srgba_unmultiplied();

    session.toggle_mode();
    session.handle_event(&InputEvent::PointerDown { location: at(pos2(3.0, 3.0)) });
    session.handle_event(&InputEvent::PointerUp { location: at(pos2(3.0, 3.0)) });
    session.handle_event(&InputEvent::Click { location: at(pos2(3.0, 3.0)) });

    assert!(session.surface().image().pixels().all(|p| p.0 == fill));
    assert_eq!(session.history().undo_len(), 2);
}

#[test]
fn test_inserted_image_is_undoable() {
    let mut session = session(16);
    let blank = session.surface().as_raw().to_vec();
    let red = image::RgbaImage::from_pixel(4, 4, image::Rgba([255, 0, 0, 255]));
    session.insert_loaded("red.png", Ok(image::DynamicImage::ImageRgba8(red)));
    assert_eq!(session.surface().pixel(8, 8), Color32::RED);

    session.undo();
    assert_eq!(session.surface().as_raw(), blank.as_slice());
}

#[test]
fn test_export_writes_named_png() {
    let mut session = session(20);
    let dir = std::env::temp_dir().join(format!("sketch_pad_export_{}", uuid::Uuid::new_v4()));
    session.set_download_dir(dir.clone());

    let target = session.save();
    let path = dir.join(sketch_pad::export::EXPORT_FILE_NAME);
    assert_eq!(target, Some(sketch_pad::export::ExportTarget::File(path.clone())));
    let decoded = image::open(&path).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (20, 20));
    std::fs::remove_dir_all(&dir).unwrap();
}
