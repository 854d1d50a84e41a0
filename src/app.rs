use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::export::ExportTarget;
use crate::file_handler::FileHandler;
use crate::input::InputHandler;
use crate::panels::{central_panel, social_panel, tools_panel};
use crate::renderer::Renderer;
use crate::session::{PadSession, Preferences};
use crate::social::SocialClient;

/// What a dropped image file is used for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropTarget {
    /// Drawn scaled over the whole canvas
    #[default]
    Canvas,
    /// Attached to the tweet being composed
    TweetPhoto,
    /// Becomes the profile photo
    Avatar,
}

impl DropTarget {
    pub const ALL: [Self; 3] = [Self::Canvas, Self::TweetPhoto, Self::Avatar];

    pub fn label(self) -> &'static str {
        match self {
            Self::Canvas => "Canvas",
            Self::TweetPhoto => "Tweet photo",
            Self::Avatar => "Avatar",
        }
    }
}

/// We derive Deserialize/Serialize so we can persist preferences on shutdown.
/// Everything tied to the current run (pixels, history, recent colors,
/// backend state) is skipped.
#[derive(Deserialize, Serialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct PaintApp {
    preferences: Preferences,
    pub(crate) drop_target: DropTarget,
    pub(crate) show_social: bool,

    #[serde(skip)]
    pub(crate) session: PadSession,
    // Skip serializing the renderer since it contains GPU resources
    #[serde(skip)]
    pub(crate) renderer: Option<Renderer>,
    #[serde(skip)]
    pub(crate) input: InputHandler,
    #[serde(skip)]
    file_handler: FileHandler,
    #[serde(skip)]
    pub(crate) social: SocialClient,
    #[serde(skip)]
    pub(crate) last_export: Option<ExportTarget>,
}

impl Default for PaintApp {
    fn default() -> Self {
        let config = AppConfig::default();
        Self {
            preferences: Preferences::default(),
            drop_target: DropTarget::default(),
            show_social: true,
            session: PadSession::new(&config),
            renderer: None,
            input: InputHandler::new(),
            file_handler: FileHandler::new(),
            social: SocialClient::in_memory(&config.feed),
            last_export: None,
        }
    }
}

impl PaintApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let config = AppConfig::load().unwrap_or_else(|err| {
            log::error!("Using the default configuration: {err}");
            AppConfig::default()
        });
        Self::with_config(cc, config)
    }

    pub fn with_config(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let mut app: Self = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        app.session = PadSession::new(&config);
        app.session.apply_preferences(app.preferences.clone());
        app.renderer = Some(Renderer::new(&cc.egui_ctx));
        app.social = SocialClient::in_memory(&config.feed);
        app.social.start();
        log::info!(
            "Started with a {}x{} canvas",
            config.canvas_width,
            config.canvas_height
        );
        app
    }

    pub fn session(&self) -> &PadSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut PadSession {
        &mut self.session
    }

    pub fn social_mut(&mut self) -> &mut SocialClient {
        &mut self.social
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        if !self.file_handler.check_for_dropped_files(ctx) {
            return;
        }
        match self.drop_target {
            DropTarget::Canvas => {
                for file in self.file_handler.process_dropped_files() {
                    self.session.insert_loaded(&file.name, file.image);
                }
            }
            target => {
                for (name, bytes) in self.file_handler.process_dropped_bytes() {
                    match bytes {
                        Ok(bytes) if target == DropTarget::Avatar => self.social.change_avatar(&bytes),
                        Ok(bytes) => self.social.attach_photo(&name, &bytes),
                        Err(err) => self.session.raise("Image", format!("Could not open {name}: {err}")),
                    }
                }
            }
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let (undo, redo) = ctx.input_mut(|input| {
            (
                input.consume_key(egui::Modifiers::COMMAND, egui::Key::Z),
                input.consume_key(egui::Modifiers::COMMAND, egui::Key::Y),
            )
        });
        if undo {
            self.session.undo();
        }
        if redo {
            self.session.redo();
        }
    }

    fn show_alert(&mut self, ctx: &egui::Context) {
        let Some(alert) = self.session.alert().cloned() else {
            return;
        };
        egui::Window::new(alert.title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(&alert.message);
                if ui.button("OK").clicked() {
                    self.session.dismiss_alert();
                }
            });
    }
}

impl eframe::App for PaintApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.preferences = self.session.preferences();
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_dropped_files(ctx);
        self.handle_shortcuts(ctx);
        self.social.poll(ctx);

        tools_panel(self, ctx);
        if self.show_social {
            social_panel(self, ctx);
        }
        central_panel(self, ctx);

        self.show_alert(ctx);
    }
}
