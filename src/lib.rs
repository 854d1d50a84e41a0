#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod components;
pub mod config;
pub mod error;
pub mod export;
pub mod file_handler;
pub mod history;
pub mod input;
pub mod palette;
pub mod panels;
pub mod renderer;
pub mod session;
pub mod social;
pub mod stroke;
pub mod surface;
pub mod text;
pub mod tools;
pub mod util;

pub use app::PaintApp;
pub use config::AppConfig;
pub use error::{ExportError, PadError, PadResult};
pub use history::History;
pub use input::{InputEvent, InputHandler, InputLocation, PointerTracker};
pub use palette::PaletteManager;
pub use renderer::Renderer;
pub use session::{Alert, PadSession, Preferences};
pub use social::SocialClient;
pub use stroke::StrokeStyle;
pub use surface::Surface;
pub use text::{TextRenderer, TextStyle};
pub use tools::ToolMode;
