mod central_panel;
mod social_panel;
mod tools_panel;

pub use central_panel::central_panel;
pub use social_panel::social_panel;
pub use tools_panel::tools_panel;
