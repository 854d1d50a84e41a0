use serde::{Deserialize, Serialize};

/// What a plain click on the surface does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ToolMode {
    /// Clicks do nothing; drags paint strokes
    #[default]
    Draw,
    /// Clicks flood the entire surface with the fill color
    Fill,
}

impl ToolMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Draw => Self::Fill,
            Self::Fill => Self::Draw,
        }
    }

    /// Caption for the toggle button: names the mode a click switches to
    pub fn toggle_label(self) -> &'static str {
        match self {
            Self::Draw => "🩸 Fill",
            Self::Fill => "🖊 Draw",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Draw => "Draw",
            Self::Fill => "Fill",
        }
    }
}
