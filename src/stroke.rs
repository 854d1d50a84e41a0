use egui::{Color32, Pos2};
use serde::{Deserialize, Serialize};

/// Background color of a fresh surface; the eraser paints with it.
pub const BACKGROUND: Color32 = Color32::WHITE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineCap {
    Round,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineJoin {
    Round,
}

/// Paint attributes shared by every draw call on the surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub stroke_color: Color32,
    pub fill_color: Color32,
    pub line_width: f32,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
}

impl StrokeStyle {
    pub fn new(color: Color32, line_width: f32) -> Self {
        Self {
            stroke_color: color,
            fill_color: color,
            line_width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
        }
    }

    /// Palette selections write both colors at once
    pub fn set_color(&mut self, color: Color32) {
        self.stroke_color = color;
        self.fill_color = color;
    }
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self::new(Color32::BLACK, 5.0)
    }
}

/// The path currently being built by pointer input.
///
/// Mirrors the begin/move/line model of a 2D drawing context: `move_to`
/// repositions the pen without painting, `line_to` returns the segment that
/// should be stroked right away.
#[derive(Debug, Clone, Default)]
pub struct Path {
    cursor: Option<Pos2>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lifts the pen; the next `line_to` only sets a start point
    pub fn begin(&mut self) {
        self.cursor = None;
    }

    pub fn move_to(&mut self, point: Pos2) {
        self.cursor = Some(point);
    }

    /// Extends the path and returns the new segment, if there was a start point.
    pub fn line_to(&mut self, point: Pos2) -> Option<(Pos2, Pos2)> {
        let segment = self.cursor.map(|from| (from, point));
        self.cursor = Some(point);
        segment
    }
}
