use egui::{Pos2, Rect, Response};

use crate::stroke::Path;

/// Represents the location where an input event occurred
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputLocation {
    /// The position in surface coordinates
    pub position: Pos2,
    /// Whether this position is within the displayed surface
    pub is_in_canvas: bool,
}

/// Pointer events on the drawing surface, already mapped to surface coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Primary button was pressed over the surface
    PointerDown { location: InputLocation },
    /// Pointer moved over the surface (with or without the button held)
    PointerMove { location: InputLocation },
    /// Primary button was released
    PointerUp { location: InputLocation },
    /// Pointer left the surface
    PointerLeave,
    /// Single click (press and release without dragging)
    Click { location: InputLocation },
    /// Double click
    DoubleClick { location: InputLocation },
}

/// Scales a display-space position into surface coordinates.
///
/// The surface's logical resolution and the size it is shown at can differ,
/// so offsets are scaled by `surface / displayed` on each axis.
pub fn to_surface(pos: Pos2, display_rect: Rect, surface_size: egui::Vec2) -> Pos2 {
    let scale_x = surface_size.x / display_rect.width();
    let scale_y = surface_size.y / display_rect.height();
    Pos2::new(
        (pos.x - display_rect.min.x) * scale_x,
        (pos.y - display_rect.min.y) * scale_y,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerState {
    #[default]
    Idle,
    Painting,
}

/// Tracks whether the user is painting and the path being stroked.
#[derive(Debug, Default)]
pub struct PointerTracker {
    state: PointerState,
    path: Path,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PointerState {
        self.state
    }

    pub fn is_painting(&self) -> bool {
        self.state == PointerState::Painting
    }

    /// Idle -> Painting. Starts a fresh path at `pos`.
    pub fn begin(&mut self, pos: Pos2) {
        self.state = PointerState::Painting;
        self.path.begin();
        self.path.move_to(pos);
    }

    /// Returns the segment to stroke while painting; while idle only
    /// repositions the path start.
    pub fn advance(&mut self, pos: Pos2) -> Option<(Pos2, Pos2)> {
        match self.state {
            PointerState::Painting => self.path.line_to(pos),
            PointerState::Idle => {
                self.path.begin();
                self.path.move_to(pos);
                None
            }
        }
    }

    /// Painting -> Idle. Closes the current path.
    pub fn end(&mut self) {
        self.state = PointerState::Idle;
        self.path.begin();
    }
}

/// Handles converting raw egui input on the canvas into our InputEvents
#[derive(Debug, Default)]
pub struct InputHandler {
    last_pointer_pos: Option<Pos2>,
    was_hovered: bool,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    fn make_location(pos: Pos2, display_rect: Rect, surface_size: egui::Vec2) -> InputLocation {
        InputLocation {
            position: to_surface(pos, display_rect, surface_size),
            is_in_canvas: display_rect.contains(pos),
        }
    }

    /// Process this frame's pointer input for the canvas widget
    pub fn process_input(
        &mut self,
        response: &Response,
        display_rect: Rect,
        surface_size: egui::Vec2,
    ) -> Vec<InputEvent> {
        let mut events = Vec::new();
        let hovered = response.contains_pointer();

        let (pressed, released, latest) = response.ctx.input(|input| {
            (
                input.pointer.primary_pressed(),
                input.pointer.primary_released(),
                input.pointer.latest_pos(),
            )
        });

        if let Some(pos) = latest.filter(|_| hovered) {
            let location = Self::make_location(pos, display_rect, surface_size);
            if Some(pos) != self.last_pointer_pos {
                events.push(InputEvent::PointerMove { location });
            }
            if pressed {
                events.push(InputEvent::PointerDown { location });
            }
            if released {
                events.push(InputEvent::PointerUp { location });
            }
            if response.clicked() {
                events.push(InputEvent::Click { location });
            }
            if response.double_clicked() {
                events.push(InputEvent::DoubleClick { location });
            }
            self.last_pointer_pos = Some(pos);
        } else if self.was_hovered {
            events.push(InputEvent::PointerLeave);
            self.last_pointer_pos = None;
        }

        self.was_hovered = hovered;
        events
    }
}
