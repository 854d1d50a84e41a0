use image::RgbaImage;
use std::collections::VecDeque;

use crate::surface::Surface;

/// A full copy of the surface pixels at one point in time. Never a diff.
#[derive(Clone)]
pub struct Snapshot {
    pixels: RgbaImage,
}

impl Snapshot {
    pub fn capture(surface: &Surface) -> Self {
        Self {
            pixels: surface.image().clone(),
        }
    }
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshot")
            .field("width", &self.pixels.width())
            .field("height", &self.pixels.height())
            .finish()
    }
}

/// Linear undo/redo over whole-surface snapshots.
///
/// Snapshots are raw pixel copies, so restores are synchronous and two quick
/// undo presses can never interleave with a half-finished restore.
#[derive(Debug)]
pub struct History {
    /// Stack of states that can be restored by undo
    undo_stack: VecDeque<Snapshot>,
    /// Stack of states that can be restored by redo
    redo_stack: Vec<Snapshot>,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Records the surface before an undoable mutation
    pub fn snapshot(&mut self, surface: &Surface) {
        self.undo_stack.push_back(Snapshot::capture(surface));
        if self.undo_stack.len() > self.limit {
            self.undo_stack.pop_front();
        }
        self.redo_stack.clear(); // Clear redo stack when a new action is recorded
    }

    /// Restores the most recent snapshot. Returns false if there was nothing to undo.
    pub fn undo(&mut self, surface: &mut Surface) -> bool {
        let Some(previous) = self.undo_stack.pop_back() else {
            return false;
        };
        let current = surface.replace_pixels(previous.pixels);
        self.redo_stack.push(Snapshot { pixels: current });
        true
    }

    /// Re-applies the most recently undone state. Returns false if there was nothing to redo.
    pub fn redo(&mut self, surface: &mut Surface) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        let current = surface.replace_pixels(next.pixels);
        self.undo_stack.push_back(Snapshot { pixels: current });
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Color32, pos2};

    #[test]
    fn test_undo_on_empty_is_noop() {
        let mut history = History::new(20);
        let mut surface = Surface::new(8, 8);
        let before = surface.as_raw().to_vec();
        assert!(!history.undo(&mut surface));
        assert!(!history.redo(&mut surface));
        assert_eq!(surface.as_raw(), &before[..]);
    }

    #[test]
    fn test_undo_then_redo_restores_states() {
        let mut history = History::new(20);
        let mut surface = Surface::new(8, 8);
        let blank = surface.as_raw().to_vec();

        history.snapshot(&surface);
        surface.fill_all(Color32::RED);
        let red = surface.as_raw().to_vec();

        assert!(history.undo(&mut surface));
        assert_eq!(surface.as_raw(), &blank[..]);
        assert!(history.redo(&mut surface));
        assert_eq!(surface.as_raw(), &red[..]);
    }

    #[test]
    fn test_new_snapshot_clears_redo() {
        let mut history = History::new(20);
        let mut surface = Surface::new(8, 8);
        history.snapshot(&surface);
        surface.stroke_segment(pos2(0.0, 0.0), pos2(7.0, 7.0), 2.0, Color32::BLACK);
        history.undo(&mut surface);
        assert!(history.can_redo());

        history.snapshot(&surface);
        assert!(!history.can_redo());
        assert!(!history.redo(&mut surface));
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history = History::new(2);
        let surface = Surface::new(2, 2);
        for _ in 0..5 {
            history.snapshot(&surface);
        }
        assert_eq!(history.undo_len(), 2);
    }
}
