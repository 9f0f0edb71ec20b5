use log::debug;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use docrect_core::{clamp_to_canvas, Corner};

use crate::magnifier::MagnifierView;
use crate::session::EditSession;

/// Controller state. A `Selected` corner is the target of keyboard
/// nudges; a `Dragging` corner follows the pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditState {
    Idle,
    Selected(Corner),
    Dragging(Corner),
}

/// Where a pointer sequence came from. Touch surfaces have no hover, so
/// releasing a touch drag keeps the corner selected for the on-screen
/// nudge buttons; a mouse release goes back to `Idle`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerKind {
    Mouse,
    Touch,
}

/// Nudge direction for keyboard arrows and on-screen buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Nudge amount: on-screen touch buttons move half a unit for precision,
/// plain arrow keys one unit, arrows with the fast modifier ten.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NudgeStep {
    Fine,
    Arrow,
    FastArrow,
}

impl NudgeStep {
    pub fn units(self) -> f32 {
        match self {
            NudgeStep::Fine => 0.5,
            NudgeStep::Arrow => 1.0,
            NudgeStep::FastArrow => 10.0,
        }
    }
}

/// One edge of the quadrilateral overlay, in display coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GuideLine {
    pub from: Point2<f32>,
    pub to: Point2<f32>,
}

impl GuideLine {
    pub fn length(&self) -> f32 {
        let dx = self.to.x - self.from.x;
        let dy = self.to.y - self.from.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Angle in degrees, for UI layers that place a rotated strip between
    /// the two handles.
    pub fn angle_deg(&self) -> f32 {
        (self.to.y - self.from.y)
            .atan2(self.to.x - self.from.x)
            .to_degrees()
    }
}

/// Everything a UI needs after a successful corner move: the new corner
/// position, the recomputed guide lines, and a preview rendered around
/// the moved corner.
#[derive(Clone, Debug)]
pub struct EditUpdate {
    pub corner: Corner,
    pub position: Point2<f32>,
    pub guides: [GuideLine; 4],
    pub magnifier: MagnifierView,
}

impl EditSession {
    /// Pointer or touch pressed on a corner handle.
    pub fn pointer_down(&mut self, corner: Corner) {
        self.state = EditState::Dragging(corner);
    }

    /// Pointer moved. Repositions the dragged corner (clamped to the
    /// canvas); ignored unless a drag is in progress.
    pub fn pointer_move(&mut self, pos: Point2<f32>) -> Option<EditUpdate> {
        let EditState::Dragging(corner) = self.state else {
            return None;
        };
        Some(self.apply_position(corner, pos))
    }

    /// Pointer or touch released, ending a drag.
    pub fn pointer_up(&mut self, kind: PointerKind) {
        if let EditState::Dragging(corner) = self.state {
            self.state = match kind {
                PointerKind::Mouse => EditState::Idle,
                PointerKind::Touch => EditState::Selected(corner),
            };
        }
    }

    /// Non-drag click on a handle: make it the nudge target.
    pub fn select(&mut self, corner: Corner) {
        self.state = EditState::Selected(corner);
    }

    /// Escape: drop the selection.
    pub fn clear_selection(&mut self) {
        self.state = EditState::Idle;
    }

    /// Move the selected corner one step in `dir`. Returns `None` when no
    /// corner is selected (the UI shows a "select a corner" hint then).
    pub fn nudge(&mut self, dir: Direction, step: NudgeStep) -> Option<EditUpdate> {
        let EditState::Selected(corner) = self.state else {
            return None;
        };
        let units = step.units();
        let p = self.quad.get(corner);
        let target = match dir {
            Direction::Up => Point2::new(p.x, p.y - units),
            Direction::Down => Point2::new(p.x, p.y + units),
            Direction::Left => Point2::new(p.x - units, p.y),
            Direction::Right => Point2::new(p.x + units, p.y),
        };
        Some(self.apply_position(corner, target))
    }

    /// The quadrilateral's edges in fixed role order, TL->TR->BR->BL->TL.
    pub fn guide_lines(&self) -> [GuideLine; 4] {
        let [tl, tr, br, bl] = self.quad.points();
        [
            GuideLine { from: tl, to: tr },
            GuideLine { from: tr, to: br },
            GuideLine { from: br, to: bl },
            GuideLine { from: bl, to: tl },
        ]
    }

    /// Single mutation point for corner coordinates: clamp, store, and
    /// rebuild the derived overlay state.
    fn apply_position(&mut self, corner: Corner, pos: Point2<f32>) -> EditUpdate {
        let clamped = clamp_to_canvas(pos, self.canvas_width, self.canvas_height);
        self.quad.set(corner, clamped);
        debug_assert!(
            self.quad.within(self.canvas_width, self.canvas_height),
            "corner escaped the canvas despite clamping"
        );
        debug!(
            "{:?} -> ({:.1}, {:.1})",
            corner, clamped.x, clamped.y
        );
        EditUpdate {
            corner,
            position: clamped,
            guides: self.guide_lines(),
            magnifier: crate::magnifier::render(
                &self.source.view(),
                &self.quad,
                self.scale_factor,
                clamped,
                &self.magnifier,
            ),
        }
    }
}
