//! Interactive editing layer on top of `docrect-core`.
//!
//! An [`EditSession`] owns one decoded source raster together with the
//! display-space quadrilateral the user is editing. Input events arrive as
//! plain method calls (`pointer_down`, `pointer_move`, `nudge`, ...) so any
//! UI toolkit, or a non-interactive driver like the CLI, can feed it.
//! `commit` estimates the output-rectangle -> source homography from the
//! edited corners and backward-warps the source into the output raster.

mod controller;
mod magnifier;
mod pending;
mod session;

pub use controller::{Direction, EditState, EditUpdate, GuideLine, NudgeStep, PointerKind};
pub use magnifier::{MagnifierSettings, MagnifierView};
pub use pending::PendingCommit;
pub use session::{DisplayBounds, EditSession, OutputSpec, RectifiedImage};
