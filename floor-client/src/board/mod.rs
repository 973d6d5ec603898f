//! Reservation board: drag gestures, drop validation and optimistic moves.

pub mod coordinator;
pub mod drag;
pub mod optimistic;
pub mod validator;

pub use coordinator::{MoveCoordinator, MutationOutcome};
pub use drag::{DragError, DragSession, DragState, DragTracker, DropTarget};
pub use optimistic::{apply_cancel, apply_move, run_optimistic};
pub use validator::{Affordance, DropRejection, DropVerdict, validate};
