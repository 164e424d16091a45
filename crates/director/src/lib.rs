//! Idle/interact/return choreography for the displayed model.
//!
//! The director is a plain state machine advanced by the frame loop. There
//! are no scheduled callbacks: completion effects run inside `advance`, so
//! once `teardown` has been called nothing can fire against a disposed
//! model.
//!
//! # Invariants
//! - Exactly one of Idle / Interacting / Returning holds at any instant.
//! - The return move lands bit-exactly on the rest pose before the idle
//!   sway restarts from center.

mod director;
mod tween;

pub use director::{
    DirectorConfig, DirectorEvent, IdleAnimationDirector, InteractionState, MAX_IDLE_AMPLITUDE,
    RETURN_DELAY_RANGE,
};
pub use tween::{Easing, Oscillator, PoseTween, ReturnTimer, Tween};

pub fn crate_info() -> &'static str {
    "pedestal-director v0.1.0"
}
