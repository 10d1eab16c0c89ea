//! Core movement and animation policy for a top-down tile walker.
//!
//! Nothing here touches a window, a GPU, or the filesystem at step time. The
//! host feeds one input snapshot plus collision/terrain outcomes per frame and
//! gets back a velocity and an animation selection.

pub mod animation;
pub mod controller;
pub mod direction;
pub mod input;
pub mod sheet;
