//! Animation module: frame timing, deferred events and easing
//!
//! The frame scheduler turns host timestamps into deltas, the timeline holds
//! growth events keyed to simulation time.

mod easing;
mod scheduler;
mod timeline;

pub use easing::{Easing, ease};
pub use scheduler::{FrameScheduler, LoopControl};
pub use timeline::Timeline;
