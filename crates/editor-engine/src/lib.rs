//! Montage Editor Engine
//!
//! The interactive layer of the editor: viewport zoom and scroll,
//! pointer gesture handling, and playback synchronization. This crate
//! is pure state-machine computation over the composition model, with
//! no rendering and no I/O beyond zoom persistence.

pub mod interaction;
pub mod persist;
pub mod playback;
pub mod viewport;

pub use interaction::{Gesture, GestureOutcome, HitTarget, InteractionEngine, PointerSample};
pub use playback::{LoopMode, PlaybackState, PlaybackSynchronizer};
pub use viewport::ViewportController;
