//! ReelMask Editor - polygon mask editing
//!
//! Holds the masks of one frame and turns pointer events into mask
//! creation, dragging and deletion.

pub mod mask;
pub mod store;
pub mod tool;

pub use mask::{Mask, MaskId, DEFAULT_MASK_COLOR, HIT_RADIUS, MIN_MASK_POINTS};
pub use store::{Gesture, MaskPatch, MaskStore};
pub use tool::EditorTool;
