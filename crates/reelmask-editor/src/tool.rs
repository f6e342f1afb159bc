//! Editor tools.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The active pointer tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorTool {
    /// Draw new masks; pressing on an existing vertex drags that mask.
    #[default]
    Draw,
    /// Drag existing masks only.
    Move,
    /// Delete the mask under the pointer.
    Erase,
}

impl EditorTool {
    pub const ALL: [EditorTool; 3] = [Self::Draw, Self::Move, Self::Erase];

    /// Whether pressing on empty space starts a new stroke.
    pub fn draws(self) -> bool {
        matches!(self, Self::Draw)
    }
}

impl fmt::Display for EditorTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draw => write!(f, "draw"),
            Self::Move => write!(f, "move"),
            Self::Erase => write!(f, "erase"),
        }
    }
}
