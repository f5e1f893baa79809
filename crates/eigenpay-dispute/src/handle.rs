//! Coordinator-issued reference to a dispute slot.

use serde::{Deserialize, Serialize};

/// Slot index plus generation. A slot reused for a new dispute carries a
/// higher generation, so handles to earlier occupants never match it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DisputeHandle {
    index: u32,
    generation: u32,
}

impl DisputeHandle {
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl std::fmt::Display for DisputeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "dispute#{}.{}", self.index, self.generation)
    }
}
