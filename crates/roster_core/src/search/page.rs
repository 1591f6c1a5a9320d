//! Page window for paged searches.

use serde::{Deserialize, Serialize};

/// Zero-based `offset` plus page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub offset: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }

    /// Page `index` (zero-based) of `size` rows.
    pub fn of(index: u64, size: u64) -> Self {
        Self {
            offset: index.saturating_mul(size),
            limit: size,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::of(0, 20)
    }
}
