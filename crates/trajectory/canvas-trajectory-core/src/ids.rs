//! Identifiers and the allocator for canvases.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CanvasId(pub u32);

impl fmt::Display for CanvasId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic allocator for CanvasId.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_canvas: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_canvas(&mut self) -> CanvasId {
        let id = CanvasId(self.next_canvas);
        self.next_canvas = self.next_canvas.wrapping_add(1);
        id
    }

    /// Make sure the next allocated id is strictly greater than `id`.
    /// Used after importing canvases that carry their own ids.
    #[inline]
    pub fn reserve_past(&mut self, id: CanvasId) {
        if id.0 >= self.next_canvas {
            self.next_canvas = id.0.wrapping_add(1);
        }
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.alloc_canvas(), CanvasId(0));
        assert_eq!(alloc.alloc_canvas(), CanvasId(1));
        alloc.reset();
        assert_eq!(alloc.alloc_canvas(), CanvasId(0));
    }

    #[test]
    fn reserve_past_skips_imported_ids() {
        let mut alloc = IdAllocator::new();
        alloc.reserve_past(CanvasId(7));
        assert_eq!(alloc.alloc_canvas(), CanvasId(8));
        // Reserving below the cursor is a no-op.
        alloc.reserve_past(CanvasId(2));
        assert_eq!(alloc.alloc_canvas(), CanvasId(9));
    }
}
