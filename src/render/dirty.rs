//! The pending dirty-rectangle list.

use crate::error::ViewError;
use crate::geom::PixelRect;

/// Pending map-space rectangles awaiting the next render pass.
///
/// Rectangles are kept as pushed: overlaps and duplicates cost a little
/// redundant drawing but are never merged. The newest rectangle is handed
/// out first.
#[derive(Debug, Default, Clone)]
pub struct DirtyList {
    rects: Vec<PixelRect>,
}

impl DirtyList {
    /// Empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a stale region. Non-positive sizes and extents past
    /// `i32::MAX` are rejected and leave the list untouched.
    pub fn mark(&mut self, x: i32, y: i32, w: i32, h: i32) -> Result<(), ViewError> {
        if w <= 0 || h <= 0 {
            log::error!("dirty rectangle at ({x}, {y}) has invalid size {w}x{h}");
            return Err(ViewError::EmptyRect {
                width: w,
                height: h,
            });
        }
        let rect = PixelRect::new(x, y, w, h);
        if !rect.fits() {
            log::error!("dirty rectangle at ({x}, {y}) sized {w}x{h} overflows");
            return Err(ViewError::RectOverflow {
                x,
                y,
                width: w,
                height: h,
            });
        }
        self.rects.push(rect);
        Ok(())
    }

    /// Records an already-built rectangle.
    pub fn mark_rect(&mut self, rect: PixelRect) -> Result<(), ViewError> {
        self.mark(rect.x, rect.y, rect.w, rect.h)
    }

    /// Takes the most recently marked rectangle.
    #[inline]
    pub fn pop_newest(&mut self) -> Option<PixelRect> {
        self.rects.pop()
    }

    /// Pending rectangles, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &PixelRect> {
        self.rects.iter().rev()
    }

    /// Number of pending rectangles.
    #[inline]
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    /// Whether nothing is pending.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Drops every pending rectangle.
    pub fn clear(&mut self) {
        self.rects.clear();
    }
}
