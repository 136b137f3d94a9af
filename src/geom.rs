//! Pixel and tile coordinate helpers shared by the tracker, the culler and
//! the compositor.

/// An axis-aligned rectangle in pixel units.
///
/// The origin is signed so map-space rectangles left or above the map (and
/// screen-space rectangles during an edge scroll) are representable.
/// `right()`/`bottom()` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub w: i32,
    /// Height in pixels.
    pub h: i32,
}

impl PixelRect {
    /// Builds a rectangle without validating its size.
    #[inline]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// First column past the right edge. Saturates at `i32::MAX`.
    #[inline]
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.w)
    }

    /// First row past the bottom edge. Saturates at `i32::MAX`.
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.h)
    }

    /// Whether both far edges are representable.
    #[inline]
    pub fn fits(&self) -> bool {
        self.x.checked_add(self.w).is_some() && self.y.checked_add(self.h).is_some()
    }

    /// Whether the rectangle covers no pixel.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Separating-axis test: two boxes overlap unless one lies wholly to one
    /// side of the other on either axis. Touching edges do not overlap.
    #[inline]
    pub fn intersects(&self, other: &PixelRect) -> bool {
        !(self.is_empty()
            || other.is_empty()
            || self.x >= other.right()
            || other.x >= self.right()
            || self.y >= other.bottom()
            || other.y >= self.bottom())
    }

    /// Overlapping part of two rectangles, if any.
    pub fn intersection(&self, other: &PixelRect) -> Option<PixelRect> {
        if !self.intersects(other) {
            return None;
        }
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        Some(PixelRect::new(x, y, right - x, bottom - y))
    }

    /// Same size, shifted by `(dx, dy)`.
    #[inline]
    pub fn translate(&self, dx: i32, dy: i32) -> PixelRect {
        PixelRect::new(self.x + dx, self.y + dy, self.w, self.h)
    }

    /// Half-open range of tiles touched by this rectangle.
    ///
    /// The low edge is floored and the high edge rounded up, so a rectangle
    /// that ends part-way into a tile still covers that tile.
    pub fn tile_cover(&self, tile_w: u32, tile_h: u32) -> TileSpan {
        let tw = tile_w as i32;
        let th = tile_h as i32;
        TileSpan {
            x0: self.x.div_euclid(tw),
            y0: self.y.div_euclid(th),
            x1: ceil_div(self.right(), tw),
            y1: ceil_div(self.bottom(), th),
        }
    }
}

#[inline]
fn ceil_div(n: i32, d: i32) -> i32 {
    let q = n.div_euclid(d);
    if n.rem_euclid(d) > 0 {
        q + 1
    } else {
        q
    }
}

/// Half-open range of tile indices: `x0..x1` by `y0..y1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSpan {
    /// First column.
    pub x0: i32,
    /// First row.
    pub y0: i32,
    /// One past the last column.
    pub x1: i32,
    /// One past the last row.
    pub y1: i32,
}

impl TileSpan {
    /// Restricts the span to `0..width` by `0..height`.
    pub fn clamp_to(&self, width: u16, height: u16) -> TileSpan {
        TileSpan {
            x0: self.x0.clamp(0, width as i32),
            y0: self.y0.clamp(0, height as i32),
            x1: self.x1.clamp(0, width as i32),
            y1: self.y1.clamp(0, height as i32),
        }
    }

    /// Whether the span names no tile.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }

    /// Number of tiles covered.
    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            ((self.x1 - self.x0) * (self.y1 - self.y0)) as usize
        }
    }

    /// Row-major iterator over `(x, y)` tile coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32)> {
        let TileSpan { x0, y0, x1, y1 } = *self;
        (y0..y1).flat_map(move |y| (x0..x1).map(move |x| (x, y)))
    }

    /// Pixel rectangle the span's tiles occupy.
    pub fn pixel_rect(&self, tile_w: u32, tile_h: u32) -> PixelRect {
        let tw = tile_w as i32;
        let th = tile_h as i32;
        PixelRect::new(
            self.x0 * tw,
            self.y0 * th,
            (self.x1 - self.x0) * tw,
            (self.y1 - self.y0) * th,
        )
    }
}
