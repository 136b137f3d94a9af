//! Camera window and clipping of dirty rectangles against it.

use crate::geom::{PixelRect, TileSpan};

/// The camera's window onto the map, in map-space pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraWindow {
    /// Map-space pixel at the screen's left edge.
    pub x_offset: i32,
    /// Map-space pixel at the screen's top edge.
    pub y_offset: i32,
    /// Screen width in pixels.
    pub screen_w: i32,
    /// Screen height in pixels.
    pub screen_h: i32,
}

impl CameraWindow {
    /// The visible map-space rectangle.
    #[inline]
    pub fn rect(&self) -> PixelRect {
        PixelRect::new(self.x_offset, self.y_offset, self.screen_w, self.screen_h)
    }

    /// Whether any pixel of `rect` falls inside the window.
    #[inline]
    pub fn sees(&self, rect: &PixelRect) -> bool {
        !(rect.x >= self.x_offset + self.screen_w
            || rect.y >= self.y_offset + self.screen_h
            || rect.right() <= self.x_offset
            || rect.bottom() <= self.y_offset)
    }

    /// Map space to screen space.
    #[inline]
    pub fn to_screen(&self, rect: &PixelRect) -> PixelRect {
        rect.translate(-self.x_offset, -self.y_offset)
    }

    /// Every map tile at least partly on screen.
    pub fn visible_tiles(&self, tile_w: u32, tile_h: u32, map_w: u16, map_h: u16) -> TileSpan {
        self.rect().tile_cover(tile_w, tile_h).clamp_to(map_w, map_h)
    }
}

/// What a visible dirty rectangle turns into for one render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Repaint {
    /// The rectangle clipped to the camera window, in screen space.
    pub screen: PixelRect,
    /// Map tiles to redraw on every layer.
    pub tiles: TileSpan,
    /// Map-space pixels the tile blits will overwrite.
    pub covered: PixelRect,
}

/// Clips a map-space dirty rectangle against the camera. Returns `None` when
/// the rectangle lies wholly off screen.
pub fn clip(
    rect: &PixelRect,
    camera: &CameraWindow,
    tile_w: u32,
    tile_h: u32,
    map_w: u16,
    map_h: u16,
) -> Option<Repaint> {
    if !camera.sees(rect) {
        return None;
    }
    let visible = rect.intersection(&camera.rect())?;
    let tiles = visible.tile_cover(tile_w, tile_h).clamp_to(map_w, map_h);
    let covered = if tiles.is_empty() {
        visible
    } else {
        tiles.pixel_rect(tile_w, tile_h)
    };
    Some(Repaint {
        screen: camera.to_screen(&visible),
        tiles,
        covered,
    })
}
