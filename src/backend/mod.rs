//! The graphics backend seam and the image cache layered over it.

mod cache;
mod quad;
mod recording;

pub use cache::{CacheEntry, ImageCache};
pub use quad::QuadBackend;
pub use recording::{BackendCall, RecordingBackend};

use crate::error::BackendError;

/// Opaque handle to an image owned by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHandle(pub u32);

/// Drawing primitives the compositor drives. All coordinates are screen
/// space.
pub trait GraphicsBackend {
    /// Copies a `w`×`h` region of `image` at `(src_x, src_y)` to `(dst_x, dst_y)`.
    #[allow(clippy::too_many_arguments)]
    fn blit(
        &mut self,
        image: ImageHandle,
        src_x: i32,
        src_y: i32,
        dst_x: i32,
        dst_y: i32,
        w: u32,
        h: u32,
    ) -> Result<(), BackendError>;

    /// Fills a rectangle with a solid colour.
    #[allow(clippy::too_many_arguments)]
    fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, r: u8, g: u8, b: u8)
        -> Result<(), BackendError>;

    /// Hints that a screen region changed since the last present.
    fn add_update_region(&mut self, x: i32, y: i32, w: u32, h: u32);

    /// Shows the frame.
    fn present(&mut self);

    /// Shifts the existing screen contents by `(dx, dy)` pixels.
    fn scroll_screen(&mut self, dx: i32, dy: i32);

    /// Loads an image, blocking until it is ready.
    fn load_image(&mut self, path: &str) -> Result<ImageHandle, BackendError>;

    /// Releases an image.
    fn free_image(&mut self, image: ImageHandle);
}
