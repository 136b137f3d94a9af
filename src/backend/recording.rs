use std::collections::{HashMap, HashSet};

use super::{GraphicsBackend, ImageHandle};
use crate::error::BackendError;

/// One call made against a [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    /// A successful blit; `image` is the name the handle was loaded under.
    Blit {
        /// Source image name.
        image: String,
        /// Source left edge.
        src_x: i32,
        /// Source top edge.
        src_y: i32,
        /// Screen left edge.
        dst_x: i32,
        /// Screen top edge.
        dst_y: i32,
        /// Width.
        w: u32,
        /// Height.
        h: u32,
    },
    /// A solid fill.
    FillRect {
        /// Screen left edge.
        x: i32,
        /// Screen top edge.
        y: i32,
        /// Width.
        w: u32,
        /// Height.
        h: u32,
        /// Fill colour.
        rgb: [u8; 3],
    },
    /// An update-region hint.
    UpdateRegion {
        /// Screen left edge.
        x: i32,
        /// Screen top edge.
        y: i32,
        /// Width.
        w: u32,
        /// Height.
        h: u32,
    },
    /// A present.
    Present,
    /// A screen scroll.
    ScrollScreen {
        /// Horizontal shift.
        dx: i32,
        /// Vertical shift.
        dy: i32,
    },
    /// A load attempt and whether it succeeded.
    LoadImage {
        /// Requested path.
        path: String,
        /// Whether a handle was issued.
        ok: bool,
    },
    /// An image release.
    FreeImage(ImageHandle),
}

/// Headless backend that records every call in order.
///
/// Any path loads successfully unless registered with
/// [`fail_image`](Self::fail_image).
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Vec<BackendCall>,
    images: HashMap<u32, String>,
    next_handle: u32,
    failing: HashSet<String>,
}

impl RecordingBackend {
    /// Backend with an empty call log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes future loads of `path` fail.
    pub fn fail_image(&mut self, path: &str) {
        self.failing.insert(path.to_owned());
    }

    /// Lets every path load again.
    pub fn clear_failures(&mut self) {
        self.failing.clear();
    }

    /// Calls recorded so far.
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Drains the call log.
    pub fn take_calls(&mut self) -> Vec<BackendCall> {
        std::mem::take(&mut self.calls)
    }

    /// Number of recorded calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&BackendCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    /// Recorded blits of the named image, in order.
    pub fn blits_of<'a>(&'a self, image: &'a str) -> impl Iterator<Item = &'a BackendCall> {
        self.calls
            .iter()
            .filter(move |c| matches!(c, BackendCall::Blit { image: i, .. } if i == image))
    }

    /// Number of images currently loaded.
    pub fn live_images(&self) -> usize {
        self.images.len()
    }
}

impl GraphicsBackend for RecordingBackend {
    fn blit(
        &mut self,
        image: ImageHandle,
        src_x: i32,
        src_y: i32,
        dst_x: i32,
        dst_y: i32,
        w: u32,
        h: u32,
    ) -> Result<(), BackendError> {
        let name = self
            .images
            .get(&image.0)
            .ok_or(BackendError::StaleHandle(image.0))?
            .clone();
        self.calls.push(BackendCall::Blit {
            image: name,
            src_x,
            src_y,
            dst_x,
            dst_y,
            w,
            h,
        });
        Ok(())
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, r: u8, g: u8, b: u8)
        -> Result<(), BackendError> {
        self.calls.push(BackendCall::FillRect {
            x,
            y,
            w,
            h,
            rgb: [r, g, b],
        });
        Ok(())
    }

    fn add_update_region(&mut self, x: i32, y: i32, w: u32, h: u32) {
        self.calls.push(BackendCall::UpdateRegion { x, y, w, h });
    }

    fn present(&mut self) {
        self.calls.push(BackendCall::Present);
    }

    fn scroll_screen(&mut self, dx: i32, dy: i32) {
        self.calls.push(BackendCall::ScrollScreen { dx, dy });
    }

    fn load_image(&mut self, path: &str) -> Result<ImageHandle, BackendError> {
        if self.failing.contains(path) {
            self.calls.push(BackendCall::LoadImage {
                path: path.to_owned(),
                ok: false,
            });
            return Err(BackendError::Io {
                path: path.into(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such image"),
            });
        }
        let handle = ImageHandle(self.next_handle);
        self.next_handle += 1;
        self.images.insert(handle.0, path.to_owned());
        self.calls.push(BackendCall::LoadImage {
            path: path.to_owned(),
            ok: true,
        });
        Ok(handle)
    }

    fn free_image(&mut self, image: ImageHandle) {
        self.images.remove(&image.0);
        self.calls.push(BackendCall::FreeImage(image));
    }
}
