use macroquad::prelude::*;

use super::{GraphicsBackend, ImageHandle};
use crate::error::BackendError;

/// Macroquad backend.
///
/// Draws into an off-screen canvas that survives between frames, so only
/// the regions the compositor repaints change. `scroll_screen` shifts the
/// canvas by redrawing it into a second target and swapping the two.
pub struct QuadBackend {
    textures: Slots<Texture2D>,
    front: RenderTarget,
    back: RenderTarget,
    width: f32,
    height: f32,
    canvas_bound: bool,
    update_regions: usize,
}

impl QuadBackend {
    /// Canvas of `width`×`height` screen pixels. Needs a live macroquad
    /// context.
    pub fn new(width: u32, height: u32) -> Self {
        let front = render_target(width, height);
        front.texture.set_filter(FilterMode::Nearest);
        let back = render_target(width, height);
        back.texture.set_filter(FilterMode::Nearest);
        QuadBackend {
            textures: Slots::default(),
            front,
            back,
            width: width as f32,
            height: height as f32,
            canvas_bound: false,
            update_regions: 0,
        }
    }

    /// Adopts a texture built in code (e.g. a generated tileset).
    pub fn add_texture(&mut self, texture: Texture2D) -> ImageHandle {
        texture.set_filter(FilterMode::Nearest);
        ImageHandle(self.textures.insert(texture))
    }

    fn camera_for(&self, target: &RenderTarget) -> Camera2D {
        let mut cam = Camera2D::from_display_rect(Rect::new(0.0, 0.0, self.width, self.height));
        cam.render_target = Some(target.clone());
        cam
    }

    fn bind_canvas(&mut self) {
        if !self.canvas_bound {
            set_camera(&self.camera_for(&self.front));
            self.canvas_bound = true;
        }
    }

    fn texture(&self, image: ImageHandle) -> Result<&Texture2D, BackendError> {
        self.textures
            .get(image.0)
            .ok_or(BackendError::StaleHandle(image.0))
    }
}

impl GraphicsBackend for QuadBackend {
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
        let tex = self.texture(image)?.clone();
        self.bind_canvas();
        draw_texture_ex(
            &tex,
            dst_x as f32,
            dst_y as f32,
            WHITE,
            DrawTextureParams {
                source: Some(Rect::new(src_x as f32, src_y as f32, w as f32, h as f32)),
                ..Default::default()
            },
        );
        Ok(())
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, r: u8, g: u8, b: u8)
        -> Result<(), BackendError> {
        self.bind_canvas();
        draw_rectangle(
            x as f32,
            y as f32,
            w as f32,
            h as f32,
            Color::from_rgba(r, g, b, 255),
        );
        Ok(())
    }

    fn add_update_region(&mut self, x: i32, y: i32, w: u32, h: u32) {
        // The whole canvas is composited every frame; the hint is only counted.
        self.update_regions += 1;
        log::trace!("update region ({x}, {y}) {w}x{h}");
    }

    fn present(&mut self) {
        set_default_camera();
        self.canvas_bound = false;
        draw_texture_ex(
            &self.front.texture,
            0.0,
            0.0,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(screen_width(), screen_height())),
                flip_y: true,
                ..Default::default()
            },
        );
        log::trace!("present after {} update region(s)", self.update_regions);
        self.update_regions = 0;
    }

    fn scroll_screen(&mut self, dx: i32, dy: i32) {
        set_camera(&self.camera_for(&self.back));
        clear_background(BLANK);
        draw_texture_ex(
            &self.front.texture,
            dx as f32,
            dy as f32,
            WHITE,
            DrawTextureParams {
                dest_size: Some(vec2(self.width, self.height)),
                flip_y: true,
                ..Default::default()
            },
        );
        std::mem::swap(&mut self.front, &mut self.back);
        self.canvas_bound = false;
    }

    fn load_image(&mut self, path: &str) -> Result<ImageHandle, BackendError> {
        let bytes = std::fs::read(path).map_err(|source| BackendError::Io {
            path: path.into(),
            source,
        })?;
        let image = Image::from_file_with_format(&bytes, None).map_err(|e| BackendError::Decode {
            path: path.into(),
            reason: format!("{e:?}"),
        })?;
        Ok(self.add_texture(Texture2D::from_image(&image)))
    }

    fn free_image(&mut self, image: ImageHandle) {
        self.textures.remove(image.0);
    }
}

/// Index-addressed storage whose freed slots are handed out again, so
/// evict/reload cycles do not grow it. A freed index may name a different
/// texture once reused.
#[derive(Debug)]
struct Slots<T> {
    items: Vec<Option<T>>,
    free: Vec<u32>,
}

impl<T> Default for Slots<T> {
    fn default() -> Self {
        Slots {
            items: Vec::new(),
            free: Vec::new(),
        }
    }
}

impl<T> Slots<T> {
    fn insert(&mut self, item: T) -> u32 {
        match self.free.pop() {
            Some(i) => {
                self.items[i as usize] = Some(item);
                i
            }
            None => {
                self.items.push(Some(item));
                (self.items.len() - 1) as u32
            }
        }
    }

    fn get(&self, index: u32) -> Option<&T> {
        self.items.get(index as usize).and_then(Option::as_ref)
    }

    fn remove(&mut self, index: u32) -> Option<T> {
        let item = self.items.get_mut(index as usize)?.take()?;
        self.free.push(index);
        Some(item)
    }
}
