//! [`Field`]: one map on screen with its objects, images and backend.
//!
//! Everything a frame needs is owned here and threaded through explicitly;
//! there is no global map, viewport or image table.

use crate::backend::{GraphicsBackend, ImageCache};
use crate::config::ViewConfig;
use crate::error::ViewError;
use crate::geom::PixelRect;
use crate::map::{LayerIndex, Tag, TileMap, TileValue};
use crate::object::{Object, ObjectId, ObjectTable, Reference};
use crate::view::{RenderStats, Viewport};

/// A bound viewport plus the object table, image cache and backend it
/// renders with.
///
/// Call order per frame: input, object movement, [`render`](Self::render),
/// [`present`](Self::present).
pub struct Field<B: GraphicsBackend> {
    view: Viewport,
    objects: ObjectTable,
    images: ImageCache,
    gfx: B,
    focus: Option<ObjectId>,
}

impl<B: GraphicsBackend> Field<B> {
    /// Binds `map` to a new viewport drawn through `gfx`.
    pub fn new(map: TileMap, config: ViewConfig, gfx: B) -> Result<Self, ViewError> {
        Ok(Field {
            view: Viewport::bind_map(map, config)?,
            objects: ObjectTable::new(),
            images: ImageCache::new(),
            gfx,
            focus: None,
        })
    }

    /// The viewport.
    pub fn viewport(&self) -> &Viewport {
        &self.view
    }

    /// The object table.
    pub fn objects(&self) -> &ObjectTable {
        &self.objects
    }

    /// The backend.
    pub fn backend(&self) -> &B {
        &self.gfx
    }

    /// The backend, mutably (e.g. to upload generated textures).
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.gfx
    }

    /// The image cache.
    pub fn images_mut(&mut self) -> &mut ImageCache {
        &mut self.images
    }

    /// Object with camera focus, if any.
    pub fn focus(&self) -> Option<ObjectId> {
        self.focus
    }

    /// Creates a named object with no image and the null tag.
    pub fn add_object(&mut self, name: &str) -> Option<ObjectId> {
        let id = self.objects.add(name);
        if id.is_none() {
            log::error!("object name {name} already in use");
        }
        id
    }

    /// Removes an object and marks the area it covered.
    pub fn remove_object(&mut self, id: ObjectId) -> Result<Object, ViewError> {
        self.mark_object_location(id)?;
        if self.focus == Some(id) {
            self.focus = None;
        }
        self.objects.remove(id).ok_or(ViewError::UnknownObject(id))
    }

    /// Gives the camera to an object; its moves scroll the view.
    pub fn focus_camera_on(&mut self, id: ObjectId) -> Result<(), ViewError> {
        if self.objects.get(id).is_none() {
            log::error!("cannot focus camera on unknown object {id:?}");
            return Err(ViewError::UnknownObject(id));
        }
        self.focus = Some(id);
        Ok(())
    }

    /// Swaps an object's sprite, dirtying both the old and the new box.
    pub fn change_object_image(
        &mut self,
        id: ObjectId,
        image: &str,
        image_x: i32,
        image_y: i32,
        width: u16,
        height: u16,
    ) -> Result<(), ViewError> {
        self.mark_object_location(id)?;
        self.object_mut(id)?
            .set_image(image, image_x, image_y, width, height);
        self.mark_object_location(id)
    }

    /// Moves an object by `(dx, dy)`. Moves leaving the map are refused.
    /// When the object has camera focus the view scrolls by the same amount.
    pub fn move_object(&mut self, id: ObjectId, dx: i32, dy: i32) -> Result<(), ViewError> {
        if dx == 0 && dy == 0 {
            return Ok(());
        }
        let (x, y) = self.object(id)?.position(Reference::TopLeft);
        let (Some(nx), Some(ny)) = (x.checked_add(dx), y.checked_add(dy)) else {
            log::error!("object {id:?} move by ({dx}, {dy}) overflows");
            return Err(ViewError::OutOfBounds { id, x, y });
        };
        self.check_inside(id, nx, ny)?;
        let follow = self.focus == Some(id);
        if follow {
            self.view.scroll_target(dx, dy)?;
        }
        self.relocate(id, nx, ny)?;
        if follow {
            self.view.scroll(&mut self.gfx, dx, dy)?;
        }
        Ok(())
    }

    /// Places an object's `reference` corner at `(x, y)`.
    pub fn position_object(
        &mut self,
        id: ObjectId,
        x: i32,
        y: i32,
        reference: Reference,
    ) -> Result<(), ViewError> {
        let top = match reference {
            Reference::TopLeft => y,
            Reference::BottomLeft => {
                y.saturating_sub(self.object(id)?.image().height as i32 - 1)
            }
        };
        self.relocate(id, x, top)
    }

    /// Retags an object, dirtying its box first since it may change depth.
    pub fn tag_object(&mut self, id: ObjectId, tag: Tag) -> Result<(), ViewError> {
        let max_tag = self.view.map().max_tag();
        if tag > max_tag {
            log::error!("cannot tag object {id:?} with {tag}: max tag is {max_tag}");
            return Err(ViewError::TagOutOfRange { tag, max_tag });
        }
        self.mark_object_location(id)?;
        self.object_mut(id)?.set_tag(tag);
        Ok(())
    }

    /// Moves the camera, shifting the screen and dirtying the exposed edges.
    pub fn scroll(&mut self, dx: i32, dy: i32) -> Result<(), ViewError> {
        self.view.scroll(&mut self.gfx, dx, dy)
    }

    /// Changes one tile and dirties it.
    pub fn set_tile(&mut self, layer: LayerIndex, x: u16, y: u16, value: TileValue) {
        self.view.set_tile(layer, x, y, value);
    }

    /// Marks arbitrary map-space damage, e.g. under overlay text.
    pub fn mark_dirty(&mut self, x: i32, y: i32, w: i32, h: i32) -> Result<(), ViewError> {
        self.view.mark_dirty(x, y, w, h)
    }

    /// Queues an object and marks its box; a no-op if already queued.
    pub fn mark_object_dirty(&mut self, id: ObjectId) -> Result<(), ViewError> {
        self.view.mark_object_dirty(&mut self.objects, id)
    }

    /// Queues an object for the next render pass.
    pub fn enqueue_for_render(&mut self, id: ObjectId) -> Result<(), ViewError> {
        self.view.enqueue(&mut self.objects, id)
    }

    /// Runs one render pass.
    pub fn render(&mut self) -> Result<RenderStats, ViewError> {
        self.view
            .render(&mut self.gfx, &mut self.images, &mut self.objects)
    }

    /// Shows the frame.
    pub fn present(&mut self) {
        self.gfx.present();
    }

    /// Frees every cached image and hands back the map and backend.
    pub fn unload(mut self) -> (TileMap, B) {
        self.images.clear(&mut self.gfx);
        (self.view.into_map(), self.gfx)
    }

    fn object(&self, id: ObjectId) -> Result<&Object, ViewError> {
        self.objects.get(id).ok_or_else(|| {
            log::error!("unknown object {id:?}");
            ViewError::UnknownObject(id)
        })
    }

    fn object_mut(&mut self, id: ObjectId) -> Result<&mut Object, ViewError> {
        self.objects.get_mut(id).ok_or_else(|| {
            log::error!("unknown object {id:?}");
            ViewError::UnknownObject(id)
        })
    }

    fn relocate(&mut self, id: ObjectId, x: i32, y: i32) -> Result<(), ViewError> {
        self.check_inside(id, x, y)?;
        self.mark_object_location(id)?;
        self.object_mut(id)?.set_position(x, y, Reference::TopLeft);
        self.mark_object_location(id)
    }

    /// Whether the object's box placed at `(x, y)` stays on the map.
    fn check_inside(&self, id: ObjectId, x: i32, y: i32) -> Result<(), ViewError> {
        let img = self.object(id)?.image();
        let target = PixelRect::new(x, y, img.width as i32, img.height as i32);
        let (map_w, map_h) = self.view.map_pixel_size();
        if target.x < 0
            || target.y < 0
            || !target.fits()
            || target.right() > map_w
            || target.bottom() > map_h
        {
            log::error!("object {id:?} would leave the map at ({x}, {y})");
            return Err(ViewError::OutOfBounds { id, x, y });
        }
        Ok(())
    }

    /// Marks the object's current box dirty, if it has one.
    fn mark_object_location(&mut self, id: ObjectId) -> Result<(), ViewError> {
        let img = self.object(id)?.image();
        if !img.is_drawable() {
            return Ok(());
        }
        let b = img.bounds();
        self.view.mark_dirty(b.x, b.y, b.w, b.h)
    }
}
