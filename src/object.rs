//! Sprite objects: the renderable [`ObjectImage`], the [`ObjectRegistry`]
//! interface the compositor consumes, and [`ObjectTable`], the stock
//! registry.

use std::collections::HashMap;

use crate::geom::PixelRect;
use crate::map::{Tag, NULL_TAG};

/// Stable handle to an object in an [`ObjectTable`].
///
/// The generation guards against a freed slot being reused while a stale
/// handle is still held by a render queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId {
    index: u32,
    generation: u32,
}

impl ObjectId {
    /// Slot index inside the owning table.
    #[inline]
    pub fn index(self) -> u32 {
        self.index
    }
}

/// Which corner of the sprite a coordinate refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reference {
    /// Top-left pixel of the sprite.
    #[default]
    TopLeft,
    /// Bottom-left pixel of the sprite (its feet).
    BottomLeft,
}

/// A sprite's renderable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectImage {
    /// Name of the source image; `None` until an image is assigned.
    pub image: Option<String>,
    /// Left edge of the source sub-rectangle.
    pub image_x: i32,
    /// Top edge of the source sub-rectangle.
    pub image_y: i32,
    /// Width of the sprite in pixels.
    pub width: u16,
    /// Height of the sprite in pixels.
    pub height: u16,
    /// Left edge in map space.
    pub map_x: i32,
    /// Top edge in map space.
    pub map_y: i32,
    /// Object this image belongs to.
    pub parent: ObjectId,
}

impl ObjectImage {
    fn new(parent: ObjectId) -> Self {
        ObjectImage {
            image: None,
            image_x: 0,
            image_y: 0,
            width: 0,
            height: 0,
            map_x: 0,
            map_y: 0,
            parent,
        }
    }

    /// Bottom edge used for depth sorting.
    #[inline]
    pub fn baseline(&self) -> i32 {
        self.map_y + self.height as i32
    }

    /// Bounding box in map space.
    #[inline]
    pub fn bounds(&self) -> PixelRect {
        PixelRect::new(self.map_x, self.map_y, self.width as i32, self.height as i32)
    }

    /// Whether there is something to blit.
    #[inline]
    pub fn is_drawable(&self) -> bool {
        self.image.is_some() && self.width > 0 && self.height > 0
    }
}

/// A named sprite object.
#[derive(Debug, Clone)]
pub struct Object {
    name: String,
    tag: Tag,
    dirty: bool,
    image: ObjectImage,
}

impl Object {
    /// Unique name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render tag; `NULL_TAG` objects are never drawn.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Changes the render tag.
    pub fn set_tag(&mut self, tag: Tag) {
        self.tag = tag;
    }

    /// Whether the object is queued for the current frame.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Renderable state.
    pub fn image(&self) -> &ObjectImage {
        &self.image
    }

    /// Assigns the source image and sub-rectangle.
    pub fn set_image(&mut self, name: &str, image_x: i32, image_y: i32, width: u16, height: u16) {
        self.image.image = Some(name.to_owned());
        self.image.image_x = image_x;
        self.image.image_y = image_y;
        self.image.width = width;
        self.image.height = height;
    }

    /// Map-space position of the given corner.
    pub fn position(&self, reference: Reference) -> (i32, i32) {
        let img = &self.image;
        match reference {
            Reference::TopLeft => (img.map_x, img.map_y),
            Reference::BottomLeft => (img.map_x, img.map_y + img.height as i32 - 1),
        }
    }

    /// Moves the object so that the given corner sits at `(x, y)`.
    pub fn set_position(&mut self, x: i32, y: i32, reference: Reference) {
        self.image.map_x = x;
        self.image.map_y = match reference {
            Reference::TopLeft => y,
            Reference::BottomLeft => y - (self.image.height as i32 - 1),
        };
    }
}

/// The narrow view of the object subsystem the compositor needs.
pub trait ObjectRegistry {
    /// Every live object, in a stable order.
    fn object_ids(&self) -> Vec<ObjectId>;

    /// Renderable state of an object.
    fn image(&self, id: ObjectId) -> Option<&ObjectImage>;

    /// Render tag of an object.
    fn tag(&self, id: ObjectId) -> Option<Tag>;

    /// Whether the object is already queued this frame.
    fn is_dirty(&self, id: ObjectId) -> bool;

    /// Flags or clears the object as queued.
    fn set_dirty(&mut self, id: ObjectId, dirty: bool);
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    object: Option<Object>,
}

/// Owns every object, addressed by [`ObjectId`] or by name.
#[derive(Debug, Default)]
pub struct ObjectTable {
    slots: Vec<Slot>,
    free: Vec<u32>,
    names: HashMap<String, ObjectId>,
}

impl ObjectTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an untagged, imageless object. Returns `None` if the name is
    /// taken.
    pub fn add(&mut self, name: &str) -> Option<ObjectId> {
        if self.names.contains_key(name) {
            return None;
        }
        let id = match self.free.pop() {
            Some(index) => ObjectId {
                index,
                generation: self.slots[index as usize].generation,
            },
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    object: None,
                });
                ObjectId {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        };
        self.slots[id.index as usize].object = Some(Object {
            name: name.to_owned(),
            tag: NULL_TAG,
            dirty: false,
            image: ObjectImage::new(id),
        });
        self.names.insert(name.to_owned(), id);
        Some(id)
    }

    /// Looks an object up by name.
    pub fn find(&self, name: &str) -> Option<ObjectId> {
        self.names.get(name).copied()
    }

    /// Borrow an object.
    pub fn get(&self, id: ObjectId) -> Option<&Object> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.object.as_ref()
    }

    /// Mutably borrow an object.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.object.as_mut()
    }

    /// Removes an object, invalidating its handle.
    pub fn remove(&mut self, id: ObjectId) -> Option<Object> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let object = slot.object.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.names.remove(&object.name);
        Some(object)
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the table holds no object.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Live objects in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &Object)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.object.as_ref().map(|o| {
                (
                    ObjectId {
                        index: i as u32,
                        generation: slot.generation,
                    },
                    o,
                )
            })
        })
    }
}

impl ObjectRegistry for ObjectTable {
    fn object_ids(&self) -> Vec<ObjectId> {
        self.iter().map(|(id, _)| id).collect()
    }

    fn image(&self, id: ObjectId) -> Option<&ObjectImage> {
        self.get(id).map(Object::image)
    }

    fn tag(&self, id: ObjectId) -> Option<Tag> {
        self.get(id).map(Object::tag)
    }

    fn is_dirty(&self, id: ObjectId) -> bool {
        self.get(id).is_some_and(Object::is_dirty)
    }

    fn set_dirty(&mut self, id: ObjectId, dirty: bool) {
        if let Some(o) = self.get_mut(id) {
            o.dirty = dirty;
        }
    }
}
