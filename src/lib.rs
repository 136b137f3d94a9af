#![warn(missing_docs)]

//! Incremental tile map renderer for Macroquad.
//!
//! Only the map regions marked dirty since the last frame are redrawn.
//! Sprites are composited between layers by tag and sorted by their bottom
//! edge, and scrolling shifts the screen and repaints the exposed strips.

mod backend;
mod config;
mod error;
mod field;
mod geom;
mod map;
mod object;
pub mod render;
mod view;

pub use backend::{
    BackendCall, CacheEntry, GraphicsBackend, ImageCache, ImageHandle, QuadBackend,
    RecordingBackend,
};
pub use config::ViewConfig;
pub use error::{BackendError, MapError, ViewError};
pub use field::Field;
pub use geom::{PixelRect, TileSpan};
pub use map::{Layer, LayerIndex, Tag, TileMap, TileValue, ZoneId, ZoneProps, NULL_TAG};
pub use object::{Object, ObjectId, ObjectImage, ObjectRegistry, ObjectTable, Reference};
pub use view::{RenderStats, Viewport};
