use std::path::PathBuf;

use crate::map::{LayerIndex, Tag};
use crate::object::ObjectId;

/// Errors raised while building or editing a [`TileMap`](crate::TileMap).
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// Map width or height is zero.
    #[error("map dimensions must be non-zero (got {width}x{height})")]
    ZeroSize {
        /// Width in tiles.
        width: u16,
        /// Height in tiles.
        height: u16,
    },
    /// A zone id above the map's highest zone index.
    #[error("zone {zone} is above the highest zone index {max_zone}")]
    ZoneOutOfRange {
        /// Offending zone id.
        zone: u16,
        /// Highest valid zone id.
        max_zone: u16,
    },
    /// A plane handed to the map does not hold `width * height` cells.
    #[error("layer {layer} plane has {len} cells, expected {expected}")]
    PlaneSize {
        /// Layer the plane belongs to.
        layer: LayerIndex,
        /// Cell count received.
        len: usize,
        /// Cell count required.
        expected: usize,
    },
}

/// Programmer errors and invariant violations reported by the viewport and
/// the field context.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    /// The bound map has no tagged layer, so no object can ever be drawn.
    #[error("map has no tagged layer; a viewport needs at least one tag")]
    NoTags,
    /// The view configuration has a zero screen or tile dimension.
    #[error("invalid view config: {0}")]
    InvalidConfig(String),
    /// A dirty rectangle with a non-positive side.
    #[error("dirty rectangle must have positive size (got {width}x{height})")]
    EmptyRect {
        /// Requested width.
        width: i32,
        /// Requested height.
        height: i32,
    },
    /// A dirty rectangle whose far edge does not fit in an `i32`.
    #[error("dirty rectangle at ({x}, {y}) sized {width}x{height} overflows pixel space")]
    RectOverflow {
        /// Left edge.
        x: i32,
        /// Top edge.
        y: i32,
        /// Requested width.
        width: i32,
        /// Requested height.
        height: i32,
    },
    /// A camera move whose window would not fit in an `i32`.
    #[error("camera offset ({x_offset}, {y_offset}) plus ({dx}, {dy}) is out of range")]
    OffsetOverflow {
        /// Current horizontal offset.
        x_offset: i32,
        /// Current vertical offset.
        y_offset: i32,
        /// Requested horizontal move.
        dx: i32,
        /// Requested vertical move.
        dy: i32,
    },
    /// Tag 0 is reserved for objects with no visual presence.
    #[error("object {0:?} has the null tag and cannot be queued")]
    NullTag(ObjectId),
    /// Tag above the map's highest tag.
    #[error("tag {tag} is above the map's highest tag {max_tag}")]
    TagOutOfRange {
        /// Requested tag.
        tag: Tag,
        /// Highest tag in the bound map.
        max_tag: Tag,
    },
    /// The object handle does not resolve in the registry.
    #[error("unknown object {0:?}")]
    UnknownObject(ObjectId),
    /// The object has no image to draw, or a zero-sized one.
    #[error("object {0:?} has no drawable image")]
    NoImage(ObjectId),
    /// The object is already waiting in a render queue this frame.
    #[error("object {0:?} is already queued for rendering")]
    AlreadyQueued(ObjectId),
    /// A move or reposition would leave the map's pixel bounds.
    #[error("object {id:?} would leave the map at ({x}, {y})")]
    OutOfBounds {
        /// Object being moved.
        id: ObjectId,
        /// Attempted left edge.
        x: i32,
        /// Attempted top edge.
        y: i32,
    },
    /// Objects left in a render queue after the layer sweep; no layer carries
    /// their tag.
    #[error("{count} object(s) left in the queue for tag {tag} after render")]
    QueueResidue {
        /// Tag whose queue was not drained.
        tag: Tag,
        /// Number of stranded nodes.
        count: usize,
    },
}

/// Failures reported by a [`GraphicsBackend`](crate::GraphicsBackend).
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Image file could not be read.
    #[error("failed to read image {path}")]
    Io {
        /// Path handed to the backend.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Image bytes could not be decoded.
    #[error("failed to decode image {path}: {reason}")]
    Decode {
        /// Path handed to the backend.
        path: PathBuf,
        /// Decoder message.
        reason: String,
    },
    /// The handle was never issued or has been freed.
    #[error("stale image handle {0}")]
    StaleHandle(u32),
    /// Any other refusal by the backend.
    #[error("backend rejected the call: {0}")]
    Rejected(String),
}
