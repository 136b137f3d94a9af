//! Render bookkeeping: dirty rectangles, per-tag object queues and camera
//! culling.

pub mod cull;
pub mod dirty;
pub mod queue;

pub use cull::{clip, CameraWindow, Repaint};
pub use dirty::DirtyList;
pub use queue::{RenderNode, RenderQueues};
