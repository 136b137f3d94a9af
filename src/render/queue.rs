//! Per-tag object queues sorted by baseline.

use crate::error::ViewError;
use crate::map::{Tag, NULL_TAG};
use crate::object::ObjectId;

/// One queued draw: a handle to the object plus the baseline it was sorted
/// by. Lives for a single render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderNode {
    /// Object to draw.
    pub object: ObjectId,
    /// `map_y + height` at enqueue time.
    pub baseline: i32,
}

/// Per-tag object queues, each kept sorted by baseline.
///
/// Queue `t - 1` holds tag `t`; tag 0 has no queue.
#[derive(Debug, Clone)]
pub struct RenderQueues {
    queues: Vec<Vec<RenderNode>>,
}

impl RenderQueues {
    /// Allocates one empty queue per tag `1..=max_tag`.
    pub fn new(max_tag: Tag) -> Self {
        RenderQueues {
            queues: vec![Vec::new(); max_tag as usize],
        }
    }

    /// Highest tag with a queue.
    #[inline]
    pub fn max_tag(&self) -> Tag {
        self.queues.len() as Tag
    }

    /// Inserts after every node whose baseline is lower or equal, so equal
    /// baselines keep their enqueue order.
    pub fn insert(&mut self, tag: Tag, node: RenderNode) -> Result<(), ViewError> {
        let q = self.queue_mut(tag, node.object)?;
        let at = q.partition_point(|n| n.baseline <= node.baseline);
        q.insert(at, node);
        Ok(())
    }

    /// Removes and returns every node queued under `tag`, back to front.
    /// Tags without a queue yield nothing.
    pub fn take(&mut self, tag: Tag) -> Vec<RenderNode> {
        if tag == NULL_TAG {
            return Vec::new();
        }
        self.queues
            .get_mut(tag as usize - 1)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    /// Nodes queued under `tag`, back to front.
    pub fn get(&self, tag: Tag) -> &[RenderNode] {
        if tag == NULL_TAG {
            return &[];
        }
        self.queues
            .get(tag as usize - 1)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total queued nodes across all tags.
    pub fn len(&self) -> usize {
        self.queues.iter().map(Vec::len).sum()
    }

    /// Whether every queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queues.iter().all(Vec::is_empty)
    }

    /// Empties every queue, returning the non-empty ones with their tag.
    pub fn take_residue(&mut self) -> Vec<(Tag, Vec<RenderNode>)> {
        self.queues
            .iter_mut()
            .enumerate()
            .filter(|(_, q)| !q.is_empty())
            .map(|(i, q)| ((i + 1) as Tag, std::mem::take(q)))
            .collect()
    }

    fn queue_mut(&mut self, tag: Tag, object: ObjectId) -> Result<&mut Vec<RenderNode>, ViewError> {
        if tag == NULL_TAG {
            return Err(ViewError::NullTag(object));
        }
        let max_tag = self.max_tag();
        self.queues
            .get_mut(tag as usize - 1)
            .ok_or(ViewError::TagOutOfRange { tag, max_tag })
    }
}
