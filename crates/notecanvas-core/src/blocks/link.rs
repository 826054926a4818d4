//! Connectors between two framed blocks.

use super::{Block, BlockColor, BlockId, BlockKind, Frame};
use crate::store::CanvasBlocks;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A connector drawn between two blocks on the same canvas.
///
/// The points are derived from the endpoint frames and recomputed whenever
/// either endpoint moves; links are never dragged directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkBlock {
    pub(crate) id: BlockId,
    pub from_id: BlockId,
    pub to_id: BlockId,
    pub points: Vec<Point>,
    pub color: BlockColor,
}

impl LinkBlock {
    /// Create a link routed between the two frames.
    pub fn between(from_id: BlockId, from: Frame, to_id: BlockId, to: Frame) -> Self {
        Self {
            id: Uuid::new_v4(),
            from_id,
            to_id,
            points: route(from, to),
            color: BlockColor::black(),
        }
    }

    pub fn touches(&self, id: BlockId) -> bool {
        self.from_id == id || self.to_id == id
    }

    /// Recompute the points for new endpoint frames.
    pub fn reroute(&mut self, from: Frame, to: Frame) {
        self.points = route(from, to);
    }
}

/// Connect the facing edge midpoints of two frames.
///
/// The dominant axis between the centers picks which pair of edges face
/// each other.
pub fn route(from: Frame, to: Frame) -> Vec<Point> {
    let a = from.center();
    let b = to.center();
    let dx = b.x - a.x;
    let dy = b.y - a.y;

    if dx.abs() >= dy.abs() {
        let (start_x, end_x) = if dx >= 0.0 {
            (from.x + from.width, to.x)
        } else {
            (from.x, to.x + to.width)
        };
        vec![Point::new(start_x, a.y), Point::new(end_x, b.y)]
    } else {
        let (start_y, end_y) = if dy >= 0.0 {
            (from.y + from.height, to.y)
        } else {
            (from.y, to.y + to.height)
        };
        vec![Point::new(a.x, start_y), Point::new(b.x, end_y)]
    }
}

impl Block for LinkBlock {
    const KIND: BlockKind = BlockKind::Link;

    fn id(&self) -> BlockId {
        self.id
    }

    fn collection(blocks: &CanvasBlocks) -> &Vec<Self> {
        &blocks.links
    }

    fn collection_mut(blocks: &mut CanvasBlocks) -> &mut Vec<Self> {
        &mut blocks.links
    }
}
