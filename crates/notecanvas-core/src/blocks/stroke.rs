//! Freehand ink strokes.

use super::{now_millis, Block, BlockColor, BlockId, BlockKind};
use crate::path::{build_path, path_points};
use crate::store::CanvasBlocks;
use kurbo::{BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Pen settings applied to new strokes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InkStyle {
    pub color: BlockColor,
    pub stroke_width: f64,
    /// Width used while erasing.
    pub eraser_width: f64,
}

impl Default for InkStyle {
    fn default() -> Self {
        Self {
            color: BlockColor::black(),
            stroke_width: 3.0,
            eraser_width: 20.0,
        }
    }
}

fn default_stroke_width() -> f64 {
    InkStyle::default().stroke_width
}

/// A freehand stroke.
///
/// Eraser strokes are regular strokes with `is_eraser` set; the renderer
/// composites them so they clear instead of paint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeBlock {
    pub(crate) id: BlockId,
    /// Points in content space, in drawing order.
    #[serde(default)]
    pub points: Vec<Point>,
    #[serde(default)]
    pub color: BlockColor,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
    #[serde(default)]
    pub is_eraser: bool,
    /// Renderable path, stored on disk as an SVG path string.
    #[serde(with = "crate::path::svg_string", default)]
    pub path: BezPath,
    /// Creation time in milliseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: u64,
}

impl StrokeBlock {
    /// Start a stroke at the first touched point.
    pub fn begin(point: Point, style: &InkStyle, is_eraser: bool) -> Self {
        let stroke_width = if is_eraser {
            style.eraser_width
        } else {
            style.stroke_width
        };
        Self {
            id: Uuid::new_v4(),
            points: vec![point],
            color: style.color,
            stroke_width,
            is_eraser,
            path: BezPath::new(),
            timestamp: now_millis(),
        }
    }

    /// Create a finished stroke from existing points.
    pub fn from_points(points: Vec<Point>, style: &InkStyle) -> Self {
        let mut stroke = Self {
            id: Uuid::new_v4(),
            points,
            color: style.color,
            stroke_width: style.stroke_width,
            is_eraser: false,
            path: BezPath::new(),
            timestamp: now_millis(),
        };
        stroke.rebuild_path();
        stroke
    }

    /// Append a point and rebuild the path from the full point list.
    pub fn push_point(&mut self, point: Point) {
        self.points.push(point);
        self.rebuild_path();
    }

    /// Recompute the path from the point list.
    pub fn rebuild_path(&mut self) {
        self.path = build_path(&self.points).unwrap_or_default();
    }

    /// Restore whichever of points/path is missing after load.
    ///
    /// The point list wins when both are present.
    pub fn rehydrate(&mut self) {
        if self.points.is_empty() {
            self.points = path_points(&self.path);
        }
        self.rebuild_path();
    }

    /// Whether the stroke has enough points to be committed.
    pub fn is_committable(&self) -> bool {
        self.points.len() >= 2
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Bounding box of the points, without stroke width.
    pub fn bounds(&self) -> Rect {
        let mut iter = self.points.iter();
        let Some(first) = iter.next() else {
            return Rect::ZERO;
        };
        iter.fold(Rect::from_points(*first, *first), |rect, p| {
            rect.union_pt(*p)
        })
    }
}

impl Block for StrokeBlock {
    const KIND: BlockKind = BlockKind::Path;

    fn id(&self) -> BlockId {
        self.id
    }

    fn collection(blocks: &CanvasBlocks) -> &Vec<Self> {
        &blocks.paths
    }

    fn collection_mut(blocks: &mut CanvasBlocks) -> &mut Vec<Self> {
        &mut blocks.paths
    }
}
