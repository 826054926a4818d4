//! Block definitions for canvas content.

mod link;
mod media;
mod stroke;

pub use link::LinkBlock;
pub use media::{AudioBlock, EmbeddedCanvasBlock, ImageBlock, TextBlock, VideoBlock, WebLinkBlock};
pub use stroke::{InkStyle, StrokeBlock};

use crate::store::CanvasBlocks;
use kurbo::{Point, Rect, Size};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for blocks.
pub type BlockId = Uuid;

/// Identifier of a canvas (the root canvas or an embedded sub-canvas).
pub type CanvasId = String;

/// Id of the top-level canvas every document has.
pub const ROOT_CANVAS: &str = "root";

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl BlockColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }
}

impl Default for BlockColor {
    fn default() -> Self {
        Self::black()
    }
}

impl From<Color> for BlockColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl From<BlockColor> for Color {
    fn from(color: BlockColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Every kind of block a canvas can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Path,
    Text,
    Image,
    Audio,
    Video,
    Link,
    WebLink,
    Canvas,
}

impl BlockKind {
    /// Kinds that carry a frame and can be dragged or resized, in paint order
    /// (back to front).
    pub const GEOMETRIC: [BlockKind; 6] = [
        BlockKind::Canvas,
        BlockKind::Image,
        BlockKind::Video,
        BlockKind::Audio,
        BlockKind::WebLink,
        BlockKind::Text,
    ];

    pub fn is_geometric(self) -> bool {
        Self::GEOMETRIC.contains(&self)
    }
}

/// Reference to one block on a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockRef {
    pub kind: BlockKind,
    pub id: BlockId,
}

impl BlockRef {
    pub fn new(kind: BlockKind, id: BlockId) -> Self {
        Self { kind, id }
    }
}

/// Position and size of a geometric block in content space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Frame {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn center(&self) -> Point {
        self.rect().center()
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// A collection entry in the block store.
///
/// Ties a block type to its [`BlockKind`] and to the per-canvas collection it
/// lives in, so the store can expose one accessor per kind.
pub trait Block: Clone + std::fmt::Debug + 'static {
    const KIND: BlockKind;

    fn id(&self) -> BlockId;

    fn collection(blocks: &CanvasBlocks) -> &Vec<Self>;

    fn collection_mut(blocks: &mut CanvasBlocks) -> &mut Vec<Self>;
}

/// Blocks with a frame that a drag/resize gesture can act on.
pub trait GeometricBlock {
    fn frame(&self) -> Frame;

    fn set_frame(&mut self, frame: Frame);

    /// Smallest frame the block's content can still render in.
    fn min_size(&self) -> Size;

    fn moveable(&self) -> bool {
        true
    }

    fn resizeable(&self) -> bool {
        true
    }
}

/// Milliseconds since the Unix epoch.
pub(crate) fn now_millis() -> u64 {
    #[cfg(target_arch = "wasm32")]
    use web_time::{SystemTime, UNIX_EPOCH};
    #[cfg(not(target_arch = "wasm32"))]
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
