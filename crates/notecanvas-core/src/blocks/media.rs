//! Framed blocks: text, media players, link previews and embedded canvases.

use super::{Block, BlockId, BlockKind, CanvasId, Frame, GeometricBlock};
use crate::store::CanvasBlocks;
use crate::transform::Transform;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Inner padding shared by all framed blocks.
const PADDING: f64 = 8.0;
/// Size of the leading icon on player and preview cards.
const ICON_SIZE: f64 = 32.0;
/// Narrowest label that still shows a few characters.
const LABEL_MIN_WIDTH: f64 = 72.0;
/// Height of the transport controls on audio/video players.
const CONTROLS_HEIGHT: f64 = 36.0;
/// Height of the title bar on embedded canvases.
const TITLE_BAR_HEIGHT: f64 = 28.0;

macro_rules! impl_block {
    ($ty:ty, $kind:expr, $field:ident) => {
        impl Block for $ty {
            const KIND: BlockKind = $kind;

            fn id(&self) -> BlockId {
                self.id
            }

            fn collection(blocks: &CanvasBlocks) -> &Vec<Self> {
                &blocks.$field
            }

            fn collection_mut(blocks: &mut CanvasBlocks) -> &mut Vec<Self> {
                &mut blocks.$field
            }
        }
    };
}

/// A text note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub(crate) id: BlockId,
    #[serde(flatten)]
    pub frame: Frame,
    pub text: String,
    pub font_size: f64,
}

impl TextBlock {
    pub fn new(frame: Frame, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            frame,
            text: text.into(),
            font_size: 16.0,
        }
    }
}

impl GeometricBlock for TextBlock {
    fn frame(&self) -> Frame {
        self.frame
    }

    fn set_frame(&mut self, frame: Frame) {
        self.frame = frame;
    }

    /// Two glyphs wide and one line tall.
    fn min_size(&self) -> Size {
        Size::new(
            self.font_size * 2.0 + PADDING * 2.0,
            self.font_size * 1.4 + PADDING * 2.0,
        )
    }
}

/// An image referenced by URI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageBlock {
    pub(crate) id: BlockId,
    #[serde(flatten)]
    pub frame: Frame,
    pub uri: String,
}

impl ImageBlock {
    pub fn new(frame: Frame, uri: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            frame,
            uri: uri.into(),
        }
    }
}

impl GeometricBlock for ImageBlock {
    fn frame(&self) -> Frame {
        self.frame
    }

    fn set_frame(&mut self, frame: Frame) {
        self.frame = frame;
    }

    fn min_size(&self) -> Size {
        Size::new(ICON_SIZE + PADDING * 2.0, ICON_SIZE + PADDING * 2.0)
    }
}

/// An audio clip with a compact player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioBlock {
    pub(crate) id: BlockId,
    #[serde(flatten)]
    pub frame: Frame,
    pub uri: String,
    #[serde(default)]
    pub duration_secs: f64,
}

impl AudioBlock {
    pub fn new(frame: Frame, uri: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            frame,
            uri: uri.into(),
            duration_secs: 0.0,
        }
    }
}

impl GeometricBlock for AudioBlock {
    fn frame(&self) -> Frame {
        self.frame
    }

    fn set_frame(&mut self, frame: Frame) {
        self.frame = frame;
    }

    /// Play icon plus the duration label.
    fn min_size(&self) -> Size {
        Size::new(
            ICON_SIZE + LABEL_MIN_WIDTH + PADDING * 3.0,
            ICON_SIZE + PADDING * 2.0,
        )
    }
}

/// A video clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoBlock {
    pub(crate) id: BlockId,
    #[serde(flatten)]
    pub frame: Frame,
    pub uri: String,
}

impl VideoBlock {
    pub fn new(frame: Frame, uri: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            frame,
            uri: uri.into(),
        }
    }
}

impl GeometricBlock for VideoBlock {
    fn frame(&self) -> Frame {
        self.frame
    }

    fn set_frame(&mut self, frame: Frame) {
        self.frame = frame;
    }

    fn min_size(&self) -> Size {
        Size::new(
            ICON_SIZE + LABEL_MIN_WIDTH + PADDING * 3.0,
            ICON_SIZE + CONTROLS_HEIGHT + PADDING * 2.0,
        )
    }
}

/// A web page preview card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebLinkBlock {
    pub(crate) id: BlockId,
    #[serde(flatten)]
    pub frame: Frame,
    pub url: String,
    #[serde(default)]
    pub title: String,
}

impl WebLinkBlock {
    pub fn new(frame: Frame, url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            frame,
            url: url.into(),
            title: String::new(),
        }
    }
}

impl GeometricBlock for WebLinkBlock {
    fn frame(&self) -> Frame {
        self.frame
    }

    fn set_frame(&mut self, frame: Frame) {
        self.frame = frame;
    }

    fn min_size(&self) -> Size {
        Size::new(
            ICON_SIZE + LABEL_MIN_WIDTH * 2.0 + PADDING * 3.0,
            ICON_SIZE + PADDING * 2.0,
        )
    }

    /// Preview cards keep the layout the preview was fetched for.
    fn resizeable(&self) -> bool {
        false
    }
}

/// A nested canvas shown inside its parent.
///
/// Its content lives in the store under `canvas_id`; `view` is the
/// sub-canvas's own pan/zoom, restored when it is mounted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedCanvasBlock {
    pub(crate) id: BlockId,
    #[serde(flatten)]
    pub frame: Frame,
    pub canvas_id: CanvasId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub view: Transform,
}

impl EmbeddedCanvasBlock {
    pub fn new(frame: Frame) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            frame,
            canvas_id: id.to_string(),
            title: String::new(),
            view: Transform::default(),
        }
    }
}

impl GeometricBlock for EmbeddedCanvasBlock {
    fn frame(&self) -> Frame {
        self.frame
    }

    fn set_frame(&mut self, frame: Frame) {
        self.frame = frame;
    }

    fn min_size(&self) -> Size {
        Size::new(
            LABEL_MIN_WIDTH + PADDING * 2.0,
            TITLE_BAR_HEIGHT + ICON_SIZE + PADDING * 2.0,
        )
    }
}

impl_block!(TextBlock, BlockKind::Text, texts);
impl_block!(ImageBlock, BlockKind::Image, images);
impl_block!(AudioBlock, BlockKind::Audio, audios);
impl_block!(VideoBlock, BlockKind::Video, videos);
impl_block!(WebLinkBlock, BlockKind::WebLink, web_links);
impl_block!(EmbeddedCanvasBlock, BlockKind::Canvas, canvases);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_sizes_differ_per_kind() {
        let frame = Frame::new(0.0, 0.0, 300.0, 300.0);
        let image = ImageBlock::new(frame, "a.png").min_size();
        let audio = AudioBlock::new(frame, "a.m4a").min_size();
        assert!(audio.width > image.width);
        assert!((image.width - 48.0).abs() < f64::EPSILON);
        assert!((audio.width - 128.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_text_min_size_follows_font() {
        let mut text = TextBlock::new(Frame::new(0.0, 0.0, 200.0, 40.0), "hi");
        let small = text.min_size();
        text.font_size = 32.0;
        assert!(text.min_size().width > small.width);
    }

    #[test]
    fn test_web_link_is_not_resizeable() {
        let link = WebLinkBlock::new(Frame::new(0.0, 0.0, 240.0, 64.0), "https://example.com");
        assert!(link.moveable());
        assert!(!link.resizeable());
    }

    #[test]
    fn test_embedded_canvas_owns_child_id() {
        let block = EmbeddedCanvasBlock::new(Frame::new(0.0, 0.0, 200.0, 200.0));
        assert_eq!(block.canvas_id, block.id().to_string());
    }

    #[test]
    fn test_frame_is_flattened_in_json() {
        let image = ImageBlock::new(Frame::new(1.0, 2.0, 3.0, 4.0), "a.png");
        let json = serde_json::to_value(&image).unwrap();
        assert_eq!(json["x"], 1.0);
        assert_eq!(json["height"], 4.0);
        assert_eq!(json["uri"], "a.png");
    }
}
