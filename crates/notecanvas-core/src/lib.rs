//! NoteCanvas Core Library
//!
//! Canvas transform, touch gesture arbitration and snapshot undo/redo for
//! the NoteCanvas infinite-canvas note editor.

pub mod arbitrator;
pub mod blocks;
pub mod config;
pub mod document;
pub mod gesture;
pub mod handles;
pub mod history;
pub mod path;
pub mod store;
pub mod transform;
pub mod workspace;

pub use arbitrator::{select, ControllerKind, Eligibility, GestureArbitrator, Mode};
pub use blocks::{
    AudioBlock, Block, BlockColor, BlockId, BlockKind, BlockRef, CanvasId, EmbeddedCanvasBlock,
    Frame, GeometricBlock, ImageBlock, InkStyle, LinkBlock, StrokeBlock, TextBlock, VideoBlock,
    WebLinkBlock, ROOT_CANVAS,
};
pub use config::EngineConfig;
pub use document::{DocumentError, DocumentResult};
pub use gesture::{
    exclusive_until_fail, sequence, ControllerState, GestureContext, GestureController,
    GestureEvent, HandleTarget, Outcome, Phase,
};
pub use handles::{Corner, Edge, Handle};
pub use history::UndoRedoStack;
pub use store::{CanvasBlocks, Collection, GlobalBlockStore, GlobalState, Mutation, Update};
pub use transform::{ScaleBand, ScaleBandError, Transform, TransformState};
pub use workspace::Workspace;
