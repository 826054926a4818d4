//! Editor workspace: the block store, its undo history, and one view per
//! mounted canvas.

use crate::arbitrator::{GestureArbitrator, Mode};
use crate::blocks::{Block, BlockId, BlockKind, BlockRef, CanvasId, EmbeddedCanvasBlock, Frame, StrokeBlock, ROOT_CANVAS};
use crate::config::EngineConfig;
use crate::document::{self, DocumentResult};
use crate::gesture::{ControllerState, GestureContext, GestureEvent};
use crate::history::UndoRedoStack;
use crate::store::{CanvasBlocks, GlobalBlockStore, GlobalState, Mutation};
use crate::transform::{Transform, TransformState};
use kurbo::{Rect, Size};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

/// Transform and gesture routing for one mounted canvas.
#[derive(Debug, Clone)]
pub struct CanvasView {
    transform: TransformState,
    arbitrator: GestureArbitrator,
}

impl CanvasView {
    pub fn transform(&self) -> Transform {
        self.transform.get()
    }

    pub fn arbitrator(&self) -> &GestureArbitrator {
        &self.arbitrator
    }
}

/// Bounding box of everything on a canvas.
pub fn content_bounds(blocks: &CanvasBlocks) -> Option<Rect> {
    let frames = blocks.geometric_blocks().into_iter().map(|(_, _, b)| b.frame().rect());
    let strokes = blocks.paths.iter().filter(|s| !s.is_empty()).map(StrokeBlock::bounds);
    frames.chain(strokes).reduce(|a, b| a.union(b))
}

/// Owns the document and routes touches to the canvas they land on.
///
/// Every store write (stroke commit, frame commit, insert, delete) pushes
/// one snapshot onto the shared undo history through a store observer.
/// Undo and redo restore the store directly, so they never record
/// snapshots of their own.
pub struct Workspace {
    config: EngineConfig,
    store: GlobalBlockStore,
    history: Rc<RefCell<UndoRedoStack<GlobalState>>>,
    views: BTreeMap<CanvasId, CanvasView>,
    mode: Mode,
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("mode", &self.mode)
            .field("views", &self.views.keys().collect::<Vec<_>>())
            .field("blocks", &self.store.state().block_count())
            .finish()
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Workspace {
    /// Create an empty workspace with the root canvas mounted.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_state(config, GlobalState::default())
    }

    /// Create a workspace over existing content. History starts empty.
    pub fn with_state(config: EngineConfig, state: GlobalState) -> Self {
        let history = match config.max_undo_depth {
            Some(depth) => UndoRedoStack::with_max_depth(state.clone(), depth),
            None => UndoRedoStack::new(state.clone()),
        };
        let history = Rc::new(RefCell::new(history));

        let mut store = GlobalBlockStore::new();
        store.restore(state);
        let sink = Rc::clone(&history);
        store.subscribe(move |mutation: &Mutation<'_>| {
            sink.borrow_mut().push(mutation.state.clone());
        });

        let mut workspace = Self {
            config,
            store,
            history,
            views: BTreeMap::new(),
            mode: Mode::default(),
        };
        workspace.mount(ROOT_CANVAS, true);
        workspace
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &GlobalBlockStore {
        &self.store
    }

    pub fn state(&self) -> &GlobalState {
        self.store.state()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Start routing touches for a canvas.
    ///
    /// `canvas_level` canvases get two-finger pinch and pan in Hand mode.
    /// An embedded canvas opens at the view stored on its block.
    pub fn mount(&mut self, canvas_id: &str, canvas_level: bool) {
        if self.views.contains_key(canvas_id) {
            return;
        }
        let initial = self.embedded_view(canvas_id).unwrap_or_default();
        self.views.insert(
            canvas_id.to_string(),
            CanvasView {
                transform: TransformState::with_transform(initial, self.config.scale_band),
                arbitrator: GestureArbitrator::new(self.mode, canvas_level, &self.config),
            },
        );
        log::debug!("Mounted canvas {}", canvas_id);
    }

    pub fn unmount(&mut self, canvas_id: &str) -> bool {
        self.views.remove(canvas_id).is_some()
    }

    pub fn view(&self, canvas_id: &str) -> Option<&CanvasView> {
        self.views.get(canvas_id)
    }

    fn embedded_view(&self, canvas_id: &str) -> Option<Transform> {
        self.store
            .state()
            .canvases
            .values()
            .flat_map(|blocks| blocks.canvases.iter())
            .find(|block: &&EmbeddedCanvasBlock| block.canvas_id == canvas_id)
            .map(|block| block.view)
    }

    /// Switch the editing mode on every mounted canvas, dropping any
    /// gesture in flight.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        for view in self.views.values_mut() {
            view.arbitrator.set_mode(mode);
        }
    }

    /// Feed a touch event to a mounted canvas. Returns `false` if the
    /// canvas is not mounted.
    pub fn handle_touch(&mut self, canvas_id: &str, event: &GestureEvent) -> bool {
        let Some(view) = self.views.get_mut(canvas_id) else {
            log::warn!("Touch for unmounted canvas {}", canvas_id);
            return false;
        };
        let mut cx = GestureContext {
            canvas_id,
            transform: &mut view.transform,
            store: &mut self.store,
        };
        view.arbitrator.handle(event, &mut cx);
        true
    }

    /// Whether any mounted canvas has a gesture in flight.
    pub fn is_gesture_active(&self) -> bool {
        self.views
            .values()
            .any(|view| view.arbitrator.state() != ControllerState::Idle)
    }

    pub fn undo(&mut self) -> bool {
        let previous = self.history.borrow_mut().undo().cloned();
        match previous {
            Some(state) => {
                self.store.restore(state);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        let next = self.history.borrow_mut().redo().cloned();
        match next {
            Some(state) => {
                self.store.restore(state);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.borrow().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.borrow().can_redo()
    }

    pub fn undo_len(&self) -> usize {
        self.history.borrow().undo_len()
    }

    /// Add a block to a canvas (one undo step).
    pub fn insert_block<B: Block>(&mut self, canvas_id: &str, block: B) -> BlockId {
        let id = block.id();
        self.store.insert(canvas_id, block);
        id
    }

    /// Remove a block and the links attached to it (one undo step).
    ///
    /// Views of embedded canvases that no longer exist are unmounted.
    pub fn delete_block(&mut self, canvas_id: &str, kind: BlockKind, id: BlockId) -> bool {
        let deleted = self.store.delete(canvas_id, kind, id);
        if deleted && kind == BlockKind::Canvas {
            let orphaned: Vec<CanvasId> = self
                .views
                .keys()
                .filter(|&c| c != ROOT_CANVAS && self.embedded_view(c).is_none())
                .cloned()
                .collect();
            for canvas in orphaned {
                self.views.remove(&canvas);
            }
        }
        deleted
    }

    /// Subscribe to every store write.
    pub fn subscribe(&mut self, observer: impl FnMut(&Mutation<'_>) + 'static) {
        self.store.subscribe(observer);
    }

    pub fn transform(&self, canvas_id: &str) -> Option<Transform> {
        self.views.get(canvas_id).map(CanvasView::transform)
    }

    /// Back to identity. Not undoable.
    pub fn reset_view(&mut self, canvas_id: &str) -> bool {
        let Some(view) = self.views.get_mut(canvas_id) else {
            return false;
        };
        view.transform.reset();
        true
    }

    /// Zoom so the canvas content fills `viewport`. Not undoable.
    pub fn fit_view(&mut self, canvas_id: &str, viewport: Size, padding: f64) -> bool {
        let bounds = self.store.canvas(canvas_id).and_then(content_bounds);
        let Some(view) = self.views.get_mut(canvas_id) else {
            return false;
        };
        match bounds {
            Some(bounds) => view.transform.fit_to_bounds(bounds, viewport, padding),
            None => view.transform.reset(),
        }
        true
    }

    /// Stroke being drawn on a canvas, for live preview.
    pub fn draft_stroke(&self, canvas_id: &str) -> Option<&StrokeBlock> {
        self.views.get(canvas_id)?.arbitrator.draft_stroke()
    }

    /// Block being dragged on a canvas and its in-progress frame.
    pub fn live_frame(&self, canvas_id: &str) -> Option<(BlockRef, Frame)> {
        self.views.get(canvas_id)?.arbitrator.live_frame()
    }

    /// Replace all content and clear history.
    pub fn replace_state(&mut self, state: GlobalState) {
        self.set_mode(self.mode);
        self.history.borrow_mut().reset(state.clone());
        self.store.restore(state);
    }

    pub fn load(&mut self, path: impl AsRef<Path>) -> DocumentResult<()> {
        let state = document::load(path)?;
        self.replace_state(state);
        Ok(())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> DocumentResult<()> {
        document::save(self.store.state(), path)
    }

    pub fn to_json(&self) -> DocumentResult<String> {
        document::to_json(self.store.state())
    }
}
