//! Global block store: every canvas's blocks, keyed by canvas id.

use crate::blocks::{
    AudioBlock, Block, BlockId, BlockKind, CanvasId, EmbeddedCanvasBlock, Frame,
    GeometricBlock, ImageBlock, LinkBlock, StrokeBlock, TextBlock, VideoBlock, WebLinkBlock,
};
use crate::handles::{hit_test_handles, Handle};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// All blocks owned by one canvas, one collection per kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasBlocks {
    pub paths: Vec<StrokeBlock>,
    pub texts: Vec<TextBlock>,
    pub images: Vec<ImageBlock>,
    pub audios: Vec<AudioBlock>,
    pub videos: Vec<VideoBlock>,
    pub links: Vec<LinkBlock>,
    pub web_links: Vec<WebLinkBlock>,
    pub canvases: Vec<EmbeddedCanvasBlock>,
}

fn find_geometric<B: Block + GeometricBlock>(blocks: &[B], id: BlockId) -> Option<&dyn GeometricBlock> {
    blocks
        .iter()
        .find(|b| b.id() == id)
        .map(|b| b as &dyn GeometricBlock)
}

fn find_geometric_mut<B: Block + GeometricBlock>(
    blocks: &mut [B],
    id: BlockId,
) -> Option<&mut dyn GeometricBlock> {
    blocks
        .iter_mut()
        .find(|b| b.id() == id)
        .map(|b| b as &mut dyn GeometricBlock)
}

/// One kind's collection on a canvas, borrowed from the state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Collection<'a> {
    Paths(&'a [StrokeBlock]),
    Texts(&'a [TextBlock]),
    Images(&'a [ImageBlock]),
    Audios(&'a [AudioBlock]),
    Videos(&'a [VideoBlock]),
    Links(&'a [LinkBlock]),
    WebLinks(&'a [WebLinkBlock]),
    Canvases(&'a [EmbeddedCanvasBlock]),
}

impl<'a> Collection<'a> {
    fn empty(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Path => Collection::Paths(&[]),
            BlockKind::Text => Collection::Texts(&[]),
            BlockKind::Image => Collection::Images(&[]),
            BlockKind::Audio => Collection::Audios(&[]),
            BlockKind::Video => Collection::Videos(&[]),
            BlockKind::Link => Collection::Links(&[]),
            BlockKind::WebLink => Collection::WebLinks(&[]),
            BlockKind::Canvas => Collection::Canvases(&[]),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Collection::Paths(v) => v.len(),
            Collection::Texts(v) => v.len(),
            Collection::Images(v) => v.len(),
            Collection::Audios(v) => v.len(),
            Collection::Videos(v) => v.len(),
            Collection::Links(v) => v.len(),
            Collection::WebLinks(v) => v.len(),
            Collection::Canvases(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn remove_by_id<B: Block>(blocks: &mut Vec<B>, id: BlockId) -> bool {
    let before = blocks.len();
    blocks.retain(|b| b.id() != id);
    blocks.len() != before
}

impl CanvasBlocks {
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
            && self.texts.is_empty()
            && self.images.is_empty()
            && self.audios.is_empty()
            && self.videos.is_empty()
            && self.links.is_empty()
            && self.web_links.is_empty()
            && self.canvases.is_empty()
    }

    /// The collection holding blocks of `kind`.
    pub fn collection(&self, kind: BlockKind) -> Collection<'_> {
        match kind {
            BlockKind::Path => Collection::Paths(&self.paths),
            BlockKind::Text => Collection::Texts(&self.texts),
            BlockKind::Image => Collection::Images(&self.images),
            BlockKind::Audio => Collection::Audios(&self.audios),
            BlockKind::Video => Collection::Videos(&self.videos),
            BlockKind::Link => Collection::Links(&self.links),
            BlockKind::WebLink => Collection::WebLinks(&self.web_links),
            BlockKind::Canvas => Collection::Canvases(&self.canvases),
        }
    }

    /// Look up a framed block by kind and id.
    pub fn geometric(&self, kind: BlockKind, id: BlockId) -> Option<&dyn GeometricBlock> {
        match kind {
            BlockKind::Text => find_geometric(&self.texts, id),
            BlockKind::Image => find_geometric(&self.images, id),
            BlockKind::Audio => find_geometric(&self.audios, id),
            BlockKind::Video => find_geometric(&self.videos, id),
            BlockKind::WebLink => find_geometric(&self.web_links, id),
            BlockKind::Canvas => find_geometric(&self.canvases, id),
            BlockKind::Path | BlockKind::Link => None,
        }
    }

    pub fn geometric_mut(&mut self, kind: BlockKind, id: BlockId) -> Option<&mut dyn GeometricBlock> {
        match kind {
            BlockKind::Text => find_geometric_mut(&mut self.texts, id),
            BlockKind::Image => find_geometric_mut(&mut self.images, id),
            BlockKind::Audio => find_geometric_mut(&mut self.audios, id),
            BlockKind::Video => find_geometric_mut(&mut self.videos, id),
            BlockKind::WebLink => find_geometric_mut(&mut self.web_links, id),
            BlockKind::Canvas => find_geometric_mut(&mut self.canvases, id),
            BlockKind::Path | BlockKind::Link => None,
        }
    }

    /// Every framed block in paint order (back to front).
    pub fn geometric_blocks(&self) -> Vec<(BlockKind, BlockId, &dyn GeometricBlock)> {
        fn collect<'a, B: Block + GeometricBlock>(
            out: &mut Vec<(BlockKind, BlockId, &'a dyn GeometricBlock)>,
            blocks: &'a [B],
        ) {
            out.extend(blocks.iter().map(|b| (B::KIND, b.id(), b as &dyn GeometricBlock)));
        }

        let mut out = Vec::new();
        for kind in BlockKind::GEOMETRIC {
            match kind {
                BlockKind::Canvas => collect(&mut out, &self.canvases),
                BlockKind::Image => collect(&mut out, &self.images),
                BlockKind::Video => collect(&mut out, &self.videos),
                BlockKind::Audio => collect(&mut out, &self.audios),
                BlockKind::WebLink => collect(&mut out, &self.web_links),
                BlockKind::Text => collect(&mut out, &self.texts),
                BlockKind::Path | BlockKind::Link => {}
            }
        }
        out
    }

    /// Frame of any framed block with this id, whatever its kind.
    pub fn frame_of(&self, id: BlockId) -> Option<Frame> {
        BlockKind::GEOMETRIC
            .iter()
            .find_map(|&kind| self.geometric(kind, id))
            .map(|b| b.frame())
    }

    /// Recompute the points of every link attached to `id`.
    ///
    /// Links whose other endpoint no longer exists keep their old points.
    pub fn reroute_links(&mut self, id: BlockId) {
        let frames: Vec<(usize, Frame, Frame)> = self
            .links
            .iter()
            .enumerate()
            .filter(|(_, link)| link.touches(id))
            .filter_map(|(i, link)| {
                Some((i, self.frame_of(link.from_id)?, self.frame_of(link.to_id)?))
            })
            .collect();

        for (i, from, to) in frames {
            self.links[i].reroute(from, to);
        }
    }

    pub fn contains(&self, kind: BlockKind, id: BlockId) -> bool {
        fn has<B: Block>(blocks: &[B], id: BlockId) -> bool {
            blocks.iter().any(|b| b.id() == id)
        }

        match kind {
            BlockKind::Path => has(&self.paths, id),
            BlockKind::Link => has(&self.links, id),
            _ => self.geometric(kind, id).is_some(),
        }
    }

    /// Remove a block of the given kind. Links attached to it go with it.
    pub fn remove(&mut self, kind: BlockKind, id: BlockId) -> bool {
        let removed = match kind {
            BlockKind::Path => remove_by_id(&mut self.paths, id),
            BlockKind::Text => remove_by_id(&mut self.texts, id),
            BlockKind::Image => remove_by_id(&mut self.images, id),
            BlockKind::Audio => remove_by_id(&mut self.audios, id),
            BlockKind::Video => remove_by_id(&mut self.videos, id),
            BlockKind::Link => remove_by_id(&mut self.links, id),
            BlockKind::WebLink => remove_by_id(&mut self.web_links, id),
            BlockKind::Canvas => remove_by_id(&mut self.canvases, id),
        };
        if removed && kind.is_geometric() {
            self.links.retain(|link| !link.touches(id));
        }
        removed
    }

    /// Topmost framed block under `point`, with the handle that was hit.
    ///
    /// `tolerance` is the handle hit radius in content units.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> Option<(BlockKind, BlockId, Handle)> {
        self.geometric_blocks()
            .into_iter()
            .rev()
            .find_map(|(kind, id, block)| {
                hit_test_handles(block.frame(), point, tolerance, block.resizeable())
                    .map(|handle| (kind, id, handle))
            })
    }
}

/// The whole document: canvas id → that canvas's blocks.
///
/// Cloning this is the snapshot recorded by the undo history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlobalState {
    pub canvases: BTreeMap<CanvasId, CanvasBlocks>,
}

impl GlobalState {
    pub fn canvas(&self, canvas_id: &str) -> Option<&CanvasBlocks> {
        self.canvases.get(canvas_id)
    }

    /// Total number of blocks across canvases and kinds.
    pub fn block_count(&self) -> usize {
        self.canvases
            .values()
            .map(|c| {
                c.paths.len()
                    + c.texts.len()
                    + c.images.len()
                    + c.audios.len()
                    + c.videos.len()
                    + c.links.len()
                    + c.web_links.len()
                    + c.canvases.len()
            })
            .sum()
    }

    /// Rebuild derived stroke paths after deserialization.
    pub(crate) fn rehydrate(&mut self) {
        for blocks in self.canvases.values_mut() {
            for stroke in &mut blocks.paths {
                stroke.rehydrate();
            }
        }
    }
}

/// New value for one collection: a literal replacement, or a function of
/// the previous collection.
pub enum Update<T> {
    Replace(T),
    Apply(Box<dyn FnOnce(&T) -> T>),
}

impl<T> Update<T> {
    pub fn apply(f: impl FnOnce(&T) -> T + 'static) -> Self {
        Update::Apply(Box::new(f))
    }

    fn resolve(self, previous: &T) -> T {
        match self {
            Update::Replace(value) => value,
            Update::Apply(f) => f(previous),
        }
    }
}

impl<T> From<T> for Update<T> {
    fn from(value: T) -> Self {
        Update::Replace(value)
    }
}

/// Notification sent to observers after every store write.
#[derive(Debug, Clone, Copy)]
pub struct Mutation<'a> {
    pub canvas_id: &'a str,
    pub kind: BlockKind,
    /// The written collection after the write.
    pub value: Collection<'a>,
    /// Entire state after the write.
    pub state: &'a GlobalState,
}

/// Callback invoked after each store write.
pub type Observer = Box<dyn FnMut(&Mutation<'_>)>;

/// Owns the global state and notifies observers on every write.
#[derive(Default)]
pub struct GlobalBlockStore {
    state: GlobalState,
    observers: Vec<Observer>,
}

impl std::fmt::Debug for GlobalBlockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalBlockStore")
            .field("state", &self.state)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl GlobalBlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GlobalState {
        &self.state
    }

    pub fn canvas(&self, canvas_id: &str) -> Option<&CanvasBlocks> {
        self.state.canvas(canvas_id)
    }

    /// Register a callback run after every write.
    pub fn subscribe(&mut self, observer: impl FnMut(&Mutation<'_>) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Current collection of `B` on a canvas (empty if the canvas has none).
    pub fn value<B: Block>(&self, canvas_id: &str) -> &[B] {
        self.state
            .canvas(canvas_id)
            .map(|blocks| B::collection(blocks).as_slice())
            .unwrap_or(&[])
    }

    pub fn get<B: Block>(&self, canvas_id: &str, id: BlockId) -> Option<&B> {
        self.value::<B>(canvas_id).iter().find(|b| b.id() == id)
    }

    /// Write the collection of `B` on a canvas and notify observers.
    pub fn set_value<B: Block>(&mut self, canvas_id: &str, update: impl Into<Update<Vec<B>>>) {
        let update = update.into();
        self.modify(canvas_id, B::KIND, move |blocks| {
            let collection = B::collection_mut(blocks);
            let next = update.resolve(collection);
            *collection = next;
        });
    }

    /// Append one block to its collection.
    pub fn insert<B: Block>(&mut self, canvas_id: &str, block: B) {
        self.set_value::<B>(
            canvas_id,
            Update::apply(move |prev: &Vec<B>| {
                let mut next = prev.clone();
                next.push(block);
                next
            }),
        );
    }

    /// Commit a new frame for a framed block, rerouting its links in the
    /// same write. Returns `false` (and writes nothing) if the block is gone.
    pub fn commit_frame(&mut self, canvas_id: &str, kind: BlockKind, id: BlockId, frame: Frame) -> bool {
        let exists = self
            .state
            .canvas(canvas_id)
            .is_some_and(|blocks| kind.is_geometric() && blocks.contains(kind, id));
        if !exists {
            log::debug!("Skipping frame commit for missing {:?} {}", kind, id);
            return false;
        }

        self.modify(canvas_id, kind, |blocks| {
            if let Some(block) = blocks.geometric_mut(kind, id) {
                block.set_frame(frame);
            }
            blocks.reroute_links(id);
        });
        true
    }

    /// Delete a block. Deleting an embedded canvas also drops its content.
    pub fn delete(&mut self, canvas_id: &str, kind: BlockKind, id: BlockId) -> bool {
        let child = self
            .get::<EmbeddedCanvasBlock>(canvas_id, id)
            .filter(|_| kind == BlockKind::Canvas)
            .map(|block| block.canvas_id.clone());
        let exists = self
            .state
            .canvas(canvas_id)
            .is_some_and(|blocks| blocks.contains(kind, id));
        if !exists {
            return false;
        }

        if let Some(child) = child {
            self.drop_canvas_tree(&child);
        }
        self.modify(canvas_id, kind, |blocks| {
            blocks.remove(kind, id);
        });
        true
    }

    /// Replace the whole state without notifying observers (undo/redo/load).
    pub fn restore(&mut self, state: GlobalState) {
        self.state = state;
    }

    fn drop_canvas_tree(&mut self, canvas_id: &str) {
        if let Some(blocks) = self.state.canvases.remove(canvas_id) {
            for nested in blocks.canvases {
                self.drop_canvas_tree(&nested.canvas_id);
            }
        }
    }

    fn modify(&mut self, canvas_id: &str, kind: BlockKind, f: impl FnOnce(&mut CanvasBlocks)) {
        let blocks = self.state.canvases.entry(canvas_id.to_string()).or_default();
        f(blocks);

        let state = &self.state;
        let value = state
            .canvas(canvas_id)
            .map_or_else(|| Collection::empty(kind), |blocks| blocks.collection(kind));
        let mutation = Mutation {
            canvas_id,
            kind,
            value,
            state,
        };
        for observer in &mut self.observers {
            observer(&mutation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{InkStyle, ROOT_CANVAS};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn image(x: f64, y: f64) -> ImageBlock {
        ImageBlock::new(Frame::new(x, y, 100.0, 100.0), "a.png")
    }

    #[test]
    fn test_value_of_unknown_canvas_is_empty() {
        let store = GlobalBlockStore::new();
        assert!(store.value::<ImageBlock>("nowhere").is_empty());
    }

    #[test]
    fn test_set_value_replace_and_apply() {
        let mut store = GlobalBlockStore::new();
        let first = image(0.0, 0.0);
        store.set_value::<ImageBlock>(ROOT_CANVAS, vec![first.clone()]);
        assert_eq!(store.value::<ImageBlock>(ROOT_CANVAS), &[first.clone()]);

        let second = image(10.0, 10.0);
        let added = second.clone();
        store.set_value::<ImageBlock>(
            ROOT_CANVAS,
            Update::apply(move |prev: &Vec<ImageBlock>| {
                let mut next = prev.clone();
                next.push(added);
                next
            }),
        );
        assert_eq!(store.value::<ImageBlock>(ROOT_CANVAS), &[first, second]);
    }

    #[test]
    fn test_observers_see_whole_state() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut store = GlobalBlockStore::new();
        let sink = seen.clone();
        store.subscribe(move |m| {
            sink.borrow_mut().push((m.canvas_id.to_string(), m.kind, m.state.block_count()));
        });

        store.insert(ROOT_CANVAS, image(0.0, 0.0));
        store.insert("child", TextBlock::new(Frame::new(0.0, 0.0, 80.0, 40.0), "x"));

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], (ROOT_CANVAS.to_string(), BlockKind::Image, 1));
        assert_eq!(seen[1], ("child".to_string(), BlockKind::Text, 2));
    }

    #[test]
    fn test_observers_see_written_collection() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut store = GlobalBlockStore::new();
        let sink = seen.clone();
        store.subscribe(move |m| {
            if let Collection::Images(images) = m.value {
                sink.borrow_mut().push(images.to_vec());
            }
        });

        let first = image(0.0, 0.0);
        let second = image(200.0, 0.0);
        store.insert(ROOT_CANVAS, first.clone());
        store.insert(ROOT_CANVAS, second.clone());
        store.delete(ROOT_CANVAS, BlockKind::Image, first.id());

        let seen = seen.borrow();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[1], vec![first, second.clone()]);
        assert_eq!(seen[2], vec![second]);
    }

    #[test]
    fn test_restore_does_not_notify() {
        let count = Rc::new(RefCell::new(0));
        let mut store = GlobalBlockStore::new();
        let sink = count.clone();
        store.subscribe(move |_| *sink.borrow_mut() += 1);

        store.restore(GlobalState::default());
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn test_commit_frame_reroutes_links_in_one_write() {
        let count = Rc::new(RefCell::new(0));
        let mut store = GlobalBlockStore::new();
        let a = image(0.0, 0.0);
        let b = image(300.0, 0.0);
        let link = LinkBlock::between(a.id(), a.frame, b.id(), b.frame);
        let (a_id, link_id) = (a.id(), link.id());
        store.insert(ROOT_CANVAS, a);
        store.insert(ROOT_CANVAS, b);
        store.insert(ROOT_CANVAS, link);

        let sink = count.clone();
        store.subscribe(move |_| *sink.borrow_mut() += 1);
        assert!(store.commit_frame(
            ROOT_CANVAS,
            BlockKind::Image,
            a_id,
            Frame::new(0.0, 200.0, 100.0, 100.0)
        ));
        assert_eq!(*count.borrow(), 1);

        let link = store.get::<LinkBlock>(ROOT_CANVAS, link_id).unwrap();
        assert_eq!(link.points[0], Point::new(100.0, 250.0));
    }

    #[test]
    fn test_commit_frame_for_missing_block_is_noop() {
        let count = Rc::new(RefCell::new(0));
        let mut store = GlobalBlockStore::new();
        let sink = count.clone();
        store.subscribe(move |_| *sink.borrow_mut() += 1);

        let missing = image(0.0, 0.0);
        assert!(!store.commit_frame(ROOT_CANVAS, BlockKind::Image, missing.id(), missing.frame));
        assert_eq!(*count.borrow(), 0);
        assert!(store.canvas(ROOT_CANVAS).is_none());
    }

    #[test]
    fn test_delete_removes_attached_links() {
        let mut store = GlobalBlockStore::new();
        let a = image(0.0, 0.0);
        let b = image(300.0, 0.0);
        let link = LinkBlock::between(a.id(), a.frame, b.id(), b.frame);
        let a_id = a.id();
        store.insert(ROOT_CANVAS, a);
        store.insert(ROOT_CANVAS, b);
        store.insert(ROOT_CANVAS, link);

        assert!(store.delete(ROOT_CANVAS, BlockKind::Image, a_id));
        assert_eq!(store.value::<ImageBlock>(ROOT_CANVAS).len(), 1);
        assert!(store.value::<LinkBlock>(ROOT_CANVAS).is_empty());
        assert!(!store.delete(ROOT_CANVAS, BlockKind::Image, a_id));
    }

    #[test]
    fn test_delete_embedded_canvas_drops_content() {
        let mut store = GlobalBlockStore::new();
        let outer = EmbeddedCanvasBlock::new(Frame::new(0.0, 0.0, 300.0, 300.0));
        let inner = EmbeddedCanvasBlock::new(Frame::new(0.0, 0.0, 200.0, 200.0));
        let (outer_id, outer_canvas, inner_canvas) =
            (outer.id(), outer.canvas_id.clone(), inner.canvas_id.clone());
        store.insert(ROOT_CANVAS, outer);
        store.insert(&outer_canvas, inner);
        store.insert(
            &inner_canvas,
            StrokeBlock::from_points(vec![Point::ZERO, Point::new(1.0, 1.0)], &InkStyle::default()),
        );

        assert!(store.delete(ROOT_CANVAS, BlockKind::Canvas, outer_id));
        assert!(store.canvas(&outer_canvas).is_none());
        assert!(store.canvas(&inner_canvas).is_none());
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let mut store = GlobalBlockStore::new();
        let back = image(0.0, 0.0);
        let front = TextBlock::new(Frame::new(50.0, 50.0, 100.0, 100.0), "front");
        let front_id = front.id();
        store.insert(ROOT_CANVAS, back);
        store.insert(ROOT_CANVAS, front);

        let blocks = store.canvas(ROOT_CANVAS).unwrap();
        let (kind, id, handle) = blocks.hit_test(Point::new(75.0, 75.0), 4.0).unwrap();
        assert_eq!(kind, BlockKind::Text);
        assert_eq!(id, front_id);
        assert_eq!(handle, Handle::Body);
        assert!(blocks.hit_test(Point::new(500.0, 500.0), 4.0).is_none());
    }

    #[test]
    fn test_state_json_is_keyed_by_canvas() {
        let mut store = GlobalBlockStore::new();
        store.insert(ROOT_CANVAS, image(0.0, 0.0));
        let json = serde_json::to_value(store.state()).unwrap();
        assert!(json[ROOT_CANVAS]["images"].is_array());
        assert!(json[ROOT_CANVAS]["paths"].is_array());
    }
}
