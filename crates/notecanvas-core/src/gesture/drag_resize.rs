//! Single-finger drag and resize of framed blocks.

use super::{ControllerState, GestureContext, GestureController, GestureEvent, HandleTarget, Outcome};
use crate::blocks::{BlockRef, Frame};
use crate::handles::{hit_test_handles, Grip, Handle};
use kurbo::{Size, Vec2};

/// Resize one axis. Returns the new origin and length.
fn resize_axis(origin: f64, length: f64, grip: Grip, delta: f64, min: f64) -> (f64, f64) {
    match grip {
        Grip::None => (origin, length),
        Grip::End => (origin, (length + delta).max(min)),
        Grip::Start => {
            let next = (length - delta).max(min);
            // The far edge stays where it was.
            (origin + length - next, next)
        }
    }
}

/// Frame after dragging `handle` by `delta` (content units) from `start`.
///
/// Resizing never goes below `min`; the edges the handle does not grab
/// never move.
pub fn resize_frame(start: Frame, handle: Handle, delta: Vec2, min: Size) -> Frame {
    if handle == Handle::Body {
        return Frame {
            x: start.x + delta.x,
            y: start.y + delta.y,
            ..start
        };
    }

    let (x, width) = resize_axis(start.x, start.width, handle.horizontal(), delta.x, min.width);
    let (y, height) = resize_axis(start.y, start.height, handle.vertical(), delta.y, min.height);
    Frame::new(x, y, width, height)
}

/// Which blocks this controller may pick up.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Scope {
    /// Whatever framed block is under the finger.
    AnyBlock,
    /// Only this block.
    Pinned(BlockRef),
}

/// Captured at the start of a drag.
#[derive(Debug, Clone, Copy)]
struct DragStart {
    block: BlockRef,
    handle: Handle,
    frame: Frame,
    min: Size,
    scale: f64,
}

/// Drags or resizes one block; writes the frame to the store once, on release.
#[derive(Debug, Clone)]
pub struct DragResizeController {
    scope: Scope,
    /// Handle hit radius in screen pixels.
    tolerance: f64,
    start: Option<DragStart>,
    live: Option<Frame>,
    state: ControllerState,
}

impl DragResizeController {
    /// Picks up the topmost block under the touch.
    pub fn hit_testing(tolerance: f64) -> Self {
        Self::with_scope(Scope::AnyBlock, tolerance)
    }

    /// Only ever moves `block`.
    pub fn pinned(block: BlockRef, tolerance: f64) -> Self {
        Self::with_scope(Scope::Pinned(block), tolerance)
    }

    fn with_scope(scope: Scope, tolerance: f64) -> Self {
        Self {
            scope,
            tolerance,
            start: None,
            live: None,
            state: ControllerState::Idle,
        }
    }

    /// Block and handle being dragged.
    pub fn target(&self) -> Option<HandleTarget> {
        self.start.map(|s| HandleTarget {
            block: s.block,
            handle: s.handle,
        })
    }

    /// In-progress frame, for preview. Not in the store until release.
    pub fn live_frame(&self) -> Option<(BlockRef, Frame)> {
        Some((self.start?.block, self.live?))
    }

    fn resolve(&self, event: &GestureEvent, cx: &GestureContext<'_>) -> Option<HandleTarget> {
        let point = cx.transform.get().to_content(event.primary()?);
        let tolerance = cx.transform.get().screen_dist_to_content(self.tolerance);
        let blocks = cx.store.canvas(cx.canvas_id)?;

        match (self.scope, event.target) {
            (Scope::AnyBlock, Some(target)) => Some(target),
            (Scope::Pinned(block), Some(target)) => (target.block == block).then_some(target),
            (Scope::AnyBlock, None) => blocks
                .hit_test(point, tolerance)
                .map(|(kind, id, handle)| HandleTarget {
                    block: BlockRef::new(kind, id),
                    handle,
                }),
            (Scope::Pinned(block), None) => {
                let geometric = blocks.geometric(block.kind, block.id)?;
                hit_test_handles(geometric.frame(), point, tolerance, geometric.resizeable())
                    .map(|handle| HandleTarget { block, handle })
            }
        }
    }

    fn frame_at(&self, translation: Vec2) -> Option<Frame> {
        let start = self.start?;
        Some(resize_frame(start.frame, start.handle, translation / start.scale, start.min))
    }
}

impl GestureController for DragResizeController {
    fn begin(&mut self, event: &GestureEvent, cx: &mut GestureContext<'_>) -> Outcome {
        self.start = None;
        self.live = None;
        self.state = ControllerState::Idle;
        if event.pointer_count() != 1 {
            return Outcome::Declined;
        }

        let Some(target) = self.resolve(event, cx) else {
            return Outcome::Declined;
        };
        let Some(block) = cx
            .store
            .canvas(cx.canvas_id)
            .and_then(|blocks| blocks.geometric(target.block.kind, target.block.id))
        else {
            return Outcome::Declined;
        };

        let allowed = if target.handle.is_resize() {
            block.resizeable()
        } else {
            block.moveable()
        };
        if !allowed {
            return Outcome::Declined;
        }

        let frame = block.frame();
        self.start = Some(DragStart {
            block: target.block,
            handle: target.handle,
            frame,
            min: block.min_size(),
            scale: cx.transform.scale(),
        });
        self.live = Some(frame);
        self.state = ControllerState::Active;
        log::debug!("Grabbed {:?} {} by {:?}", target.block.kind, target.block.id, target.handle);
        Outcome::Claimed
    }

    fn update(&mut self, event: &GestureEvent, _cx: &mut GestureContext<'_>) -> Outcome {
        if self.state != ControllerState::Active {
            return Outcome::Declined;
        }
        if event.pointer_count() >= 2 {
            log::debug!("Abandoning drag: second pointer");
            self.live = None;
            self.state = ControllerState::Abandoned;
            return Outcome::Declined;
        }

        self.live = self.frame_at(event.translation);
        Outcome::Claimed
    }

    fn end(&mut self, event: &GestureEvent, cx: &mut GestureContext<'_>) {
        let start = self.start.take();
        let live = self.live.take();
        let was_active = self.state == ControllerState::Active;
        self.state = ControllerState::Idle;

        let (Some(start), true) = (start, was_active) else {
            return;
        };
        let frame = if event.translation == Vec2::ZERO {
            live.unwrap_or(start.frame)
        } else {
            resize_frame(start.frame, start.handle, event.translation / start.scale, start.min)
        };
        if frame != start.frame {
            cx.store
                .commit_frame(cx.canvas_id, start.block.kind, start.block.id, frame);
        }
    }

    fn abort(&mut self) {
        self.start = None;
        self.live = None;
        self.state = ControllerState::Idle;
    }

    fn state(&self) -> ControllerState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{Block, BlockKind, ImageBlock, WebLinkBlock, ROOT_CANVAS};
    use crate::handles::{Corner, Edge};
    use crate::store::GlobalBlockStore;
    use crate::transform::{Transform, TransformState};
    use kurbo::Point;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_left_edge_resize_clamps_and_keeps_right_edge() {
        let start = Frame::new(10.0, 10.0, 100.0, 50.0);
        let frame = resize_frame(start, Handle::Edge(Edge::Left), Vec2::new(60.0, 0.0), Size::new(80.0, 20.0));
        assert_eq!(frame, Frame::new(30.0, 10.0, 80.0, 50.0));
    }

    #[test]
    fn test_bottom_right_resize() {
        let start = Frame::new(0.0, 0.0, 100.0, 100.0);
        let frame = resize_frame(
            start,
            Handle::Corner(Corner::BottomRight),
            Vec2::new(20.0, -90.0),
            Size::new(40.0, 40.0),
        );
        assert_eq!(frame, Frame::new(0.0, 0.0, 120.0, 40.0));
    }

    #[test]
    fn test_every_handle_clamps_and_pins_opposite_edges() {
        let start = Frame::new(10.0, 20.0, 100.0, 60.0);
        let min = Size::new(40.0, 30.0);
        let deltas = [
            Vec2::new(500.0, 500.0),
            Vec2::new(-500.0, -500.0),
            Vec2::new(500.0, -500.0),
            Vec2::new(-500.0, 500.0),
            Vec2::new(7.0, -3.0),
        ];

        for handle in Handle::RESIZE {
            for delta in deltas {
                let frame = resize_frame(start, handle, delta, min);
                let (before, after) = (start.rect(), frame.rect());
                assert!(frame.width >= min.width - 1e-9, "{handle:?} {delta:?}");
                assert!(frame.height >= min.height - 1e-9, "{handle:?} {delta:?}");

                match handle.horizontal() {
                    Grip::Start => assert!((after.x1 - before.x1).abs() < 1e-9),
                    Grip::End => assert!((after.x0 - before.x0).abs() < 1e-9),
                    Grip::None => {
                        assert!((after.x0 - before.x0).abs() < 1e-9);
                        assert!((after.x1 - before.x1).abs() < 1e-9);
                    }
                }
                match handle.vertical() {
                    Grip::Start => assert!((after.y1 - before.y1).abs() < 1e-9),
                    Grip::End => assert!((after.y0 - before.y0).abs() < 1e-9),
                    Grip::None => {
                        assert!((after.y0 - before.y0).abs() < 1e-9);
                        assert!((after.y1 - before.y1).abs() < 1e-9);
                    }
                }
            }
        }
    }

    #[test]
    fn test_body_drag_ignores_min() {
        let start = Frame::new(0.0, 0.0, 10.0, 10.0);
        let frame = resize_frame(start, Handle::Body, Vec2::new(-5.0, 8.0), Size::new(100.0, 100.0));
        assert_eq!(frame, Frame::new(-5.0, 8.0, 10.0, 10.0));
    }

    struct Harness {
        transform: TransformState,
        store: GlobalBlockStore,
        writes: Rc<RefCell<usize>>,
    }

    impl Harness {
        fn new() -> Self {
            let mut store = GlobalBlockStore::new();
            let writes = Rc::new(RefCell::new(0));
            let sink = writes.clone();
            store.subscribe(move |_| *sink.borrow_mut() += 1);
            Self {
                transform: TransformState::default(),
                store,
                writes,
            }
        }

        fn add_image(&mut self, frame: Frame) -> BlockRef {
            let image = ImageBlock::new(frame, "a.png");
            let block = BlockRef::new(BlockKind::Image, image.id());
            self.store.insert(ROOT_CANVAS, image);
            *self.writes.borrow_mut() = 0;
            block
        }

        fn cx(&mut self) -> GestureContext<'_> {
            GestureContext {
                canvas_id: ROOT_CANVAS,
                transform: &mut self.transform,
                store: &mut self.store,
            }
        }
    }

    fn at(x: f64, y: f64) -> Vec<Point> {
        vec![Point::new(x, y)]
    }

    #[test]
    fn test_drag_commits_once_on_release() {
        let mut h = Harness::new();
        let block = h.add_image(Frame::new(0.0, 0.0, 200.0, 200.0));
        h.transform.set(Transform::new(2.0, Vec2::ZERO));

        let mut drag = DragResizeController::hit_testing(24.0);
        assert_eq!(drag.begin(&GestureEvent::begin(at(200.0, 200.0)), &mut h.cx()), Outcome::Claimed);
        for step in 1..=5 {
            let t = Vec2::new(20.0 * f64::from(step), 0.0);
            drag.update(&GestureEvent::update(at(200.0 + t.x, 200.0), t), &mut h.cx());
        }
        assert_eq!(drag.live_frame(), Some((block, Frame::new(50.0, 0.0, 200.0, 200.0))));
        assert_eq!(*h.writes.borrow(), 0);

        drag.end(&GestureEvent::end(Vec2::new(100.0, 0.0)), &mut h.cx());
        assert_eq!(*h.writes.borrow(), 1);
        let image = h.store.get::<ImageBlock>(ROOT_CANVAS, block.id).unwrap();
        assert_eq!(image.frame, Frame::new(50.0, 0.0, 200.0, 200.0));
    }

    #[test]
    fn test_second_pointer_abandons_drag() {
        let mut h = Harness::new();
        let block = h.add_image(Frame::new(0.0, 0.0, 200.0, 200.0));
        let mut drag = DragResizeController::hit_testing(24.0);
        drag.begin(&GestureEvent::begin(at(100.0, 100.0)), &mut h.cx());
        drag.update(&GestureEvent::update(at(130.0, 100.0), Vec2::new(30.0, 0.0)), &mut h.cx());

        let two = vec![Point::new(130.0, 100.0), Point::new(300.0, 100.0)];
        assert_eq!(
            drag.update(&GestureEvent::update(two, Vec2::new(30.0, 0.0)), &mut h.cx()),
            Outcome::Declined
        );
        assert_eq!(drag.state(), ControllerState::Abandoned);
        drag.end(&GestureEvent::end(Vec2::new(30.0, 0.0)), &mut h.cx());

        assert_eq!(*h.writes.borrow(), 0);
        let image = h.store.get::<ImageBlock>(ROOT_CANVAS, block.id).unwrap();
        assert_eq!(image.frame, Frame::new(0.0, 0.0, 200.0, 200.0));
    }

    #[test]
    fn test_resize_through_corner_handle() {
        let mut h = Harness::new();
        let block = h.add_image(Frame::new(0.0, 0.0, 200.0, 200.0));
        let mut drag = DragResizeController::hit_testing(24.0);
        drag.begin(&GestureEvent::begin(at(198.0, 198.0)), &mut h.cx());
        assert_eq!(drag.target().map(|t| t.handle), Some(Handle::Corner(Corner::BottomRight)));
        drag.end(&GestureEvent::end(Vec2::new(-500.0, 10.0)), &mut h.cx());

        let image = h.store.get::<ImageBlock>(ROOT_CANVAS, block.id).unwrap();
        assert_eq!(image.frame, Frame::new(0.0, 0.0, 48.0, 210.0));
    }

    #[test]
    fn test_empty_canvas_and_two_fingers_decline() {
        let mut h = Harness::new();
        h.add_image(Frame::new(0.0, 0.0, 100.0, 100.0));
        let mut drag = DragResizeController::hit_testing(24.0);
        assert_eq!(drag.begin(&GestureEvent::begin(at(500.0, 500.0)), &mut h.cx()), Outcome::Declined);
        let two = vec![Point::new(50.0, 50.0), Point::new(60.0, 60.0)];
        assert_eq!(drag.begin(&GestureEvent::begin(two), &mut h.cx()), Outcome::Declined);
    }

    #[test]
    fn test_pinned_ignores_other_blocks() {
        let mut h = Harness::new();
        let pinned = h.add_image(Frame::new(0.0, 0.0, 100.0, 100.0));
        let other = h.add_image(Frame::new(300.0, 0.0, 100.0, 100.0));
        let mut drag = DragResizeController::pinned(pinned, 24.0);

        assert_eq!(drag.begin(&GestureEvent::begin(at(350.0, 50.0)), &mut h.cx()), Outcome::Declined);
        let explicit = GestureEvent::begin(at(350.0, 50.0)).with_target(HandleTarget {
            block: other,
            handle: Handle::Body,
        });
        assert_eq!(drag.begin(&explicit, &mut h.cx()), Outcome::Declined);
        assert_eq!(drag.begin(&GestureEvent::begin(at(50.0, 50.0)), &mut h.cx()), Outcome::Claimed);
    }

    #[test]
    fn test_non_resizeable_block_declines_resize_handle() {
        let mut h = Harness::new();
        let link = WebLinkBlock::new(Frame::new(0.0, 0.0, 240.0, 60.0), "https://example.com");
        let block = BlockRef::new(BlockKind::WebLink, link.id());
        h.store.insert(ROOT_CANVAS, link);

        let mut drag = DragResizeController::hit_testing(24.0);
        let grab_corner = GestureEvent::begin(at(240.0, 60.0)).with_target(HandleTarget {
            block,
            handle: Handle::Corner(Corner::BottomRight),
        });
        assert_eq!(drag.begin(&grab_corner, &mut h.cx()), Outcome::Declined);

        // Without an explicit target the corner hits the body instead.
        assert_eq!(drag.begin(&GestureEvent::begin(at(238.0, 58.0)), &mut h.cx()), Outcome::Claimed);
        assert_eq!(drag.target().map(|t| t.handle), Some(Handle::Body));
    }

    #[test]
    fn test_block_deleted_mid_drag_is_noop() {
        let mut h = Harness::new();
        let block = h.add_image(Frame::new(0.0, 0.0, 100.0, 100.0));
        let mut drag = DragResizeController::hit_testing(24.0);
        drag.begin(&GestureEvent::begin(at(50.0, 50.0)), &mut h.cx());
        h.store.delete(ROOT_CANVAS, block.kind, block.id);
        *h.writes.borrow_mut() = 0;

        drag.end(&GestureEvent::end(Vec2::new(10.0, 10.0)), &mut h.cx());
        assert_eq!(*h.writes.borrow(), 0);
    }
}
