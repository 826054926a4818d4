//! Single-finger freehand drawing and erasing.

use super::{ControllerState, GestureContext, GestureController, GestureEvent, Outcome};
use crate::blocks::{InkStyle, StrokeBlock};

/// Whether strokes paint or erase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InkMode {
    Pen,
    Eraser,
}

/// Records one stroke per gesture and commits it on release.
///
/// The in-progress stroke is only a draft for live preview; the store sees
/// it once, at `end`, and only with at least two points. A second finger
/// discards the draft for the rest of the gesture.
#[derive(Debug, Clone)]
pub struct DrawController {
    ink: InkMode,
    style: InkStyle,
    draft: Option<StrokeBlock>,
    state: ControllerState,
}

impl DrawController {
    pub fn new(ink: InkMode, style: InkStyle) -> Self {
        Self {
            ink,
            style,
            draft: None,
            state: ControllerState::Idle,
        }
    }

    pub fn ink(&self) -> InkMode {
        self.ink
    }

    /// The stroke being drawn, for preview.
    pub fn draft(&self) -> Option<&StrokeBlock> {
        self.draft.as_ref()
    }

    fn abandon(&mut self) -> Outcome {
        if let Some(draft) = self.draft.take() {
            log::debug!("Discarding stroke with {} points: second pointer", draft.len());
        }
        self.state = ControllerState::Abandoned;
        Outcome::Declined
    }
}

impl GestureController for DrawController {
    fn begin(&mut self, event: &GestureEvent, cx: &mut GestureContext<'_>) -> Outcome {
        self.draft = None;
        let (1, Some(point)) = (event.pointer_count(), event.primary()) else {
            return self.abandon();
        };

        let content = cx.transform.get().to_content(point);
        self.draft = Some(StrokeBlock::begin(content, &self.style, self.ink == InkMode::Eraser));
        self.state = ControllerState::Active;
        Outcome::Claimed
    }

    fn update(&mut self, event: &GestureEvent, cx: &mut GestureContext<'_>) -> Outcome {
        if self.state != ControllerState::Active {
            return Outcome::Declined;
        }
        if event.pointer_count() >= 2 {
            return self.abandon();
        }

        if let (Some(point), Some(draft)) = (event.primary(), self.draft.as_mut()) {
            draft.push_point(cx.transform.get().to_content(point));
        }
        Outcome::Claimed
    }

    fn end(&mut self, _event: &GestureEvent, cx: &mut GestureContext<'_>) {
        let draft = self.draft.take();
        let was_active = self.state == ControllerState::Active;
        self.state = ControllerState::Idle;

        match draft {
            Some(stroke) if was_active && stroke.is_committable() => {
                log::debug!("Committing stroke with {} points on {}", stroke.len(), cx.canvas_id);
                cx.store.insert(cx.canvas_id, stroke);
            }
            Some(stroke) => {
                log::debug!("Dropping stroke with {} point(s)", stroke.len());
            }
            None => {}
        }
    }

    fn abort(&mut self) {
        self.draft = None;
        self.state = ControllerState::Idle;
    }

    fn state(&self) -> ControllerState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::ROOT_CANVAS;
    use crate::store::GlobalBlockStore;
    use crate::transform::{Transform, TransformState};
    use kurbo::{Point, Vec2};

    fn one(x: f64, y: f64) -> Vec<Point> {
        vec![Point::new(x, y)]
    }

    struct Harness {
        transform: TransformState,
        store: GlobalBlockStore,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                transform: TransformState::default(),
                store: GlobalBlockStore::new(),
            }
        }

        fn cx(&mut self) -> GestureContext<'_> {
            GestureContext {
                canvas_id: ROOT_CANVAS,
                transform: &mut self.transform,
                store: &mut self.store,
            }
        }
    }

    #[test]
    fn test_single_point_is_dropped() {
        let mut h = Harness::new();
        let mut draw = DrawController::new(InkMode::Pen, InkStyle::default());
        draw.begin(&GestureEvent::begin(one(10.0, 10.0)), &mut h.cx());
        draw.end(&GestureEvent::end(Vec2::ZERO), &mut h.cx());
        assert!(h.store.value::<StrokeBlock>(ROOT_CANVAS).is_empty());
        assert_eq!(draw.state(), ControllerState::Idle);
    }

    #[test]
    fn test_commits_recorded_points() {
        let mut h = Harness::new();
        let mut draw = DrawController::new(InkMode::Pen, InkStyle::default());
        draw.begin(&GestureEvent::begin(one(0.0, 0.0)), &mut h.cx());
        draw.update(&GestureEvent::update(one(5.0, 0.0), Vec2::new(5.0, 0.0)), &mut h.cx());
        draw.update(&GestureEvent::update(one(5.0, 5.0), Vec2::new(5.0, 5.0)), &mut h.cx());
        assert_eq!(draw.draft().map(StrokeBlock::len), Some(3));
        assert!(h.store.value::<StrokeBlock>(ROOT_CANVAS).is_empty());

        draw.end(&GestureEvent::end(Vec2::new(5.0, 5.0)), &mut h.cx());
        let strokes = h.store.value::<StrokeBlock>(ROOT_CANVAS);
        assert_eq!(strokes.len(), 1);
        assert_eq!(
            strokes[0].points,
            vec![Point::new(0.0, 0.0), Point::new(5.0, 0.0), Point::new(5.0, 5.0)]
        );
        assert!(draw.draft().is_none());
    }

    #[test]
    fn test_points_are_converted_to_content_space() {
        let mut h = Harness::new();
        h.transform.set(Transform::new(2.0, Vec2::new(100.0, 0.0)));
        let mut draw = DrawController::new(InkMode::Eraser, InkStyle::default());
        draw.begin(&GestureEvent::begin(one(100.0, 0.0)), &mut h.cx());
        draw.update(&GestureEvent::update(one(120.0, 40.0), Vec2::ZERO), &mut h.cx());
        draw.end(&GestureEvent::end(Vec2::ZERO), &mut h.cx());

        let stroke = &h.store.value::<StrokeBlock>(ROOT_CANVAS)[0];
        assert!(stroke.is_eraser);
        assert_eq!(stroke.points, vec![Point::new(0.0, 0.0), Point::new(10.0, 20.0)]);
    }

    #[test]
    fn test_second_finger_discards_stroke() {
        let mut h = Harness::new();
        let mut draw = DrawController::new(InkMode::Pen, InkStyle::default());
        draw.begin(&GestureEvent::begin(one(0.0, 0.0)), &mut h.cx());
        for i in 1..10 {
            let x = f64::from(i);
            draw.update(&GestureEvent::update(one(x, 0.0), Vec2::new(x, 0.0)), &mut h.cx());
        }

        let two = vec![Point::new(10.0, 0.0), Point::new(80.0, 0.0)];
        assert_eq!(
            draw.update(&GestureEvent::update(two, Vec2::ZERO), &mut h.cx()),
            Outcome::Declined
        );
        assert_eq!(draw.state(), ControllerState::Abandoned);
        assert!(draw.draft().is_none());

        // Back to one finger: still abandoned until release.
        draw.update(&GestureEvent::update(one(12.0, 0.0), Vec2::ZERO), &mut h.cx());
        draw.cancel(&GestureEvent::cancel(Vec2::ZERO), &mut h.cx());
        assert!(h.store.value::<StrokeBlock>(ROOT_CANVAS).is_empty());
        assert_eq!(draw.state(), ControllerState::Idle);
    }

    #[test]
    fn test_cancel_commits_like_end() {
        let mut h = Harness::new();
        let mut draw = DrawController::new(InkMode::Pen, InkStyle::default());
        draw.begin(&GestureEvent::begin(one(0.0, 0.0)), &mut h.cx());
        draw.update(&GestureEvent::update(one(1.0, 1.0), Vec2::ZERO), &mut h.cx());
        draw.cancel(&GestureEvent::cancel(Vec2::ZERO), &mut h.cx());
        assert_eq!(h.store.value::<StrokeBlock>(ROOT_CANVAS).len(), 1);
    }

    #[test]
    fn test_two_finger_begin_declines() {
        let mut h = Harness::new();
        let mut draw = DrawController::new(InkMode::Pen, InkStyle::default());
        let two = vec![Point::ZERO, Point::new(50.0, 0.0)];
        assert_eq!(draw.begin(&GestureEvent::begin(two), &mut h.cx()), Outcome::Declined);
        draw.end(&GestureEvent::end(Vec2::ZERO), &mut h.cx());
        assert!(h.store.value::<StrokeBlock>(ROOT_CANVAS).is_empty());
    }

    #[test]
    fn test_abort_discards_without_commit() {
        let mut h = Harness::new();
        let mut draw = DrawController::new(InkMode::Pen, InkStyle::default());
        draw.begin(&GestureEvent::begin(one(0.0, 0.0)), &mut h.cx());
        draw.update(&GestureEvent::update(one(3.0, 3.0), Vec2::ZERO), &mut h.cx());
        draw.abort();
        draw.end(&GestureEvent::end(Vec2::ZERO), &mut h.cx());
        assert!(h.store.value::<StrokeBlock>(ROOT_CANVAS).is_empty());
    }
}
