//! Touch gesture controllers and the combinators that compose them.
//!
//! Every controller consumes the same event stream (`begin`, any number of
//! `update`s, then exactly one `end` or `cancel`) and reports whether it is
//! still participating. A controller that returns [`Outcome::Declined`] has
//! failed for the rest of the gesture; [`exclusive_until_fail`] uses that to
//! hand the pointers to the next controller.

mod drag_resize;
mod draw;
mod pan;
mod pinch;

pub use drag_resize::{resize_frame, DragResizeController};
pub use draw::{DrawController, InkMode};
pub use pan::PanController;
pub use pinch::PinchZoomController;

use crate::blocks::BlockRef;
use crate::handles::Handle;
use crate::store::GlobalBlockStore;
use crate::transform::TransformState;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Phase of a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Begin,
    Update,
    End,
    Cancel,
}

/// A block handle the touch landed on, when the recognizer already knows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandleTarget {
    pub block: BlockRef,
    pub handle: Handle,
}

/// One event from the multi-touch recognizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureEvent {
    pub phase: Phase,
    /// Active pointers in screen coordinates.
    #[serde(default)]
    pub pointers: Vec<Point>,
    /// Cumulative translation of the primary pointer since `Begin`, in
    /// screen pixels.
    #[serde(default)]
    pub translation: Vec2,
    /// Block handle under the first touch, if known.
    #[serde(default)]
    pub target: Option<HandleTarget>,
}

impl GestureEvent {
    pub fn new(phase: Phase, pointers: Vec<Point>, translation: Vec2) -> Self {
        Self {
            phase,
            pointers,
            translation,
            target: None,
        }
    }

    pub fn begin(pointers: Vec<Point>) -> Self {
        Self::new(Phase::Begin, pointers, Vec2::ZERO)
    }

    pub fn update(pointers: Vec<Point>, translation: Vec2) -> Self {
        Self::new(Phase::Update, pointers, translation)
    }

    pub fn end(translation: Vec2) -> Self {
        Self::new(Phase::End, Vec::new(), translation)
    }

    pub fn cancel(translation: Vec2) -> Self {
        Self::new(Phase::Cancel, Vec::new(), translation)
    }

    pub fn with_target(mut self, target: HandleTarget) -> Self {
        self.target = Some(target);
        self
    }

    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    pub fn primary(&self) -> Option<Point> {
        self.pointers.first().copied()
    }

    /// Midpoint of the first two pointers.
    pub fn focal(&self) -> Option<Point> {
        match self.pointers.as_slice() {
            [a, b, ..] => Some(a.midpoint(*b)),
            _ => None,
        }
    }

    /// Distance between the first two pointers.
    pub fn span(&self) -> Option<f64> {
        match self.pointers.as_slice() {
            [a, b, ..] => Some(a.distance(*b)),
            _ => None,
        }
    }
}

/// Whether a controller is still taking part in the current gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Claimed,
    /// Failed for the rest of this gesture.
    Declined,
}

impl Outcome {
    pub fn is_claimed(self) -> bool {
        self == Outcome::Claimed
    }
}

/// Named controller states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
    #[default]
    Idle,
    /// Waiting for the pointer count it needs.
    Armed,
    Active,
    /// Gave up on this gesture; ignores input until it ends.
    Abandoned,
}

impl ControllerState {
    fn rank(self) -> u8 {
        match self {
            ControllerState::Idle => 0,
            ControllerState::Abandoned => 1,
            ControllerState::Armed => 2,
            ControllerState::Active => 3,
        }
    }

    /// The more engaged of two states.
    pub fn merge(self, other: Self) -> Self {
        if other.rank() > self.rank() { other } else { self }
    }
}

/// What a controller may read and write while handling an event.
pub struct GestureContext<'a> {
    pub canvas_id: &'a str,
    pub transform: &'a mut TransformState,
    pub store: &'a mut GlobalBlockStore,
}

/// A gesture controller.
///
/// `cancel` commits like `end` unless the controller has abandoned the
/// gesture; `abort` discards any in-progress state without committing
/// (used when the mode changes mid-gesture).
pub trait GestureController {
    fn begin(&mut self, event: &GestureEvent, cx: &mut GestureContext<'_>) -> Outcome;

    fn update(&mut self, event: &GestureEvent, cx: &mut GestureContext<'_>) -> Outcome;

    fn end(&mut self, event: &GestureEvent, cx: &mut GestureContext<'_>);

    fn cancel(&mut self, event: &GestureEvent, cx: &mut GestureContext<'_>) {
        self.end(event, cx);
    }

    fn abort(&mut self);

    fn state(&self) -> ControllerState;
}

impl<T: GestureController> GestureController for Option<T> {
    fn begin(&mut self, event: &GestureEvent, cx: &mut GestureContext<'_>) -> Outcome {
        match self {
            Some(inner) => inner.begin(event, cx),
            None => Outcome::Declined,
        }
    }

    fn update(&mut self, event: &GestureEvent, cx: &mut GestureContext<'_>) -> Outcome {
        match self {
            Some(inner) => inner.update(event, cx),
            None => Outcome::Declined,
        }
    }

    fn end(&mut self, event: &GestureEvent, cx: &mut GestureContext<'_>) {
        if let Some(inner) = self {
            inner.end(event, cx);
        }
    }

    fn cancel(&mut self, event: &GestureEvent, cx: &mut GestureContext<'_>) {
        if let Some(inner) = self {
            inner.cancel(event, cx);
        }
    }

    fn abort(&mut self) {
        if let Some(inner) = self {
            inner.abort();
        }
    }

    fn state(&self) -> ControllerState {
        self.as_ref().map_or(ControllerState::Idle, |inner| inner.state())
    }
}

/// Runs both controllers on every event, `first` before `second`.
#[derive(Debug, Clone)]
pub struct Sequence<A, B> {
    pub first: A,
    pub second: B,
}

/// Compose two controllers that both see every event, in order.
pub fn sequence<A, B>(first: A, second: B) -> Sequence<A, B> {
    Sequence { first, second }
}

impl<A: GestureController, B: GestureController> GestureController for Sequence<A, B> {
    fn begin(&mut self, event: &GestureEvent, cx: &mut GestureContext<'_>) -> Outcome {
        let a = self.first.begin(event, cx);
        let b = self.second.begin(event, cx);
        if a.is_claimed() || b.is_claimed() {
            Outcome::Claimed
        } else {
            Outcome::Declined
        }
    }

    fn update(&mut self, event: &GestureEvent, cx: &mut GestureContext<'_>) -> Outcome {
        let a = self.first.update(event, cx);
        let b = self.second.update(event, cx);
        if a.is_claimed() || b.is_claimed() {
            Outcome::Claimed
        } else {
            Outcome::Declined
        }
    }

    fn end(&mut self, event: &GestureEvent, cx: &mut GestureContext<'_>) {
        self.first.end(event, cx);
        self.second.end(event, cx);
    }

    fn cancel(&mut self, event: &GestureEvent, cx: &mut GestureContext<'_>) {
        self.first.cancel(event, cx);
        self.second.cancel(event, cx);
    }

    fn abort(&mut self) {
        self.first.abort();
        self.second.abort();
    }

    fn state(&self) -> ControllerState {
        self.first.state().merge(self.second.state())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Route {
    #[default]
    Idle,
    Primary,
    Fallback,
}

/// Gives the gesture to `primary`; `fallback` only starts once `primary`
/// declines, at `begin` or at any later update.
#[derive(Debug, Clone)]
pub struct ExclusiveUntilFail<A, B> {
    pub primary: A,
    pub fallback: B,
    route: Route,
}

/// Compose two controllers so the second runs only after the first fails.
pub fn exclusive_until_fail<A, B>(primary: A, fallback: B) -> ExclusiveUntilFail<A, B> {
    ExclusiveUntilFail {
        primary,
        fallback,
        route: Route::Idle,
    }
}

impl<A: GestureController, B: GestureController> ExclusiveUntilFail<A, B> {
    fn hand_over(&mut self, event: &GestureEvent, cx: &mut GestureContext<'_>) -> Outcome {
        self.route = Route::Fallback;
        self.fallback.begin(event, cx)
    }
}

impl<A: GestureController, B: GestureController> GestureController for ExclusiveUntilFail<A, B> {
    fn begin(&mut self, event: &GestureEvent, cx: &mut GestureContext<'_>) -> Outcome {
        match self.primary.begin(event, cx) {
            Outcome::Claimed => {
                self.route = Route::Primary;
                Outcome::Claimed
            }
            Outcome::Declined => self.hand_over(event, cx),
        }
    }

    fn update(&mut self, event: &GestureEvent, cx: &mut GestureContext<'_>) -> Outcome {
        match self.route {
            Route::Idle => Outcome::Declined,
            Route::Primary => match self.primary.update(event, cx) {
                Outcome::Claimed => Outcome::Claimed,
                Outcome::Declined => self.hand_over(event, cx),
            },
            Route::Fallback => self.fallback.update(event, cx),
        }
    }

    fn end(&mut self, event: &GestureEvent, cx: &mut GestureContext<'_>) {
        match std::mem::take(&mut self.route) {
            Route::Idle => {}
            Route::Primary => self.primary.end(event, cx),
            Route::Fallback => {
                self.primary.end(event, cx);
                self.fallback.end(event, cx);
            }
        }
    }

    fn cancel(&mut self, event: &GestureEvent, cx: &mut GestureContext<'_>) {
        match std::mem::take(&mut self.route) {
            Route::Idle => {}
            Route::Primary => self.primary.cancel(event, cx),
            Route::Fallback => {
                self.primary.cancel(event, cx);
                self.fallback.cancel(event, cx);
            }
        }
    }

    fn abort(&mut self) {
        self.route = Route::Idle;
        self.primary.abort();
        self.fallback.abort();
    }

    fn state(&self) -> ControllerState {
        match self.route {
            Route::Idle => ControllerState::Idle,
            Route::Primary => self.primary.state(),
            Route::Fallback => self.fallback.state(),
        }
    }
}
