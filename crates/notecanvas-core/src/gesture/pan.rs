//! Two-finger canvas pan.

use super::{ControllerState, GestureContext, GestureController, GestureEvent, Outcome};
use crate::transform::Transform;
use kurbo::{Point, Vec2};

#[derive(Debug, Clone, Copy)]
struct PanStart {
    translate: Vec2,
    midpoint: Point,
}

/// Moves the canvas with the midpoint of two pointers. Scale is untouched.
#[derive(Debug, Clone, Default)]
pub struct PanController {
    start: Option<PanStart>,
    state: ControllerState,
}

impl PanController {
    pub fn new() -> Self {
        Self::default()
    }

    fn track(&mut self, event: &GestureEvent, cx: &mut GestureContext<'_>) {
        let Some(midpoint) = event.focal() else {
            self.start = None;
            self.state = ControllerState::Armed;
            return;
        };

        match self.start {
            None => {
                self.start = Some(PanStart {
                    translate: cx.transform.get().translate,
                    midpoint,
                });
                self.state = ControllerState::Active;
            }
            Some(start) => {
                let translate = start.translate + (midpoint - start.midpoint);
                cx.transform.update(|t| Transform::new(t.scale, translate));
            }
        }
    }
}

impl GestureController for PanController {
    fn begin(&mut self, event: &GestureEvent, cx: &mut GestureContext<'_>) -> Outcome {
        self.start = None;
        self.track(event, cx);
        Outcome::Claimed
    }

    fn update(&mut self, event: &GestureEvent, cx: &mut GestureContext<'_>) -> Outcome {
        if self.state == ControllerState::Idle {
            return Outcome::Declined;
        }
        self.track(event, cx);
        Outcome::Claimed
    }

    fn end(&mut self, _event: &GestureEvent, _cx: &mut GestureContext<'_>) {
        self.abort();
    }

    fn abort(&mut self) {
        self.start = None;
        self.state = ControllerState::Idle;
    }

    fn state(&self) -> ControllerState {
        self.state
    }
}
