//! Two-finger pinch zoom around the focal point.

use super::{ControllerState, GestureContext, GestureController, GestureEvent, Outcome};
use crate::transform::Transform;
use kurbo::Point;

/// Values captured when two pointers land.
#[derive(Debug, Clone, Copy)]
struct PinchStart {
    scale: f64,
    span: f64,
    /// Content point under the starting focal point.
    anchor: Point,
}

/// Zooms the canvas so the content point under the initial focal point
/// stays under the fingers.
///
/// Declines the gesture outright when the scale band leaves no room to zoom.
/// Waits in `Armed` with fewer than two pointers and re-captures its start
/// values each time two pointers come back.
#[derive(Debug, Clone, Default)]
pub struct PinchZoomController {
    start: Option<PinchStart>,
    state: ControllerState,
}

impl PinchZoomController {
    pub fn new() -> Self {
        Self::default()
    }

    fn track(&mut self, event: &GestureEvent, cx: &mut GestureContext<'_>) {
        let (Some(focal), Some(span)) = (event.focal(), event.span()) else {
            if self.start.take().is_some() {
                log::debug!("Pinch dormant: pointer lifted");
            }
            self.state = ControllerState::Armed;
            return;
        };

        match self.start {
            None => {
                if span <= f64::EPSILON {
                    self.state = ControllerState::Armed;
                    return;
                }
                let transform = cx.transform.get();
                self.start = Some(PinchStart {
                    scale: transform.scale,
                    span,
                    anchor: transform.to_content(focal),
                });
                self.state = ControllerState::Active;
                log::debug!("Pinch armed at {:?}, span {:.1}", focal, span);
            }
            Some(start) => {
                let scale = cx.transform.band().clamp(start.scale * span / start.span);
                let translate = focal.to_vec2() - start.anchor.to_vec2() * scale;
                cx.transform.set(Transform::new(scale, translate));
            }
        }
    }
}

impl GestureController for PinchZoomController {
    fn begin(&mut self, event: &GestureEvent, cx: &mut GestureContext<'_>) -> Outcome {
        self.start = None;
        if !cx.transform.band().allows_zoom() {
            self.state = ControllerState::Idle;
            return Outcome::Declined;
        }
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
