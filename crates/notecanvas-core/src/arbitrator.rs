//! Decides which gesture controllers own the pointers in each mode.

use crate::blocks::{BlockRef, Frame, StrokeBlock};
use crate::config::EngineConfig;
use crate::gesture::{
    exclusive_until_fail, sequence, ControllerState, DragResizeController, DrawController,
    ExclusiveUntilFail, GestureContext, GestureController, GestureEvent, InkMode, PanController,
    Phase, PinchZoomController, Sequence,
};
use serde::{Deserialize, Serialize};

/// Editing mode of a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Draw,
    Eraser,
    /// Pan the canvas and move or resize blocks.
    Hand,
    /// Touches go to one block's handles.
    Block(BlockRef),
}

/// Controllers the policy can arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerKind {
    Draw,
    DragResize,
    PinchZoom,
    Pan,
}

/// Facts about the touch that the policy depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Eligibility {
    /// The block under the touch (or the pinned block) can move.
    pub moveable: bool,
    /// The block under the touch (or the pinned block) can resize.
    pub resizeable: bool,
    /// The gesture surface is a whole canvas rather than a block.
    pub canvas_level: bool,
    /// Two fingers may zoom while in an ink mode.
    pub pinch_in_ink_modes: bool,
}

/// Controllers that should be armed for `pointers` active pointers in `mode`.
///
/// | mode          | 1 pointer    | 2 pointers                  |
/// |---------------|--------------|-----------------------------|
/// | Draw / Eraser | Draw         | none                        |
/// | Hand          | DragResize*  | PinchZoom + Pan if canvas   |
/// | Block         | DragResize*  | none                        |
///
/// `*` only if the block can move or resize.
pub fn select(mode: Mode, pointers: usize, eligibility: Eligibility) -> Vec<ControllerKind> {
    let can_drag = eligibility.moveable || eligibility.resizeable;
    let two_finger = || vec![ControllerKind::PinchZoom, ControllerKind::Pan];

    match (mode, pointers) {
        (_, 0) => Vec::new(),
        (Mode::Draw | Mode::Eraser, 1) => vec![ControllerKind::Draw],
        (Mode::Draw | Mode::Eraser, _) => {
            if eligibility.pinch_in_ink_modes && eligibility.canvas_level {
                two_finger()
            } else {
                Vec::new()
            }
        }
        (Mode::Hand | Mode::Block(_), 1) if can_drag => vec![ControllerKind::DragResize],
        (Mode::Hand | Mode::Block(_), 1) => Vec::new(),
        (Mode::Hand, _) if eligibility.canvas_level => two_finger(),
        (Mode::Hand | Mode::Block(_), _) => Vec::new(),
    }
}

type TwoFinger = ExclusiveUntilFail<PinchZoomController, PanController>;

fn two_finger() -> TwoFinger {
    // Pan only takes over when the scale band disallows zoom.
    exclusive_until_fail(PinchZoomController::new(), PanController::new())
}

fn active(kind: ControllerKind, controller: &dyn GestureController) -> Option<ControllerKind> {
    (controller.state() == ControllerState::Active).then_some(kind)
}

fn two_finger_engaged(two: &TwoFinger) -> impl Iterator<Item = ControllerKind> {
    [
        active(ControllerKind::PinchZoom, &two.primary),
        active(ControllerKind::Pan, &two.fallback),
    ]
    .into_iter()
    .flatten()
}

/// The composed controller for the current mode.
#[derive(Debug, Clone)]
enum Armed {
    Ink(DrawController),
    InkWithCanvas(Sequence<DrawController, TwoFinger>),
    /// A block drag has to fail before the canvas gets the pointers.
    Hand(ExclusiveUntilFail<DragResizeController, Option<TwoFinger>>),
    Block(DragResizeController),
}

impl Armed {
    fn controller(&mut self) -> &mut dyn GestureController {
        match self {
            Armed::Ink(c) => c,
            Armed::InkWithCanvas(c) => c,
            Armed::Hand(c) => c,
            Armed::Block(c) => c,
        }
    }

    /// Leaf controllers currently driving the gesture.
    fn engaged(&self) -> Vec<ControllerKind> {
        match self {
            Armed::Ink(draw) => active(ControllerKind::Draw, draw).into_iter().collect(),
            Armed::InkWithCanvas(seq) => active(ControllerKind::Draw, &seq.first)
                .into_iter()
                .chain(two_finger_engaged(&seq.second))
                .collect(),
            Armed::Hand(hand) => active(ControllerKind::DragResize, &hand.primary)
                .into_iter()
                .chain(hand.fallback.iter().flat_map(two_finger_engaged))
                .collect(),
            Armed::Block(drag) => active(ControllerKind::DragResize, drag).into_iter().collect(),
        }
    }

    fn state(&self) -> ControllerState {
        match self {
            Armed::Ink(c) => c.state(),
            Armed::InkWithCanvas(c) => c.state(),
            Armed::Hand(c) => c.state(),
            Armed::Block(c) => c.state(),
        }
    }
}

/// Routes touch events for one mounted canvas to the controllers its mode
/// calls for.
#[derive(Debug, Clone)]
pub struct GestureArbitrator {
    mode: Mode,
    canvas_level: bool,
    config: EngineConfig,
    armed: Armed,
    pointers: usize,
}

impl GestureArbitrator {
    pub fn new(mode: Mode, canvas_level: bool, config: &EngineConfig) -> Self {
        Self {
            mode,
            canvas_level,
            armed: Self::arm(mode, canvas_level, config),
            config: config.clone(),
            pointers: 0,
        }
    }

    fn arm(mode: Mode, canvas_level: bool, config: &EngineConfig) -> Armed {
        let draw_with = |ink| DrawController::new(ink, config.ink);
        match mode {
            Mode::Draw | Mode::Eraser => {
                let draw = draw_with(if mode == Mode::Eraser {
                    InkMode::Eraser
                } else {
                    InkMode::Pen
                });
                if config.pinch_in_ink_modes && canvas_level {
                    Armed::InkWithCanvas(sequence(draw, two_finger()))
                } else {
                    Armed::Ink(draw)
                }
            }
            Mode::Hand => Armed::Hand(exclusive_until_fail(
                DragResizeController::hit_testing(config.handle_tolerance),
                canvas_level.then(two_finger),
            )),
            Mode::Block(block) => {
                Armed::Block(DragResizeController::pinned(block, config.handle_tolerance))
            }
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_canvas_level(&self) -> bool {
        self.canvas_level
    }

    /// Switch modes. A gesture in flight is dropped without committing.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.armed.state() != ControllerState::Idle {
            log::debug!("Mode change to {:?} aborts gesture in {:?}", mode, self.mode);
        }
        self.armed.controller().abort();
        self.mode = mode;
        self.armed = Self::arm(mode, self.canvas_level, &self.config);
        self.pointers = 0;
    }

    /// Feed one touch event.
    ///
    /// Whenever the pointer count changes, the controllers that end up engaged
    /// are always a subset of what [`select`] allows.
    pub fn handle(&mut self, event: &GestureEvent, cx: &mut GestureContext<'_>) {
        let selected = (matches!(event.phase, Phase::Begin | Phase::Update)
            && event.pointer_count() != self.pointers)
            .then(|| select(self.mode, event.pointer_count(), self.eligibility(event, cx)));

        let controller = self.armed.controller();
        match event.phase {
            Phase::Begin => {
                controller.begin(event, cx);
            }
            Phase::Update => {
                controller.update(event, cx);
            }
            Phase::End => controller.end(event, cx),
            Phase::Cancel => controller.cancel(event, cx),
        }

        if let Some(selected) = selected {
            self.pointers = event.pointer_count();
            let engaged = self.armed.engaged();
            log::debug!(
                "{} pointer(s) in {:?}: policy {:?}, engaged {:?}",
                self.pointers,
                self.mode,
                selected,
                engaged
            );
            debug_assert!(engaged.iter().all(|kind| selected.contains(kind)));
        }
        if matches!(event.phase, Phase::End | Phase::Cancel) {
            self.pointers = 0;
        }
    }

    /// Policy inputs for the block under the event's primary pointer.
    pub fn eligibility(&self, event: &GestureEvent, cx: &GestureContext<'_>) -> Eligibility {
        let blocks = cx.store.canvas(cx.canvas_id);
        let target = match self.mode {
            Mode::Block(block) => Some(block),
            Mode::Hand => event.target.map(|t| t.block).or_else(|| {
                let transform = cx.transform.get();
                let point = transform.to_content(event.primary()?);
                let tolerance = transform.screen_dist_to_content(self.config.handle_tolerance);
                blocks?
                    .hit_test(point, tolerance)
                    .map(|(kind, id, _)| BlockRef::new(kind, id))
            }),
            Mode::Draw | Mode::Eraser => None,
        };
        let block = target.and_then(|t| blocks?.geometric(t.kind, t.id));

        Eligibility {
            moveable: block.is_some_and(|b| b.moveable()),
            resizeable: block.is_some_and(|b| b.resizeable()),
            canvas_level: self.canvas_level,
            pinch_in_ink_modes: self.config.pinch_in_ink_modes,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.armed.state()
    }

    /// Controllers actively driving the current gesture.
    pub fn engaged(&self) -> Vec<ControllerKind> {
        self.armed.engaged()
    }

    /// Stroke being drawn, for live preview.
    pub fn draft_stroke(&self) -> Option<&StrokeBlock> {
        match &self.armed {
            Armed::Ink(draw) => draw.draft(),
            Armed::InkWithCanvas(seq) => seq.first.draft(),
            Armed::Hand(_) | Armed::Block(_) => None,
        }
    }

    /// Frame of the block being dragged, for live preview.
    pub fn live_frame(&self) -> Option<(BlockRef, Frame)> {
        match &self.armed {
            Armed::Hand(hand) => hand.primary.live_frame(),
            Armed::Block(drag) => drag.live_frame(),
            Armed::Ink(_) | Armed::InkWithCanvas(_) => None,
        }
    }
}
