//! Engine configuration.

use crate::blocks::InkStyle;
use crate::handles::HANDLE_HIT_TOLERANCE;
use crate::transform::ScaleBand;
use serde::{Deserialize, Serialize};

/// Tunables for the gesture engine and history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Allowed canvas scale range, enforced for every transform write.
    pub scale_band: ScaleBand,
    /// Maximum undo entries kept (`None` = unbounded, oldest evicted first).
    pub max_undo_depth: Option<usize>,
    /// Pen used for new strokes.
    pub ink: InkStyle,
    /// Handle hit radius in screen pixels.
    pub handle_tolerance: f64,
    /// Let two fingers pinch/pan the canvas while in Draw or Eraser mode.
    /// The in-flight stroke is still discarded when the second finger lands.
    pub pinch_in_ink_modes: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scale_band: ScaleBand::default(),
            max_undo_depth: None,
            ink: InkStyle::default(),
            handle_tolerance: HANDLE_HIT_TOLERANCE,
            pinch_in_ink_modes: false,
        }
    }
}
