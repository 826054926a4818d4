//! Recorded gesture traces and their replay.

use kurbo::Size;
use notecanvas_core::{EngineConfig, GestureEvent, Mode, Workspace, ROOT_CANVAS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Failed to read trace {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid trace: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Document error: {0}")]
    Document(#[from] notecanvas_core::DocumentError),
}

fn default_canvas() -> String {
    ROOT_CANVAS.to_string()
}

/// One recorded input step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Touch {
        /// Canvas the touch landed on; defaults to the trace's canvas.
        #[serde(default)]
        canvas: Option<String>,
        #[serde(flatten)]
        event: GestureEvent,
    },
    Mode(Mode),
    Mount {
        canvas: String,
        #[serde(default)]
        canvas_level: bool,
    },
    Undo,
    Redo,
    ResetView,
    FitView {
        width: f64,
        height: f64,
        #[serde(default)]
        padding: f64,
    },
}

/// A recorded session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trace {
    #[serde(default)]
    pub config: EngineConfig,
    /// Canvas touches go to when a step does not name one.
    #[serde(default = "default_canvas")]
    pub canvas: String,
    #[serde(default)]
    pub events: Vec<Step>,
}

impl Trace {
    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let json = fs::read_to_string(path).map_err(|source| ReplayError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }
}

/// Counters reported after a replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub touches: usize,
    pub ignored_touches: usize,
    pub undos: usize,
    pub redos: usize,
}

/// Run every step of `trace` against `workspace`.
pub fn replay(trace: &Trace, workspace: &mut Workspace) -> Summary {
    let mut summary = Summary::default();
    workspace.mount(&trace.canvas, true);

    for step in &trace.events {
        match step {
            Step::Touch { canvas, event } => {
                let canvas = canvas.as_deref().unwrap_or(&trace.canvas);
                summary.touches += 1;
                if !workspace.handle_touch(canvas, event) {
                    summary.ignored_touches += 1;
                }
            }
            Step::Mode(mode) => workspace.set_mode(*mode),
            Step::Mount { canvas, canvas_level } => workspace.mount(canvas, *canvas_level),
            Step::Undo => {
                if workspace.undo() {
                    summary.undos += 1;
                }
            }
            Step::Redo => {
                if workspace.redo() {
                    summary.redos += 1;
                }
            }
            Step::ResetView => {
                workspace.reset_view(&trace.canvas);
            }
            Step::FitView {
                width,
                height,
                padding,
            } => {
                workspace.fit_view(&trace.canvas, Size::new(*width, *height), *padding);
            }
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use notecanvas_core::StrokeBlock;

    const TRACE: &str = r#"{
        "config": { "max_undo_depth": 10 },
        "events": [
            { "touch": { "phase": "begin", "pointers": [{ "x": 0, "y": 0 }] } },
            { "touch": { "phase": "update", "pointers": [{ "x": 10, "y": 0 }], "translation": { "x": 10, "y": 0 } } },
            { "touch": { "phase": "end" } },
            { "touch": { "phase": "begin", "pointers": [{ "x": 50, "y": 50 }] } },
            { "touch": { "phase": "end" } },
            { "mode": "hand" },
            { "touch": { "phase": "begin", "pointers": [{ "x": 100, "y": 100 }, { "x": 200, "y": 100 }] } },
            { "touch": { "phase": "update", "pointers": [{ "x": 50, "y": 100 }, { "x": 250, "y": 100 }] } },
            { "touch": { "phase": "end" } },
            "undo",
            "redo",
            "redo"
        ]
    }"#;

    #[test]
    fn test_replay_trace() {
        let trace = Trace::from_json(TRACE).unwrap();
        assert_eq!(trace.canvas, ROOT_CANVAS);
        assert_eq!(trace.config.max_undo_depth, Some(10));

        let mut workspace = Workspace::new(trace.config.clone());
        let summary = replay(&trace, &mut workspace);

        assert_eq!(summary.touches, 8);
        assert_eq!(summary.undos, 1);
        assert_eq!(summary.redos, 1);
        assert_eq!(workspace.store().value::<StrokeBlock>(ROOT_CANVAS).len(), 1);
        let transform = workspace.transform(ROOT_CANVAS).unwrap();
        assert!((transform.scale - 2.0).abs() < 1e-10);
        assert!((transform.translate.x + 150.0).abs() < 1e-10);
    }

    #[test]
    fn test_touch_on_unmounted_canvas_is_counted() {
        let trace = Trace::from_json(
            r#"{ "events": [
                { "touch": { "canvas": "nested", "phase": "begin", "pointers": [{ "x": 0, "y": 0 }] } },
                { "mount": { "canvas": "nested" } },
                { "touch": { "canvas": "nested", "phase": "end" } },
                "reset_view"
            ] }"#,
        )
        .unwrap();
        let mut workspace = Workspace::new(trace.config.clone());
        let summary = replay(&trace, &mut workspace);
        assert_eq!(summary.ignored_touches, 1);
        assert!(workspace.view("nested").is_some());
    }

    #[test]
    fn test_invalid_trace() {
        assert!(matches!(
            Trace::from_json(r#"{ "events": [ "jump" ] }"#),
            Err(ReplayError::Parse(_))
        ));
    }

    #[test]
    fn test_bad_scale_band_is_a_parse_error() {
        assert!(matches!(
            Trace::from_json(r#"{ "config": { "scale_band": { "min": 0, "max": 2 } } }"#),
            Err(ReplayError::Parse(_))
        ));
    }
}
