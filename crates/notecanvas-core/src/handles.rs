//! Drag and resize handles on framed blocks.

use crate::blocks::Frame;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Handle hit radius in screen pixels.
pub const HANDLE_HIT_TOLERANCE: f64 = 24.0;

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Edge positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// Part of a block a one-finger gesture grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handle {
    /// The block body: moves the whole block.
    Body,
    Edge(Edge),
    Corner(Corner),
}

/// Which side of an axis a handle drags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grip {
    /// The axis is not resized by this handle.
    None,
    /// Left or top side: the origin moves, the far side stays.
    Start,
    /// Right or bottom side: the origin stays.
    End,
}

impl Handle {
    /// The eight resize handles, corners first.
    pub const RESIZE: [Handle; 8] = [
        Handle::Corner(Corner::TopLeft),
        Handle::Corner(Corner::TopRight),
        Handle::Corner(Corner::BottomLeft),
        Handle::Corner(Corner::BottomRight),
        Handle::Edge(Edge::Top),
        Handle::Edge(Edge::Right),
        Handle::Edge(Edge::Bottom),
        Handle::Edge(Edge::Left),
    ];

    pub fn is_resize(self) -> bool {
        self != Handle::Body
    }

    pub fn horizontal(self) -> Grip {
        match self {
            Handle::Corner(Corner::TopLeft | Corner::BottomLeft) | Handle::Edge(Edge::Left) => Grip::Start,
            Handle::Corner(Corner::TopRight | Corner::BottomRight) | Handle::Edge(Edge::Right) => Grip::End,
            Handle::Body | Handle::Edge(Edge::Top | Edge::Bottom) => Grip::None,
        }
    }

    pub fn vertical(self) -> Grip {
        match self {
            Handle::Corner(Corner::TopLeft | Corner::TopRight) | Handle::Edge(Edge::Top) => Grip::Start,
            Handle::Corner(Corner::BottomLeft | Corner::BottomRight) | Handle::Edge(Edge::Bottom) => Grip::End,
            Handle::Body | Handle::Edge(Edge::Left | Edge::Right) => Grip::None,
        }
    }

    /// Where this handle sits on a frame, in content space.
    pub fn position(self, frame: Frame) -> Point {
        let rect = frame.rect();
        let center = rect.center();
        let x = match self.horizontal() {
            Grip::Start => rect.x0,
            Grip::End => rect.x1,
            Grip::None => center.x,
        };
        let y = match self.vertical() {
            Grip::Start => rect.y0,
            Grip::End => rect.y1,
            Grip::None => center.y,
        };
        Point::new(x, y)
    }
}

/// Find which handle of `frame` is under `point`.
///
/// Resize handles win over the body so they stay reachable on small blocks.
/// `tolerance` is in content units (screen tolerance divided by scale).
pub fn hit_test_handles(frame: Frame, point: Point, tolerance: f64, resizeable: bool) -> Option<Handle> {
    if resizeable {
        let hit = Handle::RESIZE.into_iter().find(|handle| {
            let pos = handle.position(frame);
            let dx = point.x - pos.x;
            let dy = point.y - pos.y;
            dx * dx + dy * dy <= tolerance * tolerance
        });
        if hit.is_some() {
            return hit;
        }
    }

    frame.rect().contains(point).then_some(Handle::Body)
}
