//! In-flight drag tracking.
//!
//! At most one drag is active at a time. The tracker only records where the
//! card came from and where it would land; committing the move is left to
//! the caller via the [`MoveRequest`] returned from [`DragTracker::drop`].

use serde::Serialize;
use tracing::debug;

use super::board_ops::MoveRequest;
use super::drop_position::DropGeometry;

/// Where a dragged card would land if released now
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropTarget {
    pub column_id: String,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum DragSession {
    #[default]
    Idle,
    Dragging {
        card_id: String,
        source_column: String,
        source_index: usize,
        target: Option<DropTarget>,
    },
}

impl DragSession {
    pub fn is_dragging(&self) -> bool {
        matches!(self, DragSession::Dragging { .. })
    }

    pub fn target(&self) -> Option<&DropTarget> {
        match self {
            DragSession::Dragging { target, .. } => target.as_ref(),
            DragSession::Idle => None,
        }
    }
}

/// A point in the same coordinate space as a drop surface's bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Bounding rectangle of a drop surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left
            && p.x < self.left + self.width
            && p.y >= self.top
            && p.y < self.top + self.height
    }
}

#[derive(Debug, Clone, Default)]
pub struct DragTracker {
    session: DragSession,
    geometry: DropGeometry,
}

impl DragTracker {
    pub fn new(geometry: DropGeometry) -> Self {
        DragTracker {
            session: DragSession::Idle,
            geometry,
        }
    }

    pub fn session(&self) -> &DragSession {
        &self.session
    }

    pub fn geometry(&self) -> DropGeometry {
        self.geometry
    }

    /// Begin dragging a card. Ignored while another drag is in flight.
    pub fn start(&mut self, card_id: &str, column_id: &str, index: usize) -> bool {
        if self.session.is_dragging() {
            return false;
        }
        debug!(card = card_id, column = column_id, index, "drag start");
        self.session = DragSession::Dragging {
            card_id: card_id.to_string(),
            source_column: column_id.to_string(),
            source_index: index,
            target: None,
        };
        true
    }

    /// Pointer moved over a column's card list. Returns true if the
    /// candidate target changed.
    pub fn over(&mut self, column_id: &str, offset_y: f64, card_count: usize) -> bool {
        let DragSession::Dragging { target, .. } = &mut self.session else {
            return false;
        };
        let candidate = DropTarget {
            column_id: column_id.to_string(),
            index: self.geometry.drop_index(offset_y, card_count),
        };
        if target.as_ref() == Some(&candidate) {
            return false;
        }
        *target = Some(candidate);
        true
    }

    /// Pointer left a column's surface. Moving between children inside the
    /// surface also fires a leave, so the target is only cleared once the
    /// pointer is actually outside `bounds`.
    pub fn leave(&mut self, column_id: &str, pointer: Point, bounds: Rect) -> bool {
        let DragSession::Dragging { target, .. } = &mut self.session else {
            return false;
        };
        if bounds.contains(pointer) {
            return false;
        }
        match target {
            Some(t) if t.column_id == column_id => {
                *target = None;
                true
            }
            _ => false,
        }
    }

    /// Release over `column_id`. Ends the session and yields the move to
    /// commit, if the drag had a candidate target.
    pub fn drop(&mut self, column_id: &str) -> Option<MoveRequest> {
        match std::mem::take(&mut self.session) {
            DragSession::Dragging {
                card_id,
                source_column,
                source_index,
                target: Some(target),
            } => {
                if target.column_id != column_id {
                    debug!(
                        surface = column_id,
                        candidate = %target.column_id,
                        "drop surface differs from candidate target"
                    );
                }
                Some(MoveRequest {
                    card_id,
                    source_column,
                    source_index,
                    target_column: target.column_id,
                    target_index: target.index,
                })
            }
            _ => None,
        }
    }

    /// Drag finished without a drop (cancelled). Returns true if a session
    /// was discarded.
    pub fn end(&mut self) -> bool {
        let was_dragging = self.session.is_dragging();
        if was_dragging {
            debug!("drag cancelled");
        }
        self.session = DragSession::Idle;
        was_dragging
    }
}
