//! Input model: raw mouse/touch events, the unified pointer stream, and the
//! drag state machine.
//!
//! Hosts translate DOM events into [`MouseEvent`] or [`TouchEvent`]. The two
//! adapters, [`MouseEvent::to_pointer`] and [`TouchEvent::to_pointer`], turn
//! them into a single source-tagged [`PointerEvent`] stream consumed by the
//! engine, so the drag math exists once.
//!
//! `InputState` is the active gesture tracked between pointer-down and
//! pointer-up. A drag remembers which source opened it; while it is active
//! the other source is ignored, which keeps mouse and touch mutually
//! exclusive as one logical pointer.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::viewport::Point;

/// Which device produced a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSource {
    Mouse,
    Touch,
}

/// Source-agnostic pointer event. Positions are in client (CSS) pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Press / first touch.
    Down { source: PointerSource, pos: Point },
    /// Movement while the pointer may be pressed.
    Move { source: PointerSource, pos: Point },
    /// Release / last touch lifted.
    Up { source: PointerSource },
    /// The platform aborted the gesture.
    Cancel { source: PointerSource },
}

impl PointerEvent {
    #[must_use]
    pub fn source(&self) -> PointerSource {
        match *self {
            Self::Down { source, .. } | Self::Move { source, .. } | Self::Up { source } | Self::Cancel { source } => {
                source
            }
        }
    }
}

// =============================================================
// Mouse adapter
// =============================================================

/// Phase of a mouse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseKind {
    Down,
    Move,
    Up,
}

/// A mouse event as reported by the host, in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    pub kind: MouseKind,
    pub client: Point,
}

impl MouseEvent {
    #[must_use]
    pub fn new(kind: MouseKind, client: Point) -> Self {
        Self { kind, client }
    }

    #[must_use]
    pub fn to_pointer(&self) -> PointerEvent {
        let source = PointerSource::Mouse;
        match self.kind {
            MouseKind::Down => PointerEvent::Down { source, pos: self.client },
            MouseKind::Move => PointerEvent::Move { source, pos: self.client },
            MouseKind::Up => PointerEvent::Up { source },
        }
    }
}

// =============================================================
// Touch adapter
// =============================================================

/// Phase of a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchKind {
    Start,
    Move,
    End,
    Cancel,
}

/// A touch event with the currently active touch points, in client
/// coordinates. Only the first touch is used; pinch is not supported.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchEvent {
    pub kind: TouchKind,
    pub touches: Vec<Point>,
}

impl TouchEvent {
    #[must_use]
    pub fn new(kind: TouchKind, touches: Vec<Point>) -> Self {
        Self { kind, touches }
    }

    /// Map to a pointer event. Start/move without any active touch yield
    /// nothing.
    #[must_use]
    pub fn to_pointer(&self) -> Option<PointerEvent> {
        let source = PointerSource::Touch;
        match self.kind {
            TouchKind::Start => self.touches.first().map(|&pos| PointerEvent::Down { source, pos }),
            TouchKind::Move => self.touches.first().map(|&pos| PointerEvent::Move { source, pos }),
            TouchKind::End => Some(PointerEvent::Up { source }),
            TouchKind::Cancel => Some(PointerEvent::Cancel { source }),
        }
    }
}

// =============================================================
// Drag state machine
// =============================================================

/// Anchor of an active drag.
///
/// `anchor` is chosen so that `offset = surface_pos - anchor` holds for
/// every pointer position during the drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    /// Device that opened the drag; other sources are ignored until it ends.
    pub source: PointerSource,
    /// Surface-space pointer position minus the offset at pointer-down.
    pub anchor: Point,
}

/// Internal state for the input state machine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The user is dragging the photo.
    Dragging(DragSession),
}

impl InputState {
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging(_))
    }

    #[must_use]
    pub fn session(&self) -> Option<DragSession> {
        match *self {
            Self::Idle => None,
            Self::Dragging(session) => Some(session),
        }
    }
}
