use glam::Vec2;
use tracing::trace;

/// A high-level interaction event produced by [`DragTracker`].
///
/// The animation director consumes these events, never raw window events.
/// Pressing without moving is not an interaction and produces neither
/// variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionEvent {
    /// The pointer moved while pressed for the first time since the press.
    Started,
    /// A drag that previously started was released.
    Ended,
}

/// Pointer shape the shell should present over the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorHint {
    /// Resting over the model: invite a drag.
    Grab,
    /// Button held down.
    Grabbing,
}

/// Turns raw pointer press/move/release into drag deltas and exactly-once
/// [`InteractionEvent`]s.
///
/// A drag begins on the first motion after a press, not on the press
/// itself, and ends on release. Every `Started` is eventually paired with
/// exactly one `Ended` as long as the shell forwards releases (including
/// synthetic ones for focus loss).
#[derive(Debug, Default)]
pub struct DragTracker {
    pressed: bool,
    dragging: bool,
    events: Vec<InteractionEvent>,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Primary button went down. Arms the tracker; no event until motion.
    pub fn on_press(&mut self) {
        self.pressed = true;
    }

    /// Pointer motion. Returns the delta to apply to the camera while a
    /// drag is active, `None` otherwise.
    pub fn on_move(&mut self, delta: Vec2) -> Option<Vec2> {
        if !self.pressed {
            return None;
        }
        if !self.dragging {
            self.dragging = true;
            self.events.push(InteractionEvent::Started);
            trace!("drag started");
        }
        Some(delta)
    }

    /// Primary button released. Emits `Ended` only for drags that started.
    pub fn on_release(&mut self) {
        if self.dragging {
            self.events.push(InteractionEvent::Ended);
            trace!("drag ended");
        }
        self.pressed = false;
        self.dragging = false;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn cursor_hint(&self) -> CursorHint {
        if self.pressed {
            CursorHint::Grabbing
        } else {
            CursorHint::Grab
        }
    }

    /// Take all pending events in emission order.
    pub fn drain_events(&mut self) -> Vec<InteractionEvent> {
        std::mem::take(&mut self.events)
    }
}
