//! Drag tracking and swipe classification for a single card.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_SWIPE_THRESHOLD_PX, LIFTED_SCALE, MAX_ROTATION_DEG, RESTING_SCALE, ROTATION_PER_PX,
};
use crate::models::SwipeAction;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn offset_from(self, origin: Point) -> Point {
        Point::new(self.x - origin.x, self.y - origin.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureState {
    pub is_dragging: bool,
    pub drag_offset: Point,
    /// Degrees, positive is clockwise.
    pub rotation: f64,
    pub scale: f64,
}

impl GestureState {
    /// Card at rest in the center.
    pub const IDLE: GestureState = GestureState {
        is_dragging: false,
        drag_offset: Point::ORIGIN,
        rotation: 0.0,
        scale: RESTING_SCALE,
    };
}

impl Default for GestureState {
    fn default() -> Self {
        Self::IDLE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    Swiped(SwipeAction),
    /// Released short of every threshold; the card springs back.
    Cancelled,
}

/// Card rotation for a horizontal drag distance.
pub fn rotation_for(delta_x: f64) -> f64 {
    (delta_x * ROTATION_PER_PX).clamp(-MAX_ROTATION_DEG, MAX_ROTATION_DEG)
}

/// Classify a released drag.
///
/// Horizontal travel is checked first, so a diagonal drag past both
/// thresholds is a like or pass, never a superlike. Screen y grows downward,
/// so an upward drag has a negative `delta.y`.
pub fn classify(delta: Point, threshold: f64) -> Option<SwipeAction> {
    if delta.x.abs() >= threshold {
        if delta.x > 0.0 {
            Some(SwipeAction::Like)
        } else {
            Some(SwipeAction::Pass)
        }
    } else if delta.y <= -threshold {
        Some(SwipeAction::Superlike)
    } else {
        None
    }
}

#[derive(Debug, Clone)]
pub struct GestureTracker {
    threshold: f64,
    origin: Option<Point>,
    state: GestureState,
}

impl Default for GestureTracker {
    fn default() -> Self {
        Self::new(DEFAULT_SWIPE_THRESHOLD_PX)
    }
}

impl GestureTracker {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            origin: None,
            state: GestureState::IDLE,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        self.origin.is_some()
    }

    /// Pointer down. Restarts any drag already in progress.
    pub fn start(&mut self, at: Point) {
        self.origin = Some(at);
        self.state = GestureState {
            is_dragging: true,
            drag_offset: Point::ORIGIN,
            rotation: 0.0,
            scale: LIFTED_SCALE,
        };
    }

    /// Touch start. Only the first touch point is followed.
    pub fn touch_start(&mut self, touches: &[Point]) -> bool {
        match touches.first() {
            Some(first) => {
                self.start(*first);
                true
            }
            None => false,
        }
    }

    /// Pointer move. Ignored when no drag is active.
    pub fn move_to(&mut self, at: Point) -> GestureState {
        if let Some(origin) = self.origin {
            let offset = at.offset_from(origin);
            self.state = GestureState {
                is_dragging: true,
                drag_offset: offset,
                rotation: rotation_for(offset.x),
                scale: LIFTED_SCALE,
            };
        }
        self.state
    }

    pub fn touch_move(&mut self, touches: &[Point]) -> GestureState {
        match touches.first() {
            Some(first) => self.move_to(*first),
            None => self.state,
        }
    }

    /// Pointer up at the last reported position.
    pub fn end(&mut self) -> GestureOutcome {
        let outcome = match self.origin {
            Some(_) => classify(self.state.drag_offset, self.threshold)
                .map_or(GestureOutcome::Cancelled, GestureOutcome::Swiped),
            None => GestureOutcome::Cancelled,
        };
        self.reset();
        outcome
    }

    /// Pointer up at `at`, applying it as a final move first.
    pub fn end_at(&mut self, at: Point) -> GestureOutcome {
        self.move_to(at);
        self.end()
    }

    /// Abandon the drag without classifying it.
    pub fn cancel(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.origin = None;
        self.state = GestureState::IDLE;
    }
}
