use crate::{AnimationToken, Point, PressState};

/// A lightweight, serializable snapshot of a [`crate::SmoothScroller`].
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollerState {
    /// Logical position, in-flight animation included.
    pub position: Point,
    pub max_scroll: Point,
    pub animating: bool,
    pub token: AnimationToken,
}

/// A lightweight, serializable snapshot of a [`crate::ScrollTracker`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackerState {
    pub scrolling: bool,
    pub start: Point,
    pub last: Point,
    pub pressed: PressState,
    pub touch_grace_armed: bool,
    pub polling: bool,
}
