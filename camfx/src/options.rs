/// Duration of a smooth scroll transition.
pub const SMOOTH_SCROLL_DURATION_MS: u64 = 500;
/// Period of the [`crate::ScrollTracker`] poll.
pub const SCROLL_POLL_INTERVAL_MS: u64 = 100;
/// How long a stable touch scroll waits for a missing touch release.
pub const TOUCH_RELEASE_GRACE_MS: u64 = 200;

/// Configuration for [`crate::SmoothScroller`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScrollerOptions {
    pub duration_ms: u64,
    /// Resolves a smooth scroll even when the host never reports the transition as finished.
    /// A timed-out scroll commits its destination, whatever frame is rendered at that moment.
    ///
    /// `None` waits for the notification indefinitely.
    pub completion_timeout_ms: Option<u64>,
}

impl Default for ScrollerOptions {
    fn default() -> Self {
        Self {
            duration_ms: SMOOTH_SCROLL_DURATION_MS,
            completion_timeout_ms: Some(SMOOTH_SCROLL_DURATION_MS),
        }
    }
}

/// Configuration for [`crate::ScrollTracker`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScrollTrackerOptions {
    pub poll_interval_ms: u64,
    /// Grace period before a stable, still-pressed touch is treated as released.
    pub touch_grace_ms: u64,
}

impl Default for ScrollTrackerOptions {
    fn default() -> Self {
        Self {
            poll_interval_ms: SCROLL_POLL_INTERVAL_MS,
            touch_grace_ms: TOUCH_RELEASE_GRACE_MS,
        }
    }
}

/// Configuration for [`crate::TooltipManager`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TooltipOptions {
    /// Minimum distance between the tooltip and any viewport edge.
    pub edge_margin: f32,
    /// Vertical space between the tooltip and the element it describes.
    pub gap: f32,
}

impl Default for TooltipOptions {
    fn default() -> Self {
        Self {
            edge_margin: 5.0,
            gap: 8.0,
        }
    }
}
