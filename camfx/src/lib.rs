//! A headless toolkit for coordinating asynchronous visual effects.
//!
//! For a simulated host (manual clock, in-memory surfaces and documents), see the
//! `camfx-adapter` crate.
//!
//! The building blocks:
//! - [`EffectQueue`] runs effect closures strictly one after another.
//! - [`StyleEffect`] keeps only the latest invocation's completion callback.
//! - [`CompletionWaiter`] waits for a "transition finished" notification with a timeout.
//! - [`SmoothScroller`] animates a viewport's offset and discards superseded completions by token.
//! - [`ScrollTracker`] infers scroll start/end from polled samples and press state.
//! - [`PointerTracker`] turns noisy pointer notifications into interaction signals.
//! - [`TooltipManager`] serializes tooltip show sequences through an [`EffectQueue`].
//!
//! It is UI-agnostic. A DOM/TUI/GPU layer is expected to provide (see [`host`]):
//! - scroll surfaces that can apply a transitioned transform
//! - "transition finished" notifications
//! - timers and a deferred-call primitive
//! - pointer/touch input and element geometry
//!
//! Everything is single-threaded: shared state lives behind `Rc<RefCell<_>>` handles and
//! callbacks are always invoked with no internal borrow held.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod effect_queue;
pub mod host;
mod options;
mod pointer;
mod scroller;
mod state;
mod style_effect;
mod tooltip;
mod tracker;
mod types;
mod waiter;

#[cfg(test)]
mod tests;

pub use effect_queue::{EffectDone, EffectQueue};
pub use host::{
    InputSource, Scheduler, ScrollSurface, Subscription, TooltipHost, TransitionEvents,
};
pub use options::{
    SCROLL_POLL_INTERVAL_MS, SMOOTH_SCROLL_DURATION_MS, ScrollTrackerOptions, ScrollerOptions,
    TOUCH_RELEASE_GRACE_MS, TooltipOptions,
};
pub use pointer::PointerTracker;
pub use scroller::SmoothScroller;
pub use state::{ScrollerState, TrackerState};
pub use style_effect::StyleEffect;
pub use tooltip::{TooltipManager, tooltip_position};
pub use tracker::{ScrollProbe, ScrollTracker, ScrollTrackerCallbacks};
pub use types::{
    AnimationToken, ElementId, InputEvent, InputPhase, Modality, Point, PressState, Rect,
    ScrollMode, ScrollSample, Size, SurfaceId, TimerId,
};
pub use waiter::{CompletionWaiter, WaitHandle, WaitOutcome};
