use alloc::rc::Rc;
use core::fmt;

use camfx::{
    InputSource, Point, PointerTracker, Scheduler, ScrollMode, ScrollProbe, ScrollSurface,
    ScrollTracker, ScrollTrackerCallbacks, ScrollTrackerOptions, ScrollerOptions, SmoothScroller,
    TransitionEvents,
};

/// Configuration for [`ScrollController`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ControllerOptions {
    pub scroller: ScrollerOptions,
    pub tracker: ScrollTrackerOptions,
}

/// A framework-neutral controller for one scrollable strip.
///
/// It wires a [`SmoothScroller`] to a [`ScrollTracker`] that samples it, and a
/// [`PointerTracker`] fed by the same input source. This type does not hold any UI objects;
/// adapters hand it the host collaborators once and then call:
/// - `scroll_to` / `scroll_by` for programmatic scrolling
/// - `is_scrolling` / `delta` to react to user scrolling
///
/// Polling starts on construction. Call [`ScrollController::dispose`] before the surface goes
/// away to stop the poll and detach the input listeners.
#[derive(Clone)]
pub struct ScrollController {
    scroller: SmoothScroller,
    tracker: ScrollTracker,
    pointer: PointerTracker,
}

impl ScrollController {
    pub fn new(
        surface: Rc<dyn ScrollSurface>,
        events: Rc<dyn TransitionEvents>,
        scheduler: Rc<dyn Scheduler>,
        input: &dyn InputSource,
        options: ControllerOptions,
        callbacks: ScrollTrackerCallbacks,
        on_interaction: impl Fn() + 'static,
    ) -> Self {
        let scroller =
            SmoothScroller::new(surface, events, Rc::clone(&scheduler), options.scroller);
        let probe: Rc<dyn ScrollProbe> = Rc::new(scroller.clone());
        let tracker = ScrollTracker::new(probe, scheduler, options.tracker, callbacks);
        tracker.attach_input(input);
        tracker.start();

        let pointer = PointerTracker::new(on_interaction);
        pointer.attach(input);

        Self {
            scroller,
            tracker,
            pointer,
        }
    }

    pub fn scroller(&self) -> &SmoothScroller {
        &self.scroller
    }

    pub fn tracker(&self) -> &ScrollTracker {
        &self.tracker
    }

    pub fn pointer(&self) -> &PointerTracker {
        &self.pointer
    }

    pub fn scroll_to(&self, x: f32, y: f32, mode: ScrollMode) {
        self.scroller.scroll_to(x, y, mode);
    }

    /// Scrolls relative to the logical position, in-flight animation included.
    pub fn scroll_by(&self, dx: f32, dy: f32, mode: ScrollMode) {
        let from = self.scroller.position();
        self.scroller.scroll_to(from.x + dx, from.y + dy, mode);
    }

    pub fn position(&self) -> Point {
        self.scroller.position()
    }

    pub fn is_animating(&self) -> bool {
        self.scroller.is_animating()
    }

    pub fn is_scrolling(&self) -> bool {
        self.tracker.is_scrolling()
    }

    pub fn delta(&self) -> Point {
        self.tracker.delta()
    }

    /// Stops polling, detaches the input listeners and commits any in-flight animation.
    pub fn dispose(&self) {
        self.tracker.stop();
        self.tracker.detach_input();
        self.pointer.detach();
        if self.scroller.is_animating() {
            self.scroller.flush();
        }
    }
}

impl fmt::Debug for ScrollController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollController")
            .field("scroller", &self.scroller)
            .field("tracker", &self.tracker)
            .field("pointer", &self.pointer)
            .finish()
    }
}
