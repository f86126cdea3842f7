//! Traits implemented by the embedding UI layer.
//!
//! Every method takes `&self`: hosts are expected to use interior mutability the way a DOM binding
//! does, and must never hold an internal borrow while invoking a callback handed to them.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::{ElementId, InputEvent, Point, Rect, Size, SurfaceId, TimerId};

/// A listener registration.
///
/// Call [`Subscription::unsubscribe`] to detach the listener. Dropping the handle leaves the
/// listener attached.
#[must_use = "dropping a Subscription leaves the listener attached"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to detach.
    pub fn empty() -> Self {
        Self { cancel: None }
    }

    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("attached", &self.cancel.is_some())
            .finish()
    }
}

/// Timer primitives of a single-threaded event loop.
pub trait Scheduler {
    fn now_ms(&self) -> u64;

    /// Runs `f` once after `delay_ms`.
    fn set_timeout(&self, delay_ms: u64, f: Box<dyn FnOnce()>) -> TimerId;

    /// Runs `f` every `period_ms` until cleared.
    fn set_interval(&self, period_ms: u64, f: Box<dyn FnMut()>) -> TimerId;

    /// Clears a timeout or an interval. Unknown or already-fired ids are ignored.
    fn clear(&self, id: TimerId);

    /// Runs `f` on the next tick, after the current task (and pending layout) has settled.
    fn defer(&self, f: Box<dyn FnOnce()>) -> TimerId {
        self.set_timeout(0, f)
    }
}

/// A scrollable surface whose offset can be animated with a positional transform.
pub trait ScrollSurface {
    fn id(&self) -> SurfaceId;

    /// Raw `(scrollLeft, scrollTop)`, ignoring any transform.
    fn scroll_position(&self) -> Point;
    fn set_scroll_position(&self, position: Point);

    /// Content extent (`scrollWidth`, `scrollHeight`).
    fn scroll_size(&self) -> Size;
    /// Visible extent (`clientWidth`, `clientHeight`).
    fn client_size(&self) -> Size;

    /// The translation currently rendered, mid-transition values included.
    fn rendered_transform(&self) -> Point;

    /// Transitions the translation toward `offset` over `duration_ms` (`0` applies it at once).
    fn set_transform(&self, offset: Point, duration_ms: u64);
}

/// "Transition finished" notifications scoped to a surface.
pub trait TransitionEvents {
    /// Registers a one-shot listener for the next finished transition on `surface`.
    fn on_transition_end(&self, surface: SurfaceId, f: Box<dyn FnOnce()>) -> Subscription;
}

/// Press/move/release notifications tagged with their modality.
pub trait InputSource {
    fn subscribe(&self, f: Box<dyn FnMut(&InputEvent)>) -> Subscription;
}

/// Document access needed by [`crate::TooltipManager`].
pub trait TooltipHost {
    /// Elements carrying a tooltip label, in document order.
    fn labeled_elements(&self) -> Vec<ElementId>;
    fn label(&self, element: ElementId) -> Option<String>;
    /// Bounding box in viewport coordinates.
    fn bounds(&self, element: ElementId) -> Rect;
    fn viewport_size(&self) -> Size;

    fn set_tooltip_text(&self, text: &str);
    /// Measured tooltip size; valid after layout has settled.
    fn tooltip_size(&self) -> Size;
    fn set_tooltip_position(&self, position: Point);
    fn set_tooltip_visible(&self, visible: bool);

    fn on_hover(&self, element: ElementId, f: Box<dyn FnMut()>) -> Subscription;
    /// Registers a one-shot listener fired when the pointer leaves `element`.
    fn on_hover_exit(&self, element: ElementId, f: Box<dyn FnOnce()>) -> Subscription;
}
