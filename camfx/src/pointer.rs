use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};
use core::fmt;

use crate::{InputEvent, InputPhase, InputSource, Modality, Point, Subscription};

struct PointerShared {
    on_interaction: Box<dyn Fn()>,
    last_mouse: Cell<Option<Point>>,
    subscription: RefCell<Option<Subscription>>,
}

/// Raises a single "interaction detected" signal for presses and real pointer movement.
///
/// Layout and scroll reflows can make the platform report a mouse move at an unchanged screen
/// position; those are suppressed by comparing against the last recorded mouse coordinates.
#[derive(Clone)]
pub struct PointerTracker {
    shared: Rc<PointerShared>,
}

impl PointerTracker {
    pub fn new(on_interaction: impl Fn() + 'static) -> Self {
        Self {
            shared: Rc::new(PointerShared {
                on_interaction: Box::new(on_interaction),
                last_mouse: Cell::new(None),
                subscription: RefCell::new(None),
            }),
        }
    }

    /// Last recorded mouse position, if any mouse press or move has been seen.
    pub fn last_mouse(&self) -> Option<Point> {
        self.shared.last_mouse.get()
    }

    /// Applies one input notification. Returns whether it was signaled as an interaction.
    pub fn handle(&self, event: &InputEvent) -> bool {
        let signal = match (event.phase, event.modality) {
            (InputPhase::Release, _) => false,
            (InputPhase::Press, Modality::Mouse) => {
                self.shared.last_mouse.set(Some(event.screen));
                true
            }
            (InputPhase::Move, Modality::Mouse) => {
                if self.shared.last_mouse.get() == Some(event.screen) {
                    false
                } else {
                    self.shared.last_mouse.set(Some(event.screen));
                    true
                }
            }
            (InputPhase::Press | InputPhase::Move, Modality::Touch) => true,
        };

        if signal {
            fx_trace!(?event, "PointerTracker: interaction");
            (self.shared.on_interaction)();
        }
        signal
    }

    /// Follows `source`, replacing any previous source.
    pub fn attach(&self, source: &dyn InputSource) {
        self.detach();
        let weak = Rc::downgrade(&self.shared);
        let subscription = source.subscribe(Box::new(move |event: &InputEvent| {
            if let Some(shared) = weak.upgrade() {
                PointerTracker { shared }.handle(event);
            }
        }));
        *self.shared.subscription.borrow_mut() = Some(subscription);
    }

    pub fn detach(&self) {
        let subscription = self.shared.subscription.borrow_mut().take();
        if let Some(subscription) = subscription {
            subscription.unsubscribe();
        }
    }
}

impl Drop for PointerShared {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.get_mut().take() {
            subscription.unsubscribe();
        }
    }
}

impl fmt::Debug for PointerTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerTracker")
            .field("last_mouse", &self.last_mouse())
            .field("attached", &self.shared.subscription.borrow().is_some())
            .finish()
    }
}
