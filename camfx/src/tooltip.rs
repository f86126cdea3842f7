use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use crate::types::round;
use crate::{
    EffectDone, EffectQueue, ElementId, Point, Rect, Scheduler, Size, Subscription, TooltipHost,
    TooltipOptions,
};

/// Places a tooltip of size `tip` centered above `target`, kept `edge_margin` away from the
/// viewport edges.
///
/// When the viewport is too small to honor both edges, the tooltip sticks to the top/left margin.
pub fn tooltip_position(target: Rect, tip: Size, viewport: Size, options: &TooltipOptions) -> Point {
    let margin = options.edge_margin;
    let left = target.x + round((target.width - tip.width) / 2.0);
    let top = target.y - tip.height - options.gap;

    let max_left = viewport.width - tip.width - margin;
    let max_top = viewport.height - tip.height - margin;
    Point::new(left.min(max_left).max(margin), top.min(max_top).max(margin))
}

#[derive(Default)]
struct TooltipState {
    initialized: bool,
    hovers: Vec<(ElementId, Subscription)>,
    /// Element whose show sequence is running or whose tooltip is on screen.
    target: Option<ElementId>,
    visible: bool,
    exit: Option<Subscription>,
}

struct TooltipShared {
    host: Rc<dyn TooltipHost>,
    scheduler: Rc<dyn Scheduler>,
    options: TooltipOptions,
    queue: EffectQueue,
    state: RefCell<TooltipState>,
}

/// Shows a shared tooltip surface for hovered, labeled elements.
///
/// Show sequences run through an [`EffectQueue`], so hovering several elements in quick
/// succession never interleaves writes to the tooltip.
#[derive(Clone)]
pub struct TooltipManager {
    shared: Rc<TooltipShared>,
}

impl TooltipManager {
    pub fn new(
        host: Rc<dyn TooltipHost>,
        scheduler: Rc<dyn Scheduler>,
        options: TooltipOptions,
    ) -> Self {
        Self {
            shared: Rc::new(TooltipShared {
                host,
                scheduler,
                options,
                queue: EffectQueue::new(),
                state: RefCell::new(TooltipState::default()),
            }),
        }
    }

    pub fn options(&self) -> &TooltipOptions {
        &self.shared.options
    }

    /// Attaches a hover trigger to every labeled element. Only the first call scans the document.
    pub fn initialize(&self) {
        if self.shared.state.borrow().initialized {
            return;
        }
        let elements = self.shared.host.labeled_elements();
        fx_debug!(count = elements.len(), "TooltipManager::initialize");

        let mut hovers = Vec::with_capacity(elements.len());
        for element in elements {
            hovers.push((element, self.shared.subscribe_hover(element)));
        }

        let mut state = self.shared.state.borrow_mut();
        state.initialized = true;
        state.hovers.extend(hovers);
    }

    /// Attaches a hover trigger to an element added after [`TooltipManager::initialize`].
    pub fn track(&self, element: ElementId) {
        if self.is_tracked(element) {
            return;
        }
        let subscription = self.shared.subscribe_hover(element);
        self.shared
            .state
            .borrow_mut()
            .hovers
            .push((element, subscription));
    }

    /// Detaches the hover trigger of `element`, e.g. before it is removed from the document.
    pub fn untrack(&self, element: ElementId) {
        let removed = {
            let mut state = self.shared.state.borrow_mut();
            let pos = state.hovers.iter().position(|(e, _)| *e == element);
            pos.map(|i| state.hovers.swap_remove(i).1)
        };
        if let Some(subscription) = removed {
            subscription.unsubscribe();
        }
        if self.shared.state.borrow().target == Some(element) {
            self.shared.hide();
        }
    }

    pub fn is_tracked(&self, element: ElementId) -> bool {
        self.shared
            .state
            .borrow()
            .hovers
            .iter()
            .any(|(e, _)| *e == element)
    }

    /// Queues a show sequence for `element`, as a hover would.
    pub fn show(&self, element: ElementId) {
        self.shared.enqueue_show(element);
    }

    /// Hides the tooltip immediately.
    pub fn hide(&self) {
        self.shared.hide();
    }

    pub fn is_visible(&self) -> bool {
        self.shared.state.borrow().visible
    }

    /// The element the tooltip currently describes.
    pub fn current(&self) -> Option<ElementId> {
        let state = self.shared.state.borrow();
        if state.visible { state.target } else { None }
    }

    /// Whether show sequences are running or waiting.
    pub fn is_busy(&self) -> bool {
        !self.shared.queue.is_idle()
    }

    /// Detaches every trigger and hides the tooltip. A later `initialize` scans again.
    pub fn dispose(&self) {
        let hovers = {
            let mut state = self.shared.state.borrow_mut();
            state.initialized = false;
            core::mem::take(&mut state.hovers)
        };
        for (_, subscription) in hovers {
            subscription.unsubscribe();
        }
        self.shared.hide();
    }
}

impl TooltipShared {
    fn subscribe_hover(self: &Rc<Self>, element: ElementId) -> Subscription {
        let weak = Rc::downgrade(self);
        self.host.on_hover(
            element,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.enqueue_show(element);
                }
            }),
        )
    }

    fn enqueue_show(self: &Rc<Self>, element: ElementId) {
        let weak = Rc::downgrade(self);
        self.queue.enqueue(move |done| match weak.upgrade() {
            Some(shared) => shared.run_show(element, done),
            None => done.finish(),
        });
    }

    fn run_show(self: &Rc<Self>, element: ElementId, done: EffectDone) {
        self.hide();
        let Some(label) = self.host.label(element) else {
            fx_debug!(?element, "TooltipManager: element has no label");
            done.finish();
            return;
        };
        fx_trace!(?element, "TooltipManager: show");

        self.host.set_tooltip_text(&label);

        // Leaving the element before the reveal cancels the pending show.
        let exit = {
            let weak = Rc::downgrade(self);
            self.host.on_hover_exit(
                element,
                Box::new(move || {
                    if let Some(shared) = weak.upgrade() {
                        shared.hide_for(element);
                    }
                }),
            )
        };
        {
            let mut state = self.state.borrow_mut();
            state.target = Some(element);
            state.exit = Some(exit);
        }

        let weak: Weak<TooltipShared> = Rc::downgrade(self);
        self.scheduler.defer(Box::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.reveal(element);
            }
            done.finish();
        }));
    }

    fn reveal(&self, element: ElementId) {
        if self.state.borrow().target != Some(element) {
            fx_trace!(?element, "TooltipManager: show cancelled before reveal");
            return;
        }
        let position = tooltip_position(
            self.host.bounds(element),
            self.host.tooltip_size(),
            self.host.viewport_size(),
            &self.options,
        );
        self.host.set_tooltip_position(position);
        self.host.set_tooltip_visible(true);
        self.state.borrow_mut().visible = true;
    }

    fn hide_for(&self, element: ElementId) {
        if self.state.borrow().target == Some(element) {
            self.hide();
        }
    }

    fn hide(&self) {
        let (exit, was_visible) = {
            let mut state = self.state.borrow_mut();
            state.target = None;
            (state.exit.take(), core::mem::replace(&mut state.visible, false))
        };
        if let Some(exit) = exit {
            exit.unsubscribe();
        }
        if was_visible {
            self.host.set_tooltip_visible(false);
        }
    }
}

impl Drop for TooltipShared {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        for (_, subscription) in state.hovers.drain(..) {
            subscription.unsubscribe();
        }
        if let Some(exit) = state.exit.take() {
            exit.unsubscribe();
        }
    }
}

impl fmt::Debug for TooltipManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.borrow();
        f.debug_struct("TooltipManager")
            .field("options", &self.shared.options)
            .field("tracked", &state.hovers.len())
            .field("target", &state.target)
            .field("visible", &state.visible)
            .field("queue", &self.shared.queue)
            .finish()
    }
}
