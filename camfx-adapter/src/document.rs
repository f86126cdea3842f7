use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use camfx::{ElementId, Point, Rect, Size, Subscription, TooltipHost};

/// Width of one label character in the simulated tooltip.
pub const TOOLTIP_CHAR_WIDTH: f32 = 7.0;
/// Horizontal padding plus the fixed height of the simulated tooltip.
pub const TOOLTIP_PADDING: f32 = 16.0;
pub const TOOLTIP_HEIGHT: f32 = 24.0;

#[derive(Clone, Debug)]
struct Element {
    id: ElementId,
    label: Option<String>,
    bounds: Rect,
}

/// What the simulated tooltip element currently shows.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TooltipSnapshot {
    pub text: String,
    pub position: Point,
    pub visible: bool,
}

type HoverListener = (u64, ElementId, Rc<RefCell<Box<dyn FnMut()>>>);
type ExitListener = (u64, ElementId, Box<dyn FnOnce()>);

#[derive(Default)]
struct Listeners {
    next_id: u64,
    hover: Vec<HoverListener>,
    exit: Vec<ExitListener>,
}

/// An in-memory document of positioned, optionally labeled elements and one tooltip element.
///
/// The tooltip's measured size follows its text: `TOOLTIP_CHAR_WIDTH` per character plus
/// padding, `TOOLTIP_HEIGHT` tall.
pub struct SimDocument {
    next_element: Cell<u64>,
    viewport: Cell<Size>,
    elements: RefCell<Vec<Element>>,
    tooltip: RefCell<TooltipSnapshot>,
    listeners: Rc<RefCell<Listeners>>,
}

impl SimDocument {
    pub fn new(viewport: Size) -> Self {
        Self {
            next_element: Cell::new(0),
            viewport: Cell::new(viewport),
            elements: RefCell::new(Vec::new()),
            tooltip: RefCell::new(TooltipSnapshot::default()),
            listeners: Rc::new(RefCell::new(Listeners::default())),
        }
    }

    pub fn add_element(&self, label: Option<&str>, bounds: Rect) -> ElementId {
        let id = ElementId(self.next_element.get() + 1);
        self.next_element.set(id.0);
        self.elements.borrow_mut().push(Element {
            id,
            label: label.map(ToString::to_string),
            bounds,
        });
        id
    }

    /// Removes an element. Listeners registered on it stay attached until unsubscribed.
    pub fn remove_element(&self, element: ElementId) -> bool {
        let mut elements = self.elements.borrow_mut();
        let before = elements.len();
        elements.retain(|e| e.id != element);
        elements.len() != before
    }

    pub fn set_bounds(&self, element: ElementId, bounds: Rect) {
        if let Some(e) = self.elements.borrow_mut().iter_mut().find(|e| e.id == element) {
            e.bounds = bounds;
        }
    }

    pub fn set_viewport_size(&self, viewport: Size) {
        self.viewport.set(viewport);
    }

    /// Pointer enters `element`.
    pub fn hover(&self, element: ElementId) {
        let hits: Vec<_> = self
            .listeners
            .borrow()
            .hover
            .iter()
            .filter(|(_, e, _)| *e == element)
            .map(|(_, _, f)| Rc::clone(f))
            .collect();
        for f in hits {
            let mut f = f.borrow_mut();
            (&mut *f)();
        }
    }

    /// Pointer leaves `element`; one-shot exit listeners fire and detach.
    pub fn leave(&self, element: ElementId) {
        let hits = {
            let mut listeners = self.listeners.borrow_mut();
            let all = core::mem::take(&mut listeners.exit);
            let (hits, keep): (Vec<_>, Vec<_>) =
                all.into_iter().partition(|(_, e, _)| *e == element);
            listeners.exit = keep;
            hits
        };
        for (_, _, f) in hits {
            f();
        }
    }

    pub fn tooltip(&self) -> TooltipSnapshot {
        self.tooltip.borrow().clone()
    }

    pub fn hover_listener_count(&self) -> usize {
        self.listeners.borrow().hover.len()
    }

    pub fn exit_listener_count(&self) -> usize {
        self.listeners.borrow().exit.len()
    }

    fn next_listener_id(&self) -> u64 {
        let mut listeners = self.listeners.borrow_mut();
        listeners.next_id += 1;
        listeners.next_id
    }
}

impl TooltipHost for SimDocument {
    fn labeled_elements(&self) -> Vec<ElementId> {
        self.elements
            .borrow()
            .iter()
            .filter(|e| e.label.is_some())
            .map(|e| e.id)
            .collect()
    }

    fn label(&self, element: ElementId) -> Option<String> {
        self.elements
            .borrow()
            .iter()
            .find(|e| e.id == element)
            .and_then(|e| e.label.clone())
    }

    fn bounds(&self, element: ElementId) -> Rect {
        self.elements
            .borrow()
            .iter()
            .find(|e| e.id == element)
            .map_or(Rect::default(), |e| e.bounds)
    }

    fn viewport_size(&self) -> Size {
        self.viewport.get()
    }

    fn set_tooltip_text(&self, text: &str) {
        self.tooltip.borrow_mut().text = text.to_string();
    }

    fn tooltip_size(&self) -> Size {
        let chars = self.tooltip.borrow().text.chars().count();
        Size::new(
            chars as f32 * TOOLTIP_CHAR_WIDTH + TOOLTIP_PADDING,
            TOOLTIP_HEIGHT,
        )
    }

    fn set_tooltip_position(&self, position: Point) {
        self.tooltip.borrow_mut().position = position;
    }

    fn set_tooltip_visible(&self, visible: bool) {
        self.tooltip.borrow_mut().visible = visible;
    }

    fn on_hover(&self, element: ElementId, f: Box<dyn FnMut()>) -> Subscription {
        let id = self.next_listener_id();
        self.listeners
            .borrow_mut()
            .hover
            .push((id, element, Rc::new(RefCell::new(f))));
        let listeners = Rc::clone(&self.listeners);
        Subscription::new(move || listeners.borrow_mut().hover.retain(|(i, _, _)| *i != id))
    }

    fn on_hover_exit(&self, element: ElementId, f: Box<dyn FnOnce()>) -> Subscription {
        let id = self.next_listener_id();
        self.listeners.borrow_mut().exit.push((id, element, f));
        let listeners = Rc::clone(&self.listeners);
        Subscription::new(move || listeners.borrow_mut().exit.retain(|(i, _, _)| *i != id))
    }
}

impl fmt::Debug for SimDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimDocument")
            .field("viewport", &self.viewport.get())
            .field("elements", &*self.elements.borrow())
            .field("tooltip", &*self.tooltip.borrow())
            .finish()
    }
}
