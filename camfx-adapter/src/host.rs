use alloc::rc::Rc;
use core::cell::Cell;

use camfx::{Scheduler, Size, SurfaceId, TooltipHost, TransitionEvents};

use crate::{SimClock, SimDocument, SimInput, SimSurface, SimTransitions};

/// A complete simulated host: one clock, one transition bus, one input bus and one document.
///
/// Surfaces created through [`SimHost::create_surface`] share the host's clock and transition bus,
/// so a single [`SimHost::advance`] drives every animation, timeout and poll deterministically.
#[derive(Debug)]
pub struct SimHost {
    clock: Rc<SimClock>,
    transitions: Rc<SimTransitions>,
    input: Rc<SimInput>,
    document: Rc<SimDocument>,
    next_surface: Cell<u64>,
}

impl SimHost {
    pub fn new(viewport: Size) -> Self {
        Self {
            clock: Rc::new(SimClock::new()),
            transitions: Rc::new(SimTransitions::new()),
            input: Rc::new(SimInput::new()),
            document: Rc::new(SimDocument::new(viewport)),
            next_surface: Cell::new(0),
        }
    }

    pub fn clock(&self) -> &Rc<SimClock> {
        &self.clock
    }

    pub fn transitions(&self) -> &Rc<SimTransitions> {
        &self.transitions
    }

    pub fn input(&self) -> &Rc<SimInput> {
        &self.input
    }

    pub fn document(&self) -> &Rc<SimDocument> {
        &self.document
    }

    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    pub fn advance(&self, ms: u64) {
        self.clock.advance(ms);
    }

    /// The clock as a trait object, ready to hand to core components.
    pub fn scheduler(&self) -> Rc<dyn Scheduler> {
        self.clock.clone()
    }

    pub fn events(&self) -> Rc<dyn TransitionEvents> {
        self.transitions.clone()
    }

    pub fn tooltip_host(&self) -> Rc<dyn TooltipHost> {
        self.document.clone()
    }

    pub fn create_surface(&self, content: Size, client: Size) -> Rc<SimSurface> {
        let id = SurfaceId(self.next_surface.get() + 1);
        self.next_surface.set(id.0);
        Rc::new(SimSurface::new(
            id,
            content,
            client,
            Rc::clone(&self.clock),
            Rc::clone(&self.transitions),
        ))
    }
}
