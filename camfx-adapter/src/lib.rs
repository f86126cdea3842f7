//! Adapter utilities for the `camfx` crate.
//!
//! The `camfx` crate is UI-agnostic and only talks to its host through traits. This crate
//! provides small, framework-neutral pieces commonly needed around it:
//!
//! - [`ScrollController`], which wires a smooth scroller, a scroll tracker and a pointer tracker
//!   over one surface and one input source
//! - A simulated host ([`SimHost`]): manual clock, tween-animated scroll surfaces, an in-memory
//!   document and an input bus, for tests, demos and headless runs
//!
//! This crate is intentionally framework-agnostic (no DOM/TUI bindings).
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod clock;
mod controller;
mod document;
mod host;
mod sim;
mod tween;


pub use clock::SimClock;
pub use controller::{ControllerOptions, ScrollController};
pub use document::{
    SimDocument, TOOLTIP_CHAR_WIDTH, TOOLTIP_HEIGHT, TOOLTIP_PADDING, TooltipSnapshot,
};
pub use host::SimHost;
pub use sim::{SimInput, SimSurface, SimTransitions};
pub use tween::{Easing, Tween};
