// Example: only the latest style change reports completion.
use std::cell::RefCell;
use std::rc::Rc;

use camfx::{EffectDone, StyleEffect};

fn main() {
    let in_flight: Rc<RefCell<Vec<(f32, EffectDone)>>> = Rc::new(RefCell::new(Vec::new()));

    let sink = Rc::clone(&in_flight);
    let opacity = StyleEffect::new(move |value: f32, done| {
        println!("apply opacity={value}");
        sink.borrow_mut().push((value, done));
    });

    opacity.invoke(0.0, || println!("callback for 0.0"));
    opacity.invoke(1.0, || println!("callback for 1.0"));
    println!("active={}", opacity.is_active());

    // Transitions end in order; the first one has been superseded.
    let finished: Vec<_> = in_flight.borrow_mut().drain(..).collect();
    for (value, done) in finished {
        println!("transition for {value} ended");
        done.finish();
    }
    println!("active={}", opacity.is_active());
}
