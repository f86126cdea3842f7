// Example: serializing effects that finish at different times.
use std::cell::RefCell;
use std::rc::Rc;

use camfx::{EffectDone, EffectQueue};

fn main() {
    let queue = EffectQueue::new();
    // Stand-in for an animation that finishes later.
    let parked: Rc<RefCell<Option<EffectDone>>> = Rc::new(RefCell::new(None));

    let slot = Rc::clone(&parked);
    queue.enqueue(move |done| {
        println!("fade-out: started");
        *slot.borrow_mut() = Some(done);
    });
    queue.enqueue(|done| {
        println!("fade-in: started");
        done.finish();
    });
    println!(
        "running={} pending={}",
        queue.is_running(),
        queue.pending_len()
    );

    if let Some(done) = parked.borrow_mut().take() {
        println!("fade-out: finished");
        done.finish();
    }
    println!("idle={}", queue.is_idle());
}
