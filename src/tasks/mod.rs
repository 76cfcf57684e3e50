pub mod coms_task;
pub mod fault_task;
pub mod led_task;
pub mod sampler_task;

use core::sync::atomic::{AtomicBool, Ordering};

/// Each task owns a hardware singleton; starting one twice is a wiring
/// bug, not a runtime condition.
pub(crate) fn claim_task_slot(started: &AtomicBool, name: &str) {
    if started.swap(true, Ordering::Relaxed) {
        defmt::panic!("{=str} started twice", name);
    }
}
