//! Per-port fault reporting.
//!
//! Fault lines assert with a rising edge. Edges are delivered to at
//! most one registered handler; edges seen while no handler is
//! installed are dropped, not queued. The currently-asserted levels are
//! mirrored separately so they can be polled from any context.

use core::cell::Cell;
use core::sync::atomic::{AtomicU8, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::port_set::PortSet;

/// Callback invoked with the faulting port index. Runs on the fault
/// watcher between edge waits; it must return quickly and must not
/// block. Context travels inside the closure.
pub type FaultHandler = &'static (dyn Fn(u8) + Sync);

pub struct FaultMonitor {
    handler: Mutex<CriticalSectionRawMutex, Cell<Option<FaultHandler>>>,
    asserted: AtomicU8,
}

pub static FAULT_MONITOR: FaultMonitor = FaultMonitor::new();

impl FaultMonitor {
    pub const fn new() -> Self {
        Self {
            handler: Mutex::new(Cell::new(None)),
            asserted: AtomicU8::new(0),
        }
    }

    /// Replaces the registered handler, `None` to unregister. The swap
    /// is atomic with respect to [`dispatch`](Self::dispatch): a
    /// dispatch observes either the old handler or the new one, never a
    /// half-installed pair.
    pub fn set_handler(&self, handler: Option<FaultHandler>) {
        self.handler.lock(|slot| slot.set(handler));
    }

    /// Currently-asserted fault lines (level, not edge history).
    /// Independent of handler registration and dispatch.
    pub fn read_faults(&self) -> PortSet {
        PortSet::from_bits_truncate(u32::from(self.asserted.load(Ordering::Relaxed)))
    }

    /// Refreshes the level mirror from a fresh sample of the lines.
    pub fn update_levels(&self, asserted: PortSet) {
        self.asserted.store(asserted.bits(), Ordering::Relaxed);
    }

    /// Delivers one fault edge to the registered handler, if any. The
    /// handler runs outside the registration lock.
    pub fn dispatch(&self, port: u8) {
        let handler = self.handler.lock(|slot| slot.get());
        if let Some(handler) = handler {
            handler(port);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

    #[test]
    fn dispatch_without_handler_is_a_silent_drop() {
        let monitor = FaultMonitor::new();
        monitor.dispatch(3);
        assert_eq!(monitor.read_faults(), PortSet::EMPTY);
    }

    #[test]
    fn handler_sees_each_edge_exactly_once() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        static LAST_PORT: AtomicU8 = AtomicU8::new(0xFF);

        let monitor = FaultMonitor::new();
        monitor.set_handler(Some(&|port| {
            CALLS.fetch_add(1, Ordering::Relaxed);
            LAST_PORT.store(port, Ordering::Relaxed);
        }));

        monitor.dispatch(3);
        assert_eq!(CALLS.load(Ordering::Relaxed), 1);
        assert_eq!(LAST_PORT.load(Ordering::Relaxed), 3);

        monitor.dispatch(6);
        assert_eq!(CALLS.load(Ordering::Relaxed), 2);
        assert_eq!(LAST_PORT.load(Ordering::Relaxed), 6);
    }

    #[test]
    fn unregistering_stops_delivery() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        let monitor = FaultMonitor::new();
        monitor.set_handler(Some(&|_| {
            CALLS.fetch_add(1, Ordering::Relaxed);
        }));
        monitor.dispatch(0);
        monitor.set_handler(None);
        monitor.dispatch(0);
        assert_eq!(CALLS.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn level_mirror_tracks_updates() {
        let monitor = FaultMonitor::new();
        assert_eq!(monitor.read_faults(), PortSet::EMPTY);

        monitor.update_levels(PortSet::from_bits_truncate(0b1001));
        assert_eq!(monitor.read_faults().bits(), 0b1001);

        monitor.update_levels(PortSet::EMPTY);
        assert_eq!(monitor.read_faults(), PortSet::EMPTY);
    }
}
