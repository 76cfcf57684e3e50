//! Round-robin current sampling across the switched ports.
//!
//! A periodic tick selects the port pair `(c, c + 4)`: bank A converts
//! the low port while bank B converts the high one, so a full sweep of
//! all eight ports takes [`TICKS_PER_SWEEP`] ticks. Completions land in
//! a scratch sweep owned by [`SweepSampler`]; once every sensed port has
//! reported, the finished sweep is copied into [`CurrentStore`] and
//! broadcast to every data-ready waiter.
//!
//! Driving the cursor from the tick rather than from conversion
//! completion keeps the sweep period bounded even when a converter
//! drops a conversion.

use core::cell::Cell;
use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::pubsub::{PubSubChannel, Subscriber};

use crate::config::{CURRENT_SENSE_ABSENT, DEFAULT_SWEEP_RATE_HZ, PORT_COUNT, TICKS_PER_SWEEP};
use crate::port_set::PortSet;

/// Samples from one completed sweep, indexed by port. Slots of ports
/// with no sense channel hold [`CURRENT_SENSE_ABSENT`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, defmt::Format)]
pub struct CurrentSnapshot {
    pub samples: [u16; PORT_COUNT],
    /// Sweep sequence number; the first completed sweep is 1.
    pub sweep: u32,
}

impl CurrentSnapshot {
    /// State reported before any sweep has completed.
    pub const EMPTY: CurrentSnapshot = CurrentSnapshot {
        samples: [0; PORT_COUNT],
        sweep: 0,
    };
}

impl Default for CurrentSnapshot {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Conversions to issue on one tick, one port per converter bank.
/// A `None` bank means that port has no sense channel and is skipped.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TickPlan {
    /// Analog mux select for this tick, `0..TICKS_PER_SWEEP`.
    pub select: u8,
    pub bank_a: Option<u8>,
    pub bank_b: Option<u8>,
}

/// Per-sweep state machine, owned by the sampling driver.
///
/// Completions may arrive in any interleaving across the two banks and
/// across tick boundaries; a sweep finishes only once every sensed port
/// has reported at least once since the previous sweep.
pub struct SweepSampler {
    sensed: PortSet,
    cursor: u8,
    pending: PortSet,
    scratch: [u16; PORT_COUNT],
    sweep: u32,
}

impl SweepSampler {
    pub fn new(sensed: PortSet) -> Self {
        let mut scratch = [0u16; PORT_COUNT];
        for port in 0..PORT_COUNT as u8 {
            if !sensed.contains(port) {
                scratch[port as usize] = CURRENT_SENSE_ABSENT;
            }
        }
        Self {
            sensed,
            cursor: 0,
            pending: sensed,
            scratch,
            sweep: 0,
        }
    }

    /// Advances the round-robin cursor and reports which ports to
    /// convert this tick. The cursor wraps every [`TICKS_PER_SWEEP`]
    /// ticks whether or not any conversion completes.
    pub fn tick(&mut self) -> TickPlan {
        let select = self.cursor;
        let low = select;
        let high = select + TICKS_PER_SWEEP;
        self.cursor = (self.cursor + 1) % TICKS_PER_SWEEP;
        TickPlan {
            select,
            bank_a: if self.sensed.contains(low) { Some(low) } else { None },
            bank_b: if self.sensed.contains(high) { Some(high) } else { None },
        }
    }

    /// Records one completed conversion. Returns the finished snapshot
    /// when this was the last port outstanding in the sweep.
    pub fn record(&mut self, port: u8, sample: u16) -> Option<CurrentSnapshot> {
        if !self.sensed.contains(port) {
            return None;
        }
        self.scratch[port as usize] = sample;
        self.pending.remove(port);
        if !self.pending.is_empty() {
            return None;
        }
        self.pending = self.sensed;
        self.sweep = self.sweep.wrapping_add(1);
        Some(CurrentSnapshot {
            samples: self.scratch,
            sweep: self.sweep,
        })
    }
}

/// Most consumers that may block on fresh current data at once.
pub const MAX_DATA_WAITERS: usize = 4;

pub type DataReadySubscriber =
    Subscriber<'static, CriticalSectionRawMutex, CurrentSnapshot, 1, MAX_DATA_WAITERS, 1>;

/// Shared view of the sampler: the latest completed sweep, the wake-all
/// completion broadcast, and the commanded sweep rate.
pub struct CurrentStore {
    latest: Mutex<CriticalSectionRawMutex, Cell<CurrentSnapshot>>,
    data_ready: PubSubChannel<CriticalSectionRawMutex, CurrentSnapshot, 1, MAX_DATA_WAITERS, 1>,
    sweep_rate_hz: AtomicU32,
}

pub static CURRENT_STORE: CurrentStore = CurrentStore::new();

impl CurrentStore {
    pub const fn new() -> Self {
        Self {
            latest: Mutex::new(Cell::new(CurrentSnapshot::EMPTY)),
            data_ready: PubSubChannel::new(),
            sweep_rate_hz: AtomicU32::new(DEFAULT_SWEEP_RATE_HZ),
        }
    }

    /// Copy of the most recently completed sweep; never blocks. All
    /// zeros with `sweep == 0` until the first sweep finishes.
    pub fn latest_snapshot(&self) -> CurrentSnapshot {
        self.latest.lock(|cell| cell.get())
    }

    /// Publishes a finished sweep and wakes every data-ready waiter.
    pub fn publish(&self, snapshot: CurrentSnapshot) {
        self.latest.lock(|cell| cell.set(snapshot));
        self.data_ready.immediate_publisher().publish_immediate(snapshot);
    }

    /// Subscription to sweep completion. Waking does not drain the
    /// event for other subscribers; a subscriber that falls behind only
    /// ever skips forward to newer sweeps.
    ///
    /// Panics once more than [`MAX_DATA_WAITERS`] subscriptions are live.
    pub fn data_ready(&'static self) -> DataReadySubscriber {
        self.data_ready
            .subscriber()
            .expect("too many data-ready subscribers")
    }

    /// Commands a new full-sweep rate; the sampling driver picks the
    /// change up on its next tick. `hz` must be nonzero.
    pub fn set_sweep_rate(&self, hz: u32) {
        debug_assert!(hz != 0);
        self.sweep_rate_hz.store(hz, Ordering::Relaxed);
    }

    pub fn sweep_rate_hz(&self) -> u32 {
        self.sweep_rate_hz.load(Ordering::Relaxed)
    }
}
