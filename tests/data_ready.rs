//! Sweep-completion broadcast semantics of the current store.

use embassy_futures::block_on;
use pdu_node_board::config::{PORT_COUNT, SENSED_PORTS};
use pdu_node_board::sampler::{CurrentSnapshot, CurrentStore, SweepSampler};

#[test]
fn broadcast_wakes_every_waiter_without_draining() {
    static STORE: CurrentStore = CurrentStore::new();

    let mut waiter_a = STORE.data_ready();
    let mut waiter_b = STORE.data_ready();

    assert_eq!(STORE.latest_snapshot(), CurrentSnapshot::EMPTY);

    let snapshot = CurrentSnapshot {
        samples: [7; PORT_COUNT],
        sweep: 1,
    };
    STORE.publish(snapshot);

    // both subscribers observe the same completion
    assert_eq!(block_on(waiter_a.next_message_pure()), snapshot);
    assert_eq!(block_on(waiter_b.next_message_pure()), snapshot);
    assert_eq!(STORE.latest_snapshot(), snapshot);
}

#[test]
fn slow_waiter_skips_to_the_latest_sweep() {
    static STORE: CurrentStore = CurrentStore::new();

    let mut waiter = STORE.data_ready();

    for sweep in 1..=3 {
        STORE.publish(CurrentSnapshot {
            samples: [sweep as u16; PORT_COUNT],
            sweep,
        });
    }

    // completions are a broadcast, not a queue: only the newest survives
    assert_eq!(block_on(waiter.next_message_pure()).sweep, 3);
    assert_eq!(STORE.latest_snapshot().sweep, 3);
}

#[test]
fn driven_sampler_publishes_coherent_sweeps() {
    static STORE: CurrentStore = CurrentStore::new();

    let mut sampler = SweepSampler::new(SENSED_PORTS);
    let mut waiter = STORE.data_ready();

    // run two full sweeps the way the tick driver would
    for sweep in 1..=2u32 {
        let mut published = false;
        for _ in 0..4 {
            let plan = sampler.tick();
            for port in [plan.bank_a, plan.bank_b].into_iter().flatten() {
                let raw = u16::from(port) + sweep as u16 * 100;
                if let Some(snapshot) = sampler.record(port, raw) {
                    STORE.publish(snapshot);
                    published = true;
                }
            }
        }
        assert!(published, "each 4-tick cycle finishes one sweep");

        let snapshot = block_on(waiter.next_message_pure());
        assert_eq!(snapshot.sweep, sweep);
        // every sensed slot belongs to this sweep, never a mix
        for port in SENSED_PORTS.iter() {
            assert_eq!(
                snapshot.samples[port as usize],
                u16::from(port) + sweep as u16 * 100
            );
        }
    }
}
