//! Timer-driven round-robin sampling across both converter banks.

use core::sync::atomic::AtomicBool;

use embassy_executor::Spawner;
use embassy_futures::join::join;
use embassy_stm32::adc::{Adc, AdcChannel, AnyAdcChannel, SampleTime};
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_stm32::Peri;
use embassy_time::{Duration, Ticker};

use crate::config::{SENSED_PORTS, TICKS_PER_SWEEP};
use crate::pins::*;
use crate::sampler::{SweepSampler, CURRENT_STORE};
use crate::tasks::claim_task_slot;

static TASK_STARTED: AtomicBool = AtomicBool::new(false);

// long sample window; the sense signals come through the mux unbuffered
const SAMPLE_TIME: SampleTime = SampleTime::CYCLES247_5;

#[macro_export]
macro_rules! create_sampler_task {
    ($spawner:ident, $p:ident) => {
        $crate::tasks::sampler_task::start_sampler_task(
            &$spawner, $p.ADC1, $p.ADC2, $p.DMA1_CH1, $p.DMA1_CH2, $p.PA0, $p.PA4, $p.PB8,
            $p.PB9,
        );
    };
}

/// Tick period for a commanded full-sweep rate: a sweep is
/// [`TICKS_PER_SWEEP`] ticks, so each tick lasts `1 / (rate * 4)`.
fn tick_period(sweep_rate_hz: u32) -> Duration {
    let micros = 1_000_000u64 / (u64::from(sweep_rate_hz) * u64::from(TICKS_PER_SWEEP));
    Duration::from_micros(micros.max(1))
}

#[embassy_executor::task]
async fn sampler_task_entry(
    mut mux_sel0: Output<'static>,
    mut mux_sel1: Output<'static>,
    mut adc_a: Adc<'static, CurrentSenseBankAAdc>,
    mut adc_b: Adc<'static, CurrentSenseBankBAdc>,
    mut dma_a: Peri<'static, CurrentSenseBankADma>,
    mut dma_b: Peri<'static, CurrentSenseBankBDma>,
    mut sense_a: AnyAdcChannel<CurrentSenseBankAAdc>,
    mut sense_b: AnyAdcChannel<CurrentSenseBankBAdc>,
) {
    let mut sampler = SweepSampler::new(SENSED_PORTS);
    let mut sweep_rate_hz = CURRENT_STORE.sweep_rate_hz();
    let mut ticker = Ticker::every(tick_period(sweep_rate_hz));

    defmt::info!("current sampling at {} sweeps/s", sweep_rate_hz);

    loop {
        ticker.next().await;

        // rate changes take effect on the next tick
        let commanded = CURRENT_STORE.sweep_rate_hz();
        if commanded != sweep_rate_hz {
            sweep_rate_hz = commanded;
            ticker = Ticker::every(tick_period(sweep_rate_hz));
            defmt::info!("current sampling now {} sweeps/s", sweep_rate_hz);
        }

        let plan = sampler.tick();

        // one mux setting routes both banks: port c to A, port c + 4 to B
        mux_sel0.set_level(if plan.select & 0b01 != 0 { Level::High } else { Level::Low });
        mux_sel1.set_level(if plan.select & 0b10 != 0 { Level::High } else { Level::Low });

        let mut raw_a = [0u16; 1];
        let mut raw_b = [0u16; 1];
        match (plan.bank_a, plan.bank_b) {
            (Some(_), Some(_)) => {
                join(
                    adc_a.read(
                        dma_a.reborrow(),
                        [(&mut sense_a, SAMPLE_TIME)].into_iter(),
                        &mut raw_a,
                    ),
                    adc_b.read(
                        dma_b.reborrow(),
                        [(&mut sense_b, SAMPLE_TIME)].into_iter(),
                        &mut raw_b,
                    ),
                )
                .await;
            }
            (Some(_), None) => {
                adc_a
                    .read(
                        dma_a.reborrow(),
                        [(&mut sense_a, SAMPLE_TIME)].into_iter(),
                        &mut raw_a,
                    )
                    .await;
            }
            (None, Some(_)) => {
                adc_b
                    .read(
                        dma_b.reborrow(),
                        [(&mut sense_b, SAMPLE_TIME)].into_iter(),
                        &mut raw_b,
                    )
                    .await;
            }
            (None, None) => {}
        }

        if let Some(port) = plan.bank_a {
            record_sample(&mut sampler, port, raw_a[0]);
        }
        if let Some(port) = plan.bank_b {
            record_sample(&mut sampler, port, raw_b[0]);
        }
    }
}

fn record_sample(sampler: &mut SweepSampler, port: u8, raw: u16) {
    if let Some(snapshot) = sampler.record(port, raw) {
        CURRENT_STORE.publish(snapshot);
        defmt::debug!("sweep {} complete", snapshot.sweep);
    }
}

#[allow(clippy::too_many_arguments)] // both converter banks wire up here
pub fn start_sampler_task(
    spawner: &Spawner,
    adc_a: Peri<'static, CurrentSenseBankAAdc>,
    adc_b: Peri<'static, CurrentSenseBankBAdc>,
    dma_a: Peri<'static, CurrentSenseBankADma>,
    dma_b: Peri<'static, CurrentSenseBankBDma>,
    sense_a: Peri<'static, CurrentSenseBankAPin>,
    sense_b: Peri<'static, CurrentSenseBankBPin>,
    mux_sel0: Peri<'static, CurrentSenseMuxSel0Pin>,
    mux_sel1: Peri<'static, CurrentSenseMuxSel1Pin>,
) {
    claim_task_slot(&TASK_STARTED, "sampler task");

    let adc_a = Adc::new(adc_a);
    let adc_b = Adc::new(adc_b);
    let sense_a = sense_a.degrade_adc();
    let sense_b = sense_b.degrade_adc();
    let mux_sel0 = Output::new(mux_sel0, Level::Low, Speed::Low);
    let mux_sel1 = Output::new(mux_sel1, Level::Low, Speed::Low);

    spawner
        .spawn(sampler_task_entry(
            mux_sel0, mux_sel1, adc_a, adc_b, dma_a, dma_b, sense_a, sense_b,
        ))
        .expect("failed to spawn sampler task");
}
