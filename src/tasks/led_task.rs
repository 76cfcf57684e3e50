//! Status LED: slow heartbeat, fast blink while any fault is asserted.

use core::sync::atomic::AtomicBool;

use embassy_executor::Spawner;
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_stm32::Peri;
use embassy_time::Timer;

use crate::fault::FAULT_MONITOR;
use crate::pins::StatusLedPin;
use crate::tasks::claim_task_slot;

static TASK_STARTED: AtomicBool = AtomicBool::new(false);

const HEARTBEAT_MS: u64 = 500;
const FAULT_BLINK_MS: u64 = 100;

#[macro_export]
macro_rules! create_led_task {
    ($spawner:ident, $p:ident) => {
        $crate::tasks::led_task::start_led_task(&$spawner, $p.PA5);
    };
}

#[embassy_executor::task]
async fn led_task_entry(mut led: Output<'static>) {
    loop {
        led.toggle();
        let period = if FAULT_MONITOR.read_faults().is_empty() {
            HEARTBEAT_MS
        } else {
            FAULT_BLINK_MS
        };
        Timer::after_millis(period).await;
    }
}

pub fn start_led_task(spawner: &Spawner, led: Peri<'static, StatusLedPin>) {
    claim_task_slot(&TASK_STARTED, "led task");

    let led = Output::new(led, Level::Low, Speed::Low);
    spawner
        .spawn(led_task_entry(led))
        .expect("failed to spawn led task");
}
