//! Edge watcher for the eight port fault lines.

use core::sync::atomic::AtomicBool;

use embassy_executor::Spawner;
use embassy_futures::select::select_array;
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::Pull;
use embassy_stm32::Peri;

use crate::config::PORT_COUNT;
use crate::fault::FAULT_MONITOR;
use crate::pins::*;
use crate::port_set::PortSet;
use crate::tasks::claim_task_slot;

static TASK_STARTED: AtomicBool = AtomicBool::new(false);

#[macro_export]
macro_rules! create_fault_task {
    ($spawner:ident, $p:ident) => {
        $crate::tasks::fault_task::start_fault_task(
            &$spawner, $p.PC8, $p.EXTI8, $p.PC9, $p.EXTI9, $p.PC10, $p.EXTI10, $p.PC11,
            $p.EXTI11, $p.PC12, $p.EXTI12, $p.PC13, $p.EXTI13, $p.PC14, $p.EXTI14, $p.PC15,
            $p.EXTI15,
        );
    };
}

fn sample_levels(lines: &mut [ExtiInput<'static>; PORT_COUNT]) -> PortSet {
    let mut asserted = PortSet::EMPTY;
    for (port, line) in lines.iter_mut().enumerate() {
        if line.is_high() {
            asserted.insert(port as u8);
        }
    }
    asserted
}

#[embassy_executor::task]
async fn fault_task_entry(mut lines: [ExtiInput<'static>; PORT_COUNT]) {
    let mut prev = sample_levels(&mut lines);
    FAULT_MONITOR.update_levels(prev);

    loop {
        {
            let edge_waits = lines.each_mut().map(|line| line.wait_for_any_edge());
            select_array(edge_waits).await;
        }

        // watching both edges keeps the level mirror fresh on deassert;
        // rescanning all lines catches edges that landed together
        let levels = sample_levels(&mut lines);
        FAULT_MONITOR.update_levels(levels);

        for port in levels.iter() {
            if !prev.contains(port) {
                defmt::warn!("fault asserted on port {}", port);
                FAULT_MONITOR.dispatch(port);
            }
        }
        prev = levels;
    }
}

#[allow(clippy::too_many_arguments)] // one sense pin and EXTI channel per port
pub fn start_fault_task(
    spawner: &Spawner,
    fault0: Peri<'static, Port0FaultSensePin>,
    exti0: Peri<'static, Port0FaultExti>,
    fault1: Peri<'static, Port1FaultSensePin>,
    exti1: Peri<'static, Port1FaultExti>,
    fault2: Peri<'static, Port2FaultSensePin>,
    exti2: Peri<'static, Port2FaultExti>,
    fault3: Peri<'static, Port3FaultSensePin>,
    exti3: Peri<'static, Port3FaultExti>,
    fault4: Peri<'static, Port4FaultSensePin>,
    exti4: Peri<'static, Port4FaultExti>,
    fault5: Peri<'static, Port5FaultSensePin>,
    exti5: Peri<'static, Port5FaultExti>,
    fault6: Peri<'static, Port6FaultSensePin>,
    exti6: Peri<'static, Port6FaultExti>,
    fault7: Peri<'static, Port7FaultSensePin>,
    exti7: Peri<'static, Port7FaultExti>,
) {
    claim_task_slot(&TASK_STARTED, "fault task");

    let lines = [
        ExtiInput::new(fault0, exti0, Pull::None),
        ExtiInput::new(fault1, exti1, Pull::None),
        ExtiInput::new(fault2, exti2, Pull::None),
        ExtiInput::new(fault3, exti3, Pull::None),
        ExtiInput::new(fault4, exti4, Pull::None),
        ExtiInput::new(fault5, exti5, Pull::None),
        ExtiInput::new(fault6, exti6, Pull::None),
        ExtiInput::new(fault7, exti7, Pull::None),
    ];

    spawner
        .spawn(fault_task_entry(lines))
        .expect("failed to spawn fault task");
}
