//! Remote command processing over the node's UART link.
//!
//! The transport delimits frames with line idle; each received frame is
//! decoded and answered in place. A frame that decodes to nothing gets
//! no reply, which is the protocol's failure signal.

use core::sync::atomic::AtomicBool;

use embassy_executor::Spawner;
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_stm32::mode::Async;
use embassy_stm32::usart::{self, Uart};
use embassy_stm32::Peri;

use crate::command::{self, PortAction, PortController};
use crate::config::MAX_FRAME_LEN;
use crate::fault::FAULT_MONITOR;
use crate::pins::*;
use crate::port_set::PortSet;
use crate::power::PowerSwitchBank;
use crate::sampler::CURRENT_STORE;
use crate::tasks::claim_task_slot;

static TASK_STARTED: AtomicBool = AtomicBool::new(false);

#[macro_export]
macro_rules! create_coms_task {
    ($spawner:ident, $p:ident) => {
        $crate::tasks::coms_task::start_coms_task(
            &$spawner, $p.USART1, $p.PA10, $p.PA9, $p.DMA1_CH4, $p.DMA1_CH3, $p.PB0, $p.PB1,
            $p.PB2, $p.PB3, $p.PB4, $p.PB5, $p.PB6, $p.PB7,
        );
    };
}

/// Command-side view of the node: the switch bank is owned here, fault
/// levels and the sweep rate are shared state.
struct NodeController {
    power: PowerSwitchBank<Output<'static>>,
}

impl PortController for NodeController {
    fn power_status(&mut self) -> PortSet {
        self.power.status()
    }

    fn power_on(&mut self, ports: PortSet) {
        self.power.enable(ports);
    }

    fn power_off(&mut self, ports: PortSet) {
        self.power.disable(ports);
    }

    fn fault_status(&mut self) -> PortSet {
        FAULT_MONITOR.read_faults()
    }

    fn set_sweep_rate(&mut self, hz: u32) {
        CURRENT_STORE.set_sweep_rate(hz);
    }
}

#[embassy_executor::task]
async fn coms_task_entry(mut uart: Uart<'static, Async>, mut node: NodeController) {
    let mut frame = [0u8; MAX_FRAME_LEN];

    loop {
        match uart.read_until_idle(&mut frame).await {
            Ok(len) => {
                let frame = &frame[..len];
                if let Some(reply) = command::execute(&mut node, frame) {
                    if let Err(err) = uart.write(&[reply]).await {
                        defmt::warn!("command reply write failed: {}", err);
                    }
                } else if frame.first().and_then(|&code| PortAction::from_code(code)).is_none() {
                    defmt::warn!("dropping malformed command frame: {=[u8]:x}", frame);
                }
            }
            Err(err) => defmt::warn!("command frame receive failed: {}", err),
        }
    }
}

#[allow(clippy::too_many_arguments)] // one enable line per port
pub fn start_coms_task(
    spawner: &Spawner,
    uart: Peri<'static, ComsUart>,
    uart_rx_pin: Peri<'static, ComsUartRxPin>,
    uart_tx_pin: Peri<'static, ComsUartTxPin>,
    uart_rx_dma: Peri<'static, ComsDmaRx>,
    uart_tx_dma: Peri<'static, ComsDmaTx>,
    port0_en: Peri<'static, Port0PowerEnablePin>,
    port1_en: Peri<'static, Port1PowerEnablePin>,
    port2_en: Peri<'static, Port2PowerEnablePin>,
    port3_en: Peri<'static, Port3PowerEnablePin>,
    port4_en: Peri<'static, Port4PowerEnablePin>,
    port5_en: Peri<'static, Port5PowerEnablePin>,
    port6_en: Peri<'static, Port6PowerEnablePin>,
    port7_en: Peri<'static, Port7PowerEnablePin>,
) {
    claim_task_slot(&TASK_STARTED, "coms task");

    let uart_config = usart::Config::default();
    let uart = Uart::new(
        uart,
        uart_rx_pin,
        uart_tx_pin,
        SystemIrqs,
        uart_tx_dma,
        uart_rx_dma,
        uart_config,
    )
    .unwrap();

    // every port starts switched off; the enable lines are active low
    let power = PowerSwitchBank::new([
        Output::new(port0_en, Level::High, Speed::Low),
        Output::new(port1_en, Level::High, Speed::Low),
        Output::new(port2_en, Level::High, Speed::Low),
        Output::new(port3_en, Level::High, Speed::Low),
        Output::new(port4_en, Level::High, Speed::Low),
        Output::new(port5_en, Level::High, Speed::Low),
        Output::new(port6_en, Level::High, Speed::Low),
        Output::new(port7_en, Level::High, Speed::Low),
    ]);

    spawner
        .spawn(coms_task_entry(uart, NodeController { power }))
        .expect("failed to spawn coms task");
}
