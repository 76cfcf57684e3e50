#![cfg_attr(target_arch = "arm", no_std)]
#![cfg_attr(target_arch = "arm", no_main)]

#[cfg(target_arch = "arm")]
mod bringup {
    use defmt::info;
    use embassy_executor::Spawner;
    use embassy_stm32::gpio::{Input, Level, Output, Pull, Speed};
    use embassy_time::Timer;
    use {defmt_rtt as _, panic_probe as _};

    use pdu_node_board::config::PORT_COUNT;
    use pdu_node_board::create_sampler_task;
    use pdu_node_board::port_set::PortSet;
    use pdu_node_board::power::PowerSwitchBank;
    use pdu_node_board::sampler::CURRENT_STORE;

    /// Walks the switched outputs one at a time while sampling runs,
    /// logging the status mask, fault levels, and current sweeps.
    #[embassy_executor::main]
    async fn main(spawner: Spawner) {
        let p = embassy_stm32::init(Default::default());
        info!("port bringup check");

        create_sampler_task!(spawner, p);

        let mut power = PowerSwitchBank::new([
            Output::new(p.PB0, Level::High, Speed::Low),
            Output::new(p.PB1, Level::High, Speed::Low),
            Output::new(p.PB2, Level::High, Speed::Low),
            Output::new(p.PB3, Level::High, Speed::Low),
            Output::new(p.PB4, Level::High, Speed::Low),
            Output::new(p.PB5, Level::High, Speed::Low),
            Output::new(p.PB6, Level::High, Speed::Low),
            Output::new(p.PB7, Level::High, Speed::Low),
        ]);

        let fault_lines = [
            Input::new(p.PC8, Pull::None),
            Input::new(p.PC9, Pull::None),
            Input::new(p.PC10, Pull::None),
            Input::new(p.PC11, Pull::None),
            Input::new(p.PC12, Pull::None),
            Input::new(p.PC13, Pull::None),
            Input::new(p.PC14, Pull::None),
            Input::new(p.PC15, Pull::None),
        ];

        let mut data_ready = CURRENT_STORE.data_ready();

        loop {
            for port in 0..PORT_COUNT as u8 {
                power.enable(PortSet::single(port));
                info!("port {} on, status {}", port, power.status());

                let snapshot = data_ready.next_message_pure().await;
                info!("sweep {}: {}", snapshot.sweep, snapshot.samples);

                let mut asserted = PortSet::EMPTY;
                for (index, line) in fault_lines.iter().enumerate() {
                    if line.is_high() {
                        asserted.insert(index as u8);
                    }
                }
                info!("fault lines {}", asserted);

                Timer::after_millis(500).await;
                power.disable(PortSet::single(port));
            }
        }
    }
}

// firmware entry exists only for the ARM target; host builds get a stub
#[cfg(not(target_arch = "arm"))]
fn main() {}
