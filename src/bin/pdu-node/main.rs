#![cfg_attr(target_arch = "arm", no_std)]
#![cfg_attr(target_arch = "arm", no_main)]

#[cfg(target_arch = "arm")]
mod node {
    use defmt::info;
    use embassy_executor::Spawner;
    use {defmt_rtt as _, panic_probe as _};

    use pdu_node_board::{create_coms_task, create_fault_task, create_led_task, create_sampler_task};

    #[embassy_executor::main]
    async fn main(spawner: Spawner) {
        let p = embassy_stm32::init(Default::default());
        info!("power distribution node up");

        // converters and the sampling timer come up before the fault
        // edges or the command link can observe anything
        create_sampler_task!(spawner, p);
        create_fault_task!(spawner, p);
        create_coms_task!(spawner, p);
        create_led_task!(spawner, p);
    }
}

// firmware entry exists only for the ARM target; host builds get a stub
#[cfg(not(target_arch = "arm"))]
fn main() {}
