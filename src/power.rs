use embedded_hal::digital::StatefulOutputPin;

use crate::config::PORT_COUNT;
use crate::port_set::PortSet;

/// The eight switched outputs, driven through active-low enable lines.
///
/// Line writes are plain register accesses and always succeed; the bank
/// must only be driven from task context. Lines are independent, so
/// ports outside a call's mask are never touched.
pub struct PowerSwitchBank<P> {
    enable_n: [P; PORT_COUNT],
}

impl<P: StatefulOutputPin> PowerSwitchBank<P> {
    /// Takes the active-low enable lines, indexed by port.
    pub fn new(enable_n: [P; PORT_COUNT]) -> Self {
        Self { enable_n }
    }

    /// Composes the on/off state of every port from the driven levels.
    pub fn status(&mut self) -> PortSet {
        let mut on = PortSet::EMPTY;
        for (port, line) in self.enable_n.iter_mut().enumerate() {
            if matches!(line.is_set_low(), Ok(true)) {
                on.insert(port as u8);
            }
        }
        on
    }

    /// Switches every port in `ports` on.
    pub fn enable(&mut self, ports: PortSet) {
        for port in ports.iter() {
            let _ = self.enable_n[port as usize].set_low();
        }
    }

    /// Switches every port in `ports` off.
    pub fn disable(&mut self, ports: PortSet) {
        for port in ports.iter() {
            let _ = self.enable_n[port as usize].set_high();
        }
    }
}
