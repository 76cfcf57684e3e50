//! Remote port-control byte protocol.
//!
//! A frame is one action byte followed by an optional integer argument,
//! most significant byte first. Unknown actions and empty frames
//! produce no reply and no side effect; the transport treats a missing
//! reply as the failure signal, so there is no error code on the wire.

use crate::port_set::PortSet;

/// Action codes as they appear on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Debug, defmt::Format)]
#[repr(u8)]
pub enum PortAction {
    Status = 0,
    Fault = 1,
    On = 2,
    Off = 3,
    SetRate = 4,
}

impl PortAction {
    pub fn from_code(code: u8) -> Option<PortAction> {
        match code {
            0 => Some(PortAction::Status),
            1 => Some(PortAction::Fault),
            2 => Some(PortAction::On),
            3 => Some(PortAction::Off),
            4 => Some(PortAction::SetRate),
            _ => None,
        }
    }
}

/// Operations the command decoder drives. Implemented over the real
/// hardware by the coms task, and by scripted doubles in tests.
pub trait PortController {
    fn power_status(&mut self) -> PortSet;
    fn power_on(&mut self, ports: PortSet);
    fn power_off(&mut self, ports: PortSet);
    fn fault_status(&mut self) -> PortSet;
    /// Never called with `hz == 0`; zero-rate frames are dropped before
    /// dispatch.
    fn set_sweep_rate(&mut self, hz: u32);
}

/// Executes one received frame against `ctrl`. Returns the reply byte,
/// or `None` when the frame is malformed, the action is unknown, or the
/// action carries no reply payload.
pub fn execute<C: PortController>(ctrl: &mut C, frame: &[u8]) -> Option<u8> {
    let (&code, arg_bytes) = frame.split_first()?;
    let action = PortAction::from_code(code)?;
    let arg = accumulate_arg(arg_bytes);

    match action {
        PortAction::Status => Some(ctrl.power_status().bits()),
        PortAction::Fault => Some(ctrl.fault_status().bits()),
        PortAction::On => {
            ctrl.power_on(PortSet::from_bits_truncate(arg));
            Some(ctrl.power_status().bits())
        }
        PortAction::Off => {
            ctrl.power_off(PortSet::from_bits_truncate(arg));
            Some(ctrl.power_status().bits())
        }
        PortAction::SetRate => {
            if arg != 0 {
                ctrl.set_sweep_rate(arg);
            }
            None
        }
    }
}

/// Big-endian accumulation: each payload byte shifts in as the new low
/// byte. Arguments wider than 32 bits wrap.
fn accumulate_arg(bytes: &[u8]) -> u32 {
    let mut value = 0u32;
    for &byte in bytes {
        value = (value << 8) | u32::from(byte);
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_accumulates_most_significant_first() {
        assert_eq!(accumulate_arg(&[]), 0);
        assert_eq!(accumulate_arg(&[0x05]), 0x05);
        assert_eq!(accumulate_arg(&[0x01, 0x00]), 0x100);
        assert_eq!(accumulate_arg(&[0xDE, 0xAD, 0xBE, 0xEF]), 0xDEAD_BEEF);
        // wider than 32 bits shifts the high bytes out
        assert_eq!(accumulate_arg(&[0xFF, 0x12, 0x34, 0x56, 0x78]), 0x1234_5678);
    }

    #[test]
    fn action_codes_round_trip() {
        for action in [
            PortAction::Status,
            PortAction::Fault,
            PortAction::On,
            PortAction::Off,
            PortAction::SetRate,
        ] {
            assert_eq!(PortAction::from_code(action as u8), Some(action));
        }
        assert_eq!(PortAction::from_code(5), None);
        assert_eq!(PortAction::from_code(0xFF), None);
    }
}
