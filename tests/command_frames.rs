//! Wire-level exercises of the port command protocol against a
//! scripted controller.

use pdu_node_board::command::{self, PortController};
use pdu_node_board::port_set::PortSet;

#[derive(Default)]
struct ScriptedNode {
    powered: PortSet,
    faults: PortSet,
    sweep_rate_hz: Option<u32>,
}

impl PortController for ScriptedNode {
    fn power_status(&mut self) -> PortSet {
        self.powered
    }

    fn power_on(&mut self, ports: PortSet) {
        for port in ports.iter() {
            self.powered.insert(port);
        }
    }

    fn power_off(&mut self, ports: PortSet) {
        for port in ports.iter() {
            self.powered.remove(port);
        }
    }

    fn fault_status(&mut self) -> PortSet {
        self.faults
    }

    fn set_sweep_rate(&mut self, hz: u32) {
        assert_ne!(hz, 0, "zero rates must be dropped before dispatch");
        self.sweep_rate_hz = Some(hz);
    }
}

#[test]
fn on_then_status_round_trip() {
    let mut node = ScriptedNode::default();

    // ON ports 0 and 2, reply echoes the resulting status
    assert_eq!(command::execute(&mut node, &[2, 0x05]), Some(0x05));
    // STATUS sees the same mask
    assert_eq!(command::execute(&mut node, &[0]), Some(0x05));
}

#[test]
fn off_clears_only_named_ports() {
    let mut node = ScriptedNode::default();
    command::execute(&mut node, &[2, 0xFF]);
    assert_eq!(command::execute(&mut node, &[3, 0x0F]), Some(0xF0));
    assert_eq!(command::execute(&mut node, &[0]), Some(0xF0));
}

#[test]
fn fault_action_reports_fault_levels() {
    let mut node = ScriptedNode {
        faults: PortSet::from_bits_truncate(0b0100_1000),
        ..Default::default()
    };
    assert_eq!(command::execute(&mut node, &[1]), Some(0b0100_1000));
    // fault reporting never touches power state
    assert_eq!(command::execute(&mut node, &[0]), Some(0));
}

#[test]
fn port_mask_arguments_are_truncated_to_valid_ports() {
    let mut node = ScriptedNode::default();
    // bit 8 is beyond the last port and must be ignored
    assert_eq!(command::execute(&mut node, &[2, 0x01, 0xFF]), Some(0xFF));
}

#[test]
fn set_rate_parses_big_endian_and_has_no_reply() {
    let mut node = ScriptedNode::default();
    assert_eq!(command::execute(&mut node, &[4, 0x01, 0x00]), None);
    assert_eq!(node.sweep_rate_hz, Some(256));

    assert_eq!(command::execute(&mut node, &[4, 25]), None);
    assert_eq!(node.sweep_rate_hz, Some(25));
}

#[test]
fn zero_rate_frame_is_dropped() {
    let mut node = ScriptedNode::default();
    assert_eq!(command::execute(&mut node, &[4, 0x00]), None);
    assert_eq!(node.sweep_rate_hz, None);
}

#[test]
fn unknown_action_gets_no_reply_and_no_effect() {
    let mut node = ScriptedNode::default();
    command::execute(&mut node, &[2, 0x05]);

    assert_eq!(command::execute(&mut node, &[0xFF]), None);
    assert_eq!(command::execute(&mut node, &[0xFF, 0x01, 0x02]), None);
    assert_eq!(command::execute(&mut node, &[5]), None);

    assert_eq!(node.powered.bits(), 0x05);
    assert_eq!(node.sweep_rate_hz, None);
}

#[test]
fn empty_frame_gets_no_reply_and_no_effect() {
    let mut node = ScriptedNode::default();
    assert_eq!(command::execute(&mut node, &[]), None);
    assert_eq!(node.powered, PortSet::EMPTY);
}
