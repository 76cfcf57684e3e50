use crate::port_set::PortSet;

/// Number of switched outputs on the bus.
pub const PORT_COUNT: usize = 8;

/// Ticks per full sampling sweep; each tick converts one port per bank.
pub const TICKS_PER_SWEEP: u8 = 4;

/// Ports with a current-sense channel wired. Port 4 is a plain
/// passthrough with no shunt, so it never produces a sample.
pub const SENSED_PORTS: PortSet = PortSet::from_bits_truncate(0b1110_1111);

/// Stored in snapshot slots that have no sense channel. Outside the
/// 12-bit converter range, so it can never collide with a real sample.
pub const CURRENT_SENSE_ABSENT: u16 = 0xFFFF;

/// Full-sweep rate at power-up, sweeps per second.
pub const DEFAULT_SWEEP_RATE_HZ: u32 = 10;

/// Receive bound for one command frame. The argument accumulator wraps,
/// so longer frames are a transport concern, not a protocol one.
pub const MAX_FRAME_LEN: usize = 16;
