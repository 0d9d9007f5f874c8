//! Fixed addresses shared by the VM, the driver and the `<midi>` include.

/// Flat memory shared by code, data and stack.
pub const MEMORY_SIZE: usize = 0x1_0000;

/// Initial SP and FP. The stack grows downward from here.
pub const STACK_TOP: u16 = 0xFFFF;

/// Tempo in beats per minute, written by the program.
pub const BPM: u16 = 0xE000;
/// Clock pulses per quarter note, written by the program.
pub const PPQN: u16 = 0xE001;
/// Outgoing message: status, data1, data2.
pub const STATUS: u16 = 0xE002;
pub const DATA1: u16 = 0xE003;
pub const DATA2: u16 = 0xE004;
/// Non-zero when a message is ready. The driver clears it after sending.
pub const SEND: u16 = 0xE005;
