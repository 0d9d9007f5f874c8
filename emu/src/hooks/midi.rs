use arch::memmap::{DATA1, DATA2, SEND, STATUS};
use color_print::cprintln;
use std::fmt;

use crate::model::{Step, Vm};

use super::Hook;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub status: u8,
    pub data1: u8,
    pub data2: u8,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:02X} {:02X} {:02X}", self.status, self.data1, self.data2)
    }
}

/// Relays messages the program posts to the I/O cells. The console stands
/// in for the MIDI port.
#[derive(Debug, Default)]
pub struct Midi {
    sent: Vec<Message>,
}

impl Midi {
    pub fn new() -> Self {
        Midi::default()
    }

    pub fn sent(&self) -> &[Message] {
        &self.sent
    }
}

impl Hook for Midi {
    fn init(&mut self, mut vm: Vm) -> Vm {
        vm.poke(SEND, 0);
        println!(" * Midi: STATUS={:0>4X} SEND={:0>4X}", STATUS, SEND);
        vm
    }

    fn exec(&mut self, time: u64, _step: Step, mut vm: Vm) -> Vm {
        if vm.peek(SEND) != 0 {
            let msg = Message {
                status: vm.peek(STATUS),
                data1: vm.peek(DATA1),
                data2: vm.peek(DATA2),
            };
            cprintln!(" <green>[{:0>6}] > {}</>", time, msg);
            self.sent.push(msg);
            vm.poke(SEND, 0);
        }
        vm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arch::op::Opcode;

    #[test]
    fn relays_and_clears() {
        let mut midi = Midi::new();
        let step = Step {
            addr: 0,
            opcode: Opcode::Store,
        };
        let mut vm = midi.init(Vm::with_seed(0));
        vm = midi.exec(0, step, vm);
        assert!(midi.sent().is_empty());

        vm.poke(STATUS, 0x90);
        vm.poke(DATA1, 60);
        vm.poke(DATA2, 0x7f);
        vm.poke(SEND, 1);
        vm = midi.exec(1, step, vm);
        assert_eq!(vm.peek(SEND), 0);
        assert_eq!(midi.sent().len(), 1);
        assert_eq!(midi.sent()[0].to_string(), "90 3C 7F");
    }
}
