use arch::memmap::{BPM, PPQN};

use crate::model::{Step, Vm};

use super::Hook;

/// Raises interrupt 0 once per clock pulse. The pulse rate follows the BPM
/// and PPQN cells the program writes; the hook idles while either is 0.
#[derive(Debug)]
pub struct Clock {
    hz: u64,
    elapsed: u64,
}

impl Clock {
    pub fn new(hz: u64) -> Self {
        Clock { hz, elapsed: 0 }
    }

    /// Ticks per pulse: `60000 / bpm / ppqn` ms at `hz` ticks per second.
    pub fn interval(&self, bpm: u8, ppqn: u8) -> Option<u64> {
        let pulses_per_min = bpm as u64 * ppqn as u64;
        if pulses_per_min == 0 {
            return None;
        }
        Some((self.hz.saturating_mul(60) / pulses_per_min).max(1))
    }
}

impl Hook for Clock {
    fn init(&mut self, vm: Vm) -> Vm {
        println!(" * Clock {} Hz", self.hz);
        vm
    }

    fn exec(&mut self, _time: u64, _step: Step, mut vm: Vm) -> Vm {
        let Some(interval) = self.interval(vm.peek(BPM), vm.peek(PPQN)) else {
            self.elapsed = 0;
            return vm;
        };
        self.elapsed += 1;
        if self.elapsed >= interval {
            self.elapsed = 0;
            vm.interrupt(0);
        }
        vm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arch::op::Opcode;
    use arch::program::Program;

    #[test]
    fn interval() {
        let clock = Clock::new(1000);
        assert_eq!(clock.interval(0, 24), None);
        assert_eq!(clock.interval(120, 0), None);
        // 120 bpm, 4 ppqn: 125 ms per pulse
        assert_eq!(clock.interval(120, 4), Some(125));
        assert_eq!(Clock::new(1).interval(255, 255), Some(1));
        assert_eq!(Clock::new(u64::MAX).interval(1, 1), Some(u64::MAX));
    }

    #[test]
    fn pulses() {
        let mut image = vec![0; 12];
        image[0..3].copy_from_slice(&[Opcode::Jump.into(), 0x00, 0x0c]);
        image[3..6].copy_from_slice(&[Opcode::Jump.into(), 0x00, 0x0c]);
        let mut vm = Vm::with_seed(0);
        vm.load_program(&Program::new(0, image));

        let step = Step {
            addr: 0,
            opcode: Opcode::Halt,
        };
        let mut clock = Clock::new(60);
        vm = clock.exec(0, step, vm);
        assert!(!vm.in_interrupt());

        // 60 Hz at 60 pulses per minute: one pulse every 60 ticks
        vm.poke(BPM, 60);
        vm.poke(PPQN, 1);
        for time in 1..60 {
            vm = clock.exec(time, step, vm);
            assert!(!vm.in_interrupt());
        }
        vm = clock.exec(60, step, vm);
        assert!(vm.in_interrupt());
        assert_eq!(vm.ip(), 0x0c);
    }
}
