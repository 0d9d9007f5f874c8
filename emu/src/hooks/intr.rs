use color_print::cprintln;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::{Step, Vm};

use super::{read_yaml, ConfigError, Hook};

/// Raises interrupts on a fixed schedule.
#[derive(Debug)]
pub struct Intr {
    file: Option<String>,
    list: List,
}

/// tick -> interrupt vector
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct List(HashMap<u64, usize>);

impl Intr {
    pub fn arg(file: Option<String>) -> Result<Self, ConfigError> {
        let list = match &file {
            Some(fname) => read_yaml(fname)?,
            None => List::default(),
        };
        Ok(Self { file, list })
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        Ok(Self {
            file: None,
            list: serde_yaml::from_str(yaml)?,
        })
    }

    fn get(&self, time: u64) -> Option<usize> {
        self.list.0.get(&time).copied()
    }
}

impl Hook for Intr {
    fn init(&mut self, vm: Vm) -> Vm {
        if let Some(fname) = &self.file {
            println!(" * Intr[{}] {:?}", self.list.0.len(), fname);
        }
        vm
    }

    fn exec(&mut self, time: u64, _: Step, mut vm: Vm) -> Vm {
        if let Some(n) = self.get(time) {
            match vm.interrupt(n) {
                true => cprintln!(" <yellow>!{}</> @{:0>4X}", n, vm.ip()),
                false => cprintln!(" <dim>!{} ignored</>", n),
            }
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
    fn schedule() {
        let mut intr = Intr::from_yaml("3: 0\n5: 1").unwrap();
        assert_eq!(intr.get(3), Some(0));
        assert_eq!(intr.get(4), None);

        // slot 1 jumps to 0x0c
        let mut image = vec![0; 12];
        image[0..3].copy_from_slice(&[Opcode::Jump.into(), 0x00, 0x0c]);
        image[3..6].copy_from_slice(&[Opcode::Jump.into(), 0x00, 0x0c]);
        let mut vm = Vm::with_seed(0);
        vm.load_program(&Program::new(0, image));

        let step = Step {
            addr: 0,
            opcode: Opcode::Halt,
        };
        vm = intr.exec(2, step, vm);
        assert!(!vm.in_interrupt());
        vm = intr.exec(3, step, vm);
        assert_eq!(vm.ip(), 0x0c);
        assert!(vm.in_interrupt());
    }
}
