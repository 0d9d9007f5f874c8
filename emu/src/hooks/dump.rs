use arch::memmap::STACK_TOP;
use arch::reg::Reg;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::{Step, Vm};

use super::{read_yaml, ConfigError, Hook};

#[derive(Debug)]
pub struct Dump {
    file: Option<String>,
    all: bool,
    list: List,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct List(HashMap<u16, Config>);

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
struct Config {
    #[serde(default)]
    stack: bool,
    #[serde(default)]
    mem: Vec<u16>,
}

const STACK_ROWS: usize = 16;

impl Dump {
    pub fn arg(file: Option<String>, all: bool) -> Result<Self, ConfigError> {
        let list = match &file {
            Some(fname) => read_yaml(fname)?,
            None => List::default(),
        };
        Ok(Self { file, all, list })
    }

    fn get(&self, ip: u16) -> Option<&Config> {
        self.list.0.get(&ip)
    }
}

impl Hook for Dump {
    fn init(&mut self, vm: Vm) -> Vm {
        if self.all {
            println!(" * Dump all");
        }
        if let Some(fname) = &self.file {
            println!(" * Dump[{}] {:?}", self.list.0.len(), fname);
        }
        vm
    }

    fn exec(&mut self, time: u64, step: Step, vm: Vm) -> Vm {
        if let Some(cfg) = self.get(step.addr) {
            self.print_reg(time, step, &vm);
            if cfg.stack {
                self.print_stack(&vm);
            }
            self.print_mem(&vm, &cfg.mem);
        } else if self.all {
            self.print_reg(time, step, &vm);
        }
        vm
    }
}

impl Dump {
    fn print_reg(&self, time: u64, step: Step, vm: &Vm) {
        println!(" +---------+--------+----------+----------+----------+");
        println!(
            " | {:0>6} | {:0>4X}: {:<6} | ip: {:0>4X} | sp: {:0>4X} | fp: {:0>4X} |",
            time,
            step.addr,
            step.opcode.to_string(),
            vm.ip(),
            vm.sp(),
            vm.fp()
        );
        println!(
            " |  A: {:0>2X}  B: {:0>2X}  {:<39}|",
            vm.get(Reg::A),
            vm.get(Reg::B),
            match (vm.is_halted(), vm.in_interrupt()) {
                (true, _) => "halted",
                (false, true) => "interrupt",
                (false, false) => "",
            }
        );
        println!(" +---------+--------+----------+----------+----------+");
    }

    fn print_stack(&self, vm: &Vm) {
        if vm.sp() == STACK_TOP {
            println!(" | (empty stack)                                      |");
        }
        for addr in (vm.sp().saturating_add(1)..=STACK_TOP).take(STACK_ROWS) {
            let mark = if addr == vm.fp() { "<- fp" } else { "" };
            println!(
                " | {:0>4X} : {:0>2X} {:<40} |",
                addr,
                vm.peek(addr),
                mark
            );
        }
        println!(" +----------------------------------------------------+");
    }

    fn print_mem(&self, vm: &Vm, addrs: &[u16]) {
        for addr in addrs {
            println!(" | {:0>4X} : {:0>2X} {:<40} |", addr, vm.peek(*addr), "");
        }
        if !addrs.is_empty() {
            println!(" +----------------------------------------------------+");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config() {
        let list: List = serde_yaml::from_str(
            "
0x0c:
  stack: true
20:
  mem: [0xe000, 0xe001]
",
        )
        .unwrap();
        assert_eq!(
            list.0.get(&0x0c),
            Some(&Config {
                stack: true,
                mem: vec![]
            })
        );
        assert_eq!(list.0.get(&20).map(|c| c.mem.clone()), Some(vec![0xe000, 0xe001]));
    }

    #[test]
    fn no_file() {
        let dump = Dump::arg(None, true).unwrap();
        assert!(dump.get(0).is_none());
    }

    #[test]
    fn missing_file() {
        let err = Dump::arg(Some("no/such/dump.yaml".into()), false).unwrap_err();
        assert!(matches!(err, ConfigError::Open(..)));
    }
}
