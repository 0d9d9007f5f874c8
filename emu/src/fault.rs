use arch::mode::Mode;
use arch::op::Opcode;
use thiserror::Error;

/// Runtime fault. The first field is the address of the faulting instruction.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    #[error("{0:#06x}: Unknown opcode {1:#04x}")]
    UnknownOpcode(u16, u8),

    #[error("{0:#06x}: Unknown addressing mode {1:#04x}")]
    UnknownMode(u16, u8),

    #[error("{0:#06x}: Unknown register {1:#04x}")]
    UnknownRegister(u16, u8),

    #[error("{0:#06x}: `{1}` cannot use mode {2}")]
    InvalidMode(u16, Opcode, Mode),

    #[error("{0:#06x}: Division by zero")]
    DivideByZero(u16),
}

impl Fault {
    pub fn addr(&self) -> u16 {
        match *self {
            Fault::UnknownOpcode(addr, _)
            | Fault::UnknownMode(addr, _)
            | Fault::UnknownRegister(addr, _)
            | Fault::InvalidMode(addr, _, _)
            | Fault::DivideByZero(addr) => addr,
        }
    }
}
