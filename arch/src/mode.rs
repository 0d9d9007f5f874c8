use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use strum::Display;

/// Addressing-mode byte that follows the opcode of `load`, `store`, `mov`,
/// `push` and the ALU instructions.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    TryFromPrimitive,
    IntoPrimitive,
    Display,
)]
#[repr(u8)]
pub enum Mode {
    /// value: `arg`; address: `base + sext(arg)`
    Immediate,
    /// value: register `arg`
    Register,
    /// `fp + sext(arg)`
    FramePointerWithOffset,
    /// `fp + reg(arg)`
    FramePointerPlusRegister,
    /// `fp - reg(arg)`
    FramePointerMinusRegister,
    /// address only: `base + reg(arg)`
    ImmediatePlusRegister,
    /// address only: `base - reg(arg)`
    ImmediateMinusRegister,
}

impl Mode {
    /// Usable where an instruction reads a value (`push`, `mov`, ALU).
    pub fn has_value(&self) -> bool {
        !matches!(
            self,
            Mode::ImmediatePlusRegister | Mode::ImmediateMinusRegister
        )
    }

    /// Usable where an instruction needs a memory address (`load`, `store`).
    pub fn has_address(&self) -> bool {
        !matches!(self, Mode::Register)
    }
}

#[test]
fn test() {
    assert_eq!(u8::from(Mode::FramePointerWithOffset), 2);
    assert_eq!(u8::from(Mode::ImmediateMinusRegister), 6);
    assert!(Mode::try_from(7u8).is_err());
    assert!(!Mode::Register.has_address());
    assert!(!Mode::ImmediatePlusRegister.has_value());
    assert!(Mode::Immediate.has_value() && Mode::Immediate.has_address());
}
