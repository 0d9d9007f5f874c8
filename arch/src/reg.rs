use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

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
    EnumString,
    Display,
)]
#[strum(ascii_case_insensitive)]
#[repr(u8)]
pub enum Reg {
    A,
    B,
}

impl Reg {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.parse::<Self>() {
            Ok(r) => Ok(r),
            Err(_) => Err(format!("Unknown reg name: {s}")),
        }
    }
}

#[test]
fn test() {
    assert_eq!(Reg::parse("a"), Ok(Reg::A));
    assert_eq!(Reg::parse("B"), Ok(Reg::B));
    assert!(Reg::parse("fp").is_err());
    assert_eq!(u8::from(Reg::B), 1);
    assert_eq!(Reg::try_from(0u8).ok(), Some(Reg::A));
    assert!(Reg::try_from(2u8).is_err());
}
