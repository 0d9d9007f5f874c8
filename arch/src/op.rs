use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumIter, EnumString};

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
    EnumIter,
    Display,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[repr(u8)]
pub enum Opcode {
    Halt,
    Load,
    Store,
    Mov,
    Swap,
    Push,
    Pop,
    Add,
    Sub,
    Mul,
    Div,
    Shl,
    Shr,
    And,
    Or,
    Gt,
    Gte,
    Lt,
    Lte,
    Eq,
    Neq,
    Rand,
    Jump,
    Jumpz,
    Jumpnz,
    Call,
    Ret,
    Reti,
}

impl Opcode {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.parse::<Self>() {
            Ok(op) => Ok(op),
            Err(_) => Err(format!("Undefined Op: {s}")),
        }
    }

    /// Operand syntax accepted after this opcode's mnemonic.
    pub fn grammar(&self) -> Grammar {
        use Opcode::*;
        match self {
            Halt | Swap | Pop | Rand | Ret | Reti => Grammar::Bare,
            Load => Grammar::Load,
            Store => Grammar::Store,
            Mov => Grammar::Mov,
            Push => Grammar::Push,
            Add | Sub | Mul | Div | Shl | Shr | And | Or | Gt | Gte | Lt | Lte | Eq | Neq => {
                Grammar::Alu
            }
            Jump | Jumpz | Jumpnz | Call => Grammar::Target,
        }
    }
}

/// Operand grammar of a mnemonic. Byte widths are not listed here: the
/// assembler derives them by running its encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    /// No operand.
    Bare,
    /// `<addr>, <reg>`
    Load,
    /// `<reg>, <addr>`
    Store,
    /// `<reg>, <value>`
    Mov,
    /// `[<value>]`, register A when absent
    Push,
    /// `[<value>]`, register B when absent
    Alu,
    /// `<target>`, absolute 16-bit address
    Target,
    /// `<byte>`, emitted verbatim
    Byte,
}

/// Everything that may start an instruction line: the opcodes plus the `db`
/// data directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    Op(Opcode),
    Db,
}

impl Mnemonic {
    pub fn parse(s: &str) -> Result<Self, String> {
        if s.eq_ignore_ascii_case("db") {
            return Ok(Mnemonic::Db);
        }
        Opcode::parse(s).map(Mnemonic::Op)
    }

    pub fn grammar(&self) -> Grammar {
        match self {
            Mnemonic::Op(op) => op.grammar(),
            Mnemonic::Db => Grammar::Byte,
        }
    }

    pub fn opcode(&self) -> Option<Opcode> {
        match self {
            Mnemonic::Op(op) => Some(*op),
            Mnemonic::Db => None,
        }
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mnemonic::Op(op) => write!(f, "{op}"),
            Mnemonic::Db => write!(f, "db"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn opcodes_are_sequential() {
        for (idx, op) in Opcode::iter().enumerate() {
            assert_eq!(u8::from(op) as usize, idx, "{op}");
            assert_eq!(Opcode::try_from(idx as u8).ok(), Some(op));
        }
        assert!(Opcode::try_from(Opcode::iter().count() as u8).is_err());
    }

    #[test]
    fn mnemonic_parse() {
        assert_eq!(Mnemonic::parse("jump"), Ok(Mnemonic::Op(Opcode::Jump)));
        assert_eq!(Mnemonic::parse("JUMPNZ"), Ok(Mnemonic::Op(Opcode::Jumpnz)));
        assert_eq!(Mnemonic::parse("Db"), Ok(Mnemonic::Db));
        assert!(Mnemonic::parse("hoge").is_err());
        assert_eq!(Mnemonic::Op(Opcode::Gte).to_string(), "gte");
    }

    #[test]
    fn grammar() {
        assert_eq!(Opcode::Neq.grammar(), Grammar::Alu);
        assert_eq!(Opcode::Call.grammar(), Grammar::Target);
        assert_eq!(Opcode::Reti.grammar(), Grammar::Bare);
        assert_eq!(Mnemonic::Db.grammar(), Grammar::Byte);
    }
}
