use crate::op::Opcode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alu {
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
}

impl TryFrom<Opcode> for Alu {
    type Error = Opcode;

    fn try_from(op: Opcode) -> Result<Self, Opcode> {
        Ok(match op {
            Opcode::Add => Alu::Add,
            Opcode::Sub => Alu::Sub,
            Opcode::Mul => Alu::Mul,
            Opcode::Div => Alu::Div,
            Opcode::Shl => Alu::Shl,
            Opcode::Shr => Alu::Shr,
            Opcode::And => Alu::And,
            Opcode::Or => Alu::Or,
            Opcode::Gt => Alu::Gt,
            Opcode::Gte => Alu::Gte,
            Opcode::Lt => Alu::Lt,
            Opcode::Lte => Alu::Lte,
            Opcode::Eq => Alu::Eq,
            Opcode::Neq => Alu::Neq,
            other => return Err(other),
        })
    }
}

macro_rules! boo {
    ($cond:expr) => {
        if $cond {
            1
        } else {
            0
        }
    };
}

impl Alu {
    /// `a op b` on unsigned bytes. `None` only for division by zero.
    pub fn calc(self, a: u8, b: u8) -> Option<u8> {
        use Alu::*;
        Some(match self {
            Add => a.wrapping_add(b),
            Sub => a.wrapping_sub(b),
            Mul => a.wrapping_mul(b),
            Div => a.checked_div(b)?,
            Shl => a.checked_shl(b as u32).unwrap_or(0),
            Shr => a.checked_shr(b as u32).unwrap_or(0),
            And => a & b,
            Or => a | b,
            Gt => boo!(a > b),
            Gte => boo!(a >= b),
            Lt => boo!(a < b),
            Lte => boo!(a <= b),
            Eq => boo!(a == b),
            Neq => boo!(a != b),
        })
    }
}
