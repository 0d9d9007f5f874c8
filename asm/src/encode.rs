use arch::mode::Mode;
use arch::op::{Grammar, Mnemonic};
use arch::reg::Reg;

use crate::error::AssembleErrorKind;
use crate::ident::Idents;
use crate::operand::{Dir, Imm, Operand};

type Result<T> = std::result::Result<T, AssembleErrorKind>;

/// Encode one instruction. Both assembler passes call this, so the byte
/// count pass 1 reserves is the byte count pass 2 writes.
pub fn encode(mnemonic: Mnemonic, args: &[Operand], idents: &dyn Idents) -> Result<Vec<u8>> {
    let grammar = mnemonic.grammar();
    let opcode = mnemonic.opcode().map(u8::from);

    // Check operand count against the grammar
    // Example: arity!(1) or arity!(0, 1)
    macro_rules! arity {
        ($($n:expr),+) => {
            if ![$($n),+].contains(&args.len()) {
                let expect = [$(stringify!($n)),+].join(" or ");
                return Err(AssembleErrorKind::Arity(mnemonic.to_string(), expect, args.len()));
            }
        };
    }

    let mut bin: Vec<u8> = opcode.into_iter().collect();
    match grammar {
        Grammar::Bare => {
            arity!(0);
        }
        Grammar::Target => {
            arity!(1);
            bin.extend(target(&args[0], idents)?.to_be_bytes());
        }
        Grammar::Byte => {
            arity!(1);
            let value = match &args[0] {
                Operand::Imm(imm) => resolve(imm, idents)?,
                other => return Err(shape(other, "a data byte")),
            };
            let byte = u8::try_from(value)
                .map_err(|_| AssembleErrorKind::ValueRange(value as usize, "a data byte"))?;
            bin.push(byte);
        }
        Grammar::Push | Grammar::Alu => {
            arity!(0, 1);
            let (mode, arg) = match args.first() {
                Some(arg) => value(arg, idents)?,
                None if grammar == Grammar::Push => (Mode::Register, Reg::A.into()),
                None => (Mode::Register, Reg::B.into()),
            };
            bin.extend([mode.into(), arg]);
        }
        Grammar::Mov => {
            arity!(2);
            let dst = register(&args[0])?;
            let (mode, arg) = value(&args[1], idents)?;
            bin.extend([dst.into(), mode.into(), arg]);
        }
        Grammar::Load => {
            arity!(2);
            let (mode, arg, base) = address(&args[0], idents)?;
            let dst = register(&args[1])?;
            bin.extend([mode.into(), arg]);
            bin.extend(base.to_be_bytes());
            bin.push(dst.into());
        }
        Grammar::Store => {
            arity!(2);
            let src = register(&args[0])?;
            let (mode, arg, base) = address(&args[1], idents)?;
            bin.extend([src.into(), mode.into(), arg]);
            bin.extend(base.to_be_bytes());
        }
    }
    Ok(bin)
}

fn shape(operand: &Operand, expect: &'static str) -> AssembleErrorKind {
    AssembleErrorKind::OperandShape(describe(operand), expect)
}

fn describe(operand: &Operand) -> String {
    let sign = |dir: &Dir| match dir {
        Dir::Plus => '+',
        Dir::Minus => '-',
    };
    match operand {
        Operand::Imm(imm) => imm.to_string(),
        Operand::Reg(r) => r.to_string(),
        Operand::Fp(off) => format!("fp{off:+}"),
        Operand::FpReg(dir, r) => format!("fp{}{r}", sign(dir)),
        Operand::Indexed(imm, off) => format!("{imm}{off:+}"),
        Operand::IndexedReg(imm, dir, r) => format!("{imm}{}{r}", sign(dir)),
    }
}

/// Literal or name as a 16-bit value.
fn resolve(imm: &Imm, idents: &dyn Idents) -> Result<u16> {
    match imm {
        Imm::Literal(n) => {
            u16::try_from(*n).map_err(|_| AssembleErrorKind::ValueRange(*n, "a 16-bit value"))
        }
        Imm::Ident(name) => idents
            .get_val(name)
            .ok_or_else(|| AssembleErrorKind::Undefined(name.clone())),
    }
}

fn register(operand: &Operand) -> Result<Reg> {
    match operand {
        Operand::Reg(r) => Ok(*r),
        other => Err(shape(other, "a register")),
    }
}

fn target(operand: &Operand, idents: &dyn Idents) -> Result<u16> {
    match operand {
        Operand::Imm(imm) => resolve(imm, idents),
        Operand::Indexed(imm, off) => Ok(resolve(imm, idents)?.wrapping_add_signed(*off as i16)),
        other => Err(shape(other, "a jump target")),
    }
}

/// Mode byte and argument where an instruction reads a value. Names and
/// literals contribute their low byte.
fn value(operand: &Operand, idents: &dyn Idents) -> Result<(Mode, u8)> {
    Ok(match operand {
        Operand::Imm(imm) => (Mode::Immediate, resolve(imm, idents)? as u8),
        Operand::Indexed(imm, off) => {
            let value = resolve(imm, idents)?.wrapping_add_signed(*off as i16);
            (Mode::Immediate, value as u8)
        }
        Operand::Reg(r) => (Mode::Register, (*r).into()),
        Operand::Fp(off) => (Mode::FramePointerWithOffset, *off as u8),
        Operand::FpReg(Dir::Plus, r) => (Mode::FramePointerPlusRegister, (*r).into()),
        Operand::FpReg(Dir::Minus, r) => (Mode::FramePointerMinusRegister, (*r).into()),
        other @ Operand::IndexedReg(..) => return Err(shape(other, "a value")),
    })
}

/// Mode byte, argument and 16-bit base where an instruction needs an address.
fn address(operand: &Operand, idents: &dyn Idents) -> Result<(Mode, u8, u16)> {
    Ok(match operand {
        Operand::Imm(imm) => (Mode::Immediate, 0, resolve(imm, idents)?),
        Operand::Indexed(imm, off) => (Mode::Immediate, *off as u8, resolve(imm, idents)?),
        Operand::IndexedReg(imm, Dir::Plus, r) => {
            (Mode::ImmediatePlusRegister, (*r).into(), resolve(imm, idents)?)
        }
        Operand::IndexedReg(imm, Dir::Minus, r) => {
            (Mode::ImmediateMinusRegister, (*r).into(), resolve(imm, idents)?)
        }
        Operand::Fp(off) => (Mode::FramePointerWithOffset, *off as u8, 0),
        Operand::FpReg(Dir::Plus, r) => (Mode::FramePointerPlusRegister, (*r).into(), 0),
        Operand::FpReg(Dir::Minus, r) => (Mode::FramePointerMinusRegister, (*r).into(), 0),
        other @ Operand::Reg(_) => return Err(shape(other, "an address")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::Sizing;
    use arch::op::Opcode;

    fn op(opcode: Opcode) -> Mnemonic {
        Mnemonic::Op(opcode)
    }

    #[test]
    fn width_does_not_depend_on_names() {
        struct Far;
        impl Idents for Far {
            fn get_val(&self, _: &str) -> Option<u16> {
                Some(0xffff)
            }
        }
        let args = vec![
            Operand::Imm(Imm::Ident("x".into())),
            Operand::Reg(Reg::A),
        ];
        let sized = encode(op(Opcode::Load), &args, &Sizing).unwrap();
        let real = encode(op(Opcode::Load), &args, &Far).unwrap();
        assert_eq!(sized.len(), real.len());
        assert_eq!(real, vec![0x01, 0x00, 0x00, 0xff, 0xff, 0x00]);
    }

    #[test]
    fn arity() {
        let err = encode(op(Opcode::Swap), &[Operand::Reg(Reg::A)], &Sizing).unwrap_err();
        assert_eq!(err, AssembleErrorKind::Arity("swap".into(), "0".into(), 1));
        let err = encode(op(Opcode::Add), &[Operand::Reg(Reg::A), Operand::Reg(Reg::B)], &Sizing)
            .unwrap_err();
        assert_eq!(err, AssembleErrorKind::Arity("add".into(), "0 or 1".into(), 2));
    }

    #[test]
    fn shapes() {
        let err = encode(op(Opcode::Mov), &[Operand::Fp(1), Operand::Reg(Reg::A)], &Sizing)
            .unwrap_err();
        assert_eq!(err, AssembleErrorKind::OperandShape("fp+1".into(), "a register"));
        let err = encode(op(Opcode::Load), &[Operand::Reg(Reg::B), Operand::Reg(Reg::A)], &Sizing)
            .unwrap_err();
        assert_eq!(err, AssembleErrorKind::OperandShape("B".into(), "an address"));
        let arg = Operand::IndexedReg(Imm::Ident("t".into()), Dir::Minus, Reg::B);
        let err = encode(op(Opcode::Push), &[arg], &Sizing).unwrap_err();
        assert_eq!(err, AssembleErrorKind::OperandShape("t-B".into(), "a value"));
    }

    #[test]
    fn db_range() {
        let arg = [Operand::Imm(Imm::Literal(0x100))];
        let err = encode(Mnemonic::Db, &arg, &Sizing).unwrap_err();
        assert_eq!(err, AssembleErrorKind::ValueRange(0x100, "a data byte"));
    }
}
