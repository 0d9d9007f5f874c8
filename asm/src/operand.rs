use arch::reg::Reg;
use std::fmt;

use crate::error::AssembleErrorKind;
use crate::token::{render, Token, TokenKind};

/// A number or a name resolved later against the define and label tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Imm {
    Literal(usize),
    Ident(String),
}

impl fmt::Display for Imm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Imm::Literal(n) => write!(f, "{n:#x}"),
            Imm::Ident(name) => write!(f, "{name}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dir {
    Plus,
    Minus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// `N`, `NAME`
    Imm(Imm),
    /// `A`, `B`
    Reg(Reg),
    /// `fp`, `fp+N`, `fp[-N]`, `+N(fp)`
    Fp(i8),
    /// `fp+R`, `fp-R`, `fp[R]`
    FpReg(Dir, Reg),
    /// `NAME+N`, `NAME[N]`
    Indexed(Imm, i8),
    /// `NAME+R`, `NAME-R`, `NAME[R]`
    IndexedReg(Imm, Dir, Reg),
}

enum Base {
    Fp,
    Imm(Imm),
}

fn is_fp(name: &str) -> bool {
    name.eq_ignore_ascii_case("fp")
}

fn dir(kind: &TokenKind) -> Option<Dir> {
    match kind {
        TokenKind::Plus => Some(Dir::Plus),
        TokenKind::Minus => Some(Dir::Minus),
        _ => None,
    }
}

fn reg(kind: &TokenKind) -> Option<Reg> {
    match kind {
        TokenKind::Ident(name) => Reg::parse(name).ok(),
        _ => None,
    }
}

fn base(kind: &TokenKind) -> Option<Base> {
    match kind {
        TokenKind::Number(_, n) => Some(Base::Imm(Imm::Literal(*n))),
        TokenKind::Ident(name) if is_fp(name) => Some(Base::Fp),
        TokenKind::Ident(name) if Reg::parse(name).is_err() => {
            Some(Base::Imm(Imm::Ident(name.clone())))
        }
        _ => None,
    }
}

/// `±n` as a signed 8-bit offset.
pub fn offset(dir: Dir, n: usize) -> Result<i8, AssembleErrorKind> {
    let value = match dir {
        Dir::Plus => n as i128,
        Dir::Minus => -(n as i128),
    };
    i8::try_from(value).map_err(|_| AssembleErrorKind::OffsetRange(value))
}

impl Operand {
    pub fn parse(tokens: &[Token]) -> Result<Operand, AssembleErrorKind> {
        let kinds: Vec<&TokenKind> = tokens.iter().map(|t| &t.kind).collect();
        let inner = match kinds.as_slice() {
            [TokenKind::LParen, inner @ .., TokenKind::RParen] if !inner.is_empty() => inner,
            all => all,
        };
        Operand::parse_inner(inner)
            .ok_or_else(|| AssembleErrorKind::OperandShape(render(tokens), "an operand"))?
    }

    /// `None` when the tokens match no operand form at all.
    fn parse_inner(kinds: &[&TokenKind]) -> Option<Result<Operand, AssembleErrorKind>> {
        use TokenKind::*;

        let indexed = |base: Base, dir: Dir, n: usize| -> Result<Operand, AssembleErrorKind> {
            let off = offset(dir, n)?;
            Ok(match base {
                Base::Fp => Operand::Fp(off),
                Base::Imm(imm) => Operand::Indexed(imm, off),
            })
        };
        let indexed_reg = |base: Base, dir: Dir, r: Reg| match base {
            Base::Fp => Operand::FpReg(dir, r),
            Base::Imm(imm) => Operand::IndexedReg(imm, dir, r),
        };

        Some(match *kinds {
            // N
            [Number(_, n)] => Ok(Operand::Imm(Imm::Literal(*n))),
            // A, fp, NAME
            [Ident(name)] => Ok(match (is_fp(name), Reg::parse(name)) {
                (true, _) => Operand::Fp(0),
                (false, Ok(r)) => Operand::Reg(r),
                (false, Err(_)) => Operand::Imm(Imm::Ident(name.clone())),
            }),
            // +N(fp)
            [sign, Number(_, n), LParen, Ident(name), RParen] if is_fp(name) => {
                indexed(Base::Fp, dir(sign)?, *n)
            }
            // fp+N, NAME-N
            [b, sign, Number(_, n)] => indexed(base(b)?, dir(sign)?, *n),
            // fp+R, NAME-R
            [b, sign, r] => Ok(indexed_reg(base(b)?, dir(sign)?, reg(r)?)),
            // fp[N], NAME[N]
            [b, LBracket, Number(_, n), RBracket] => indexed(base(b)?, Dir::Plus, *n),
            // fp[-N]
            [b, LBracket, sign, Number(_, n), RBracket] => indexed(base(b)?, dir(sign)?, *n),
            // fp[R], NAME[R]
            [b, LBracket, r, RBracket] => Ok(indexed_reg(base(b)?, Dir::Plus, reg(r)?)),
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse(code: &str) -> Result<Operand, AssembleErrorKind> {
        let tokens = tokenize("t", code).unwrap();
        let end = tokens.len() - 2; // Newline, Eof
        Operand::parse(&tokens[..end])
    }

    macro_rules! case {
        ($name:ident, $code:expr, $expect:expr) => {
            #[test]
            fn $name() {
                assert_eq!(parse($code), $expect);
            }
        };
    }

    fn ident(name: &str) -> Imm {
        Imm::Ident(name.to_string())
    }

    case!(literal, "0xae", Ok(Operand::Imm(Imm::Literal(0xae))));
    case!(name, "label", Ok(Operand::Imm(ident("label"))));
    case!(register, "B", Ok(Operand::Reg(Reg::B)));
    case!(register_lower, "a", Ok(Operand::Reg(Reg::A)));
    case!(fp_alone, "fp", Ok(Operand::Fp(0)));
    case!(fp_paren_plus, "(fp+5)", Ok(Operand::Fp(5)));
    case!(fp_paren_minus, "(fp - 1)", Ok(Operand::Fp(-1)));
    case!(fp_bracket, "fp[-1]", Ok(Operand::Fp(-1)));
    case!(fp_bracket_paren, "(fp[3])", Ok(Operand::Fp(3)));
    case!(fp_prefix_plus, "+1(fp)", Ok(Operand::Fp(1)));
    case!(fp_prefix_minus, "-128(fp)", Ok(Operand::Fp(-128)));
    case!(fp_plus_reg, "(fp + B)", Ok(Operand::FpReg(Dir::Plus, Reg::B)));
    case!(fp_minus_reg, "(fp - A)", Ok(Operand::FpReg(Dir::Minus, Reg::A)));
    case!(fp_index_reg, "fp[B]", Ok(Operand::FpReg(Dir::Plus, Reg::B)));
    case!(label_offset, "table+2", Ok(Operand::Indexed(ident("table"), 2)));
    case!(label_index, "table[4]", Ok(Operand::Indexed(ident("table"), 4)));
    case!(label_reg, "(table+B)", Ok(Operand::IndexedReg(ident("table"), Dir::Plus, Reg::B)));
    case!(label_index_reg, "table[A]", Ok(Operand::IndexedReg(ident("table"), Dir::Plus, Reg::A)));
    case!(literal_minus_reg, "0x100-A", Ok(Operand::IndexedReg(Imm::Literal(0x100), Dir::Minus, Reg::A)));
    case!(offset_max, "fp+127", Ok(Operand::Fp(127)));
    case!(offset_too_big, "fp+128", Err(AssembleErrorKind::OffsetRange(128)));
    case!(offset_too_small, "fp[-129]", Err(AssembleErrorKind::OffsetRange(-129)));
    case!(
        offset_huge,
        "fp-9223372036854775808",
        Err(AssembleErrorKind::OffsetRange(-9223372036854775808))
    );
    case!(
        offset_huge_index,
        "x[-18446744073709551615]",
        Err(AssembleErrorKind::OffsetRange(-18446744073709551615))
    );
    case!(
        register_base,
        "A+1",
        Err(AssembleErrorKind::OperandShape("A+1".into(), "an operand"))
    );
    case!(
        dangling_paren,
        "(fp+1",
        Err(AssembleErrorKind::OperandShape("(fp+1".into(), "an operand"))
    );
}
