use arch::op::Mnemonic;

use crate::error::{AssembleError, AssembleErrorKind};
use crate::operand::Operand;
use crate::token::{render, Pos, Token, TokenKind};

// ----------------------------------------------------------------------------
// Statement

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Label(String),
    Define(String, u16),
    Code(Mnemonic, Vec<Operand>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub pos: Pos,
    pub text: String,
}

impl Stmt {
    fn new(kind: StmtKind, tokens: &[Token]) -> Self {
        Stmt {
            kind,
            pos: tokens[0].pos.clone(),
            text: render(tokens),
        }
    }
}

/// Split a flattened token stream into statements. Line breaks separate
/// instructions; any number of labels may precede one on the same line.
pub fn parse(tokens: &[Token]) -> Result<Vec<Stmt>, AssembleError> {
    let mut stmts = vec![];
    for line in tokens.split(|t| matches!(t.kind, TokenKind::Newline | TokenKind::Eof)) {
        let mut rest = line;
        while let Some((head, tail)) = rest.split_first() {
            match &head.kind {
                TokenKind::Label(name) => {
                    let label = StmtKind::Label(name.clone());
                    stmts.push(Stmt::new(label, std::slice::from_ref(head)));
                    rest = tail;
                }
                _ => break,
            }
        }
        if let Some(stmt) = parse_line(rest)? {
            stmts.push(stmt);
        }
    }
    Ok(stmts)
}

fn parse_line(line: &[Token]) -> Result<Option<Stmt>, AssembleError> {
    let Some((head, args)) = line.split_first() else {
        return Ok(None);
    };
    let error = |pos: &Pos, kind| AssembleError::new(pos.clone(), render(line), kind);

    match &head.kind {
        TokenKind::Define(name) => match args {
            [Token {
                kind: TokenKind::Number(_, n),
                pos,
            }] => {
                let value = u16::try_from(*n)
                    .map_err(|_| error(pos, AssembleErrorKind::ValueRange(*n, "a 16-bit value")))?;
                Ok(Some(Stmt::new(StmtKind::Define(name.clone(), value), line)))
            }
            _ => Err(error(&head.pos, AssembleErrorKind::DefineValue(name.clone()))),
        },
        TokenKind::Instruction(mnemonic) => {
            let mut operands = vec![];
            if !args.is_empty() {
                for group in args.split(|t| t.kind == TokenKind::Comma) {
                    let Some(first) = group.first() else {
                        return Err(error(&head.pos, AssembleErrorKind::UnexpectedToken(",".into())));
                    };
                    operands.push(Operand::parse(group).map_err(|kind| error(&first.pos, kind))?);
                }
            }
            Ok(Some(Stmt::new(StmtKind::Code(*mnemonic, operands), line)))
        }
        TokenKind::Ident(word) => Err(error(
            &head.pos,
            AssembleErrorKind::UnknownInstruction(word.clone()),
        )),
        other => Err(error(
            &head.pos,
            AssembleErrorKind::UnexpectedToken(other.to_string()),
        )),
    }
}
