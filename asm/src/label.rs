use arch::memmap::MEMORY_SIZE;

use crate::encode::encode;
use crate::error::{AssembleError, AssembleErrorKind};
use crate::ident::{DefineTable, LabelTable, Sizing};
use crate::parser::{self, Stmt, StmtKind};
use crate::token::Token;

/// Pass 1: assign every label the address of the byte that follows it.
/// `origin` is where the first statement lands.
pub fn compute_labels(tokens: &[Token], origin: u16) -> Result<LabelTable, AssembleError> {
    let stmts = parser::parse(tokens)?;
    labels_of(&stmts, origin)
}

pub(crate) fn labels_of(stmts: &[Stmt], origin: u16) -> Result<LabelTable, AssembleError> {
    tracing::debug!("pass 1: {} statements from {:#06x}", stmts.len(), origin);
    let mut labels = LabelTable::new();
    let mut cursor = origin as usize;
    for stmt in stmts {
        match &stmt.kind {
            StmtKind::Label(name) => {
                let addr = u16::try_from(cursor).map_err(|_| {
                    AssembleError::new(
                        stmt.pos.clone(),
                        &stmt.text,
                        AssembleErrorKind::ValueRange(cursor, "a 16-bit address"),
                    )
                })?;
                if labels.insert(name.clone(), addr).is_some() {
                    return Err(AssembleError::new(
                        stmt.pos.clone(),
                        &stmt.text,
                        AssembleErrorKind::RedefinedLabel(name.clone()),
                    ));
                }
            }
            StmtKind::Code(mnemonic, args) => {
                let width = encode(*mnemonic, args, &Sizing)
                    .map_err(|kind| AssembleError::new(stmt.pos.clone(), &stmt.text, kind))?
                    .len();
                cursor += width;
                if cursor > MEMORY_SIZE {
                    return Err(AssembleError::new(
                        stmt.pos.clone(),
                        &stmt.text,
                        AssembleErrorKind::ValueRange(cursor, "a 16-bit address"),
                    ));
                }
            }
            StmtKind::Define(..) => {}
        }
    }
    tracing::debug!("pass 1: {} labels, {} bytes", labels.len(), cursor);
    Ok(labels)
}

/// Collect every `#define` in the stream, wherever it appears.
pub fn collect_defines(tokens: &[Token]) -> Result<DefineTable, AssembleError> {
    let stmts = parser::parse(tokens)?;
    defines_of(&stmts)
}

pub(crate) fn defines_of(stmts: &[Stmt]) -> Result<DefineTable, AssembleError> {
    let mut defines = DefineTable::new();
    for stmt in stmts {
        if let StmtKind::Define(name, value) = &stmt.kind {
            if defines.insert(name.clone(), *value).is_some() {
                return Err(AssembleError::new(
                    stmt.pos.clone(),
                    &stmt.text,
                    AssembleErrorKind::RedefinedDefine(name.clone()),
                ));
            }
        }
    }
    Ok(defines)
}
