use color_print::cprintln;
use indexmap::IndexMap;
use thiserror::Error;

use crate::token::Pos;

// ----------------------------------------------------------------------------
// Lexer

#[derive(Error, Debug)]
#[error("{pos}: {kind}")]
pub struct LexError {
    pub pos: Pos,
    pub kind: LexErrorKind,
}

impl LexError {
    pub fn new(pos: Pos, kind: LexErrorKind) -> Self {
        LexError { pos, kind }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LexErrorKind {
    #[error("Unexpected character `{0}`")]
    UnexpectedChar(char),

    #[error("Malformed number `{0}`")]
    MalformedNumber(String),

    #[error("Unknown directive `#{0}`")]
    UnknownDirective(String),

    #[error("Malformed include: expected `\"path\"` or `<name>`")]
    MalformedInclude,

    #[error("Expected a name after `#define`")]
    MalformedDefine,
}

// ----------------------------------------------------------------------------
// Include resolver

/// `pos` is the site of the `#include` that failed.
#[derive(Error, Debug)]
#[error("{pos}: {kind}")]
pub struct IncludeError {
    pub pos: Pos,
    pub kind: IncludeErrorKind,
}

impl IncludeError {
    pub fn new(pos: Pos, kind: IncludeErrorKind) -> Self {
        IncludeError { pos, kind }
    }
}

#[derive(Error, Debug)]
pub enum IncludeErrorKind {
    #[error("File include not found: \"{0}\"")]
    FileNotFound(String, #[source] std::io::Error),

    #[error("System include not found: <{0}>")]
    SystemNotFound(String),

    #[error("Include cycle: {0}")]
    Cycle(String),
}

// ----------------------------------------------------------------------------
// Assembler

/// `text` is the offending line as written.
#[derive(Error, Debug)]
#[error("{pos}: {kind}")]
pub struct AssembleError {
    pub pos: Pos,
    pub text: String,
    pub kind: AssembleErrorKind,
}

impl AssembleError {
    pub fn new(pos: Pos, text: impl Into<String>, kind: AssembleErrorKind) -> Self {
        AssembleError {
            pos,
            text: text.into(),
            kind,
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AssembleErrorKind {
    #[error("Unknown instruction: `{0}`")]
    UnknownInstruction(String),

    #[error("Unexpected `{0}`")]
    UnexpectedToken(String),

    #[error("`{0}` takes {1} operand(s), found {2}")]
    Arity(String, String, usize),

    #[error("Cannot use `{0}` as {1}")]
    OperandShape(String, &'static str),

    #[error("Offset {0} out of range -128..=127")]
    OffsetRange(i128),

    #[error("Value {0:#x} out of range for {1}")]
    ValueRange(usize, &'static str),

    #[error("No definition found for identifier `{0}`")]
    Undefined(String),

    #[error("Re-defined label: `{0}`")]
    RedefinedLabel(String),

    #[error("Re-defined constant: `{0}`")]
    RedefinedDefine(String),

    #[error("`#define {0}` needs a number")]
    DefineValue(String),

    #[error("No entry point: label `{0}` is not defined")]
    MissingEntryPoint(&'static str),
}

// ----------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Include(#[from] IncludeError),

    #[error(transparent)]
    Assemble(#[from] AssembleError),

    #[error("Failed to open file: {0}")]
    FileOpen(String, #[source] std::io::Error),

    #[error("Failed to write file: {0}")]
    FileWrite(String, #[source] std::io::Error),
}

impl Error {
    pub fn pos(&self) -> Option<&Pos> {
        match self {
            Error::Lex(e) => Some(&e.pos),
            Error::Include(e) => Some(&e.pos),
            Error::Assemble(e) => Some(&e.pos),
            _ => None,
        }
    }

    /// The message without its location.
    pub fn message(&self) -> String {
        match self {
            Error::Lex(e) => e.kind.to_string(),
            Error::Include(e) => e.kind.to_string(),
            Error::Assemble(e) => e.kind.to_string(),
            other => other.to_string(),
        }
    }

    /// Print error with diagnostic information showing file location and line content
    pub fn print_diag(&self, files: &IndexMap<String, String>) {
        cprintln!("<red,bold>error</>: {}", self.message());

        let Some(pos) = self.pos() else {
            return;
        };
        cprintln!("     <blue>--></> <underline>{}</>", pos);
        cprintln!("      <blue>|</>");

        let line_content = files
            .get(pos.file.as_ref())
            .and_then(|code| code.lines().nth(pos.line.saturating_sub(1)))
            .unwrap_or("");

        cprintln!(" <blue>{:>4} |</> {}", pos.line, line_content);
        cprintln!(
            "      <blue>|</> {}<red,bold>^</>",
            " ".repeat(pos.col.saturating_sub(1))
        );
        if let Error::Assemble(e) = self {
            if !e.text.is_empty() {
                cprintln!("      <blue>= in</> <bold>{}</>", e.text);
            }
        }
    }
}
