use arch::op::Mnemonic;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: Pos,
}

impl Token {
    pub fn new(kind: TokenKind, pos: Pos) -> Self {
        Token { kind, pos }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Single character tokens
    Plus,     // '+'
    Minus,    // '-'
    Comma,    // ','
    LParen,   // '('
    RParen,   // ')'
    LBracket, // '['
    RBracket, // ']'

    // Line structure
    Label(String),         // "name:"
    Instruction(Mnemonic), // "add", "jump", "db", ...
    Define(String),        // "#define NAME"
    FileInclude(String),   // "#include \"path\""
    SystemInclude(String), // "#include <name>"

    // Operands
    Ident(String),
    Number(String, usize),

    Newline,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TokenKind::*;
        match self {
            Plus => write!(f, "+"),
            Minus => write!(f, "-"),
            Comma => write!(f, ","),
            LParen => write!(f, "("),
            RParen => write!(f, ")"),
            LBracket => write!(f, "["),
            RBracket => write!(f, "]"),
            Label(name) => write!(f, "{name}:"),
            Instruction(mnemonic) => write!(f, "{mnemonic}"),
            Define(name) => write!(f, "#define {name}"),
            FileInclude(path) => write!(f, "#include \"{path}\""),
            SystemInclude(name) => write!(f, "#include <{name}>"),
            Ident(name) => write!(f, "{name}"),
            Number(lexeme, _) => write!(f, "{lexeme}"),
            Newline => writeln!(f),
            Eof => Ok(()),
        }
    }
}

/// 1-based location of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pos {
    pub file: Rc<str>,
    pub line: usize,
    pub col: usize,
}

impl Pos {
    pub fn new(file: &Rc<str>, line: usize, col: usize) -> Self {
        Pos {
            file: Rc::clone(file),
            line,
            col,
        }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.col)
    }
}

/// Source text of a token run, the way it reads in an error message.
pub fn render(tokens: &[Token]) -> String {
    let mut text = String::new();
    for (idx, token) in tokens.iter().enumerate() {
        let prev = idx.checked_sub(1).map(|i| &tokens[i].kind);
        let glue = match (prev, &token.kind) {
            (None, _) => true,
            (Some(TokenKind::LParen | TokenKind::LBracket), _) => true,
            (Some(TokenKind::Plus | TokenKind::Minus), _) => true,
            (_, TokenKind::Comma | TokenKind::RParen | TokenKind::RBracket) => true,
            (_, TokenKind::LBracket) => true,
            (
                Some(TokenKind::Ident(_) | TokenKind::Number(..) | TokenKind::RParen),
                TokenKind::Plus | TokenKind::Minus,
            ) => true,
            (Some(TokenKind::Number(..)), TokenKind::LParen) => true,
            _ => false,
        };
        if !glue {
            text.push(' ');
        }
        text.push_str(&token.kind.to_string());
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_operands() {
        let file: Rc<str> = Rc::from("t");
        let pos = Pos::new(&file, 1, 1);
        let tokens: Vec<Token> = [
            TokenKind::Instruction(Mnemonic::parse("load").unwrap()),
            TokenKind::LParen,
            TokenKind::Ident("fp".into()),
            TokenKind::Plus,
            TokenKind::Number("5".into(), 5),
            TokenKind::RParen,
            TokenKind::Comma,
            TokenKind::Ident("A".into()),
        ]
        .into_iter()
        .map(|kind| Token::new(kind, pos.clone()))
        .collect();
        assert_eq!(render(&tokens), "load (fp+5), A");
    }
}
