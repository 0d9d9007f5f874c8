use arch::op::Mnemonic;
use std::iter::Peekable;
use std::rc::Rc;
use std::str::CharIndices;

use crate::error::{LexError, LexErrorKind};
use crate::token::{Pos, Token, TokenKind};

pub struct Lexer<'a> {
    file: Rc<str>,
    code: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(file: &str, code: &'a str) -> Self {
        Self {
            file: Rc::from(file),
            code,
        }
    }

    /// Every line ends with a `Newline` token and the stream ends with `Eof`.
    pub fn parse(self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        let mut last = 0;
        for (idx, line) in self.code.lines().enumerate() {
            let lexer = LineLexer::new(line, &self.file, idx + 1);
            tokens.extend(lexer.parse()?);
            tokens.push(Token::new(
                TokenKind::Newline,
                Pos::new(&self.file, idx + 1, line.chars().count() + 1),
            ));
            last = idx + 1;
        }
        tokens.push(Token::new(TokenKind::Eof, Pos::new(&self.file, last + 1, 1)));
        Ok(tokens)
    }
}

/// Shorthand for lexing one source text.
pub fn tokenize(file: &str, code: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(file, code).parse()
}

pub struct LineLexer<'a> {
    iter: Peekable<CharIndices<'a>>,
    line: &'a str,
    file: &'a Rc<str>,
    row: usize,
}

impl<'a> LineLexer<'a> {
    pub fn new(line: &'a str, file: &'a Rc<str>, row: usize) -> Self {
        Self {
            iter: line.char_indices().peekable(),
            line,
            file,
            row,
        }
    }
}

// ----------------------------------------------------------------------------
// Helpers
// ----------------------------------------------------------------------------

impl<'a> LineLexer<'a> {
    fn peek_nth(&self, n: usize) -> Option<(usize, char)> {
        self.iter.clone().nth(n)
    }
    fn consume(&mut self) -> Option<(usize, char)> {
        self.iter.next()
    }
    fn pos(&self, idx: usize) -> Pos {
        Pos::new(self.file, self.row, self.line[..idx].chars().count() + 1)
    }
    fn skip_spaces(&mut self) {
        while self.iter.next_if(|(_, c)| c.is_whitespace()).is_some() {}
    }
    fn word(&mut self) -> String {
        let mut lexeme = String::new();
        while let Some((_, ch)) = self
            .iter
            .next_if(|(_, ch)| matches!(ch, '_' | '0'..='9' | 'a'..='z' | 'A'..='Z'))
        {
            lexeme.push(ch);
        }
        lexeme
    }
}

// ----------------------------------------------------------------------------
// Parser
// ----------------------------------------------------------------------------

impl<'a> LineLexer<'a> {
    pub fn parse(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        while let Some((idx, ch0)) = self.peek_nth(0) {
            // 0. Skip whitespaces
            if ch0.is_whitespace() {
                self.consume();
                continue;
            }

            let pos = self.pos(idx);

            // 1. Comment
            if ch0 == ';' {
                break;
            }
            if ch0 == '/' {
                match self.peek_nth(1) {
                    Some((_, '/')) => break,
                    _ => return Err(LexError::new(pos, LexErrorKind::UnexpectedChar(ch0))),
                }
            }

            // 2. Single character token
            if let Some(kind) = single_char_token(ch0) {
                self.consume();
                tokens.push(Token::new(kind, pos));
                continue;
            }

            // 3. Number literal
            if ch0.is_ascii_digit() {
                let kind = self.parse_number().map_err(|kind| LexError::new(pos.clone(), kind))?;
                tokens.push(Token::new(kind, pos));
                continue;
            }

            // 4. Directive
            if ch0 == '#' {
                let kind = self.parse_directive().map_err(|kind| LexError::new(pos.clone(), kind))?;
                tokens.push(Token::new(kind, pos));
                continue;
            }

            // 5. Identifier, mnemonic or label
            if ch0.is_ascii_alphabetic() || ch0 == '_' {
                let lexeme = self.word();
                let kind = if self.iter.next_if(|(_, ch)| *ch == ':').is_some() {
                    TokenKind::Label(lexeme)
                } else {
                    match Mnemonic::parse(&lexeme) {
                        Ok(mnemonic) => TokenKind::Instruction(mnemonic),
                        Err(_) => TokenKind::Ident(lexeme),
                    }
                };
                tokens.push(Token::new(kind, pos));
                continue;
            }

            // Error
            return Err(LexError::new(pos, LexErrorKind::UnexpectedChar(ch0)));
        }
        Ok(tokens)
    }

    // #include "path" / #include <name> / #define NAME
    fn parse_directive(&mut self) -> Result<TokenKind, LexErrorKind> {
        self.consume(); // consume '#'
        let directive = self.word();
        match directive.as_str() {
            "include" => {
                self.skip_spaces();
                let close = match self.consume() {
                    Some((_, '"')) => '"',
                    Some((_, '<')) => '>',
                    _ => return Err(LexErrorKind::MalformedInclude),
                };
                let mut name = String::new();
                loop {
                    match self.consume() {
                        Some((_, ch)) if ch == close => break,
                        Some((_, ch)) => name.push(ch),
                        None => return Err(LexErrorKind::MalformedInclude),
                    }
                }
                if name.is_empty() {
                    return Err(LexErrorKind::MalformedInclude);
                }
                Ok(match close {
                    '"' => TokenKind::FileInclude(name),
                    _ => TokenKind::SystemInclude(name),
                })
            }
            "define" => {
                self.skip_spaces();
                match self.peek_nth(0) {
                    Some((_, ch)) if ch.is_ascii_alphabetic() || ch == '_' => {
                        Ok(TokenKind::Define(self.word()))
                    }
                    _ => Err(LexErrorKind::MalformedDefine),
                }
            }
            _ => Err(LexErrorKind::UnknownDirective(directive)),
        }
    }

    fn parse_number(&mut self) -> Result<TokenKind, LexErrorKind> {
        let lexeme = self.word();
        let (digits, radix) = match lexeme.get(..2) {
            Some("0x" | "0X") => (&lexeme[2..], 16),
            Some("0b" | "0B") => (&lexeme[2..], 2),
            _ => (lexeme.as_str(), 10),
        };
        match usize::from_str_radix(digits, radix) {
            Ok(num) => Ok(TokenKind::Number(lexeme, num)),
            Err(_) => Err(LexErrorKind::MalformedNumber(lexeme)),
        }
    }
}

fn single_char_token(ch: char) -> Option<TokenKind> {
    match ch {
        '+' => Some(TokenKind::Plus),
        '-' => Some(TokenKind::Minus),
        ',' => Some(TokenKind::Comma),
        '(' => Some(TokenKind::LParen),
        ')' => Some(TokenKind::RParen),
        '[' => Some(TokenKind::LBracket),
        ']' => Some(TokenKind::RBracket),
        _ => None,
    }
}
