use arch::op::{Mnemonic, Opcode};
use ppasm::error::LexErrorKind;
use ppasm::token::{TokenKind, TokenKind::*};

fn assert(code: &str, expect: TokenKind) {
    let tokens = ppasm::lexer::tokenize("t", code).unwrap();
    let kinds: Vec<TokenKind> = tokens.into_iter().map(|t| t.kind).collect();
    match expect {
        Newline => assert_eq!(kinds, vec![Newline, Eof]),
        expect => assert_eq!(kinds, vec![expect, Newline, Eof]),
    }
}

fn assert_err(code: &str, expect: LexErrorKind) {
    let err = ppasm::lexer::tokenize("t", code).unwrap_err();
    assert_eq!(err.kind, expect);
}

macro_rules! case {
    ($name:ident, $code:expr, $expect:expr) => {
        #[test]
        fn $name() {
            assert($code, $expect);
        }
    };
}

macro_rules! fail {
    ($name:ident, $code:expr, $expect:expr) => {
        #[test]
        fn $name() {
            assert_err($code, $expect);
        }
    };
}

// ---- Punctuation ----
case!(plus, "+", Plus);
case!(minus, "-", Minus);
case!(comma, ",", Comma);
case!(lparen, "(", LParen);
case!(rparen, ")", RParen);
case!(lbracket, "[", LBracket);
case!(rbracket, "]", RBracket);

// ---- Numbers ----
case!(dec, "42", Number("42".into(), 42));
case!(hex, "0xAbCd", Number("0xAbCd".into(), 0xabcd));
case!(bin, "0b1010", Number("0b1010".into(), 10));
case!(zero, "0", Number("0".into(), 0));
fail!(hex_empty, "0x", LexErrorKind::MalformedNumber("0x".into()));
fail!(bin_digit, "0b102", LexErrorKind::MalformedNumber("0b102".into()));
fail!(dec_suffix, "12ab", LexErrorKind::MalformedNumber("12ab".into()));

// ---- Words ----
case!(ident, "loop_1", Ident("loop_1".into()));
case!(register, "A", Ident("A".into()));
case!(fp, "fp", Ident("fp".into()));
case!(mnemonic, "jumpnz", Instruction(Mnemonic::Op(Opcode::Jumpnz)));
case!(mnemonic_upper, "HALT", Instruction(Mnemonic::Op(Opcode::Halt)));
case!(db, "db", Instruction(Mnemonic::Db));
case!(label, "__start:", Label("__start".into()));
case!(label_mnemonic, "add:", Label("add".into()));

// ---- Directives ----
case!(file_include, "#include \"lib/x.pp\"", FileInclude("lib/x.pp".into()));
case!(system_include, "#include <midi>", SystemInclude("midi".into()));
case!(define, "#define TEMPO", Define("TEMPO".into()));
fail!(unknown_directive, "#pragma", LexErrorKind::UnknownDirective("pragma".into()));
fail!(unterminated_include, "#include \"x", LexErrorKind::MalformedInclude);
fail!(empty_include, "#include <>", LexErrorKind::MalformedInclude);
fail!(define_number, "#define 1", LexErrorKind::MalformedDefine);

// ---- Comments and errors ----
case!(slash_comment, "// halt", Newline);
case!(semicolon_comment, "; halt", Newline);
fail!(lone_slash, "/ x", LexErrorKind::UnexpectedChar('/'));
fail!(star, "*", LexErrorKind::UnexpectedChar('*'));
