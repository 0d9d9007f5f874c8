pub mod assembler;
pub mod encode;
pub mod error;
pub mod ident;
pub mod include;
pub mod label;
pub mod lexer;
pub mod operand;
pub mod parser;
pub mod sysinc;
pub mod token;
pub mod util;

pub use assembler::{assemble, assemble_tokens, Assembly, Config};
pub use error::Error;
