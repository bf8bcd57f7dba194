//! aspen-lex - Lexical analysis for Aspen source text.
//!
//! The scanner turns a slice of Unicode scalar values into a flat token
//! stream terminated by `Eof`. Lexical errors are recorded in the shared
//! reporter and scanning continues, so the returned stream is always well
//! formed; callers check the reporter before moving on.

mod lexer;
mod token;

pub use lexer::scan_tokens;
pub use token::{Token, TokenKind, TokenStream, TokenValue};
