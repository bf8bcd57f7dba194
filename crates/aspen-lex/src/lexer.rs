//! The scanner.
//!
//! A straight left-to-right pass over the source. Whitespace is skipped,
//! newlines advance the line counter, and everything else becomes a token.
//! Comments are kept as tokens carrying their text; the parser discards
//! them.

use aspen_util::Reporter;

use crate::token::{Token, TokenKind, TokenStream, TokenValue};

/// Scans `source` into a token stream terminated by `Eof`.
pub fn scan_tokens<'src>(source: &'src [char], reporter: &mut Reporter<'src>) -> TokenStream {
    Lexer {
        source,
        reporter,
        pos: 0,
        line: 1,
        col: 1,
        tokens: Vec::new(),
    }
    .scan()
}

struct Lexer<'src, 'r> {
    source: &'src [char],
    reporter: &'r mut Reporter<'src>,
    pos: usize,
    line: u32,
    col: u32,
    tokens: Vec<Token>,
}

fn is_identifier_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

fn is_identifier_continue(c: char) -> bool {
    is_identifier_start(c) || c.is_ascii_digit()
}

fn keyword(identifier: &str) -> Option<TokenKind> {
    match identifier {
        "else" => Some(TokenKind::Else),
        "for" => Some(TokenKind::For),
        "fn" => Some(TokenKind::Fn),
        "if" => Some(TokenKind::If),
        "void" => Some(TokenKind::Void),
        "print" => Some(TokenKind::Print),
        "return" => Some(TokenKind::Return),
        "true" => Some(TokenKind::True),
        "false" => Some(TokenKind::False),
        "let" => Some(TokenKind::Let),
        "while" => Some(TokenKind::While),
        "i64" => Some(TokenKind::I64),
        "u64" => Some(TokenKind::U64),
        "bool" => Some(TokenKind::Bool),
        "string" => Some(TokenKind::String),
        "double" => Some(TokenKind::Double),
        _ => None,
    }
}

/// Escape sequences are recognized only while the payload is built; the
/// scanner itself treats the literal as an opaque run of scalar values.
/// `\n` becomes a newline, any other backslash sequence stays verbatim.
fn decode_escapes(raw: &[char]) -> String {
    let mut text = String::with_capacity(raw.len());
    let mut chars = raw.iter().copied();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => text.push('\n'),
                Some(other) => {
                    text.push('\\');
                    text.push(other);
                }
                None => text.push('\\'),
            }
        } else {
            text.push(c);
        }
    }
    text
}

impl<'src, 'r> Lexer<'src, 'r> {
    fn scan(mut self) -> TokenStream {
        while !self.is_at_end() {
            let c = self.advance();
            match c {
                ' ' | '\t' | '\r' => self.col += 1,
                '\n' => {
                    self.line += 1;
                    self.col = 1;
                }
                '(' => self.simple(TokenKind::LeftParen),
                ')' => self.simple(TokenKind::RightParen),
                '{' => self.simple(TokenKind::LeftBrace),
                '}' => self.simple(TokenKind::RightBrace),
                '[' => self.simple(TokenKind::LeftSquare),
                ']' => self.simple(TokenKind::RightSquare),
                ',' => self.simple(TokenKind::Comma),
                '-' => self.simple(TokenKind::Minus),
                '+' => self.simple(TokenKind::Plus),
                ';' => self.simple(TokenKind::Semicolon),
                '*' => self.simple(TokenKind::Star),
                '^' => self.simple(TokenKind::Caret),
                '%' => self.simple(TokenKind::Percent),
                '/' => {
                    if self.match_char('/') {
                        self.line_comment();
                    } else if self.match_char('*') {
                        self.block_comment();
                    } else {
                        self.simple(TokenKind::Slash);
                    }
                }
                '!' => self.one_or_two(TokenKind::Bang, TokenKind::BangEqual, '='),
                '=' => self.one_or_two(TokenKind::Equal, TokenKind::EqualEqual, '='),
                '>' => self.one_or_two(TokenKind::Greater, TokenKind::GreaterEqual, '='),
                '<' => self.one_or_two(TokenKind::Less, TokenKind::LessEqual, '='),
                '&' => self.one_or_two(TokenKind::Amp, TokenKind::AmpAmp, '&'),
                '|' => self.one_or_two(TokenKind::Pipe, TokenKind::PipePipe, '|'),
                '"' => self.string_token(),
                c if c.is_ascii_digit() => self.number_token(),
                c if is_identifier_start(c) => self.identifier_token(),
                c => {
                    self.reporter
                        .push(self.line, self.col, format!("unexpected token \"{c}\"."));
                    self.col += 1;
                }
            }
        }

        self.tokens
            .push(Token::new(TokenKind::Eof, self.line, self.col));

        TokenStream(self.tokens)
    }

    fn is_at_end(&self) -> bool {
        self.pos == self.source.len()
    }

    fn advance(&mut self) -> char {
        self.pos += 1;
        self.source[self.pos - 1]
    }

    fn peek(&self) -> char {
        self.source[self.pos]
    }

    fn match_char(&mut self, expected: char) -> bool {
        if !self.is_at_end() && self.peek() == expected {
            self.advance();
            return true;
        }
        false
    }

    fn simple(&mut self, kind: TokenKind) {
        self.tokens.push(Token::new(kind, self.line, self.col));
        self.col += 1;
    }

    fn one_or_two(&mut self, if_no_match: TokenKind, if_match: TokenKind, matcher: char) {
        if self.match_char(matcher) {
            self.tokens.push(Token::new(if_match, self.line, self.col));
            self.col += 2;
        } else {
            self.tokens.push(Token::new(if_no_match, self.line, self.col));
            self.col += 1;
        }
    }

    fn push_with_value(&mut self, kind: TokenKind, line: u32, col: u32, value: TokenValue) {
        self.tokens.push(Token {
            kind,
            line,
            col,
            value,
        });
    }

    /// A `//` comment runs through (and including) the next newline; the
    /// token's text excludes it.
    fn line_comment(&mut self) {
        let start_line = self.line;
        let start_col = self.col;
        let start = self.pos;

        self.col += 2;
        while !self.is_at_end() {
            let next = self.advance();
            self.col += 1;
            if next == '\n' {
                self.line += 1;
                self.col = 1;
                break;
            }
        }

        let mut end = self.pos;
        if self.source[start..end].last() == Some(&'\n') {
            end -= 1;
        }

        let text: String = self.source[start..end].iter().collect();
        self.push_with_value(TokenKind::Comment, start_line, start_col, TokenValue::Str(text));
    }

    /// A `/* ... */` comment; nesting is not handled.
    fn block_comment(&mut self) {
        let start_line = self.line;
        let start_col = self.col;
        let start = self.pos;

        self.col += 2;
        let mut terminated = false;

        while !self.is_at_end() {
            let next = self.advance();
            self.col += 1;
            if next == '*' {
                if !self.is_at_end() {
                    let next = self.advance();
                    self.col += 1;
                    if next == '/' {
                        terminated = true;
                        break;
                    }
                }
            } else if next == '\n' {
                self.line += 1;
                self.col = 1;
            }
        }

        if !terminated {
            self.reporter
                .push(self.line, self.col, "comment not terminated.");
        } else {
            let end = self.pos - 2;
            let text: String = self.source[start..end].iter().collect();
            self.push_with_value(TokenKind::Comment, start_line, start_col, TokenValue::Str(text));
        }
    }

    /// A string literal may not cross a newline; an unterminated literal is
    /// recorded and produces no token.
    fn string_token(&mut self) {
        let start_col = self.col;
        self.col += 1;

        let start = self.pos;
        while !self.is_at_end() && self.peek() != '\n' && self.peek() != '"' {
            self.advance();
            self.col += 1;
        }

        if self.is_at_end() || self.peek() == '\n' {
            self.reporter
                .push(self.line, self.col, "string literal not terminated.");
            return;
        }

        let end = self.pos;
        self.advance(); // the closing quote
        self.col += 1;

        let text = decode_escapes(&self.source[start..end]);
        self.push_with_value(
            TokenKind::StringLiteral,
            self.line,
            start_col,
            TokenValue::Str(text),
        );
    }

    fn number_token(&mut self) {
        let start_col = self.col;
        self.col += 1;

        let start = self.pos - 1;
        let mut is_integer = true;

        while !self.is_at_end() && self.peek().is_ascii_digit() {
            self.advance();
            self.col += 1;
        }

        if self.match_char('.') {
            self.col += 1;
            is_integer = false;
            while !self.is_at_end() && self.peek().is_ascii_digit() {
                self.advance();
                self.col += 1;
            }
        }

        let text: String = self.source[start..self.pos].iter().collect();
        if is_integer {
            let value = match text.parse::<i64>() {
                Ok(value) => value,
                Err(_) => {
                    self.reporter
                        .push(self.line, start_col, "integer literal out of range.");
                    0
                }
            };
            self.push_with_value(
                TokenKind::IntLiteral,
                self.line,
                start_col,
                TokenValue::Int(value),
            );
        } else {
            let value = text
                .parse::<f64>()
                .unwrap_or_else(|_| unreachable!("Lexer::number_token: {text:?}"));
            self.push_with_value(
                TokenKind::FloatLiteral,
                self.line,
                start_col,
                TokenValue::Float(value),
            );
        }
    }

    fn identifier_token(&mut self) {
        let start_col = self.col;
        self.col += 1;

        let start = self.pos - 1;
        while !self.is_at_end() && is_identifier_continue(self.peek()) {
            self.advance();
            self.col += 1;
        }

        let text: String = self.source[start..self.pos].iter().collect();
        match keyword(&text) {
            Some(kind) => self.tokens.push(Token::new(kind, self.line, start_col)),
            None => self.push_with_value(
                TokenKind::Identifier,
                self.line,
                start_col,
                TokenValue::Ident(text),
            ),
        }
    }
}
