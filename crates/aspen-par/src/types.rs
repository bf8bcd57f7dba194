//! Type representation and the type grammar.
//!
//! Types are structural: two types are equal when their shapes are. `Void`
//! is only legal as a function return type; the checker enforces that by
//! construction, since the grammar only admits `void` in return position.

use std::fmt;

use aspen_lex::TokenKind;

use crate::{ParseResult, Parser};

/// A structural Aspen type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Type {
    I64,
    U64,
    Bool,
    String,
    Double,
    Void,
    Slice(Box<Type>),
    Function(FunctionType),
}

/// Parameter and return types of a function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionType {
    pub parameters: Vec<Type>,
    pub return_type: Box<Type>,
}

impl FunctionType {
    pub fn new(parameters: Vec<Type>, return_type: Type) -> Self {
        Self {
            parameters,
            return_type: Box::new(return_type),
        }
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

impl Type {
    pub fn slice(of: Type) -> Self {
        Type::Slice(Box::new(of))
    }

    pub fn function(parameters: Vec<Type>, return_type: Type) -> Self {
        Type::Function(FunctionType::new(parameters, return_type))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::I64 | Type::U64 | Type::Double)
    }

    pub fn is_integral(&self) -> bool {
        matches!(self, Type::I64 | Type::U64)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::I64 => write!(f, "i64"),
            Type::U64 => write!(f, "u64"),
            Type::Bool => write!(f, "bool"),
            Type::String => write!(f, "string"),
            Type::Double => write!(f, "double"),
            Type::Void => write!(f, "void"),
            Type::Slice(of) => {
                // a slice of functions needs parentheses: `fn()i64[]` is a
                // function returning a slice, `(fn()i64)[]` a slice of
                // functions
                if matches!(of.as_ref(), Type::Function(_)) {
                    write!(f, "({of})[]")
                } else {
                    write!(f, "{of}[]")
                }
            }
            Type::Function(function) => {
                write!(f, "fn(")?;
                for (i, parameter) in function.parameters.iter().enumerate() {
                    write!(f, "{parameter}")?;
                    if i != function.parameters.len() - 1 {
                        write!(f, ", ")?;
                    }
                }
                write!(f, "){}", function.return_type)
            }
        }
    }
}

impl<'r, 'src> Parser<'r, 'src> {
    /// `type := 'fn' '(' (type (',' type)*)? ')' returnType`
    /// `      | '(' type ')' ('[' ']')*`
    /// `      | primitive ('[' ']')*`
    pub(crate) fn parse_type(&mut self) -> ParseResult<Type> {
        if self.matches(&[TokenKind::Fn]) {
            self.consume(TokenKind::LeftParen, "expected '(' after 'fn'.")?;
            let mut parameters = Vec::new();
            if !self.check(TokenKind::RightParen) {
                loop {
                    parameters.push(self.parse_type()?);
                    if !self.matches(&[TokenKind::Comma]) {
                        break;
                    }
                }
            }
            self.consume(TokenKind::RightParen, "expected ')' after parameter types.")?;
            let return_type = self.parse_return_type()?;
            return Ok(Type::function(parameters, return_type));
        }

        let mut ty = if self.matches(&[TokenKind::LeftParen]) {
            let inner = self.parse_type()?;
            self.consume(TokenKind::RightParen, "expected ')' after type.")?;
            inner
        } else {
            let token = self.peek().clone();
            let primitive = match token.kind {
                TokenKind::I64 => Type::I64,
                TokenKind::U64 => Type::U64,
                TokenKind::Bool => Type::Bool,
                TokenKind::String => Type::String,
                TokenKind::Double => Type::Double,
                _ => return Err(self.error(&token, "expected type.")),
            };
            self.advance();
            primitive
        };

        while self.matches(&[TokenKind::LeftSquare]) {
            self.consume(TokenKind::RightSquare, "expected ']' in slice type.")?;
            ty = Type::slice(ty);
        }

        Ok(ty)
    }

    /// `returnType := 'void' | type`
    pub(crate) fn parse_return_type(&mut self) -> ParseResult<Type> {
        if self.matches(&[TokenKind::Void]) {
            return Ok(Type::Void);
        }
        self.parse_type()
    }
}
