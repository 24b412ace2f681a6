use std::{
    collections::HashMap,
    fmt::{self, Display},
};

use once_cell::sync::Lazy;

use crate::compiler::position::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    Number,
    String,
    Boolean,
    FunctionArrow,
    Separator,
    Iteration,
    Datatype,
    Keyword,
    LeftParenthesis,
    RightParenthesis,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    Operator,
    Comparator,
    Assignment,
    Eof,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Identifier => "identifier",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Boolean => "boolean",
            TokenKind::FunctionArrow => "function arrow",
            TokenKind::Separator => "comma",
            TokenKind::Iteration => "colon",
            TokenKind::Datatype => "datatype",
            TokenKind::Keyword => "keyword",
            TokenKind::LeftParenthesis | TokenKind::RightParenthesis => "parenthesis",
            TokenKind::LeftBracket | TokenKind::RightBracket => "bracket",
            TokenKind::LeftBrace | TokenKind::RightBrace => "brace",
            TokenKind::Operator => "operator",
            TokenKind::Comparator => "comparator",
            TokenKind::Assignment => "assignment",
            TokenKind::Eof => "end of file",
        };
        write!(f, "{name}")
    }
}

/// Reserved words, matched against whole identifiers only.
pub static KEYWORD_MAP: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for keyword in ["return", "if", "elseif", "else", "while", "foreach", "for"] {
        map.insert(keyword, TokenKind::Keyword);
    }
    for boolean in ["true", "false"] {
        map.insert(boolean, TokenKind::Boolean);
    }
    for datatype in ["let", "number", "bool", "string", "func", "enum", "class"] {
        map.insert(datatype, TokenKind::Datatype);
    }
    map
});

/// Symbols of two characters, tried before any single-character symbol.
pub const DOUBLE_SYMBOLS: [(&str, TokenKind); 5] = [
    ("=>", TokenKind::FunctionArrow),
    (">=", TokenKind::Comparator),
    ("<=", TokenKind::Comparator),
    ("==", TokenKind::Comparator),
    ("!=", TokenKind::Comparator),
];

/// Operators that take two operands and so may form `op=`.
pub const BINARY_OPERATORS: [char; 8] = ['+', '-', '*', '/', '^', '%', '&', '|'];

#[must_use]
pub fn single_symbol(c: char) -> Option<TokenKind> {
    let kind = match c {
        '(' => TokenKind::LeftParenthesis,
        ')' => TokenKind::RightParenthesis,
        '[' => TokenKind::LeftBracket,
        ']' => TokenKind::RightBracket,
        '{' => TokenKind::LeftBrace,
        '}' => TokenKind::RightBrace,
        ',' => TokenKind::Separator,
        ':' => TokenKind::Iteration,
        '=' => TokenKind::Assignment,
        '>' | '<' => TokenKind::Comparator,
        '+' | '-' | '*' | '/' | '^' | '%' | '&' | '|' | '!' => TokenKind::Operator,
        _ => return None,
    };
    Some(kind)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub value: String,
    pub kind: TokenKind,
    pub position: Position,
}

impl Token {
    pub fn new(value: impl Into<String>, kind: TokenKind, position: Position) -> Token {
        Token {
            value: value.into(),
            kind,
            position,
        }
    }

    #[must_use]
    pub fn is(&self, kind: TokenKind, value: &str) -> bool {
        self.kind == kind && self.value == value
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.value)
    }
}
