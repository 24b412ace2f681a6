use tracing::debug;

use crate::compiler::err::CompileError;
use crate::compiler::position::Position;
use crate::sys_error;
use crate::CompileResult;

use super::text::Reader;
use super::token::{single_symbol, Token, TokenKind, BINARY_OPERATORS, DOUBLE_SYMBOLS, KEYWORD_MAP};

pub struct Lexer {
    reader: Reader,
    tokens: Vec<Token>,
}

impl Lexer {
    #[must_use]
    pub fn new(code: &str) -> Lexer {
        Lexer {
            reader: Reader::new(code),
            tokens: Vec::new(),
        }
    }

    /// Splits the whole source into tokens, closed by an end-of-file token.
    ///
    /// # Errors
    /// Unterminated strings or block comments, and characters that start no token.
    #[tracing::instrument(skip_all)]
    pub fn tokenize(mut self) -> CompileResult<Vec<Token>> {
        while self.skip_trivia()? {
            let token = self.digest_token()?;
            self.tokens.push(token);
        }
        self.tokens
            .push(Token::new("EOF", TokenKind::Eof, self.reader.position()));
        debug!(count = self.tokens.len(), "tokenized");
        Ok(self.tokens)
    }

    /// Returns whether anything is left after whitespace and comments.
    fn skip_trivia(&mut self) -> CompileResult<bool> {
        loop {
            match (self.reader.peek(), self.reader.peek_next()) {
                (None, _) => return Ok(false),
                (Some(c), _) if c.is_whitespace() => self.reader.forward(),
                (Some('/'), Some('/')) => self.digest_line_comment(),
                (Some('/'), Some('*')) => self.digest_block_comment()?,
                _ => return Ok(true),
            }
        }
    }

    fn digest_line_comment(&mut self) {
        while let Some(c) = self.reader.peek() {
            if c == '\n' {
                break;
            }
            self.reader.forward();
        }
    }

    fn digest_block_comment(&mut self) -> CompileResult<()> {
        let start = self.reader.position();
        self.assert('/');
        self.assert('*');
        loop {
            match (self.reader.peek(), self.reader.peek_next()) {
                (None, _) => return Err(CompileError::at(start, "Unterminated comment")),
                (Some('*'), Some('/')) => {
                    self.reader.forward();
                    self.reader.forward();
                    return Ok(());
                }
                _ => self.reader.forward(),
            }
        }
    }

    fn digest_token(&mut self) -> CompileResult<Token> {
        let position = self.reader.position();
        let Some(c) = self.reader.peek() else {
            sys_error!("trivia skipping must leave a character to digest")
        };
        if self.starts_number(c) {
            return Ok(self.digest_number(position));
        }
        match c {
            '"' => self.digest_string(position),
            c if c.is_alphabetic() || c == '_' => Ok(self.digest_word(position)),
            _ => self.digest_symbol(position),
        }
    }

    fn starts_number(&self, c: char) -> bool {
        match c {
            '0'..='9' | '#' => true,
            'b' | 'o' => self.reader.peek_next().is_some_and(|n| n.is_ascii_digit()),
            _ => false,
        }
    }

    /// Takes the whole alphanumeric run so malformed literals surface as one token.
    fn digest_number(&mut self, position: Position) -> Token {
        let mut number = String::new();
        if let Some(prefix) = self.reader.peek() {
            number.push(prefix);
            self.reader.forward();
        }
        while let Some(c) = self.reader.peek() {
            if !(c.is_alphanumeric() || c == '.') {
                break;
            }
            number.push(c);
            self.reader.forward();
        }
        Token::new(number, TokenKind::Number, position)
    }

    fn digest_string(&mut self, position: Position) -> CompileResult<Token> {
        self.assert('"');
        let mut string = String::new();
        loop {
            match self.reader.peek() {
                None => return Err(CompileError::at(position, "Unterminated string")),
                Some('"') => {
                    self.reader.forward();
                    return Ok(Token::new(string, TokenKind::String, position));
                }
                Some(c) => {
                    string.push(c);
                    self.reader.forward();
                }
            }
        }
    }

    fn digest_word(&mut self, position: Position) -> Token {
        let mut word = String::new();
        while let Some(c) = self.reader.peek() {
            if !(c.is_alphanumeric() || c == '_') {
                break;
            }
            word.push(c);
            self.reader.forward();
        }
        let kind = KEYWORD_MAP
            .get(word.as_str())
            .copied()
            .unwrap_or(TokenKind::Identifier);
        Token::new(word, kind, position)
    }

    fn digest_symbol(&mut self, position: Position) -> CompileResult<Token> {
        let Some(c) = self.reader.peek() else {
            sys_error!("a symbol must start with a character")
        };
        let next = self.reader.peek_next();
        if let Some(next) = next {
            let pair: String = [c, next].iter().collect();
            if let Some((symbol, kind)) = DOUBLE_SYMBOLS.iter().find(|(s, _)| *s == pair) {
                self.reader.forward();
                self.reader.forward();
                return Ok(Token::new(*symbol, *kind, position));
            }
            if next == '=' && BINARY_OPERATORS.contains(&c) {
                self.reader.forward();
                self.reader.forward();
                return Ok(Token::new(pair, TokenKind::Assignment, position));
            }
        }
        let Some(kind) = single_symbol(c) else {
            return Err(CompileError::at(
                position,
                format!("Unexpected character '{c}'"),
            ));
        };
        self.reader.forward();
        Ok(Token::new(c, kind, position))
    }

    /// Only for characters the caller has already peeked.
    fn assert(&mut self, expected: char) {
        match self.reader.peek() {
            Some(c) if c == expected => self.reader.forward(),
            Some(c) => sys_error!("{expected} must exist while {c} encountered"),
            None => sys_error!("{expected} must exist while EOF encountered"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_and_values(code: &str) -> Vec<(TokenKind, String)> {
        Lexer::new(code)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|token| (token.kind, token.value))
            .collect()
    }

    #[test]
    fn arithmetic_line() {
        assert_eq!(
            kinds_and_values("12.5 + 7"),
            vec![
                (TokenKind::Number, "12.5".to_string()),
                (TokenKind::Operator, "+".to_string()),
                (TokenKind::Number, "7".to_string()),
                (TokenKind::Eof, "EOF".to_string()),
            ]
        );
    }

    #[test]
    fn keywords_match_whole_words_only() {
        let tokens = kinds_and_values("if ifx elseif true number numbers");
        let kinds: Vec<_> = tokens.iter().map(|(kind, _)| *kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Keyword,
                TokenKind::Identifier,
                TokenKind::Keyword,
                TokenKind::Boolean,
                TokenKind::Datatype,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn longest_symbol_wins() {
        let tokens = kinds_and_values("a += 1 => >= != ! =");
        assert_eq!(tokens[1], (TokenKind::Assignment, "+=".to_string()));
        assert_eq!(tokens[3], (TokenKind::FunctionArrow, "=>".to_string()));
        assert_eq!(tokens[4], (TokenKind::Comparator, ">=".to_string()));
        assert_eq!(tokens[5], (TokenKind::Comparator, "!=".to_string()));
        assert_eq!(tokens[6], (TokenKind::Operator, "!".to_string()));
        assert_eq!(tokens[7], (TokenKind::Assignment, "=".to_string()));
    }

    #[test]
    fn base_prefixes_start_numbers() {
        let tokens = kinds_and_values("#ff b101 o17 bob");
        assert_eq!(tokens[0], (TokenKind::Number, "#ff".to_string()));
        assert_eq!(tokens[1], (TokenKind::Number, "b101".to_string()));
        assert_eq!(tokens[2], (TokenKind::Number, "o17".to_string()));
        assert_eq!(tokens[3], (TokenKind::Identifier, "bob".to_string()));
    }

    #[test]
    fn comments_and_strings() {
        let tokens = kinds_and_values("// note\nstring s = \"hi there\" /* block\n */ x");
        assert_eq!(tokens[0], (TokenKind::Datatype, "string".to_string()));
        assert_eq!(tokens[3], (TokenKind::String, "hi there".to_string()));
        assert_eq!(tokens[4], (TokenKind::Identifier, "x".to_string()));
    }

    #[test]
    fn positions_track_rows_and_columns() {
        let tokens = Lexer::new("a\n  bc").tokenize().unwrap();
        assert_eq!(tokens[0].position, Position::new(0, 0));
        assert_eq!(tokens[1].position, Position::new(1, 2));
        assert_eq!(tokens[2].position, Position::new(1, 4));
    }

    #[test]
    fn unknown_character_is_rejected() {
        let error = Lexer::new("a = 1 $ 2").tokenize().unwrap_err();
        assert_eq!(error.to_string(), "Unexpected character '$' (1:7)");
    }

    #[test]
    fn unterminated_string_is_rejected() {
        let error = Lexer::new("x = \"open").tokenize().unwrap_err();
        assert_eq!(error.to_string(), "Unterminated string (1:5)");
    }
}
