use crate::compiler::position::Position;

/// Character cursor that keeps row and column in step with the offset.
pub struct Reader {
    code: Vec<char>,
    offset: usize,
    row: usize,
    col: usize,
}

impl Reader {
    #[must_use]
    pub fn new(code: &str) -> Reader {
        let code: Vec<_> = code.chars().collect();
        Reader {
            code,
            offset: 0,
            row: 0,
            col: 0,
        }
    }

    #[must_use]
    pub fn peek(&self) -> Option<char> {
        self.code.get(self.offset).copied()
    }

    #[must_use]
    pub fn peek_next(&self) -> Option<char> {
        self.code.get(self.offset + 1).copied()
    }

    pub fn forward(&mut self) {
        let Some(c) = self.peek() else {
            return;
        };
        self.offset += 1;
        if c == '\n' {
            self.row += 1;
            self.col = 0;
        } else {
            self.col += 1;
        }
    }

    #[must_use]
    pub fn position(&self) -> Position {
        Position::new(self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::Reader;
    use crate::compiler::position::Position;

    #[test]
    fn newline_moves_to_next_row() {
        let mut reader = Reader::new("ab\nc");
        reader.forward();
        reader.forward();
        assert_eq!(reader.position(), Position::new(0, 2));
        reader.forward();
        assert_eq!(reader.position(), Position::new(1, 0));
        assert_eq!(reader.peek(), Some('c'));
        reader.forward();
        assert_eq!(reader.peek(), None);
        reader.forward();
        assert_eq!(reader.position(), Position::new(1, 1));
    }
}
