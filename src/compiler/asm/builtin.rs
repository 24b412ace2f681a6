use indoc::indoc;

use crate::constants::common::PRINT_SYMBOL;
use crate::util::pretty_format::indent;

/// Writes `x2` bytes starting at `x1` to stdout.
const PRINT_BODY: &str = indoc! {"
    mov x0, #1
    mov x16, #4
    svc #0x80
    ret
"};

/// Routines appended to the module once some function refers to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routine {
    Print,
}

impl Routine {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Routine::Print => PRINT_SYMBOL,
        }
    }

    #[must_use]
    pub fn text(self) -> String {
        let body = match self {
            Routine::Print => PRINT_BODY,
        };
        let mut text = format!("{}:\n", self.symbol());
        for line in body.lines() {
            text.push_str(&format!("{}{line}\n", indent(1)));
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_routine_is_labelled_and_indented() {
        assert_eq!(
            Routine::Print.text(),
            "_print:\n    mov x0, #1\n    mov x16, #4\n    svc #0x80\n    ret\n"
        );
    }
}
