use std::fmt::{self, Display};

/// Tree-shaped rendering where every nested level is indented one step further.
pub trait PrettyFormat {
    /// # Errors
    fn pretty_format(&self, f: &mut fmt::Formatter, indentation_num: usize) -> fmt::Result;
}

/// Adapts a `PrettyFormat` value to `Display`, starting at the left margin.
pub struct Pretty<'a, T: ?Sized>(pub &'a T);

impl<T: PrettyFormat + ?Sized> Display for Pretty<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.pretty_format(f, 0)
    }
}

#[must_use]
pub fn indent(n: usize) -> String {
    "    ".repeat(n)
}
