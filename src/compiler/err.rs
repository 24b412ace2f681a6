use thiserror::Error;

use super::position::Position;

/// Aborts on a broken compiler invariant, never on bad user input.
#[macro_export]
macro_rules! sys_error {
    ($($arg:tt)*) => {
        panic!($($arg)*)
    };
}

/// The single diagnostic a failed pipeline run produces.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// Lexical, syntax and type errors tied to a token or node.
    #[error("{message} ({position})")]
    Positioned { message: String, position: Position },

    /// Pipeline-level violations with no single source location.
    #[error("{message}")]
    Locationless { message: String },
}

impl CompileError {
    pub fn at(position: Position, message: impl Into<String>) -> CompileError {
        CompileError::Positioned {
            message: message.into(),
            position,
        }
    }

    pub fn locationless(message: impl Into<String>) -> CompileError {
        CompileError::Locationless {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            CompileError::Positioned { message, .. } | CompileError::Locationless { message } => message,
        }
    }

    #[must_use]
    pub fn position(&self) -> Option<Position> {
        match self {
            CompileError::Positioned { position, .. } => Some(*position),
            CompileError::Locationless { .. } => None,
        }
    }

    /// # Panics
    /// Always; the rendered diagnostic is the panic message.
    pub fn report(self) -> ! {
        panic!("{self}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positioned_errors_render_one_based() {
        let error = CompileError::at(Position::new(0, 4), "Unexpected brace '}'");
        assert_eq!(error.to_string(), "Unexpected brace '}' (1:5)");
        assert_eq!(error.position(), Some(Position::new(0, 4)));
    }

    #[test]
    fn locationless_errors_render_message_only() {
        let error = CompileError::locationless("Cannot return outside a function");
        assert_eq!(error.to_string(), "Cannot return outside a function");
        assert_eq!(error.message(), "Cannot return outside a function");
        assert_eq!(error.position(), None);
    }
}
