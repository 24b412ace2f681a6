use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::compiler::syntax::ast::operator::Operator;
use crate::compiler::syntax::ast::ty::Type;
use crate::constants::common::PRINT_BUILTIN;

/// Operators each type accepts; a type missing here accepts none.
static PERMITTED_OPERATORS: Lazy<HashMap<Type, Vec<Operator>>> = Lazy::new(|| {
    use Operator::{Add, And, Divide, Modulo, Multiply, Not, Or, Power, Subtract};
    HashMap::from([
        (
            Type::Number,
            vec![Add, Subtract, Multiply, Divide, Power, Modulo, And, Or, Not],
        ),
        (Type::Boolean, vec![Not, And, Or]),
        (Type::String, vec![Add]),
    ])
});

#[must_use]
pub fn permits(ty: Type, operator: Operator) -> bool {
    PERMITTED_OPERATORS
        .get(&ty)
        .is_some_and(|operators| operators.contains(&operator))
}

/// Signature of a function supplied by the runtime rather than the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Builtin {
    pub name: &'static str,
    pub arity: usize,
    pub return_type: Type,
}

static BUILTINS: Lazy<HashMap<&'static str, Builtin>> = Lazy::new(|| {
    let print = Builtin {
        name: PRINT_BUILTIN,
        arity: 1,
        return_type: Type::Unknown,
    };
    HashMap::from([(print.name, print)])
});

#[must_use]
pub fn builtin(name: &str) -> Option<Builtin> {
    BUILTINS.get(name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_table() {
        assert!(permits(Type::Number, Operator::Power));
        assert!(permits(Type::Boolean, Operator::Not));
        assert!(!permits(Type::Boolean, Operator::Add));
        assert!(permits(Type::String, Operator::Add));
        assert!(!permits(Type::String, Operator::Subtract));
        assert!(!permits(Type::Function, Operator::Add));
        assert!(!permits(Type::Unknown, Operator::Add));
    }

    #[test]
    fn print_is_builtin() {
        let print = builtin("print").unwrap();
        assert_eq!(print.arity, 1);
        assert_eq!(builtin("println"), None);
    }
}
