use super::err::CompileError;
use super::position::Position;
use super::syntax::ast::node::NodeId;
use super::syntax::ast::ty::Type;
use crate::CompileResult;

/// A local recorded in a scope during type inference.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub ty: Type,
    /// The function literal bound to this name, when there is one.
    pub function: Option<NodeId>,
}

impl Variable {
    pub fn new(name: impl Into<String>, ty: Type) -> Variable {
        Variable {
            name: name.into(),
            ty,
            function: None,
        }
    }

    #[must_use]
    pub fn bound_to(mut self, function: NodeId) -> Variable {
        self.function = Some(function);
        self
    }
}

/// Ordered statements of a block plus the locals declared in it.
///
/// The two lists are independent: `body` is fixed by the parser and
/// `variables` grows while the inferrer walks `body`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    pub body: Vec<NodeId>,
    pub variables: Vec<Variable>,
}

impl Scope {
    #[must_use]
    pub fn new(body: Vec<NodeId>) -> Scope {
        Scope {
            body,
            variables: Vec::new(),
        }
    }

    /// # Errors
    /// When the name is already declared in this very scope.
    pub fn declare(&mut self, variable: Variable, position: Position) -> CompileResult<()> {
        if self.lookup(&variable.name).is_some() {
            return Err(CompileError::at(
                position,
                format!("The variable '{}' has already been defined", variable.name),
            ));
        }
        self.variables.push(variable);
        Ok(())
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|variable| variable.name == name)
    }
}

/// Node details that own a block and its locals.
pub trait Scopeable {
    fn scope(&self) -> &Scope;
    fn scope_mut(&mut self) -> &mut Scope;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redeclaration_in_same_scope_fails() {
        let mut scope = Scope::default();
        scope
            .declare(Variable::new("x", Type::Number), Position::new(0, 0))
            .unwrap();
        let error = scope
            .declare(Variable::new("x", Type::Boolean), Position::new(2, 4))
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "The variable 'x' has already been defined (3:5)"
        );
        assert_eq!(scope.variables.len(), 1);
        assert_eq!(scope.lookup("x").map(|v| v.ty), Some(Type::Number));
    }
}
