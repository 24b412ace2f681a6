use std::collections::HashSet;

use tracing::debug;

use crate::compiler::err::CompileError;
use crate::compiler::position::Position;
use crate::compiler::scope::{Scope, Variable};
use crate::compiler::syntax::ast::node::{
    CallEntry, FunctionDetail, FunctionEntry, NodeId, NodeKind,
};
use crate::compiler::syntax::ast::operator::{Comparison, Operator};
use crate::compiler::syntax::ast::ty::{Datatype, Type};
use crate::compiler::syntax::ast::Ast;
use crate::sys_error;
use crate::CompileResult;

use super::linker::link;
use super::operations::{builtin, permits};

/// Links the tree, then types every node reachable from the program body in
/// source order, filling type slots and scope variables in place.
pub struct TypeInferrer {
    typed_functions: usize,
    /// Top-level statements already typed, possibly ahead of the walk.
    settled: HashSet<NodeId>,
    settling: HashSet<NodeId>,
}

impl TypeInferrer {
    #[must_use]
    pub fn new() -> TypeInferrer {
        TypeInferrer {
            typed_functions: 0,
            settled: HashSet::new(),
            settling: HashSet::new(),
        }
    }

    /// # Errors
    /// The first scoping or typing violation in source order.
    #[tracing::instrument(skip_all, fields(nodes = ast.len()))]
    pub fn infer(&mut self, ast: &mut Ast) -> CompileResult<()> {
        link(ast);
        self.hoist_functions(ast)?;
        let body = ast.program().scope.body.clone();
        for statement in body {
            self.settle(ast, statement)?;
        }
        debug!(functions = self.typed_functions, "typed");
        Ok(())
    }

    /// Records top-level named functions so calls may precede their declaration.
    fn hoist_functions(&mut self, ast: &mut Ast) -> CompileResult<()> {
        let mut hoisted: Vec<FunctionEntry> = Vec::new();
        for &statement in &ast.program().scope.body {
            let NodeKind::Declaration { target, value, .. } = ast.kind(statement) else {
                continue;
            };
            let (NodeKind::Identifier { symbol }, NodeKind::FunctionLiteral(_)) =
                (ast.kind(*target), ast.kind(*value))
            else {
                continue;
            };
            if hoisted.iter().any(|entry| entry.symbol == *symbol) {
                return Err(CompileError::at(
                    ast.node(statement).position,
                    format!("The function '{symbol}' has already been declared"),
                ));
            }
            hoisted.push(FunctionEntry {
                symbol: symbol.clone(),
                node: *value,
            });
        }
        debug!(count = hoisted.len(), "hoisted functions");
        ast.program_mut().hoisted = hoisted;
        Ok(())
    }

    /// Types a top-level statement once, whether the program walk reaches it
    /// or a lookup from a forward-typed function pulls it in earlier.
    fn settle(&mut self, ast: &mut Ast, statement: NodeId) -> CompileResult<()> {
        if self.settled.contains(&statement) || !self.settling.insert(statement) {
            return Ok(());
        }
        self.infer_type(ast, statement)?;
        self.settling.remove(&statement);
        self.settled.insert(statement);
        Ok(())
    }

    /// Scope-chain lookup. A miss from inside a top-level statement first
    /// settles the earlier top-level statements that declare `symbol`, so a
    /// function typed ahead of the walk still sees the program variables
    /// declared before it.
    fn resolve(
        &mut self,
        ast: &mut Ast,
        from: NodeId,
        symbol: &str,
    ) -> CompileResult<Option<Variable>> {
        if let Some(variable) = lookup(ast, from, symbol) {
            return Ok(Some(variable));
        }
        let pending = earlier_declarations(ast, from, symbol)
            .into_iter()
            .filter(|statement| {
                !self.settled.contains(statement) && !self.settling.contains(statement)
            })
            .collect::<Vec<_>>();
        if pending.is_empty() {
            return Ok(None);
        }
        for statement in pending {
            self.settle(ast, statement)?;
        }
        Ok(lookup(ast, from, symbol))
    }

    fn infer_body(&mut self, ast: &mut Ast, owner: NodeId) -> CompileResult<()> {
        let body = ast
            .kind(owner)
            .as_scopeable()
            .map(|scopeable| scopeable.scope().body.clone())
            .unwrap_or_default();
        body.into_iter()
            .try_for_each(|statement| self.infer_type(ast, statement).map(|_| ()))
    }

    fn infer_type(&mut self, ast: &mut Ast, id: NodeId) -> CompileResult<Type> {
        let node = ast.node(id);
        if node.ty.is_known() {
            return Ok(node.ty);
        }
        let position = node.position;
        let ty = match node.kind.clone() {
            NodeKind::Identifier { symbol } => self.infer_identifier(ast, id, &symbol)?,
            NodeKind::BinaryOperation {
                operator,
                left,
                right,
            } => self.infer_binary(ast, position, operator, left, right)?,
            NodeKind::UnaryOperation { operator, operand } => {
                let ty = self.infer_type(ast, operand)?;
                check_operator(position, operator, ty)?;
                ty
            }
            NodeKind::Comparator {
                comparison,
                left,
                right,
            } => self.infer_comparator(ast, position, comparison, left, right)?,
            NodeKind::NumberLiteral(_) => Type::Number,
            NodeKind::BooleanLiteral(_) => Type::Boolean,
            NodeKind::StringLiteral(_) => Type::String,
            NodeKind::FunctionLiteral(_) => {
                self.infer_function(ast, id)?;
                Type::Function
            }
            NodeKind::EnumLiteral { enumerators } => {
                for enumerator in enumerators {
                    ast.node_mut(enumerator).ty = Type::Enum;
                }
                Type::Enum
            }
            NodeKind::ClassLiteral(_) => {
                self.infer_body(ast, id)?;
                Type::Class
            }
            NodeKind::ArrayLiteral { values } => self.infer_array(ast, &values)?,
            NodeKind::Declaration {
                datatype,
                target,
                value,
            } => self.infer_declaration(ast, datatype, target, value)?,
            NodeKind::Assignment {
                operator,
                target,
                value,
            } => self.infer_assignment(ast, operator, target, value)?,
            NodeKind::IfStatement(detail) => {
                self.expect_condition(ast, detail.test, position, "an if statement")?;
                self.infer_body(ast, id)?;
                if let Some(next) = detail.next {
                    self.infer_type(ast, next)?;
                }
                Type::Unknown
            }
            NodeKind::ElseClause(_) => {
                self.infer_body(ast, id)?;
                Type::Unknown
            }
            NodeKind::WhileLoop(detail) => {
                self.expect_condition(ast, detail.test, position, "a while loop")?;
                self.infer_body(ast, id)?;
                Type::Unknown
            }
            NodeKind::ForLoop(detail) => {
                self.infer_type(ast, detail.init)?;
                self.expect_condition(ast, detail.test, position, "a for loop")?;
                self.infer_type(ast, detail.step)?;
                self.infer_body(ast, id)?;
                Type::Unknown
            }
            NodeKind::ForEachLoop(detail) => {
                self.infer_type(ast, detail.iteration)?;
                self.infer_body(ast, id)?;
                Type::Unknown
            }
            NodeKind::Vector { values } => {
                let types = values
                    .iter()
                    .map(|&value| self.infer_type(ast, value))
                    .collect::<CompileResult<Vec<_>>>()?;
                match types.split_first() {
                    Some((first, rest)) if rest.iter().all(|ty| ty == first) => *first,
                    _ => Type::Unknown,
                }
            }
            NodeKind::Parameter { datatype, .. } => datatype.ty(),
            NodeKind::ParameterList { parameters } => {
                for parameter in parameters {
                    self.infer_type(ast, parameter)?;
                }
                Type::Unknown
            }
            NodeKind::Return { value } => self.infer_return(ast, id, value)?,
            NodeKind::Iteration { item, iterable } => {
                let ty = self.infer_type(ast, iterable)?;
                let symbol = identifier_symbol(ast, item);
                declare(ast, item, Variable::new(symbol, ty))?;
                ast.node_mut(item).ty = ty;
                ty
            }
            NodeKind::FunctionCall { callee, arguments } => {
                self.infer_call(ast, id, callee, &arguments)?
            }
            NodeKind::Keyword(_) | NodeKind::Datatype(_) => Type::Unknown,
            NodeKind::Program(_) => {
                self.infer_body(ast, id)?;
                Type::Unknown
            }
        };
        ast.node_mut(id).ty = ty;
        Ok(ty)
    }

    fn infer_identifier(&mut self, ast: &mut Ast, id: NodeId, symbol: &str) -> CompileResult<Type> {
        if let Some(variable) = self.resolve(ast, id, symbol)? {
            return Ok(variable.ty);
        }
        if ast.program().hoisted(symbol).is_some() {
            return Ok(Type::Function);
        }
        Err(CompileError::at(
            ast.node(id).position,
            format!("The variable '{symbol}' is undefined"),
        ))
    }

    fn infer_binary(
        &mut self,
        ast: &mut Ast,
        position: Position,
        operator: Operator,
        left: NodeId,
        right: NodeId,
    ) -> CompileResult<Type> {
        let left_type = self.infer_type(ast, left)?;
        let right_type = self.infer_type(ast, right)?;
        check_operands(position, operator, left_type, right_type)?;
        Ok(left_type)
    }

    fn infer_comparator(
        &mut self,
        ast: &mut Ast,
        position: Position,
        comparison: Comparison,
        left: NodeId,
        right: NodeId,
    ) -> CompileResult<Type> {
        let left_type = self.infer_type(ast, left)?;
        let right_type = self.infer_type(ast, right)?;
        if left_type != right_type {
            return Err(CompileError::at(
                position,
                format!("Cannot use the '{comparison}' comparator on a {left_type} and {right_type}"),
            ));
        }
        if left_type != Type::Number {
            return Err(CompileError::at(
                position,
                format!("Cannot use the '{comparison}' comparator on a {left_type}"),
            ));
        }
        Ok(Type::Boolean)
    }

    fn infer_array(&mut self, ast: &mut Ast, values: &[NodeId]) -> CompileResult<Type> {
        let Some((&first, rest)) = values.split_first() else {
            return Ok(Type::Unknown);
        };
        let ty = self.infer_type(ast, first)?;
        for &value in rest {
            if self.infer_type(ast, value)? != ty {
                return Err(CompileError::at(
                    ast.node(value).position,
                    "An array can only include one type",
                ));
            }
        }
        Ok(ty)
    }

    fn expect_condition(
        &mut self,
        ast: &mut Ast,
        test: NodeId,
        position: Position,
        construct: &str,
    ) -> CompileResult<()> {
        if self.infer_type(ast, test)? == Type::Boolean {
            Ok(())
        } else {
            Err(CompileError::at(
                position,
                format!("The condition in {construct} must be a boolean"),
            ))
        }
    }

    fn infer_declaration(
        &mut self,
        ast: &mut Ast,
        datatype: Datatype,
        target: NodeId,
        value: NodeId,
    ) -> CompileResult<Type> {
        let named_function = match (ast.kind(target), ast.kind(value)) {
            (NodeKind::Identifier { symbol }, NodeKind::FunctionLiteral(_)) => Some(symbol.clone()),
            _ => None,
        };
        // registered before the body is typed so the function can call itself
        if let Some(symbol) = named_function {
            check_datatype(ast, datatype, &symbol, Type::Function, value)?;
            let variable = Variable::new(&symbol, Type::Function).bound_to(value);
            declare(ast, target, variable)?;
            ast.node_mut(target).ty = Type::Function;
            return self.infer_type(ast, value);
        }

        let value_type = self.infer_type(ast, value)?;
        for (target, value, ty) in self.pair_targets(ast, target, value, value_type)? {
            let symbol = identifier_symbol(ast, target);
            check_datatype(ast, datatype, &symbol, ty, value)?;
            let variable = bind_function(ast, Variable::new(symbol, ty), value);
            declare(ast, target, variable)?;
            ast.node_mut(target).ty = ty;
        }
        Ok(value_type)
    }

    fn infer_assignment(
        &mut self,
        ast: &mut Ast,
        operator: Option<Operator>,
        target: NodeId,
        value: NodeId,
    ) -> CompileResult<Type> {
        let value_type = self.infer_type(ast, value)?;
        for (target, value, ty) in self.pair_targets(ast, target, value, value_type)? {
            let symbol = identifier_symbol(ast, target);
            let position = ast.node(target).position;
            let variable_type = match (self.resolve(ast, target, &symbol)?, operator) {
                (Some(variable), None) => {
                    if variable.ty.is_known() && variable.ty != ty {
                        return Err(CompileError::at(
                            ast.node(value).position,
                            format!(
                                "The {} '{symbol}' cannot be assigned to a {ty}",
                                variable.ty
                            ),
                        ));
                    }
                    variable.ty
                }
                (Some(variable), Some(operator)) => {
                    check_operands(position, operator, variable.ty, ty)?;
                    variable.ty
                }
                (None, None) => {
                    let variable = bind_function(ast, Variable::new(&symbol, ty), value);
                    declare(ast, target, variable)?;
                    ty
                }
                (None, Some(_)) => {
                    return Err(CompileError::at(
                        position,
                        format!("The variable '{symbol}' is undefined"),
                    ));
                }
            };
            ast.node_mut(target).ty = variable_type;
        }
        Ok(value_type)
    }

    /// Matches each assigned name with the value node and type it receives.
    ///
    /// A vector of values is spread over a vector of names; a single value
    /// is shared by every name.
    fn pair_targets(
        &mut self,
        ast: &mut Ast,
        target: NodeId,
        value: NodeId,
        value_type: Type,
    ) -> CompileResult<Vec<(NodeId, NodeId, Type)>> {
        let targets = match ast.kind(target) {
            NodeKind::Vector { values } => values.clone(),
            _ => vec![target],
        };
        let spread = match ast.kind(value) {
            NodeKind::Vector { values } if targets.len() > 1 => Some(values.clone()),
            _ => None,
        };
        let Some(values) = spread else {
            return Ok(targets
                .into_iter()
                .map(|target| (target, value, value_type))
                .collect());
        };
        targets
            .into_iter()
            .zip(values)
            .map(|(target, value)| Ok((target, value, self.infer_type(ast, value)?)))
            .collect()
    }

    fn infer_function(&mut self, ast: &mut Ast, function: NodeId) -> CompileResult<()> {
        // the slot is set first so recursive and repeated requests stop here
        if ast.node(function).ty == Type::Function {
            return Ok(());
        }
        ast.node_mut(function).ty = Type::Function;
        let detail = function_detail(ast, function).clone();

        if let Some(other) = ast.program().function(&detail.symbol) {
            if other != function {
                return Err(CompileError::at(
                    ast.node(function).position,
                    format!("The function '{}' has already been declared", detail.symbol),
                ));
            }
        }
        ast.program_mut().functions.push(FunctionEntry {
            symbol: detail.symbol.clone(),
            node: function,
        });

        for parameter in parameters_of(ast, detail.parameters) {
            let ty = self.infer_type(ast, parameter)?;
            let symbol = match ast.kind(parameter) {
                NodeKind::Parameter { symbol, .. } => symbol.clone(),
                kind => sys_error!("a parameter list holds parameters, found {}", kind.name()),
            };
            let position = ast.node(parameter).position;
            function_scope(ast, function).declare(Variable::new(symbol, ty), position)?;
        }
        self.infer_type(ast, detail.parameters)?;
        self.infer_body(ast, function)?;
        self.typed_functions += 1;
        Ok(())
    }

    fn infer_return(&mut self, ast: &mut Ast, id: NodeId, value: NodeId) -> CompileResult<Type> {
        let ty = self.infer_type(ast, value)?;
        let Some(function) = enclosing_function(ast, id) else {
            return Err(CompileError::locationless("Cannot return outside a function"));
        };
        let position = ast.node(id).position;
        let NodeKind::FunctionLiteral(detail) = &mut ast.node_mut(function).kind else {
            sys_error!("an enclosing function must be a function literal");
        };
        if detail.return_type == Type::Unknown {
            detail.return_type = ty;
        } else if detail.return_type != ty {
            return Err(CompileError::at(
                position,
                format!(
                    "A function cannot return both {} and {ty}",
                    detail.return_type
                ),
            ));
        }
        Ok(ty)
    }

    fn infer_call(
        &mut self,
        ast: &mut Ast,
        call: NodeId,
        callee: NodeId,
        arguments: &[NodeId],
    ) -> CompileResult<Type> {
        let position = ast.node(call).position;
        let argument_types = arguments
            .iter()
            .map(|&argument| self.infer_type(ast, argument))
            .collect::<CompileResult<Vec<_>>>()?;

        let function = match ast.kind(callee).clone() {
            NodeKind::FunctionLiteral(_) => callee,
            NodeKind::Identifier { symbol } => {
                let callee_position = ast.node(callee).position;
                match self.resolve(ast, callee, &symbol)? {
                    Some(Variable {
                        function: Some(function),
                        ..
                    }) => function,
                    // a function value of unknown shape, such as a `func` parameter
                    Some(Variable {
                        ty: Type::Function,
                        ..
                    }) => {
                        ast.node_mut(callee).ty = Type::Function;
                        return Ok(Type::Unknown);
                    }
                    Some(_) => {
                        return Err(CompileError::at(
                            callee_position,
                            format!("'{symbol}' is not a function"),
                        ));
                    }
                    None => {
                        if let Some(function) = ast.program().hoisted(&symbol) {
                            function
                        } else if let Some(builtin) = builtin(&symbol) {
                            check_arity(position, &symbol, builtin.arity, arguments.len())?;
                            ast.node_mut(callee).ty = Type::Function;
                            return Ok(builtin.return_type);
                        } else {
                            return Err(CompileError::at(
                                callee_position,
                                format!("The function '{symbol}' is undefined"),
                            ));
                        }
                    }
                }
            }
            kind => sys_error!("only names and function literals are called, found {}", kind.name()),
        };

        self.infer_function(ast, function)?;
        ast.node_mut(callee).ty = Type::Function;
        ast.program_mut().calls.push(CallEntry { call, function });

        let detail = function_detail(ast, function);
        let symbol = detail.symbol.clone();
        let parameters = parameters_of(ast, detail.parameters);
        check_arity(position, &symbol, parameters.len(), arguments.len())?;
        for ((&parameter, &argument), argument_type) in
            parameters.iter().zip(arguments).zip(argument_types)
        {
            let parameter_type = ast.node(parameter).ty;
            if parameter_type != argument_type {
                return Err(CompileError::at(
                    ast.node(argument).position,
                    format!(
                        "The function '{symbol}' expects a {parameter_type}, but got a {argument_type}"
                    ),
                ));
            }
        }
        Ok(function_detail(ast, function).return_type)
    }
}

impl Default for TypeInferrer {
    fn default() -> Self {
        Self::new()
    }
}

fn check_operator(position: Position, operator: Operator, ty: Type) -> CompileResult<()> {
    if permits(ty, operator) {
        Ok(())
    } else {
        Err(CompileError::at(
            position,
            format!("Cannot use the '{operator}' operator on a {ty}"),
        ))
    }
}

fn check_operands(position: Position, operator: Operator, left: Type, right: Type) -> CompileResult<()> {
    if left != right {
        return Err(CompileError::at(
            position,
            format!("Cannot use the '{operator}' operator on a {left} and {right}"),
        ));
    }
    check_operator(position, operator, left)
}

fn check_datatype(
    ast: &Ast,
    datatype: Datatype,
    symbol: &str,
    ty: Type,
    value: NodeId,
) -> CompileResult<()> {
    let declared = datatype.ty();
    if declared.is_known() && declared != ty {
        return Err(CompileError::at(
            ast.node(value).position,
            format!("The {declared} '{symbol}' cannot be assigned to a {ty}"),
        ));
    }
    Ok(())
}

fn check_arity(position: Position, symbol: &str, expected: usize, found: usize) -> CompileResult<()> {
    if expected == found {
        return Ok(());
    }
    let noun = if expected == 1 { "argument" } else { "arguments" };
    Err(CompileError::at(
        position,
        format!("The function '{symbol}' expects {expected} {noun}, but got {found}"),
    ))
}

fn bind_function(ast: &Ast, variable: Variable, value: NodeId) -> Variable {
    match ast.kind(value) {
        NodeKind::FunctionLiteral(_) => variable.bound_to(value),
        _ => variable,
    }
}

fn identifier_symbol(ast: &Ast, id: NodeId) -> String {
    match ast.kind(id) {
        NodeKind::Identifier { symbol } => symbol.clone(),
        kind => sys_error!("assignment targets are names, found {}", kind.name()),
    }
}

fn function_detail(ast: &Ast, function: NodeId) -> &FunctionDetail {
    match ast.kind(function) {
        NodeKind::FunctionLiteral(detail) => detail,
        kind => sys_error!("expected a function literal, found {}", kind.name()),
    }
}

fn function_scope(ast: &mut Ast, function: NodeId) -> &mut Scope {
    match &mut ast.node_mut(function).kind {
        NodeKind::FunctionLiteral(detail) => &mut detail.scope,
        kind => sys_error!("expected a function literal, found {}", kind.name()),
    }
}

fn parameters_of(ast: &Ast, list: NodeId) -> Vec<NodeId> {
    match ast.kind(list) {
        NodeKind::ParameterList { parameters } => parameters.clone(),
        kind => sys_error!("expected a parameter list, found {}", kind.name()),
    }
}

/// Walks the scope chain outward from `from` and returns the first match.
fn lookup(ast: &Ast, from: NodeId, symbol: &str) -> Option<Variable> {
    let mut child = from;
    while let Some(parent) = ast.node(child).parent {
        let found = ast
            .kind(parent)
            .scope_visible_from(child)
            .and_then(|scope| scope.lookup(symbol));
        if let Some(variable) = found {
            return Some(variable.clone());
        }
        child = parent;
    }
    None
}

/// Registers `variable` in the nearest scope visible from `from`, blaming
/// `from` for a redeclaration.
fn declare(ast: &mut Ast, from: NodeId, variable: Variable) -> CompileResult<()> {
    let position = ast.node(from).position;
    let mut child = from;
    while let Some(parent) = ast.node(child).parent {
        if ast.kind(parent).scope_visible_from(child).is_some() {
            let Some(scope) = ast.node_mut(parent).kind.scope_visible_from_mut(child) else {
                sys_error!("scope visibility cannot change between lookups");
            };
            return scope.declare(variable, position);
        }
        child = parent;
    }
    sys_error!("node {from} is not linked under the program")
}

/// The direct child of the program that contains `from`.
fn top_level_statement(ast: &Ast, from: NodeId) -> Option<NodeId> {
    let root = ast.root();
    let mut child = from;
    while let Some(parent) = ast.node(child).parent {
        if parent == root {
            return Some(child);
        }
        child = parent;
    }
    None
}

/// Top-level statements before the one holding `from` that declare `symbol`.
fn earlier_declarations(ast: &Ast, from: NodeId, symbol: &str) -> Vec<NodeId> {
    let Some(statement) = top_level_statement(ast, from) else {
        return Vec::new();
    };
    ast.program()
        .scope
        .body
        .iter()
        .copied()
        .take_while(|&earlier| earlier != statement)
        .filter(|&earlier| declares(ast, earlier, symbol))
        .collect()
}

fn declares(ast: &Ast, statement: NodeId, symbol: &str) -> bool {
    let target = match ast.kind(statement) {
        NodeKind::Declaration { target, .. }
        | NodeKind::Assignment {
            operator: None,
            target,
            ..
        } => *target,
        _ => return false,
    };
    let targets = match ast.kind(target) {
        NodeKind::Vector { values } => values.clone(),
        _ => vec![target],
    };
    targets.into_iter().any(|target| {
        matches!(ast.kind(target), NodeKind::Identifier { symbol: name } if name == symbol)
    })
}

fn enclosing_function(ast: &Ast, from: NodeId) -> Option<NodeId> {
    let mut current = ast.node(from).parent;
    while let Some(id) = current {
        if let NodeKind::FunctionLiteral(_) = ast.kind(id) {
            return Some(id);
        }
        current = ast.node(id).parent;
    }
    None
}
