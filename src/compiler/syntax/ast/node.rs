use std::fmt::{self, Display};

use crate::compiler::position::Position;
use crate::compiler::scope::{Scope, Scopeable};

use super::operator::{Comparison, Operator};
use super::ty::{Datatype, Type};

/// Index of a node inside its `Ast` arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub position: Position,
    /// Filled once by the type inferrer.
    pub ty: Type,
    /// Set by the linking pass; `None` for the root and for detached nodes.
    pub parent: Option<NodeId>,
}

impl Node {
    #[must_use]
    pub fn new(kind: NodeKind, position: Position) -> Node {
        Node {
            kind,
            position,
            ty: Type::Unknown,
            parent: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDetail {
    pub parameters: NodeId,
    pub scope: Scope,
    /// Open until the first `return` in the body is typed.
    pub return_type: Type,
    pub symbol: String,
    pub anonymous: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDetail {
    pub scope: Scope,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfDetail {
    pub test: NodeId,
    pub scope: Scope,
    /// A chained `elseif` (another `IfStatement`) or a trailing `ElseClause`.
    pub next: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElseDetail {
    pub scope: Scope,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileDetail {
    pub test: NodeId,
    pub scope: Scope,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForDetail {
    pub init: NodeId,
    pub test: NodeId,
    pub step: NodeId,
    pub scope: Scope,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForEachDetail {
    pub iteration: NodeId,
    pub scope: Scope,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionEntry {
    pub symbol: String,
    pub node: NodeId,
}

/// A call site and the function literal it was resolved to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallEntry {
    pub call: NodeId,
    pub function: NodeId,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgramDetail {
    pub scope: Scope,
    /// Top-level named functions, callable before their declaration.
    pub hoisted: Vec<FunctionEntry>,
    /// Every typed function literal in the order it was typed.
    pub functions: Vec<FunctionEntry>,
    pub calls: Vec<CallEntry>,
}

impl ProgramDetail {
    #[must_use]
    pub fn hoisted(&self, symbol: &str) -> Option<NodeId> {
        self.hoisted
            .iter()
            .find(|entry| entry.symbol == symbol)
            .map(|entry| entry.node)
    }

    #[must_use]
    pub fn function(&self, symbol: &str) -> Option<NodeId> {
        self.functions
            .iter()
            .find(|entry| entry.symbol == symbol)
            .map(|entry| entry.node)
    }

    /// The function literal a call resolved to, unless it called a built-in
    /// or a function value of unknown shape.
    #[must_use]
    pub fn call_target(&self, call: NodeId) -> Option<NodeId> {
        self.calls
            .iter()
            .find(|entry| entry.call == call)
            .map(|entry| entry.function)
    }
}

macro_rules! impl_scopeable {
    ($($detail:ty),* $(,)?) => {
        $(
            impl Scopeable for $detail {
                fn scope(&self) -> &Scope {
                    &self.scope
                }

                fn scope_mut(&mut self) -> &mut Scope {
                    &mut self.scope
                }
            }
        )*
    };
}

impl_scopeable!(
    ProgramDetail,
    FunctionDetail,
    IfDetail,
    ElseDetail,
    WhileDetail,
    ForDetail,
    ForEachDetail,
    ClassDetail,
);

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Identifier {
        symbol: String,
    },
    BinaryOperation {
        operator: Operator,
        left: NodeId,
        right: NodeId,
    },
    UnaryOperation {
        operator: Operator,
        operand: NodeId,
    },
    Comparator {
        comparison: Comparison,
        left: NodeId,
        right: NodeId,
    },
    NumberLiteral(f64),
    BooleanLiteral(bool),
    StringLiteral(String),
    FunctionLiteral(FunctionDetail),
    EnumLiteral {
        enumerators: Vec<NodeId>,
    },
    ClassLiteral(ClassDetail),
    ArrayLiteral {
        values: Vec<NodeId>,
    },
    Declaration {
        datatype: Datatype,
        target: NodeId,
        value: NodeId,
    },
    Assignment {
        /// `Some` for compound forms such as `+=`.
        operator: Option<Operator>,
        target: NodeId,
        value: NodeId,
    },
    IfStatement(IfDetail),
    ElseClause(ElseDetail),
    WhileLoop(WhileDetail),
    ForLoop(ForDetail),
    ForEachLoop(ForEachDetail),
    Vector {
        values: Vec<NodeId>,
    },
    Parameter {
        datatype: Datatype,
        symbol: String,
    },
    ParameterList {
        parameters: Vec<NodeId>,
    },
    Return {
        value: NodeId,
    },
    Iteration {
        item: NodeId,
        iterable: NodeId,
    },
    FunctionCall {
        callee: NodeId,
        arguments: Vec<NodeId>,
    },
    Keyword(String),
    Datatype(Datatype),
    Program(ProgramDetail),
}

impl NodeKind {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Identifier { .. } => "Identifier",
            NodeKind::BinaryOperation { .. } => "BinaryOperation",
            NodeKind::UnaryOperation { .. } => "UnaryOperation",
            NodeKind::Comparator { .. } => "Comparator",
            NodeKind::NumberLiteral(_) => "NumberLiteral",
            NodeKind::BooleanLiteral(_) => "BooleanLiteral",
            NodeKind::StringLiteral(_) => "StringLiteral",
            NodeKind::FunctionLiteral(_) => "FunctionLiteral",
            NodeKind::EnumLiteral { .. } => "EnumLiteral",
            NodeKind::ClassLiteral(_) => "ClassLiteral",
            NodeKind::ArrayLiteral { .. } => "ArrayLiteral",
            NodeKind::Declaration { .. } => "Declaration",
            NodeKind::Assignment { .. } => "Assignment",
            NodeKind::IfStatement(_) => "IfStatement",
            NodeKind::ElseClause(_) => "ElseClause",
            NodeKind::WhileLoop(_) => "WhileLoop",
            NodeKind::ForLoop(_) => "ForLoop",
            NodeKind::ForEachLoop(_) => "ForEachLoop",
            NodeKind::Vector { .. } => "Vector",
            NodeKind::Parameter { .. } => "Parameter",
            NodeKind::ParameterList { .. } => "ParameterList",
            NodeKind::Return { .. } => "Return",
            NodeKind::Iteration { .. } => "Iteration",
            NodeKind::FunctionCall { .. } => "FunctionCall",
            NodeKind::Keyword(_) => "Keyword",
            NodeKind::Datatype(_) => "Datatype",
            NodeKind::Program(_) => "Program",
        }
    }

    /// Every child slot in source order, block bodies included.
    #[must_use]
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            NodeKind::Identifier { .. }
            | NodeKind::NumberLiteral(_)
            | NodeKind::BooleanLiteral(_)
            | NodeKind::StringLiteral(_)
            | NodeKind::Parameter { .. }
            | NodeKind::Keyword(_)
            | NodeKind::Datatype(_) => Vec::new(),
            NodeKind::BinaryOperation { left, right, .. }
            | NodeKind::Comparator { left, right, .. } => vec![*left, *right],
            NodeKind::UnaryOperation { operand, .. } => vec![*operand],
            NodeKind::FunctionLiteral(FunctionDetail {
                parameters, scope, ..
            }) => std::iter::once(*parameters)
                .chain(scope.body.iter().copied())
                .collect(),
            NodeKind::EnumLiteral { enumerators } => enumerators.clone(),
            NodeKind::ArrayLiteral { values } | NodeKind::Vector { values } => values.clone(),
            NodeKind::Declaration { target, value, .. }
            | NodeKind::Assignment { target, value, .. } => vec![*target, *value],
            NodeKind::IfStatement(IfDetail { test, scope, next }) => std::iter::once(*test)
                .chain(scope.body.iter().copied())
                .chain(*next)
                .collect(),
            NodeKind::ElseClause(ElseDetail { scope })
            | NodeKind::ClassLiteral(ClassDetail { scope })
            | NodeKind::Program(ProgramDetail { scope, .. }) => scope.body.clone(),
            NodeKind::WhileLoop(WhileDetail { test, scope }) => std::iter::once(*test)
                .chain(scope.body.iter().copied())
                .collect(),
            NodeKind::ForLoop(ForDetail {
                init,
                test,
                step,
                scope,
            }) => [*init, *test, *step]
                .into_iter()
                .chain(scope.body.iter().copied())
                .collect(),
            NodeKind::ForEachLoop(ForEachDetail { iteration, scope }) => {
                std::iter::once(*iteration)
                    .chain(scope.body.iter().copied())
                    .collect()
            }
            NodeKind::ParameterList { parameters } => parameters.clone(),
            NodeKind::Return { value } => vec![*value],
            NodeKind::Iteration { item, iterable } => vec![*item, *iterable],
            NodeKind::FunctionCall { callee, arguments } => std::iter::once(*callee)
                .chain(arguments.iter().copied())
                .collect(),
        }
    }

    #[must_use]
    pub fn as_scopeable(&self) -> Option<&dyn Scopeable> {
        match self {
            NodeKind::Program(detail) => Some(detail),
            NodeKind::FunctionLiteral(detail) => Some(detail),
            NodeKind::IfStatement(detail) => Some(detail),
            NodeKind::ElseClause(detail) => Some(detail),
            NodeKind::WhileLoop(detail) => Some(detail),
            NodeKind::ForLoop(detail) => Some(detail),
            NodeKind::ForEachLoop(detail) => Some(detail),
            NodeKind::ClassLiteral(detail) => Some(detail),
            NodeKind::Identifier { .. }
            | NodeKind::BinaryOperation { .. }
            | NodeKind::UnaryOperation { .. }
            | NodeKind::Comparator { .. }
            | NodeKind::NumberLiteral(_)
            | NodeKind::BooleanLiteral(_)
            | NodeKind::StringLiteral(_)
            | NodeKind::EnumLiteral { .. }
            | NodeKind::ArrayLiteral { .. }
            | NodeKind::Declaration { .. }
            | NodeKind::Assignment { .. }
            | NodeKind::Vector { .. }
            | NodeKind::Parameter { .. }
            | NodeKind::ParameterList { .. }
            | NodeKind::Return { .. }
            | NodeKind::Iteration { .. }
            | NodeKind::FunctionCall { .. }
            | NodeKind::Keyword(_)
            | NodeKind::Datatype(_) => None,
        }
    }

    pub fn as_scopeable_mut(&mut self) -> Option<&mut dyn Scopeable> {
        match self {
            NodeKind::Program(detail) => Some(detail),
            NodeKind::FunctionLiteral(detail) => Some(detail),
            NodeKind::IfStatement(detail) => Some(detail),
            NodeKind::ElseClause(detail) => Some(detail),
            NodeKind::WhileLoop(detail) => Some(detail),
            NodeKind::ForLoop(detail) => Some(detail),
            NodeKind::ForEachLoop(detail) => Some(detail),
            NodeKind::ClassLiteral(detail) => Some(detail),
            _ => None,
        }
    }

    /// The scope of this node that `child` may resolve names in.
    ///
    /// An `if`'s alternative branch hangs off the `if` node but must not
    /// see the locals of the `if` body.
    #[must_use]
    pub fn scope_visible_from(&self, child: NodeId) -> Option<&Scope> {
        if let NodeKind::IfStatement(IfDetail { next: Some(next), .. }) = self {
            if *next == child {
                return None;
            }
        }
        self.as_scopeable().map(Scopeable::scope)
    }

    /// Same as `scope_visible_from`, for registering a new local.
    pub fn scope_visible_from_mut(&mut self, child: NodeId) -> Option<&mut Scope> {
        if let NodeKind::IfStatement(IfDetail { next: Some(next), .. }) = self {
            if *next == child {
                return None;
            }
        }
        self.as_scopeable_mut().map(Scopeable::scope_mut)
    }

    /// Kind-specific fields shown in the tree dump.
    fn summary(&self) -> Option<String> {
        match self {
            NodeKind::Identifier { symbol } => Some(symbol.clone()),
            NodeKind::BinaryOperation { operator, .. } | NodeKind::UnaryOperation { operator, .. } => {
                Some(format!("'{operator}'"))
            }
            NodeKind::Comparator { comparison, .. } => Some(format!("'{comparison}'")),
            NodeKind::NumberLiteral(value) => Some(value.to_string()),
            NodeKind::BooleanLiteral(value) => Some(value.to_string()),
            NodeKind::StringLiteral(value) => Some(format!("{value:?}")),
            NodeKind::FunctionLiteral(FunctionDetail {
                symbol,
                return_type,
                ..
            }) => Some(format!("{symbol} -> {return_type}")),
            NodeKind::Declaration { datatype, .. } | NodeKind::Datatype(datatype) => {
                Some(datatype.to_string())
            }
            NodeKind::Parameter { datatype, symbol } => Some(format!("{datatype} {symbol}")),
            NodeKind::Assignment {
                operator: Some(operator),
                ..
            } => Some(format!("'{operator}='")),
            NodeKind::Keyword(keyword) => Some(keyword.clone()),
            _ => None,
        }
    }

    pub(super) fn headline(&self) -> String {
        match self.summary() {
            Some(summary) => format!("{} {summary}", self.name()),
            None => self.name().to_string(),
        }
    }
}
