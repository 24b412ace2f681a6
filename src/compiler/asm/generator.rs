use std::fmt::Display;

use tracing::debug;

use crate::compiler::err::CompileError;
use crate::compiler::syntax::ast::node::{NodeId, NodeKind};
use crate::compiler::syntax::ast::Ast;
use crate::constants::common::MAIN_FUNCTION;
use crate::sys_error;
use crate::CompileResult;

/// The labelled instructions of one function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionBlock<I> {
    pub symbol: String,
    pub body: Vec<I>,
}

/// An instruction set a typed tree can be lowered to.
pub trait Target {
    type Instruction: Display;

    /// Instructions for one node, operands first and then the node itself.
    ///
    /// # Errors
    /// Node kinds this target cannot lower.
    fn emit(&mut self, ast: &Ast, node: NodeId) -> CompileResult<Vec<Self::Instruction>>;

    /// Joins the function blocks with data and runtime routines into module text.
    fn assemble(&mut self, blocks: Vec<FunctionBlock<Self::Instruction>>) -> String;
}

/// Drives a `Target` over every function recorded during type inference.
pub struct Generator<T: Target> {
    target: T,
}

impl<T: Target> Generator<T> {
    #[must_use]
    pub fn new(target: T) -> Generator<T> {
        Generator { target }
    }

    /// # Errors
    /// A missing entry function, or a node the target cannot lower.
    #[tracing::instrument(skip_all, fields(functions = ast.program().functions.len()))]
    pub fn generate(mut self, ast: &Ast) -> CompileResult<String> {
        let program = ast.program();
        if program.function(MAIN_FUNCTION).is_none() {
            return Err(CompileError::locationless(format!(
                "No {MAIN_FUNCTION} function was declared"
            )));
        }
        let blocks = program
            .functions
            .iter()
            .map(|entry| {
                let body = self.emit_body(ast, entry.node)?;
                Ok(FunctionBlock {
                    symbol: entry.symbol.clone(),
                    body,
                })
            })
            .collect::<CompileResult<Vec<_>>>()?;
        debug!(blocks = blocks.len(), "emitted");
        Ok(self.target.assemble(blocks))
    }

    fn emit_body(&mut self, ast: &Ast, function: NodeId) -> CompileResult<Vec<T::Instruction>> {
        let NodeKind::FunctionLiteral(detail) = ast.kind(function) else {
            sys_error!("function table entries must be function literals")
        };
        let mut body = Vec::new();
        for &statement in &detail.scope.body {
            body.extend(self.target.emit(ast, statement)?);
        }
        Ok(body)
    }
}
