use tracing::debug;

use crate::compiler::context::Context;
use crate::compiler::err::CompileError;
use crate::compiler::lexis::token::{Token, TokenKind};
use crate::compiler::position::Position;
use crate::compiler::scope::Scope;
use crate::sys_error;
use crate::CompileResult;

use super::ast::node::{
    ClassDetail, ElseDetail, ForDetail, ForEachDetail, FunctionDetail, IfDetail, NodeId, NodeKind,
    WhileDetail,
};
use super::ast::operator::{Comparison, Operator, Precedence};
use super::ast::ty::{Datatype, Type};
use super::ast::Ast;
use super::number::parse_number;

pub struct Parser<'a> {
    context: &'a mut Context,
    tokens: Vec<Token>,
    cursor: usize,
    /// Row of the most recently consumed token.
    last_row: usize,
    ast: Ast,
}

impl<'a> Parser<'a> {
    #[must_use]
    pub fn new(context: &'a mut Context, mut tokens: Vec<Token>) -> Parser<'a> {
        if tokens.last().map_or(true, |token| token.kind != TokenKind::Eof) {
            let position = tokens.last().map(|token| token.position).unwrap_or_default();
            tokens.push(Token::new("EOF", TokenKind::Eof, position));
        }
        Parser {
            context,
            tokens,
            cursor: 0,
            last_row: 0,
            ast: Ast::new(),
        }
    }

    /// Parses statements until end of file into a fresh tree.
    ///
    /// # Errors
    /// The first syntax error met; nothing is returned alongside it.
    #[tracing::instrument(skip_all, fields(tokens = self.tokens.len()))]
    pub fn parse_program(mut self) -> CompileResult<Ast> {
        let mut body = Vec::new();
        while self.at().kind != TokenKind::Eof {
            body.push(self.parse_statement()?);
        }
        debug!(statements = body.len(), nodes = self.ast.len(), "parsed");
        self.ast.program_mut().scope.body = body;
        Ok(self.ast)
    }

    fn at(&self) -> &Token {
        match self.tokens.get(self.cursor) {
            Some(token) => token,
            None => sys_error!("the token stream must end with an end-of-file token"),
        }
    }

    fn peek(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.cursor + offset)
    }

    fn at_kind(&self, kind: TokenKind) -> bool {
        self.at().kind == kind
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        self.at().is(TokenKind::Keyword, keyword)
    }

    /// Consumes the current token; the end-of-file token is never consumed.
    fn eat(&mut self) -> Token {
        let token = self.at().clone();
        if token.kind != TokenKind::Eof {
            self.cursor += 1;
            self.last_row = token.position.row;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind) -> CompileResult<Token> {
        let token = self.at();
        if token.kind == kind {
            return Ok(self.eat());
        }
        Err(CompileError::at(
            token.position,
            format!(
                "Expected {kind}, but got {} '{}' instead",
                token.kind, token.value
            ),
        ))
    }

    fn unexpected(token: &Token) -> CompileError {
        CompileError::at(
            token.position,
            format!("Unexpected {} '{}'", token.kind, token.value),
        )
    }

    fn push(&mut self, kind: NodeKind, position: Position) -> NodeId {
        self.ast.push(kind, position)
    }

    fn position(&self, id: NodeId) -> Position {
        self.ast.node(id).position
    }

    fn kind(&self, id: NodeId) -> &NodeKind {
        self.ast.kind(id)
    }

    fn parse_statement(&mut self) -> CompileResult<NodeId> {
        if self.at_kind(TokenKind::Keyword) {
            match self.at().value.as_str() {
                "if" => return self.parse_if(),
                "while" => return self.parse_while(),
                "foreach" => return self.parse_foreach(),
                "for" => return self.parse_for(),
                "elseif" | "else" => return Err(Self::unexpected(self.at())),
                _ => {}
            }
        }
        self.parse_expression()
    }

    fn parse_block(&mut self) -> CompileResult<Vec<NodeId>> {
        self.expect(TokenKind::LeftBrace)?;
        let mut body = Vec::new();
        while !self.at_kind(TokenKind::RightBrace) && !self.at_kind(TokenKind::Eof) {
            body.push(self.parse_statement()?);
        }
        self.expect(TokenKind::RightBrace)?;
        Ok(body)
    }

    /// Handles both `if` and `elseif`; the alternative branch chains through `next`.
    fn parse_if(&mut self) -> CompileResult<NodeId> {
        let position = self.eat().position;
        let test = self.parse_expression()?;
        let body = self.parse_block()?;
        let next = if self.at_keyword("elseif") {
            Some(self.parse_if()?)
        } else if self.at_keyword("else") {
            Some(self.parse_else()?)
        } else {
            None
        };
        let detail = IfDetail {
            test,
            scope: Scope::new(body),
            next,
        };
        Ok(self.push(NodeKind::IfStatement(detail), position))
    }

    fn parse_else(&mut self) -> CompileResult<NodeId> {
        let position = self.eat().position;
        let body = self.parse_block()?;
        let detail = ElseDetail {
            scope: Scope::new(body),
        };
        Ok(self.push(NodeKind::ElseClause(detail), position))
    }

    fn parse_while(&mut self) -> CompileResult<NodeId> {
        let position = self.eat().position;
        let test = self.parse_expression()?;
        let body = self.parse_block()?;
        let detail = WhileDetail {
            test,
            scope: Scope::new(body),
        };
        Ok(self.push(NodeKind::WhileLoop(detail), position))
    }

    fn parse_foreach(&mut self) -> CompileResult<NodeId> {
        let position = self.eat().position;
        let iteration = self.parse_expression()?;
        if !matches!(self.kind(iteration), NodeKind::Iteration { .. }) {
            return Err(CompileError::at(
                self.position(iteration),
                "Expected an iteration such as 'item : items' after 'foreach'",
            ));
        }
        let body = self.parse_block()?;
        let detail = ForEachDetail {
            iteration,
            scope: Scope::new(body),
        };
        Ok(self.push(NodeKind::ForEachLoop(detail), position))
    }

    /// `for (init) (test) (step) { body }`
    fn parse_for(&mut self) -> CompileResult<NodeId> {
        let position = self.eat().position;
        let init = self.parse_clause()?;
        let test = self.parse_clause()?;
        let step = self.parse_clause()?;
        let body = self.parse_block()?;
        let detail = ForDetail {
            init,
            test,
            step,
            scope: Scope::new(body),
        };
        Ok(self.push(NodeKind::ForLoop(detail), position))
    }

    fn parse_clause(&mut self) -> CompileResult<NodeId> {
        self.expect(TokenKind::LeftParenthesis)?;
        let clause = self.parse_expression()?;
        self.expect(TokenKind::RightParenthesis)?;
        Ok(clause)
    }

    fn parse_expression(&mut self) -> CompileResult<NodeId> {
        self.parse_return()
    }

    fn parse_return(&mut self) -> CompileResult<NodeId> {
        if !self.at_keyword("return") {
            return self.parse_declaration();
        }
        let position = self.eat().position;
        let value = self.parse_declaration()?;
        Ok(self.push(NodeKind::Return { value }, position))
    }

    /// A datatype directly followed by an identifier turns the assignment
    /// after it into a declaration, rewriting the node in place.
    fn parse_declaration(&mut self) -> CompileResult<NodeId> {
        let is_declaration = self.at_kind(TokenKind::Datatype)
            && self
                .peek(1)
                .is_some_and(|token| token.kind == TokenKind::Identifier);
        if !is_declaration {
            return self.parse_assignment();
        }

        let datatype_token = self.eat();
        let Some(datatype) = Datatype::from_keyword(&datatype_token.value) else {
            sys_error!("'{}' is lexed as a datatype", datatype_token.value)
        };
        let assignment = self.parse_assignment()?;
        let (target, value) = match self.kind(assignment) {
            NodeKind::Assignment {
                operator: None,
                target,
                value,
            } => (*target, *value),
            NodeKind::Assignment {
                operator: Some(operator),
                ..
            } => {
                return Err(CompileError::at(
                    self.position(assignment),
                    format!("Cannot declare a variable with the '{operator}=' assignment"),
                ));
            }
            _ => {
                let token = self.at();
                return Err(CompileError::at(
                    token.position,
                    format!(
                        "Expected assignment, but got {} '{}' instead",
                        token.kind, token.value
                    ),
                ));
            }
        };

        if datatype == Datatype::Enum {
            self.convert_to_enum(value)?;
        }
        self.name_function(target, value);

        let node = self.ast.node_mut(assignment);
        node.kind = NodeKind::Declaration {
            datatype,
            target,
            value,
        };
        node.position = datatype_token.position;
        Ok(assignment)
    }

    fn convert_to_enum(&mut self, value: NodeId) -> CompileResult<()> {
        let NodeKind::ArrayLiteral { values } = self.kind(value) else {
            return Ok(());
        };
        let enumerators = values.clone();
        if let Some(&bad) = enumerators
            .iter()
            .find(|&&id| !matches!(self.kind(id), NodeKind::Identifier { .. }))
        {
            return Err(CompileError::at(
                self.position(bad),
                "Enumerators must be plain names",
            ));
        }
        self.ast.node_mut(value).kind = NodeKind::EnumLiteral { enumerators };
        Ok(())
    }

    /// A function literal declared under a name is emitted under that name.
    fn name_function(&mut self, target: NodeId, value: NodeId) {
        let NodeKind::Identifier { symbol } = self.kind(target) else {
            return;
        };
        let symbol = symbol.clone();
        if let NodeKind::FunctionLiteral(detail) = &mut self.ast.node_mut(value).kind {
            detail.symbol = symbol;
            detail.anonymous = false;
        }
    }

    fn parse_assignment(&mut self) -> CompileResult<NodeId> {
        let target = self.parse_iteration()?;
        if !self.at_kind(TokenKind::Assignment) {
            return Ok(target);
        }
        let token = self.eat();
        let operator = match token.value.strip_suffix('=') {
            Some("") => None,
            Some(symbol) => match Operator::from_symbol(symbol) {
                Some(operator) => Some(operator),
                None => sys_error!("'{}' is lexed as an assignment", token.value),
            },
            None => sys_error!("'{}' is lexed as an assignment", token.value),
        };
        self.check_assignment_target(target)?;
        let value = self.parse_iteration()?;
        self.check_assignment_arity(target, value)?;
        Ok(self.push(
            NodeKind::Assignment {
                operator,
                target,
                value,
            },
            token.position,
        ))
    }

    fn check_assignment_target(&self, target: NodeId) -> CompileResult<()> {
        let valid = match self.kind(target) {
            NodeKind::Identifier { .. } => true,
            NodeKind::Vector { values } => values
                .iter()
                .all(|&id| matches!(self.kind(id), NodeKind::Identifier { .. })),
            _ => false,
        };
        if valid {
            Ok(())
        } else {
            Err(CompileError::at(
                self.position(target),
                "Unexpected left-hand side of assignment",
            ))
        }
    }

    fn check_assignment_arity(&self, target: NodeId, value: NodeId) -> CompileResult<()> {
        match (self.kind(target), self.kind(value)) {
            (NodeKind::Vector { values: targets }, NodeKind::Vector { values })
                if targets.len() != values.len() =>
            {
                Err(CompileError::at(
                    self.position(value),
                    format!(
                        "Cannot assign {} values to {} variables",
                        values.len(),
                        targets.len()
                    ),
                ))
            }
            (NodeKind::Identifier { symbol }, NodeKind::Vector { .. }) => Err(CompileError::at(
                self.position(value),
                format!("Cannot assign several values to the single variable '{symbol}'"),
            )),
            _ => Ok(()),
        }
    }

    fn parse_iteration(&mut self) -> CompileResult<NodeId> {
        let item = self.parse_function()?;
        if !self.at_kind(TokenKind::Iteration) {
            return Ok(item);
        }
        let position = self.eat().position;
        let iterable = self.parse_function()?;
        if !matches!(self.kind(item), NodeKind::Identifier { .. }) {
            return Err(CompileError::at(
                self.position(item),
                "The item of an iteration must be a variable name",
            ));
        }
        if !matches!(
            self.kind(iterable),
            NodeKind::Identifier { .. } | NodeKind::ArrayLiteral { .. }
        ) {
            return Err(CompileError::at(
                self.position(iterable),
                "Only a variable or an array can be iterated over",
            ));
        }
        Ok(self.push(NodeKind::Iteration { item, iterable }, position))
    }

    fn parse_function(&mut self) -> CompileResult<NodeId> {
        let parameters = self.parse_logical()?;
        let is_parameter_list = matches!(self.kind(parameters), NodeKind::ParameterList { .. });
        if self.at_kind(TokenKind::FunctionArrow) && !is_parameter_list {
            return Err(CompileError::at(
                self.at().position,
                "Expected a parameter list before '=>'",
            ));
        }
        if !is_parameter_list {
            return Ok(parameters);
        }
        self.expect(TokenKind::FunctionArrow)?;
        let body = self.parse_block()?;
        let detail = FunctionDetail {
            parameters,
            scope: Scope::new(body),
            return_type: Type::Unknown,
            symbol: self.context.next_anonymous_symbol(),
            anonymous: true,
        };
        let position = self.position(parameters);
        Ok(self.push(NodeKind::FunctionLiteral(detail), position))
    }

    fn parse_binary_level(
        &mut self,
        precedence: Precedence,
        next: fn(&mut Self) -> CompileResult<NodeId>,
    ) -> CompileResult<NodeId> {
        let mut left = next(self)?;
        loop {
            let token = self.at();
            if token.kind != TokenKind::Operator {
                break;
            }
            let Some(operator) = Operator::from_symbol(&token.value) else {
                break;
            };
            if operator.precedence() != Some(precedence) {
                break;
            }
            let position = self.eat().position;
            let right = next(self)?;
            left = self.push(
                NodeKind::BinaryOperation {
                    operator,
                    left,
                    right,
                },
                position,
            );
        }
        Ok(left)
    }

    fn parse_logical(&mut self) -> CompileResult<NodeId> {
        self.parse_binary_level(Precedence::Logical, Self::parse_comparator)
    }

    fn parse_comparator(&mut self) -> CompileResult<NodeId> {
        let left = self.parse_list()?;
        if !self.at_kind(TokenKind::Comparator) {
            return Ok(left);
        }
        let token = self.eat();
        let Some(comparison) = Comparison::from_symbol(&token.value) else {
            sys_error!("'{}' is lexed as a comparator", token.value)
        };
        let right = self.parse_list()?;
        if self.at_kind(TokenKind::Comparator) {
            return Err(CompileError::at(
                self.at().position,
                "Comparators cannot be chained",
            ));
        }
        Ok(self.push(
            NodeKind::Comparator {
                comparison,
                left,
                right,
            },
            token.position,
        ))
    }

    /// Comma-separated values; a single value is returned unwrapped.
    fn parse_list(&mut self) -> CompileResult<NodeId> {
        let first = self.parse_additive()?;
        if !self.at_kind(TokenKind::Separator) {
            return Ok(first);
        }
        let mut values = vec![first];
        while self.at_kind(TokenKind::Separator) {
            self.eat();
            values.push(self.parse_additive()?);
        }
        let position = self.position(first);
        Ok(self.push(NodeKind::Vector { values }, position))
    }

    fn parse_additive(&mut self) -> CompileResult<NodeId> {
        self.parse_binary_level(Precedence::Additive, Self::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self) -> CompileResult<NodeId> {
        self.parse_binary_level(Precedence::Multiplicative, Self::parse_unary)
    }

    fn parse_unary(&mut self) -> CompileResult<NodeId> {
        let token = self.at();
        let operator = (token.kind == TokenKind::Operator)
            .then(|| Operator::from_symbol(&token.value))
            .flatten()
            .filter(|operator| operator.is_unary());
        let Some(operator) = operator else {
            return self.parse_call();
        };
        let position = self.eat().position;
        let operand = self.parse_unary()?;
        Ok(self.push(NodeKind::UnaryOperation { operator, operand }, position))
    }

    /// A `(` on the callee's row applies it; on a later row it opens a new statement.
    fn parse_call(&mut self) -> CompileResult<NodeId> {
        let callee = self.parse_atom()?;
        let callable = matches!(
            self.kind(callee),
            NodeKind::Identifier { .. } | NodeKind::FunctionLiteral(_)
        );
        let same_row = self.at().position.row == self.last_row;
        if !(callable && same_row && self.at_kind(TokenKind::LeftParenthesis)) {
            return Ok(callee);
        }
        self.eat();
        let arguments = if self.at_kind(TokenKind::RightParenthesis) {
            Vec::new()
        } else {
            let argument = self.parse_expression()?;
            match self.kind(argument) {
                NodeKind::Vector { values } => values.clone(),
                _ => vec![argument],
            }
        };
        self.expect(TokenKind::RightParenthesis)?;
        let position = self.position(callee);
        Ok(self.push(NodeKind::FunctionCall { callee, arguments }, position))
    }

    fn parse_atom(&mut self) -> CompileResult<NodeId> {
        let token = self.at().clone();
        let position = token.position;
        match token.kind {
            TokenKind::Identifier => {
                self.eat();
                Ok(self.push(
                    NodeKind::Identifier {
                        symbol: token.value,
                    },
                    position,
                ))
            }
            TokenKind::Number => {
                self.eat();
                let value = parse_number(&token.value)
                    .map_err(|e| CompileError::at(position, e.to_string()))?;
                Ok(self.push(NodeKind::NumberLiteral(value), position))
            }
            TokenKind::Boolean => {
                self.eat();
                let value = match token.value.as_str() {
                    "true" => true,
                    "false" => false,
                    _ => {
                        return Err(CompileError::at(
                            position,
                            format!("Malformed boolean '{}'", token.value),
                        ))
                    }
                };
                Ok(self.push(NodeKind::BooleanLiteral(value), position))
            }
            TokenKind::String => {
                self.eat();
                Ok(self.push(NodeKind::StringLiteral(token.value), position))
            }
            TokenKind::Keyword => {
                self.eat();
                Ok(self.push(NodeKind::Keyword(token.value), position))
            }
            TokenKind::Datatype => {
                self.eat();
                let Some(datatype) = Datatype::from_keyword(&token.value) else {
                    sys_error!("'{}' is lexed as a datatype", token.value)
                };
                Ok(self.push(NodeKind::Datatype(datatype), position))
            }
            TokenKind::LeftParenthesis if self.at_parameter_list() => self.parse_parameter_list(),
            TokenKind::LeftParenthesis => {
                self.eat();
                let group = self.parse_expression()?;
                self.expect(TokenKind::RightParenthesis)?;
                Ok(group)
            }
            TokenKind::LeftBracket => self.parse_array(),
            TokenKind::LeftBrace => {
                let body = self.parse_block()?;
                let detail = ClassDetail {
                    scope: Scope::new(body),
                };
                Ok(self.push(NodeKind::ClassLiteral(detail), position))
            }
            _ => Err(Self::unexpected(&token)),
        }
    }

    /// `()` or `(datatype name` followed by `,` or `)`.
    fn at_parameter_list(&self) -> bool {
        let kind_at = |offset| self.peek(offset).map(|token| token.kind);
        match kind_at(1) {
            Some(TokenKind::RightParenthesis) => true,
            Some(TokenKind::Datatype) => {
                kind_at(2) == Some(TokenKind::Identifier)
                    && matches!(
                        kind_at(3),
                        Some(TokenKind::Separator | TokenKind::RightParenthesis)
                    )
            }
            _ => false,
        }
    }

    fn parse_parameter_list(&mut self) -> CompileResult<NodeId> {
        let position = self.expect(TokenKind::LeftParenthesis)?.position;
        let mut parameters = Vec::new();
        if !self.at_kind(TokenKind::RightParenthesis) {
            loop {
                parameters.push(self.parse_parameter()?);
                if !self.at_kind(TokenKind::Separator) {
                    break;
                }
                self.eat();
            }
        }
        self.expect(TokenKind::RightParenthesis)?;
        Ok(self.push(NodeKind::ParameterList { parameters }, position))
    }

    fn parse_parameter(&mut self) -> CompileResult<NodeId> {
        let datatype_token = self.expect(TokenKind::Datatype)?;
        let Some(datatype) = Datatype::from_keyword(&datatype_token.value) else {
            sys_error!("'{}' is lexed as a datatype", datatype_token.value)
        };
        if datatype == Datatype::Let {
            return Err(CompileError::at(
                datatype_token.position,
                "A parameter needs an explicit datatype, not 'let'",
            ));
        }
        let symbol = self.expect(TokenKind::Identifier)?.value;
        Ok(self.push(
            NodeKind::Parameter { datatype, symbol },
            datatype_token.position,
        ))
    }

    /// A bracketed vector becomes the array itself, keeping its elements.
    fn parse_array(&mut self) -> CompileResult<NodeId> {
        let position = self.expect(TokenKind::LeftBracket)?.position;
        if self.at_kind(TokenKind::RightBracket) {
            self.eat();
            return Ok(self.push(NodeKind::ArrayLiteral { values: Vec::new() }, position));
        }
        let inner = self.parse_expression()?;
        self.expect(TokenKind::RightBracket)?;
        if let NodeKind::Vector { values } = self.kind(inner) {
            let values = values.clone();
            let node = self.ast.node_mut(inner);
            node.kind = NodeKind::ArrayLiteral { values };
            node.position = position;
            return Ok(inner);
        }
        Ok(self.push(
            NodeKind::ArrayLiteral {
                values: vec![inner],
            },
            position,
        ))
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;
    use crate::compiler::lexis::lexer::Lexer;

    fn parse(code: &str) -> CompileResult<Ast> {
        let tokens = Lexer::new(code).tokenize()?;
        let mut context = Context::new();
        Parser::new(&mut context, tokens).parse_program()
    }

    fn first_statement(ast: &Ast) -> NodeId {
        ast.program().scope.body[0]
    }

    fn error_of(code: &str) -> String {
        parse(code).unwrap_err().to_string()
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let ast = parse("2 + 3 * 4").unwrap();
        let NodeKind::BinaryOperation {
            operator: Operator::Add,
            left,
            right,
        } = ast.kind(first_statement(&ast))
        else {
            panic!("expected an addition at the top");
        };
        assert_eq!(ast.kind(*left), &NodeKind::NumberLiteral(2.0));
        let NodeKind::BinaryOperation {
            operator: Operator::Multiply,
            left,
            right,
        } = ast.kind(*right)
        else {
            panic!("expected a multiplication on the right");
        };
        assert_eq!(ast.kind(*left), &NodeKind::NumberLiteral(3.0));
        assert_eq!(ast.kind(*right), &NodeKind::NumberLiteral(4.0));
    }

    #[test]
    fn subtraction_is_left_associative() {
        let ast = parse("8 - 4 - 2").unwrap();
        let NodeKind::BinaryOperation { left, right, .. } = ast.kind(first_statement(&ast)) else {
            panic!("expected a subtraction");
        };
        assert!(matches!(ast.kind(*left), NodeKind::BinaryOperation { .. }));
        assert_eq!(ast.kind(*right), &NodeKind::NumberLiteral(2.0));
    }

    #[test]
    fn declaration_rewrites_assignment() {
        let ast = parse("number x = -5").unwrap();
        let statement = first_statement(&ast);
        let NodeKind::Declaration {
            datatype: Datatype::Number,
            target,
            value,
        } = ast.kind(statement)
        else {
            panic!("expected a declaration");
        };
        assert_eq!(
            ast.kind(*target),
            &NodeKind::Identifier {
                symbol: "x".to_string()
            }
        );
        assert!(matches!(
            ast.kind(*value),
            NodeKind::UnaryOperation {
                operator: Operator::Subtract,
                ..
            }
        ));
        assert_eq!(ast.node(statement).position, Position::new(0, 0));
    }

    #[test]
    fn declared_function_takes_its_name() {
        let ast = parse(indoc! {"
            func add = (number a, number b) => {
                return a + b
            }
            let f = () => { return 1 }
        "})
        .unwrap();
        let body = &ast.program().scope.body;
        let NodeKind::Declaration { value, .. } = ast.kind(body[0]) else {
            panic!("expected a declaration");
        };
        let NodeKind::FunctionLiteral(detail) = ast.kind(*value) else {
            panic!("expected a function literal");
        };
        assert_eq!(detail.symbol, "add");
        assert!(!detail.anonymous);
        let NodeKind::ParameterList { parameters } = ast.kind(detail.parameters) else {
            panic!("expected parameters");
        };
        assert_eq!(parameters.len(), 2);
        assert_eq!(detail.scope.body.len(), 1);

        let NodeKind::Declaration { value, .. } = ast.kind(body[1]) else {
            panic!("expected a declaration");
        };
        let NodeKind::FunctionLiteral(detail) = ast.kind(*value) else {
            panic!("expected a function literal");
        };
        assert_eq!(detail.symbol, "f");
    }

    #[test]
    fn anonymous_functions_are_numbered() {
        let ast = parse("print(() => { return 1 })").unwrap();
        let NodeKind::FunctionCall { arguments, .. } = ast.kind(first_statement(&ast)) else {
            panic!("expected a call");
        };
        let NodeKind::FunctionLiteral(detail) = ast.kind(arguments[0]) else {
            panic!("expected a function literal argument");
        };
        assert_eq!(detail.symbol, "anonymous_0");
        assert!(detail.anonymous);
    }

    #[test]
    fn call_arguments_are_flattened() {
        let ast = parse("add(1, 2 * 3)").unwrap();
        let NodeKind::FunctionCall { callee, arguments } = ast.kind(first_statement(&ast)) else {
            panic!("expected a call");
        };
        assert_eq!(
            ast.kind(*callee),
            &NodeKind::Identifier {
                symbol: "add".to_string()
            }
        );
        assert_eq!(arguments.len(), 2);
    }

    #[test]
    fn parenthesis_on_next_row_is_not_a_call() {
        let ast = parse("x\n(1)").unwrap();
        assert_eq!(ast.program().scope.body.len(), 2);
    }

    #[test]
    fn if_chain_links_alternatives() {
        let ast = parse(indoc! {"
            if x > 1 {
                y = 1
            } elseif x < 0 {
                y = 2
            } else {
                y = 3
            }
        "})
        .unwrap();
        let NodeKind::IfStatement(detail) = ast.kind(first_statement(&ast)) else {
            panic!("expected an if statement");
        };
        let Some(next) = detail.next else {
            panic!("expected an elseif");
        };
        let NodeKind::IfStatement(detail) = ast.kind(next) else {
            panic!("expected a chained if statement");
        };
        let Some(next) = detail.next else {
            panic!("expected an else");
        };
        assert!(matches!(ast.kind(next), NodeKind::ElseClause(_)));
    }

    #[test]
    fn loops() {
        let ast = parse(indoc! {"
            foreach n : [1, 2, 3] {
                print(n)
            }
            for (number i = 0) (i < 3) (i += 1) {
                print(i)
            }
            while true {
            }
        "})
        .unwrap();
        let body = &ast.program().scope.body;
        let NodeKind::ForEachLoop(detail) = ast.kind(body[0]) else {
            panic!("expected a foreach loop");
        };
        let NodeKind::Iteration { iterable, .. } = ast.kind(detail.iteration) else {
            panic!("expected an iteration");
        };
        assert!(matches!(ast.kind(*iterable), NodeKind::ArrayLiteral { values } if values.len() == 3));
        let NodeKind::ForLoop(detail) = ast.kind(body[1]) else {
            panic!("expected a for loop");
        };
        assert!(matches!(ast.kind(detail.init), NodeKind::Declaration { .. }));
        assert!(matches!(ast.kind(detail.step), NodeKind::Assignment { operator: Some(Operator::Add), .. }));
        assert!(matches!(ast.kind(body[2]), NodeKind::WhileLoop(_)));
    }

    #[test]
    fn enum_and_class_literals() {
        let ast = parse("enum Color = [red, green]\nclass Point = { number x = 0 }").unwrap();
        let body = &ast.program().scope.body;
        let NodeKind::Declaration { value, .. } = ast.kind(body[0]) else {
            panic!("expected a declaration");
        };
        assert!(matches!(ast.kind(*value), NodeKind::EnumLiteral { enumerators } if enumerators.len() == 2));
        let NodeKind::Declaration { value, .. } = ast.kind(body[1]) else {
            panic!("expected a declaration");
        };
        assert!(matches!(ast.kind(*value), NodeKind::ClassLiteral(_)));
    }

    #[test]
    fn vector_assignment() {
        let ast = parse("number a, b = 1, 2").unwrap();
        let NodeKind::Declaration { target, value, .. } = ast.kind(first_statement(&ast)) else {
            panic!("expected a declaration");
        };
        assert!(matches!(ast.kind(*target), NodeKind::Vector { values } if values.len() == 2));
        assert!(matches!(ast.kind(*value), NodeKind::Vector { values } if values.len() == 2));
    }

    #[test]
    fn invalid_assignments() {
        assert_eq!(
            error_of("1 = 2"),
            "Unexpected left-hand side of assignment (1:1)"
        );
        assert_eq!(
            error_of("a, b = 1, 2, 3"),
            "Cannot assign 3 values to 2 variables (1:8)"
        );
        assert_eq!(
            error_of("a = 1, 2"),
            "Cannot assign several values to the single variable 'a' (1:5)"
        );
        assert_eq!(
            error_of("number x += 1"),
            "Cannot declare a variable with the '+=' assignment (1:10)"
        );
    }

    #[test]
    fn invalid_iterations() {
        assert_eq!(
            error_of("foreach 1 : xs {}"),
            "The item of an iteration must be a variable name (1:9)"
        );
        assert_eq!(
            error_of("foreach x : 5 {}"),
            "Only a variable or an array can be iterated over (1:13)"
        );
    }

    #[test]
    fn invalid_parameters() {
        assert_eq!(
            error_of("f = (let a) => { }"),
            "A parameter needs an explicit datatype, not 'let' (1:6)"
        );
        assert_eq!(
            error_of("f = (number a, b) => { }"),
            "Expected datatype, but got identifier 'b' instead (1:16)"
        );
        assert_eq!(
            error_of("f = x => { }"),
            "Expected a parameter list before '=>' (1:7)"
        );
    }

    #[test]
    fn structural_errors() {
        assert_eq!(
            error_of("(1 + 2"),
            "Expected parenthesis, but got end of file 'EOF' instead (1:7)"
        );
        assert_eq!(error_of("x = )"), "Unexpected parenthesis ')' (1:5)");
        assert_eq!(error_of("else { }"), "Unexpected keyword 'else' (1:1)");
        assert_eq!(
            error_of("1 < 2 < 3"),
            "Comparators cannot be chained (1:7)"
        );
        assert_eq!(
            error_of("x = b102"),
            "'2' is not a valid binary digit (1:5)"
        );
        assert_eq!(
            error_of("if true { x = 1"),
            "Expected brace, but got end of file 'EOF' instead (1:16)"
        );
    }
}
