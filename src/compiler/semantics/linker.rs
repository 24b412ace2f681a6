use tracing::debug;

use crate::compiler::syntax::ast::Ast;

/// Points every reachable node at its structural parent.
///
/// Children come from `NodeKind::children`, so no kind needs its own rule.
#[tracing::instrument(skip_all)]
pub fn link(ast: &mut Ast) {
    let mut stack = vec![ast.root()];
    let mut linked = 0usize;
    while let Some(id) = stack.pop() {
        for child in ast.kind(id).children() {
            ast.node_mut(child).parent = Some(id);
            stack.push(child);
            linked += 1;
        }
    }
    debug!(linked, "linked");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::context::Context;
    use crate::compiler::lexis::lexer::Lexer;
    use crate::compiler::syntax::ast::node::NodeKind;
    use crate::compiler::syntax::parser::Parser;

    fn parse(code: &str) -> Ast {
        let tokens = Lexer::new(code).tokenize().unwrap();
        Parser::new(&mut Context::new(), tokens)
            .parse_program()
            .unwrap()
    }

    #[test]
    fn every_reachable_node_but_the_root_has_a_parent() {
        let mut ast = parse("func f = (number a) => { if a > 1 { return a } else { return 0 } }\nf(2)");
        link(&mut ast);
        let root = ast.root();
        assert_eq!(ast.node(root).parent, None);
        for id in ast.reachable() {
            if id == root {
                continue;
            }
            let parent = ast.node(id).parent.unwrap();
            assert!(ast.kind(parent).children().contains(&id));
        }
    }

    #[test]
    fn alternative_branch_hangs_off_its_if() {
        let mut ast = parse("if true { x = 1 } else { y = 2 }");
        link(&mut ast);
        let statement = ast.program().scope.body[0];
        let NodeKind::IfStatement(detail) = ast.kind(statement) else {
            panic!("expected an if statement");
        };
        let next = detail.next.unwrap();
        assert_eq!(ast.node(next).parent, Some(statement));
        assert_eq!(ast.node(statement).parent, Some(ast.root()));
    }
}
