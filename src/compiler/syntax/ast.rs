use std::fmt::{self, Display};

use crate::compiler::position::Position;
use crate::sys_error;
use crate::util::pretty_format::{indent, Pretty, PrettyFormat};

use self::node::{Node, NodeId, NodeKind, ProgramDetail};

pub mod node;
pub mod operator;
pub mod ty;

/// Arena owning every node of one program. Children and parents refer to
/// each other by `NodeId`, so the tree has no owning cycles.
#[derive(Debug, Clone, PartialEq)]
pub struct Ast {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Ast {
    #[must_use]
    pub fn new() -> Ast {
        let program = Node::new(
            NodeKind::Program(ProgramDetail::default()),
            Position::default(),
        );
        Ast {
            nodes: vec![program],
            root: NodeId(0),
        }
    }

    pub fn push(&mut self, kind: NodeKind, position: Position) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(kind, position));
        id
    }

    /// # Panics
    /// When `id` was not issued by this arena.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        match self.nodes.get(id.0) {
            Some(node) => node,
            None => sys_error!("node {id} does not belong to this tree"),
        }
    }

    /// # Panics
    /// When `id` was not issued by this arena.
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        match self.nodes.get_mut(id.0) {
            Some(node) => node,
            None => sys_error!("node {id} does not belong to this tree"),
        }
    }

    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// # Panics
    /// When the root has been replaced by something other than a program.
    #[must_use]
    pub fn program(&self) -> &ProgramDetail {
        match &self.node(self.root).kind {
            NodeKind::Program(detail) => detail,
            kind => sys_error!("root must be a program, found {}", kind.name()),
        }
    }

    /// # Panics
    /// When the root has been replaced by something other than a program.
    pub fn program_mut(&mut self) -> &mut ProgramDetail {
        let root = self.root;
        match &mut self.node_mut(root).kind {
            NodeKind::Program(detail) => detail,
            kind => sys_error!("root must be a program, found {}", kind.name()),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids of every node reachable from the root, parents before children.
    #[must_use]
    pub fn reachable(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            let children = self.kind(id).children();
            stack.extend(children.into_iter().rev());
        }
        order
    }

    fn format_node(
        &self,
        f: &mut fmt::Formatter,
        id: NodeId,
        indentation_num: usize,
    ) -> fmt::Result {
        let node = self.node(id);
        let indentation = indent(indentation_num);
        let headline = node.kind.headline();
        let position = node.position;
        writeln!(f, "{indentation}{headline}: {} ({position})", node.ty)?;
        node.kind
            .children()
            .into_iter()
            .try_for_each(|child| self.format_node(f, child, indentation_num + 1))
    }
}

impl Default for Ast {
    fn default() -> Self {
        Self::new()
    }
}

impl PrettyFormat for Ast {
    fn pretty_format(&self, f: &mut fmt::Formatter, indentation_num: usize) -> fmt::Result {
        self.format_node(f, self.root, indentation_num)
    }
}

impl Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Pretty(self))
    }
}
