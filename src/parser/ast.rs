use crate::arena::{Arena, ArenaStr};
use crate::error::{CompileError, CompileResult, Pos};
use crate::symbol_table::SymbolId;
use serde::Serialize;

pub const CHILDREN_INITIAL_CAPACITY: usize = 4;

pub type NodeId = usize;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Program,
    Block,
    ConstDecl,
    VarDecl,
    ProcDecl,
    Assignment,
    Call,
    If,
    While,
    Condition,
    BinaryOp,
    UnaryOp,
    Identifier,
    Number,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Program => "PROGRAM",
            NodeKind::Block => "BLOCK",
            NodeKind::ConstDecl => "CONST_DECL",
            NodeKind::VarDecl => "VAR_DECL",
            NodeKind::ProcDecl => "PROC_DECL",
            NodeKind::Assignment => "ASSIGNMENT",
            NodeKind::Call => "CALL",
            NodeKind::If => "IF",
            NodeKind::While => "WHILE",
            NodeKind::Condition => "CONDITION",
            NodeKind::BinaryOp => "BINARY_OP",
            NodeKind::UnaryOp => "UNARY_OP",
            NodeKind::Identifier => "IDENTIFIER",
            NodeKind::Number => "NUMBER",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub value: Option<ArenaStr>,
    pub symbol: Option<SymbolId>,
    pub pos: Pos,
    children: Vec<NodeId>,
}

impl Node {
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn child(&self, i: usize) -> Option<NodeId> {
        self.children.get(i).copied()
    }
}

/// Every node of one compilation. Nodes are only ever appended, and edges
/// only point from parents to children.
#[derive(Debug, Default)]
pub struct Ast {
    nodes: Vec<Node>,
}

impl Ast {
    pub fn new() -> Self {
        Self { nodes: vec![] }
    }

    pub fn create_node(
        &mut self,
        arena: &mut Arena,
        kind: NodeKind,
        value: Option<&str>,
    ) -> CompileResult<NodeId> {
        let value = match value {
            Some(text) => Some(arena.strdup(text)?),
            None => None,
        };

        self.push_node(kind, value, Pos::default())
    }

    /// Like `create_node`, for text that already lives in the same arena
    /// (token lexemes), so it is shared instead of copied again.
    pub fn create_node_at(
        &mut self,
        kind: NodeKind,
        value: Option<ArenaStr>,
        pos: Pos,
    ) -> CompileResult<NodeId> {
        self.push_node(kind, value, pos)
    }

    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> CompileResult<()> {
        if child >= self.nodes.len() {
            return Err(CompileError::invalid_operation(format!(
                "child node {} does not exist",
                child
            )));
        }

        if child == parent {
            return Err(CompileError::invalid_operation("a node can not be its own child"));
        }

        let node = self.nodes.get_mut(parent).ok_or_else(|| {
            CompileError::invalid_operation(format!("parent node {} does not exist", parent))
        })?;

        let children = &mut node.children;

        if children.len() == children.capacity() {
            let additional = children.capacity().max(CHILDREN_INITIAL_CAPACITY);

            children
                .try_reserve_exact(additional)
                .map_err(|_| CompileError::memory("failed to grow a child list"))?;
        }

        children.push(child);

        Ok(())
    }

    pub fn set_symbol(&mut self, node: NodeId, symbol: SymbolId) -> CompileResult<()> {
        let node = self.nodes.get_mut(node).ok_or_else(|| {
            CompileError::invalid_operation(format!("node {} does not exist", node))
        })?;

        node.symbol = Some(symbol);

        Ok(())
    }

    pub fn get(&self, node: NodeId) -> Option<&Node> {
        self.nodes.get(node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Children of `node` with the given kind, in order.
    pub fn children_of_kind(&self, node: NodeId, kind: NodeKind) -> Vec<NodeId> {
        self.get(node)
            .map(|n| {
                n.children
                    .iter()
                    .copied()
                    .filter(|child| self.nodes[*child].kind == kind)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn push_node(
        &mut self,
        kind: NodeKind,
        value: Option<ArenaStr>,
        pos: Pos,
    ) -> CompileResult<NodeId> {
        self.nodes
            .try_reserve(1)
            .map_err(|_| CompileError::memory("failed to allocate an AST node"))?;

        let id = self.nodes.len();

        self.nodes.push(Node {
            kind,
            value,
            symbol: None,
            pos,
            children: vec![],
        });

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn new_nodes_are_unresolved_and_childless() {
        let mut arena = Arena::new(0);
        let mut ast = Ast::new();
        let node = ast.create_node(&mut arena, NodeKind::Identifier, Some("x")).unwrap();
        let node = ast.get(node).unwrap();

        assert_eq!(node.kind, NodeKind::Identifier);
        assert_eq!(arena.get_str(node.value.unwrap()), "x");
        assert_eq!(node.symbol, None);
        assert!(node.children().is_empty());
    }

    #[test]
    fn children_keep_insertion_order() {
        let mut arena = Arena::new(0);
        let mut ast = Ast::new();
        let parent = ast.create_node(&mut arena, NodeKind::Block, None).unwrap();
        let mut expected = vec![];

        for i in 0..9 {
            let child = ast
                .create_node(&mut arena, NodeKind::Number, Some(&i.to_string()))
                .unwrap();

            ast.add_child(parent, child).unwrap();
            expected.push(child);
        }

        assert_eq!(ast.get(parent).unwrap().children(), expected.as_slice());
    }

    #[test]
    fn add_child_rejects_missing_nodes() {
        let mut arena = Arena::new(0);
        let mut ast = Ast::new();
        let node = ast.create_node(&mut arena, NodeKind::Block, None).unwrap();

        let missing_child = ast.add_child(node, 42).unwrap_err();
        let missing_parent = ast.add_child(42, node).unwrap_err();
        let self_child = ast.add_child(node, node).unwrap_err();

        assert_eq!(missing_child.kind, ErrorKind::InvalidOperation);
        assert_eq!(missing_parent.kind, ErrorKind::InvalidOperation);
        assert_eq!(self_child.kind, ErrorKind::InvalidOperation);
    }

    #[test]
    fn children_of_kind() {
        let mut arena = Arena::new(0);
        let mut ast = Ast::new();
        let block = ast.create_node(&mut arena, NodeKind::Block, None).unwrap();
        let var_a = ast.create_node(&mut arena, NodeKind::VarDecl, Some("a")).unwrap();
        let konst = ast.create_node(&mut arena, NodeKind::ConstDecl, Some("k")).unwrap();
        let var_b = ast.create_node(&mut arena, NodeKind::VarDecl, Some("b")).unwrap();

        for child in [var_a, konst, var_b] {
            ast.add_child(block, child).unwrap();
        }

        assert_eq!(ast.children_of_kind(block, NodeKind::VarDecl), vec![var_a, var_b]);
    }
}
