use serde_json::{json, Value};

use super::ast::{Ast, Node, NodeId};
use crate::arena::Arena;

struct AstPrinter<'a> {
    ast: &'a Ast,
    arena: &'a Arena,
    result: String,
}

/// Indented tree, one node per line: `KIND [value] [-> #symbol] (line:col)`.
pub fn ast_to_string(ast: &Ast, arena: &Arena, root: NodeId) -> String {
    let printer = AstPrinter {
        ast,
        arena,
        result: String::new(),
    };

    printer.stringify(root)
}

impl<'a> AstPrinter<'a> {
    fn stringify(mut self, root: NodeId) -> String {
        self.push_node(root, 0);

        self.result
    }

    fn push_node(&mut self, id: NodeId, depth: usize) {
        let Some(node) = self.ast.get(id) else {
            return;
        };

        for _ in 0..depth {
            self.result.push_str("  ");
        }

        self.result.push_str(node.kind.name());

        if let Some(value) = node.value {
            self.result.push(' ');
            self.result.push_str(self.arena.get_str(value));
        }

        if let Some(symbol) = node.symbol {
            self.result.push_str(&format!(" -> #{}", symbol));
        }

        self.result
            .push_str(&format!(" ({}:{})\n", node.pos.line, node.pos.col));

        for child in node.children() {
            self.push_node(*child, depth + 1);
        }
    }
}

/// JSON rendering of the tree rooted at `root`. Unresolved symbols are
/// written as -1.
pub fn ast_to_json(ast: &Ast, arena: &Arena, root: NodeId) -> Value {
    match ast.get(root) {
        Some(node) => node_to_json(ast, arena, node),
        None => Value::Null,
    }
}

fn node_to_json(ast: &Ast, arena: &Arena, node: &Node) -> Value {
    let children: Vec<Value> = node
        .children()
        .iter()
        .filter_map(|child| ast.get(*child))
        .map(|child| node_to_json(ast, arena, child))
        .collect();

    json!({
        "kind": node.kind,
        "value": node.value.map(|v| arena.get_str(v)),
        "symbol": node.symbol.map(|s| s as i64).unwrap_or(-1),
        "line": node.pos.line,
        "col": node.pos.col,
        "children": children,
    })
}

#[cfg(test)]
mod tests {
    use super::super::{parse_str, RecoveryMode};
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn prints_an_indented_tree() {
        let p = parse_str("var x;\nx := -x + 1.", RecoveryMode::FailFast);
        let root = *p.result.as_ref().unwrap();

        let expected = "\
PROGRAM (1:1)
  BLOCK main (1:1)
    VAR_DECL x -> #0 (1:5)
    ASSIGNMENT x -> #0 (2:1)
      BINARY_OP + (2:9)
        UNARY_OP - (2:6)
          IDENTIFIER x -> #0 (2:7)
        NUMBER 1 (2:11)
";

        assert_eq!(ast_to_string(&p.ast, &p.arena, root), expected);
    }

    #[test]
    fn json_nodes() {
        let p =parse_str("const k = 3; var x; x := k.", RecoveryMode::FailFast);
        let root = *p.result.as_ref().unwrap();
        let json = ast_to_json(&p.ast, &p.arena, root);
        let konst = &json["children"][0]["children"][0];

        assert_eq!(json["kind"], "PROGRAM");
        assert_eq!(json["value"], Value::Null);
        assert_eq!(json["symbol"], -1);
        assert_eq!(konst["kind"], "CONST_DECL");
        assert_eq!(konst["value"], "k");
        assert_eq!(konst["symbol"], 0);
        assert_eq!(konst["children"][0]["value"], "3");
    }

    #[test]
    fn missing_root() {
        let arena = Arena::new(0);
        let ast = Ast::new();

        assert_eq!(ast_to_string(&ast, &arena, 0), "");
        assert_eq!(ast_to_json(&ast, &arena, 0), Value::Null);
    }
}
