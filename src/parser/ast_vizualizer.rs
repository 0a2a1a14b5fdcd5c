use graphviz_rust::{
    dot_generator::*,
    dot_structures::*,
    printer::{DotPrinter, PrinterContext},
};

use super::ast::Ast;
use crate::arena::Arena;

/// Renders the tree rooted at `root` as a Graphviz digraph, one box per
/// node labelled with its kind and text.
pub fn ast_to_dot(ast: &Ast, arena: &Arena, root: usize) -> String {
    let mut g = graph!(strict di id!("ast"));
    let mut stack = vec![root];

    g.add_stmt(stmt!(attr!("ordering", "out")));

    while let Some(id) = stack.pop() {
        let Some(node) = ast.get(id) else {
            continue;
        };

        let label = match node.value {
            Some(value) => format!("{}\\n{}", node.kind.name(), escape(arena.get_str(value))),
            None => node.kind.name().to_string(),
        };

        let name = node_name(id);
        let quoted = quote(&label);

        g.add_stmt(stmt!(node!(name; attr!("shape", "box"), attr!("label", quoted))));

        for child in node.children() {
            let child_name = node_name(*child);

            g.add_stmt(stmt!(edge!(node_id!(name) => node_id!(child_name))));
        }

        stack.extend(node.children().iter().rev());
    }

    g.print(&mut PrinterContext::default())
}

// NodeId would clash with the dot_structures type used by the macros
fn node_name(id: usize) -> String {
    format!("n{}", id)
}

fn quote(label: &str) -> String {
    format!("\"{}\"", label)
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
