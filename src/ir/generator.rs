use super::tac::{Tac, TacList};
use crate::arena::{Arena, ArenaStr};
use crate::error::{CompileError, CompileResult};
use crate::parser::{Ast, Node, NodeId, NodeKind};
use crate::symbol_table::{Symbol, SymbolKind, SymbolTable};

/// Lowers a checked AST into three-address code.
///
/// Every procedure becomes `LABEL name.id`, its body, `RETURN`, where `id` is
/// the procedure's symbol id, so shadowed procedures get distinct entries.
/// Procedures are emitted before the block that declares them, the program
/// block last under its own name (`main`).
pub struct TacGenerator<'c> {
    ast: &'c Ast,
    symbols: &'c SymbolTable,
    arena: &'c mut Arena,
    list: &'c mut TacList,
    temp_counter: usize,
    label_counter: usize,
}

impl<'c> TacGenerator<'c> {
    pub fn new(
        ast: &'c Ast,
        symbols: &'c SymbolTable,
        arena: &'c mut Arena,
        list: &'c mut TacList,
    ) -> Self {
        Self {
            ast,
            symbols,
            arena,
            list,
            temp_counter: 0,
            label_counter: 0,
        }
    }

    pub fn generate(&mut self, root: NodeId) -> CompileResult<()> {
        let program = self.node(root)?;

        if program.kind != NodeKind::Program {
            return Err(CompileError::invalid_operation(format!(
                "expected a PROGRAM node but found {}",
                program.kind.name()
            )));
        }

        for block in program.children() {
            let label = self.text(self.node(*block)?)?;

            self.generate_block(*block, label)?;
        }

        Ok(())
    }

    pub fn temp_count(&self) -> usize {
        self.temp_counter
    }

    pub fn label_count(&self) -> usize {
        self.label_counter
    }

    fn generate_block(&mut self, id: NodeId, label: ArenaStr) -> CompileResult<()> {
        let ast = self.ast;
        let block = self.node(id)?;

        for child in block.children() {
            if let NodeKind::ProcDecl = ast.nodes()[*child].kind {
                self.generate_proc(*child)?;
            }
        }

        self.emit(Tac::label(label))?;

        for child in block.children() {
            match ast.nodes()[*child].kind {
                NodeKind::ConstDecl | NodeKind::VarDecl | NodeKind::ProcDecl => {}
                _ => self.generate_stmt(*child)?,
            }
        }

        self.emit(Tac::ret())
    }

    fn generate_proc(&mut self, id: NodeId) -> CompileResult<()> {
        let decl = self.node(id)?;

        let label = self.proc_label(self.resolved(decl)?)?;

        match decl.child(0) {
            Some(body) => self.generate_block(body, label),
            None => Err(CompileError::invalid_operation(format!(
                "procedure '{}' has no body",
                self.arena.get_str(self.text(decl)?)
            ))),
        }
    }

    fn generate_stmt(&mut self, id: NodeId) -> CompileResult<()> {
        let node = self.node(id)?;

        match node.kind {
            NodeKind::Assignment => self.generate_assign(node),
            NodeKind::Call => {
                let target = self.proc_label(self.resolved(node)?)?;

                self.emit(Tac::call(target))
            }
            NodeKind::Block => {
                for stmt in node.children() {
                    self.generate_stmt(*stmt)?;
                }

                Ok(())
            }
            NodeKind::If => self.generate_if(node),
            NodeKind::While => self.generate_while(node),
            kind => Err(CompileError::invalid_operation(format!(
                "{} is not a statement",
                kind.name()
            ))),
        }
    }

    fn generate_assign(&mut self, node: &Node) -> CompileResult<()> {
        self.resolved(node)?;

        let dest = self.text(node)?;
        let src = self.generate_expr(self.child(node, 0)?)?;

        self.emit(Tac::assign(dest, src))
    }

    fn generate_if(&mut self, node: &Node) -> CompileResult<()> {
        let end = self.new_label()?;
        let cond = self.generate_cond(self.child(node, 0)?)?;

        self.emit(Tac::if_false(cond, end))?;
        self.generate_stmt(self.child(node, 1)?)?;
        self.emit(Tac::label(end))
    }

    fn generate_while(&mut self, node: &Node) -> CompileResult<()> {
        let start = self.new_label()?;
        let end = self.new_label()?;

        self.emit(Tac::label(start))?;

        let cond = self.generate_cond(self.child(node, 0)?)?;

        self.emit(Tac::if_false(cond, end))?;
        self.generate_stmt(self.child(node, 1)?)?;
        self.emit(Tac::goto(start))?;
        self.emit(Tac::label(end))
    }

    fn generate_cond(&mut self, id: NodeId) -> CompileResult<ArenaStr> {
        let node = self.node(id)?;
        let op = self.text(node)?;

        if node.kind != NodeKind::Condition {
            return Err(CompileError::invalid_operation(format!(
                "expected a CONDITION node but found {}",
                node.kind.name()
            )));
        }

        if self.arena.get_str(op) == "odd" {
            let src = self.generate_expr(self.child(node, 0)?)?;
            let dest = self.new_temp()?;

            self.emit(Tac::unary(dest, op, src))?;

            return Ok(dest);
        }

        let op = if self.arena.get_str(op) == "#" {
            self.arena.strdup("!=")?
        } else {
            op
        };

        let lhs = self.generate_expr(self.child(node, 0)?)?;
        let rhs = self.generate_expr(self.child(node, 1)?)?;
        let dest = self.new_temp()?;

        self.emit(Tac::binary(dest, op, lhs, rhs))?;

        Ok(dest)
    }

    fn generate_expr(&mut self, id: NodeId) -> CompileResult<ArenaStr> {
        let node = self.node(id)?;

        match node.kind {
            NodeKind::Number => self.text(node),
            NodeKind::Identifier => {
                let symbol = self.resolved(node)?;

                if symbol.kind != SymbolKind::Const {
                    return self.text(node);
                }

                let value = symbol.value.ok_or_else(|| {
                    CompileError::invalid_operation(format!(
                        "constant '{}' has no value",
                        self.arena.get_str(symbol.name)
                    ))
                })?;

                let literal = self.arena.sprintf(format_args!("{}", value))?;
                let dest = self.new_temp()?;

                self.emit(Tac::load(dest, literal))?;

                Ok(dest)
            }
            NodeKind::BinaryOp => {
                let lhs = self.generate_expr(self.child(node, 0)?)?;
                let rhs = self.generate_expr(self.child(node, 1)?)?;
                let dest = self.new_temp()?;

                self.emit(Tac::binary(dest, self.text(node)?, lhs, rhs))?;

                Ok(dest)
            }
            NodeKind::UnaryOp => {
                let src = self.generate_expr(self.child(node, 0)?)?;
                let dest = self.new_temp()?;

                self.emit(Tac::unary(dest, self.text(node)?, src))?;

                Ok(dest)
            }
            kind => Err(CompileError::invalid_operation(format!(
                "{} is not an expression",
                kind.name()
            ))),
        }
    }

    fn new_temp(&mut self) -> CompileResult<ArenaStr> {
        let temp = self.arena.sprintf(format_args!("t{}", self.temp_counter))?;

        self.temp_counter += 1;

        Ok(temp)
    }

    fn new_label(&mut self) -> CompileResult<ArenaStr> {
        let label = self.arena.sprintf(format_args!("L{}", self.label_counter))?;

        self.label_counter += 1;

        Ok(label)
    }

    // '.' can not appear in an identifier, so these never meet `main` or a user name
    fn proc_label(&mut self, symbol: &Symbol) -> CompileResult<ArenaStr> {
        let name = self.arena.get_str(symbol.name).to_string();

        self.arena.sprintf(format_args!("{}.{}", name, symbol.id))
    }

    fn emit(&mut self, tac: Tac) -> CompileResult<()> {
        self.list.push(tac).map(|_| ())
    }

    fn node(&self, id: NodeId) -> CompileResult<&'c Node> {
        let ast = self.ast;

        ast.get(id)
            .ok_or_else(|| CompileError::invalid_operation(format!("node {} does not exist", id)))
    }

    fn child(&self, node: &Node, i: usize) -> CompileResult<NodeId> {
        node.child(i).ok_or_else(|| {
            CompileError::invalid_operation(format!(
                "{} node is missing child {}",
                node.kind.name(),
                i
            ))
        })
    }

    fn text(&self, node: &Node) -> CompileResult<ArenaStr> {
        node.value.ok_or_else(|| {
            CompileError::invalid_operation(format!("{} node has no text", node.kind.name()))
                .at(node.pos)
        })
    }

    fn resolved(&self, node: &Node) -> CompileResult<&'c Symbol> {
        let symbols = self.symbols;
        let name = node.value.map(|v| self.arena.get_str(v)).unwrap_or("");

        node.symbol
            .and_then(|id| symbols.symbol(id))
            .ok_or_else(|| CompileError::undefined_symbol(name, Some(node.pos)))
    }
}
