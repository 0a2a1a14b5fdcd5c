mod ast;
mod ast_printer;
mod ast_vizualizer;
mod expr;
mod lexer;
mod stmt;
mod token;
mod token_stream;

pub use ast::{Ast, Node, NodeId, NodeKind};
pub use ast_printer::{ast_to_json, ast_to_string};
pub use ast_vizualizer::ast_to_dot;
pub use lexer::Lexer;
pub use token::{Token, TokenKind};
pub use token_stream::TokenStream;

use crate::arena::{Arena, ArenaStr};
use crate::error::{CompileError, CompileResult, Pos};
use crate::symbol_table::{SymbolId, SymbolKind, SymbolTable};

pub const MAIN_BLOCK_NAME: &str = "main";
pub const MAX_ERRORS: usize = 100;
// statements, expressions and procedure bodies each count one level
pub const MAX_NESTING: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecoveryMode {
    /// Stop at the first error.
    #[default]
    FailFast,
    /// Record the error, skip to the next statement boundary and keep going.
    Synchronize,
}

// Program ->
//  || Block .
//
// Block ->
//  || [ const Ident = Number { , Ident = Number } ; ]
//     [ var Ident { , Ident } ; ]
//     { procedure Ident ; Block ; }
//     Statement
//
// Every procedure block is parsed inside a new scope named after the
// procedure, the program block lives in the global scope.
pub struct Parser<'c> {
    tokens: &'c mut TokenStream,
    arena: &'c mut Arena,
    ast: &'c mut Ast,
    symbols: &'c mut SymbolTable,
    mode: RecoveryMode,
    errors: Vec<CompileError>,
    depth: usize,
}

impl<'c> Parser<'c> {
    pub fn new(
        tokens: &'c mut TokenStream,
        arena: &'c mut Arena,
        ast: &'c mut Ast,
        symbols: &'c mut SymbolTable,
        mode: RecoveryMode,
    ) -> Self {
        Self {
            tokens,
            arena,
            ast,
            symbols,
            mode,
            errors: vec![],
            depth: 0,
        }
    }

    /// Parses a whole program, returning the PROGRAM node or every error
    /// that was recorded on the way.
    pub fn build_ast(&mut self) -> Result<NodeId, Vec<CompileError>> {
        match self.program() {
            Ok(root) if self.errors.is_empty() => Ok(root),
            Ok(_) => Err(std::mem::take(&mut self.errors)),
            Err(err) => {
                self.record(err);
                Err(std::mem::take(&mut self.errors))
            }
        }
    }

    fn program(&mut self) -> CompileResult<NodeId> {
        let pos = self.tokens.peek().pos();
        let program = self.ast.create_node_at(NodeKind::Program, None, pos)?;
        let name = self.arena.strdup(MAIN_BLOCK_NAME)?;
        let block = self.block(name)?;

        self.ast.add_child(program, block)?;
        self.expect(TokenKind::Period)?;

        if !self.tokens.is_eof() {
            let tok = *self.tokens.peek();

            return Err(CompileError::syntax(
                format!("unexpected {} after the end of the program", self.found(&tok)),
                tok.pos(),
            ));
        }

        Ok(program)
    }

    fn block(&mut self, name: ArenaStr) -> CompileResult<NodeId> {
        let pos = self.tokens.peek().pos();
        let block = self.ast.create_node_at(NodeKind::Block, Some(name), pos)?;

        if self.tokens.match_token(TokenKind::Const) {
            self.const_decls(block)?;
        }

        if self.tokens.match_token(TokenKind::Var) {
            self.var_decls(block)?;
        }

        while self.tokens.match_token(TokenKind::Procedure) {
            let proc_decl = self.proc_decl()?;

            self.ast.add_child(block, proc_decl)?;
        }

        if let Some(stmt) = self.recoverable_statement()? {
            self.ast.add_child(block, stmt)?;
        }

        Ok(block)
    }

    fn const_decls(&mut self, block: NodeId) -> CompileResult<()> {
        loop {
            let ident = self.expect(TokenKind::Ident)?;
            self.expect(TokenKind::Eq)?;
            let number = self.expect(TokenKind::Number)?;
            let value = self.number_value(&number)?;

            let symbol = self.declare(&ident, SymbolKind::Const, Some(value))?;
            let decl = self.ast.create_node_at(NodeKind::ConstDecl, ident.value, ident.pos())?;
            let literal = self.ast.create_node_at(NodeKind::Number, number.value, number.pos())?;

            self.ast.set_symbol(decl, symbol)?;
            self.ast.add_child(decl, literal)?;
            self.ast.add_child(block, decl)?;

            if !self.tokens.match_token(TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::SemiColon)?;

        Ok(())
    }

    fn var_decls(&mut self, block: NodeId) -> CompileResult<()> {
        loop {
            let ident = self.expect(TokenKind::Ident)?;
            let symbol = self.declare(&ident, SymbolKind::Var, None)?;
            let decl = self.ast.create_node_at(NodeKind::VarDecl, ident.value, ident.pos())?;

            self.ast.set_symbol(decl, symbol)?;
            self.ast.add_child(block, decl)?;

            if !self.tokens.match_token(TokenKind::Comma) {
                break;
            }
        }

        self.expect(TokenKind::SemiColon)?;

        Ok(())
    }

    fn proc_decl(&mut self) -> CompileResult<NodeId> {
        let ident = self.expect(TokenKind::Ident)?;
        let symbol = self.declare(&ident, SymbolKind::Procedure, None)?;
        let decl = self.ast.create_node_at(NodeKind::ProcDecl, ident.value, ident.pos())?;

        self.ast.set_symbol(decl, symbol)?;
        self.expect(TokenKind::SemiColon)?;

        let name = self.lexeme_handle(&ident)?;

        self.symbols.enter_scope(name)?;
        let body = self.nested(|parser| parser.block(name));
        self.symbols.exit_scope();

        self.ast.add_child(decl, body?)?;
        self.expect(TokenKind::SemiColon)?;

        Ok(decl)
    }

    /// Runs `statement`, recording its error and skipping ahead when
    /// recovering. `None` means the statement was dropped.
    fn recoverable_statement(&mut self) -> CompileResult<Option<NodeId>> {
        match self.statement() {
            Ok(stmt) => Ok(Some(stmt)),
            Err(err) => {
                if self.mode == RecoveryMode::FailFast || self.errors.len() + 1 >= MAX_ERRORS {
                    return Err(err);
                }

                self.record(err);
                self.synchronize();

                Ok(None)
            }
        }
    }

    fn synchronize(&mut self) {
        loop {
            match self.tokens.peek().kind {
                TokenKind::SemiColon | TokenKind::End | TokenKind::Period | TokenKind::Eof => break,
                _ => {
                    self.tokens.next();
                }
            }
        }
    }

    /// Runs `parse` one nesting level deeper, failing with a syntax error
    /// instead of recursing past [`MAX_NESTING`].
    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> CompileResult<T>,
    ) -> CompileResult<T> {
        if self.depth >= MAX_NESTING {
            let tok = *self.tokens.peek();

            return Err(CompileError::syntax(
                format!("nesting deeper than {} levels", MAX_NESTING),
                self.pos_of(&tok),
            ));
        }

        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;

        result
    }

    fn record(&mut self, err: CompileError) {
        if self.errors.len() < MAX_ERRORS {
            self.errors.push(err);
        }
    }

    fn declare(
        &mut self,
        ident: &Token,
        kind: SymbolKind,
        value: Option<i64>,
    ) -> CompileResult<SymbolId> {
        let name = self.lexeme_handle(ident)?;
        let level = self.symbols.current_level();
        let text = self.arena.get_str(name);

        if is_generated_name(text) {
            return Err(CompileError::semantic(
                format!("'{}' is reserved for generated temporaries and labels", text),
                Some(ident.pos()),
            ));
        }

        self.symbols
            .add(self.arena, name, kind, level, value)
            .map_err(|err| err.at(ident.pos()))
    }

    fn lookup(&self, name: &str) -> Option<(SymbolId, SymbolKind)> {
        self.symbols
            .lookup(self.arena, name)
            .map(|symbol| (symbol.id, symbol.kind))
    }

    fn expect(&mut self, kind: TokenKind) -> CompileResult<Token> {
        let tok = *self.tokens.peek();

        if tok.kind == kind {
            self.tokens.next();
            Ok(tok)
        } else {
            Err(self.unexpected(&tok, kind.describe()))
        }
    }

    fn unexpected(&self, tok: &Token, expected: &str) -> CompileError {
        CompileError::syntax(
            format!("expected {} but found {}", expected, self.found(tok)),
            self.pos_of(tok),
        )
    }

    fn found(&self, tok: &Token) -> String {
        match tok.value {
            Some(value) if tok.kind != TokenKind::Eof => format!("'{}'", self.arena.get_str(value)),
            _ => tok.kind.describe().to_string(),
        }
    }

    // the EOF sentinel has no position of its own
    fn pos_of(&self, tok: &Token) -> Pos {
        if tok.kind == TokenKind::Eof {
            self.tokens
                .tokens()
                .last()
                .map(|last| last.pos())
                .unwrap_or(Pos::new(1, 1))
        } else {
            tok.pos()
        }
    }

    fn lexeme(&self, tok: &Token) -> &str {
        tok.value.map(|v| self.arena.get_str(v)).unwrap_or("")
    }

    fn lexeme_handle(&self, tok: &Token) -> CompileResult<ArenaStr> {
        tok.value.ok_or_else(|| {
            CompileError::syntax(
                format!("{} token without text", tok.kind.describe()),
                self.pos_of(tok),
            )
        })
    }

    fn number_value(&self, tok: &Token) -> CompileResult<i64> {
        let text = self.lexeme(tok);

        text.parse::<i64>().map_err(|_| {
            CompileError::syntax(format!("number '{}' is too large", text), tok.pos())
        })
    }
}

// `t<N>` and `L<N>` are the generator's temporaries and jump labels
fn is_generated_name(name: &str) -> bool {
    let digits = match name.strip_prefix('t').or_else(|| name.strip_prefix('L')) {
        Some(digits) => digits,
        None => return false,
    };

    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Lexes and parses `input` in one go with fresh state, used by tests.
#[cfg(test)]
pub(crate) struct ParsedProgram {
    pub arena: Arena,
    pub tokens: TokenStream,
    pub ast: Ast,
    pub symbols: SymbolTable,
    pub result: Result<NodeId, Vec<CompileError>>,
}

#[cfg(test)]
pub(crate) fn parse_str(input: &str, mode: RecoveryMode) -> ParsedProgram {
    let mut arena = Arena::new(0);
    let mut tokens = TokenStream::new();
    let mut ast = Ast::new();

    Lexer::new(input)
        .tokenize(&mut arena, &mut tokens)
        .expect("test input lexes");

    let mut symbols = SymbolTable::new(&mut arena).expect("symbol table");
    let result = Parser::new(&mut tokens, &mut arena, &mut ast, &mut symbols, mode).build_ast();

    ParsedProgram {
        arena,
        tokens,
        ast,
        symbols,
        result,
    }
}

#[cfg(test)]
impl ParsedProgram {
    pub fn text(&self, node: NodeId) -> &str {
        self.ast
            .get(node)
            .and_then(|n| n.value)
            .map(|v| self.arena.get_str(v))
            .unwrap_or("")
    }

    pub fn kind(&self, node: NodeId) -> NodeKind {
        self.ast.get(node).map(|n| n.kind).unwrap()
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.ast.get(node).map(|n| n.children().to_vec()).unwrap()
    }

    pub fn main_block(&self) -> NodeId {
        let root = *self.result.as_ref().unwrap();

        self.children(root)[0]
    }
}
