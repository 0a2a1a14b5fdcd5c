use crate::arena::{Arena, ArenaStr};
use crate::error::{CompileError, CompileResult};
use crate::ir::{TacGenerator, TacList};
use crate::parser::{Ast, Lexer, NodeId, Parser, RecoveryMode, TokenStream, MAX_ERRORS};
use crate::symbol_table::SymbolTable;

/// Everything one compilation produces. The arena owns all text, the pools
/// reference it through handles, and dropping the context frees it all.
pub struct CompilerContext {
    arena: Arena,
    tokens: TokenStream,
    ast: Ast,
    root: Option<NodeId>,
    symbols: SymbolTable,
    tac: TacList,
    errors: Vec<CompileError>,
    error_count: usize,
    mode: RecoveryMode,
    used: bool,
}

impl CompilerContext {
    pub fn new(mode: RecoveryMode) -> CompileResult<Self> {
        Self::with_arena(Arena::default(), mode)
    }

    pub fn with_arena(mut arena: Arena, mode: RecoveryMode) -> CompileResult<Self> {
        let symbols = SymbolTable::new(&mut arena)?;

        Ok(Self {
            arena,
            tokens: TokenStream::new(),
            ast: Ast::new(),
            root: None,
            symbols,
            tac: TacList::new(),
            errors: vec![],
            error_count: 0,
            mode,
            used: false,
        })
    }

    /// Reads, lexes, parses and lowers `path`. On failure the first error
    /// is returned and every recorded error stays available via `errors`.
    pub fn compile_file(&mut self, path: &str) -> CompileResult<()> {
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => return self.fail(CompileError::file_io(path, err)),
        };

        self.compile_source(&source)
    }

    pub fn compile_source(&mut self, source: &str) -> CompileResult<()> {
        self.claim()?;

        if let Err(err) = Lexer::new(source).tokenize(&mut self.arena, &mut self.tokens) {
            return self.fail(err);
        }

        self.run_pipeline()
    }

    /// Compiles whatever an external producer already pushed into the
    /// token stream.
    pub fn compile_tokens(&mut self) -> CompileResult<()> {
        self.claim()?;
        self.run_pipeline()
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn tokens(&self) -> &TokenStream {
        &self.tokens
    }

    /// Token stream and arena together, for producers feeding
    /// `compile_tokens`.
    pub fn token_input(&mut self) -> (&mut TokenStream, &mut Arena) {
        (&mut self.tokens, &mut self.arena)
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn tac(&self) -> &TacList {
        &self.tac
    }

    pub fn errors(&self) -> &[CompileError] {
        &self.errors
    }

    /// Number of errors reported, which may exceed the recorded ones.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn text(&self, str: ArenaStr) -> &str {
        self.arena.get_str(str)
    }

    fn run_pipeline(&mut self) -> CompileResult<()> {
        let result = Parser::new(
            &mut self.tokens,
            &mut self.arena,
            &mut self.ast,
            &mut self.symbols,
            self.mode,
        )
        .build_ast();

        let root = match result {
            Ok(root) => root,
            Err(errors) => {
                let first = errors.first().cloned();

                for err in errors {
                    self.record(err);
                }

                return Err(first.unwrap_or_else(|| {
                    CompileError::invalid_operation("parsing failed without an error")
                }));
            }
        };

        self.root = Some(root);

        let result = TacGenerator::new(&self.ast, &self.symbols, &mut self.arena, &mut self.tac)
            .generate(root);

        match result {
            Ok(()) => Ok(()),
            Err(err) => self.fail(err),
        }
    }

    // one context compiles one program
    fn claim(&mut self) -> CompileResult<()> {
        if self.used {
            return Err(CompileError::invalid_operation(
                "compiler context was already used for a compilation",
            ));
        }

        self.used = true;

        Ok(())
    }

    fn fail(&mut self, err: CompileError) -> CompileResult<()> {
        self.record(err.clone());

        Err(err)
    }

    fn record(&mut self, err: CompileError) {
        self.error_count += 1;

        if self.errors.len() < MAX_ERRORS {
            self.errors.push(err);
        }
    }
}
