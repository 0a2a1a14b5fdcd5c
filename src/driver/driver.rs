use std::io::Write;

use termion::color;

use super::config::Config;
use super::output::{tokens_to_string, write_artifact};
use crate::compiler::CompilerContext;
use crate::error::{CompileError, CompileResult};
use crate::ir::tac_to_string;
use crate::parser::{ast_to_dot, ast_to_json, ast_to_string};
use crate::symbol_table::symbol_table_to_string;

pub struct Driver {
    config: Config,
}

impl Driver {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Compiles the configured file and writes the requested artifacts.
    /// Every failure is reported on stderr before it is returned.
    pub fn run(&self) -> CompileResult<()> {
        let file = self.config.file.as_str();

        self.log(&format!("Compiling: {}", file));

        let mut ctx = CompilerContext::new(self.config.recovery_mode())?;

        if let Err(err) = ctx.compile_file(file) {
            self.display_errors(&ctx, &err);
            return Err(err);
        }

        self.log(&format!(
            "✓ Lexical analysis complete ({} tokens)",
            ctx.tokens().len()
        ));
        self.log("✓ Parsing complete");
        self.log(&format!(
            "✓ Code generation complete ({} instructions)",
            ctx.tac().len()
        ));

        if self.config.debug {
            eprintln!("{}", ctx.arena().stats());
        }

        self.print_to_stdout(&ctx);

        let result = self.write_artifacts(&ctx);

        if result.is_ok() {
            self.log("\n✓ Compilation successful!");
        }

        result
    }

    fn print_to_stdout(&self, ctx: &CompilerContext) {
        let mut stdout = std::io::stdout();

        if let (true, Some(root)) = (self.config.print_ast, ctx.root()) {
            let _ = writeln!(stdout, "\n=== Abstract Syntax Tree ===");
            let _ = writeln!(stdout, "{}", ast_to_string(ctx.ast(), ctx.arena(), root));
        }

        if self.config.print_tac {
            let _ = writeln!(stdout, "\n=== Three-Address Code ===");
            let _ = writeln!(stdout, "{}", tac_to_string(ctx.tac(), ctx.arena()));
        }
    }

    // keeps writing after a failed artifact, the first failure is returned
    fn write_artifacts(&self, ctx: &CompilerContext) -> CompileResult<()> {
        let mut result = Ok(());
        let root = ctx.root();

        if self.config.emit_tokens() {
            let contents = tokens_to_string(ctx.tokens(), ctx.arena());

            result = result.and(self.write("tokens", ".tokens", &contents));
        }

        if let (true, Some(root)) = (self.config.emit_ast(), root) {
            let json = ast_to_json(ctx.ast(), ctx.arena(), root);
            let contents = serde_json::to_string_pretty(&json).unwrap_or_default();

            result = result.and(self.write("AST", ".ast.json", &contents));
        }

        if self.config.emit_symtab() {
            let contents = symbol_table_to_string(ctx.symbols(), ctx.arena());

            result = result.and(self.write("symbol table", ".symtab", &contents));
        }

        if self.config.emit_tac() {
            let contents = tac_to_string(ctx.tac(), ctx.arena());

            result = result.and(self.write("TAC", ".tac", &contents));
        }

        if let (true, Some(root)) = (self.config.emit_dot(), root) {
            let contents = ast_to_dot(ctx.ast(), ctx.arena(), root);

            result = result.and(self.write("AST graph", ".ast.dot", &contents));
        }

        result
    }

    fn write(&self, what: &str, ext: &str, contents: &str) -> CompileResult<()> {
        let path = self.config.output_path(ext);

        self.log(&format!("Writing {} to: {}", what, path.display()));

        write_artifact(&path, contents).map_err(|err| {
            self.display_error(&err);
            err
        })
    }

    fn log(&self, message: &str) {
        if self.config.is_verbose() {
            eprintln!("{}", message);
        }
    }

    fn display_errors(&self, ctx: &CompilerContext, err: &CompileError) {
        self.display_error(err);

        let count = ctx.error_count();

        if count == 0 {
            return;
        }

        eprintln!(
            "\nCompilation failed with {} error{}:\n",
            count,
            if count == 1 { "" } else { "s" }
        );

        for (i, err) in ctx.errors().iter().enumerate() {
            eprint!("[{}] ", i + 1);
            self.display_error(err);
        }

        if count > ctx.errors().len() {
            eprintln!("... {} more not shown", count - ctx.errors().len());
        }

        eprintln!();
    }

    fn display_error(&self, err: &CompileError) {
        let stderr = std::io::stderr();

        if termion::is_tty(&stderr) {
            eprintln!(
                "{}{}{}{}: {}",
                color::Fg(color::Red),
                err.kind.heading(),
                err.location(),
                color::Fg(color::Reset),
                err.message
            );
        } else {
            eprintln!("{}", err);
        }
    }
}
