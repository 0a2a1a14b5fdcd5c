use crate::parser::RecoveryMode;
use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Compile a PL/0 source file to three-address code", long_about = None)]
pub struct Config {
    /// PL/0 source file
    pub file: String,

    /// Output directory for emitted files
    #[clap(short = 'o', long = "output", default_value = ".")]
    pub output_dir: String,

    /// Emit the token listing (.tokens)
    #[clap(short, long)]
    pub tokens: bool,

    /// Emit the abstract syntax tree as JSON (.ast.json)
    #[clap(short, long)]
    pub ast: bool,

    /// Emit the symbol table (.symtab)
    #[clap(short, long)]
    pub symtab: bool,

    /// Emit three-address code (.tac)
    #[clap(short = 'c', long)]
    pub tac: bool,

    /// Emit the abstract syntax tree as a Graphviz digraph (.ast.dot)
    #[clap(short = 'g', long)]
    pub dot: bool,

    /// Emit every intermediate output
    #[clap(short = 'A', long)]
    pub all: bool,

    #[clap(short, long)]
    pub verbose: bool,

    /// Verbose output plus arena statistics
    #[clap(short, long)]
    pub debug: bool,

    /// Print the abstract syntax tree to stdout
    #[clap(long)]
    pub print_ast: bool,

    /// Print three-address code to stdout
    #[clap(long)]
    pub print_tac: bool,

    /// Keep parsing after an error and report every error found
    #[clap(short, long)]
    pub recover: bool,
}

impl Config {
    pub fn emit_tokens(&self) -> bool {
        self.tokens || self.all
    }

    pub fn emit_ast(&self) -> bool {
        self.ast || self.all
    }

    pub fn emit_symtab(&self) -> bool {
        self.symtab || self.all
    }

    pub fn emit_dot(&self) -> bool {
        self.dot || self.all
    }

    /// TAC is emitted when nothing else was asked for.
    pub fn emit_tac(&self) -> bool {
        self.tac || self.all || !self.any_output_selected()
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose || self.debug
    }

    pub fn recovery_mode(&self) -> RecoveryMode {
        if self.recover {
            RecoveryMode::Synchronize
        } else {
            RecoveryMode::FailFast
        }
    }

    /// `<output_dir>/<file stem><ext>`
    pub fn output_path(&self, ext: &str) -> PathBuf {
        let stem = Path::new(&self.file)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "out".to_string());

        Path::new(&self.output_dir).join(format!("{}{}", stem, ext))
    }

    fn any_output_selected(&self) -> bool {
        self.tokens
            || self.ast
            || self.symtab
            || self.tac
            || self.dot
            || self.all
            || self.print_ast
            || self.print_tac
    }
}

impl TryFrom<Vec<&str>> for Config {
    type Error = String;
    fn try_from(args: Vec<&str>) -> Result<Self, Self::Error> {
        match Config::try_parse_from(args) {
            Ok(config) => Ok(config),
            Err(e) => Err(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(args: &[&str]) -> Config {
        let mut argv = vec!["plzero"];

        argv.extend_from_slice(args);

        Config::try_from(argv).unwrap()
    }

    #[test]
    fn tac_is_the_default_output() {
        let c = config(&["prog.pl0"]);

        assert!(c.emit_tac());
        assert!(!c.emit_tokens());
        assert_eq!(c.recovery_mode(), RecoveryMode::FailFast);
    }

    #[test]
    fn printing_replaces_the_default() {
        let c = config(&["--print-ast", "prog.pl0"]);

        assert!(!c.emit_tac());
    }

    #[test]
    fn all_selects_every_artifact() {
        let c = config(&["-A", "prog.pl0"]);

        assert!(c.emit_tokens() && c.emit_ast() && c.emit_symtab() && c.emit_tac() && c.emit_dot());
    }

    #[test]
    fn flags() {
        let c = config(&["-t", "-s", "-d", "-r", "prog.pl0"]);

        assert!(c.emit_tokens());
        assert!(c.emit_symtab());
        assert!(!c.emit_tac());
        assert!(c.is_verbose());
        assert_eq!(c.recovery_mode(), RecoveryMode::Synchronize);
    }

    #[test]
    fn output_paths_use_the_file_stem() {
        let c = config(&["-o", "build", "src/prog.pl0"]);

        assert_eq!(c.output_path(".tac"), Path::new("build").join("prog.tac"));
        assert_eq!(c.output_path(".ast.json"), Path::new("build").join("prog.ast.json"));
    }

    #[test]
    fn file_is_required() {
        assert!(Config::try_from(vec!["plzero", "-A"]).is_err());
    }
}
