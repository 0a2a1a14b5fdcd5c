use std::fmt::Write;
use std::path::Path;

use crate::arena::Arena;
use crate::error::{CompileError, CompileResult};
use crate::parser::TokenStream;

/// Token listing, one `KIND VALUE (line:col)` row per token.
pub fn tokens_to_string(tokens: &TokenStream, arena: &Arena) -> String {
    let mut result = String::from("# Token Stream\n# Format: TYPE VALUE (line:column)\n\n");

    for tok in tokens.tokens() {
        let value = tok.value.map(|v| arena.get_str(v)).unwrap_or("");

        let _ = writeln!(
            result,
            "{:<15} {:<20} ({}:{})",
            tok.kind.name(),
            value,
            tok.line,
            tok.col
        );
    }

    result
}

pub fn write_artifact(path: &Path, contents: &str) -> CompileResult<()> {
    let display = path.display().to_string();

    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|err| CompileError::file_io(&display, err))?;
    }

    std::fs::write(path, contents).map_err(|err| CompileError::file_io(&display, err))
}
