use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Memory,
    FileIo,
    Syntax,
    Semantic,
    UndefinedSymbol,
    // not produced yet, the language only has integers
    TypeMismatch,
    InvalidOperation,
}

impl ErrorKind {
    pub fn heading(&self) -> &'static str {
        match self {
            ErrorKind::Memory => "Memory Error",
            ErrorKind::FileIo => "I/O Error",
            ErrorKind::Syntax => "Syntax Error",
            ErrorKind::Semantic => "Semantic Error",
            ErrorKind::UndefinedSymbol => "Undefined Symbol",
            ErrorKind::TypeMismatch => "Type Mismatch",
            ErrorKind::InvalidOperation => "Invalid Operation",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.heading())
    }
}

/// 1-based source position of a token or node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pos {
    pub line: u32,
    pub col: u32,
}

impl Pos {
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}{}: {message}", render_pos(.pos))]
pub struct CompileError {
    pub kind: ErrorKind,
    pub message: String,
    pub pos: Option<Pos>,
}

fn render_pos(pos: &Option<Pos>) -> String {
    match pos {
        Some(pos) if pos.line > 0 => format!(" at line {}, column {}", pos.line, pos.col),
        _ => String::new(),
    }
}

impl CompileError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, pos: Option<Pos>) -> Self {
        Self {
            kind,
            message: message.into(),
            pos,
        }
    }

    pub fn memory(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Memory, message, None)
    }

    pub fn file_io(path: &str, err: std::io::Error) -> Self {
        Self::new(ErrorKind::FileIo, format!("{}: {}", path, err), None)
    }

    pub fn syntax(message: impl Into<String>, pos: Pos) -> Self {
        Self::new(ErrorKind::Syntax, message, Some(pos))
    }

    pub fn semantic(message: impl Into<String>, pos: Option<Pos>) -> Self {
        Self::new(ErrorKind::Semantic, message, pos)
    }

    pub fn undefined_symbol(name: &str, pos: Option<Pos>) -> Self {
        Self::new(ErrorKind::UndefinedSymbol, format!("'{}' has no resolved symbol", name), pos)
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidOperation, message, None)
    }

    /// `" at line L, column C"`, or nothing when the position is unknown.
    pub fn location(&self) -> String {
        render_pos(&self.pos)
    }

    /// Attaches `pos` unless the error already carries a position.
    pub fn at(mut self, pos: Pos) -> Self {
        if self.pos.is_none() {
            self.pos = Some(pos);
        }

        self
    }
}

pub type CompileResult<T> = Result<T, CompileError>;
