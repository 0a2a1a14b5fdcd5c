pub mod arena;
pub mod compiler;
pub mod driver;
pub mod error;
pub mod ir;
pub mod parser;
pub mod symbol_table;

pub use compiler::CompilerContext;
pub use driver::{Config, Driver};
pub use error::{CompileError, CompileResult, ErrorKind, Pos};
