mod generator;
mod tac;
mod tac_printer;

pub use generator::TacGenerator;
pub use tac::{InstrId, OpCode, Tac, TacIter, TacList};
pub use tac_printer::tac_to_string;
