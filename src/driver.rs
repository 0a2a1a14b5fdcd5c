mod config;
mod driver;
mod output;

pub use config::Config;
pub use driver::Driver;
pub use output::{tokens_to_string, write_artifact};
