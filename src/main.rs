use clap::Parser;
use plzero::{Config, Driver};
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = Config::parse();
    let driver = Driver::new(config);

    match driver.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
