//! main.rs
//!
//! Thin binary entry point: initialize logging, parse arguments, hand off
//! to the driver, and translate its result into a process exit code.

use clap::Parser;
use dround::cli::Cli;
use dround::driver;

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    std::process::exit(driver::run(cli));
}
