//! Retile CLI - Command-line interface
//!
//! Rebuilds the next zoom levels of the tile sets named in a JSON
//! configuration file.

mod commands;
mod error;

use clap::Parser;

use commands::retile::RetileArgs;

fn main() {
    let args = RetileArgs::parse();

    if let Err(e) = commands::retile::run(&args) {
        e.exit();
    }
}
