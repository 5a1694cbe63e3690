// src/bin/cli.rs
use fast_cats::cli;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    cli::main_with_args(std::env::args().skip(1))
}
