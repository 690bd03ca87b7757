use clap::Parser;
use volcross::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
