//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use cabpool_cli::CliError;

fn main() {
    env_logger::init();
    match cabpool_cli::run() {
        Ok(()) => {}
        // Clap renders help, version and usage errors with its own exit code.
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("cabpool: {err}");
            std::process::exit(1);
        }
    }
}
