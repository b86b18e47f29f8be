pub mod cli;
pub mod cmd;
pub mod error;
pub mod io;

pub use cli::{Cli, Command, SampleStrategy};

use clap::Parser;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = dispatch(&cli) {
        eprintln!("{}", e.message());
        std::process::exit(e.exit_code());
    }
}

/// Dispatches the parsed CLI arguments to the appropriate command handler.
///
/// Returns `Ok(())` on success or a [`error::CliError`] on failure. The
/// caller is responsible for printing the error message and exiting with
/// the appropriate exit code.
fn dispatch(cli: &Cli) -> Result<(), error::CliError> {
    match &cli.command {
        Command::Inspect { file } => cmd::inspect::run(file),
        Command::Merge { files, output } => cmd::merge::run(files, output),
        Command::Score { file, distribution } => cmd::score::run(file, *distribution),
        Command::Trim { file, output } => cmd::trim::run(file, output),
        Command::Sample {
            file,
            output,
            seed,
            strategy,
        } => cmd::sample::run(file, output, *seed, *strategy),
        Command::Rf {
            file,
            reference,
            max,
        } => cmd::rf::run(file, reference, *max),
    }
}
