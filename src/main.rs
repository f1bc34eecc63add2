mod cli;

use clap::Parser;
use std::process::ExitCode;

use cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    match cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            if verbose {
                if let Some(detail) = e.detail() {
                    eprintln!("{detail}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}
