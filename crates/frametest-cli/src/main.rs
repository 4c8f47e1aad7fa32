//! frametest CLI entry point.

use clap::Parser;
use frametest_cli::{cli, commands, error, logger};

#[tokio::main]
async fn main() {
    let args = cli::Cli::parse();
    logger::init_logger(args.verbose, args.quiet, args.no_color);

    let code = match commands::execute(args).await {
        Ok(status) => status.code(),
        Err(err) => {
            eprintln!("{:?}", error::cli_error_to_miette(err));
            1
        }
    };
    std::process::exit(code);
}
