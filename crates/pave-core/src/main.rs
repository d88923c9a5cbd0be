//! `pave` binary entry point.

use clap::Parser;
use pave_core::cli::{self, Cli};
use pave_core::exit_codes::ExitCode;
use pave_core::logging::{init_logging, LogFormat};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.log_format, cli.global.verbose, cli.global.quiet);

    let code = match cli::run(&cli) {
        Ok(code) => code,
        Err(err) => {
            match cli.global.log_format {
                LogFormat::Json => eprintln!("{}", cli::error_report(&err)),
                LogFormat::Text => eprintln!("pave: {err} (code {})", err.code()),
            }
            ExitCode::from(&err)
        }
    };
    std::process::exit(code.as_i32());
}
