//! minish CLI entry point.
//!
//! Usage:
//!   minish                  # Interactive shell
//!   minish -c <command>     # Execute one command line and exit

use std::env;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> ExitCode {
    // Respects RUST_LOG; silent by default.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("minish: {e:?}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        None => {
            let code = minish_repl::Repl::new()?.run()?;
            Ok(exit_code(code))
        }

        Some("-c") => {
            let cmd = args.get(2).context("-c requires a command argument")?;
            let code = minish_repl::run_command(cmd)?;
            Ok(exit_code(code))
        }

        Some("--help" | "-h") => {
            print_help();
            Ok(ExitCode::SUCCESS)
        }

        Some("--version" | "-V") => {
            println!("minish {}", env!("CARGO_PKG_VERSION"));
            Ok(ExitCode::SUCCESS)
        }

        Some(unknown) => {
            eprintln!("minish: unknown option: {unknown}");
            eprintln!("Run 'minish --help' for usage.");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    if code == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(code.rem_euclid(256) as u8)
    }
}

fn print_help() {
    println!(
        r#"minish v{}

Usage:
  minish                  Interactive shell
  minish -c <command>     Execute one command line and exit

Options:
  -c <command>            Command string to execute
  -h, --help              Show this help
  -V, --version           Show version

Job control:
  cmd &                   Run a pipeline in the background
  jobs                    List jobs and their states
  fg [%N]                 Resume a job in the foreground
  bg [%N]                 Resume a stopped job in the background
  Ctrl-Z                  Stop the foreground job
  Ctrl-C                  Interrupt the foreground job
"#,
        env!("CARGO_PKG_VERSION")
    );
}
