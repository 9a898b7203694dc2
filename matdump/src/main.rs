//! matdump - Inspect the variables stored in MATLAB/Octave .mat files.
//!
//! Lists the top-level variables of a Level 5 MAT file, or prints the
//! contents of selected variables including nested cell and struct arrays.

mod cli;
mod commands;
mod output;

use std::io::Write;

use anyhow::Result;
use clap::Parser;

use cli::Args;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    init_logger(&args);

    if let Err(e) = run(args) {
        output::print_error(&e);
        std::process::exit(1);
    }
}

/// Route `log` output from the MAT reader to stderr.
fn init_logger(args: &Args) {
    let level = if args.verbose {
        log::LevelFilter::Debug
    } else if args.quiet {
        log::LevelFilter::Off
    } else {
        log::LevelFilter::Warn
    };

    if let Err(e) = env_logger::Builder::new()
        .filter_level(level)
        .target(env_logger::Target::Stderr)
        .format(|buf, record| {
            let level = record.level().as_str().to_lowercase();
            writeln!(buf, "[matdump {level:>5}] {}", record.args())
        })
        .try_init()
    {
        eprintln!("failed to setup logger: {e}");
    }
}

/// Main dispatch function.
fn run(args: Args) -> Result<()> {
    // Validate arguments
    args.validate().map_err(|e| anyhow::anyhow!("{}", e))?;

    if args.is_list() {
        commands::list::run(&args)
    } else {
        commands::show::run(&args)
    }
}
