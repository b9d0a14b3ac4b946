//! rlc - the Royal compiler.
//!
//! A single invocation compiles one project: `rlc <project-root>` reads
//! the project file, compiles every source under its source paths, and
//! prints any faults to stderr one per line. The exit code is non-zero
//! when any error was raised.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use rlc_drv::{Config, DriverError, Session, PROJECT_FILE_NAME};

/// Compiler for the Royal language.
#[derive(Parser, Debug)]
#[command(name = "rlc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compiler for the Royal language", long_about = None)]
struct Cli {
    /// Project root directory.
    #[arg(default_value = ".")]
    project_root: PathBuf,

    /// Project file name inside the project root.
    #[arg(long, default_value = PROJECT_FILE_NAME)]
    project_file: String,

    /// Report each compilation phase on stderr.
    #[arg(short, long)]
    verbose: bool,

    /// Write parsertrees/parsertree_<module>.json debug dumps.
    #[arg(long)]
    dump_parse_trees: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("rlc: {:#}", error);
            ExitCode::FAILURE
        },
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config {
        project_root: cli.project_root,
        project_file: cli.project_file,
        verbose: cli.verbose,
        dump_parse_trees: cli.dump_parse_trees,
    };

    let mut session = Session::new(config);
    let result = session.compile();

    for fault in session.reporter().faults() {
        eprintln!("{}", fault);
    }

    match result {
        Ok(modules) => {
            if cli.verbose {
                eprintln!("Compiled {} module(s)", modules.len());
            }
            Ok(())
        },
        Err(DriverError::CompilationFailed) => anyhow::bail!(
            "compilation failed with {} error(s)",
            session.reporter().fault_count()
        ),
        Err(error) => Err(error).context("unable to compile project"),
    }
}
