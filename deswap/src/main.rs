//! # deswap - Main Entry Point
//!
//! Resolves the target, runs pre-flight checks, swaps the process back in and
//! maps the outcome to an exit code.

use anyhow::Result;
use clap::Parser;
use log::info;
use std::io;

use deswap::cli::Args;
use deswap::display::{
    display_banner, display_plan, display_region_event, display_summary, Verbosity,
};
use deswap::domain::{Pid, TargetProcess};
use deswap::export::save_report;
use deswap::preflight::run_preflight_checks;
use deswap::process_lookup::find_process_by_name;
use deswap::yank::{prepare, MemorySource, ProcMem};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;
const EXIT_NOPERM: i32 = 77;

fn main() {
    let args = Args::parse();
    init_logging(args.verbosity());

    std::process::exit(match run(&args) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("deswap: main:\tERR: {e:#}");
            code
        }
    });
}

/// `RUST_LOG` wins; otherwise the verbosity flags pick the level
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    let denied = err
        .chain()
        .filter_map(|cause| cause.downcast_ref::<io::Error>())
        .any(|io_err| io_err.kind() == io::ErrorKind::PermissionDenied);

    if denied {
        EXIT_NOPERM
    } else if err.to_string().to_lowercase().contains("missing required argument") {
        EXIT_USAGE
    } else {
        EXIT_ERROR
    }
}

/// Resolve the target PID from `--pid` or a process name
fn resolve_pid(args: &Args) -> Result<Pid> {
    if let Some(pid) = args.pid {
        return Ok(Pid(pid));
    }

    if let Some(ref name) = args.process {
        let info = find_process_by_name(name)?;
        info!("resolved '{name}' to PID {} ({})", info.pid.0, info.command);
        return Ok(info.pid);
    }

    anyhow::bail!(
        "Missing required argument: PROCESS or --pid\n\n\
         Usage:\n  \
         deswap my-app            Find the process by name\n  \
         deswap --pid 1234        Explicit PID\n\n\
         Run 'deswap --help' for more options"
    )
}

fn run(args: &Args) -> Result<()> {
    let config = args.run_config()?;
    let verbosity = Verbosity::from(args.verbosity());
    let quiet = args.quiet;

    let pid = resolve_pid(args)?;
    let target = TargetProcess::new(pid);

    run_preflight_checks(&target, config.dry_run, quiet)?;

    if !quiet {
        display_banner(pid, config.workers.get(), config.threshold, config.dry_run);
    }

    let prepared = prepare(&target, &config)?;
    if !quiet {
        display_plan(target.smaps_path(), &prepared.plan);
    }

    let source = ProcMem::for_target(&target);
    let report = prepared.execute(&source, |event| {
        display_region_event(source.location(), event, verbosity);
    });

    // Saved before the verdict so failed runs can be inspected too
    if let Some(ref path) = args.report {
        save_report(&report, path)?;
        if !quiet {
            println!("deswap: main:\tsaved: {}", path.display());
        }
    }

    report.verify()?;

    if !quiet {
        display_summary(&report);
    }
    Ok(())
}
