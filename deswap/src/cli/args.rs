//! CLI argument definitions

use clap::builder::RangedU64ValueParser;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::domain::{ConfigError, SplitThreshold, DEFAULT_SPLIT_SIZE};
use crate::units::parse_bytes;
use crate::yank::RunConfig;

#[derive(Parser, Debug)]
#[command(
    name = "deswap",
    version,
    about = "Bring swapped-out pages of a running process back into memory",
    after_help = "\
EXAMPLES:
    sudo deswap my-app                       Find the process by name
    sudo deswap --pid 1234 -j 4              Four parallel readers
    sudo deswap --pid 1234 -r 0 -n -v        Dry run, no splitting, per-region output"
)]
pub struct Args {
    /// Process name to swap in (resolved to a PID through /proc)
    #[arg(value_name = "PROCESS", conflicts_with = "pid")]
    pub process: Option<String>,

    /// PID of the process to swap in
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub pid: Option<u32>,

    /// Number of parallel read workers
    #[arg(
        short = 'j',
        long = "jobs",
        default_value_t = 1,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub jobs: usize,

    /// Region split size in bytes (0 disables splitting; otherwise a power of two, e.g. 64k)
    #[arg(short = 'r', long = "split-size", default_value_t = DEFAULT_SPLIT_SIZE, value_parser = parse_split_size)]
    pub split_size: u64,

    /// No-op mode: walk every region without reading memory
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Output verbosity (-v per region, -vv per read)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress the banner and summary
    #[arg(short, long)]
    pub quiet: bool,

    /// Write the run report as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}

impl Args {
    /// Verbosity clamped to the supported range 0..=2
    #[must_use]
    pub fn verbosity(&self) -> u8 {
        self.verbose.min(2)
    }

    /// Core run settings from the validated arguments
    ///
    /// # Errors
    /// Returns [`ConfigError`] for a zero worker count or a bad split size
    pub fn run_config(&self) -> Result<RunConfig, ConfigError> {
        RunConfig::new(self.jobs, SplitThreshold::new(self.split_size)?, self.dry_run)
    }
}

fn parse_split_size(input: &str) -> Result<u64, String> {
    let bytes = parse_bytes(input)?;
    SplitThreshold::new(bytes).map(SplitThreshold::bytes).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["deswap", "--pid", "42"]).unwrap();
        assert_eq!(args.pid, Some(42));
        assert_eq!(args.jobs, 1);
        assert_eq!(args.split_size, 65536);
        assert!(!args.dry_run);
        assert_eq!(args.verbosity(), 0);

        let config = args.run_config().unwrap();
        assert_eq!(config.workers.get(), 1);
        assert_eq!(config.threshold.bytes(), 65536);
    }

    #[test]
    fn test_short_flags() {
        let args =
            Args::try_parse_from(["deswap", "-p", "7", "-j", "8", "-r", "4k", "-n", "-vvv"]).unwrap();
        assert_eq!(args.jobs, 8);
        assert_eq!(args.split_size, 4096);
        assert!(args.dry_run);
        assert_eq!(args.verbosity(), 2);
    }

    #[test]
    fn test_split_size_must_be_power_of_two() {
        assert!(Args::try_parse_from(["deswap", "-p", "7", "-r", "3000"]).is_err());
        let args = Args::try_parse_from(["deswap", "-p", "7", "-r", "0"]).unwrap();
        assert!(args.run_config().unwrap().threshold.is_disabled());
    }

    #[test]
    fn test_rejects_zero_pid_and_jobs() {
        assert!(Args::try_parse_from(["deswap", "-p", "0"]).is_err());
        assert!(Args::try_parse_from(["deswap", "-p", "7", "-j", "0"]).is_err());
    }

    #[test]
    fn test_oversized_job_count_is_a_parse_error() {
        let err =
            Args::try_parse_from(["deswap", "-p", "7", "-j", "18446744073709551616"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        assert!(err.to_string().contains("--jobs"));
    }

    #[test]
    fn test_process_and_pid_conflict() {
        assert!(Args::try_parse_from(["deswap", "my-app", "--pid", "7"]).is_err());
        let args = Args::try_parse_from(["deswap", "my-app"]).unwrap();
        assert_eq!(args.process.as_deref(), Some("my-app"));
    }
}
