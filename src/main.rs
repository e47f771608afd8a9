use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::{ArgAction, Parser};
use log::LevelFilter;

use slurm_convert::config::loader::prepare_config;
use slurm_convert::{run_conversion, LogCollector, SbatchSubmitter};

/// Submit a SLURM job converting a distributed checkpoint into a single .nemo file.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Configuration file (.yaml, .yml, .json or .toml).
    #[arg(short, long)]
    config: PathBuf,
    /// Job id this conversion waits for; replaces conversion.slurm.dependency.
    #[arg(long)]
    dependency: Option<String>,
    /// Program used in place of `sbatch`.
    #[arg(long, default_value = "sbatch")]
    sbatch: OsString,
    /// Also append log lines to a timestamped file in this directory.
    #[arg(long)]
    log_dir: Option<PathBuf>,
    /// More log output (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Only log errors.
    #[arg(short, long, default_value_t = false)]
    quiet: bool,
    /// Configuration overrides, e.g. conversion.slurm.partition=interactive
    #[arg(value_name = "KEY=VALUE")]
    overrides: Vec<String>,
}

impl Cli {
    fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let collector = LogCollector::new(cli.log_dir.as_deref(), cli.log_level())
        .map_err(|e| anyhow!(e))
        .context("failed to initialise logging")?;
    if let Err(e) = collector.install() {
        eprintln!("[Main] WARNING: {}", e);
    }

    let cfg = prepare_config(&cli.config, &cli.overrides)
        .with_context(|| format!("failed to load configuration {}", cli.config.display()))?;

    let submitter = SbatchSubmitter::with_program(cli.sbatch.clone());
    let result = run_conversion(&cfg, cli.dependency.as_deref(), &submitter);
    log::logger().flush();

    let job_id = result.map_err(|e| anyhow!(e.user_message()))?;
    println!("Submitted Conversion script with job id: {}", job_id.trim_end());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_overrides() {
        let cli = Cli::parse_from([
            "slurm_convert",
            "--config",
            "conf/convert.yaml",
            "--dependency",
            "1234",
            "conversion.slurm.nodes=2",
            "container_mounts=[/data]",
        ]);
        assert_eq!(cli.config, PathBuf::from("conf/convert.yaml"));
        assert_eq!(cli.dependency.as_deref(), Some("1234"));
        assert_eq!(cli.sbatch, OsString::from("sbatch"));
        assert_eq!(cli.overrides.len(), 2);
    }

    #[test]
    fn test_log_level_flags() {
        let cli = Cli::parse_from(["slurm_convert", "-c", "a.yaml"]);
        assert_eq!(cli.log_level(), LevelFilter::Info);
        let cli = Cli::parse_from(["slurm_convert", "-c", "a.yaml", "-vv"]);
        assert_eq!(cli.log_level(), LevelFilter::Trace);
        let cli = Cli::parse_from(["slurm_convert", "-c", "a.yaml", "-v", "--quiet"]);
        assert_eq!(cli.log_level(), LevelFilter::Error);
    }
}
