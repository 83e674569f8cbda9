//! CLI argument parsing
//!
//! # Design Principles (KISS)
//! - Use clap's derive macro for declarative argument definition
//! - Config-file argument kept separate and flattened into the bench args
//! - CLI values override the config file

use clap::Parser;

/// Config-file argument, flattened into `BenchArgs`
#[derive(Parser, Debug, Clone)]
pub struct CommonArgs {
    /// Path to configuration file (ignored if it does not exist)
    #[arg(short = 'f', long = "config", default_value = "config.toml")]
    pub config_file: String,
}

/// Arguments for the reorder benchmark
#[derive(Parser, Debug, Clone)]
pub struct BenchArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Total number of events to generate
    #[arg(short = 'n', long)]
    pub events: Option<u64>,

    /// Emit threshold (reorder window size)
    #[arg(short = 't', long)]
    pub threshold: Option<usize>,

    /// Number of concurrent producers
    #[arg(short = 'p', long)]
    pub producers: Option<usize>,

    /// Sink channel capacity
    #[arg(long)]
    pub sink_capacity: Option<usize>,

    /// Standard deviation of timestamp jitter in nanoseconds
    #[arg(long)]
    pub jitter_ns: Option<f64>,

    /// RNG seed for reproducible runs
    #[arg(long, env = "REORDER_SEED")]
    pub seed: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bench_args_defaults() {
        let args = BenchArgs::parse_from(["reorder_bench"]);
        assert_eq!(args.common.config_file, "config.toml");
        assert!(args.events.is_none());
        assert!(args.threshold.is_none());
    }

    #[test]
    fn test_bench_args_overrides() {
        let args = BenchArgs::parse_from([
            "reorder_bench",
            "-f",
            "bench.toml",
            "-n",
            "5000",
            "-t",
            "64",
            "-p",
            "8",
            "--jitter-ns",
            "250.5",
        ]);
        assert_eq!(args.common.config_file, "bench.toml");
        assert_eq!(args.events, Some(5000));
        assert_eq!(args.threshold, Some(64));
        assert_eq!(args.producers, Some(8));
        assert_eq!(args.jitter_ns, Some(250.5));
    }
}
