pub mod error;
pub mod footprint;
pub mod input;
pub mod metrics;
pub mod registry;
pub mod report;
pub mod sweep;
pub mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;

use footprint::{run_footprint, MemoryProbe, DEFAULT_FOOTPRINT_SIZE};
use registry::{HashAlgorithm, Registry};
use report::{write_banner, write_footprint, write_round};
use sweep::{
    Sweep, SweepConfig, DEFAULT_BLOCKS, DEFAULT_ITERATIONS, DEFAULT_MAX_BLOCK_SIZE,
    DEFAULT_MIN_EXPONENT,
};
use utils::{format_bytes, Logger};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Sample blocks generated per block size
    #[arg(long, default_value_t = DEFAULT_BLOCKS)]
    pub blocks: usize,

    /// Upper bound on the block size in bytes (exclusive)
    #[arg(long, default_value_t = DEFAULT_MAX_BLOCK_SIZE)]
    pub max_block_size: usize,

    /// Exponent of the smallest block size (2^N bytes)
    #[arg(long, default_value_t = DEFAULT_MIN_EXPONENT)]
    pub min_exponent: u32,

    /// Timed digests per sample block
    #[arg(long, default_value_t = DEFAULT_ITERATIONS)]
    pub iterations: u32,

    /// Untimed digests before each timed loop
    #[arg(long, default_value_t = 0)]
    pub warmup: u32,

    /// Algorithm to measure; repeat to select several (default: all)
    #[arg(long = "algorithm", value_enum)]
    pub algorithms: Vec<HashAlgorithm>,

    /// Run log file path
    #[arg(long, default_value = "hashbench.log")]
    pub log: String,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Measure peak memory of one digest per algorithm instead of sweeping
    #[arg(long)]
    pub footprint: bool,

    /// Input size in bytes for the footprint measurement
    #[arg(long, default_value_t = DEFAULT_FOOTPRINT_SIZE)]
    pub footprint_size: usize,
}

impl Args {
    pub fn sweep_config(&self) -> SweepConfig {
        let algorithms = if self.algorithms.is_empty() {
            HashAlgorithm::ALL.to_vec()
        } else {
            self.algorithms.clone()
        };
        SweepConfig {
            blocks: self.blocks,
            max_block_size: self.max_block_size,
            min_exponent: self.min_exponent,
            iterations: self.iterations,
            warmup: self.warmup,
            algorithms,
        }
    }
}

pub fn run<W: Write>(args: Args, probe: &dyn MemoryProbe, out: &mut W) -> Result<()> {
    let registry = Registry::standard();
    let logger = Logger::new(&args.log);

    if args.footprint {
        return run_footprint_report(&args, &registry, probe, &logger, out);
    }

    let config = args.sweep_config();
    // Configuration errors surface before any measurement starts.
    let mut sweep = Sweep::new(config, &registry)?;
    if !args.no_progress {
        sweep = sweep.with_progress()?;
    }

    let config = sweep.config();
    logger.log(&format!(
        "Sweep started: blocks={} sizes={}..{} iterations={} warmup={} algorithms={:?}",
        config.blocks,
        format_bytes(1u64 << config.min_exponent),
        format_bytes(config.max_block_size as u64),
        config.iterations,
        config.warmup,
        config.algorithms
    ))?;

    write_banner(out)?;
    let (blocks, iterations) = (config.blocks, config.iterations);
    let result = sweep.run(|round| {
        write_round(out, round, blocks, iterations)?;
        out.flush()?;
        for agg in &round.aggregates {
            logger.log(&format!(
                "{} {}: throughput={:.2} MiB/s latency={:.5} ms avalanche={:.2}% over {} blocks",
                agg.algorithm.label(),
                format_bytes(agg.block_size as u64),
                agg.throughput,
                agg.latency_ms,
                agg.avalanche,
                agg.samples
            ))?;
        }
        Ok(())
    })?;

    logger.log(&format!(
        "Sweep completed: {} block sizes",
        result.rounds.len()
    ))?;
    Ok(())
}

fn run_footprint_report<W: Write>(
    args: &Args,
    registry: &Registry,
    probe: &dyn MemoryProbe,
    logger: &Logger,
    out: &mut W,
) -> Result<()> {
    logger.log(&format!(
        "Footprint started: input={}",
        format_bytes(args.footprint_size as u64)
    ))?;

    let entries = run_footprint(registry, probe, args.footprint_size)
        .context("Footprint measurement failed")?;

    write_footprint(out, &entries)?;
    for entry in &entries {
        let digest = entry.digest.as_deref().map(hex::encode).unwrap_or_default();
        logger.log(&format!(
            "Footprint {}: peak={} bytes state={} bytes {}",
            entry.step, entry.peak_bytes, entry.state_bytes, digest
        ))?;
    }
    Ok(())
}
