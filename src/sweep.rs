//! Sweep over a geometric range of block sizes.
//!
//! For every exponent `e` in `min_exponent..floor(log2(max_block_size))`,
//! `blocks` fresh random blocks of `2^e` bytes are generated and every
//! selected algorithm is measured against each of them. The per-block samples
//! are averaged into one [`SizeAggregate`] per algorithm, and the finished
//! round is handed to the caller before the next size starts. The maximum
//! size itself is never measured.

use crate::error::BenchError;
use crate::input::{generate_block, Block};
use crate::metrics::{measure_sample, MeasurementSample};
use crate::registry::{Algorithm, HashAlgorithm, Registry};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::ops::Range;

pub const DEFAULT_BLOCKS: usize = 32;
pub const DEFAULT_MAX_BLOCK_SIZE: usize = 1 << 22;
pub const DEFAULT_MIN_EXPONENT: u32 = 4;
pub const DEFAULT_ITERATIONS: u32 = 32;

const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} {msg}\n[{bar:40.cyan/blue}] {pos}/{len} samples (ETA: {eta})";

#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Sample blocks generated per size.
    pub blocks: usize,
    /// Exclusive upper bound on the block size, in bytes.
    pub max_block_size: usize,
    /// Exponent of the smallest block size.
    pub min_exponent: u32,
    /// Timed digests per sample.
    pub iterations: u32,
    /// Untimed digests run before each timed loop.
    pub warmup: u32,
    pub algorithms: Vec<HashAlgorithm>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            blocks: DEFAULT_BLOCKS,
            max_block_size: DEFAULT_MAX_BLOCK_SIZE,
            min_exponent: DEFAULT_MIN_EXPONENT,
            iterations: DEFAULT_ITERATIONS,
            warmup: 0,
            algorithms: HashAlgorithm::ALL.to_vec(),
        }
    }
}

impl SweepConfig {
    pub fn validate(&self) -> Result<(), BenchError> {
        let invalid = |msg: &str| Err(BenchError::InvalidConfiguration(msg.to_string()));

        if self.blocks == 0 {
            return invalid("block count must be at least 1");
        }
        if self.iterations == 0 {
            return invalid("iterations must be at least 1");
        }
        if self.max_block_size == 0 {
            return invalid("maximum block size must be at least 1 byte");
        }
        if self.algorithms.is_empty() {
            return invalid("no algorithms selected");
        }
        if self.exponents().is_empty() {
            return Err(BenchError::InvalidConfiguration(format!(
                "no block sizes between 2^{} and {} bytes (exclusive)",
                self.min_exponent, self.max_block_size
            )));
        }
        Ok(())
    }

    /// Block-size exponents measured, upper bound exclusive.
    pub fn exponents(&self) -> Range<u32> {
        let upper = self.max_block_size.checked_ilog2().unwrap_or(0);
        self.min_exponent..upper
    }

    pub fn block_sizes(&self) -> Vec<usize> {
        self.exponents().map(|e| 1usize << e).collect()
    }
}

/// Mean metrics of one algorithm over all blocks of one size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeAggregate {
    pub algorithm: HashAlgorithm,
    pub block_size: usize,
    /// Number of blocks averaged.
    pub samples: usize,
    pub throughput: f64,
    pub latency_ms: f64,
    pub avalanche: f64,
}

struct Accumulator {
    algorithm: HashAlgorithm,
    block_size: usize,
    samples: usize,
    throughput: f64,
    latency_ms: f64,
    avalanche: f64,
}

impl Accumulator {
    fn new(algorithm: HashAlgorithm, block_size: usize) -> Self {
        Self {
            algorithm,
            block_size,
            samples: 0,
            throughput: 0.0,
            latency_ms: 0.0,
            avalanche: 0.0,
        }
    }

    fn add(&mut self, sample: &MeasurementSample) {
        self.samples += 1;
        self.throughput += sample.throughput;
        self.latency_ms += sample.latency_ms;
        self.avalanche += sample.avalanche;
    }

    fn finish(self, expected: usize) -> Result<SizeAggregate> {
        anyhow::ensure!(
            self.samples == expected && expected > 0,
            "{:?} at {} bytes: {} of {} samples recorded",
            self.algorithm,
            self.block_size,
            self.samples,
            expected
        );
        let n = self.samples as f64;
        Ok(SizeAggregate {
            algorithm: self.algorithm,
            block_size: self.block_size,
            samples: self.samples,
            throughput: self.throughput / n,
            latency_ms: self.latency_ms / n,
            avalanche: self.avalanche / n,
        })
    }
}

/// All aggregates for one block size, in configured algorithm order.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeRound {
    pub block_size: usize,
    pub aggregates: Vec<SizeAggregate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepResult {
    pub blocks: usize,
    pub iterations: u32,
    pub rounds: Vec<SizeRound>,
}

impl SweepResult {
    /// Aggregates of one algorithm ordered by increasing block size.
    pub fn series(&self, algorithm: HashAlgorithm) -> Vec<&SizeAggregate> {
        self.rounds
            .iter()
            .flat_map(|round| round.aggregates.iter())
            .filter(|agg| agg.algorithm == algorithm)
            .collect()
    }
}

pub struct Sweep<'a> {
    config: SweepConfig,
    algorithms: Vec<&'a Algorithm>,
    progress: ProgressBar,
}

impl<'a> Sweep<'a> {
    /// Validates the configuration and resolves every selected algorithm.
    /// Fails if any of them is missing from the registry.
    pub fn new(config: SweepConfig, registry: &'a Registry) -> Result<Self, BenchError> {
        config.validate()?;
        let algorithms = config
            .algorithms
            .iter()
            .map(|&id| registry.get(id))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            config,
            algorithms,
            progress: ProgressBar::hidden(),
        })
    }

    /// Shows a progress bar on stderr while the sweep runs.
    pub fn with_progress(mut self) -> Result<Self> {
        let total = self.config.exponents().len() * self.algorithms.len() * self.config.blocks;
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(PROGRESS_TEMPLATE)?
                .progress_chars("=>-"),
        );
        self.progress = pb;
        Ok(self)
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Runs every round, calling `on_round` after each block size completes.
    /// The first error from a measurement or from `on_round` aborts the sweep.
    pub fn run<F>(&self, mut on_round: F) -> Result<SweepResult>
    where
        F: FnMut(&SizeRound) -> Result<()>,
    {
        let mut rounds = Vec::new();

        for exponent in self.config.exponents() {
            let block_size = 1usize << exponent;
            let round = self.run_round(block_size)?;
            self.progress.suspend(|| on_round(&round))?;
            rounds.push(round);
        }

        self.progress.finish_and_clear();
        Ok(SweepResult {
            blocks: self.config.blocks,
            iterations: self.config.iterations,
            rounds,
        })
    }

    fn run_round(&self, block_size: usize) -> Result<SizeRound> {
        let blocks: Vec<Block> = (0..self.config.blocks)
            .map(|_| generate_block(block_size))
            .collect();

        let mut aggregates = Vec::with_capacity(self.algorithms.len());
        for algo in &self.algorithms {
            self.progress
                .set_message(format!("{} @ {} bytes", algo.label(), block_size));

            let mut acc = Accumulator::new(algo.id, block_size);
            for block in &blocks {
                let sample =
                    measure_sample(algo, block, self.config.iterations, self.config.warmup)
                        .with_context(|| {
                            format!("Measuring {} on a {}-byte block", algo.label(), block_size)
                        })?;
                acc.add(&sample);
                self.progress.inc(1);
            }
            aggregates.push(acc.finish(self.config.blocks)?);
        }

        Ok(SizeRound {
            block_size,
            aggregates,
        })
    }
}
