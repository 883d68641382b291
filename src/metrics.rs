//! Per-block measurements: bit diffusion and timed repeated digests.

use crate::error::BenchError;
use crate::input::{flip_one_bit, Block};
use crate::registry::{Algorithm, HashAlgorithm};
use std::hint::black_box;
use std::time::{Duration, Instant};

const MIB: f64 = (1u64 << 20) as f64;

/// Result of measuring one algorithm against one block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementSample {
    pub algorithm: HashAlgorithm,
    pub block_size: usize,
    /// MiB/s
    pub throughput: f64,
    /// Milliseconds per digest
    pub latency_ms: f64,
    /// Percentage of output bits changed by a one-bit input flip
    pub avalanche: f64,
}

/// Number of differing bits between two byte strings, compared pairwise.
pub fn hamming_distance(a: &[u8], b: &[u8]) -> u32 {
    a.iter().zip(b).map(|(x, y)| (x ^ y).count_ones()).sum()
}

/// Percentage of digest bits that change when the last input bit is flipped.
pub fn measure_avalanche(algorithm: &Algorithm, block: &Block) -> Result<f64, BenchError> {
    let flipped = flip_one_bit(block)?;
    let h1 = algorithm.checked_digest(block.as_bytes())?;
    let h2 = algorithm.checked_digest(flipped.as_bytes())?;

    let total_bits = (h1.len() * 8) as f64;
    Ok(hamming_distance(&h1, &h2) as f64 / total_bits * 100.0)
}

/// Runs `iterations` timed digests of the same block and returns
/// (throughput in MiB/s, average latency in ms).
///
/// `warmup` untimed digests run first. The elapsed time is clamped to one
/// nanosecond so both figures stay finite and positive.
pub fn measure_latency_and_throughput(
    algorithm: &Algorithm,
    block: &Block,
    iterations: u32,
    warmup: u32,
) -> Result<(f64, f64), BenchError> {
    if iterations == 0 {
        return Err(BenchError::InvalidConfiguration(
            "iterations must be at least 1".to_string(),
        ));
    }
    let data = block.as_bytes();

    for _ in 0..warmup {
        algorithm.hash_only(black_box(data));
    }

    let start = Instant::now();
    for _ in 0..iterations {
        algorithm.hash_only(black_box(data));
    }
    let elapsed = start.elapsed().max(Duration::from_nanos(1));

    let per_call = elapsed.as_secs_f64() / iterations as f64;
    let latency_ms = per_call * 1000.0;
    let throughput = (data.len() as f64 / MIB) / per_call;

    Ok((throughput, latency_ms))
}

pub fn measure_sample(
    algorithm: &Algorithm,
    block: &Block,
    iterations: u32,
    warmup: u32,
) -> Result<MeasurementSample, BenchError> {
    let (throughput, latency_ms) =
        measure_latency_and_throughput(algorithm, block, iterations, warmup)?;
    let avalanche = measure_avalanche(algorithm, block)?;
    Ok(MeasurementSample {
        algorithm: algorithm.id,
        block_size: block.len(),
        throughput,
        latency_ms,
        avalanche,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::generate_block;
    use crate::registry::Registry;
    use anyhow::Result;

    #[test]
    fn test_hamming_distance() {
        assert_eq!(hamming_distance(&[0x00, 0xff], &[0x00, 0xff]), 0);
        assert_eq!(hamming_distance(&[0x00, 0x00], &[0xff, 0x01]), 9);
        assert_eq!(hamming_distance(&[0b1010], &[0b0101]), 4);
    }

    #[test]
    fn test_avalanche_in_range() -> Result<()> {
        let registry = Registry::standard();
        for algo in registry.iter() {
            for size in [1usize, 16, 1024] {
                let block = generate_block(size);
                let score = measure_avalanche(algo, &block)?;
                assert!((0.0..=100.0).contains(&score), "{}", algo.label());
            }
        }
        Ok(())
    }

    #[test]
    fn test_avalanche_repeatable() -> Result<()> {
        let registry = Registry::standard();
        let sha256 = registry.get(HashAlgorithm::Sha256)?;
        let zeros = Block::from(vec![0u8; 64]);

        let first = measure_avalanche(sha256, &zeros)?;
        let second = measure_avalanche(sha256, &zeros)?;
        assert_eq!(first, second);
        assert!(first > 0.0);

        for algo in registry.iter() {
            let block = generate_block(100);
            assert_eq!(
                measure_avalanche(algo, &block)?,
                measure_avalanche(algo, &block)?
            );
        }
        Ok(())
    }

    #[test]
    fn test_avalanche_empty_block() -> Result<()> {
        let registry = Registry::standard();
        let empty = Block::from(Vec::new());
        let err = measure_avalanche(registry.get(HashAlgorithm::Sha3)?, &empty).unwrap_err();
        assert_eq!(err, BenchError::EmptyInput);
        Ok(())
    }

    #[test]
    fn test_latency_and_throughput_positive() -> Result<()> {
        let registry = Registry::standard();
        for algo in registry.iter() {
            let block = generate_block(64);
            let (throughput, latency) = measure_latency_and_throughput(algo, &block, 1, 0)?;
            assert!(throughput > 0.0 && throughput.is_finite());
            assert!(latency > 0.0 && latency.is_finite());
        }
        Ok(())
    }

    #[test]
    fn test_zero_iterations_rejected() -> Result<()> {
        let registry = Registry::standard();
        let block = generate_block(16);
        let sha256 = registry.get(HashAlgorithm::Sha256)?;
        let result = measure_latency_and_throughput(sha256, &block, 0, 0);
        assert!(matches!(result, Err(BenchError::InvalidConfiguration(_))));
        Ok(())
    }

    #[test]
    fn test_throughput_grows_with_size() -> Result<()> {
        let registry = Registry::standard();
        let sha256 = registry.get(HashAlgorithm::Sha256)?;

        // Same total bytes hashed: many small calls against a few large ones.
        let small = generate_block(64);
        let large = generate_block(64 * 1024);
        let best = |block: &Block, iterations: u32| -> Result<f64> {
            let mut best = 0.0f64;
            for _ in 0..5 {
                let (tp, _) = measure_latency_and_throughput(sha256, block, iterations, 1)?;
                best = best.max(tp);
            }
            Ok(best)
        };
        let small_tp = best(&small, 1024)?;
        let large_tp = best(&large, 1)?;

        // Per-call overhead dominates small inputs; allow generous noise.
        assert!(large_tp >= small_tp * 0.5, "{small_tp} vs {large_tp}");
        Ok(())
    }

    #[test]
    fn test_sample_fields() -> Result<()> {
        let registry = Registry::standard();
        let keccak = registry.get(HashAlgorithm::Keccak256)?;
        let block = generate_block(32);
        let sample = measure_sample(keccak, &block, 4, 0)?;
        assert_eq!(sample.algorithm, HashAlgorithm::Keccak256);
        assert_eq!(sample.block_size, 32);
        assert!(sample.throughput > 0.0);
        assert!(sample.latency_ms > 0.0);
        assert!((0.0..=100.0).contains(&sample.avalanche));
        Ok(())
    }
}
