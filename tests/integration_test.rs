use anyhow::Result;
use hashbench::error::BenchError;
use hashbench::footprint::MemoryProbe;
use hashbench::registry::HashAlgorithm;
use hashbench::{run, Args};
use std::fs;
use std::path::Path;

struct NullProbe;

impl MemoryProbe for NullProbe {
    fn reset_peak(&self) {}
    fn peak_bytes(&self) -> usize {
        0
    }
}

fn small_args(log: &Path) -> Args {
    Args {
        blocks: 4,
        max_block_size: 128,
        min_exponent: 4,
        iterations: 8,
        warmup: 0,
        algorithms: vec![HashAlgorithm::Sha256],
        log: log.to_str().unwrap().to_string(),
        no_progress: true,
        footprint: false,
        footprint_size: 1024,
    }
}

#[test]
fn test_integration_sweep_report() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let log_path = dir.path().join("bench.log");

    let mut out = Vec::new();
    run(small_args(&log_path), &NullProbe, &mut out)?;
    let text = String::from_utf8(out)?;

    assert!(text.starts_with("Blockchain Hash Function Benchmark Results:"));
    for size in ["16B", "32B", "64B"] {
        assert!(text.contains(&format!(
            "Blocks: 4 | Block Size: {} | Iterations per Test: 8",
            size
        )));
    }
    assert!(!text.contains("Block Size: 128B"));
    assert_eq!(text.matches("SHA-256 ").count(), 3);
    assert!(!text.contains("Keccak-256"));

    let log = fs::read_to_string(&log_path)?;
    assert!(log.contains("Sweep started"));
    assert_eq!(log.matches("over 4 blocks").count(), 3);
    assert!(log.contains("Sweep completed: 3 block sizes"));
    Ok(())
}

#[test]
fn test_integration_all_algorithms() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let args = Args {
        blocks: 2,
        max_block_size: 32,
        algorithms: vec![],
        ..small_args(&dir.path().join("bench.log"))
    };

    let mut out = Vec::new();
    run(args, &NullProbe, &mut out)?;
    let text = String::from_utf8(out)?;

    for algo in HashAlgorithm::ALL {
        assert_eq!(text.matches(&format!("{} ", algo.label())).count(), 1);
    }
    Ok(())
}

#[test]
fn test_integration_invalid_config() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let log_path = dir.path().join("bench.log");
    let args = Args {
        iterations: 0,
        ..small_args(&log_path)
    };

    let mut out = Vec::new();
    let err = run(args, &NullProbe, &mut out).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<BenchError>(),
        Some(BenchError::InvalidConfiguration(_))
    ));
    // Nothing measured or printed.
    assert!(out.is_empty());
    assert!(!log_path.exists());
    Ok(())
}

#[test]
fn test_integration_footprint() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let log_path = dir.path().join("bench.log");
    let args = Args {
        footprint: true,
        ..small_args(&log_path)
    };

    let mut out = Vec::new();
    run(args, &NullProbe, &mut out)?;
    let text = String::from_utf8(out)?;

    assert!(text.contains("input"));
    for algo in HashAlgorithm::ALL {
        assert!(text.contains(algo.label()));
    }

    let log = fs::read_to_string(&log_path)?;
    assert!(log.contains("Footprint started: input=1.0KiB"));
    assert_eq!(log.matches("Footprint ").count(), 6);
    Ok(())
}
