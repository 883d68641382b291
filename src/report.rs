//! Console tables for sweep and footprint results.

use crate::footprint::FootprintEntry;
use crate::sweep::SizeRound;
use crate::utils::{format_bytes, format_bytes_fixed};
use std::io::{self, Write};

const RULE_WIDTH: usize = 70;

pub fn write_banner<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "Blockchain Hash Function Benchmark Results:\n")?;
    writeln!(out, "{}", "*".repeat(RULE_WIDTH))?;
    writeln!(out, "BLOCK_SIZE scaling")?;
    writeln!(out, "{}", "*".repeat(RULE_WIDTH))
}

pub fn write_round<W: Write>(
    out: &mut W,
    round: &SizeRound,
    blocks: usize,
    iterations: u32,
) -> io::Result<()> {
    writeln!(
        out,
        "\nBlocks: {} | Block Size: {} | Iterations per Test: {}",
        blocks,
        format_bytes(round.block_size as u64),
        iterations
    )?;
    writeln!(
        out,
        "{:<16} | {:>18} | {:>12} | {:>13}",
        "ALGORITHM", "THROUGHPUT (MiB/s)", "LATENCY (ms)", "AVALANCHE (%)"
    )?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;

    for agg in &round.aggregates {
        writeln!(
            out,
            "{:<16} | {:>18.2} | {:>12.5} | {:>13.2}%",
            agg.algorithm.label(),
            agg.throughput,
            agg.latency_ms,
            agg.avalanche
        )?;
    }

    writeln!(out, "{}", "-".repeat(RULE_WIDTH))
}

/// Heap columns come from the allocator; the hasher state lives on the
/// stack and is listed separately.
pub fn write_footprint<W: Write>(out: &mut W, entries: &[FootprintEntry]) -> io::Result<()> {
    writeln!(out, "Hash Function Memory Footprint:\n")?;
    writeln!(
        out,
        "{:<16} | {:>18} | {:>12} | {:>13}",
        "STEP", "HEAP PEAK (bytes)", "HEAP PEAK", "STATE (bytes)"
    )?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
    for entry in entries {
        writeln!(
            out,
            "{:<16} | {:>18} | {:>12} | {:>13}",
            entry.step,
            entry.peak_bytes,
            format_bytes_fixed(entry.peak_bytes as u64, 2),
            entry.state_bytes
        )?;
    }
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))
}
