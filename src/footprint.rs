//! Peak heap usage of a single digest per algorithm on a large buffer.
//!
//! The allocator instrumentation lives outside the library: the binary
//! installs a tracking global allocator and hands it in as a [`MemoryProbe`].
//! An allocator only sees the heap. The hasher state sits on the stack, so
//! each entry also carries the state size reported by the registry.

use crate::input::generate_block;
use crate::registry::Registry;
use anyhow::{Context, Result};

pub const DEFAULT_FOOTPRINT_SIZE: usize = 8194 * 8194;

pub trait MemoryProbe {
    /// Starts a new peak window at the current allocation level.
    fn reset_peak(&self);
    /// Highest allocation level seen since the last reset, in bytes.
    fn peak_bytes(&self) -> usize;
}

/// Peak tracking window. Resets the probe on entry and again when dropped,
/// so an early return never leaks a stale peak into the next region.
pub struct MeasuredRegion<'a> {
    probe: &'a dyn MemoryProbe,
}

impl<'a> MeasuredRegion<'a> {
    pub fn enter(probe: &'a dyn MemoryProbe) -> Self {
        probe.reset_peak();
        Self { probe }
    }

    pub fn peak_bytes(&self) -> usize {
        self.probe.peak_bytes()
    }
}

impl Drop for MeasuredRegion<'_> {
    fn drop(&mut self) {
        self.probe.reset_peak();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FootprintEntry {
    pub step: String,
    /// Peak heap bytes inside the measured region.
    pub peak_bytes: usize,
    /// Stack-resident hasher state, zero for the input step.
    pub state_bytes: usize,
    pub digest: Option<Vec<u8>>,
}

/// Allocates one `size`-byte input, then computes exactly one digest of it
/// per registered algorithm, each inside its own measured region.
pub fn run_footprint(
    registry: &Registry,
    probe: &dyn MemoryProbe,
    size: usize,
) -> Result<Vec<FootprintEntry>> {
    let mut entries = Vec::with_capacity(registry.len() + 1);

    let block = {
        let region = MeasuredRegion::enter(probe);
        let block = generate_block(size);
        entries.push(FootprintEntry {
            step: "input".to_string(),
            peak_bytes: region.peak_bytes(),
            state_bytes: 0,
            digest: None,
        });
        block
    };

    for algo in registry.iter() {
        let region = MeasuredRegion::enter(probe);
        let digest = algo
            .checked_digest(block.as_bytes())
            .with_context(|| format!("Hashing footprint input with {}", algo.label()))?;
        let peak_bytes = region.peak_bytes();
        entries.push(FootprintEntry {
            step: algo.label().to_string(),
            peak_bytes,
            state_bytes: algo.state_bytes,
            digest: Some(digest),
        });
    }

    Ok(entries)
}
