use anyhow::Result;
use clap::Parser;
use peakmem_alloc::*;
use std::alloc::System;
use std::io;

use hashbench::footprint::MemoryProbe;
use hashbench::{run, Args};

#[global_allocator]
static PEAK_ALLOC: PeakMemAlloc<System> = PeakMemAlloc::new(System);

struct AllocatorProbe(&'static PeakMemAlloc<System>);

impl MemoryProbe for AllocatorProbe {
    fn reset_peak(&self) {
        self.0.reset_peak_memory();
    }

    fn peak_bytes(&self) -> usize {
        self.0.get_peak_memory()
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(args, &AllocatorProbe(&PEAK_ALLOC), &mut out)
}
