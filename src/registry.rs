//! Table of the hash algorithms under test.
//!
//! Each entry binds an algorithm identity to a pure digest function and its
//! declared output length. The measurement code only ever goes through this
//! table, so adding an algorithm means adding one row.

use crate::error::BenchError;
use blake2::Blake2b512;
use clap::ValueEnum;
use sha2::{Digest, Sha256};
use sha3::{Keccak256, Sha3_256};
use std::fmt;
use std::hint::black_box;
use std::mem::size_of;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum)]
pub enum HashAlgorithm {
    Sha256,
    Blake2b,
    Sha3,
    Keccak256,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 4] = [
        HashAlgorithm::Sha256,
        HashAlgorithm::Blake2b,
        HashAlgorithm::Sha3,
        HashAlgorithm::Keccak256,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "SHA-256",
            HashAlgorithm::Blake2b => "BLAKE2b",
            HashAlgorithm::Sha3 => "SHA3-256",
            HashAlgorithm::Keccak256 => "Keccak-256",
        }
    }
}

pub type DigestFn = fn(&[u8]) -> Vec<u8>;
pub type HashOnlyFn = fn(&[u8]);

fn digest_with<D: Digest>(data: &[u8]) -> Vec<u8> {
    D::digest(data).to_vec()
}

// Keeps the fixed-size output on the stack.
fn hash_only_with<D: Digest>(data: &[u8]) {
    black_box(D::digest(data));
}

#[derive(Clone, Copy)]
pub struct Algorithm {
    pub id: HashAlgorithm,
    /// Declared digest length in bits.
    pub digest_bits: usize,
    /// Size of the hasher state, which lives on the stack.
    pub state_bytes: usize,
    digest_fn: DigestFn,
    hash_only_fn: Option<HashOnlyFn>,
}

impl Algorithm {
    pub fn new(id: HashAlgorithm, digest_bits: usize, digest_fn: DigestFn) -> Self {
        Self {
            id,
            digest_bits,
            state_bytes: 0,
            digest_fn,
            hash_only_fn: None,
        }
    }

    /// Binds `id` to a RustCrypto hasher, including an allocation-free timing path.
    pub fn of<D: Digest>(id: HashAlgorithm, digest_bits: usize) -> Self {
        Self {
            id,
            digest_bits,
            state_bytes: size_of::<D>(),
            digest_fn: digest_with::<D>,
            hash_only_fn: Some(hash_only_with::<D>),
        }
    }

    pub fn label(&self) -> &'static str {
        self.id.label()
    }

    pub fn digest_len(&self) -> usize {
        self.digest_bits / 8
    }

    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        (self.digest_fn)(data)
    }

    /// Computes and discards the digest. Used by the timed loops, where
    /// copying the output to the heap would be counted as hashing time.
    pub fn hash_only(&self, data: &[u8]) {
        match self.hash_only_fn {
            Some(hash) => hash(data),
            None => {
                black_box((self.digest_fn)(data));
            }
        }
    }

    pub fn has_inline_timing(&self) -> bool {
        self.hash_only_fn.is_some()
    }

    /// Computes the digest and verifies it has the declared length.
    pub fn checked_digest(&self, data: &[u8]) -> Result<Vec<u8>, BenchError> {
        let out = self.digest(data);
        if out.len() != self.digest_len() {
            return Err(BenchError::AlgorithmFailure {
                algorithm: self.id,
                expected: self.digest_len(),
                actual: out.len(),
            });
        }
        Ok(out)
    }
}

impl fmt::Debug for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Algorithm")
            .field("id", &self.id)
            .field("digest_bits", &self.digest_bits)
            .field("state_bytes", &self.state_bytes)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct Registry {
    algorithms: Vec<Algorithm>,
}

impl Registry {
    pub fn standard() -> Self {
        Self::from_algorithms(vec![
            Algorithm::of::<Sha256>(HashAlgorithm::Sha256, 256),
            Algorithm::of::<Blake2b512>(HashAlgorithm::Blake2b, 512),
            Algorithm::of::<Sha3_256>(HashAlgorithm::Sha3, 256),
            Algorithm::of::<Keccak256>(HashAlgorithm::Keccak256, 256),
        ])
    }

    pub fn from_algorithms(algorithms: Vec<Algorithm>) -> Self {
        Self { algorithms }
    }

    pub fn get(&self, id: HashAlgorithm) -> Result<&Algorithm, BenchError> {
        self.algorithms
            .iter()
            .find(|a| a.id == id)
            .ok_or(BenchError::AlgorithmUnavailable(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Algorithm> {
        self.algorithms.iter()
    }

    pub fn len(&self) -> usize {
        self.algorithms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.algorithms.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::standard()
    }
}
