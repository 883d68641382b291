use crate::error::BenchError;
use rand::rngs::OsRng;
use rand::RngCore;

/// Immutable sample buffer fed to the digest functions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    data: Box<[u8]>,
}

impl Block {
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<Vec<u8>> for Block {
    fn from(data: Vec<u8>) -> Self {
        Self {
            data: data.into_boxed_slice(),
        }
    }
}

impl AsRef<[u8]> for Block {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

/// Fills a new block of `size` bytes from the OS random source.
pub fn generate_block(size: usize) -> Block {
    let mut data = vec![0u8; size];
    OsRng.fill_bytes(&mut data);
    Block::from(data)
}

/// Returns a copy of `block` with the least significant bit of its last byte inverted.
pub fn flip_one_bit(block: &Block) -> Result<Block, BenchError> {
    let mut data = block.as_bytes().to_vec();
    let last = data.last_mut().ok_or(BenchError::EmptyInput)?;
    *last ^= 1;
    Ok(Block::from(data))
}
