use crate::keypoint::KeyPoint;

/// A binary feature descriptor paired with the keypoint it was sampled at.
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
    pub bytes: Vec<u8>,
    pub keypoint: KeyPoint,
}

impl Descriptor {
    pub fn new(bytes: Vec<u8>, keypoint: KeyPoint) -> Self {
        Self { bytes, keypoint }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Hamming distance to another descriptor of the same length.
    ///
    /// Folds eight bytes at a time into a word popcount; brute-force
    /// matching calls this once per query/train pair.
    pub fn hamming_distance(&self, other: &Descriptor) -> u32 {
        debug_assert_eq!(self.bytes.len(), other.bytes.len());
        let a = self.bytes.chunks_exact(8);
        let b = other.bytes.chunks_exact(8);
        let tail: u32 = a
            .remainder()
            .iter()
            .zip(b.remainder())
            .map(|(x, y)| (x ^ y).count_ones())
            .sum();
        let words: u32 = a
            .zip(b)
            .map(|(x, y)| {
                let mut wx = [0u8; 8];
                let mut wy = [0u8; 8];
                wx.copy_from_slice(x);
                wy.copy_from_slice(y);
                (u64::from_ne_bytes(wx) ^ u64::from_ne_bytes(wy)).count_ones()
            })
            .sum();
        words + tail
    }
}

pub type Descriptors = Vec<Descriptor>;
