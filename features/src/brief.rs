use framelab_core::{Descriptor, Descriptors, GrayImage, KeyPoint};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const PATCH_SIZE: i32 = 48;

/// Default pattern seed. Extractors built with [`Brief::new`] share it, so
/// descriptors computed on different images stay comparable.
const PATTERN_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

/// BRIEF binary descriptor extractor.
///
/// Each bit is an intensity comparison between two offsets inside a 48-px
/// patch centered on the keypoint. The offset pattern is drawn once at
/// construction from a seeded generator.
pub struct Brief {
    bytes: usize,
    pattern: Vec<[(i32, i32); 2]>,
}

impl Brief {
    pub fn new(bytes: usize) -> Self {
        Self::with_seed(bytes, PATTERN_SEED)
    }

    pub fn with_seed(bytes: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let half = PATCH_SIZE / 2;
        let pattern = (0..bytes * 8)
            .map(|_| {
                let p1 = (rng.gen_range(-half..half), rng.gen_range(-half..half));
                let p2 = (rng.gen_range(-half..half), rng.gen_range(-half..half));
                [p1, p2]
            })
            .collect();

        Self { bytes, pattern }
    }

    pub fn descriptor_len(&self) -> usize {
        self.bytes
    }

    pub fn compute(&self, image: &GrayImage, keypoints: &[KeyPoint]) -> Descriptors {
        keypoints
            .iter()
            .map(|kp| self.compute_single(image, kp))
            .collect()
    }

    fn compute_single(&self, image: &GrayImage, kp: &KeyPoint) -> Descriptor {
        let x = kp.x as i32;
        let y = kp.y as i32;

        let mut bytes = vec![0u8; self.bytes];

        for (i, pair) in self.pattern.iter().enumerate() {
            let v1 = get_pixel_safe(image, x + pair[0].0, y + pair[0].1);
            let v2 = get_pixel_safe(image, x + pair[1].0, y + pair[1].1);

            if v1 > v2 {
                bytes[i / 8] |= 1 << (i % 8);
            }
        }

        Descriptor::new(bytes, *kp)
    }
}

fn get_pixel_safe(image: &GrayImage, x: i32, y: i32) -> u8 {
    if x >= 0 && x < image.width() as i32 && y >= 0 && y < image.height() as i32 {
        image.get_pixel(x as u32, y as u32)[0]
    } else {
        0
    }
}
