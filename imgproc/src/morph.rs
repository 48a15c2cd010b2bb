use framelab_core::{GrayImage, RgbImage};
use rayon::prelude::*;

/// Structuring element shapes, in the order the demo's element selector
/// exposes them (0 = rectangle, 1 = cross, 2 = ellipse).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MorphShape {
    Rectangle,
    Cross,
    Ellipse,
}

impl MorphShape {
    pub fn from_index(index: u8) -> Self {
        match index {
            0 => MorphShape::Rectangle,
            1 => MorphShape::Cross,
            _ => MorphShape::Ellipse,
        }
    }
}

/// Builds the offset list of a structuring element anchored at its center.
pub fn create_morph_kernel(shape: MorphShape, width: u32, height: u32) -> Vec<(i32, i32)> {
    let cx = width as i32 / 2;
    let cy = height as i32 / 2;
    let grid = || {
        (0..height as i32).flat_map(move |y| (0..width as i32).map(move |x| (x - cx, y - cy)))
    };

    match shape {
        MorphShape::Rectangle => grid().collect(),
        MorphShape::Cross => {
            let horizontal = (-cx..=cx).map(|i| (i, 0));
            let vertical = (-cy..=cy).filter(|&i| i != 0).map(|i| (0, i));
            horizontal.chain(vertical).collect()
        }
        MorphShape::Ellipse => {
            let rx = width as f32 / 2.0;
            let ry = height as f32 / 2.0;
            grid()
                .filter(|&(dx, dy)| {
                    let fx = dx as f32 / rx;
                    let fy = dy as f32 / ry;
                    fx * fx + fy * fy <= 1.0
                })
                .collect()
        }
    }
}

#[derive(Clone, Copy)]
enum Op {
    Erode,
    Dilate,
}

impl Op {
    /// Identity element of the fold, so taps outside the image drop out.
    fn seed(self) -> u8 {
        match self {
            Op::Erode => u8::MAX,
            Op::Dilate => 0,
        }
    }

    fn fold(self, acc: u8, value: u8) -> u8 {
        match self {
            Op::Erode => acc.min(value),
            Op::Dilate => acc.max(value),
        }
    }
}

/// Minimum filter over the kernel footprint, repeated `iterations` times.
pub fn erode(src: &GrayImage, kernel: &[(i32, i32)], iterations: u32) -> GrayImage {
    (0..iterations).fold(src.clone(), |img, _| morph_gray(&img, kernel, Op::Erode))
}

/// Maximum filter over the kernel footprint, repeated `iterations` times.
pub fn dilate(src: &GrayImage, kernel: &[(i32, i32)], iterations: u32) -> GrayImage {
    (0..iterations).fold(src.clone(), |img, _| morph_gray(&img, kernel, Op::Dilate))
}

fn morph_gray(src: &GrayImage, kernel: &[(i32, i32)], op: Op) -> GrayImage {
    let width = src.width() as i32;
    let height = src.height() as i32;
    let mut output = GrayImage::new(src.width(), src.height());
    if width == 0 || height == 0 {
        return output;
    }
    let src_data = src.as_raw();

    output
        .as_mut()
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as i32;
            for x in 0..width {
                let mut acc = op.seed();

                for &(kx, ky) in kernel {
                    let px = x + kx;
                    let py = y + ky;

                    if px >= 0 && px < width && py >= 0 && py < height {
                        acc = op.fold(acc, src_data[(py * width + px) as usize]);
                    }
                }

                row[x as usize] = acc;
            }
        });

    output
}

/// Per-channel erosion of an RGB image.
pub fn erode_rgb(src: &RgbImage, kernel: &[(i32, i32)], iterations: u32) -> RgbImage {
    (0..iterations).fold(src.clone(), |img, _| morph_rgb(&img, kernel, Op::Erode))
}

/// Per-channel dilation of an RGB image.
pub fn dilate_rgb(src: &RgbImage, kernel: &[(i32, i32)], iterations: u32) -> RgbImage {
    (0..iterations).fold(src.clone(), |img, _| morph_rgb(&img, kernel, Op::Dilate))
}

fn morph_rgb(src: &RgbImage, kernel: &[(i32, i32)], op: Op) -> RgbImage {
    let width = src.width() as i32;
    let height = src.height() as i32;
    let mut output = RgbImage::new(src.width(), src.height());
    if width == 0 || height == 0 {
        return output;
    }
    let src_data = src.as_raw();

    output
        .as_mut()
        .par_chunks_mut(width as usize * 3)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as i32;
            for x in 0..width {
                let mut acc = [op.seed(); 3];

                for &(kx, ky) in kernel {
                    let px = x + kx;
                    let py = y + ky;

                    if px >= 0 && px < width && py >= 0 && py < height {
                        let base = ((py * width + px) * 3) as usize;
                        for (c, channel) in acc.iter_mut().enumerate() {
                            *channel = op.fold(*channel, src_data[base + c]);
                        }
                    }
                }

                let base = x as usize * 3;
                row[base..base + 3].copy_from_slice(&acc);
            }
        });

    output
}
