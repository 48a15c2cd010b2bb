use crate::simd::convolve_row_1d;
use image::GrayImage;
use rayon::prelude::*;
use wide::*;

/// How convolution reads samples that fall outside the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderMode {
    /// Out-of-range reads yield this value.
    Constant(u8),
    /// The nearest edge pixel is repeated.
    Replicate,
    /// Mirror including the edge pixel: `cba|abc|cba`.
    Reflect,
    /// Mirror excluding the edge pixel: `cb|abc|ba`.
    Reflect101,
    /// The image tiles periodically.
    Wrap,
}

/// Maps a possibly out-of-range coordinate into `0..len`, or `None` for
/// `Constant` mode outside the image.
pub(crate) fn map_coord(coord: isize, len: usize, mode: BorderMode) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let n = len as isize;
    let mapped = match mode {
        BorderMode::Constant(_) => {
            if (0..n).contains(&coord) {
                coord
            } else {
                return None;
            }
        }
        BorderMode::Replicate => coord.clamp(0, n - 1),
        BorderMode::Wrap => coord.rem_euclid(n),
        BorderMode::Reflect => fold_back(coord, n, 2 * n, 1),
        BorderMode::Reflect101 => {
            if n == 1 {
                0
            } else {
                fold_back(coord, n, 2 * n - 2, 0)
            }
        }
    };
    Some(mapped as usize)
}

/// Folds a coordinate into `0..n` for the two mirror modes. `edge_bias`
/// is 1 when the edge sample itself is part of the mirror image.
fn fold_back(coord: isize, n: isize, period: isize, edge_bias: isize) -> isize {
    let c = coord.rem_euclid(period);
    if c < n {
        c
    } else {
        period - c - edge_bias
    }
}

/// Normalised 1D Gaussian with `size` taps. `size` must be odd.
pub fn gaussian_kernel_1d(sigma: f32, size: usize) -> Vec<f32> {
    assert!(size % 2 == 1, "gaussian taps need an odd count");
    let center = (size / 2) as f32;
    let denom = 2.0 * sigma * sigma;

    let mut kernel: Vec<f32> = (0..size)
        .map(|i| {
            let x = i as f32 - center;
            (-(x * x) / denom).exp()
        })
        .collect();

    let sum: f32 = kernel.iter().sum();
    if sum > 0.0 {
        for v in &mut kernel {
            *v /= sum;
        }
    }
    kernel
}

fn border_fill(border: BorderMode) -> f32 {
    match border {
        BorderMode::Constant(v) => v as f32,
        _ => 0.0,
    }
}

/// One source row extended by `radius` samples on each side according to
/// the border mode, ready for a valid-range 1D convolution.
fn padded_row(src_row: &[u8], radius: usize, border: BorderMode) -> Vec<f32> {
    let width = src_row.len();
    let fill = border_fill(border);
    (0..width + 2 * radius)
        .map(|i| {
            let x = i as isize - radius as isize;
            match map_coord(x, width, border) {
                Some(ix) => src_row[ix] as f32,
                None => fill,
            }
        })
        .collect()
}

/// Vertical tap accumulation for one output row, eight columns per SIMD
/// step with a scalar tail.
fn convolve_column_row(
    tmp: &[f32],
    row_out: &mut [u8],
    y: usize,
    width: usize,
    height: usize,
    kernel: &[f32],
    border: BorderMode,
) {
    let radius = (kernel.len() / 2) as isize;
    let fill = border_fill(border);
    let simd_end = width - width % 8;

    for x in (0..simd_end).step_by(8) {
        let mut acc = f32x8::ZERO;
        for (tap, &weight) in kernel.iter().enumerate() {
            let sy = y as isize + tap as isize - radius;
            let lane = match map_coord(sy, height, border) {
                Some(iy) => {
                    let start = iy * width + x;
                    let mut vals = [0.0f32; 8];
                    vals.copy_from_slice(&tmp[start..start + 8]);
                    f32x8::from(vals)
                }
                None => f32x8::splat(fill),
            };
            acc += lane * f32x8::splat(weight);
        }
        for (i, v) in acc.to_array().iter().enumerate() {
            row_out[x + i] = v.clamp(0.0, 255.0) as u8;
        }
    }

    for x in simd_end..width {
        let mut acc = 0.0f32;
        for (tap, &weight) in kernel.iter().enumerate() {
            let sy = y as isize + tap as isize - radius;
            let sample = match map_coord(sy, height, border) {
                Some(iy) => tmp[iy * width + x],
                None => fill,
            };
            acc += sample * weight;
        }
        row_out[x] = acc.clamp(0.0, 255.0) as u8;
    }
}

/// Separable convolution with the same odd-sized kernel on both axes.
/// Rows are processed in parallel in each pass.
pub fn separable_convolve(image: &GrayImage, kernel_1d: &[f32], border: BorderMode) -> GrayImage {
    assert!(kernel_1d.len() % 2 == 1, "kernel size must be odd");

    let width = image.width() as usize;
    let height = image.height() as usize;
    let mut out = GrayImage::new(image.width(), image.height());
    if width == 0 || height == 0 {
        return out;
    }

    let radius = kernel_1d.len() / 2;
    let src = image.as_raw();

    let mut tmp = vec![0.0f32; width * height];
    tmp.par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row_out)| {
            let padded = padded_row(&src[y * width..(y + 1) * width], radius, border);
            convolve_row_1d(&padded, row_out, kernel_1d, radius);
        });

    out.as_mut()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row_out)| {
            convolve_column_row(&tmp, row_out, y, width, height, kernel_1d, border);
        });

    out
}

/// Gaussian blur with an explicit border mode. The kernel size follows
/// the sigma, covering three standard deviations on each side.
pub fn gaussian_blur_with_border(image: &GrayImage, sigma: f32, border: BorderMode) -> GrayImage {
    let taps = ((sigma * 6.0).ceil() as usize) | 1;
    let kernel = gaussian_kernel_1d(sigma, taps);
    separable_convolve(image, &kernel, border)
}

pub fn gaussian_blur(image: &GrayImage, sigma: f32) -> GrayImage {
    gaussian_blur_with_border(image, sigma, BorderMode::Replicate)
}
