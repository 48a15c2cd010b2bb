use image::{GrayImage, Luma};
use rayon::prelude::*;
use wide::f32x8;

use crate::convolve::{gaussian_blur_with_border, BorderMode};

/// tan(22.5 deg), the boundary between the axis and diagonal sectors.
const SECTOR_SPLIT: f32 = 0.414_213_56;

/// Per-pixel Sobel response over a blurred plane. `sector` quantises the
/// gradient direction into four bins so suppression knows which two
/// neighbours to compare against.
struct GradientMap {
    width: usize,
    height: usize,
    magnitude: Vec<f32>,
    sector: Vec<u8>,
}

impl GradientMap {
    fn compute(src: &GrayImage) -> Self {
        let width = src.width() as usize;
        let height = src.height() as usize;
        let plane: Vec<f32> = src.as_raw().iter().map(|&v| v as f32).collect();

        let mut magnitude = vec![0.0f32; width * height];
        let mut sector = vec![0u8; width * height];

        magnitude
            .par_chunks_mut(width)
            .zip(sector.par_chunks_mut(width))
            .enumerate()
            .for_each(|(y, (mag_row, sec_row))| {
                if y == 0 || y + 1 >= height {
                    return;
                }
                let above = &plane[(y - 1) * width..y * width];
                let center = &plane[y * width..(y + 1) * width];
                let below = &plane[(y + 1) * width..(y + 2) * width];

                let mut gx_row = vec![0.0f32; width];
                let mut gy_row = vec![0.0f32; width];
                sobel_row(above, center, below, &mut gx_row, &mut gy_row);

                for x in 1..width - 1 {
                    let gx = gx_row[x];
                    let gy = gy_row[x];
                    mag_row[x] = (gx * gx + gy * gy).sqrt();
                    sec_row[x] = classify_sector(gx, gy);
                }
            });

        Self {
            width,
            height,
            magnitude,
            sector,
        }
    }

    /// Non-maximum suppression along the gradient direction. Keeps a pixel
    /// only when it is at least as strong as both sector neighbours.
    fn thin(&self) -> Vec<f32> {
        let width = self.width;
        let w = width as isize;
        // Offsets to the neighbour pair for each sector code.
        let neighbours: [(isize, isize); 4] = [(-1, 1), (1 - w, w - 1), (-w, w), (-w - 1, w + 1)];

        let mut out = vec![0.0f32; width * self.height];
        out.par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, out_row)| {
                if y == 0 || y + 1 >= self.height {
                    return;
                }
                for x in 1..width - 1 {
                    let idx = y * width + x;
                    let m = self.magnitude[idx];
                    let (da, db) = neighbours[self.sector[idx] as usize];
                    let a = self.magnitude[(idx as isize + da) as usize];
                    let b = self.magnitude[(idx as isize + db) as usize];
                    if m >= a && m >= b {
                        out_row[x] = m;
                    }
                }
            });
        out
    }
}

/// 3x3 Sobel over one row, vectorised eight pixels at a time with a scalar
/// tail. Border columns are left at zero.
fn sobel_row(above: &[f32], center: &[f32], below: &[f32], gx: &mut [f32], gy: &mut [f32]) {
    let width = center.len();
    if width < 3 {
        return;
    }

    let lanes = |s: &[f32]| -> f32x8 {
        let mut buf = [0.0f32; 8];
        buf.copy_from_slice(&s[..8]);
        f32x8::from(buf)
    };

    let mut x = 1;
    while x + 8 < width - 1 {
        let tl = lanes(&above[x - 1..]);
        let tc = lanes(&above[x..]);
        let tr = lanes(&above[x + 1..]);
        let ml = lanes(&center[x - 1..]);
        let mr = lanes(&center[x + 1..]);
        let bl = lanes(&below[x - 1..]);
        let bc = lanes(&below[x..]);
        let br = lanes(&below[x + 1..]);

        let two = f32x8::splat(2.0);
        let dx = tr - tl + (mr - ml) * two + br - bl;
        let dy = bl - tl + (bc - tc) * two + br - tr;

        gx[x..x + 8].copy_from_slice(&dx.to_array());
        gy[x..x + 8].copy_from_slice(&dy.to_array());
        x += 8;
    }

    for cx in x..width - 1 {
        gx[cx] = above[cx + 1] - above[cx - 1]
            + 2.0 * (center[cx + 1] - center[cx - 1])
            + below[cx + 1]
            - below[cx - 1];
        gy[cx] = below[cx - 1] - above[cx - 1]
            + 2.0 * (below[cx] - above[cx])
            + below[cx + 1]
            - above[cx + 1];
    }
}

/// Sector codes: 0 horizontal gradient, 2 vertical, 1 and 3 the two
/// diagonals split on the sign of gx*gy.
fn classify_sector(gx: f32, gy: f32) -> u8 {
    let ax = gx.abs();
    let ay = gy.abs();
    if ay <= ax * SECTOR_SPLIT {
        0
    } else if ax <= ay * SECTOR_SPLIT {
        2
    } else if gx * gy > 0.0 {
        1
    } else {
        3
    }
}

/// Double-threshold hysteresis. Strong pixels seed a flood fill that
/// promotes eight-connected weak pixels.
fn link_edges(thinned: &[f32], width: usize, height: usize, low: f32, high: f32) -> GrayImage {
    let mut strong = vec![false; width * height];
    let mut weak = vec![false; width * height];
    let mut queue: Vec<usize> = Vec::new();

    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            let idx = y * width + x;
            if thinned[idx] >= high {
                strong[idx] = true;
                queue.push(idx);
            } else if thinned[idx] >= low {
                weak[idx] = true;
            }
        }
    }

    while let Some(idx) = queue.pop() {
        let x = idx % width;
        let y = idx / width;
        for ny in y.saturating_sub(1)..=(y + 1).min(height - 1) {
            for nx in x.saturating_sub(1)..=(x + 1).min(width - 1) {
                let nidx = ny * width + nx;
                if weak[nidx] && !strong[nidx] {
                    strong[nidx] = true;
                    queue.push(nidx);
                }
            }
        }
    }

    let mut out = GrayImage::new(width as u32, height as u32);
    for (px, &on) in out.pixels_mut().zip(strong.iter()) {
        if on {
            *px = Luma([255]);
        }
    }
    out
}

/// Canny edge detector. Output pixels are 255 on edges and 0 elsewhere.
/// `high_threshold` is raised to `low_threshold` when it is below it.
pub fn canny(src: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    if src.width() < 3 || src.height() < 3 {
        return GrayImage::new(src.width(), src.height());
    }

    let blurred = gaussian_blur_with_border(src, 1.0, BorderMode::Reflect101);
    let width = blurred.width() as usize;
    let height = blurred.height() as usize;

    let gradients = GradientMap::compute(&blurred);
    let thinned = gradients.thin();
    let high = high_threshold.max(low_threshold);
    link_edges(&thinned, width, height, low_threshold, high)
}
