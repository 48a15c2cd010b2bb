use wide::*;

/// Horizontal 1D convolution of one padded row.
///
/// `padded` must hold `out.len() + 2 * radius` samples so every tap of
/// the kernel reads in bounds: `out[i] = sum_k padded[i + k] * kernel[k]`.
pub fn convolve_row_1d(padded: &[f32], out: &mut [f32], kernel: &[f32], radius: usize) {
    debug_assert_eq!(padded.len(), out.len() + 2 * radius);
    let width = out.len();
    let mut x = 0;

    while x + 8 <= width {
        let mut sum = f32x8::ZERO;
        for (k, &w) in kernel.iter().enumerate() {
            let mut vals = [0.0f32; 8];
            vals.copy_from_slice(&padded[x + k..x + k + 8]);
            sum += f32x8::from(vals) * f32x8::splat(w);
        }
        let res: [f32; 8] = sum.into();
        out[x..x + 8].copy_from_slice(&res);
        x += 8;
    }

    for cx in x..width {
        let mut sum = 0.0f32;
        for (k, &w) in kernel.iter().enumerate() {
            sum += padded[cx + k] * w;
        }
        out[cx] = sum;
    }
}

const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

/// Converts interleaved RGB bytes to luma bytes, eight pixels per step.
///
/// `rgb` holds `3 * gray.len()` bytes.
pub fn rgb_to_gray_simd(rgb: &[u8], gray: &mut [u8]) {
    debug_assert_eq!(rgb.len(), gray.len() * 3);
    let count = gray.len();
    let wr = f32x8::splat(LUMA_R);
    let wg = f32x8::splat(LUMA_G);
    let wb = f32x8::splat(LUMA_B);

    let mut i = 0;
    while i + 8 <= count {
        let mut r = [0.0f32; 8];
        let mut g = [0.0f32; 8];
        let mut b = [0.0f32; 8];
        for j in 0..8 {
            let base = (i + j) * 3;
            r[j] = rgb[base] as f32;
            g[j] = rgb[base + 1] as f32;
            b[j] = rgb[base + 2] as f32;
        }

        let luma = f32x8::from(r) * wr + f32x8::from(g) * wg + f32x8::from(b) * wb;
        let res: [f32; 8] = luma.into();
        for j in 0..8 {
            gray[i + j] = (res[j] + 0.5).min(255.0) as u8;
        }
        i += 8;
    }

    for px in i..count {
        let base = px * 3;
        let luma = rgb[base] as f32 * LUMA_R
            + rgb[base + 1] as f32 * LUMA_G
            + rgb[base + 2] as f32 * LUMA_B;
        gray[px] = (luma + 0.5).min(255.0) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convolve_row_matches_scalar() {
        let kernel = [0.25f32, 0.5, 0.25];
        let radius = 1;
        let width = 21;
        let padded: Vec<f32> = (0..width + 2 * radius).map(|i| (i * 7 % 31) as f32).collect();

        let mut out = vec![0.0f32; width];
        convolve_row_1d(&padded, &mut out, &kernel, radius);

        for x in 0..width {
            let expected: f32 = kernel
                .iter()
                .enumerate()
                .map(|(k, &w)| padded[x + k] * w)
                .sum();
            assert!((out[x] - expected).abs() < 1e-4, "mismatch at {x}");
        }
    }

    #[test]
    fn gray_conversion_matches_scalar_weights() {
        let count = 19;
        let rgb: Vec<u8> = (0..count * 3).map(|i| (i * 13 % 256) as u8).collect();
        let mut gray = vec![0u8; count];
        rgb_to_gray_simd(&rgb, &mut gray);

        for px in 0..count {
            let base = px * 3;
            let expected = (rgb[base] as f32 * LUMA_R
                + rgb[base + 1] as f32 * LUMA_G
                + rgb[base + 2] as f32 * LUMA_B
                + 0.5) as u8;
            assert_eq!(gray[px], expected, "mismatch at {px}");
        }
    }

    #[test]
    fn gray_conversion_extremes() {
        let rgb = [0u8, 0, 0, 255, 255, 255];
        let mut gray = [0u8; 2];
        rgb_to_gray_simd(&rgb, &mut gray);
        assert_eq!(gray[0], 0);
        assert_eq!(gray[1], 255);
    }
}
