use image::{GrayImage, RgbImage};
use rayon::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Nearest,
    Linear,
}

/// Ratio that maps destination index to source index with the first and
/// last samples aligned. Degenerate axes collapse to index zero.
fn axis_ratio(src_len: u32, dst_len: u32) -> f32 {
    if dst_len > 1 && src_len > 1 {
        (src_len - 1) as f32 / (dst_len - 1) as f32
    } else {
        0.0
    }
}

/// Source index pair and blend weight for one destination index.
struct AxisTap {
    lo: u32,
    hi: u32,
    t: f32,
}

/// Precomputed linear taps for a whole axis, so the per-pixel loop only
/// does lookups.
fn linear_taps(src_len: u32, dst_len: u32) -> Vec<AxisTap> {
    let ratio = axis_ratio(src_len, dst_len);
    (0..dst_len)
        .map(|i| {
            let f = i as f32 * ratio;
            let lo = f as u32;
            AxisTap {
                lo,
                hi: (lo + 1).min(src_len - 1),
                t: f - lo as f32,
            }
        })
        .collect()
}

fn nearest_taps(src_len: u32, dst_len: u32) -> Vec<u32> {
    let ratio = src_len as f32 / dst_len as f32;
    (0..dst_len)
        .map(|i| ((i as f32 * ratio) as u32).min(src_len - 1))
        .collect()
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

pub fn resize(src: &GrayImage, width: u32, height: u32, interpolation: Interpolation) -> GrayImage {
    if width == 0 || height == 0 || src.width() == 0 || src.height() == 0 {
        return GrayImage::new(0, 0);
    }

    match interpolation {
        Interpolation::Nearest => resize_nearest(src, width, height),
        Interpolation::Linear => resize_linear(src, width, height),
    }
}

fn resize_nearest(src: &GrayImage, width: u32, height: u32) -> GrayImage {
    let mut dst = GrayImage::new(width, height);
    let cols = nearest_taps(src.width(), width);
    let rows = nearest_taps(src.height(), height);

    dst.as_mut()
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(y, row_out)| {
            let sy = rows[y];
            for (out_px, &sx) in row_out.iter_mut().zip(&cols) {
                *out_px = src.get_pixel(sx, sy)[0];
            }
        });
    dst
}

fn resize_linear(src: &GrayImage, width: u32, height: u32) -> GrayImage {
    let mut dst = GrayImage::new(width, height);
    let cols = linear_taps(src.width(), width);
    let rows = linear_taps(src.height(), height);

    dst.as_mut()
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(y, row_out)| {
            let ry = &rows[y];
            for (out_px, cx) in row_out.iter_mut().zip(&cols) {
                let v00 = src.get_pixel(cx.lo, ry.lo)[0] as f32;
                let v10 = src.get_pixel(cx.hi, ry.lo)[0] as f32;
                let v01 = src.get_pixel(cx.lo, ry.hi)[0] as f32;
                let v11 = src.get_pixel(cx.hi, ry.hi)[0] as f32;

                let top = lerp(v00, v10, cx.t);
                let bottom = lerp(v01, v11, cx.t);
                *out_px = lerp(top, bottom, ry.t).clamp(0.0, 255.0) as u8;
            }
        });

    dst
}

pub fn resize_rgb(
    src: &RgbImage,
    width: u32,
    height: u32,
    interpolation: Interpolation,
) -> RgbImage {
    if width == 0 || height == 0 || src.width() == 0 || src.height() == 0 {
        return RgbImage::new(0, 0);
    }

    match interpolation {
        Interpolation::Nearest => resize_rgb_nearest(src, width, height),
        Interpolation::Linear => resize_rgb_linear(src, width, height),
    }
}

fn resize_rgb_nearest(src: &RgbImage, width: u32, height: u32) -> RgbImage {
    let mut dst = RgbImage::new(width, height);
    let cols = nearest_taps(src.width(), width);
    let rows = nearest_taps(src.height(), height);

    dst.as_mut()
        .par_chunks_mut(width as usize * 3)
        .enumerate()
        .for_each(|(y, row_out)| {
            let sy = rows[y];
            for (out_px, &sx) in row_out.chunks_exact_mut(3).zip(&cols) {
                out_px.copy_from_slice(&src.get_pixel(sx, sy).0);
            }
        });
    dst
}

fn resize_rgb_linear(src: &RgbImage, width: u32, height: u32) -> RgbImage {
    let mut dst = RgbImage::new(width, height);
    let cols = linear_taps(src.width(), width);
    let rows = linear_taps(src.height(), height);

    dst.as_mut()
        .par_chunks_mut(width as usize * 3)
        .enumerate()
        .for_each(|(y, row_out)| {
            let ry = &rows[y];
            for (out_px, cx) in row_out.chunks_exact_mut(3).zip(&cols) {
                let p00 = src.get_pixel(cx.lo, ry.lo);
                let p10 = src.get_pixel(cx.hi, ry.lo);
                let p01 = src.get_pixel(cx.lo, ry.hi);
                let p11 = src.get_pixel(cx.hi, ry.hi);

                for c in 0..3 {
                    let top = lerp(p00[c] as f32, p10[c] as f32, cx.t);
                    let bottom = lerp(p01[c] as f32, p11[c] as f32, cx.t);
                    out_px[c] = lerp(top, bottom, ry.t).clamp(0.0, 255.0) as u8;
                }
            }
        });

    dst
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn upscale_and_downscale_dimensions() {
        let img = GrayImage::from_pixel(100, 60, Luma([42]));

        let up = resize(&img, 200, 120, Interpolation::Linear);
        assert_eq!(up.dimensions(), (200, 120));

        let down = resize(&img, 50, 30, Interpolation::Linear);
        assert_eq!(down.dimensions(), (50, 30));
    }

    #[test]
    fn zero_target_produces_empty_image() {
        let img = GrayImage::from_pixel(10, 10, Luma([9]));
        let out = resize(&img, 0, 7, Interpolation::Linear);
        assert_eq!(out.width() * out.height(), 0);
    }

    #[test]
    fn constant_image_stays_constant() {
        let img = GrayImage::from_pixel(13, 9, Luma([111]));
        let out = resize(&img, 40, 21, Interpolation::Linear);
        assert!(out.pixels().all(|p| p[0] == 111));
    }

    #[test]
    fn corners_are_preserved_by_linear() {
        let mut img = GrayImage::new(4, 4);
        img.put_pixel(0, 0, Luma([10]));
        img.put_pixel(3, 0, Luma([60]));
        img.put_pixel(0, 3, Luma([120]));
        img.put_pixel(3, 3, Luma([240]));

        let out = resize(&img, 9, 9, Interpolation::Linear);
        assert_eq!(out.get_pixel(0, 0)[0], 10);
        assert_eq!(out.get_pixel(8, 0)[0], 60);
        assert_eq!(out.get_pixel(0, 8)[0], 120);
        assert_eq!(out.get_pixel(8, 8)[0], 240);
    }

    #[test]
    fn nearest_keeps_original_values_only() {
        let mut img = GrayImage::new(2, 1);
        img.put_pixel(0, 0, Luma([0]));
        img.put_pixel(1, 0, Luma([200]));

        let out = resize(&img, 8, 1, Interpolation::Nearest);
        assert!(out.pixels().all(|p| p[0] == 0 || p[0] == 200));
    }

    #[test]
    fn single_pixel_source_fills_target() {
        let img = GrayImage::from_pixel(1, 1, Luma([77]));
        let out = resize(&img, 5, 5, Interpolation::Linear);
        assert_eq!(out.dimensions(), (5, 5));
        assert!(out.pixels().all(|p| p[0] == 77));
    }

    #[test]
    fn taps_align_first_and_last_samples() {
        let cols = linear_taps(4, 9);
        assert_eq!(cols[0].lo, 0);
        assert!(cols[0].t.abs() < 1e-6);
        assert_eq!(cols[8].lo, 3);
        assert!(cols[8].t.abs() < 1e-6);
    }

    #[test]
    fn rgb_resize_keeps_channel_order() {
        let img = RgbImage::from_pixel(6, 6, image::Rgb([200, 100, 50]));
        let out = resize_rgb(&img, 12, 3, Interpolation::Linear);
        assert_eq!(out.dimensions(), (12, 3));
        assert!(out.pixels().all(|p| p.0 == [200, 100, 50]));
    }
}
