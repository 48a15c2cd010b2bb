use crate::simd::rgb_to_gray_simd;
use image::{GrayImage, RgbImage};
use rayon::prelude::*;

pub fn convert_gray_to_rgb(gray: &GrayImage) -> RgbImage {
    let (w, h) = gray.dimensions();
    let count = (w * h) as usize;
    let mut rgb_data = vec![0u8; count * 3];
    let gray_data = gray.as_raw();

    rgb_data
        .par_chunks_mut(3)
        .zip(gray_data.par_iter())
        .for_each(|(rgb_pixel, &g)| {
            rgb_pixel[0] = g;
            rgb_pixel[1] = g;
            rgb_pixel[2] = g;
        });

    RgbImage::from_raw(w, h, rgb_data).unwrap_or_else(|| RgbImage::new(w, h))
}

pub fn convert_rgb_to_gray(rgb: &RgbImage) -> GrayImage {
    let (w, h) = rgb.dimensions();
    let count = (w * h) as usize;
    let mut gray_data = vec![0u8; count];
    let rgb_data = rgb.as_raw();

    if count > 0 {
        // Parallel over coarse chunks, SIMD within each chunk.
        gray_data
            .par_chunks_mut(4096)
            .zip(rgb_data.par_chunks(4096 * 3))
            .for_each(|(g_chunk, rgb_chunk)| {
                rgb_to_gray_simd(rgb_chunk, g_chunk);
            });
    }

    GrayImage::from_raw(w, h, gray_data).unwrap_or_else(|| GrayImage::new(w, h))
}

pub fn to_gray(img: &RgbImage) -> GrayImage {
    convert_rgb_to_gray(img)
}

pub fn to_rgb(img: &GrayImage) -> RgbImage {
    convert_gray_to_rgb(img)
}

/// Saturating per-pixel linear transform `alpha * p + beta`.
pub fn convert_scale(src: &GrayImage, alpha: f32, beta: f32) -> GrayImage {
    let mut output = src.clone();
    output.as_mut().par_iter_mut().for_each(|p| {
        *p = (*p as f32 * alpha + beta).clamp(0.0, 255.0) as u8;
    });
    output
}

/// RGB variant of [`convert_scale`], applied to every channel.
pub fn convert_scale_rgb(src: &RgbImage, alpha: f32, beta: f32) -> RgbImage {
    let mut output = src.clone();
    output.as_mut().par_iter_mut().for_each(|p| {
        *p = (*p as f32 * alpha + beta).clamp(0.0, 255.0) as u8;
    });
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    #[test]
    fn gray_to_rgb_replicates_channel() {
        let gray = GrayImage::from_pixel(3, 2, Luma([99]));
        let rgb = convert_gray_to_rgb(&gray);
        assert_eq!(rgb.get_pixel(2, 1), &Rgb([99, 99, 99]));
    }

    #[test]
    fn rgb_to_gray_uses_luma_weights() {
        let rgb = RgbImage::from_pixel(9, 7, Rgb([255, 0, 0]));
        let gray = convert_rgb_to_gray(&rgb);
        // 0.299 * 255 rounds to 76.
        assert_eq!(gray.get_pixel(4, 3)[0], 76);
    }

    #[test]
    fn green_dominates_luma() {
        let r = convert_rgb_to_gray(&RgbImage::from_pixel(1, 1, Rgb([255, 0, 0])));
        let g = convert_rgb_to_gray(&RgbImage::from_pixel(1, 1, Rgb([0, 255, 0])));
        let b = convert_rgb_to_gray(&RgbImage::from_pixel(1, 1, Rgb([0, 0, 255])));
        assert!(g.get_pixel(0, 0)[0] > r.get_pixel(0, 0)[0]);
        assert!(r.get_pixel(0, 0)[0] > b.get_pixel(0, 0)[0]);
    }

    #[test]
    fn convert_scale_identity() {
        let src = GrayImage::from_pixel(4, 4, Luma([123]));
        let out = convert_scale(&src, 1.0, 0.0);
        assert_eq!(out.as_raw(), src.as_raw());
    }

    #[test]
    fn convert_scale_saturates_both_ends() {
        let mut src = GrayImage::new(2, 1);
        src.put_pixel(0, 0, Luma([250]));
        src.put_pixel(1, 0, Luma([5]));

        let bright = convert_scale(&src, 2.0, 100.0);
        assert_eq!(bright.get_pixel(0, 0)[0], 255);

        let dark = convert_scale(&src, 0.5, -200.0);
        assert_eq!(dark.get_pixel(1, 0)[0], 0);
    }

    #[test]
    fn convert_scale_rgb_applies_per_channel() {
        let src = RgbImage::from_pixel(2, 2, Rgb([100, 50, 200]));
        let out = convert_scale_rgb(&src, 1.5, 10.0);
        assert_eq!(out.get_pixel(0, 0), &Rgb([160, 85, 255]));
    }
}
