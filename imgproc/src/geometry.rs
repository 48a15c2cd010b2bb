use crate::convolve::{map_coord, BorderMode};
use crate::resize::Interpolation;
use image::{GrayImage, RgbImage};
use nalgebra::{Matrix3, Point2, Vector3};
use rayon::prelude::*;

/// Integer corner and fractional offsets of a continuous sample position.
struct BilinearTaps {
    x0: isize,
    y0: isize,
    fx: f32,
    fy: f32,
}

impl BilinearTaps {
    fn at(x: f32, y: f32) -> Self {
        let xf = x.floor();
        let yf = y.floor();
        Self {
            x0: xf as isize,
            y0: yf as isize,
            fx: x - xf,
            fy: y - yf,
        }
    }

    fn blend(&self, v00: f32, v10: f32, v01: f32, v11: f32) -> f32 {
        let top = v00 + (v10 - v00) * self.fx;
        let bottom = v01 + (v11 - v01) * self.fx;
        top + (bottom - top) * self.fy
    }
}

fn read_gray(img: &GrayImage, x: isize, y: isize, border: BorderMode) -> f32 {
    let w = img.width() as usize;
    let h = img.height() as usize;
    if let (Some(ix), Some(iy)) = (map_coord(x, w, border), map_coord(y, h, border)) {
        img.as_raw()[iy * w + ix] as f32
    } else if let BorderMode::Constant(v) = border {
        v as f32
    } else {
        0.0
    }
}

fn read_rgb(img: &RgbImage, x: isize, y: isize, border: BorderMode) -> [f32; 3] {
    let w = img.width() as usize;
    let h = img.height() as usize;
    if let (Some(ix), Some(iy)) = (map_coord(x, w, border), map_coord(y, h, border)) {
        let raw = img.as_raw();
        let base = (iy * w + ix) * 3;
        [
            raw[base] as f32,
            raw[base + 1] as f32,
            raw[base + 2] as f32,
        ]
    } else if let BorderMode::Constant(v) = border {
        [v as f32; 3]
    } else {
        [0.0; 3]
    }
}

pub fn get_pixel_bilinear_with_border(img: &GrayImage, x: f32, y: f32, border: BorderMode) -> f32 {
    let taps = BilinearTaps::at(x, y);
    taps.blend(
        read_gray(img, taps.x0, taps.y0, border),
        read_gray(img, taps.x0 + 1, taps.y0, border),
        read_gray(img, taps.x0, taps.y0 + 1, border),
        read_gray(img, taps.x0 + 1, taps.y0 + 1, border),
    )
}

fn get_pixel_bilinear_rgb(img: &RgbImage, x: f32, y: f32, border: BorderMode) -> [f32; 3] {
    let taps = BilinearTaps::at(x, y);
    let c00 = read_rgb(img, taps.x0, taps.y0, border);
    let c10 = read_rgb(img, taps.x0 + 1, taps.y0, border);
    let c01 = read_rgb(img, taps.x0, taps.y0 + 1, border);
    let c11 = read_rgb(img, taps.x0 + 1, taps.y0 + 1, border);
    std::array::from_fn(|c| taps.blend(c00[c], c10[c], c01[c], c11[c]))
}

/// Bilinear RGB sample that reports whether the continuous coordinate
/// falls inside the image. Used by compositing code to mask contributions.
pub fn bilinear_sample_rgb(img: &RgbImage, x: f32, y: f32) -> Option<[f32; 3]> {
    if img.width() == 0 || img.height() == 0 {
        return None;
    }
    let max_x = (img.width() - 1) as f32;
    let max_y = (img.height() - 1) as f32;
    if x < 0.0 || y < 0.0 || x > max_x || y > max_y {
        return None;
    }
    Some(get_pixel_bilinear_rgb(img, x, y, BorderMode::Replicate))
}

/// Applies a 3x3 projective transform to a point, with perspective divide.
pub fn transform_point(matrix: &Matrix3<f32>, pt: &Point2<f32>) -> Point2<f32> {
    let v = matrix * Vector3::new(pt.x, pt.y, 1.0);
    if v.z.abs() > 1e-10 {
        Point2::new(v.x / v.z, v.y / v.z)
    } else {
        Point2::new(v.x, v.y)
    }
}

pub fn get_translation_matrix(dx: f32, dy: f32) -> Matrix3<f32> {
    let mut m = Matrix3::identity();
    m[(0, 2)] = dx;
    m[(1, 2)] = dy;
    m
}

/// Warps with inverse mapping: `matrix` takes destination coordinates to
/// source coordinates.
pub fn warp_perspective_ex(
    src: &GrayImage,
    matrix: &Matrix3<f32>,
    width: u32,
    height: u32,
    interpolation: Interpolation,
    border: BorderMode,
) -> GrayImage {
    let mut dst = GrayImage::new(width, height);
    if width == 0 || height == 0 {
        return dst;
    }

    let sample = |sx: f32, sy: f32| match interpolation {
        Interpolation::Nearest => read_gray(src, sx.round() as isize, sy.round() as isize, border),
        Interpolation::Linear => get_pixel_bilinear_with_border(src, sx, sy, border),
    };

    dst.as_mut()
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(row_y, row)| {
            for (col_x, out_px) in row.iter_mut().enumerate() {
                let dst_pt = Point2::new(col_x as f32, row_y as f32);
                let src_pt = transform_point(matrix, &dst_pt);
                *out_px = sample(src_pt.x, src_pt.y).clamp(0.0, 255.0) as u8;
            }
        });

    dst
}

pub fn warp_perspective(
    src: &GrayImage,
    matrix: &Matrix3<f32>,
    width: u32,
    height: u32,
) -> GrayImage {
    let border = BorderMode::Constant(0);
    warp_perspective_ex(src, matrix, width, height, Interpolation::Linear, border)
}

pub fn warp_perspective_rgb(
    src: &RgbImage,
    matrix: &Matrix3<f32>,
    width: u32,
    height: u32,
) -> RgbImage {
    let mut dst = RgbImage::new(width, height);
    if width == 0 || height == 0 {
        return dst;
    }

    dst.as_mut()
        .par_chunks_mut(width as usize * 3)
        .enumerate()
        .for_each(|(row_y, row)| {
            for (col_x, out_px) in row.chunks_exact_mut(3).enumerate() {
                let dst_pt = Point2::new(col_x as f32, row_y as f32);
                let src_pt = transform_point(matrix, &dst_pt);
                let rgb = get_pixel_bilinear_rgb(src, src_pt.x, src_pt.y, BorderMode::Constant(0));
                for (out_c, value) in out_px.iter_mut().zip(rgb) {
                    *out_c = value.clamp(0.0, 255.0) as u8;
                }
            }
        });

    dst
}
