//! Slider-driven processing pipeline.
//!
//! Stages run in a fixed order, each one consuming the previous stage's
//! output: erosion, dilation, resize, brightness, Canny.

use framelab_core::Frame;
use framelab_imgproc::{
    canny, convert_scale, convert_scale_rgb, create_morph_kernel, dilate, dilate_rgb, erode,
    erode_rgb, resize, resize_rgb, to_gray, Interpolation, MorphShape,
};
use log::warn;

pub const MAX_KERNEL_INDEX: u8 = 21;
pub const MAX_PERCENT: u32 = 200;
pub const MAX_CANNY_LOW: u32 = 100;
pub const MAX_CANNY_HIGH: u32 = 300;

/// Erosion or dilation settings. The slider index `size` selects a
/// `(2 * size + 1)` square footprint for the structuring element.
#[derive(Debug, Clone, PartialEq)]
pub struct MorphParams {
    pub active: bool,
    /// 0 rectangle, 1 cross, 2 ellipse.
    pub element: u8,
    pub size: u8,
}

impl Default for MorphParams {
    fn default() -> Self {
        Self {
            active: false,
            element: 0,
            size: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams {
    pub active: bool,
    pub percent: u32,
}

impl Default for ResizeParams {
    fn default() -> Self {
        Self {
            active: false,
            percent: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrightnessParams {
    pub active: bool,
    pub percent: u32,
}

impl Default for BrightnessParams {
    fn default() -> Self {
        Self {
            active: false,
            percent: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CannyParams {
    pub active: bool,
    pub low: u32,
    pub high: u32,
}

impl Default for CannyParams {
    fn default() -> Self {
        Self {
            active: false,
            low: 50,
            high: 150,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipelineParams {
    pub erosion: MorphParams,
    pub dilation: MorphParams,
    pub resize: ResizeParams,
    pub brightness: BrightnessParams,
    pub canny: CannyParams,
}

enum MorphOp {
    Erode,
    Dilate,
}

impl PipelineParams {
    /// Runs the active stages over `input` and returns the final frame.
    pub fn apply(&self, input: &Frame) -> Frame {
        let mut frame = input.clone();
        if self.erosion.active {
            frame = apply_morph(&frame, &self.erosion, MorphOp::Erode);
        }
        if self.dilation.active {
            frame = apply_morph(&frame, &self.dilation, MorphOp::Dilate);
        }
        if self.resize.active {
            frame = apply_resize(&frame, &self.resize);
        }
        if self.brightness.active {
            frame = apply_brightness(&frame, &self.brightness);
        }
        if self.canny.active {
            frame = apply_canny(&frame, &self.canny);
        }
        frame
    }
}

fn apply_morph(frame: &Frame, params: &MorphParams, op: MorphOp) -> Frame {
    let shape = MorphShape::from_index(params.element);
    let side = 2 * params.size as u32 + 1;
    let kernel = create_morph_kernel(shape, side, side);
    match (frame, op) {
        (Frame::Gray(img), MorphOp::Erode) => Frame::Gray(erode(img, &kernel, 1)),
        (Frame::Gray(img), MorphOp::Dilate) => Frame::Gray(dilate(img, &kernel, 1)),
        (Frame::Rgb(img), MorphOp::Erode) => Frame::Rgb(erode_rgb(img, &kernel, 1)),
        (Frame::Rgb(img), MorphOp::Dilate) => Frame::Rgb(dilate_rgb(img, &kernel, 1)),
    }
}

fn apply_resize(frame: &Frame, params: &ResizeParams) -> Frame {
    let scale = params.percent as f32 / 100.0;
    let width = (frame.width() as f32 * scale).round() as u32;
    let height = (frame.height() as f32 * scale).round() as u32;
    if width == 0 || height == 0 {
        warn!(
            "resize to {}% collapses the frame, stage skipped",
            params.percent
        );
        return frame.clone();
    }
    match frame {
        Frame::Gray(img) => Frame::Gray(resize(img, width, height, Interpolation::Linear)),
        Frame::Rgb(img) => Frame::Rgb(resize_rgb(img, width, height, Interpolation::Linear)),
    }
}

/// Maps the slider percent to a gain/offset pair: 100% is identity, 0%
/// fades to black, 200% doubles the gain and lifts the offset to +255.
fn apply_brightness(frame: &Frame, params: &BrightnessParams) -> Frame {
    let alpha = params.percent as f32 / 100.0;
    let beta = (params.percent as f32 - 100.0) * 2.55;
    match frame {
        Frame::Gray(img) => Frame::Gray(convert_scale(img, alpha, beta)),
        Frame::Rgb(img) => Frame::Rgb(convert_scale_rgb(img, alpha, beta)),
    }
}

fn apply_canny(frame: &Frame, params: &CannyParams) -> Frame {
    let gray = match frame {
        Frame::Gray(img) => img.clone(),
        Frame::Rgb(img) => to_gray(img),
    };
    Frame::Gray(canny(&gray, params.low as f32, params.high as f32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    fn test_rgb(width: u32, height: u32) -> Frame {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 3) as u8, (y * 5) as u8, ((x + y) * 2) as u8])
        });
        Frame::Rgb(img)
    }

    #[test]
    fn test_default_params_are_identity() {
        let frame = test_rgb(32, 24);
        let out = PipelineParams::default().apply(&frame);
        assert_eq!(out.dimensions(), (32, 24));
        match (&frame, &out) {
            (Frame::Rgb(a), Frame::Rgb(b)) => assert_eq!(a.as_raw(), b.as_raw()),
            _ => panic!("expected RGB output"),
        }
    }

    #[test]
    fn test_zero_size_morph_kernel_is_identity() {
        let frame = test_rgb(16, 16);
        let mut params = PipelineParams::default();
        params.erosion.active = true;
        let out = params.apply(&frame);
        match (&frame, &out) {
            (Frame::Rgb(a), Frame::Rgb(b)) => assert_eq!(a.as_raw(), b.as_raw()),
            _ => panic!("expected RGB output"),
        }
    }

    #[test]
    fn test_erosion_shrinks_bright_regions() {
        let mut img = image::GrayImage::new(20, 20);
        for y in 5..15 {
            for x in 5..15 {
                img.put_pixel(x, y, Luma([255]));
            }
        }
        let mut params = PipelineParams::default();
        params.erosion.active = true;
        params.erosion.size = 2;
        let out = params.apply(&Frame::Gray(img));
        match out {
            Frame::Gray(result) => {
                assert_eq!(result.get_pixel(10, 10)[0], 255);
                assert_eq!(result.get_pixel(5, 5)[0], 0);
            }
            Frame::Rgb(_) => panic!("expected gray output"),
        }
    }

    #[test]
    fn test_resize_halves_dimensions() {
        let frame = test_rgb(40, 30);
        let mut params = PipelineParams::default();
        params.resize.active = true;
        params.resize.percent = 50;
        let out = params.apply(&frame);
        assert_eq!(out.dimensions(), (20, 15));
    }

    #[test]
    fn test_resize_to_zero_is_skipped() {
        let frame = test_rgb(40, 30);
        let mut params = PipelineParams::default();
        params.resize.active = true;
        params.resize.percent = 0;
        let out = params.apply(&frame);
        assert_eq!(out.dimensions(), (40, 30));
    }

    #[test]
    fn test_brightness_extremes() {
        let frame = Frame::Rgb(RgbImage::from_pixel(8, 8, Rgb([100, 150, 200])));
        let mut params = PipelineParams::default();
        params.brightness.active = true;

        params.brightness.percent = 200;
        match params.apply(&frame) {
            Frame::Rgb(img) => assert_eq!(img.get_pixel(4, 4), &Rgb([255, 255, 255])),
            Frame::Gray(_) => panic!("expected RGB output"),
        }

        params.brightness.percent = 0;
        match params.apply(&frame) {
            Frame::Rgb(img) => assert_eq!(img.get_pixel(4, 4), &Rgb([0, 0, 0])),
            Frame::Gray(_) => panic!("expected RGB output"),
        }
    }

    #[test]
    fn test_brightness_midpoint_is_identity() {
        let frame = Frame::Rgb(RgbImage::from_pixel(8, 8, Rgb([100, 150, 200])));
        let mut params = PipelineParams::default();
        params.brightness.active = true;
        params.brightness.percent = 100;
        match params.apply(&frame) {
            Frame::Rgb(img) => assert_eq!(img.get_pixel(4, 4), &Rgb([100, 150, 200])),
            Frame::Gray(_) => panic!("expected RGB output"),
        }
    }

    #[test]
    fn test_canny_yields_gray_frame() {
        let frame = test_rgb(32, 32);
        let mut params = PipelineParams::default();
        params.canny.active = true;
        let out = params.apply(&frame);
        assert_eq!(out.channels(), 1);
        assert_eq!(out.dimensions(), (32, 32));
    }

    #[test]
    fn test_full_chain_ends_gray() {
        let frame = test_rgb(64, 48);
        let mut params = PipelineParams::default();
        params.erosion.active = true;
        params.erosion.size = 1;
        params.dilation.active = true;
        params.dilation.size = 1;
        params.resize.active = true;
        params.resize.percent = 150;
        params.brightness.active = true;
        params.brightness.percent = 120;
        params.canny.active = true;

        let out = params.apply(&frame);
        assert_eq!(out.channels(), 1);
        assert_eq!(out.dimensions(), (96, 72));
    }
}
