use framelab_imgproc::*;
use image::{GrayImage, Luma, Rgb, RgbImage};

fn gradient_image(width: u32, height: u32) -> GrayImage {
    let mut img = GrayImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            img.put_pixel(x, y, Luma([((x * 255) / width.max(1)) as u8]));
        }
    }
    img
}

/// A dark canvas with one bright square block.
fn block_image(width: u32, height: u32, x0: u32, y0: u32, side: u32) -> GrayImage {
    let mut img = GrayImage::new(width, height);
    for y in y0..(y0 + side).min(height) {
        for x in x0..(x0 + side).min(width) {
            img.put_pixel(x, y, Luma([255]));
        }
    }
    img
}

#[test]
fn test_resize_round_trip_keeps_block_position() {
    let img = block_image(64, 64, 24, 24, 16);

    let down = resize(&img, 32, 32, Interpolation::Linear);
    assert_eq!(down.dimensions(), (32, 32));

    let up = resize(&down, 64, 64, Interpolation::Linear);
    assert_eq!(up.dimensions(), (64, 64));
    // Block interior survives a half-size round trip; far corners stay dark.
    assert!(up.get_pixel(31, 31)[0] > 200);
    assert_eq!(up.get_pixel(2, 2)[0], 0);
}

#[test]
fn test_resize_rgb_keeps_flat_regions_flat() {
    let img = RgbImage::from_pixel(11, 7, Rgb([31, 64, 180]));
    let resized = resize_rgb(&img, 29, 13, Interpolation::Linear);
    assert_eq!(resized.dimensions(), (29, 13));
    assert!(resized.pixels().all(|p| *p == Rgb([31, 64, 180])));
}

#[test]
fn test_opening_removes_speckle_keeps_blob() {
    let mut img = block_image(20, 20, 4, 4, 8);
    img.put_pixel(15, 15, Luma([255]));

    let kernel = create_morph_kernel(MorphShape::Rectangle, 3, 3);
    let opened = dilate(&erode(&img, &kernel, 1), &kernel, 1);

    // Erode-then-dilate erases the lone pixel but rebuilds the blob.
    assert_eq!(opened.get_pixel(15, 15)[0], 0);
    assert_eq!(opened.get_pixel(7, 7)[0], 255);
    assert_eq!(opened.get_pixel(4, 4)[0], 255);
}

#[test]
fn test_kernel_size_follows_slider_rule() {
    // Slider value n produces a (2n+1) square element.
    for n in [0u32, 1, 5, 21] {
        let side = 2 * n + 1;
        let kernel = create_morph_kernel(MorphShape::Rectangle, side, side);
        assert_eq!(kernel.len(), (side * side) as usize);
        let max_off = kernel.iter().map(|&(x, y)| x.abs().max(y.abs())).max();
        assert_eq!(max_off, Some(n as i32));
    }
}

#[test]
fn test_translation_warp_round_trips() {
    let mut img = GrayImage::new(16, 12);
    img.put_pixel(9, 4, Luma([200]));

    let fwd = get_translation_matrix(-3.0, -5.0);
    let back = get_translation_matrix(3.0, 5.0);
    let there = warp_perspective(&img, &fwd, 16, 12);
    let home = warp_perspective(&there, &back, 16, 12);

    assert_eq!(there.get_pixel(12, 9)[0], 200);
    assert_eq!(there.get_pixel(9, 4)[0], 0);
    assert_eq!(home.get_pixel(9, 4)[0], 200);
}

#[test]
fn test_color_round_trip() {
    let gray = gradient_image(33, 9);
    let rgb = to_rgb(&gray);
    let back = to_gray(&rgb);
    for (a, b) in gray.as_raw().iter().zip(back.as_raw()) {
        assert!((*a as i32 - *b as i32).abs() <= 1);
    }
}

#[test]
fn test_brightness_pipeline_semantics() {
    // percent 100 -> alpha 1, beta 0 (identity); 200 -> alpha 2, beta 255.
    let img = RgbImage::from_pixel(5, 5, Rgb([10, 100, 250]));

    let ident = convert_scale_rgb(&img, 1.0, 0.0);
    assert_eq!(ident.get_pixel(0, 0), &Rgb([10, 100, 250]));

    let max = convert_scale_rgb(&img, 2.0, 255.0);
    assert_eq!(max.get_pixel(0, 0), &Rgb([255, 255, 255]));

    let min = convert_scale_rgb(&img, 0.0, -255.0);
    assert_eq!(min.get_pixel(0, 0), &Rgb([0, 0, 0]));
}

#[test]
fn test_canny_marks_square_outline() {
    let img = block_image(48, 48, 12, 12, 24);

    let edges = canny(&img, 50.0, 150.0);

    let edge_count = edges.as_raw().iter().filter(|&&v| v == 255).count();
    // Perimeter of a 24px square, give or take blur spread.
    assert!(edge_count > 40, "too few edge pixels: {edge_count}");
    assert!(edge_count < 400, "edge response too wide: {edge_count}");

    // Deep inside the square is flat, so no edges there.
    assert_eq!(edges.get_pixel(24, 24)[0], 0);
}

#[test]
fn test_full_stage_chain() {
    // Erode -> dilate -> resize -> brightness -> canny, mirroring the
    // processing order of the interactive demo.
    let mut img = RgbImage::new(40, 40);
    for y in 10..30 {
        for x in 10..30 {
            img.put_pixel(x, y, Rgb([220, 180, 140]));
        }
    }

    let kernel = create_morph_kernel(MorphShape::Ellipse, 3, 3);
    let eroded = erode_rgb(&img, &kernel, 1);
    let dilated = dilate_rgb(&eroded, &kernel, 1);
    let resized = resize_rgb(&dilated, 60, 60, Interpolation::Linear);
    let brightened = convert_scale_rgb(&resized, 1.2, 12.75);
    let edges = canny(&to_gray(&brightened), 50.0, 150.0);

    assert_eq!(edges.dimensions(), (60, 60));
    assert!(edges.as_raw().iter().any(|&v| v == 255));
}
