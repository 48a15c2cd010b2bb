use framelab_core::{GrayImage, KeyPoint, KeyPoints};

/// Sample ring of the segment test, a Bresenham circle of radius 3.
const CIRCLE_OFFSETS: [(i32, i32); 12] = [
    (-3, 0),
    (-2, 1),
    (-1, 2),
    (0, 3),
    (1, 2),
    (2, 1),
    (3, 0),
    (2, -1),
    (1, -2),
    (0, -3),
    (-1, -2),
    (-2, -1),
];

/// Circle samples that must agree before a center counts as a corner.
const MIN_SEGMENT: u32 = 9;

/// Neighbourhood diameter recorded on detected keypoints.
const PATCH_DIAMETER: f64 = 7.0;

/// One pass over the sample ring of a candidate center. Samples outside
/// the image are skipped.
struct CircleStats {
    brighter: u32,
    darker: u32,
    bright_sum: u32,
    dark_sum: u32,
}

impl CircleStats {
    fn is_corner(&self) -> bool {
        self.brighter >= MIN_SEGMENT || self.darker >= MIN_SEGMENT
    }

    fn response(&self) -> u32 {
        self.bright_sum.max(self.dark_sum)
    }
}

fn circle_stats(image: &GrayImage, x: i32, y: i32, threshold: u8) -> CircleStats {
    let center = image.get_pixel(x as u32, y as u32)[0];
    let hi = center.saturating_add(threshold);
    let lo = center.saturating_sub(threshold);

    let mut stats = CircleStats {
        brighter: 0,
        darker: 0,
        bright_sum: 0,
        dark_sum: 0,
    };
    for &(dx, dy) in &CIRCLE_OFFSETS {
        let sx = x + dx;
        let sy = y + dy;
        if sx < 0 || sy < 0 || sx >= image.width() as i32 || sy >= image.height() as i32 {
            continue;
        }
        let sample = image.get_pixel(sx as u32, sy as u32)[0];
        if sample > hi {
            stats.brighter += 1;
            stats.bright_sum += u32::from(sample - center);
        } else if sample < lo {
            stats.darker += 1;
            stats.dark_sum += u32::from(center - sample);
        }
    }
    stats
}

/// FAST segment-test corner detector.
///
/// A center is a corner when at least nine of its twelve circle samples are
/// all brighter or all darker than the center by `threshold`. Detections
/// carry the response score and are ranked by it before truncation to
/// `max_keypoints`. A three-pixel border band is never scanned.
pub fn fast_detect(image: &GrayImage, threshold: u8, max_keypoints: usize) -> KeyPoints {
    let width = image.width() as i32;
    let height = image.height() as i32;

    let mut keypoints: KeyPoints = (3..height - 3)
        .flat_map(|y| (3..width - 3).map(move |x| (x, y)))
        .filter_map(|(x, y)| {
            let stats = circle_stats(image, x, y, threshold);
            stats.is_corner().then(|| {
                KeyPoint::new(x as f64, y as f64)
                    .with_size(PATCH_DIAMETER)
                    .with_response(f64::from(stats.response()))
            })
        })
        .collect();

    if keypoints.len() > max_keypoints {
        keypoints.sort_by(|a, b| b.response.total_cmp(&a.response));
        keypoints.truncate(max_keypoints);
    }

    keypoints
}

/// Corner response at `(x, y)`: the larger per-side sum of absolute center
/// differences over circle samples clearing the threshold.
pub fn fast_score(image: &GrayImage, x: i32, y: i32, threshold: u8) -> u32 {
    circle_stats(image, x, y, threshold).response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn image_with_dots(size: u32, background: u8, dots: &[(u32, u32, u8)]) -> GrayImage {
        let mut img = GrayImage::from_pixel(size, size, Luma([background]));
        for &(x, y, value) in dots {
            img.put_pixel(x, y, Luma([value]));
        }
        img
    }

    #[test]
    fn detects_isolated_dots() {
        // A single bright pixel puts all 12 circle samples on the dark side,
        // so each dot yields exactly one detection at its own position.
        let img = image_with_dots(32, 10, &[(16, 16, 200), (8, 20, 180), (24, 9, 160)]);
        let kps = fast_detect(&img, 40, 500);
        assert_eq!(kps.len(), 3);

        for dot in [(16.0, 16.0), (8.0, 20.0), (24.0, 9.0)] {
            let hit = kps.iter().any(|kp| kp.x == dot.0 && kp.y == dot.1);
            assert!(hit, "no keypoint at {dot:?}");
        }
    }

    #[test]
    fn weak_contrast_is_rejected() {
        let img = image_with_dots(32, 10, &[(16, 16, 45)]);
        assert!(fast_detect(&img, 40, 100).is_empty());
        assert_eq!(fast_detect(&img, 30, 100).len(), 1);
    }

    #[test]
    fn border_band_is_excluded() {
        let img = image_with_dots(16, 10, &[(2, 2, 250)]);
        assert!(fast_detect(&img, 40, 100).is_empty());

        let img = image_with_dots(16, 10, &[(3, 3, 250)]);
        assert_eq!(fast_detect(&img, 40, 100).len(), 1);
    }

    #[test]
    fn flat_image_has_no_corners() {
        let img = GrayImage::from_pixel(24, 24, Luma([128]));
        let kps = fast_detect(&img, 20, 100);
        assert!(kps.is_empty());
    }

    #[test]
    fn truncation_keeps_strongest() {
        let img = image_with_dots(32, 10, &[(8, 8, 200), (24, 24, 100)]);
        let all = fast_detect(&img, 40, usize::MAX);
        assert_eq!(all.len(), 2);

        let top = fast_detect(&img, 40, 1);
        assert_eq!(top.len(), 1);
        assert_eq!((top[0].x, top[0].y), (8.0, 8.0));
        // All 12 samples sit 190 levels below the dot.
        assert_eq!(top[0].response, 12.0 * 190.0);
    }

    #[test]
    fn score_is_zero_on_flat_patch() {
        let img = GrayImage::from_pixel(16, 16, Luma([77]));
        assert_eq!(fast_score(&img, 8, 8, 20), 0);
    }

    #[test]
    fn score_skips_samples_outside_the_image() {
        // Bright corner pixel: only four of the twelve circle samples are
        // in bounds, all on the dark side.
        let img = image_with_dots(8, 10, &[(0, 0, 210)]);
        assert_eq!(fast_score(&img, 0, 0, 20), 4 * 200);
    }
}
