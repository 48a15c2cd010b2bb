//! Panorama stitching.
//!
//! Adjacent images are registered with FAST keypoints, BRIEF descriptors
//! and a RANSAC homography, then warped onto a shared canvas anchored at
//! the first image. Overlapping pixels are averaged.

use std::time::Instant;

use framelab_core::{Descriptors, RobustConfig};
use framelab_features::{estimate_homography, fast_detect, Brief, MatchPair, MatchType, Matcher};
use framelab_imgproc::{bilinear_sample_rgb, get_translation_matrix, to_gray, transform_point};
use image::RgbImage;
use log::{debug, info};
use nalgebra::{Matrix3, Point2};
use rayon::prelude::*;

use crate::{PhotoError, Result};

/// Minimum number of correspondences required to attempt registration.
const MIN_MATCHES: usize = 4;

/// Tuning knobs for [`Stitcher`].
#[derive(Debug, Clone)]
pub struct StitcherConfig {
    /// FAST corner threshold used on the grayscale copies.
    pub fast_threshold: u8,
    /// Keypoints kept per image, strongest first.
    pub max_keypoints: usize,
    /// BRIEF descriptor length in bytes.
    pub descriptor_bytes: usize,
    /// Lowe ratio applied during matching.
    pub ratio_threshold: f64,
    /// RANSAC settings for homography estimation.
    pub ransac: RobustConfig,
    /// Upper bound on either canvas dimension.
    pub max_canvas_dim: u32,
}

impl Default for StitcherConfig {
    fn default() -> Self {
        Self {
            fast_threshold: 20,
            max_keypoints: 1000,
            descriptor_bytes: 32,
            ratio_threshold: 0.75,
            ransac: RobustConfig {
                max_iterations: 2000,
                threshold: 3.0,
                confidence: 0.995,
            },
            max_canvas_dim: 8192,
        }
    }
}

impl StitcherConfig {
    pub fn with_fast_threshold(mut self, threshold: u8) -> Self {
        self.fast_threshold = threshold;
        self
    }

    pub fn with_max_keypoints(mut self, count: usize) -> Self {
        self.max_keypoints = count;
        self
    }

    pub fn with_descriptor_bytes(mut self, bytes: usize) -> Self {
        self.descriptor_bytes = bytes;
        self
    }

    pub fn with_ratio_threshold(mut self, ratio: f64) -> Self {
        self.ratio_threshold = ratio;
        self
    }

    pub fn with_ransac(mut self, config: RobustConfig) -> Self {
        self.ransac = config;
        self
    }

    pub fn with_max_canvas_dim(mut self, dim: u32) -> Self {
        self.max_canvas_dim = dim;
        self
    }
}

/// Composites overlapping photos into a single panorama.
pub struct Stitcher {
    config: StitcherConfig,
    brief: Brief,
}

impl Default for Stitcher {
    fn default() -> Self {
        Self::new(StitcherConfig::default())
    }
}

impl Stitcher {
    pub fn new(config: StitcherConfig) -> Self {
        let brief = Brief::new(config.descriptor_bytes);
        Self { config, brief }
    }

    pub fn config(&self) -> &StitcherConfig {
        &self.config
    }

    /// Stitches the images in order, anchoring the canvas at the first one.
    ///
    /// Fewer than two images is an error, as is any adjacent pair that
    /// cannot be registered.
    pub fn stitch(&self, images: &[RgbImage]) -> Result<RgbImage> {
        if images.len() < 2 {
            return Err(PhotoError::NotEnoughImages);
        }
        let start = Instant::now();

        let descriptors: Vec<Descriptors> = images.iter().map(|img| self.describe(img)).collect();

        // Chain the pairwise homographies so every image maps into the
        // first image's coordinate frame.
        let mut chain = vec![Matrix3::<f64>::identity()];
        for k in 0..images.len() - 1 {
            let pair = self.register_pair(&descriptors[k + 1], &descriptors[k], k)?;
            let accumulated = chain[k] * pair;
            chain.push(accumulated);
        }

        let canvas = self.composite(images, &chain)?;
        info!(
            "stitched {} images into a {}x{} canvas in {} ms",
            images.len(),
            canvas.width(),
            canvas.height(),
            start.elapsed().as_millis()
        );
        Ok(canvas)
    }

    fn describe(&self, image: &RgbImage) -> Descriptors {
        let gray = to_gray(image);
        let keypoints = fast_detect(&gray, self.config.fast_threshold, self.config.max_keypoints);
        debug!("detected {} keypoints", keypoints.len());
        self.brief.compute(&gray, &keypoints)
    }

    /// Estimates the homography mapping image `index + 1` into image
    /// `index`'s frame.
    fn register_pair(
        &self,
        next: &Descriptors,
        prev: &Descriptors,
        index: usize,
    ) -> Result<Matrix3<f64>> {
        let matcher = Matcher::new(MatchType::BruteForceHamming)
            .with_ratio_test(self.config.ratio_threshold)
            .with_cross_check();
        let matches = matcher.match_descriptors(next, prev);
        if matches.len() < MIN_MATCHES {
            return Err(PhotoError::InsufficientMatches {
                found: matches.len(),
                needed: MIN_MATCHES,
            });
        }

        let pairs: Vec<MatchPair> = matches
            .iter()
            .map(|m| {
                MatchPair::new(
                    next[m.query_idx].keypoint.pt(),
                    prev[m.train_idx].keypoint.pt(),
                )
            })
            .collect();

        let result =
            estimate_homography(&pairs, &self.config.ransac).ok_or(PhotoError::EstimationFailed)?;
        if result.inlier_count < MIN_MATCHES {
            return Err(PhotoError::EstimationFailed);
        }
        debug!(
            "registered pair {} -> {}: {} matches, {} inliers after {} iterations",
            index + 1,
            index,
            matches.len(),
            result.inlier_count,
            result.iterations
        );
        Ok(result.model.matrix)
    }

    fn composite(&self, images: &[RgbImage], chain: &[Matrix3<f64>]) -> Result<RgbImage> {
        // Project every image corner to find the panorama bounding box.
        let mut min_x = f32::INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut max_y = f32::NEG_INFINITY;
        for (image, transform) in images.iter().zip(chain) {
            let t = transform.cast::<f32>();
            let (w, h) = (image.width() as f32, image.height() as f32);
            for (cx, cy) in [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)] {
                let p = transform_point(&t, &Point2::new(cx, cy));
                min_x = min_x.min(p.x);
                min_y = min_y.min(p.y);
                max_x = max_x.max(p.x);
                max_y = max_y.max(p.y);
            }
        }
        if !(min_x.is_finite() && min_y.is_finite() && max_x.is_finite() && max_y.is_finite()) {
            return Err(PhotoError::EstimationFailed);
        }

        let width = ((max_x - min_x).ceil() as u32).max(1);
        let height = ((max_y - min_y).ceil() as u32).max(1);
        if width > self.config.max_canvas_dim || height > self.config.max_canvas_dim {
            return Err(PhotoError::CanvasTooLarge { width, height });
        }
        debug!(
            "canvas {}x{} with origin offset ({:.1}, {:.1})",
            width, height, -min_x, -min_y
        );

        // Canvas -> source mapping for every image.
        let offset = get_translation_matrix(-min_x, -min_y);
        let mut inverses = Vec::with_capacity(images.len());
        for transform in chain {
            let forward = offset * transform.cast::<f32>();
            let inverse = forward.try_inverse().ok_or(PhotoError::EstimationFailed)?;
            inverses.push(inverse);
        }

        let mut canvas = RgbImage::new(width, height);
        let row_stride = width as usize * 3;
        canvas
            .par_chunks_mut(row_stride)
            .enumerate()
            .for_each(|(y, row)| {
                for x in 0..width as usize {
                    let mut sum = [0.0f32; 3];
                    let mut hits = 0u32;
                    for (image, inverse) in images.iter().zip(&inverses) {
                        let p = transform_point(inverse, &Point2::new(x as f32, y as f32));
                        if let Some(rgb) = bilinear_sample_rgb(image, p.x, p.y) {
                            sum[0] += rgb[0];
                            sum[1] += rgb[1];
                            sum[2] += rgb[2];
                            hits += 1;
                        }
                    }
                    if hits > 0 {
                        let scale = 1.0 / hits as f32;
                        let offset = x * 3;
                        for c in 0..3 {
                            row[offset + c] = (sum[c] * scale + 0.5).min(255.0) as u8;
                        }
                    }
                }
            });

        Ok(canvas)
    }
}
