//! Robust homography estimation from putative feature matches.

use framelab_core::{Ransac, RobustConfig, RobustModel, RobustResult};
use nalgebra::{DMatrix, Matrix3, Point2, Vector2};

pub type RansacConfig = RobustConfig;
pub type RansacResult<M> = RobustResult<M>;

/// A point correspondence `src -> dst` in pixel coordinates.
#[derive(Debug, Clone, Copy)]
pub struct MatchPair {
    pub src: Point2<f64>,
    pub dst: Point2<f64>,
}

impl MatchPair {
    pub fn new(src: Point2<f64>, dst: Point2<f64>) -> Self {
        Self { src, dst }
    }
}

/// A planar projective transform hypothesis fit from correspondences.
#[derive(Debug, Clone, Copy)]
pub struct Homography {
    pub matrix: Matrix3<f64>,
}

impl Homography {
    /// Forward reprojection error in destination pixels.
    pub fn reprojection_error(&self, pair: &MatchPair) -> f64 {
        match project(&self.matrix, pair.src) {
            Some(mapped) => (mapped - pair.dst).norm(),
            None => f64::INFINITY,
        }
    }
}

/// Applies a homography with the perspective divide. `None` for points
/// mapped onto the plane at infinity.
fn project(h: &Matrix3<f64>, p: Point2<f64>) -> Option<Point2<f64>> {
    let v = h * p.to_homogeneous();
    if v.z.abs() > 1e-10 {
        Some(Point2::new(v.x / v.z, v.y / v.z))
    } else {
        None
    }
}

impl RobustModel<MatchPair> for Homography {
    fn minimal_samples() -> usize {
        4
    }

    fn fit(samples: &[&MatchPair]) -> Option<Self> {
        let pairs: Vec<MatchPair> = samples.iter().map(|&&p| p).collect();
        homography_dlt(&pairs).map(|matrix| Homography { matrix })
    }

    fn residual(&self, pair: &MatchPair) -> f64 {
        self.reprojection_error(pair)
    }
}

/// Isotropic Hartley normalisation: centroid to the origin, mean distance
/// to sqrt(2). `None` for degenerate point sets.
fn normalizing_transform<I>(points: I, count: usize) -> Option<Matrix3<f64>>
where
    I: Iterator<Item = Point2<f64>> + Clone,
{
    if count == 0 {
        return None;
    }
    let n = count as f64;
    let centroid = points.clone().fold(Vector2::zeros(), |acc, p| acc + p.coords) / n;
    let mean_dist = points.map(|p| (p.coords - centroid).norm()).sum::<f64>() / n;
    if mean_dist < 1e-9 {
        return None;
    }

    let s = std::f64::consts::SQRT_2 / mean_dist;
    Some(Matrix3::new(
        s, 0.0, -s * centroid.x, 0.0, s, -s * centroid.y, 0.0, 0.0, 1.0,
    ))
}

/// Applies a scale-plus-translation normalising transform directly.
fn normalize(t: &Matrix3<f64>, p: Point2<f64>) -> Point2<f64> {
    Point2::new(t[(0, 0)] * p.x + t[(0, 2)], t[(1, 1)] * p.y + t[(1, 2)])
}

/// Direct linear transform over normalised coordinates. Needs at least four
/// correspondences; solves `A h = 0` by taking the right singular vector of
/// the smallest singular value, then denormalises.
pub fn homography_dlt(pairs: &[MatchPair]) -> Option<Matrix3<f64>> {
    if pairs.len() < 4 {
        return None;
    }

    let t_src = normalizing_transform(pairs.iter().map(|p| p.src), pairs.len())?;
    let t_dst = normalizing_transform(pairs.iter().map(|p| p.dst), pairs.len())?;

    // Zero rows beyond 2n keep all nine right singular vectors visible to
    // the SVD in the minimal four-pair case.
    let mut a = DMatrix::zeros((pairs.len() * 2).max(9), 9);
    for (i, pair) in pairs.iter().enumerate() {
        let p = normalize(&t_src, pair.src);
        let q = normalize(&t_dst, pair.dst);
        let rows = [
            [-p.x, -p.y, -1.0, 0.0, 0.0, 0.0, q.x * p.x, q.x * p.y, q.x],
            [0.0, 0.0, 0.0, -p.x, -p.y, -1.0, q.y * p.x, q.y * p.y, q.y],
        ];
        for (r, row) in rows.iter().enumerate() {
            for (c, &value) in row.iter().enumerate() {
                a[(2 * i + r, c)] = value;
            }
        }
    }

    let v_t = a.svd(false, true).v_t?;
    let h = v_t.row(8);
    let h_norm = Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], h[8]);

    let denorm = t_dst.try_inverse()? * h_norm * t_src;
    if denorm[(2, 2)].abs() < 1e-12 {
        return None;
    }
    Some(denorm / denorm[(2, 2)])
}

/// RANSAC homography estimation followed by a least-squares refit over all
/// inliers. `None` when no usable hypothesis survives.
pub fn estimate_homography(
    pairs: &[MatchPair],
    config: &RansacConfig,
) -> Option<RansacResult<Homography>> {
    let ransac = Ransac::new(*config);
    let mut result: RansacResult<Homography> = ransac.run(pairs)?;

    let inlier_pairs: Vec<MatchPair> = pairs
        .iter()
        .zip(result.inliers.iter())
        .filter(|(_, &keep)| keep)
        .map(|(p, _)| *p)
        .collect();

    if inlier_pairs.len() >= 4 {
        if let Some(matrix) = homography_dlt(&inlier_pairs) {
            let refined = Homography { matrix };
            let refit_count = pairs
                .iter()
                .filter(|p| refined.residual(p) < config.threshold)
                .count();
            if refit_count >= result.inlier_count {
                result.inliers = pairs
                    .iter()
                    .map(|p| refined.residual(p) < config.threshold)
                    .collect();
                result.inlier_count = refit_count;
                result.model = refined;
            }
        }
    }

    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(src: (f64, f64), dst: (f64, f64)) -> MatchPair {
        MatchPair::new(Point2::new(src.0, src.1), Point2::new(dst.0, dst.1))
    }

    fn translation_pairs(dx: f64, dy: f64, n: usize) -> Vec<MatchPair> {
        (0..n)
            .map(|i| {
                // Jittered grid so no minimal sample is collinear.
                let x = (i % 6) as f64 * 20.0 + ((i * 7) % 13) as f64;
                let y = (i / 6) as f64 * 20.0 + ((i * 11) % 17) as f64;
                pair((x, y), (x + dx, y + dy))
            })
            .collect()
    }

    #[test]
    fn dlt_recovers_exact_translation() {
        let pairs: Vec<MatchPair> = [(0.0, 0.0), (100.0, 0.0), (0.0, 100.0), (100.0, 100.0)]
            .iter()
            .map(|&(x, y)| pair((x, y), (x + 10.0, y + 5.0)))
            .collect();
        let h = homography_dlt(&pairs).unwrap();

        assert!((h[(0, 2)] - 10.0).abs() < 1e-6, "tx = {}", h[(0, 2)]);
        assert!((h[(1, 2)] - 5.0).abs() < 1e-6, "ty = {}", h[(1, 2)]);
        assert!((h[(0, 0)] - 1.0).abs() < 1e-6);
        assert!((h[(1, 1)] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn dlt_rejects_degenerate_points() {
        let pairs = vec![pair((5.0, 5.0), (7.0, 7.0)); 4];
        assert!(homography_dlt(&pairs).is_none());
    }

    #[test]
    fn points_sent_to_infinity_cost_infinity() {
        let flat = Homography {
            matrix: Matrix3::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0),
        };
        let p = pair((3.0, 4.0), (3.0, 4.0));
        assert!(flat.reprojection_error(&p).is_infinite());
    }

    #[test]
    fn ransac_survives_outliers() {
        let mut pairs = translation_pairs(-20.0, 12.0, 30);
        for i in 0..8 {
            pairs.push(pair(
                (i as f64 * 9.0, i as f64 * 4.0),
                (500.0 - i as f64 * 31.0, i as f64 * 77.0),
            ));
        }

        let config = RansacConfig {
            max_iterations: 2000,
            threshold: 2.0,
            confidence: 0.999,
        };
        let result = estimate_homography(&pairs, &config).unwrap();

        assert!(result.inlier_count >= 30, "inliers = {}", result.inlier_count);
        let h = result.model.matrix;
        assert!((h[(0, 2)] + 20.0).abs() < 0.5, "tx = {}", h[(0, 2)]);
        assert!((h[(1, 2)] - 12.0).abs() < 0.5, "ty = {}", h[(1, 2)]);
    }

    #[test]
    fn too_few_pairs_yield_none() {
        let pairs = translation_pairs(1.0, 1.0, 3);
        let config = RansacConfig::default();
        assert!(estimate_homography(&pairs, &config).is_none());
    }
}
