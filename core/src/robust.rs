use rand::seq::SliceRandom;
use rand::thread_rng;

/// Parameters for robust model estimation.
#[derive(Debug, Clone, Copy)]
pub struct RobustConfig {
    /// Maximum number of sampling iterations.
    pub max_iterations: usize,
    /// Inlier threshold in the model's residual units.
    pub threshold: f64,
    /// Desired probability of drawing at least one all-inlier sample.
    pub confidence: f64,
}

impl Default for RobustConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            threshold: 3.0,
            confidence: 0.995,
        }
    }
}

/// Outcome of a robust estimation run.
#[derive(Debug, Clone)]
pub struct RobustResult<M> {
    pub model: M,
    /// Per-datum inlier flags, same length as the input.
    pub inliers: Vec<bool>,
    pub inlier_count: usize,
    pub iterations: usize,
}

/// A model hypothesis that can be fit from a minimal sample and scored
/// against the full data set.
pub trait RobustModel<D>: Sized {
    /// Number of data points needed for a minimal fit.
    fn minimal_samples() -> usize;

    /// Fits a hypothesis from a minimal sample. Returns `None` for
    /// degenerate samples.
    fn fit(samples: &[&D]) -> Option<Self>;

    /// Residual of one datum under this hypothesis.
    fn residual(&self, datum: &D) -> f64;
}

/// RANSAC driver over any [`RobustModel`].
#[derive(Debug, Clone, Default)]
pub struct Ransac {
    pub config: RobustConfig,
}

impl Ransac {
    pub fn new(config: RobustConfig) -> Self {
        Self { config }
    }

    /// Runs hypothesis sampling until the adaptive iteration bound or the
    /// configured cap is reached. Returns `None` when the data cannot
    /// support a minimal sample or no hypothesis ever fits.
    pub fn run<D, M: RobustModel<D>>(&self, data: &[D]) -> Option<RobustResult<M>> {
        let minimal = M::minimal_samples();
        if data.len() < minimal {
            return None;
        }

        let mut rng = thread_rng();
        let mut indices: Vec<usize> = (0..data.len()).collect();

        let mut best: Option<RobustResult<M>> = None;
        let mut required = self.config.max_iterations;
        let mut iteration = 0;

        while iteration < required.min(self.config.max_iterations) {
            iteration += 1;

            indices.shuffle(&mut rng);
            let sample: Vec<&D> = indices[..minimal].iter().map(|&i| &data[i]).collect();

            let Some(model) = M::fit(&sample) else {
                continue;
            };

            let inliers: Vec<bool> = data
                .iter()
                .map(|d| model.residual(d) < self.config.threshold)
                .collect();
            let inlier_count = inliers.iter().filter(|&&b| b).count();

            let best_count = best.as_ref().map_or(0, |r| r.inlier_count);
            if inlier_count > best_count {
                // Shrink the iteration bound from the observed inlier ratio.
                let ratio = inlier_count as f64 / data.len() as f64;
                required = Self::adaptive_iterations(ratio, self.config.confidence, minimal)
                    .min(self.config.max_iterations);

                best = Some(RobustResult {
                    model,
                    inliers,
                    inlier_count,
                    iterations: iteration,
                });
            }
        }

        best
    }

    fn adaptive_iterations(inlier_ratio: f64, confidence: f64, minimal: usize) -> usize {
        if inlier_ratio <= 0.0 {
            return usize::MAX;
        }
        if inlier_ratio >= 1.0 {
            return 1;
        }
        let denom = (1.0 - inlier_ratio.powi(minimal as i32)).ln();
        if denom >= 0.0 {
            return 1;
        }
        ((1.0 - confidence).ln() / denom).ceil() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// y = a*x + b fit from two points, used to exercise the driver.
    #[derive(Debug, Clone, Copy)]
    struct Line {
        a: f64,
        b: f64,
    }

    impl RobustModel<(f64, f64)> for Line {
        fn minimal_samples() -> usize {
            2
        }

        fn fit(samples: &[&(f64, f64)]) -> Option<Self> {
            let (x0, y0) = *samples[0];
            let (x1, y1) = *samples[1];
            if (x1 - x0).abs() < 1e-12 {
                return None;
            }
            let a = (y1 - y0) / (x1 - x0);
            Some(Line { a, b: y0 - a * x0 })
        }

        fn residual(&self, &(x, y): &(f64, f64)) -> f64 {
            (self.a * x + self.b - y).abs()
        }
    }

    #[test]
    fn recovers_line_under_outliers() {
        let mut data: Vec<(f64, f64)> = (0..40).map(|i| (i as f64, 2.0 * i as f64 + 1.0)).collect();
        // Gross outliers well off the line.
        data.push((5.0, 500.0));
        data.push((10.0, -300.0));
        data.push((20.0, 999.0));

        let ransac = Ransac::new(RobustConfig {
            max_iterations: 500,
            threshold: 0.5,
            confidence: 0.999,
        });
        let result: RobustResult<Line> = ransac.run(&data).unwrap();

        assert!(result.inlier_count >= 40);
        assert!((result.model.a - 2.0).abs() < 1e-6);
        assert!((result.model.b - 1.0).abs() < 1e-6);
    }

    #[test]
    fn too_few_points_yields_none() {
        let data = vec![(0.0, 0.0)];
        let ransac = Ransac::default();
        assert!(ransac.run::<_, Line>(&data).is_none());
    }
}
