use nalgebra::Point2;

/// A detected interest point.
///
/// Field conventions follow the usual detector vocabulary: `size` is the
/// diameter of the meaningful neighbourhood, `angle` is an orientation in
/// degrees where negative means unset, `response` ranks detections by
/// strength, and `octave`/`class_id` carry pyramid level and object class
/// for detectors that assign them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyPoint {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub angle: f64,
    pub response: f64,
    pub octave: i32,
    pub class_id: i32,
}

impl KeyPoint {
    /// A point at `(x, y)` with every other field at its unset default.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    pub fn with_size(self, size: f64) -> Self {
        Self { size, ..self }
    }

    pub fn with_angle(self, angle: f64) -> Self {
        Self { angle, ..self }
    }

    pub fn with_response(self, response: f64) -> Self {
        Self { response, ..self }
    }

    pub fn with_octave(self, octave: i32) -> Self {
        Self { octave, ..self }
    }

    pub fn with_class_id(self, class_id: i32) -> Self {
        Self { class_id, ..self }
    }

    /// Position as an nalgebra point, for geometry code.
    pub fn pt(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }
}

impl Default for KeyPoint {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            size: 1.0,
            angle: -1.0,
            response: 0.0,
            octave: 0,
            class_id: -1,
        }
    }
}

pub type KeyPoints = Vec<KeyPoint>;

/// A correspondence between a query descriptor and a train descriptor,
/// `distance` lower is better.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureMatch {
    pub query_idx: usize,
    pub train_idx: usize,
    pub distance: f64,
}

impl FeatureMatch {
    pub fn new(query_idx: usize, train_idx: usize, distance: f64) -> Self {
        Self {
            query_idx,
            train_idx,
            distance,
        }
    }
}

/// Match list that reads as a slice and sorts by distance.
#[derive(Debug, Clone, Default)]
pub struct Matches {
    pub matches: Vec<FeatureMatch>,
}

impl Matches {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            matches: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, m: FeatureMatch) {
        self.matches.push(m);
    }

    /// Sorts matches by ascending distance.
    pub fn sort_by_distance(&mut self) {
        self.matches
            .sort_by(|a, b| a.distance.total_cmp(&b.distance));
    }
}

impl std::ops::Deref for Matches {
    type Target = [FeatureMatch];

    fn deref(&self) -> &Self::Target {
        &self.matches
    }
}
