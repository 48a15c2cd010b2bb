use framelab_core::{Descriptor, Descriptors, FeatureMatch, Matches};

pub enum MatchType {
    BruteForceHamming,
}

/// Brute-force descriptor matcher with optional Lowe ratio test and
/// cross-check filtering.
pub struct Matcher {
    match_type: MatchType,
    cross_check: bool,
    ratio_threshold: Option<f64>,
}

impl Matcher {
    pub fn new(match_type: MatchType) -> Self {
        Self {
            match_type,
            cross_check: false,
            ratio_threshold: None,
        }
    }

    pub fn with_cross_check(mut self) -> Self {
        self.cross_check = true;
        self
    }

    pub fn with_ratio_test(mut self, threshold: f64) -> Self {
        self.ratio_threshold = Some(threshold);
        self
    }

    pub fn match_descriptors(&self, query: &Descriptors, train: &Descriptors) -> Matches {
        match self.match_type {
            MatchType::BruteForceHamming => self.brute_force_match(query, train),
        }
    }

    fn brute_force_match(&self, query: &Descriptors, train: &Descriptors) -> Matches {
        let mut matches = Matches::with_capacity(query.len());

        for (query_idx, probe) in query.iter().enumerate() {
            let (train_idx, best, runner_up) = match nearest_two(probe, train) {
                Some(hit) => hit,
                None => break,
            };
            if !self.passes_ratio(best, runner_up) {
                continue;
            }
            if self.cross_check && !is_mutual_best(query, train, query_idx, train_idx) {
                continue;
            }
            matches.push(FeatureMatch::new(query_idx, train_idx, f64::from(best)));
        }

        matches
    }

    /// A zero runner-up distance means the best match cannot stand out, so
    /// the pair counts as ambiguous.
    fn passes_ratio(&self, best: u32, runner_up: Option<u32>) -> bool {
        match (self.ratio_threshold, runner_up) {
            (Some(threshold), Some(second)) => {
                second != 0 && f64::from(best) / f64::from(second) <= threshold
            }
            _ => true,
        }
    }
}

/// Index and distance of the closest pool descriptor, plus the distance of
/// the runner-up when the pool has more than one entry. Ties keep the
/// earliest index. `None` when the pool is empty.
fn nearest_two(probe: &Descriptor, pool: &Descriptors) -> Option<(usize, u32, Option<u32>)> {
    let first = pool.first()?;
    let mut best_idx = 0usize;
    let mut best = probe.hamming_distance(first);
    let mut runner_up: Option<u32> = None;

    for (idx, candidate) in pool.iter().enumerate().skip(1) {
        let d = probe.hamming_distance(candidate);
        if d < best {
            runner_up = Some(best);
            best = d;
            best_idx = idx;
        } else if runner_up.map_or(true, |r| d < r) {
            runner_up = Some(d);
        }
    }

    Some((best_idx, best, runner_up))
}

fn is_mutual_best(
    query: &Descriptors,
    train: &Descriptors,
    query_idx: usize,
    train_idx: usize,
) -> bool {
    train
        .get(train_idx)
        .and_then(|t_desc| nearest_two(t_desc, query))
        .map_or(false, |(idx, _, _)| idx == query_idx)
}

/// One-shot matching helper with an optional ratio test.
pub fn match_descriptors(
    query: &Descriptors,
    train: &Descriptors,
    ratio_threshold: Option<f64>,
) -> Matches {
    let mut matcher = Matcher::new(MatchType::BruteForceHamming);

    if let Some(threshold) = ratio_threshold {
        matcher = matcher.with_ratio_test(threshold);
    }

    matcher.match_descriptors(query, train)
}

/// K nearest train descriptors for every query descriptor, by Hamming
/// distance.
pub fn knn_match(query: &Descriptors, train: &Descriptors, k: usize) -> Vec<Vec<FeatureMatch>> {
    query
        .iter()
        .enumerate()
        .map(|(query_idx, probe)| {
            let mut ranked: Vec<(usize, u32)> = train
                .iter()
                .enumerate()
                .map(|(idx, candidate)| (idx, probe.hamming_distance(candidate)))
                .collect();
            ranked.sort_by_key(|&(_, d)| d);
            ranked.truncate(k);
            ranked
                .into_iter()
                .map(|(train_idx, d)| FeatureMatch::new(query_idx, train_idx, f64::from(d)))
                .collect()
        })
        .collect()
}
