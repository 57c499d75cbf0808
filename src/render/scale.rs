// Value scales for bin color and elevation.

/// Largest value kept by an upper-percentile cutoff over ascending `sorted` values.
pub fn upper_percentile_cutoff(sorted: &[f64], upper_percentile: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let n = sorted.len() as f64;
    let idx = (n * upper_percentile.clamp(0.0, 100.0) / 100.0).ceil() as usize;
    Some(sorted[idx.clamp(1, sorted.len()) - 1])
}

/// Maps a continuous domain onto `steps` equal buckets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantizeScale {
    pub domain: [f64; 2],
    pub steps: usize,
}

impl QuantizeScale {
    pub fn index(&self, value: f64) -> usize {
        let [lo, hi] = self.domain;
        if self.steps == 0 {
            return 0;
        }
        if hi <= lo {
            return 0;
        }
        let step = (hi - lo) / self.steps as f64;
        let i = ((value - lo) / step).floor();
        (i.max(0.0) as usize).min(self.steps - 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: [f64; 2],
    pub range: [f64; 2],
}

impl LinearScale {
    pub fn map(&self, value: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        if d1 <= d0 {
            return r1;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }
}

pub fn extent(values: impl IntoIterator<Item = f64>) -> Option<[f64; 2]> {
    values.into_iter().fold(None, |acc, v| match acc {
        None => Some([v, v]),
        Some([lo, hi]) => Some([lo.min(v), hi.max(v)]),
    })
}
