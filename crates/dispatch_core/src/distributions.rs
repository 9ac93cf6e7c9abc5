//! Probability distributions driving traffic and incident arrivals.
//!
//! - [`ModifiedPert`]: reshaped Beta used to draw a per-edge traffic fraction.
//! - [`poisson_probability`]: chance of at least one arrival in a minute.
//! - [`MinuteTrial`]: fixed-point Bernoulli trial built from that probability.
//! - [`sample_cumulative_percent`]: pick an index from cumulative percentages.

use rand::distributions::Distribution;
use rand::Rng;
use rand_distr::Beta;

use crate::error::DistributionError;

/// Resolution of the fixed-point arrival trial (draws are in `1..=TRIAL_RESOLUTION`).
pub const TRIAL_RESOLUTION: u32 = 1_000_000;

/// Smallest and largest PERT confidence accepted.
pub const MIN_PERT_CONFIDENCE: f64 = 1.0;
pub const MAX_PERT_CONFIDENCE: f64 = 18.0;

/// Modified PERT distribution over `[low, high]` peaking at `likely`.
///
/// `confidence` controls how strongly samples cluster around `likely`
/// (4 gives the classic PERT shape). Sampling draws from
/// `Beta(alpha, beta)` with
///
/// ```text
/// alpha = 1 + confidence * (likely - low) / (high - low)
/// beta  = 1 + confidence * (high - likely) / (high - low)
/// ```
///
/// and rescales the draw into `[low, high]`.
#[derive(Debug, Clone)]
pub struct ModifiedPert {
    low: f64,
    likely: f64,
    high: f64,
    confidence: f64,
    beta: Beta<f64>,
}

impl ModifiedPert {
    pub fn new(low: f64, likely: f64, high: f64, confidence: f64) -> Result<Self, DistributionError> {
        if !(MIN_PERT_CONFIDENCE..=MAX_PERT_CONFIDENCE).contains(&confidence) {
            return Err(DistributionError::InvalidConfidence(confidence));
        }
        if low >= high || !(low..=high).contains(&likely) {
            return Err(DistributionError::InvalidBounds { low, likely, high });
        }
        let range = high - low;
        let alpha = 1.0 + confidence * (likely - low) / range;
        let beta_shape = 1.0 + confidence * (high - likely) / range;
        let beta = Beta::new(alpha, beta_shape).map_err(|_| DistributionError::InvalidShape {
            alpha,
            beta: beta_shape,
        })?;
        Ok(Self {
            low,
            likely,
            high,
            confidence,
            beta,
        })
    }

    /// Mean of the distribution: `(low + confidence*likely + high) / (confidence + 2)`.
    pub fn mean(&self) -> f64 {
        (self.low + self.confidence * self.likely + self.high) / (self.confidence + 2.0)
    }
}

impl Distribution<f64> for ModifiedPert {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let x = self.beta.sample(rng);
        (self.low + x * (self.high - self.low)).clamp(self.low, self.high)
    }
}

/// Probability that at least one event of a Poisson process with `rate`
/// (expected events per minute) occurs within the next minute.
pub fn poisson_probability(rate: f64) -> f64 {
    1.0 - (-rate).exp()
}

/// Per-minute incident probability for a zone, given the incident rate per
/// person per minute.
pub fn per_minute_probability(rate_per_person: f64, zone_population: f64) -> f64 {
    poisson_probability(rate_per_person * zone_population)
}

/// Bernoulli trial compared in fixed point to keep the threshold exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinuteTrial {
    threshold: u32,
}

impl MinuteTrial {
    pub fn from_probability(probability: f64) -> Self {
        let scaled = (probability.clamp(0.0, 1.0) * TRIAL_RESOLUTION as f64).floor();
        Self {
            threshold: scaled as u32,
        }
    }

    /// Draws in `1..=TRIAL_RESOLUTION` at or below this value fire.
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn fires<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        rng.gen_range(1..=TRIAL_RESOLUTION) <= self.threshold
    }
}

/// Draw `1..=100` and return the first index whose cumulative percentage
/// covers the draw. Falls back to the last index if the table is short of 100.
pub fn sample_cumulative_percent<R: Rng + ?Sized>(cumulative: &[u32], rng: &mut R) -> usize {
    let draw = rng.gen_range(1..=100u32);
    cumulative
        .iter()
        .position(|&c| draw <= c)
        .unwrap_or(cumulative.len().saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn poisson_probability_matches_reference_values() {
        let rounded: Vec<f64> = [0.0256, 0.349, 0.00127]
            .iter()
            .map(|r| (poisson_probability(*r) * 1e5).round() / 1e5)
            .collect();
        assert_eq!(rounded, vec![0.02528, 0.29461, 0.00127]);
    }

    #[test]
    fn pert_rejects_confidence_out_of_range() {
        assert_eq!(
            ModifiedPert::new(0.0, 0.5, 1.0, 0.5).unwrap_err(),
            DistributionError::InvalidConfidence(0.5)
        );
        assert!(ModifiedPert::new(0.0, 0.5, 1.0, 18.5).is_err());
        assert!(ModifiedPert::new(0.0, 0.5, 1.0, 18.0).is_ok());
        assert!(ModifiedPert::new(0.0, 0.5, 1.0, 1.0).is_ok());
    }

    #[test]
    fn pert_rejects_likely_outside_bounds() {
        assert!(matches!(
            ModifiedPert::new(0.0, 1.5, 1.0, 4.0),
            Err(DistributionError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn pert_samples_stay_in_range_and_center_on_mean() {
        let pert = ModifiedPert::new(0.0, 0.2, 1.0, 4.0).expect("pert");
        let mut rng = StdRng::seed_from_u64(7);
        let n = 20_000;
        let mut sum = 0.0;
        for _ in 0..n {
            let x = pert.sample(&mut rng);
            assert!((0.0..=1.0).contains(&x));
            sum += x;
        }
        let mean = sum / n as f64;
        assert!((mean - pert.mean()).abs() < 0.01, "mean {mean} vs {}", pert.mean());
    }

    #[test]
    fn trial_threshold_is_floored() {
        assert_eq!(MinuteTrial::from_probability(0.0252868).threshold(), 25_286);
        assert_eq!(MinuteTrial::from_probability(1.0).threshold(), TRIAL_RESOLUTION);
        assert_eq!(MinuteTrial::from_probability(0.0).threshold(), 0);
    }

    #[test]
    fn certain_and_impossible_trials() {
        let mut rng = StdRng::seed_from_u64(1);
        let always = MinuteTrial::from_probability(1.0);
        let never = MinuteTrial::from_probability(0.0);
        for _ in 0..1000 {
            assert!(always.fires(&mut rng));
            assert!(!never.fires(&mut rng));
        }
    }

    #[test]
    fn cumulative_percent_skips_empty_levels() {
        let mut rng = StdRng::seed_from_u64(3);
        let cumulative = [0, 0, 100, 100, 100];
        for _ in 0..500 {
            assert_eq!(sample_cumulative_percent(&cumulative, &mut rng), 2);
        }
    }
}
