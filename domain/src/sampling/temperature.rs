//! Per-sample temperature scheduling

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound accepted by the generation backends we target
pub const MAX_TEMPERATURE: f64 = 2.0;

/// Shape of the temperature curve across a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureSchedule {
    /// Every sample uses `start`
    #[default]
    Fixed,
    /// Linear ramp from `start` to `end`
    LinearIncrease,
    /// Slow start, fast finish: (e^{2p} - 1) / (e^2 - 1)
    Exponential,
    /// Uniform draw in `[start, end]` from a seeded generator
    Random,
    /// `end` for the first half of the run, `start` afterwards
    ExploreExploit,
}

impl fmt::Display for TemperatureSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TemperatureSchedule::Fixed => "fixed",
            TemperatureSchedule::LinearIncrease => "linear_increase",
            TemperatureSchedule::Exponential => "exponential",
            TemperatureSchedule::Random => "random",
            TemperatureSchedule::ExploreExploit => "explore_exploit",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for TemperatureSchedule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "fixed" => Ok(TemperatureSchedule::Fixed),
            "linear_increase" | "linear" => Ok(TemperatureSchedule::LinearIncrease),
            "exponential" | "exp" => Ok(TemperatureSchedule::Exponential),
            "random" => Ok(TemperatureSchedule::Random),
            "explore_exploit" => Ok(TemperatureSchedule::ExploreExploit),
            _ => Err(format!("Invalid TemperatureSchedule: {}", s)),
        }
    }
}

/// Schedule plus its bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperaturePolicy {
    pub schedule: TemperatureSchedule,
    pub start: f64,
    pub end: f64,
    /// Seed for [`TemperatureSchedule::Random`]; defaults to the sample count
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for TemperaturePolicy {
    fn default() -> Self {
        Self::fixed(0.7)
    }
}

impl TemperaturePolicy {
    pub fn fixed(temperature: f64) -> Self {
        Self {
            schedule: TemperatureSchedule::Fixed,
            start: temperature,
            end: temperature,
            seed: None,
        }
    }

    pub fn new(schedule: TemperatureSchedule, start: f64, end: f64) -> Self {
        Self {
            schedule,
            start,
            end,
            seed: None,
        }
    }

    /// Exploration default: linear ramp 0.7 → 1.0
    pub fn exploration() -> Self {
        Self::new(TemperatureSchedule::LinearIncrease, 0.7, 1.0)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        for (label, value) in [("start", self.start), ("end", self.end)] {
            if !value.is_finite() || !(0.0..=MAX_TEMPERATURE).contains(&value) {
                return Err(DomainError::config(format!(
                    "temperature {label} must be within [0, {MAX_TEMPERATURE}], got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Temperatures for a run of `n` samples, indexed by sample index.
    pub fn temperatures(&self, n: usize) -> Vec<f64> {
        let span = self.end - self.start;
        let progress = |i: usize| {
            if n <= 1 {
                0.0
            } else {
                i as f64 / (n - 1) as f64
            }
        };

        match self.schedule {
            TemperatureSchedule::Fixed => vec![self.start; n],
            TemperatureSchedule::LinearIncrease => (0..n)
                .map(|i| self.start + span * progress(i))
                .collect(),
            TemperatureSchedule::Exponential => {
                let denom = std::f64::consts::E.powi(2) - 1.0;
                (0..n)
                    .map(|i| {
                        let factor = ((2.0 * progress(i)).exp() - 1.0) / denom;
                        self.start + span * factor
                    })
                    .collect()
            }
            TemperatureSchedule::Random => {
                let mut rng = fastrand::Rng::with_seed(self.seed.unwrap_or(n as u64));
                (0..n).map(|_| self.start + span * rng.f64()).collect()
            }
            TemperatureSchedule::ExploreExploit => (0..n)
                .map(|i| if i * 2 < n { self.end } else { self.start })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_fixed() {
        assert_eq!(TemperaturePolicy::fixed(0.7).temperatures(3), vec![0.7; 3]);
    }

    #[test]
    fn test_linear_endpoints() {
        let temps = TemperaturePolicy::exploration().temperatures(4);
        assert!(close(temps[0], 0.7));
        assert!(close(temps[3], 1.0));
        assert!(temps.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_exponential_is_convex() {
        let temps =
            TemperaturePolicy::new(TemperatureSchedule::Exponential, 0.0, 1.0).temperatures(5);
        assert!(close(temps[0], 0.0));
        assert!(close(temps[4], 1.0));
        // below the linear ramp at the midpoint
        assert!(temps[2] < 0.5);
    }

    #[test]
    fn test_random_is_seeded_and_bounded() {
        let policy = TemperaturePolicy::new(TemperatureSchedule::Random, 0.5, 1.2).with_seed(42);
        let a = policy.temperatures(10);
        let b = policy.temperatures(10);
        assert_eq!(a, b);
        assert!(a.iter().all(|t| (0.5..=1.2).contains(t)));
    }

    #[test]
    fn test_explore_exploit() {
        let temps =
            TemperaturePolicy::new(TemperatureSchedule::ExploreExploit, 0.3, 1.0).temperatures(5);
        assert_eq!(temps, vec![1.0, 1.0, 1.0, 0.3, 0.3]);
    }

    #[test]
    fn test_single_sample() {
        let temps = TemperaturePolicy::exploration().temperatures(1);
        assert_eq!(temps, vec![0.7]);
    }

    #[test]
    fn test_validate_bounds() {
        assert!(TemperaturePolicy::fixed(0.7).validate().is_ok());
        assert!(TemperaturePolicy::fixed(2.5).validate().is_err());
        assert!(TemperaturePolicy::fixed(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_schedule_from_str() {
        assert_eq!(
            "linear-increase".parse::<TemperatureSchedule>(),
            Ok(TemperatureSchedule::LinearIncrease)
        );
        assert!("cosine".parse::<TemperatureSchedule>().is_err());
    }
}
