//! Completion-time statistics over repeated evaluations.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Success rate | Fraction of runs reaching the target |
//! | Mean time | Mean completion time over successful runs |
//! | Std-dev time | Sample standard deviation (n − 1) |
//! | Min / Max | Best and worst completion time |
//! | Percentile | Nearest-rank percentile of completion time |

use crate::error::Result;

use super::Trajectory;

/// Robustness indicators for one plan under timing jitter.
#[derive(Debug, Clone, PartialEq)]
pub struct RobustnessSummary {
    /// Total repetitions.
    pub runs: usize,
    /// Repetitions that failed (any error).
    pub failures: usize,
    /// Mean completion time of successful runs.
    pub mean_time: f64,
    /// Sample standard deviation of completion time (0 with < 2 successes).
    pub std_dev_time: f64,
    /// Shortest completion time (+∞ without successes).
    pub min_time: f64,
    /// Longest completion time (0 without successes).
    pub max_time: f64,
    sorted_times: Vec<f64>,
}

impl RobustnessSummary {
    /// Computes the summary from per-repetition results.
    pub fn calculate(results: &[Result<Trajectory>]) -> Self {
        let mut times: Vec<f64> = results
            .iter()
            .filter_map(|r| r.as_ref().ok().map(|t| t.time))
            .collect();
        times.sort_by(f64::total_cmp);

        let n = times.len();
        let mean_time = if n == 0 {
            0.0
        } else {
            times.iter().sum::<f64>() / n as f64
        };
        let std_dev_time = if n < 2 {
            0.0
        } else {
            let var = times.iter().map(|t| (t - mean_time).powi(2)).sum::<f64>() / (n - 1) as f64;
            var.sqrt()
        };

        Self {
            runs: results.len(),
            failures: results.len() - n,
            mean_time,
            std_dev_time,
            min_time: times.first().copied().unwrap_or(f64::INFINITY),
            max_time: times.last().copied().unwrap_or(0.0),
            sorted_times: times,
        }
    }

    /// Fraction of runs that reached the target (0.0 with no runs).
    pub fn success_rate(&self) -> f64 {
        if self.runs == 0 {
            0.0
        } else {
            (self.runs - self.failures) as f64 / self.runs as f64
        }
    }

    /// Nearest-rank percentile `p ∈ [0, 100]` of completion time.
    ///
    /// Returns `None` without successful runs.
    pub fn percentile(&self, p: f64) -> Option<f64> {
        let n = self.sorted_times.len();
        if n == 0 {
            return None;
        }
        let rank = ((p.clamp(0.0, 100.0) / 100.0) * n as f64).ceil() as usize;
        Some(self.sorted_times[rank.clamp(1, n) - 1])
    }

    /// Whether the plan meets the given robustness thresholds.
    ///
    /// Never met without at least one successful run.
    pub fn meets_thresholds(&self, max_mean_time: f64, min_success_rate: f64) -> bool {
        self.runs > self.failures
            && self.mean_time <= max_mean_time
            && self.success_rate() >= min_success_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvaluationError;
    use crate::models::State;

    fn ok(time: f64) -> Result<Trajectory> {
        Ok(Trajectory {
            time,
            steps: Vec::new(),
        })
    }

    fn failed() -> Result<Trajectory> {
        Err(EvaluationError::UnreachableTarget {
            target: State::leaf(0),
            reached: State::leaf(1),
            consumed: 0,
        })
    }

    #[test]
    fn test_summary_basic() {
        let results = vec![ok(10.0), ok(12.0), ok(14.0), failed()];
        let s = RobustnessSummary::calculate(&results);
        assert_eq!(s.runs, 4);
        assert_eq!(s.failures, 1);
        assert!((s.mean_time - 12.0).abs() < 1e-10);
        // Sample variance: (4 + 0 + 4) / 2 = 4
        assert!((s.std_dev_time - 2.0).abs() < 1e-10);
        assert_eq!(s.min_time, 10.0);
        assert_eq!(s.max_time, 14.0);
        assert!((s.success_rate() - 0.75).abs() < 1e-10);
    }

    #[test]
    fn test_percentile_nearest_rank() {
        let results: Vec<_> = [5.0, 1.0, 4.0, 2.0, 3.0].into_iter().map(ok).collect();
        let s = RobustnessSummary::calculate(&results);
        assert_eq!(s.percentile(0.0), Some(1.0));
        assert_eq!(s.percentile(50.0), Some(3.0));
        assert_eq!(s.percentile(80.0), Some(4.0));
        assert_eq!(s.percentile(100.0), Some(5.0));
    }

    #[test]
    fn test_summary_empty() {
        let s = RobustnessSummary::calculate(&[]);
        assert_eq!(s.runs, 0);
        assert_eq!(s.success_rate(), 0.0);
        assert_eq!(s.percentile(50.0), None);
        assert_eq!(s.min_time, f64::INFINITY);
    }

    #[test]
    fn test_all_failed() {
        let s = RobustnessSummary::calculate(&[failed(), failed()]);
        assert_eq!(s.failures, 2);
        assert_eq!(s.success_rate(), 0.0);
        assert_eq!(s.mean_time, 0.0);
    }

    #[test]
    fn test_meets_thresholds() {
        let s = RobustnessSummary::calculate(&[ok(10.0), ok(20.0), failed()]);
        assert!(s.meets_thresholds(15.0, 0.5));
        assert!(!s.meets_thresholds(14.9, 0.5)); // Mean too high
        assert!(!s.meets_thresholds(15.0, 0.9)); // Too many failures
    }

    #[test]
    fn test_thresholds_unmet_when_every_run_fails() {
        let s = RobustnessSummary::calculate(&[failed(), failed()]);
        assert_eq!(s.mean_time, 0.0);
        assert!(!s.meets_thresholds(100.0, 0.0));

        let empty = RobustnessSummary::calculate(&[]);
        assert!(!empty.meets_thresholds(100.0, 0.0));
    }
}
