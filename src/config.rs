//! Tunable policy configuration for the inspection engine.

use serde::Deserialize;
use std::time::Duration;

/// Policy knobs governing generation, submission validation, and sweeping.
///
/// All fields have production defaults; deployments typically deserialize
/// this from a configuration file and override selectively.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PatrolConfig {
    /// Minimum spacing between successive submissions for one checkpoint.
    pub cooldown_minutes: u32,
    /// Maximum tolerated gap between a photo's claimed capture time and the
    /// submission instant.
    pub photo_drift_minutes: u32,
    /// Minimum number of photos required per submission.
    pub min_photos: usize,
    /// Days a completed task is kept before retention cleanup removes it.
    pub retention_days: u32,
    /// Days beyond the start date covered by a default generation call.
    pub generation_horizon_days: u32,
    /// Seconds between overdue-sweep runs.
    pub overdue_sweep_interval_secs: u64,
    /// Seconds between retention-cleanup runs.
    pub retention_sweep_interval_secs: u64,
}

impl Default for PatrolConfig {
    fn default() -> Self {
        Self {
            cooldown_minutes: 15,
            photo_drift_minutes: 5,
            min_photos: 1,
            retention_days: 3,
            generation_horizon_days: 6,
            overdue_sweep_interval_secs: 300,
            retention_sweep_interval_secs: 86_400,
        }
    }
}

impl PatrolConfig {
    /// Returns the overdue-sweep cadence as a [`Duration`].
    #[must_use]
    pub const fn overdue_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.overdue_sweep_interval_secs)
    }

    /// Returns the retention-cleanup cadence as a [`Duration`].
    #[must_use]
    pub const fn retention_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.retention_sweep_interval_secs)
    }
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]
mod tests {
    use super::PatrolConfig;

    #[test]
    fn defaults_match_production_policy() {
        let config = PatrolConfig::default();
        assert_eq!(config.cooldown_minutes, 15);
        assert_eq!(config.photo_drift_minutes, 5);
        assert_eq!(config.min_photos, 1);
        assert_eq!(config.retention_days, 3);
        assert_eq!(config.generation_horizon_days, 6);
    }

    #[test]
    fn partial_overrides_keep_remaining_defaults() {
        let config: PatrolConfig =
            serde_json::from_str(r#"{"cooldown_minutes": 30}"#).expect("valid config json");
        assert_eq!(config.cooldown_minutes, 30);
        assert_eq!(config.retention_days, 3);
    }
}
