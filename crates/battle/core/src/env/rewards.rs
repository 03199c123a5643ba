use crate::config::{RewardScalingConfig, ScalingBand};

/// Level-difference multiplier applied to defeat rewards.
pub trait RewardScaling {
    /// `diff` is `target_level - caster_level`.
    fn multiplier(&self, diff: i32) -> f64;
}

/// Flat curve: every defeat pays in full.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlatScaling;

impl RewardScaling for FlatScaling {
    fn multiplier(&self, _diff: i32) -> f64 {
        1.0
    }
}

/// Band table built from [`RewardScalingConfig`].
///
/// The first band containing `diff` wins; differences outside every band
/// use the fallback.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelBandScaling {
    bands: Vec<ScalingBand>,
    fallback: f64,
}

impl LevelBandScaling {
    pub fn new(bands: Vec<ScalingBand>, fallback: f64) -> Self {
        Self { bands, fallback }
    }

    /// Returns `None` when scaling is disabled or the table has no fallback;
    /// [`crate::BattleConfig::validate`] rejects the latter up front.
    pub fn from_config(config: &RewardScalingConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let fallback = config.fallback?;
        Some(Self::new(config.bands.clone(), fallback))
    }
}

impl RewardScaling for LevelBandScaling {
    fn multiplier(&self, diff: i32) -> f64 {
        self.bands
            .iter()
            .find(|band| (band.min_diff..=band.max_diff).contains(&diff))
            .map_or(self.fallback, |band| band.multiplier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> LevelBandScaling {
        LevelBandScaling::new(
            vec![
                ScalingBand {
                    min_diff: -99,
                    max_diff: -5,
                    multiplier: 0.1,
                },
                ScalingBand {
                    min_diff: 5,
                    max_diff: 99,
                    multiplier: 1.5,
                },
            ],
            1.0,
        )
    }

    #[test]
    fn bands_and_fallback() {
        let scaling = table();
        assert_eq!(scaling.multiplier(-10), 0.1);
        assert_eq!(scaling.multiplier(0), 1.0);
        assert_eq!(scaling.multiplier(7), 1.5);
    }

    #[test]
    fn disabled_config_builds_nothing() {
        assert!(LevelBandScaling::from_config(&RewardScalingConfig::default()).is_none());
        let config = RewardScalingConfig {
            enabled: true,
            bands: Vec::new(),
            fallback: Some(0.5),
        };
        let scaling = LevelBandScaling::from_config(&config).unwrap();
        assert_eq!(scaling.multiplier(3), 0.5);
    }
}
