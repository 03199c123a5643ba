//! Battle configuration loader.

use std::path::Path;

use anyhow::Context;
use battle_core::BattleConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for battle configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate a [`BattleConfig`] from a TOML file.
    ///
    /// Missing keys fall back to the engine defaults. Configuration the
    /// engine cannot start with is rejected here.
    pub fn load(path: &Path) -> LoadResult<BattleConfig> {
        let content = read_file(path)?;
        Self::parse(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn parse(content: &str) -> LoadResult<BattleConfig> {
        let config: BattleConfig = toml::from_str(content).context("Failed to parse config TOML")?;
        config.validate()?;
        tracing::debug!(radius = config.ai_update_radius, "battle config loaded");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battle_core::SlotKey;

    #[test]
    fn partial_tables_keep_defaults() {
        let config = ConfigLoader::parse(
            r#"
            ai_update_radius = 12
            auto_counter_slot = "Offhand"

            [aggro]
            base = 4.0
            "#,
        )
        .unwrap();

        assert_eq!(config.ai_update_radius, 12);
        assert_eq!(config.auto_counter_slot, SlotKey::Offhand);
        assert_eq!(config.aggro.base, 4.0);
        assert_eq!(config.aggro.tp_factor, BattleConfig::default().aggro.tp_factor);
        assert_eq!(config.parry.precise_window, 12);
    }

    #[test]
    fn scaling_without_fallback_fails_validation() {
        let err = ConfigLoader::parse(
            r#"
            [reward_scaling]
            enabled = true
            bands = [{ min_diff = 0, max_diff = 5, multiplier = 1.2 }]
            "#,
        )
        .unwrap_err();

        assert!(err.to_string().contains("no fallback"));
    }
}
