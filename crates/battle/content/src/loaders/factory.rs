//! Content factory for building battle inputs from a data directory.

use std::path::{Path, PathBuf};

use battle_core::BattleConfig;

use crate::loaders::{
    CatalogLoader, ConfigLoader, LoadResult, LoadedCatalog, Scenario, ScenarioLoader,
};

/// Content factory that loads battle content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── catalog.ron
/// └── scenarios/
///     └── duel.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load battle configuration from `config.toml`.
    ///
    /// A missing file yields the default configuration.
    pub fn load_config(&self) -> LoadResult<BattleConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            return Ok(BattleConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load skills, states and effects from `catalog.ron`.
    pub fn load_catalog(&self) -> LoadResult<LoadedCatalog> {
        CatalogLoader::load(&self.data_dir.join("catalog.ron"))
    }

    /// Load a scenario from `scenarios/{name}.ron`.
    pub fn load_scenario(&self, name: &str) -> LoadResult<Scenario> {
        let path = self.data_dir.join("scenarios").join(format!("{name}.ron"));
        ScenarioLoader::load(&path)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
