//! Configuration loading with multi-layer merge

use crate::template::DEFAULT_MAX_DEPTH;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level sbom-tool configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ToolConfig {
    /// Workflow engine limits
    #[serde(default)]
    pub engine: EngineSettings,

    /// Remote workflow fetching
    #[serde(default)]
    pub http: HttpSettings,
}

/// Workflow engine limits
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EngineSettings {
    /// How deeply `${{ }}` references may nest
    #[serde(default = "default_max_expansion_depth")]
    pub max_expansion_depth: usize,

    /// How deeply `run-workflow` steps may nest
    #[serde(default = "default_max_workflow_depth")]
    pub max_workflow_depth: usize,
}

fn default_max_expansion_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_max_workflow_depth() -> usize {
    16
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_expansion_depth: default_max_expansion_depth(),
            max_workflow_depth: default_max_workflow_depth(),
        }
    }
}

/// Remote workflow fetching
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct HttpSettings {
    /// User-Agent header sent when fetching workflows
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_user_agent() -> String {
    format!("sbom-tool/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
        }
    }
}

/// One configuration file; only the keys it sets are applied
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    #[serde(default)]
    pub engine: EngineLayer,
    #[serde(default)]
    pub http: HttpLayer,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EngineLayer {
    pub max_expansion_depth: Option<usize>,
    pub max_workflow_depth: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct HttpLayer {
    pub user_agent: Option<String>,
}

impl ConfigLayer {
    /// Read a layer from a TOML file
    pub fn load_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let layer: Self =
            toml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))?;
        Ok(layer)
    }
}

impl ToolConfig {
    /// Load configuration from the standard hierarchy
    ///
    /// Load order (later overrides earlier):
    /// 1. Built-in defaults
    /// 2. ~/.config/sbom-tool/config.toml
    /// 3. .sbom-tool/config.toml (project)
    /// 4. An explicit `--config` file
    pub fn load(project_dir: Option<&Path>, explicit: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                let layer = ConfigLayer::load_file(&user_config_path)
                    .with_context(|| format!("loading {}", user_config_path.display()))?;
                config.apply(layer);
            }
        }

        let project_config_path = project_dir
            .map(|p| p.join(".sbom-tool/config.toml"))
            .unwrap_or_else(|| PathBuf::from(".sbom-tool/config.toml"));

        if project_config_path.exists() {
            let layer = ConfigLayer::load_file(&project_config_path)
                .with_context(|| format!("loading {}", project_config_path.display()))?;
            config.apply(layer);
        }

        if let Some(path) = explicit {
            let layer = ConfigLayer::load_file(path)
                .with_context(|| format!("loading {}", path.display()))?;
            config.apply(layer);
        }

        Ok(config)
    }

    /// Load a single file on top of the built-in defaults
    pub fn load_file(path: &Path) -> Result<Self> {
        let mut config = Self::default();
        config.apply(ConfigLayer::load_file(path)?);
        Ok(config)
    }

    /// Get the user config path (~/.config/sbom-tool/config.toml)
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("sbom-tool/config.toml"))
    }

    /// Apply a layer; every key it sets wins, even when it equals the default
    pub fn apply(&mut self, layer: ConfigLayer) {
        if let Some(depth) = layer.engine.max_expansion_depth {
            self.engine.max_expansion_depth = depth;
        }
        if let Some(depth) = layer.engine.max_workflow_depth {
            self.engine.max_workflow_depth = depth;
        }
        if let Some(user_agent) = layer.http.user_agent {
            self.http.user_agent = user_agent;
        }
    }
}
