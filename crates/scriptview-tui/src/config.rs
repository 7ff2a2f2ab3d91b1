use std::path::{Path, PathBuf};

use color_eyre::eyre::{bail, WrapErr};
use scriptview_ingest::IngestConfig;
use scriptview_session::SpeakerOrder;
use serde::{Deserialize, Serialize};

/// Viewer settings from `config.json`. Every field is optional in the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub ingest: IngestConfig,
    pub speaker_order: SpeakerOrder,
}

impl ViewerConfig {
    /// `<config dir>/scriptview/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("scriptview").join("config.json"))
    }

    /// Load from `explicit` if given (must exist), else from the default
    /// path if present, else defaults. Environment overrides are applied last.
    pub fn load(explicit: Option<&Path>) -> color_eyre::Result<Self> {
        let config = match explicit {
            Some(path) => {
                if !path.exists() {
                    bail!("config file not found: {}", path.display());
                }
                read_config(path)?
            }
            None => match Self::default_path() {
                Some(path) if path.exists() => read_config(&path)?,
                _ => Self::default(),
            },
        };
        Ok(Self {
            ingest: config.ingest.with_env_overrides(),
            ..config
        })
    }
}

fn read_config(path: &Path) -> color_eyre::Result<ViewerConfig> {
    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read config {}", path.display()))?;
    let config = serde_json::from_str(&content)
        .wrap_err_with(|| format!("invalid config {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}
