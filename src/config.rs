use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vrt_experiment::export::DEFAULT_FILE_PREFIX;
use vrt_experiment::ExperimentConfig;

use crate::input::ResponseKey;

/// Settings file contents. Every section and field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub experiment: ExperimentSettings,
    pub export: ExportSettings,
    pub input: InputSettings,
    pub display: DisplaySettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentSettings {
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub output_dir: PathBuf,
    pub file_prefix: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    pub response_key: ResponseKey,
}

/// Font used for on-screen text; system fonts are tried when unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub font_path: Option<PathBuf>,
}

impl Default for ExperimentSettings {
    fn default() -> Self {
        let (delay_min_ms, delay_max_ms) = ExperimentConfig::default().delay_range_ms;
        Self {
            delay_min_ms,
            delay_max_ms,
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let settings: Self = toml::from_str(&content)
            .with_context(|| format!("parsing settings in {}", path.display()))?;
        settings.experiment_config()?;
        Ok(settings)
    }

    /// Loads `path` if given, otherwise the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Experiment parameters: the fixed 10-trial balanced design with the configured delay range.
    pub fn experiment_config(&self) -> Result<ExperimentConfig> {
        let config = ExperimentConfig::default()
            .with_delay_range(self.experiment.delay_min_ms, self.experiment.delay_max_ms);
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.experiment.delay_min_ms, 2_000);
        assert_eq!(settings.export.file_prefix, "VisualReactionTestResults-");
        assert_eq!(settings.input.response_key, ResponseKey::Space);
        assert_eq!(settings.display.font_path, None);
    }

    #[test]
    fn partial_sections_override_fields() {
        let settings: Settings = toml::from_str(
            r#"
            [experiment]
            delay_max_ms = 3000

            [export]
            output_dir = "results"

            [input]
            response_key = "j"

            [display]
            font_path = "fonts/Mono.ttf"
            "#,
        )
        .unwrap();
        assert_eq!(settings.experiment.delay_min_ms, 2_000);
        assert_eq!(settings.experiment.delay_max_ms, 3_000);
        assert_eq!(settings.export.output_dir, PathBuf::from("results"));
        assert_eq!(settings.input.response_key, ResponseKey::J);
        assert_eq!(
            settings.display.font_path.as_deref(),
            Some(Path::new("fonts/Mono.ttf"))
        );
        assert_eq!(
            settings.experiment_config().unwrap().delay_range_ms,
            (2_000, 3_000)
        );
    }

    #[test]
    fn load_rejects_inverted_delay_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[experiment]\ndelay_min_ms = 6000\n").unwrap();
        assert!(Settings::load(&path).is_err());
        assert!(Settings::load(&dir.path().join("missing.toml")).is_err());
        assert_eq!(Settings::load_or_default(None).unwrap(), Settings::default());
    }
}
