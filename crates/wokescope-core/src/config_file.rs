use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_SPLIT_YEAR: i32 = 2011;
pub const DEFAULT_MIN_AUTHOR_PUBS: usize = 5;
pub const DEFAULT_TOP_KEYWORDS: usize = 500;
pub const DEFAULT_WORD_CLOUD_LIMIT: usize = 120;
pub const DEFAULT_MOVING_AVERAGE_WINDOW: usize = 1;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("failed to write config: {0}")]
    Io(#[from] std::io::Error),
}

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub extraction: Option<ExtractionConfig>,
    pub aggregation: Option<AggregationConfig>,
}

/// Additions and replacements for the author/type extraction tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Appended to the built-in noise phrases.
    pub extra_noise_phrases: Option<Vec<String>>,
    /// Appended to the built-in affiliation keywords.
    pub extra_affiliation_keywords: Option<Vec<String>>,
    /// Appended to the built-in institution stopwords.
    pub extra_stopwords: Option<Vec<String>>,
    /// Replaces the journals allowed to infer a missing article type.
    pub infer_type_journals: Option<Vec<String>>,
    /// Replaces the editorial-note pattern.
    pub editorial_note_pattern: Option<String>,
    pub max_name_tokens: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregationConfig {
    pub split_year: Option<i32>,
    pub min_author_pubs: Option<usize>,
    pub top_keywords: Option<usize>,
    pub word_cloud_limit: Option<usize>,
    pub moving_average_window: Option<usize>,
}

/// Aggregation knobs with defaults filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationSettings {
    pub split_year: i32,
    pub min_author_pubs: usize,
    pub top_keywords: usize,
    pub word_cloud_limit: usize,
    pub moving_average_window: usize,
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            split_year: DEFAULT_SPLIT_YEAR,
            min_author_pubs: DEFAULT_MIN_AUTHOR_PUBS,
            top_keywords: DEFAULT_TOP_KEYWORDS,
            word_cloud_limit: DEFAULT_WORD_CLOUD_LIMIT,
            moving_average_window: DEFAULT_MOVING_AVERAGE_WINDOW,
        }
    }
}

impl ConfigFile {
    pub fn aggregation_settings(&self) -> AggregationSettings {
        let defaults = AggregationSettings::default();
        let Some(agg) = self.aggregation.as_ref() else {
            return defaults;
        };
        AggregationSettings {
            split_year: agg.split_year.unwrap_or(defaults.split_year),
            min_author_pubs: agg.min_author_pubs.unwrap_or(defaults.min_author_pubs),
            top_keywords: agg.top_keywords.unwrap_or(defaults.top_keywords),
            word_cloud_limit: agg.word_cloud_limit.unwrap_or(defaults.word_cloud_limit),
            moving_average_window: agg
                .moving_average_window
                .unwrap_or(defaults.moving_average_window),
        }
    }
}

/// Platform config directory path: `<config_dir>/wokescope/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("wokescope").join("config.toml"))
}

/// Load config by cascading CWD `.wokescope.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".wokescope.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparsable config file");
            None
        }
    }
}

fn pick<S, T>(overlay: Option<&S>, base: Option<&S>, field: impl Fn(&S) -> Option<T>) -> Option<T> {
    overlay.and_then(&field).or_else(|| base.and_then(&field))
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let (be, oe) = (base.extraction.as_ref(), overlay.extraction.as_ref());
    let (ba, oa) = (base.aggregation.as_ref(), overlay.aggregation.as_ref());
    ConfigFile {
        extraction: Some(ExtractionConfig {
            extra_noise_phrases: pick(oe, be, |e| e.extra_noise_phrases.clone()),
            extra_affiliation_keywords: pick(oe, be, |e| e.extra_affiliation_keywords.clone()),
            extra_stopwords: pick(oe, be, |e| e.extra_stopwords.clone()),
            infer_type_journals: pick(oe, be, |e| e.infer_type_journals.clone()),
            editorial_note_pattern: pick(oe, be, |e| e.editorial_note_pattern.clone()),
            max_name_tokens: pick(oe, be, |e| e.max_name_tokens),
        }),
        aggregation: Some(AggregationConfig {
            split_year: pick(oa, ba, |a| a.split_year),
            min_author_pubs: pick(oa, ba, |a| a.min_author_pubs),
            top_keywords: pick(oa, ba, |a| a.top_keywords),
            word_cloud_limit: pick(oa, ba, |a| a.word_cloud_limit),
            moving_average_window: pick(oa, ba, |a| a.moving_average_window),
        }),
    }
}

/// Save the current config to the platform config directory.
pub fn save_config(config: &ConfigFile) -> Result<PathBuf, ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to_path(config, &path)?;
    Ok(path)
}

pub fn save_to_path(config: &ConfigFile, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregation_round_trip_toml() {
        let config = ConfigFile {
            aggregation: Some(AggregationConfig {
                split_year: Some(2015),
                ..Default::default()
            }),
            ..Default::default()
        };
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: ConfigFile = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.aggregation.unwrap().split_year, Some(2015));
    }

    #[test]
    fn missing_sections_use_defaults() {
        let parsed: ConfigFile = toml::from_str("[extraction]\nmax_name_tokens = 5\n").unwrap();
        assert!(parsed.aggregation.is_none());
        assert_eq!(parsed.aggregation_settings(), AggregationSettings::default());
        assert_eq!(parsed.aggregation_settings().split_year, 2011);
        assert_eq!(parsed.extraction.unwrap().max_name_tokens, Some(5));
    }

    #[test]
    fn merge_overlay_wins_field_by_field() {
        let base = ConfigFile {
            aggregation: Some(AggregationConfig {
                split_year: Some(2010),
                top_keywords: Some(50),
                ..Default::default()
            }),
            ..Default::default()
        };
        let overlay = ConfigFile {
            aggregation: Some(AggregationConfig {
                split_year: Some(2018),
                ..Default::default()
            }),
            extraction: Some(ExtractionConfig {
                extra_stopwords: Some(vec!["Consortium".into()]),
                ..Default::default()
            }),
        };
        let merged = merge(base, overlay);
        let settings = merged.aggregation_settings();
        assert_eq!(settings.split_year, 2018);
        assert_eq!(settings.top_keywords, 50);
        assert_eq!(settings.min_author_pubs, DEFAULT_MIN_AUTHOR_PUBS);
        assert_eq!(
            merged.extraction.unwrap().extra_stopwords.unwrap(),
            vec!["Consortium".to_string()]
        );
    }

    #[test]
    fn load_and_save_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = ConfigFile {
            aggregation: Some(AggregationConfig {
                word_cloud_limit: Some(40),
                ..Default::default()
            }),
            ..Default::default()
        };
        save_to_path(&config, &path).unwrap();
        assert_eq!(load_from_path(&path), Some(config));

        std::fs::write(&path, "not = [valid").unwrap();
        assert_eq!(load_from_path(&path), None);
        assert_eq!(load_from_path(&dir.path().join("absent.toml")), None);
    }
}
