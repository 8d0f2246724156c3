//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/foamdict/foamdict.toml`
//! 3. Local config: `.foamdict.toml` next to the edited dictionary
//! 4. Environment variables: `FOAMDICT_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::Deserialize;
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::FormatOptions;

pub const LOCAL_CONFIG_FILE: &str = ".foamdict.toml";

/// Raw settings for intermediate parsing.
///
/// `None` means the layer does not specify the key and the value is inherited.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RawSettings {
    pub keyword_width: Option<usize>,
    pub indent_width: Option<usize>,
    pub banner_version: Option<String>,
    pub banner_web: Option<String>,
    pub preserve_header: Option<bool>,
}

/// Unified configuration for foamdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Column at which entry values start
    pub keyword_width: usize,
    /// Spaces per nesting level
    pub indent_width: usize,
    /// Version shown in the file banner
    pub banner_version: String,
    /// Web address shown in the file banner
    pub banner_web: String,
    /// Keep the `FoamFile` header when clearing the root dictionary
    pub preserve_header: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let format = FormatOptions::default();
        Self {
            keyword_width: format.keyword_width,
            indent_width: format.indent_width,
            banner_version: format.banner_version,
            banner_web: format.banner_web,
            preserve_header: true,
        }
    }
}

/// Get the XDG config directory for foamdict.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "foamdict").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("foamdict.toml"))
}

/// Get the path to the local config file for a case directory.
pub fn local_config_path(dict_dir: &Path) -> PathBuf {
    dict_dir.join(LOCAL_CONFIG_FILE)
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Options handed to the renderer.
    pub fn format(&self) -> FormatOptions {
        FormatOptions {
            keyword_width: self.keyword_width,
            indent_width: self.indent_width,
            banner_version: self.banner_version.clone(),
            banner_web: self.banner_web.clone(),
        }
    }

    /// Overlay wins where it specifies a value, otherwise keep self.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            keyword_width: overlay.keyword_width.unwrap_or(self.keyword_width),
            indent_width: overlay.indent_width.unwrap_or(self.indent_width),
            banner_version: overlay
                .banner_version
                .clone()
                .unwrap_or_else(|| self.banner_version.clone()),
            banner_web: overlay
                .banner_web
                .clone()
                .unwrap_or_else(|| self.banner_web.clone()),
            preserve_header: overlay.preserve_header.unwrap_or(self.preserve_header),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `dict_dir` - Directory of the edited dictionary, searched for `.foamdict.toml`
    pub fn load(dict_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref(), dict_dir)
    }

    /// Load settings from an explicit global config location.
    pub fn load_from(
        global_path: Option<&Path>,
        dict_dir: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_path {
            if global_path.exists() {
                debug!("load: global config {}", global_path.display());
                let raw = load_raw_settings(global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Case-local config
        if let Some(dir) = dict_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("load: local config {}", local_path.display());
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables
        Self::apply_env_overrides(current)
    }

    /// Apply FOAMDICT_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("FOAMDICT")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;

        if let Some(val) = optional(config.get::<usize>("keyword_width"))? {
            settings.keyword_width = val;
        }
        if let Some(val) = optional(config.get::<usize>("indent_width"))? {
            settings.indent_width = val;
        }
        if let Some(val) = optional(config.get_string("banner_version"))? {
            settings.banner_version = val;
        }
        if let Some(val) = optional(config.get_string("banner_web"))? {
            settings.banner_web = val;
        }
        if let Some(val) = optional(config.get_bool("preserve_header"))? {
            settings.preserve_header = val;
        }

        Ok(settings)
    }
}

/// A missing key is fine, a malformed value is a config error.
fn optional<T>(result: Result<T, ConfigError>) -> Result<Option<T>, ApplicationError> {
    match result {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(config_err(e)),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn given_no_config_files_when_loading_then_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let settings =
            Settings::load_from(Some(&temp.path().join("missing.toml")), Some(temp.path()))
                .expect("load defaults");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.format(), FormatOptions::default());
    }

    #[test]
    fn given_partial_overlay_when_merging_then_unspecified_keys_inherit() {
        let base = Settings::default();
        let overlay = RawSettings {
            keyword_width: Some(20),
            banner_version: Some("v2312".into()),
            ..RawSettings::default()
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.keyword_width, 20);
        assert_eq!(merged.banner_version, "v2312");
        assert_eq!(merged.indent_width, 4);
        assert!(merged.preserve_header);
    }

    #[test]
    fn given_global_and_local_files_when_loading_then_local_wins() {
        let temp = TempDir::new().unwrap();
        let global = temp.path().join("global.toml");
        std::fs::write(&global, "keyword_width = 24\nindent_width = 2\n").unwrap();
        let case_dir = temp.path().join("case");
        std::fs::create_dir_all(&case_dir).unwrap();
        std::fs::write(
            local_config_path(&case_dir),
            "keyword_width = 12\npreserve_header = false\n",
        )
        .unwrap();

        let settings = Settings::load_from(Some(&global), Some(&case_dir)).unwrap();

        assert_eq!(settings.keyword_width, 12);
        assert_eq!(settings.indent_width, 2);
        assert!(!settings.preserve_header);
    }

    #[test]
    fn given_unknown_key_when_loading_then_config_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(local_config_path(temp.path()), "keyword_widht = 3\n").unwrap();

        let result = Settings::load_from(None, Some(temp.path()));

        assert!(matches!(result, Err(ApplicationError::Config { .. })));
    }
}
