//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/hierfix/hierfix.toml`
//! 3. Local config: `<input_dir>/.hierfix.toml` (next to the input file)
//! 4. Environment variables: `HIERFIX_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::id::{DEFAULT_GENERATION_PREFIX, DEFAULT_SEPARATOR};
use crate::domain::{BuildOptions, DomainError, IdScheme, InputFormat};

/// How node ids are written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IdSettings {
    /// Token between id segments (default: ".")
    pub separator: String,
    /// Leading token of every id (default: "gen")
    pub generation_prefix: String,
    /// Id given to a synthesized root (default: the generation prefix)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_id: Option<String>,
}

impl Default for IdSettings {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.into(),
            generation_prefix: DEFAULT_GENERATION_PREFIX.into(),
            root_id: None,
        }
    }
}

/// Defaults for hierarchy construction; CLI flags can switch them on.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BuildSettings {
    pub fix_breadth_gaps: bool,
    pub use_subtree: bool,
    /// Most siblings breadth repair may create under one node (default: unbounded)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_breadth_gap: Option<usize>,
}

/// Column layout of input files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InputSettings {
    pub delimiter: char,
    pub class_column: bool,
    pub name_column: bool,
    pub skip_header: bool,
}

impl Default for InputSettings {
    fn default() -> Self {
        let format = InputFormat::default();
        Self {
            delimiter: format.delimiter,
            class_column: format.class_column,
            name_column: format.name_column,
            skip_header: format.skip_header,
        }
    }
}

/// Raw settings for intermediate parsing (fields are Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub ids: RawIdSettings,
    pub build: RawBuildSettings,
    pub input: RawInputSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawIdSettings {
    pub separator: Option<String>,
    pub generation_prefix: Option<String>,
    pub root_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawBuildSettings {
    pub fix_breadth_gaps: Option<bool>,
    pub use_subtree: Option<bool>,
    pub max_breadth_gap: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawInputSettings {
    pub delimiter: Option<char>,
    pub class_column: Option<bool>,
    pub name_column: Option<bool>,
    pub skip_header: Option<bool>,
}

/// Unified configuration for hierfix.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub ids: IdSettings,
    pub build: BuildSettings,
    pub input: InputSettings,
}

/// Get the XDG config directory for hierfix.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "hierfix").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("hierfix.toml"))
}

/// Get the path to the local config file in an input directory.
pub fn local_config_path(input_dir: &Path) -> PathBuf {
    input_dir.join(".hierfix.toml")
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

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Overlay wins wherever it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            ids: IdSettings {
                separator: overlay
                    .ids
                    .separator
                    .clone()
                    .unwrap_or_else(|| self.ids.separator.clone()),
                generation_prefix: overlay
                    .ids
                    .generation_prefix
                    .clone()
                    .unwrap_or_else(|| self.ids.generation_prefix.clone()),
                root_id: overlay.ids.root_id.clone().or_else(|| self.ids.root_id.clone()),
            },
            build: BuildSettings {
                fix_breadth_gaps: overlay
                    .build
                    .fix_breadth_gaps
                    .unwrap_or(self.build.fix_breadth_gaps),
                use_subtree: overlay.build.use_subtree.unwrap_or(self.build.use_subtree),
                max_breadth_gap: overlay.build.max_breadth_gap.or(self.build.max_breadth_gap),
            },
            input: InputSettings {
                delimiter: overlay.input.delimiter.unwrap_or(self.input.delimiter),
                class_column: overlay.input.class_column.unwrap_or(self.input.class_column),
                name_column: overlay.input.name_column.unwrap_or(self.input.name_column),
                skip_header: overlay.input.skip_header.unwrap_or(self.input.skip_header),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `input_dir` - Optional directory of the input file for local config
    pub fn load(input_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config next to the input
        if let Some(dir) = input_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        Ok(current)
    }

    /// Load one explicit config file on top of the defaults, ignoring every other layer.
    pub fn load_file(path: &Path) -> Result<Self, ApplicationError> {
        let raw = load_raw_settings(path)?;
        Ok(Self::default().merge_with(&raw))
    }

    /// Apply HIERFIX_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("HIERFIX").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("ids.separator") {
            settings.ids.separator = val;
        }
        if let Ok(val) = config.get_string("ids.generation_prefix") {
            settings.ids.generation_prefix = val;
        }
        if let Ok(val) = config.get_string("ids.root_id") {
            settings.ids.root_id = Some(val);
        }
        if let Ok(val) = config.get_bool("build.fix_breadth_gaps") {
            settings.build.fix_breadth_gaps = val;
        }
        if let Ok(val) = config.get_bool("build.use_subtree") {
            settings.build.use_subtree = val;
        }
        if let Ok(val) = config.get_int("build.max_breadth_gap") {
            let limit = usize::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("HIERFIX_BUILD__MAX_BREADTH_GAP must not be negative, got {}", val),
            })?;
            settings.build.max_breadth_gap = Some(limit);
        }
        if let Ok(val) = config.get_string("input.delimiter") {
            let mut chars = val.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => settings.input.delimiter = c,
                _ => {
                    return Err(ApplicationError::Config {
                        message: format!("HIERFIX_INPUT__DELIMITER must be one character, got '{}'", val),
                    })
                }
            }
        }
        if let Ok(val) = config.get_bool("input.class_column") {
            settings.input.class_column = val;
        }
        if let Ok(val) = config.get_bool("input.name_column") {
            settings.input.name_column = val;
        }
        if let Ok(val) = config.get_bool("input.skip_header") {
            settings.input.skip_header = val;
        }

        Ok(settings)
    }

    /// Identifier scheme described by these settings.
    pub fn id_scheme(&self) -> Result<IdScheme, DomainError> {
        let root_id = self
            .ids
            .root_id
            .as_deref()
            .unwrap_or(&self.ids.generation_prefix);
        IdScheme::new(&self.ids.separator, &self.ids.generation_prefix, root_id)
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            fix_breadth_gaps: self.build.fix_breadth_gaps,
            use_subtree: self.build.use_subtree,
            max_breadth_gap: self.build.max_breadth_gap,
        }
    }

    pub fn input_format(&self) -> InputFormat {
        InputFormat {
            delimiter: self.input.delimiter,
            class_column: self.input.class_column,
            name_column: self.input.name_column,
            skip_header: self.input.skip_header,
        }
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }
}
