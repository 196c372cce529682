use std::fs;
use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level project configuration loaded from `.apigen.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApigenConfig {
    pub input: String,
    /// Built-in profile id (`jaxrs_spec`, `typescript`) or a path to a profile YAML.
    pub target: String,
    pub flags: FlagSettings,
}

impl Default for ApigenConfig {
    fn default() -> Self {
        Self {
            input: "openapi.yaml".to_string(),
            target: "jaxrs_spec".to_string(),
            flags: FlagSettings::default(),
        }
    }
}

/// One layer of flag settings. `None` means "not set at this layer".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlagSettings {
    pub use_tags: Option<bool>,
    pub support_async: Option<bool>,
    pub interface_only: Option<bool>,
    pub return_response: Option<bool>,
    pub enum_unknown_default_case: Option<bool>,
    pub use_reactive: Option<bool>,
    pub spec_file_location: Option<String>,
}

impl FlagSettings {
    /// Layer `self` on top of `lower`: every value set here wins.
    pub fn over(&self, lower: &FlagSettings) -> FlagSettings {
        FlagSettings {
            use_tags: self.use_tags.or(lower.use_tags),
            support_async: self.support_async.or(lower.support_async),
            interface_only: self.interface_only.or(lower.interface_only),
            return_response: self.return_response.or(lower.return_response),
            enum_unknown_default_case: self
                .enum_unknown_default_case
                .or(lower.enum_unknown_default_case),
            use_reactive: self.use_reactive.or(lower.use_reactive),
            spec_file_location: self
                .spec_file_location
                .clone()
                .or_else(|| lower.spec_file_location.clone()),
        }
    }
}

/// The immutable flag set threaded through every resolution call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeatureFlags {
    pub use_tags: bool,
    pub support_async: bool,
    pub interface_only: bool,
    pub return_response: bool,
    pub enum_unknown_default_case: bool,
    pub use_reactive: bool,
    /// Where the packaging step copies the contract; `None` disables the copy.
    pub spec_file_location: Option<String>,
}

impl FeatureFlags {
    /// Resolve flags with precedence override > global > built-in default.
    pub fn resolve(
        global: &FlagSettings,
        overrides: &FlagSettings,
        default_spec_location: &str,
    ) -> Result<Self, ConfigError> {
        let merged = overrides.over(global);
        let spec_file_location = match merged.spec_file_location.as_deref() {
            Some(raw) => validate_spec_file_location(raw)?,
            None => validate_spec_file_location(default_spec_location)?,
        };
        Ok(Self {
            use_tags: merged.use_tags.unwrap_or(false),
            support_async: merged.support_async.unwrap_or(false),
            interface_only: merged.interface_only.unwrap_or(false),
            return_response: merged.return_response.unwrap_or(false),
            enum_unknown_default_case: merged.enum_unknown_default_case.unwrap_or(false),
            use_reactive: merged.use_reactive.unwrap_or(false),
            spec_file_location,
        })
    }
}

/// Empty means "do not embed"; anything else must stay inside the output tree.
fn validate_spec_file_location(raw: &str) -> Result<Option<String>, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let path = Path::new(trimmed);
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(ConfigError::InvalidSpecFileLocation(raw.to_string()));
    }
    Ok(Some(trimmed.to_string()))
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".apigen.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<ApigenConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let config: ApigenConfig =
        serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Yaml {
            path: path.display().to_string(),
            source,
        })?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# apigen configuration
input: openapi.yaml
target: jaxrs_spec     # jaxrs_spec | typescript | path/to/profile.yaml

flags:
  useTags: false
  supportAsync: false
  interfaceOnly: false
  returnResponse: false
  enumUnknownDefaultCase: false
  useReactive: false
  # specFileLocation: src/main/openapi/openapi.yaml   # "" disables the embedded copy
"#
}
