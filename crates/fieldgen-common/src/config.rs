use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const CONFIG_FILE_NAME: &str = "Fieldgen.toml";

/// What the compiler does with members that cannot become resolvers
/// (void, by-ref, and bare-future methods).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnsupportedMemberPolicy {
    /// Leave them out without a diagnostic.
    #[default]
    Skip,
    /// Leave them out and report a warning.
    Warn,
    /// Report an error and fail the compilation.
    Error,
}

impl UnsupportedMemberPolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "skip" => Some(Self::Skip),
            "warn" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// Settings for one compiler run, from `Fieldgen.toml` or defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldgenConfig {
    pub unsupported_members: UnsupportedMemberPolicy,
    pub pretty: bool,
    /// Directory containing the config file, if one was loaded.
    pub root_dir: Option<PathBuf>,
}

impl Default for FieldgenConfig {
    fn default() -> Self {
        Self {
            unsupported_members: UnsupportedMemberPolicy::Skip,
            pretty: true,
            root_dir: None,
        }
    }
}

/// Raw TOML structure for deserialization.
#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    compiler: RawCompilerSection,
    #[serde(default)]
    output: RawOutputSection,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RawCompilerSection {
    #[serde(default)]
    unsupported_members: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RawOutputSection {
    #[serde(default)]
    pretty: Option<bool>,
}

/// Errors that can occur when loading a config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read Fieldgen.toml: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("invalid Fieldgen.toml: {0}")]
    ParseError(String),
    #[error("invalid Fieldgen.toml: unknown unsupported_members policy '{0}'")]
    UnknownPolicy(String),
}

/// Walk up from `start_dir` looking for `Fieldgen.toml`.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

pub fn load_config(path: &Path) -> Result<FieldgenConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let root_dir = path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    parse_config(&content, Some(root_dir))
}

pub fn parse_config(
    content: &str,
    root_dir: Option<PathBuf>,
) -> Result<FieldgenConfig, ConfigError> {
    let raw: RawConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    let defaults = FieldgenConfig::default();

    let unsupported_members = match raw.compiler.unsupported_members {
        Some(s) => UnsupportedMemberPolicy::parse(&s).ok_or(ConfigError::UnknownPolicy(s))?,
        None => defaults.unsupported_members,
    };

    Ok(FieldgenConfig {
        unsupported_members,
        pretty: raw.output.pretty.unwrap_or(defaults.pretty),
        root_dir,
    })
}

/// Find and load the config starting from an input file's directory.
/// A missing file yields the defaults.
pub fn find_and_load_config(input_file: &Path) -> Result<FieldgenConfig, ConfigError> {
    let start_dir = input_file.parent().unwrap_or_else(|| Path::new("."));
    match find_config(start_dir) {
        Some(path) => load_config(&path),
        None => Ok(FieldgenConfig::default()),
    }
}
