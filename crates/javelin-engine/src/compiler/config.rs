//! Target configuration (javelin.toml)
//!
//! ```toml
//! [target]
//! package = "com.example.app"
//! java-version = "17"
//! source-root = "src"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the configuration file looked up by the CLI
pub const CONFIG_FILE_NAME: &str = "javelin.toml";

/// Package used when neither the file nor the command line names one
pub const DEFAULT_PACKAGE: &str = "app";

/// Java release targeted by default
pub const DEFAULT_JAVA_VERSION: u32 = 17;

/// First release that accepts `var` for local variables
pub const VAR_MIN_JAVA_VERSION: u32 = 10;

const JAVA_KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally", "float",
    "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "package", "private", "protected", "public", "return", "short", "static",
    "strictfp", "super", "switch", "synchronized", "this", "throw", "throws", "transient", "try",
    "void", "volatile", "while", "true", "false", "null",
];

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The Java version is not a recognised release
    #[error("Invalid Java version: {0}. Expected a release such as 8, 1.8 or 17")]
    InvalidJavaVersion(String),

    /// The base package is not a valid Java package name
    #[error("Invalid package name: {0}")]
    InvalidPackage(String),
}

/// Java version as written in the file: `17`, `"17"`, `1.8` or `"1.8"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VersionValue {
    Number(u32),
    Float(f64),
    Text(String),
}

impl VersionValue {
    pub fn as_text(&self) -> String {
        match self {
            VersionValue::Number(n) => n.to_string(),
            VersionValue::Float(f) => f.to_string(),
            VersionValue::Text(s) => s.clone(),
        }
    }
}

/// Configuration file root
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub target: TargetSection,
}

/// `[target]` table; every key is optional so command-line flags can fill gaps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TargetSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub java_version: Option<VersionValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<PathBuf>,
}

impl ConfigFile {
    /// Load a configuration file.
    ///
    /// A relative `source-root` is interpreted against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_str(&content)?;
        if let (Some(root), Some(dir)) = (config.target.source_root.as_mut(), path.parent()) {
            if root.is_relative() {
                *root = dir.join(&*root);
            }
        }
        Ok(config)
    }

    /// Parse configuration text.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

impl TargetSection {
    /// Values from `overrides` win over values from `self`.
    pub fn merged(self, overrides: TargetSection) -> TargetSection {
        TargetSection {
            package: overrides.package.or(self.package),
            java_version: overrides.java_version.or(self.java_version),
            source_root: overrides.source_root.or(self.source_root),
        }
    }
}

/// Validated build target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetConfig {
    /// Package prefix of every generated class (may be empty)
    pub base_package: String,
    /// Java release (8 for "1.8")
    pub java_version: u32,
    /// Directory that maps to the base package
    pub source_root: PathBuf,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_package: DEFAULT_PACKAGE.to_string(),
            java_version: DEFAULT_JAVA_VERSION,
            source_root: PathBuf::from("."),
        }
    }
}

impl TargetConfig {
    /// Build a validated configuration.
    pub fn new(
        base_package: impl Into<String>,
        java_version: &str,
        source_root: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let base_package = base_package.into();
        validate_package(&base_package)?;
        Ok(Self {
            base_package,
            java_version: parse_java_version(java_version)?,
            source_root: source_root.into(),
        })
    }

    /// Build a configuration from a (possibly partial) `[target]` table,
    /// filling missing keys with defaults.
    pub fn from_section(section: &TargetSection) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let version = match &section.java_version {
            Some(value) => value.as_text(),
            None => defaults.java_version.to_string(),
        };
        Self::new(
            section.package.clone().unwrap_or(defaults.base_package),
            &version,
            section.source_root.clone().unwrap_or(defaults.source_root),
        )
    }

    /// Whether local variables may be declared with `var`.
    pub fn allows_var(&self) -> bool {
        self.java_version >= VAR_MIN_JAVA_VERSION
    }

    /// Java package of `segments` below the base package.
    pub fn package_for(&self, segments: &[String]) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if !self.base_package.is_empty() {
            parts.push(&self.base_package);
        }
        parts.extend(segments.iter().map(String::as_str));
        parts.join(".")
    }
}

/// Parse `"1.8"` as 8 and `"17"` as 17.
pub fn parse_java_version(text: &str) -> Result<u32, ConfigError> {
    let invalid = || ConfigError::InvalidJavaVersion(text.to_string());
    let trimmed = text.trim();
    let number = match trimmed.strip_prefix("1.") {
        Some(minor) => {
            let minor: u32 = minor.parse().map_err(|_| invalid())?;
            if !(1..=8).contains(&minor) {
                return Err(invalid());
            }
            minor
        }
        None => trimmed.parse().map_err(|_| invalid())?,
    };
    if !(1..=99).contains(&number) {
        return Err(invalid());
    }
    Ok(number)
}

/// Check that `name` is a dotted sequence of Java identifiers. Empty means
/// the default package.
pub fn validate_package(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Ok(());
    }
    for segment in name.split('.') {
        if !is_java_identifier(segment) || is_java_keyword(segment) {
            return Err(ConfigError::InvalidPackage(name.to_string()));
        }
    }
    Ok(())
}

pub fn is_java_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

pub fn is_java_keyword(name: &str) -> bool {
    JAVA_KEYWORDS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_java_version_forms() {
        assert_eq!(parse_java_version("1.8").unwrap(), 8);
        assert_eq!(parse_java_version("11").unwrap(), 11);
        assert_eq!(parse_java_version(" 21 ").unwrap(), 21);
        assert!(parse_java_version("1.9").is_err());
        assert!(parse_java_version("seventeen").is_err());
        assert!(parse_java_version("0").is_err());
    }

    #[test]
    fn test_package_validation() {
        assert!(validate_package("com.example.app").is_ok());
        assert!(validate_package("").is_ok());
        assert!(validate_package("com..app").is_err());
        assert!(validate_package("com.class").is_err());
        assert!(validate_package("1com").is_err());
    }

    #[test]
    fn test_parse_file_with_float_version() {
        let file = ConfigFile::from_str(
            "[target]\npackage = \"org.demo\"\njava-version = 1.8\nsource-root = \"src\"\n",
        )
        .unwrap();
        let config = TargetConfig::from_section(&file.target).unwrap();
        assert_eq!(config.base_package, "org.demo");
        assert_eq!(config.java_version, 8);
        assert!(!config.allows_var());
        assert_eq!(config.source_root, PathBuf::from("src"));
    }

    #[test]
    fn test_overrides_win() {
        let file = TargetSection {
            package: Some("from.file".to_string()),
            java_version: Some(VersionValue::Number(11)),
            source_root: None,
        };
        let flags = TargetSection {
            package: Some("from.flags".to_string()),
            ..Default::default()
        };
        let config = TargetConfig::from_section(&file.merged(flags)).unwrap();
        assert_eq!(config.base_package, "from.flags");
        assert_eq!(config.java_version, 11);
        assert_eq!(config.source_root, PathBuf::from("."));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigFile::from_file(&dir.path().join(CONFIG_FILE_NAME)).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_relative_root_resolved_against_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[target]\nsource-root = \"src\"\n").unwrap();
        let file = ConfigFile::from_file(&path).unwrap();
        assert_eq!(file.target.source_root, Some(dir.path().join("src")));
    }

    #[test]
    fn test_package_for_segments() {
        let config = TargetConfig::default();
        assert_eq!(config.package_for(&["util".to_string()]), "app.util");
        let bare = TargetConfig::new("", "17", ".").unwrap();
        assert_eq!(bare.package_for(&[]), "");
    }
}
