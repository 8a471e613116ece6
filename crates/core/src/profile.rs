use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(String),
    #[error("Invalid table name '{0}': use letters, digits and underscores only")]
    InvalidTableName(String),
    #[error("No label profiles configured")]
    NoProfiles,
    #[error("Duplicate label profile '{0}'")]
    DuplicateProfile(String),
    #[error("Unknown label profile '{0}'")]
    UnknownProfile(String),
    #[error("Label profile '{0}' has an empty price symbol")]
    EmptyPriceSymbol(String),
}

/// How the product name and price are read off a label. Weight is shared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum LabelStrategy {
    /// Name is every line before the first numeric one; price is a decimal
    /// amount followed by the currency symbol.
    GenericAccumulation {
        #[serde(default = "default_currency")]
        currency: String,
    },
    /// Name is the first purely alphabetic line; price is a digit run
    /// followed by the per-unit token, with the decimal point restored.
    AlphabeticFirstLine {
        #[serde(default = "default_unit_token")]
        unit_token: String,
    },
}

fn default_currency() -> String {
    "€".to_string()
}

fn default_unit_token() -> String {
    "€/kom".to_string()
}

impl LabelStrategy {
    pub fn generic() -> Self {
        LabelStrategy::GenericAccumulation { currency: default_currency() }
    }

    pub fn alphabetic() -> Self {
        LabelStrategy::AlphabeticFirstLine { unit_token: default_unit_token() }
    }
}

impl LabelStrategy {
    /// The text a price must be followed by: currency or per-unit token.
    pub fn price_symbol(&self) -> &str {
        match self {
            LabelStrategy::GenericAccumulation { currency } => currency,
            LabelStrategy::AlphabeticFirstLine { unit_token } => unit_token,
        }
    }
}

impl fmt::Display for LabelStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelStrategy::GenericAccumulation { .. } => write!(f, "generic_accumulation"),
            LabelStrategy::AlphabeticFirstLine { .. } => write!(f, "alphabetic_first_line"),
        }
    }
}

/// SQL identifier for a scan table. Spliced into statements, so it is
/// restricted to `[A-Za-z_][A-Za-z0-9_]*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TableName(String);

impl TableName {
    pub fn new(name: impl Into<String>) -> Result<Self, ConfigError> {
        let name = name.into();
        let mut chars = name.chars();
        let valid = match chars.next() {
            Some(first) => {
                (first.is_ascii_alphabetic() || first == '_')
                    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            None => false,
        };
        if valid {
            Ok(TableName(name))
        } else {
            Err(ConfigError::InvalidTableName(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TableName {
    type Error = ConfigError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        TableName::new(s)
    }
}

impl From<TableName> for String {
    fn from(t: TableName) -> Self {
        t.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One label source: which parsing strategy applies and where its scans go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelProfile {
    pub name: String,
    /// Database file; relative paths resolve against the data directory.
    pub database: PathBuf,
    pub table: TableName,
    #[serde(flatten)]
    pub strategy: LabelStrategy,
}

impl LabelProfile {
    pub fn lidl() -> Self {
        LabelProfile {
            name: "lidl".to_string(),
            database: PathBuf::from("lidl_ocr_data.db"),
            table: TableName("lidl_ocr_data".to_string()),
            strategy: LabelStrategy::generic(),
        }
    }

    pub fn per_piece() -> Self {
        LabelProfile {
            name: "per_piece".to_string(),
            database: PathBuf::from("ocr_data.db"),
            table: TableName("ocr_data".to_string()),
            strategy: LabelStrategy::alphabetic(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_profile_name")]
    pub default_profile: String,
    #[serde(default = "builtin_profiles")]
    pub profiles: Vec<LabelProfile>,
}

fn default_profile_name() -> String {
    "lidl".to_string()
}

fn builtin_profiles() -> Vec<LabelProfile> {
    vec![LabelProfile::lidl(), LabelProfile::per_piece()]
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            default_profile: default_profile_name(),
            profiles: builtin_profiles(),
        }
    }
}

impl AppConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig =
            toml::from_str(toml_content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.profiles.is_empty() {
            return Err(ConfigError::NoProfiles);
        }
        let mut seen = HashSet::new();
        for p in &self.profiles {
            if !seen.insert(p.name.as_str()) {
                return Err(ConfigError::DuplicateProfile(p.name.clone()));
            }
            if p.strategy.price_symbol().trim().is_empty() {
                return Err(ConfigError::EmptyPriceSymbol(p.name.clone()));
            }
        }
        self.profile(None).map(|_| ())
    }

    /// Look up a profile by name, or the default profile when `name` is `None`.
    pub fn profile(&self, name: Option<&str>) -> Result<&LabelProfile, ConfigError> {
        let wanted = name.unwrap_or(self.default_profile.as_str());
        self.profiles
            .iter()
            .find(|p| p.name == wanted)
            .ok_or_else(|| ConfigError::UnknownProfile(wanted.to_string()))
    }
}
