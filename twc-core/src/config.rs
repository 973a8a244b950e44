use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::{
    error::Error,
    model::{Format, Units},
};

pub const DEFAULT_HOST: &str = "http://api.theweatherchannel.com";
pub const DEFAULT_LOCALE: &str = "en_GB";
pub const DEFAULT_COUNTRY: &str = "UK";

/// Client configuration, stored on disk as TOML.
///
/// Example TOML:
/// ```toml
/// apikey = "..."
/// format = "xml"
/// units = "s"
/// country = "US"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(rename = "apikey")]
    pub api_key: String,

    #[serde(default)]
    pub format: Format,

    #[serde(default)]
    pub units: Units,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_locale")]
    pub locale: String,

    /// Two-letter code, e.g. "UK", "US", "GM", "FR", "RS".
    #[serde(default = "default_country")]
    pub country: String,

    /// If false, no `country` parameter is sent.
    #[serde(default = "default_true")]
    pub country_enabled: bool,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}

fn default_country() -> String {
    DEFAULT_COUNTRY.to_string()
}

fn default_true() -> bool {
    true
}

/// Two ASCII characters, upper-cased. `None` for anything else.
pub(crate) fn normalize_country(code: &str) -> Option<String> {
    (code.len() == 2 && code.is_ascii()).then(|| code.to_ascii_uppercase())
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            format: Format::default(),
            units: Units::default(),
            host: default_host(),
            locale: default_locale(),
            country: default_country(),
            country_enabled: true,
        }
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn with_units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Stored as given; [`ClientConfig::validate`] checks it.
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    /// Enforce the schema rules serde cannot express.
    ///
    /// A lower-case country code is accepted and normalized to upper case.
    pub fn validate(&mut self) -> Result<(), Error> {
        for (name, value) in [
            ("apikey", &self.api_key),
            ("host", &self.host),
            ("locale", &self.locale),
            ("country", &self.country),
        ] {
            if value.trim().is_empty() {
                return Err(Error::InvalidConfig(format!("'{name}' cannot be empty")));
            }
        }

        self.country = normalize_country(&self.country).ok_or_else(|| {
            Error::InvalidConfig(format!(
                "'country' must be a two-letter code, got \"{}\"",
                self.country
            ))
        })?;

        Ok(())
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let mut cfg: ClientConfig =
            toml::from_str(contents).context("Failed to parse TWC configuration")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }

    /// Load config from disk. `Ok(None)` if nothing has been configured yet.
    pub fn load() -> Result<Option<Self>> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg = Self::from_toml(&contents)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(Some(cfg))
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(&path, self.to_toml()?)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(path)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", "weatherchannel", "twc")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_carries_schema_defaults() {
        let cfg = ClientConfig::new("KEY");

        assert_eq!(cfg.format, Format::Json);
        assert_eq!(cfg.units, Units::Metric);
        assert_eq!(cfg.host, "http://api.theweatherchannel.com");
        assert_eq!(cfg.locale, "en_GB");
        assert_eq!(cfg.country, "UK");
        assert!(cfg.country_enabled);
    }

    #[test]
    fn minimal_toml_fills_defaults() {
        let cfg = ClientConfig::from_toml(r#"apikey = "KEY""#).expect("valid config");
        assert_eq!(cfg, ClientConfig::new("KEY"));
    }

    #[test]
    fn full_toml_is_read() {
        let cfg = ClientConfig::from_toml(
            r#"
            apikey = "KEY"
            format = "xml"
            units = "s"
            host = "http://localhost:8080"
            locale = "de_DE"
            country = "gm"
            country_enabled = false
            "#,
        )
        .expect("valid config");

        assert_eq!(cfg.format, Format::Xml);
        assert_eq!(cfg.units, Units::Standard);
        assert_eq!(cfg.host, "http://localhost:8080");
        assert_eq!(cfg.locale, "de_DE");
        assert_eq!(cfg.country, "GM");
        assert!(!cfg.country_enabled);
    }

    #[test]
    fn apikey_is_required() {
        assert!(ClientConfig::from_toml(r#"format = "json""#).is_err());

        let err = ClientConfig::from_toml(r#"apikey = """#).unwrap_err();
        assert!(format!("{err:#}").contains("'apikey' cannot be empty"));
    }

    #[test]
    fn enums_are_constrained() {
        assert!(ClientConfig::from_toml("apikey = \"K\"\nformat = \"yaml\"").is_err());
        assert!(ClientConfig::from_toml("apikey = \"K\"\nunits = \"imperial\"").is_err());
    }

    #[test]
    fn empty_host_locale_country_are_rejected() {
        for field in ["host", "locale", "country"] {
            let mut cfg = ClientConfig::new("KEY");
            match field {
                "host" => cfg.host.clear(),
                "locale" => cfg.locale.clear(),
                _ => cfg.country.clear(),
            }
            let err = cfg.validate().unwrap_err();
            assert!(err.to_string().contains(field), "{field}");
        }
    }

    #[test]
    fn country_must_be_two_letters() {
        let mut cfg = ClientConfig::new("KEY").with_country("USA");
        assert!(matches!(cfg.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn country_must_be_two_ascii_characters() {
        for bad in ["ßx", "éé", "日本"] {
            let mut cfg = ClientConfig::new("KEY").with_country(bad);
            assert!(matches!(cfg.validate(), Err(Error::InvalidConfig(_))), "{bad:?}");
        }

        let mut cfg = ClientConfig::new("KEY").with_country("fr");
        cfg.validate().expect("ascii code");
        assert_eq!(cfg.country, "FR");
    }

    #[test]
    fn toml_roundtrip_preserves_config() {
        let cfg = ClientConfig::new("KEY").with_format(Format::Xml).with_units(Units::Standard);
        let text = cfg.to_toml().expect("serialize");

        assert!(text.contains("apikey = \"KEY\""));
        assert!(text.contains("units = \"s\""));
        assert_eq!(ClientConfig::from_toml(&text).expect("parse"), cfg);
    }
}
