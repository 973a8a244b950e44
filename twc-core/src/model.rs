use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{error::Error, xml::XmlElement};

/// TWC API sub-endpoint selector, the `{command}` segment of `/data/{command}/...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    LocSearch,
    Loc,
    TruPointCc,
    Svr,
    Ss,
    Df,
    Dn,
    Avg,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::LocSearch => "locsearch",
            Command::Loc => "loc",
            Command::TruPointCc => "trupoint_cc",
            Command::Svr => "svr",
            Command::Ss => "ss",
            Command::Df => "df",
            Command::Dn => "dn",
            Command::Avg => "avg",
        }
    }

    pub const fn all() -> &'static [Command] {
        &[
            Command::LocSearch,
            Command::Loc,
            Command::TruPointCc,
            Command::Svr,
            Command::Ss,
            Command::Df,
            Command::Dn,
            Command::Avg,
        ]
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Command {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Command::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == value)
            .ok_or_else(|| Error::InvalidCommand(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Delete,
    Put,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Put => "PUT",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for HttpMethod {
    type Error = Error;

    /// Case-sensitive: only the upper-case verb names are accepted.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "DELETE" => Ok(HttpMethod::Delete),
            "PUT" => Ok(HttpMethod::Put),
            _ => Err(Error::UnsupportedMethod(value.to_string())),
        }
    }
}

/// Response document type, sent upstream as `doctype`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Json,
    Xml,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Xml => "xml",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Format {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "json" => Ok(Format::Json),
            "xml" => Ok(Format::Xml),
            _ => Err(Error::InvalidConfig(format!("Invalid format for doctype param \"{value}\""))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Units {
    /// Metric.
    #[default]
    #[serde(rename = "m")]
    Metric,
    /// Imperial ("standard").
    #[serde(rename = "s")]
    Standard,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "m",
            Units::Standard => "s",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "m" => Ok(Units::Metric),
            "s" => Ok(Units::Standard),
            _ => Err(Error::InvalidConfig(format!("Invalid units for units param \"{value}\""))),
        }
    }
}

/// Query parameters accepted by [`crate::WeatherClient::set_params`].
pub const ALLOWED_PARAMS: &[&str] = &["day", "days", "start", "end", "cb"];

/// Decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiData {
    Json(serde_json::Value),
    Xml(XmlElement),
}

impl ApiData {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ApiData::Json(v) => Some(v),
            ApiData::Xml(_) => None,
        }
    }

    pub fn as_xml(&self) -> Option<&XmlElement> {
        match self {
            ApiData::Xml(doc) => Some(doc),
            ApiData::Json(_) => None,
        }
    }
}
