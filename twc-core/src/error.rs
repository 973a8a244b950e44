use thiserror::Error;

use crate::model::Format;

/// Errors surfaced by [`crate::WeatherClient`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("Command '{0}' is not available in the TWC API")]
    InvalidCommand(String),

    #[error("HTTP method '{0}' is not supported (expected GET, POST, DELETE or PUT)")]
    UnsupportedMethod(String),

    #[error("No command set.\nHint: call `set_command` before requesting data.")]
    MissingCommand,

    #[error("No location ID or zip code set.\nHint: call `set_resource_part` before requesting data.")]
    MissingResourcePart,

    /// Non-2xx status, or every attempt failed at the transport level.
    #[error("Request to TWC API failed after {attempts} attempt(s): {reason}")]
    RequestFailed { attempts: u32, reason: String },

    #[error("Failed to decode {format} response: {message}")]
    DecodeError { format: Format, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub(crate) fn decode(format: Format, err: impl std::fmt::Display) -> Self {
        Error::DecodeError { format, message: err.to_string() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
