//! Core library for The Weather Channel (TWC) data API client.
//!
//! This crate defines:
//! - Client configuration and its on-disk TOML form
//! - Request building: commands, resource-part sanitizing, query strings
//! - The HTTP transport seam and the retrying [`WeatherClient`]
//! - Response decoding into JSON values or an XML document tree
//!
//! It is used by `twc-cli`, but can also be reused by other binaries or services.

pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod query;
pub mod sanitize;
pub mod transport;
pub mod xml;

pub use client::{RetryPolicy, WeatherClient};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use model::{ApiData, Command, Format, HttpMethod, Units};
pub use query::QueryEncoding;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};
pub use xml::{XmlElement, XmlNode};
