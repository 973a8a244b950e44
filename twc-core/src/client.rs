use std::time::Duration;
use tracing::{debug, warn};

use crate::{
    config::{ClientConfig, normalize_country},
    error::{Error, Result},
    model::{ALLOWED_PARAMS, ApiData, Command, Format, HttpMethod},
    query::{QueryEncoding, QueryString},
    sanitize::{clean_part, escape_spaces},
    transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport},
    xml,
};

/// Bounded linear backoff: after failed attempt `k` (zero-based) wait `k * unit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub unit: Duration,
}

impl RetryPolicy {
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.unit.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 5, unit: Duration::from_secs(1) }
    }
}

/// Client for the TWC `/data/` API.
///
/// Configure a command and a resource part, optionally params and method,
/// then call [`WeatherClient::get_data`].
#[derive(Debug)]
pub struct WeatherClient {
    config: ClientConfig,
    command: Option<Command>,
    resource_part: Option<String>,
    params: QueryString,
    method: HttpMethod,
    encoding: QueryEncoding,
    retry: RetryPolicy,
    transport: Box<dyn Transport>,
}

impl WeatherClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_transport(config, ReqwestTransport::new())
    }

    pub fn with_transport(mut config: ClientConfig, transport: impl Transport + 'static) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            command: None,
            resource_part: None,
            params: QueryString::new(),
            method: HttpMethod::default(),
            encoding: QueryEncoding::default(),
            retry: RetryPolicy::default(),
            transport: Box::new(transport),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Percent-encode query values instead of passing them through raw.
    pub fn with_query_encoding(mut self, encoding: QueryEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn format(&self) -> Format {
        self.config.format
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn params(&self) -> &[(String, String)] {
        self.params.pairs()
    }

    pub fn resource_part(&self) -> Option<&str> {
        self.resource_part.as_deref()
    }

    pub fn set_command(&mut self, command: &str) -> Result<()> {
        self.command = Some(Command::try_from(command)?);
        Ok(())
    }

    pub fn command(&mut self, command: Command) {
        self.command = Some(command);
    }

    /// Set the location ID or zip code.
    ///
    /// Unless `cleaned`, the value goes through [`clean_part`] first; unless
    /// `spaces_escaped`, spaces then become `%20`.
    pub fn set_resource_part(&mut self, value: &str, spaces_escaped: bool, cleaned: bool) {
        let mut part = if cleaned { value.to_string() } else { clean_part(value) };

        if !spaces_escaped {
            part = escape_spaces(&part);
        }

        self.resource_part = Some(part);
    }

    /// Country code, e.g. "RS", "UK", "GM", "US", "FR". Stored upper-cased.
    ///
    /// Anything that is not exactly two ASCII characters is silently ignored and
    /// the previous country is kept.
    pub fn set_country(&mut self, code: &str) {
        match normalize_country(code) {
            Some(country) => self.config.country = country,
            None => debug!(code, "Ignoring invalid country code"),
        }
    }

    /// Toggle the `country` query parameter.
    pub fn enable_country(&mut self, enabled: bool) {
        self.config.country_enabled = enabled;
    }

    /// Replace the query parameters.
    ///
    /// Names outside `day`, `days`, `start`, `end`, `cb` are dropped. Order is kept;
    /// a repeated name keeps its first position and its last value.
    pub fn set_params<I, K, V>(&mut self, params: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut filtered = QueryString::new();

        for (name, value) in params {
            let name = name.into();
            if ALLOWED_PARAMS.contains(&name.as_str()) {
                filtered.set(name, value);
            } else {
                debug!(param = %name, "Dropping unsupported query parameter");
            }
        }

        self.params = filtered;
    }

    pub fn set_method(&mut self, method: &str) -> Result<()> {
        self.method = HttpMethod::try_from(method)?;
        Ok(())
    }

    /// `/data/{command}/{part}?doctype=..&locale=..&units=..&apikey=..[&country=..][&params..]`
    pub fn build_resource(&self) -> Result<String> {
        let command = self.command.ok_or(Error::MissingCommand)?;
        let part = self
            .resource_part
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or(Error::MissingResourcePart)?;

        let cfg = &self.config;
        let mut query = QueryString::new();
        query
            .push("doctype", cfg.format.as_str())
            .push("locale", &cfg.locale)
            .push("units", cfg.units.as_str())
            .push("apikey", &cfg.api_key);

        if cfg.country_enabled {
            query.push("country", &cfg.country);
        }

        query.extend(self.params.pairs().iter().cloned());

        Ok(format!("/data/{command}/{part}?{}", query.render(self.encoding)))
    }

    /// Fetch and decode data for the configured request.
    pub async fn get_data(&self) -> Result<ApiData> {
        let resource = self.build_resource()?;
        let request = HttpRequest {
            method: self.method,
            url: format!("{}{}", self.config.host, resource),
        };

        let response = self.send_with_retry(&request).await?;
        self.decode(&response.body)
    }

    async fn send_with_retry(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 0..max_attempts {
            debug!(
                attempt = attempt + 1,
                max_attempts,
                method = %request.method,
                command = ?self.command,
                "Sending request to TWC API"
            );

            match self.transport.send(request).await {
                Ok(response) if response.is_success() => return Ok(response),
                Ok(response) => {
                    warn!(status = response.status, "TWC API returned an error status");
                    return Err(Error::RequestFailed {
                        attempts: attempt + 1,
                        reason: format!(
                            "status {}: {}",
                            response.status,
                            truncate_body(&response.body)
                        ),
                    });
                }
                Err(err) => {
                    last_error = err.to_string();

                    if attempt + 1 < max_attempts {
                        let backoff = self.retry.backoff(attempt);
                        warn!(
                            attempt = attempt + 1,
                            backoff = ?backoff,
                            error = %err,
                            "Request failed, retrying"
                        );
                        if !backoff.is_zero() {
                            tokio::time::sleep(backoff).await;
                        }
                    }
                }
            }
        }

        warn!(attempts = max_attempts, error = %last_error, "Giving up on TWC API request");
        Err(Error::RequestFailed { attempts: max_attempts, reason: last_error })
    }

    fn decode(&self, body: &str) -> Result<ApiData> {
        match self.config.format {
            Format::Json => serde_json::from_str(body)
                .map(ApiData::Json)
                .map_err(|e| Error::decode(Format::Json, e)),
            Format::Xml => xml::parse(body).map(ApiData::Xml),
        }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
