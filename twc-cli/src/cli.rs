use anyhow::{Context, anyhow};
use clap::{Args, Parser, Subcommand};
use inquire::{Select, Text};
use tracing::info;
use twc_core::{ApiData, ClientConfig, Format, QueryEncoding, Units, WeatherClient, XmlElement, XmlNode};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "twc", version, about = "The Weather Channel data API CLI")]
pub struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store API key and defaults in the config file.
    Configure,

    /// Request data and print it.
    Fetch(RequestArgs),

    /// Print the request resource without sending it.
    Resource(RequestArgs),
}

#[derive(Debug, Args)]
pub struct RequestArgs {
    /// API command: locsearch, loc, trupoint_cc, svr, ss, df, dn, avg.
    pub api_command: String,

    /// Location ID, zip code or search text.
    pub resource: String,

    /// Query parameter as name=value (day, days, start, end, cb). Repeatable.
    #[arg(short, long = "param", value_name = "NAME=VALUE")]
    pub params: Vec<String>,

    /// HTTP method.
    #[arg(short, long, default_value = "GET")]
    pub method: String,

    /// Two-letter country code overriding the configured one.
    #[arg(long)]
    pub country: Option<String>,

    /// Do not send the country parameter.
    #[arg(long)]
    pub no_country: bool,

    /// The resource already has its spaces escaped.
    #[arg(long)]
    pub escaped: bool,

    /// The resource is already clean; skip sanitizing.
    #[arg(long)]
    pub cleaned: bool,

    /// Percent-encode query parameter values.
    #[arg(long)]
    pub encode_params: bool,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Fetch(args) => {
                let client = build_client(&args)?;
                let data = client.get_data().await?;
                print_data(&data)
            }
            Command::Resource(args) => {
                let client = build_client(&args)?;
                println!("{}", client.build_resource()?);
                Ok(())
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let defaults = ClientConfig::load()?.unwrap_or_else(|| ClientConfig::new(""));

    let api_key = Text::new("API key:")
        .with_initial_value(&defaults.api_key)
        .prompt()
        .context("Failed to read API key")?;

    let format = Select::new("Response format:", vec![Format::Json, Format::Xml])
        .with_starting_cursor(if defaults.format == Format::Xml { 1 } else { 0 })
        .prompt()
        .context("Failed to read format")?;

    let units = Select::new("Units:", vec![Units::Metric, Units::Standard])
        .with_starting_cursor(if defaults.units == Units::Standard { 1 } else { 0 })
        .prompt()
        .context("Failed to read units")?;

    let locale = Text::new("Locale:")
        .with_initial_value(&defaults.locale)
        .prompt()
        .context("Failed to read locale")?;

    let country = Text::new("Country code:")
        .with_initial_value(&defaults.country)
        .prompt()
        .context("Failed to read country")?;

    let mut cfg = ClientConfig {
        api_key,
        format,
        units,
        locale,
        country,
        ..defaults
    };
    cfg.validate()?;

    let path = cfg.save()?;
    info!(path = %path.display(), "Configuration saved");
    Ok(())
}

fn build_client(args: &RequestArgs) -> anyhow::Result<WeatherClient> {
    let config = ClientConfig::load()?.ok_or_else(|| {
        anyhow!(
            "No configuration found.\n\
             Hint: run `twc configure` and enter your API key."
        )
    })?;

    let encoding = if args.encode_params { QueryEncoding::Percent } else { QueryEncoding::Raw };
    let mut client = WeatherClient::new(config)?.with_query_encoding(encoding);

    client.set_command(&args.api_command)?;
    client.set_resource_part(&args.resource, args.escaped, args.cleaned);
    client.set_method(&args.method)?;
    client.set_params(parse_params(&args.params)?);

    if let Some(country) = &args.country {
        client.set_country(country);
    }
    if args.no_country {
        client.enable_country(false);
    }

    Ok(client)
}

fn parse_params(raw: &[String]) -> anyhow::Result<Vec<(String, String)>> {
    raw.iter()
        .map(|p| {
            p.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| anyhow!("Invalid parameter '{p}', expected NAME=VALUE"))
        })
        .collect()
}

fn print_data(data: &ApiData) -> anyhow::Result<()> {
    match data {
        ApiData::Json(value) => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        ApiData::Xml(root) => {
            let mut out = String::new();
            write_element(&mut out, root, 0);
            print!("{out}");
        }
    }
    Ok(())
}

fn write_element(out: &mut String, element: &XmlElement, depth: usize) {
    let indent = "  ".repeat(depth);
    out.push_str(&indent);
    out.push_str(&element.name);
    for (k, v) in &element.attributes {
        out.push_str(&format!(" {k}={v:?}"));
    }
    out.push('\n');

    for child in &element.children {
        match child {
            XmlNode::Element(e) => write_element(out, e, depth + 1),
            XmlNode::Text(t) => {
                out.push_str(&format!("{indent}  {:?}\n", t.trim()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_params_splits_on_first_equals() {
        let params = parse_params(&["day=1".into(), "cb=a=b".into()]).unwrap();
        assert_eq!(
            params,
            [("day".to_string(), "1".to_string()), ("cb".to_string(), "a=b".to_string())]
        );
    }

    #[test]
    fn parse_params_rejects_missing_value() {
        let err = parse_params(&["day".into()]).unwrap_err();
        assert!(err.to_string().contains("expected NAME=VALUE"));
    }

    #[test]
    fn cli_parses_fetch_arguments() {
        let cli = Cli::try_parse_from([
            "twc", "fetch", "loc", "12345", "-p", "day=1", "--no-country", "--method", "POST",
        ])
        .unwrap();

        match cli.command {
            Command::Fetch(args) => {
                assert_eq!(args.api_command, "loc");
                assert_eq!(args.resource, "12345");
                assert_eq!(args.params, ["day=1"]);
                assert!(args.no_country);
                assert_eq!(args.method, "POST");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn xml_tree_is_rendered_indented() {
        let doc = twc_core::xml::parse(r#"<a x="1"><b>hi</b></a>"#).unwrap();
        let mut out = String::new();
        write_element(&mut out, &doc, 0);
        assert_eq!(out, "a x=\"1\"\n  b\n    \"hi\"\n");
    }
}
