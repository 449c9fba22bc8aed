//! spoor-params — builds the spoor parameters for a described request and
//! prints the JSON payload the transport would send.

use anyhow::Context;
use clap::{Parser, Subcommand};
use spoor_client::{Cookie, FunnelStepData, ParameterBuilderFactory, RawRequest};
use spoor_core::SpoorConfig;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "spoor-params")]
#[command(about = "Build spoor tracking parameters from a request description")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML); environment variables `SPOOR__*` take precedence
    #[arg(long, default_value = "spoor")]
    config: String,

    /// Collector api key (overrides config)
    #[arg(long)]
    api_key: Option<String>,

    /// Application root URL (overrides config)
    #[arg(long)]
    app_root: Option<String>,

    /// Product name (overrides config)
    #[arg(long)]
    product: Option<String>,

    /// URL the request was received on
    #[arg(long)]
    request_url: Option<String>,

    /// Raw query string, without the leading `?`
    #[arg(long, requires = "request_url")]
    query: Option<String>,

    /// Request cookie as NAME=VALUE (repeatable)
    #[arg(long = "cookie", value_parser = parse_cookie, requires = "request_url")]
    cookies: Vec<Cookie>,

    /// User-Agent header value
    #[arg(long, requires = "request_url")]
    user_agent: Option<String>,

    /// Explicit context root id
    #[arg(long, requires = "request_url")]
    root_id: Option<String>,

    /// Pretty-print the JSON payload
    #[arg(long, default_value_t = false)]
    pretty: bool,

    #[command(subcommand)]
    intent: IntentArg,
}

#[derive(Subcommand, Debug)]
enum IntentArg {
    /// A page view (action "view", category "page")
    PageView,
    /// A named event
    Event {
        #[arg(long)]
        action: String,
        #[arg(long)]
        category: String,
    },
    /// A page view recorded as a funnel step
    Funnel {
        #[arg(long)]
        funnel_name: String,
        #[arg(long)]
        funnel_sequence: i32,
        #[arg(long)]
        step_name: String,
        #[arg(long)]
        step_sequence: i32,
    },
}

fn parse_cookie(raw: &str) -> Result<Cookie, String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok(Cookie::new(name, value)),
        _ => Err(format!("expected NAME=VALUE, got '{raw}'")),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spoor_params=info,spoor_client=info".into()),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    let source = SpoorConfig::sources(Some(cli.config.as_str()))
        .set_override_option("api_key", cli.api_key)?
        .set_override_option("app_root", cli.app_root)?
        .set_override_option("product", cli.product)?
        .build()?;
    let config = SpoorConfig::from_source(source).context("loading spoor configuration")?;

    info!(
        app_root = %config.app_root,
        product = %config.product,
        "Configuration loaded"
    );

    let factory = ParameterBuilderFactory::new(config);
    let mut builder = factory.builder();

    if let Some(url) = cli.request_url {
        let mut request = RawRequest::new(url);
        request.query = cli.query;
        if !cli.cookies.is_empty() {
            request.cookies = Some(cli.cookies);
        }
        if let Some(user_agent) = cli.user_agent {
            request = request.with_header("User-Agent", user_agent);
        }
        builder = builder.from_request(&request, cli.root_id)?;
    }

    builder = match cli.intent {
        IntentArg::PageView => builder.page_view(),
        IntentArg::Event { action, category } => builder.event(action, category),
        IntentArg::Funnel {
            funnel_name,
            funnel_sequence,
            step_name,
            step_sequence,
        } => builder.funnel(FunnelStepData::new(
            funnel_name,
            funnel_sequence,
            step_name,
            step_sequence,
        )),
    };

    let params = builder.build()?;
    let payload = if cli.pretty {
        serde_json::to_string_pretty(&params)?
    } else {
        params.to_json()?
    };
    println!("{payload}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cookie() {
        assert_eq!(parse_cookie("spoor-id=abc").unwrap(), Cookie::new("spoor-id", "abc"));
        assert_eq!(parse_cookie("empty=").unwrap(), Cookie::new("empty", ""));
        assert!(parse_cookie("novalue").is_err());
        assert!(parse_cookie("=value").is_err());
    }

    #[test]
    fn test_cli_parses_funnel() {
        let cli = Cli::try_parse_from([
            "spoor-params",
            "--request-url",
            "http://appserver/signup",
            "--cookie",
            "spoor-id=abc",
            "funnel",
            "--funnel-name",
            "signup",
            "--funnel-sequence",
            "1",
            "--step-name",
            "details",
            "--step-sequence",
            "2",
        ])
        .unwrap();

        assert_eq!(cli.cookies, vec![Cookie::new("spoor-id", "abc")]);
        assert!(matches!(cli.intent, IntentArg::Funnel { step_sequence: 2, .. }));
    }

    #[test]
    fn test_cli_requires_request_url_for_cookies() {
        let result = Cli::try_parse_from(["spoor-params", "--cookie", "a=b", "page-view"]);
        assert!(result.is_err());
    }
}
