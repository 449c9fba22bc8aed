use serde::Deserialize;
use url::Url;

use crate::error::{SpoorError, SpoorResult};

/// Fixed settings shared by every parameter builder. Loaded from an optional
/// TOML file and environment variables with the prefix `SPOOR__`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SpoorConfig {
    /// Opaque collector key, carried for the transport.
    pub api_key: String,
    /// Externally visible base URL of the application, e.g. `https://approot.com`.
    pub app_root: String,
    pub product: String,
}

impl SpoorConfig {
    /// Build a configuration, validating the application root.
    ///
    /// The root is stored as its serialized origin (`scheme://host[:port]`,
    /// no trailing `/`) so that request paths can be appended directly.
    pub fn new(
        api_key: impl Into<String>,
        app_root: impl Into<String>,
        product: impl Into<String>,
    ) -> SpoorResult<Self> {
        let app_root = normalize_app_root(&app_root.into())?;
        Ok(Self {
            api_key: api_key.into(),
            app_root,
            product: product.into(),
        })
    }

    /// Load configuration from `path` (if given and present) and environment
    /// variables. Environment values take precedence.
    pub fn load(path: Option<&str>) -> SpoorResult<Self> {
        Self::from_source(Self::sources(path).build()?)
    }

    /// The file and environment sources used by [`load`](Self::load), for
    /// callers that layer overrides on top.
    pub fn sources(path: Option<&str>) -> config::ConfigBuilder<config::builder::DefaultState> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        builder.add_source(
            config::Environment::with_prefix("SPOOR")
                .separator("__")
                .try_parsing(true),
        )
    }

    /// Deserialize and validate an already assembled `config::Config`.
    pub fn from_source(config: config::Config) -> SpoorResult<Self> {
        let raw: SpoorConfig = config.try_deserialize()?;
        Self::new(raw.api_key, raw.app_root, raw.product)
    }
}

fn normalize_app_root(app_root: &str) -> SpoorResult<String> {
    let parsed = Url::parse(app_root).map_err(|e| {
        SpoorError::InvalidConfiguration(format!("application root '{app_root}': {e}"))
    })?;

    if parsed.cannot_be_a_base() || !parsed.has_host() {
        return Err(SpoorError::InvalidConfiguration(format!(
            "application root '{app_root}' is not an absolute URL with a host"
        )));
    }
    if parsed.path() != "/" || parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(SpoorError::InvalidConfiguration(format!(
            "application root '{app_root}' must not carry a path, query or fragment"
        )));
    }

    let origin = parsed.origin();
    if !origin.is_tuple() {
        return Err(SpoorError::InvalidConfiguration(format!(
            "application root '{app_root}' has no web origin"
        )));
    }
    Ok(origin.ascii_serialization())
}
