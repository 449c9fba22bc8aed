//! Parameter builder — turns an inbound request plus call-site intent into a
//! [`ParameterSnapshot`].
//!
//! A [`ParameterBuilderFactory`] holds the shared configuration and mints one
//! short-lived [`ParameterBuilder`] per traced request.

use std::sync::Arc;

use spoor_core::types::{PAGE_VIEW_ACTION, PAGE_VIEW_CATEGORY};
use spoor_core::{
    Context, Device, FunnelStepData, ParameterSnapshot, SpoorConfig, SpoorError, SpoorResult, User,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::request::SpoorRequest;

const FT_SESSION_COOKIE: &str = "FTSession";
const SPOOR_ID_COOKIE: &str = "spoor-id";
const SPOOR_SESSION_COOKIE: &str = "spoor-session";
const USER_AGENT_HEADER: &str = "User-Agent";

/// Semantic intent of the event. Entry points overwrite each other.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Intent {
    PageView,
    Event { action: String, category: String },
    Funnel(FunnelStepData),
}

/// Fields absorbed from an inbound request.
#[derive(Debug, Clone, Default)]
struct RequestFields {
    context_id: Option<String>,
    url: Option<String>,
    device: Device,
    user: User,
}

/// Shared, read-only configuration from which per-request builders are made.
#[derive(Debug, Clone)]
pub struct ParameterBuilderFactory {
    config: Arc<SpoorConfig>,
}

impl ParameterBuilderFactory {
    pub fn new(config: SpoorConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// A fresh builder for one request.
    pub fn builder(&self) -> ParameterBuilder {
        ParameterBuilder::with_config(self.config.clone())
    }
}

/// Accumulates the fields of one snapshot. Consumed by [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct ParameterBuilder {
    config: Arc<SpoorConfig>,
    request: RequestFields,
    intent: Option<Intent>,
}

impl ParameterBuilder {
    /// Create a builder from the three configuration values. Fails with
    /// [`SpoorError::InvalidConfiguration`] if `app_root` is not a bare
    /// absolute URL.
    pub fn new(
        api_key: impl Into<String>,
        app_root: impl Into<String>,
        product: impl Into<String>,
    ) -> SpoorResult<Self> {
        let config = SpoorConfig::new(api_key, app_root, product)?;
        Ok(Self::with_config(Arc::new(config)))
    }

    pub fn with_config(config: Arc<SpoorConfig>) -> Self {
        Self {
            config,
            request: RequestFields::default(),
            intent: None,
        }
    }

    /// Key carried for the transport; unused when building.
    pub fn api_key(&self) -> &str {
        &self.config.api_key
    }

    /// Absorb cookies, the user agent and the canonical URL from `request`.
    ///
    /// `root_id` is accepted but not carried into the context: snapshots
    /// built from a request always have an absent `root_id`. A second call
    /// replaces everything taken from the first one.
    pub fn from_request<R>(mut self, request: &R, root_id: Option<String>) -> SpoorResult<Self>
    where
        R: SpoorRequest + ?Sized,
    {
        let url = self.canonical_url(request)?;

        let mut device = Device::default();
        let mut user = User::default();
        for cookie in request.cookies().unwrap_or_default() {
            let slot = match cookie.name.as_str() {
                FT_SESSION_COOKIE => &mut user.ft_session,
                SPOOR_ID_COOKIE => &mut device.spoor_id,
                SPOOR_SESSION_COOKIE => &mut device.spoor_session,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(cookie.value);
            }
        }
        device.user_agent = request.header(USER_AGENT_HEADER);

        let context_id = new_context_id();
        debug!(
            context_id = %context_id,
            url = %url,
            has_root_id = root_id.is_some(),
            has_spoor_id = device.spoor_id.is_some(),
            has_ft_session = user.ft_session.is_some(),
            "spoor parameters read from request"
        );

        self.request = RequestFields {
            context_id: Some(context_id),
            url: Some(url),
            device,
            user,
        };
        Ok(self)
    }

    pub fn page_view(mut self) -> Self {
        self.intent = Some(Intent::PageView);
        self
    }

    pub fn event(mut self, action: impl Into<String>, category: impl Into<String>) -> Self {
        self.intent = Some(Intent::Event {
            action: action.into(),
            category: category.into(),
        });
        self
    }

    /// A page view that also records the funnel step.
    pub fn funnel(mut self, step: FunnelStepData) -> Self {
        self.intent = Some(Intent::Funnel(step));
        self
    }

    /// Materialize the snapshot. Fails with
    /// [`SpoorError::IncompleteParameters`] when no entry point set a
    /// non-empty action and category.
    pub fn build(self) -> SpoorResult<ParameterSnapshot> {
        let (action, category, funnel) = match self.intent {
            Some(Intent::PageView) => (
                PAGE_VIEW_ACTION.to_string(),
                PAGE_VIEW_CATEGORY.to_string(),
                None,
            ),
            Some(Intent::Funnel(step)) => (
                PAGE_VIEW_ACTION.to_string(),
                PAGE_VIEW_CATEGORY.to_string(),
                Some(step),
            ),
            Some(Intent::Event { action, category }) => (action, category, None),
            None => {
                warn!("spoor parameters built without page view, event or funnel");
                return Err(SpoorError::IncompleteParameters(
                    "action and category must be set via page_view, event or funnel".to_string(),
                ));
            }
        };

        if action.is_empty() || category.is_empty() {
            warn!(action = %action, category = %category, "spoor event with empty action or category");
            return Err(SpoorError::IncompleteParameters(
                "action and category must not be empty".to_string(),
            ));
        }

        let RequestFields {
            context_id,
            url,
            device,
            user,
        } = self.request;

        let snapshot = ParameterSnapshot {
            action,
            category,
            context: Context {
                id: context_id.unwrap_or_else(new_context_id),
                product: self.config.product.clone(),
                root_id: None,
                url: url.unwrap_or_else(|| self.config.app_root.clone()),
                funnel,
            },
            device,
            user,
        };

        debug!(
            context_id = %snapshot.context.id,
            action = %snapshot.action,
            category = %snapshot.category,
            "spoor parameters built"
        );
        Ok(snapshot)
    }

    /// Application root + request path, plus `?query` when the request has one.
    /// The app server's own scheme and authority are dropped.
    fn canonical_url<R>(&self, request: &R) -> SpoorResult<String>
    where
        R: SpoorRequest + ?Sized,
    {
        let request_url = request.request_url();
        let path = request_path(&request_url)?;
        let mut url = format!("{}{}", self.config.app_root, path);
        if let Some(query) = request.query_string() {
            url.push('?');
            url.push_str(&query);
        }
        Ok(url)
    }
}

/// Raw path of `request_url`, up to any `?` or `#`. Accepts absolute URLs
/// (`scheme://authority/path`) and absolute paths. The authority is skipped
/// without being validated and the path is never normalized.
fn request_path(request_url: &str) -> SpoorResult<&str> {
    let after_authority = if request_url.starts_with('/') {
        request_url
    } else {
        match request_url.split_once("://") {
            Some((scheme, rest)) if is_scheme(scheme) => {
                let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
                &rest[authority_end..]
            }
            _ => {
                return Err(SpoorError::InvalidRequest(format!(
                    "request url '{request_url}' is neither an absolute URL nor an absolute path"
                )))
            }
        }
    };
    let path_end = after_authority
        .find(['?', '#'])
        .unwrap_or(after_authority.len());
    Ok(&after_authority[..path_end])
}

fn is_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn new_context_id() -> String {
    Uuid::new_v4().to_string()
}
