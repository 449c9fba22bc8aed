//! Request abstraction — the read-only view of an inbound HTTP request that
//! the parameter builder consumes.

/// A single name/value cookie pair as sent by the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Everything the builder needs to know about an inbound request.
///
/// All inputs are expected to be materialized in memory already; none of
/// these lookups may block.
pub trait SpoorRequest {
    /// Cookies in the order the client sent them. `None` when the request
    /// carries no cookie set at all.
    fn cookies(&self) -> Option<Vec<Cookie>>;

    /// Header value by case-insensitive name.
    fn header(&self, name: &str) -> Option<String>;

    /// The URL as seen by the receiving server (scheme, authority and path).
    fn request_url(&self) -> String;

    /// Raw query string without the leading `?`.
    fn query_string(&self) -> Option<String>;
}

/// Parse a `Cookie` request header (`a=1; b=2`) into pairs.
///
/// Fragments without `=` are skipped.
pub fn parse_cookie_header(header: &str) -> Vec<Cookie> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some(Cookie::new(name, value.trim()))
        })
        .collect()
}

/// In-memory request, for callers that already hold the pieces (tests, the
/// CLI, non-`http` servers).
#[derive(Debug, Clone, Default)]
pub struct RawRequest {
    pub url: String,
    pub query: Option<String>,
    pub cookies: Option<Vec<Cookie>>,
    pub headers: Vec<(String, String)>,
}

impl RawRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies
            .get_or_insert_with(Vec::new)
            .push(Cookie::new(name, value));
        self
    }

    /// Mark the request as carrying an empty cookie set.
    pub fn with_no_cookies(mut self) -> Self {
        self.cookies = Some(Vec::new());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

impl SpoorRequest for RawRequest {
    fn cookies(&self) -> Option<Vec<Cookie>> {
        self.cookies.clone()
    }

    fn header(&self, name: &str) -> Option<String> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.clone())
    }

    fn request_url(&self) -> String {
        self.url.clone()
    }

    fn query_string(&self) -> Option<String> {
        self.query.clone()
    }
}
