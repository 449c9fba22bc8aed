//! [`SpoorRequest`] for the `http` request types used by axum/hyper servers.

use axum::http::header::{COOKIE, HOST};
use axum::http::request::Parts;
use axum::http::{HeaderMap, Request, Uri};

use crate::request::{parse_cookie_header, Cookie, SpoorRequest};

fn cookies_from(headers: &HeaderMap) -> Option<Vec<Cookie>> {
    let mut values = headers.get_all(COOKIE).iter().peekable();
    values.peek()?;
    Some(
        values
            .filter_map(|value| value.to_str().ok())
            .flat_map(parse_cookie_header)
            .collect(),
    )
}

fn header_from(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// Absolute-form URIs are used as-is; origin-form URIs (the usual case
/// behind a server) are rebuilt from the `Host` header.
fn url_from(uri: &Uri, headers: &HeaderMap) -> String {
    if let (Some(scheme), Some(authority)) = (uri.scheme_str(), uri.authority()) {
        return format!("{scheme}://{authority}{}", uri.path());
    }
    match headers.get(HOST).and_then(|value| value.to_str().ok()) {
        Some(host) => format!("http://{host}{}", uri.path()),
        None => uri.path().to_string(),
    }
}

impl<B> SpoorRequest for Request<B> {
    fn cookies(&self) -> Option<Vec<Cookie>> {
        cookies_from(self.headers())
    }

    fn header(&self, name: &str) -> Option<String> {
        header_from(self.headers(), name)
    }

    fn request_url(&self) -> String {
        url_from(self.uri(), self.headers())
    }

    fn query_string(&self) -> Option<String> {
        self.uri().query().map(str::to_string)
    }
}

impl SpoorRequest for Parts {
    fn cookies(&self) -> Option<Vec<Cookie>> {
        cookies_from(&self.headers)
    }

    fn header(&self, name: &str) -> Option<String> {
        header_from(&self.headers, name)
    }

    fn request_url(&self) -> String {
        url_from(&self.uri, &self.headers)
    }

    fn query_string(&self) -> Option<String> {
        self.uri.query().map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(uri: &str) -> axum::http::request::Builder {
        Request::builder().uri(uri)
    }

    #[test]
    fn test_origin_form_uses_host_header() {
        let req = request("/contextpath?query=param")
            .header("Host", "appserver-not-approot")
            .body(())
            .unwrap();

        assert_eq!(req.request_url(), "http://appserver-not-approot/contextpath");
        assert_eq!(req.query_string().as_deref(), Some("query=param"));
    }

    #[test]
    fn test_absolute_form_keeps_authority() {
        let req = request("https://internal:8080/a/b").body(()).unwrap();
        assert_eq!(req.request_url(), "https://internal:8080/a/b");
        assert_eq!(req.query_string(), None);
    }

    #[test]
    fn test_cookies_across_multiple_headers() {
        let req = request("/")
            .header("Cookie", "FTSession=s1; spoor-id=id1")
            .header("Cookie", "spoor-session=sess")
            .body(())
            .unwrap();

        let cookies = req.cookies().unwrap();
        assert_eq!(cookies.len(), 3);
        assert_eq!(cookies[2], Cookie::new("spoor-session", "sess"));
    }

    #[test]
    fn test_no_cookie_header_is_none() {
        let req = request("/").body(()).unwrap();
        assert!(req.cookies().is_none());
    }

    #[test]
    fn test_header_lookup_on_parts() {
        let (parts, _) = request("/x")
            .header("user-agent", "Mozilla/5.0")
            .body(())
            .unwrap()
            .into_parts();

        assert_eq!(parts.header("User-Agent").as_deref(), Some("Mozilla/5.0"));
        assert_eq!(parts.header("X-Missing"), None);
        assert_eq!(parts.request_url(), "/x");
    }
}
