use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;

/// The session token as seen by one navigation or one outbound call.
///
/// The token is opaque and forwarded verbatim. An empty cookie value counts
/// as no token at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        let mut session = Self::anonymous();
        session.set_token(token);
        session
    }

    pub fn anonymous() -> Self {
        Self { token: None }
    }

    /// Read the session cookie out of a parsed cookie jar
    pub fn from_cookies(jar: &CookieJar, cookie_name: &str) -> Self {
        match jar.get(cookie_name) {
            Some(cookie) => Self::new(cookie.value()),
            None => Self::anonymous(),
        }
    }

    /// Read the session cookie straight from request headers
    pub fn from_headers(headers: &HeaderMap, cookie_name: &str) -> Self {
        Self::from_cookies(&CookieJar::from_headers(headers), cookie_name)
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        let token = token.into();
        self.token = if token.is_empty() { None } else { Some(token) };
    }

    /// Drop the token after the backend rejected it
    pub fn clear(&mut self) {
        self.token = None;
    }

    /// `Authorization` header value for the current token
    pub fn bearer(&self) -> Option<String> {
        self.token.as_ref().map(|token| format!("Bearer {}", token))
    }

    /// `name=value` pair for sending the session back as a cookie
    pub fn cookie_pair(&self, cookie_name: &str) -> Option<String> {
        self.token.as_ref().map(|token| format!("{}={}", cookie_name, token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::COOKIE, HeaderValue};

    #[test]
    fn empty_token_is_anonymous() {
        assert!(!Session::new("").is_authenticated());
        assert_eq!(Session::new(""), Session::anonymous());
    }

    #[test]
    fn reads_named_cookie_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; ms_token=abc123"));

        let session = Session::from_headers(&headers, "ms_token");
        assert_eq!(session.token(), Some("abc123"));
        assert_eq!(session.bearer().as_deref(), Some("Bearer abc123"));
        assert_eq!(session.cookie_pair("ms_token").as_deref(), Some("ms_token=abc123"));
    }

    #[test]
    fn missing_or_blank_cookie_means_no_token() {
        let mut headers = HeaderMap::new();
        assert!(!Session::from_headers(&headers, "ms_token").is_authenticated());

        headers.insert(COOKIE, HeaderValue::from_static("ms_token="));
        assert!(!Session::from_headers(&headers, "ms_token").is_authenticated());
    }

    #[test]
    fn clear_removes_token() {
        let mut session = Session::new("abc123");
        session.clear();
        assert_eq!(session.token(), None);
        assert_eq!(session.bearer(), None);
    }
}
