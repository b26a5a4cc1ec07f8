use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, HeaderName};
use axum::response::AppendHeaders;

use crate::backend::Principal;
use crate::state::AppState;
use crate::views::notice::{Notice, NOTICE_COOKIE};

/// The signed-in principal, if the session cookie names a live session.
pub struct MaybeIdentity(pub Option<Principal>);

impl FromRequestParts<AppState> for MaybeIdentity {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = cookie_value(&parts.headers, &state.config.auth.cookie_name) else {
            return Ok(MaybeIdentity(None));
        };
        let token = token.to_string();
        let principal = state.sessions.lock().await.get(&token);
        Ok(MaybeIdentity(principal))
    }
}

/// Notice left by the previous redirect, if any.
pub struct FlashNotice(pub Option<Notice>);

impl FromRequestParts<AppState> for FlashNotice {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(FlashNotice(
            cookie_value(&parts.headers, NOTICE_COOKIE).and_then(Notice::from_cookie),
        ))
    }
}

impl FlashNotice {
    pub fn take(&self) -> Option<Notice> {
        self.0.clone()
    }

    /// Headers that consume the flash cookie once the page has shown it.
    pub fn clear(&self) -> AppendHeaders<Vec<(HeaderName, String)>> {
        let headers = match self.0 {
            Some(_) => vec![(header::SET_COOKIE, Notice::clear_cookie())],
            None => Vec::new(),
        };
        AppendHeaders(headers)
    }
}

pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .map(|s| s.trim())
        .find_map(|cookie| {
            let mut split = cookie.splitn(2, '=');
            let key = split.next()?.trim();
            let val = split.next()?.trim();
            if key == name {
                Some(val)
            } else {
                None
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn finds_named_cookie_among_several() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; ng_session=abc123; other=1"),
        );
        assert_eq!(cookie_value(&headers, "ng_session"), Some("abc123"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn searches_every_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::COOKIE, HeaderValue::from_static("ng_notice=x"));
        assert_eq!(cookie_value(&headers, "ng_notice"), Some("x"));
    }

    #[test]
    fn clearing_without_flash_sets_nothing() {
        let AppendHeaders(headers) = FlashNotice(None).clear();
        assert!(headers.is_empty());
        let AppendHeaders(headers) = FlashNotice(Some(Notice::info("hi"))).clear();
        assert_eq!(headers.len(), 1);
    }
}
