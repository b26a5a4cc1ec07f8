use axum::http::{header, HeaderName, StatusCode};
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use serde::{Deserialize, Serialize};

/// One-shot cookie that carries a notice across a redirect.
pub const NOTICE_COOKIE: &str = "ng_notice";

const HX_TRIGGER: HeaderName = HeaderName::from_static("hx-trigger");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

impl NoticeLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            NoticeLevel::Success => "success",
            NoticeLevel::Error => "error",
            NoticeLevel::Info => "info",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "success" => Some(NoticeLevel::Success),
            "error" => Some(NoticeLevel::Error),
            "info" => Some(NoticeLevel::Info),
            _ => None,
        }
    }
}

/// A transient toast shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self.level {
            NoticeLevel::Success => "notice-success",
            NoticeLevel::Error => "notice-error",
            NoticeLevel::Info => "notice-info",
        }
    }

    /// `HX-Trigger` payload picked up by `notify.js`.
    pub fn hx_trigger(&self) -> String {
        serde_json::json!({ "notify": self }).to_string()
    }

    pub fn set_cookie(&self) -> String {
        let value = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("level", self.level.as_str())
            .append_pair("message", &self.message)
            .finish();
        format!(
            "{}={}; Path=/; Max-Age=60; HttpOnly; SameSite=Lax",
            NOTICE_COOKIE, value
        )
    }

    pub fn from_cookie(value: &str) -> Option<Self> {
        let mut level = None;
        let mut message = None;
        for (key, val) in url::form_urlencoded::parse(value.as_bytes()) {
            match key.as_ref() {
                "level" => level = NoticeLevel::parse(&val),
                "message" => message = Some(val.into_owned()),
                _ => {}
            }
        }
        Some(Self {
            level: level?,
            message: message.filter(|m| !m.is_empty())?,
        })
    }

    pub fn clear_cookie() -> String {
        format!(
            "{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax",
            NOTICE_COOKIE
        )
    }
}

/// `204 No Content` that leaves the swapped control untouched and raises a toast.
pub fn notify(notice: Notice) -> Response {
    (
        StatusCode::NO_CONTENT,
        [(HX_TRIGGER, notice.hx_trigger())],
    )
        .into_response()
}

/// Attach a toast to a fragment response.
pub fn with_notice(notice: &Notice, response: impl IntoResponse) -> Response {
    ([(HX_TRIGGER, notice.hx_trigger())], response).into_response()
}

/// See-other redirect that shows `notice` on the next page.
pub fn redirect_with_notice(to: &str, notice: &Notice) -> Response {
    (
        AppendHeaders([(header::SET_COOKIE, notice.set_cookie())]),
        Redirect::to(to),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_payload_shape() {
        let notice = Notice::error("Please login to like posts");
        let value: serde_json::Value = serde_json::from_str(&notice.hx_trigger()).unwrap();
        assert_eq!(value["notify"]["level"], "error");
        assert_eq!(value["notify"]["message"], "Please login to like posts");
    }

    #[test]
    fn cookie_value_survives_punctuation() {
        let notice = Notice::success("Post created successfully!");
        let header = notice.set_cookie();
        let value = header
            .strip_prefix("ng_notice=")
            .and_then(|rest| rest.split(';').next())
            .unwrap();
        assert!(!value.contains(' '));
        assert_eq!(Notice::from_cookie(value), Some(notice));
    }

    #[test]
    fn malformed_cookie_is_ignored() {
        assert_eq!(Notice::from_cookie("level=loud&message=hi"), None);
        assert_eq!(Notice::from_cookie("level=info"), None);
        assert_eq!(Notice::from_cookie(""), None);
    }

    #[test]
    fn notify_is_no_content_with_trigger() {
        let response = notify(Notice::info("hello"));
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().contains_key("hx-trigger"));
    }

    #[test]
    fn redirect_sets_flash_cookie() {
        let response = redirect_with_notice("/", &Notice::success("done"));
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("ng_notice="));
    }
}
