//! One-shot notices carried across a redirect.
//!
//! A write handler redirects with its notice stored in the `flash` cookie
//! (URL-encoded JSON); the next page rendered shows it and clears the
//! cookie.

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{
        header::{COOKIE, LOCATION, SET_COOKIE},
        request::Parts,
        StatusCode,
    },
    response::{Html, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub level: Level,
    pub message: String,
}

impl Message {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: Level::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }
}

/// Messages that arrived with the request
#[derive(Debug, Clone, Default)]
pub struct Flash {
    incoming: Vec<Message>,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Flash {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let incoming = parts
            .headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().strip_prefix("flash="))
            .find_map(decode)
            .unwrap_or_default();
        Ok(Self { incoming })
    }
}

impl Flash {
    pub fn messages(&self) -> &[Message] {
        &self.incoming
    }

    /// 302 to `to`, queueing `message` after any still-unread ones.
    pub fn redirect(self, to: &str, message: Message) -> Response {
        let mut messages = self.incoming;
        messages.push(message);
        let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", FLASH_COOKIE, encode(&messages));
        (StatusCode::FOUND, [(LOCATION, to.to_string()), (SET_COOKIE, cookie)]).into_response()
    }

    /// 200 HTML page; the messages it displayed are cleared.
    pub fn page(&self, html: String) -> Response {
        let mut response = Html(html).into_response();
        if !self.incoming.is_empty() {
            let clear = format!("{}=; Path=/; Max-Age=0", FLASH_COOKIE);
            if let Ok(value) = clear.parse() {
                response.headers_mut().insert(SET_COOKIE, value);
            }
        }
        response
    }
}

fn encode(messages: &[Message]) -> String {
    let json = serde_json::to_string(messages).unwrap_or_else(|_| "[]".to_string());
    urlencoding::encode(&json).into_owned()
}

fn decode(raw: &str) -> Option<Vec<Message>> {
    let json = urlencoding::decode(raw).ok()?;
    serde_json::from_str(&json).ok()
}

/// Messages from a `Set-Cookie` header value, for tests following redirects.
pub fn messages_from_set_cookie(header: &str) -> Vec<Message> {
    header
        .split(';')
        .next()
        .and_then(|pair| pair.trim().strip_prefix("flash="))
        .and_then(decode)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(cookie: &str) -> Flash {
        let request = Request::builder()
            .header(COOKIE, cookie)
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();
        Flash::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_redirect_round_trips_through_cookie() {
        let response = Flash::default().redirect(
            "/circuits/providers/",
            Message::success("Deleted provider Acme; \"quoted\""),
        );
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "/circuits/providers/");

        let set_cookie = response.headers()[SET_COOKIE].to_str().unwrap().to_string();
        let pair = set_cookie.split(';').next().unwrap();
        let flash = extract(&format!("session=abc; {}", pair)).await;
        assert_eq!(
            flash.messages(),
            [Message::success("Deleted provider Acme; \"quoted\"")]
        );
        assert_eq!(messages_from_set_cookie(&set_cookie), flash.messages());
    }

    #[tokio::test]
    async fn test_garbage_cookie_is_ignored() {
        let flash = extract("flash=%7Bnot-json").await;
        assert!(flash.messages().is_empty());
    }

    #[tokio::test]
    async fn test_page_clears_displayed_messages() {
        let flash = Flash {
            incoming: vec![Message::warning("careful")],
        };
        let response = flash.page("<p>ok</p>".to_string());
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[SET_COOKIE]
            .to_str()
            .unwrap()
            .contains("Max-Age=0"));
        assert!(Flash::default()
            .page(String::new())
            .headers()
            .get(SET_COOKIE)
            .is_none());
    }
}
