//! One-shot flash messages carried across a redirect in a short-lived cookie,
//! mirroring the classic post/redirect/get message flow.

use actix_web::cookie::Cookie;
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: Level,
    pub message: String,
}

impl FlashMessage {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: Level::Success, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: Level::Warning, message: message.into() }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self { level: Level::Danger, message: message.into() }
    }
}

/// 303 redirect carrying `messages` in the flash cookie.
pub fn redirect(location: &str, messages: Vec<FlashMessage>) -> HttpResponse {
    let mut response = HttpResponse::SeeOther();
    response.insert_header((header::LOCATION, location.to_string()));
    if !messages.is_empty() {
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&messages).unwrap_or_default());
        let cookie = Cookie::build(FLASH_COOKIE, payload)
            .path("/")
            .http_only(true)
            .finish();
        response.cookie(cookie);
    }
    response.finish()
}

/// Read the flashed messages off the request, if any. The caller clears the
/// cookie by attaching [`removal`] to its response.
pub fn take(req: &HttpRequest) -> Vec<FlashMessage> {
    let Some(cookie) = req.cookie(FLASH_COOKIE) else {
        return Vec::new();
    };
    URL_SAFE_NO_PAD
        .decode(cookie.value())
        .ok()
        .and_then(|raw| serde_json::from_slice(&raw).ok())
        .unwrap_or_default()
}

pub fn removal() -> Cookie<'static> {
    let mut cookie = Cookie::new(FLASH_COOKIE, "");
    cookie.set_path("/");
    cookie.make_removal();
    cookie
}
