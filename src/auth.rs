//! Admin authentication: password hashing, DB-backed sessions and the
//! request guard protecting the admin panel.
//!
//! Sessions are plain random tokens handed out as an HttpOnly cookie; only a
//! keyed digest of the token is stored, computed with the configured secret.

use actix_web::dev::Payload;
use actix_web::http::StatusCode;
use actix_web::{web, FromRequest, HttpRequest, HttpResponse, ResponseError};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use constant_time_eq::constant_time_eq;
use futures_util::future::LocalBoxFuture;
use serde::Serialize;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::flash::{self, FlashMessage};
use crate::models::admin::AdminRole;

pub const SESSION_COOKIE: &str = "admin_session";

const HASH_ROUNDS: u32 = 100_000;

fn stretch(salt: &[u8], raw: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(raw);
    let mut digest: [u8; 32] = hasher.finalize().into();
    for _ in 1..HASH_ROUNDS {
        let mut hasher = Sha256::new();
        hasher.update(salt);
        hasher.update(digest);
        digest = hasher.finalize().into();
    }
    digest
}

/// Salted, iterated SHA-256 in a self-describing `sha256$salt$digest` form.
pub fn hash_password(raw: &str) -> String {
    let salt: [u8; 16] = rand::random();
    let digest = stretch(&salt, raw.as_bytes());
    format!(
        "sha256${}${}",
        URL_SAFE_NO_PAD.encode(salt),
        URL_SAFE_NO_PAD.encode(digest)
    )
}

pub fn verify_password(raw: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some("sha256"), Some(salt), Some(digest)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (URL_SAFE_NO_PAD.decode(salt), URL_SAFE_NO_PAD.decode(digest))
    else {
        return false;
    };
    constant_time_eq(&stretch(&salt, raw.as_bytes()), &expected)
}

/// Keyed digest stored in place of the raw session token.
pub fn token_digest(secret: &str, token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.update(token.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Create a session row for `admin_id` and return the raw cookie token.
pub async fn create_session(
    pool: &SqlitePool,
    secret: &str,
    admin_id: i64,
) -> Result<String, sqlx::Error> {
    let raw: [u8; 32] = rand::random();
    let token = URL_SAFE_NO_PAD.encode(raw);
    sqlx::query("INSERT INTO admin_sessions (token_digest, admin_id, created_at) VALUES (?, ?, ?)")
        .bind(token_digest(secret, &token))
        .bind(admin_id)
        .bind(chrono::Utc::now().naive_utc())
        .execute(pool)
        .await?;
    Ok(token)
}

pub async fn destroy_session(
    pool: &SqlitePool,
    secret: &str,
    token: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM admin_sessions WHERE token_digest = ?")
        .bind(token_digest(secret, token))
        .execute(pool)
        .await?;
    Ok(())
}

/// The authenticated admin behind the current request, resolved from the
/// session cookie. Extracting it is the guard: handlers that take an
/// `AdminPrincipal` cannot run without a valid session.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AdminPrincipal {
    pub id: i64,
    pub username: String,
    pub role: AdminRole,
}

#[derive(Debug, thiserror::Error)]
#[error("Please log in to access the admin area.")]
pub struct AuthRequired;

impl ResponseError for AuthRequired {
    fn status_code(&self) -> StatusCode {
        StatusCode::SEE_OTHER
    }

    fn error_response(&self) -> HttpResponse {
        flash::redirect("/admin/login", vec![FlashMessage::danger(self.to_string())])
    }
}

impl FromRequest for AdminPrincipal {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let pool = req.app_data::<web::Data<SqlitePool>>().cloned();
        let config = req.app_data::<web::Data<AppConfig>>().cloned();
        let token = req.cookie(SESSION_COOKIE).map(|c| c.value().to_string());

        Box::pin(async move {
            let (Some(pool), Some(config), Some(token)) = (pool, config, token) else {
                return Err(AuthRequired.into());
            };
            let digest = token_digest(&config.secret_key, &token);
            let principal = sqlx::query_as::<_, AdminPrincipal>(
                "SELECT a.id, a.username, a.role FROM admin_sessions s \
                 JOIN admin_users a ON a.id = s.admin_id WHERE s.token_digest = ?",
            )
            .bind(digest)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(|e| {
                log::error!("session lookup failed: {e}");
                AuthRequired
            })?;
            principal.ok_or_else(|| AuthRequired.into())
        })
    }
}

/// Removal cookie for logout responses.
pub fn session_removal_cookie() -> actix_web::cookie::Cookie<'static> {
    let mut cookie = actix_web::cookie::Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie.make_removal();
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip() {
        let stored = hash_password("hunter2");
        assert!(stored.starts_with("sha256$"));
        assert!(verify_password("hunter2", &stored));
        assert!(!verify_password("hunter3", &stored));
    }

    #[test]
    fn same_password_hashes_differently_per_salt() {
        assert_ne!(hash_password("hunter2"), hash_password("hunter2"));
    }

    #[test]
    fn verify_rejects_malformed_hashes() {
        assert!(!verify_password("hunter2", ""));
        assert!(!verify_password("hunter2", "md5$abc$def"));
        assert!(!verify_password("hunter2", "sha256$not-base64!$%%%"));
    }

    #[test]
    fn token_digest_is_keyed_by_secret() {
        let a = token_digest("secret-a", "token");
        let b = token_digest("secret-b", "token");
        assert_ne!(a, b);
        assert_eq!(a, token_digest("secret-a", "token"));
    }
}
