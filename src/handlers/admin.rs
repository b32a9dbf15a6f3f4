//! Admin panel: login/logout, booking list and detail, status transitions
//! and deletion. Every handler past login takes an [`AdminPrincipal`], which
//! is the session guard.

use actix_web::cookie::Cookie;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::auth::{self, AdminPrincipal, SESSION_COOKIE};
use crate::config::AppConfig;
use crate::flash::{self, FlashMessage};
use crate::handlers::bookings::dispatch;
use crate::lifecycle::{self, BookingError};
use crate::mailer::Mailer;
use crate::models::admin::AdminUser;
use crate::models::booking::{Booking, BookingStatus};
use crate::models::room_type::RoomType;

const PER_PAGE: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

pub async fn login_form(req: HttpRequest, principal: Option<AdminPrincipal>) -> impl Responder {
    if principal.is_some() {
        return flash::redirect("/admin", Vec::new());
    }
    let messages = flash::take(&req);
    let mut response = HttpResponse::Ok();
    if !messages.is_empty() {
        response.cookie(flash::removal());
    }
    response.json(serde_json::json!({ "messages": messages }))
}

pub async fn login(
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    form: web::Form<LoginForm>,
) -> impl Responder {
    let username = form.username.trim().to_string();
    let password = form.password.trim().to_string();
    if username.is_empty() || password.is_empty() {
        return flash::redirect(
            "/admin/login",
            vec![FlashMessage::danger("Username and password required.")],
        );
    }

    let user = match sqlx::query_as::<_, AdminUser>("SELECT * FROM admin_users WHERE username = ?")
        .bind(&username)
        .fetch_optional(pool.get_ref())
        .await
    {
        Ok(user) => user,
        Err(e) => {
            log::error!("admin lookup failed: {e}");
            return flash::redirect(
                "/admin/login",
                vec![FlashMessage::danger("Could not log in. Try again later.")],
            );
        }
    };

    let verified = user
        .as_ref()
        .map(|u| auth::verify_password(&password, &u.password_hash))
        .unwrap_or(false);
    let Some(user) = user.filter(|_| verified) else {
        return flash::redirect("/admin/login", vec![FlashMessage::danger("Invalid credentials.")]);
    };

    match auth::create_session(pool.get_ref(), &config.secret_key, user.id).await {
        Ok(token) => {
            let cookie = Cookie::build(SESSION_COOKIE, token)
                .path("/")
                .http_only(true)
                .finish();
            let mut response =
                flash::redirect("/admin", vec![FlashMessage::success("Login successful.")]);
            if let Err(e) = response.add_cookie(&cookie) {
                log::error!("could not attach session cookie: {e}");
            }
            response
        }
        Err(e) => {
            log::error!("could not create session for {username}: {e}");
            flash::redirect(
                "/admin/login",
                vec![FlashMessage::danger("Could not log in. Try again later.")],
            )
        }
    }
}

pub async fn logout(
    pool: web::Data<SqlitePool>,
    config: web::Data<AppConfig>,
    req: HttpRequest,
    _principal: AdminPrincipal,
) -> impl Responder {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        if let Err(e) = auth::destroy_session(pool.get_ref(), &config.secret_key, cookie.value()).await
        {
            log::error!("failed to destroy session: {e}");
        }
    }
    let mut response = flash::redirect("/", vec![FlashMessage::success("You have been logged out.")]);
    if let Err(e) = response.add_cookie(&auth::session_removal_cookie()) {
        log::error!("could not clear session cookie: {e}");
    }
    response
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
}

pub async fn dashboard(
    pool: web::Data<SqlitePool>,
    req: HttpRequest,
    query: web::Query<PageQuery>,
    principal: AdminPrincipal,
) -> impl Responder {
    let page = query.page.unwrap_or(1).max(1);
    let total: i64 = match sqlx::query_scalar("SELECT COUNT(*) FROM bookings")
        .fetch_one(pool.get_ref())
        .await
    {
        Ok(total) => total,
        Err(e) => {
            log::error!("failed to count bookings: {e}");
            return HttpResponse::InternalServerError()
                .json(serde_json::json!({ "error": "Error fetching bookings" }));
        }
    };
    let pages = ((total + PER_PAGE - 1) / PER_PAGE).max(1);

    let bookings = match sqlx::query_as::<_, Booking>(
        "SELECT * FROM bookings ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
    )
    .bind(PER_PAGE)
    .bind((page - 1) * PER_PAGE)
    .fetch_all(pool.get_ref())
    .await
    {
        Ok(bookings) => bookings,
        Err(e) => {
            log::error!("failed to list bookings: {e}");
            return HttpResponse::InternalServerError()
                .json(serde_json::json!({ "error": "Error fetching bookings" }));
        }
    };

    let messages = flash::take(&req);
    let mut response = HttpResponse::Ok();
    if !messages.is_empty() {
        response.cookie(flash::removal());
    }
    response.json(serde_json::json!({
        "bookings": bookings,
        "page": page,
        "pages": pages,
        "total": total,
        "admin": principal,
        "messages": messages,
    }))
}

pub async fn booking_detail(
    pool: web::Data<SqlitePool>,
    req: HttpRequest,
    path: web::Path<i64>,
    _principal: AdminPrincipal,
) -> impl Responder {
    let booking_id = path.into_inner();
    let booking = match sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?")
        .bind(booking_id)
        .fetch_optional(pool.get_ref())
        .await
    {
        Ok(Some(booking)) => booking,
        Ok(None) => {
            return HttpResponse::NotFound()
                .json(serde_json::json!({ "error": "Booking not found" }));
        }
        Err(e) => {
            log::error!("failed to load booking #{booking_id}: {e}");
            return HttpResponse::InternalServerError()
                .json(serde_json::json!({ "error": "Database error" }));
        }
    };
    let room_type = match sqlx::query_as::<_, RoomType>("SELECT * FROM room_types WHERE id = ?")
        .bind(booking.room_type_id)
        .fetch_one(pool.get_ref())
        .await
    {
        Ok(room_type) => room_type,
        Err(e) => {
            log::error!("failed to load room type for booking #{booking_id}: {e}");
            return HttpResponse::InternalServerError()
                .json(serde_json::json!({ "error": "Database error" }));
        }
    };

    let messages = flash::take(&req);
    let mut response = HttpResponse::Ok();
    if !messages.is_empty() {
        response.cookie(flash::removal());
    }
    response.json(serde_json::json!({
        "booking": booking,
        "room_type": room_type,
        "messages": messages,
    }))
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    #[serde(default)]
    status: String,
    #[serde(default)]
    reason: String,
}

pub async fn change_status(
    pool: web::Data<SqlitePool>,
    mailer: web::Data<Mailer>,
    path: web::Path<i64>,
    form: web::Form<StatusForm>,
    _principal: AdminPrincipal,
) -> impl Responder {
    let booking_id = path.into_inner();
    let detail = format!("/admin/booking/{booking_id}");

    let Ok(new_status) = form.status.parse::<BookingStatus>() else {
        return flash::redirect(&detail, vec![FlashMessage::danger("Invalid status")]);
    };
    let reason = form.reason.trim();
    let reason = (!reason.is_empty()).then_some(reason);

    let (booking, room_type) =
        match lifecycle::transition_status(pool.get_ref(), booking_id, new_status, reason).await {
            Ok(result) => result,
            Err(BookingError::NotFound) => {
                return HttpResponse::NotFound()
                    .json(serde_json::json!({ "error": "Booking not found" }));
            }
            Err(e @ BookingError::NoRoomsAvailable) => {
                return flash::redirect(&detail, vec![FlashMessage::danger(e.to_string())]);
            }
            Err(e) => {
                log::error!("could not update status for booking #{booking_id}: {e}");
                return flash::redirect(&detail, vec![FlashMessage::danger("Could not update status")]);
            }
        };

    // The transition is committed; from here on email failures only degrade
    // the outcome message.
    let message = match new_status {
        BookingStatus::Confirmed => {
            let ok_guest = dispatch(&mailer, &booking, &room_type.name, Mailer::booking_confirmed).await;
            let ok_staff = dispatch(&mailer, &booking, &room_type.name, Mailer::confirmation_alert).await;
            match (ok_guest, ok_staff) {
                (true, true) => FlashMessage::success(
                    "Booking confirmed, confirmation email sent to guest and staff notified.",
                ),
                (true, false) => FlashMessage::warning(
                    "Booking confirmed and guest email sent, but staff notification failed.",
                ),
                (false, true) => FlashMessage::warning(
                    "Booking confirmed and staff notified, but guest email failed to send.",
                ),
                (false, false) => {
                    FlashMessage::warning("Booking confirmed but email notifications failed.")
                }
            }
        }
        BookingStatus::Cancelled => {
            let ok_guest = dispatch(&mailer, &booking, &room_type.name, Mailer::booking_cancelled).await;
            let ok_staff = dispatch(&mailer, &booking, &room_type.name, Mailer::cancellation_alert).await;
            match (ok_guest, ok_staff) {
                (true, true) => {
                    FlashMessage::success("Booking cancelled. Booker and hotel notified by email.")
                }
                (true, false) => FlashMessage::warning(
                    "Booking cancelled and booker notified, but hotel notification failed.",
                ),
                (false, true) => FlashMessage::warning(
                    "Booking cancelled and hotel notified, but booker email failed.",
                ),
                (false, false) => {
                    FlashMessage::warning("Booking cancelled but email notifications failed.")
                }
            }
        }
        BookingStatus::Pending => FlashMessage::success("Booking status updated."),
    };

    flash::redirect(&detail, vec![message])
}

pub async fn delete_booking(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    _principal: AdminPrincipal,
) -> impl Responder {
    let booking_id = path.into_inner();
    // Deleting never returns the room to availability.
    match sqlx::query("DELETE FROM bookings WHERE id = ?")
        .bind(booking_id)
        .execute(pool.get_ref())
        .await
    {
        Ok(done) if done.rows_affected() == 0 => {
            HttpResponse::NotFound().json(serde_json::json!({ "error": "Booking not found" }))
        }
        Ok(_) => flash::redirect("/admin", vec![FlashMessage::success("Booking deleted.")]),
        Err(e) => {
            log::error!("could not delete booking #{booking_id}: {e}");
            flash::redirect("/admin", vec![FlashMessage::danger("Could not delete booking.")])
        }
    }
}
