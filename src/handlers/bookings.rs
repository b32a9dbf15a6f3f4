//! Public surface: the room-type listing and the booking form target.

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::flash::{self, FlashMessage};
use crate::lifecycle::{self, BookingError, BookingRequest};
use crate::mailer::Mailer;
use crate::models::room_type::RoomType;

/// Raw form fields; numeric fields stay strings so a blank submission turns
/// into a validation message instead of a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct BookingForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub checkin: String,
    #[serde(default)]
    pub checkout: String,
    #[serde(default)]
    pub room_type_id: String,
    #[serde(default)]
    pub guests: String,
}

impl From<BookingForm> for BookingRequest {
    fn from(form: BookingForm) -> Self {
        BookingRequest {
            room_type_id: form.room_type_id.trim().parse().ok(),
            guests: form.guests.trim().parse().unwrap_or(1),
            full_name: form.full_name,
            email: form.email,
            phone: form.phone,
            checkin: form.checkin,
            checkout: form.checkout,
        }
    }
}

pub async fn index(pool: web::Data<SqlitePool>, req: HttpRequest) -> impl Responder {
    let room_types = match sqlx::query_as::<_, RoomType>("SELECT * FROM room_types ORDER BY id")
        .fetch_all(pool.get_ref())
        .await
    {
        Ok(room_types) => room_types,
        Err(e) => {
            log::error!("failed to load room types: {e}");
            return HttpResponse::InternalServerError()
                .json(serde_json::json!({ "error": "Error fetching room types" }));
        }
    };

    let messages = flash::take(&req);
    let mut response = HttpResponse::Ok();
    if !messages.is_empty() {
        response.cookie(flash::removal());
    }
    response.json(serde_json::json!({
        "room_types": room_types,
        "messages": messages,
        "today": Utc::now().date_naive(),
    }))
}

pub async fn book(
    pool: web::Data<SqlitePool>,
    mailer: web::Data<Mailer>,
    form: web::Form<BookingForm>,
) -> impl Responder {
    let request: BookingRequest = form.into_inner().into();
    let today = Utc::now().date_naive();

    let (booking, room_type) = match lifecycle::create_booking(pool.get_ref(), &request, today).await
    {
        Ok(created) => created,
        Err(BookingError::Validation(errors)) => {
            return flash::redirect("/", errors.into_iter().map(FlashMessage::danger).collect());
        }
        Err(e) => {
            log::error!("could not save booking: {e}");
            return flash::redirect(
                "/",
                vec![FlashMessage::danger("Could not save booking. Try again later.")],
            );
        }
    };

    // The booking is committed; email outcomes are logged but never undo it.
    dispatch(&mailer, &booking, &room_type.name, Mailer::booking_received).await;
    dispatch(&mailer, &booking, &room_type.name, Mailer::new_booking_alert).await;

    flash::redirect(
        "/",
        vec![FlashMessage::success(format!(
            "Thanks {}! Your booking is received and awaiting confirmation. {} availability updated.",
            booking.full_name, room_type.name
        ))],
    )
}

/// Run one blocking mail send off the async workers and report its outcome.
pub(crate) async fn dispatch<F>(
    mailer: &web::Data<Mailer>,
    booking: &crate::models::booking::Booking,
    suite: &str,
    send: F,
) -> bool
where
    F: FnOnce(&Mailer, &crate::models::booking::Booking, &str) -> bool + Send + 'static,
{
    let booking_id = booking.id;
    let mailer = mailer.get_ref().clone();
    let booking = booking.clone();
    let suite = suite.to_string();
    match web::block(move || send(&mailer, &booking, &suite)).await {
        Ok(sent) => sent,
        Err(e) => {
            log::error!("notification dispatch failed for booking #{booking_id}: {e}");
            false
        }
    }
}
