//! Booking lifecycle: creation validation and status transitions.
//!
//! Both operations run their reads and counter adjustments inside a single
//! sqlx transaction, and the availability decrement is guarded by
//! `available_rooms > 0` in SQL so two racing requests against the last room
//! can never both succeed.

use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use validator::ValidateEmail;

use crate::models::booking::{Booking, BookingStatus};
use crate::models::room_type::RoomType;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw visitor submission, as it arrives from the booking form.
#[derive(Debug, Clone, Default)]
pub struct BookingRequest {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub checkin: String,
    pub checkout: String,
    pub room_type_id: Option<i64>,
    pub guests: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    /// Collected human-readable validation messages; nothing was mutated.
    #[error("{}", .0.join(" "))]
    Validation(Vec<String>),
    #[error("Booking not found.")]
    NotFound,
    /// Re-activating a cancelled booking found no room left.
    #[error("Cannot confirm booking: no rooms available.")]
    NoRoomsAvailable,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

fn parse_date(raw: &str, errors: &mut Vec<String>) -> Option<NaiveDate> {
    if raw.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            errors.push("Invalid date format.".to_string());
            None
        }
    }
}

/// Validate a submission and, if it passes, create a `pending` booking while
/// taking one room out of availability.
///
/// Validation is collective: the caller receives every failing rule, not just
/// the first. On any failure no row is written and the counter is untouched.
pub async fn create_booking(
    pool: &SqlitePool,
    request: &BookingRequest,
    today: NaiveDate,
) -> Result<(Booking, RoomType), BookingError> {
    let full_name = request.full_name.trim();
    let email = request.email.trim();
    let phone = request.phone.trim();

    let mut errors = Vec::new();
    if full_name.is_empty() {
        errors.push("Full name required.".to_string());
    }
    if email.is_empty() {
        errors.push("Email required.".to_string());
    } else if !email.validate_email() {
        errors.push("Valid email address required.".to_string());
    }
    if request.checkin.trim().is_empty() || request.checkout.trim().is_empty() {
        errors.push("Check-in and Check-out required.".to_string());
    }
    if request.room_type_id.is_none() {
        errors.push("Room type is required.".to_string());
    }

    let mut tx = pool.begin().await?;

    let room_type = match request.room_type_id {
        Some(id) => {
            sqlx::query_as::<_, RoomType>("SELECT * FROM room_types WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
        }
        None => None,
    };
    match &room_type {
        Some(rt) if rt.available_rooms < 1 => {
            errors.push(format!("Sorry, no {} rooms available.", rt.name));
        }
        None if request.room_type_id.is_some() => {
            errors.push("Invalid room type selected.".to_string());
        }
        _ => {}
    }

    let checkin = parse_date(request.checkin.trim(), &mut errors);
    let checkout = parse_date(request.checkout.trim(), &mut errors);
    if let (Some(checkin), Some(checkout)) = (checkin, checkout) {
        if checkin >= checkout {
            errors.push("Check-in must be before check-out.".to_string());
        }
        if checkin < today {
            errors.push("Check-in date cannot be in the past.".to_string());
        }
    }

    if let Some(rt) = &room_type {
        if request.guests > rt.max_guests {
            errors.push(format!("Maximum guests for this room is {}.", rt.max_guests));
        }
    }

    if !errors.is_empty() {
        return Err(BookingError::Validation(errors));
    }
    let (Some(room_type), Some(checkin), Some(checkout)) = (room_type, checkin, checkout) else {
        // Every missing piece pushed an error above, so this stays unreachable.
        return Err(BookingError::Validation(vec!["Invalid booking request.".to_string()]));
    };

    // Guarded decrement: the losing racer sees zero rows affected here even
    // though the availability check above passed.
    let taken = sqlx::query(
        "UPDATE room_types SET available_rooms = available_rooms - 1 \
         WHERE id = ? AND available_rooms > 0",
    )
    .bind(room_type.id)
    .execute(&mut *tx)
    .await?
    .rows_affected();
    if taken == 0 {
        return Err(BookingError::Validation(vec![format!(
            "Sorry, no {} rooms available.",
            room_type.name
        )]));
    }

    let nights = (checkout - checkin).num_days();
    let total_price = nights * room_type.base_price;
    let created_at = Utc::now().naive_utc();

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO bookings \
         (full_name, email, phone, checkin, checkout, room_type_id, guests, total_price, status, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(full_name)
    .bind(email)
    .bind(if phone.is_empty() { None } else { Some(phone) })
    .bind(checkin)
    .bind(checkout)
    .bind(room_type.id)
    .bind(request.guests)
    .bind(total_price)
    .bind(BookingStatus::Pending)
    .bind(created_at)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    let booking = Booking {
        id,
        full_name: full_name.to_string(),
        email: email.to_string(),
        phone: if phone.is_empty() { None } else { Some(phone.to_string()) },
        checkin,
        checkout,
        room_type_id: room_type.id,
        guests: request.guests,
        total_price,
        status: BookingStatus::Pending,
        created_at,
        cancellation_reason: None,
        cancelled_at: None,
    };
    let room_type = RoomType {
        available_rooms: room_type.available_rooms - 1,
        ..room_type
    };
    Ok((booking, room_type))
}

/// Move a booking to `new_status`, adjusting room availability when the
/// transition crosses the cancelled boundary.
///
/// Booking and room type are persisted together in one transaction; a failure
/// anywhere rolls both back. `reason` is recorded only when cancelling.
pub async fn transition_status(
    pool: &SqlitePool,
    booking_id: i64,
    new_status: BookingStatus,
    reason: Option<&str>,
) -> Result<(Booking, RoomType), BookingError> {
    use BookingStatus::{Cancelled, Confirmed, Pending};

    let mut tx = pool.begin().await?;

    let mut booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?")
        .bind(booking_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(BookingError::NotFound)?;
    let mut room_type = sqlx::query_as::<_, RoomType>("SELECT * FROM room_types WHERE id = ?")
        .bind(booking.room_type_id)
        .fetch_one(&mut *tx)
        .await?;

    match (booking.status, new_status) {
        (Pending | Confirmed, Cancelled) => {
            // Return the room to availability.
            sqlx::query("UPDATE room_types SET available_rooms = available_rooms + 1 WHERE id = ?")
                .bind(room_type.id)
                .execute(&mut *tx)
                .await?;
            room_type.available_rooms += 1;
            booking.cancellation_reason = reason
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(String::from);
            booking.cancelled_at = Some(Utc::now().naive_utc());
        }
        (Cancelled, Pending | Confirmed) => {
            // Re-activation takes a room back; reject outright when none left.
            let taken = sqlx::query(
                "UPDATE room_types SET available_rooms = available_rooms - 1 \
                 WHERE id = ? AND available_rooms > 0",
            )
            .bind(room_type.id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
            if taken == 0 {
                return Err(BookingError::NoRoomsAvailable);
            }
            room_type.available_rooms -= 1;
        }
        // pending<->confirmed and same-status updates never touch inventory.
        _ => {}
    }

    booking.status = new_status;
    sqlx::query(
        "UPDATE bookings SET status = ?, cancellation_reason = ?, cancelled_at = ? WHERE id = ?",
    )
    .bind(booking.status)
    .bind(&booking.cancellation_reason)
    .bind(booking.cancelled_at)
    .bind(booking.id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok((booking, room_type))
}
