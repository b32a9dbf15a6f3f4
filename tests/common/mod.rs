use chrono::NaiveDate;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use empyrean_booking::lifecycle::BookingRequest;

/// Fresh in-memory database with the real migrations applied. A single
/// long-lived connection keeps the in-memory schema alive for the whole test.
pub async fn setup_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");
    pool
}

pub async fn seed_room(
    pool: &SqlitePool,
    name: &str,
    base_price: i64,
    total_rooms: i64,
    available_rooms: i64,
    max_guests: i64,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO room_types (name, description, base_price, total_rooms, available_rooms, max_guests, features) \
         VALUES (?, '', ?, ?, ?, ?, '') RETURNING id",
    )
    .bind(name)
    .bind(base_price)
    .bind(total_rooms)
    .bind(available_rooms)
    .bind(max_guests)
    .fetch_one(pool)
    .await
    .expect("seed room")
}

pub async fn available_rooms(pool: &SqlitePool, room_type_id: i64) -> i64 {
    sqlx::query_scalar("SELECT available_rooms FROM room_types WHERE id = ?")
        .bind(room_type_id)
        .fetch_one(pool)
        .await
        .expect("available_rooms")
}

pub async fn booking_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM bookings")
        .fetch_one(pool)
        .await
        .expect("booking count")
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// A valid three-night request against `room_type_id`; tests tweak fields.
pub fn request(room_type_id: i64) -> BookingRequest {
    BookingRequest {
        full_name: "Ada Obi".to_string(),
        email: "ada@example.com".to_string(),
        phone: String::new(),
        checkin: "2031-01-10".to_string(),
        checkout: "2031-01-13".to_string(),
        room_type_id: Some(room_type_id),
        guests: 2,
    }
}

/// Reference "today" safely before the canned check-in dates.
pub fn today() -> NaiveDate {
    day(2030, 12, 31)
}
