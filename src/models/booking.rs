use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lifecycle status of a booking. Any status can be re-entered; inventory
/// only moves when a transition crosses the cancelled boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Invalid status")]
pub struct InvalidStatus;

impl FromStr for BookingStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            _ => Err(InvalidStatus),
        }
    }
}

#[derive(Debug, Serialize, Clone, FromRow)]
pub struct Booking {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub checkin: chrono::NaiveDate,
    pub checkout: chrono::NaiveDate,
    pub room_type_id: i64,
    pub guests: i64,
    pub total_price: i64,
    pub status: BookingStatus,
    pub created_at: chrono::NaiveDateTime,
    pub cancellation_reason: Option<String>,
    pub cancelled_at: Option<chrono::NaiveDateTime>,
}

impl Booking {
    pub fn is_pending(&self) -> bool {
        self.status == BookingStatus::Pending
    }

    /// Whole nights between check-in and check-out.
    pub fn nights(&self) -> i64 {
        (self.checkout - self.checkin).num_days()
    }
}
