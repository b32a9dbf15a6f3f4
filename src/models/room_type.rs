use serde::{Deserialize, Serialize};

/// A class of hotel unit sharing price, capacity and availability.
///
/// `available_rooms` is the shared inventory counter; it only moves through
/// the lifecycle operations and stays within `0..=total_rooms`.
#[derive(Debug, Serialize, Deserialize, Clone, sqlx::FromRow)]
pub struct RoomType {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub base_price: i64,
    pub total_rooms: i64,
    pub available_rooms: i64,
    pub max_guests: i64,
    pub features: String,
}
