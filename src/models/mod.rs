pub mod admin;
pub mod booking;
pub mod room_type;
