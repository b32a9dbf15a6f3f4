//! Hotel booking service: public reservations, staff review through an
//! authenticated admin panel, and best-effort email notifications for
//! booking lifecycle events.

pub mod auth;
pub mod config;
pub mod db;
pub mod flash;
pub mod handlers;
pub mod lifecycle;
pub mod mailer;
pub mod models;
