pub mod admin;
pub mod bookings;

use actix_web::web;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(bookings::index))
        .route("/book", web::post().to(bookings::book))
        .service(
            web::scope("/admin")
                .route("/login", web::get().to(admin::login_form))
                .route("/login", web::post().to(admin::login))
                .route("/logout", web::post().to(admin::logout))
                .route("", web::get().to(admin::dashboard))
                .route("/booking/{id}", web::get().to(admin::booking_detail))
                .route("/booking/{id}/status", web::post().to(admin::change_status))
                .route("/booking/{id}/delete", web::post().to(admin::delete_booking)),
        );
}
