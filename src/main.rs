use actix_web::{middleware, web, App, HttpServer};
use dotenv::dotenv;
use env_logger::Env;

use empyrean_booking::config::AppConfig;
use empyrean_booking::mailer::Mailer;
use empyrean_booking::{db, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger and environment
    dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::from_env();

    log::info!("Connecting to database...");
    let pool = db::get_db_pool(&config.database_url).await;

    // Run migrations
    log::info!("Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    if let Err(e) = db::ensure_admin_from_env(&pool, &config).await {
        log::error!("admin seed failed: {e}");
    }
    if let Err(e) = db::initialize_room_types(&pool).await {
        log::error!("room type seed failed: {e}");
    }

    let bind_addr = (config.bind_host.clone(), config.bind_port);
    log::info!("Starting server at http://{}:{}", bind_addr.0, bind_addr.1);

    let pool_data = web::Data::new(pool);
    let config_data = web::Data::new(config.clone());
    let mailer_data = web::Data::new(Mailer::new(config.mail.clone()));

    HttpServer::new(move || {
        App::new()
            .app_data(pool_data.clone())
            .app_data(config_data.clone())
            .app_data(mailer_data.clone())
            .wrap(middleware::Logger::default())
            .configure(handlers::routes)
    })
    .bind(bind_addr)?
    .run()
    .await
}
