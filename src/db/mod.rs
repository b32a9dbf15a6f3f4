use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::auth;
use crate::config::AppConfig;
use crate::models::admin::AdminRole;

pub async fn get_db_pool(database_url: &str) -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .expect("Failed to create pool")
}

/// Seed the env-configured admin account (dev convenience; a no-op when the
/// variables are absent or the user already exists).
pub async fn ensure_admin_from_env(pool: &SqlitePool, config: &AppConfig) -> Result<(), sqlx::Error> {
    let (Some(username), Some(password)) = (&config.admin_user, &config.admin_password) else {
        log::info!("No ADMIN_USER/ADMIN_PASSWORD in env; skipping admin seed.");
        return Ok(());
    };

    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM admin_users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;
    if existing.is_some() {
        log::info!("Admin user already exists; skipping seed.");
        return Ok(());
    }

    log::info!("Creating admin user from env variables.");
    sqlx::query("INSERT INTO admin_users (username, password_hash, role) VALUES (?, ?, ?)")
        .bind(username)
        .bind(auth::hash_password(password))
        .bind(AdminRole::Superadmin)
        .execute(pool)
        .await?;
    Ok(())
}

/// Seed the suite categories with their availability counts. Existing rows
/// are left alone so restarts never reset live inventory.
pub async fn initialize_room_types(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // (name, description, base_price, total_rooms, max_guests, features)
    const ROOM_TYPES: &[(&str, &str, i64, i64, i64, &str)] = &[
        (
            "Luxury Suite",
            "Private terrace • Panoramic ocean views • Butler service • One Bedroom",
            1_500_000,
            10,
            2,
            "Private terrace, Ocean views, Butler service, King bed",
        ),
        (
            "Imperial Sky Suite",
            "Two-level suite with private plunge pool and observatory lounge.",
            2_400_000,
            5,
            4,
            "Two-level, Plunge pool, Observatory lounge, 2 bedrooms",
        ),
        (
            "Ocean Paragon Suite",
            "Floor-to-ceiling windows, private butler, complimentary yacht transfer.",
            3_700_000,
            3,
            4,
            "Floor-to-ceiling windows, Private butler, Yacht transfer, 2 bedrooms",
        ),
        (
            "Celestial Presidential",
            "Private chef, panoramic terrace, cool in-room spa pavilion.",
            4_100_000,
            2,
            4,
            "Private chef, Spa pavilion, Panoramic terrace, 2 bedrooms",
        ),
        (
            "Garden View Suite",
            "Tranquil garden-facing suite with balcony and complimentary breakfast.",
            2_000_000,
            8,
            3,
            "Garden view, Balcony, Breakfast included, Queen bed",
        ),
        (
            "Horizon Family Suite",
            "Spacious family suite with two bedrooms, kitchenette and kids play area.",
            4_700_000,
            6,
            5,
            "2 bedrooms, Kitchenette, Family-friendly, Extra bed available",
        ),
    ];

    for (name, description, base_price, total_rooms, max_guests, features) in ROOM_TYPES {
        sqlx::query(
            "INSERT INTO room_types \
             (name, description, base_price, total_rooms, available_rooms, max_guests, features) \
             VALUES (?, ?, ?, ?, ?, ?, ?) ON CONFLICT(name) DO NOTHING",
        )
        .bind(name)
        .bind(description)
        .bind(base_price)
        .bind(total_rooms)
        .bind(total_rooms)
        .bind(max_guests)
        .bind(features)
        .execute(pool)
        .await?;
    }
    Ok(())
}
