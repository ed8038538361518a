#[macro_use]
extern crate rocket;

pub mod auth;
pub mod db;
pub mod forms;
pub mod routes;
pub mod structs;

use std::env;

use dotenv::dotenv;
use rocket::fairing::{self, AdHoc};
use rocket::figment::Figment;
use rocket::{Build, Rocket};
use rocket_dyn_templates::Template;
use sqlx::sqlite::SqlitePoolOptions;

pub fn rocket() -> Rocket<Build> {
    dotenv().ok();
    custom(rocket::Config::figment())
}

/// Build the application from an explicit figment; tests use this to point
/// at an in-memory database.
pub fn custom(figment: Figment) -> Rocket<Build> {
    rocket::custom(figment)
        .attach(Template::fairing())
        .attach(AdHoc::try_on_ignite("SQLite pool", init_pool))
        .mount(
            "/",
            routes![
                routes::notes::index,
                routes::notes::index_by_label,
                routes::notes::create_page,
                routes::notes::create,
                routes::notes::edit_page,
                routes::notes::edit,
                routes::notes::delete,
                routes::notes::delete_get,
                routes::labels::create_page,
                routes::labels::create,
                routes::labels::edit_page,
                routes::labels::edit,
                routes::labels::delete,
                routes::labels::delete_get,
                routes::users::register_page,
                routes::users::register,
                routes::users::login_page,
                routes::users::login,
                routes::users::logout,
            ],
        )
        .register("/", catchers![routes::unauthorized, routes::not_found])
}

async fn init_pool(rocket: Rocket<Build>) -> fairing::Result {
    let url = rocket
        .figment()
        .extract_inner::<String>("database_url")
        .ok()
        .or_else(|| env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| "sqlite:noteapp.db?mode=rwc".to_string());

    // An in-memory SQLite database exists per connection; a pool larger
    // than one would hand out empty databases.
    let max_connections = if url.contains("memory") { 1 } else { 5 };

    let pool = match SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(&url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("failed to connect to {url}: {e}");
            return Err(rocket);
        }
    };

    if let Err(e) = db::migrate(&pool).await {
        log::error!("migration failed: {e:#}");
        return Err(rocket);
    }

    Ok(rocket.manage(pool))
}
