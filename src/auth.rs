//! Session guard and password hashing. The session is a private cookie
//! holding the user id; handlers take a [`CurrentUser`] argument and never
//! see unauthenticated requests (the 401 catcher redirects to login).

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rocket::http::{Cookie, CookieJar, Status};
use rocket::request::{FromRequest, Outcome, Request};
use sqlx::sqlite::SqlitePool;

use crate::db;

pub const SESSION_COOKIE: &str = "user_id";

pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CurrentUser {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, ()> {
        let Some(pool) = req.rocket().state::<SqlitePool>() else {
            return Outcome::Error((Status::InternalServerError, ()));
        };

        let id = req
            .cookies()
            .get_private(SESSION_COOKIE)
            .and_then(|c| c.value().parse::<i64>().ok());

        let Some(id) = id else {
            return Outcome::Error((Status::Unauthorized, ()));
        };

        // Stale cookie for a deleted account counts as unauthenticated.
        match db::get_user(pool, id).await {
            Ok(Some(user)) => Outcome::Success(CurrentUser {
                id: user.id,
                username: user.username,
            }),
            Ok(None) => Outcome::Error((Status::Unauthorized, ())),
            Err(e) => {
                log::error!("session lookup failed: {e:#}");
                Outcome::Error((Status::InternalServerError, ()))
            }
        }
    }
}

pub fn start_session(cookies: &CookieJar<'_>, user_id: i64) {
    cookies.add_private(Cookie::new(SESSION_COOKIE, user_id.to_string()));
}

pub fn end_session(cookies: &CookieJar<'_>) {
    cookies.remove_private(SESSION_COOKIE);
}

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            log::error!("stored password hash is malformed: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{hash_password, verify_password};

    #[test]
    fn password_round_trip() {
        let hash = hash_password("Str0ngPass!").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("Str0ngPass!", &hash));
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
