use rocket::form::{Contextual, Form};
use rocket::http::CookieJar;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::{context, Template};
use sqlx::sqlite::SqlitePool;

use super::{server_error, FlashView, Page};
use crate::auth;
use crate::db;
use crate::forms::{LoginForm, RegisterForm, RegisterFormView};

// Routes //////////////////////////////////////////////////////////////////////////////////////////

#[get("/register")]
pub async fn register_page() -> Template {
    Template::render("register", context! { form: RegisterFormView::empty() })
}

/// Open registration; a successful submission immediately establishes a
/// session for the new account.
#[post("/register", data = "<form>")]
pub async fn register<'r>(
    pool: &State<SqlitePool>,
    cookies: &CookieJar<'_>,
    form: Form<Contextual<'r, RegisterForm<'r>>>,
) -> Page {
    let Some(ref submission) = form.value else {
        return Page::Template(Template::render(
            "register",
            context! { form: RegisterFormView::from_context(&form.context) },
        ));
    };

    let password_hash = match auth::hash_password(submission.password) {
        Ok(hash) => hash,
        Err(e) => return Page::Status(server_error(e)),
    };

    match db::create_user(pool, submission.username, &password_hash).await {
        Ok(Some(user_id)) => {
            log::info!("registered new user {}", submission.username);
            auth::start_session(cookies, user_id);
            Page::Flash(Flash::success(
                Redirect::to(uri!(crate::routes::notes::index)),
                "Welcome! Your account was created.",
            ))
        }
        Ok(None) => Page::Template(Template::render(
            "register",
            context! {
                form: RegisterFormView::from_context(&form.context)
                    .with_error("username", "username already taken"),
            },
        )),
        Err(e) => Page::Status(server_error(e)),
    }
}

#[get("/login")]
pub async fn login_page(flash: Option<FlashMessage<'_>>) -> Template {
    Template::render(
        "login",
        context! { flash: FlashView::from_message(flash), error: false },
    )
}

#[post("/login", data = "<form>")]
pub async fn login(
    pool: &State<SqlitePool>,
    cookies: &CookieJar<'_>,
    form: Form<LoginForm<'_>>,
) -> Result<Flash<Redirect>, Page> {
    let user = db::get_user_by_name(pool, form.username)
        .await
        .map_err(|e| Page::Status(server_error(e)))?;

    // One rejection path for unknown user and wrong password.
    let authenticated = user
        .filter(|u| auth::verify_password(form.password, &u.password_hash));

    match authenticated {
        Some(user) => {
            auth::start_session(cookies, user.id);
            Ok(Flash::success(
                Redirect::to(uri!(crate::routes::notes::index)),
                "Logged in successfully",
            ))
        }
        None => Err(Page::Template(Template::render(
            "login",
            context! { flash: None::<FlashView>, error: true },
        ))),
    }
}

#[post("/logout")]
pub async fn logout(cookies: &CookieJar<'_>) -> Flash<Redirect> {
    auth::end_session(cookies);
    Flash::success(Redirect::to(uri!(login_page)), "Logged out")
}
