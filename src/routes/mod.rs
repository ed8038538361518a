pub mod labels;
pub mod notes;
pub mod users;

use rocket::http::Status;
use rocket::response::{Flash, Redirect};
use rocket_dyn_templates::Template;
use serde::Serialize;

/// Common handler outcome: redirect with a flash on success, re-rendered
/// form on validation failure, bare status for 404/500.
#[derive(Responder)]
pub enum Page {
    Flash(Flash<Redirect>),
    Template(Template),
    Status(Status),
}

/// One-shot notification for the next rendered page.
#[derive(Serialize)]
pub struct FlashView {
    pub kind: String,
    pub message: String,
}

impl FlashView {
    pub fn from_message(flash: Option<rocket::request::FlashMessage<'_>>) -> Option<FlashView> {
        flash.map(|f| FlashView {
            kind: f.kind().to_string(),
            message: f.message().to_string(),
        })
    }
}

pub fn server_error(e: anyhow::Error) -> Status {
    log::error!("database failure: {e:#}");
    Status::InternalServerError
}

#[catch(401)]
pub fn unauthorized() -> Redirect {
    Redirect::to(uri!(users::login_page))
}

#[catch(404)]
pub fn not_found() -> Template {
    Template::render("404", rocket_dyn_templates::context! {})
}
