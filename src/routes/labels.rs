use rocket::form::{Contextual, Form};
use rocket::http::Status;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::{context, Template};
use sqlx::sqlite::SqlitePool;

use super::{server_error, Page};
use crate::auth::CurrentUser;
use crate::db;
use crate::forms::{LabelForm, LabelFormView};

// Routes //////////////////////////////////////////////////////////////////////////////////////////

#[get("/labels/create")]
pub async fn create_page(user: CurrentUser) -> Template {
    Template::render(
        "labels/create",
        context! { username: &user.username, form: LabelFormView::empty() },
    )
}

#[post("/labels/create", data = "<form>")]
pub async fn create<'r>(
    user: CurrentUser,
    pool: &State<SqlitePool>,
    form: Form<Contextual<'r, LabelForm<'r>>>,
) -> Page {
    let Some(ref label) = form.value else {
        return Page::Template(Template::render(
            "labels/create",
            context! { username: &user.username, form: LabelFormView::from_context(&form.context) },
        ));
    };

    match db::create_label(pool, user.id, label.title, label.color).await {
        Ok(_) => Page::Flash(Flash::success(
            Redirect::to(uri!(crate::routes::notes::index)),
            "Label created successfully",
        )),
        Err(e) => Page::Status(server_error(e)),
    }
}

#[get("/labels/<id>/edit")]
pub async fn edit_page(
    user: CurrentUser,
    pool: &State<SqlitePool>,
    id: i64,
) -> Result<Template, Status> {
    let label = db::get_label(pool, user.id, id)
        .await
        .map_err(server_error)?
        .ok_or(Status::NotFound)?;
    Ok(Template::render(
        "labels/edit",
        context! { username: &user.username, id: id, form: LabelFormView::from_label(&label) },
    ))
}

#[post("/labels/<id>/edit", data = "<form>")]
pub async fn edit<'r>(
    user: CurrentUser,
    pool: &State<SqlitePool>,
    id: i64,
    form: Form<Contextual<'r, LabelForm<'r>>>,
) -> Page {
    let Some(ref label) = form.value else {
        return Page::Template(Template::render(
            "labels/edit",
            context! {
                username: &user.username,
                id: id,
                form: LabelFormView::from_context(&form.context),
            },
        ));
    };

    match db::update_label(pool, user.id, id, label.title, label.color).await {
        Ok(true) => Page::Flash(Flash::success(
            Redirect::to(uri!(crate::routes::notes::index)),
            "Label edited successfully",
        )),
        Ok(false) => Page::Status(Status::NotFound),
        Err(e) => Page::Status(server_error(e)),
    }
}

/// Notes referencing the label are unlabeled, not deleted (see db::delete_label).
#[post("/labels/<id>/delete")]
pub async fn delete(user: CurrentUser, pool: &State<SqlitePool>, id: i64) -> Page {
    match db::delete_label(pool, user.id, id).await {
        Ok(true) => Page::Flash(Flash::success(
            Redirect::to(uri!(crate::routes::notes::index)),
            "Label deleted successfully",
        )),
        Ok(false) => Page::Status(Status::NotFound),
        Err(e) => Page::Status(server_error(e)),
    }
}

#[get("/labels/<_id>/delete")]
pub async fn delete_get(_user: CurrentUser, _id: i64) -> Redirect {
    Redirect::to(uri!(crate::routes::notes::index))
}
