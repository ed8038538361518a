use rocket::form::{Contextual, Form};
use rocket::http::Status;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::{context, Template};
use sqlx::sqlite::SqlitePool;

use super::{server_error, FlashView, Page};
use crate::auth::CurrentUser;
use crate::db;
use crate::forms::{NoteForm, NoteFormView};
use crate::structs::Note;

// Routes //////////////////////////////////////////////////////////////////////////////////////////

#[get("/")]
pub async fn index(
    user: CurrentUser,
    pool: &State<SqlitePool>,
    flash: Option<FlashMessage<'_>>,
) -> Result<Template, Status> {
    render_index(&user, pool, None, flash).await
}

#[get("/label/<label_id>")]
pub async fn index_by_label(
    user: CurrentUser,
    pool: &State<SqlitePool>,
    label_id: i64,
    flash: Option<FlashMessage<'_>>,
) -> Result<Template, Status> {
    render_index(&user, pool, Some(label_id), flash).await
}

/// The listing page: the caller's notes split into pinned and unpinned,
/// optionally restricted to one of the caller's labels.
async fn render_index(
    user: &CurrentUser,
    pool: &SqlitePool,
    label_id: Option<i64>,
    flash: Option<FlashMessage<'_>>,
) -> Result<Template, Status> {
    // The label lookup is owner-scoped like every other lookup here; a
    // label id belonging to someone else is indistinguishable from a
    // missing one.
    let current_label = match label_id {
        Some(id) => Some(
            db::get_label(pool, user.id, id)
                .await
                .map_err(server_error)?
                .ok_or(Status::NotFound)?,
        ),
        None => None,
    };

    let all = db::list_notes(pool, user.id, label_id)
        .await
        .map_err(server_error)?;
    let labels = db::list_labels(pool, user.id)
        .await
        .map_err(server_error)?;

    let (pinned, notes): (Vec<Note>, Vec<Note>) = all.into_iter().partition(|n| n.pinned);

    Ok(Template::render(
        "index",
        context! {
            username: &user.username,
            pinned: pinned,
            notes: notes,
            labels: labels,
            current_label: current_label,
            flash: FlashView::from_message(flash),
        },
    ))
}

#[get("/notes/create")]
pub async fn create_page(
    user: CurrentUser,
    pool: &State<SqlitePool>,
) -> Result<Template, Status> {
    let labels = db::list_labels(pool, user.id)
        .await
        .map_err(server_error)?;
    Ok(Template::render(
        "notes/create",
        context! { username: &user.username, form: NoteFormView::empty(), labels: labels },
    ))
}

#[post("/notes/create", data = "<form>")]
pub async fn create<'r>(
    user: CurrentUser,
    pool: &State<SqlitePool>,
    form: Form<Contextual<'r, NoteForm<'r>>>,
) -> Page {
    let labels = match db::list_labels(pool, user.id).await {
        Ok(labels) => labels,
        Err(e) => return Page::Status(server_error(e)),
    };

    let redisplay = |view: NoteFormView| {
        Page::Template(Template::render(
            "notes/create",
            context! { username: &user.username, form: view, labels: &labels },
        ))
    };

    let Some(ref note) = form.value else {
        return redisplay(NoteFormView::from_context(&form.context));
    };

    // The select is rendered from the caller's labels, but the submitted id
    // still has to be checked against them.
    if let Some(label_id) = note.label {
        if !labels.iter().any(|l| l.id == label_id) {
            return redisplay(
                NoteFormView::from_context(&form.context).with_error("label", "unknown label"),
            );
        }
    }

    match db::create_note(pool, user.id, note.title, note.content, note.pinned, note.label).await {
        Ok(_) => Page::Flash(Flash::success(
            Redirect::to(uri!(index)),
            "Note created successfully",
        )),
        Err(e) => Page::Status(server_error(e)),
    }
}

#[get("/notes/<id>/edit")]
pub async fn edit_page(
    user: CurrentUser,
    pool: &State<SqlitePool>,
    id: i64,
) -> Result<Template, Status> {
    let note = db::get_note(pool, user.id, id)
        .await
        .map_err(server_error)?
        .ok_or(Status::NotFound)?;
    let labels = db::list_labels(pool, user.id)
        .await
        .map_err(server_error)?;
    Ok(Template::render(
        "notes/edit",
        context! { username: &user.username, id: id, form: NoteFormView::from_note(&note), labels: labels },
    ))
}

#[post("/notes/<id>/edit", data = "<form>")]
pub async fn edit<'r>(
    user: CurrentUser,
    pool: &State<SqlitePool>,
    id: i64,
    form: Form<Contextual<'r, NoteForm<'r>>>,
) -> Page {
    let labels = match db::list_labels(pool, user.id).await {
        Ok(labels) => labels,
        Err(e) => return Page::Status(server_error(e)),
    };

    let redisplay = |view: NoteFormView| {
        Page::Template(Template::render(
            "notes/edit",
            context! { username: &user.username, id: id, form: view, labels: &labels },
        ))
    };

    let Some(ref note) = form.value else {
        return redisplay(NoteFormView::from_context(&form.context));
    };

    if let Some(label_id) = note.label {
        if !labels.iter().any(|l| l.id == label_id) {
            return redisplay(
                NoteFormView::from_context(&form.context).with_error("label", "unknown label"),
            );
        }
    }

    match db::update_note(pool, user.id, id, note.title, note.content, note.pinned, note.label)
        .await
    {
        Ok(true) => Page::Flash(Flash::success(
            Redirect::to(uri!(index)),
            "Note edited successfully",
        )),
        Ok(false) => Page::Status(Status::NotFound),
        Err(e) => Page::Status(server_error(e)),
    }
}

#[post("/notes/<id>/delete")]
pub async fn delete(user: CurrentUser, pool: &State<SqlitePool>, id: i64) -> Page {
    match db::delete_note(pool, user.id, id).await {
        Ok(true) => Page::Flash(Flash::success(
            Redirect::to(uri!(index)),
            "Note deleted successfully",
        )),
        Ok(false) => Page::Status(Status::NotFound),
        Err(e) => Page::Status(server_error(e)),
    }
}

// A non-POST delete performs no mutation.
#[get("/notes/<_id>/delete")]
pub async fn delete_get(_user: CurrentUser, _id: i64) -> Redirect {
    Redirect::to(uri!(index))
}
