//! End-to-end handler tests against an in-memory database.

use rocket::http::{ContentType, Status};
use rocket::local::blocking::{Client, LocalResponse};

fn client() -> Client {
    let figment = rocket::Config::figment().merge(("database_url", "sqlite::memory:"));
    Client::tracked(noteapp::custom(figment)).expect("valid rocket instance")
}

fn register<'c>(client: &'c Client, username: &str) -> LocalResponse<'c> {
    client
        .post("/register")
        .header(ContentType::Form)
        .body(format!(
            "username={username}&password=Str0ngPass%21&password_confirm=Str0ngPass%21"
        ))
        .dispatch()
}

fn login<'c>(client: &'c Client, username: &str, password: &str) -> LocalResponse<'c> {
    client
        .post("/login")
        .header(ContentType::Form)
        .body(format!("username={username}&password={password}"))
        .dispatch()
}

fn logout(client: &Client) {
    let resp = client.post("/logout").dispatch();
    assert_eq!(resp.status(), Status::SeeOther);
}

fn create_note(client: &Client, body: &str) -> Status {
    client
        .post("/notes/create")
        .header(ContentType::Form)
        .body(body.to_string())
        .dispatch()
        .status()
}

fn page(client: &Client, path: &str) -> String {
    let resp = client.get(path).dispatch();
    assert_eq!(resp.status(), Status::Ok, "GET {path}");
    resp.into_string().expect("text body")
}

/// Asserts that `needle` appears inside the given listing section
/// (`"pinned"` or `"notes"`).
fn assert_in_section(body: &str, section: &str, needle: &str) {
    let pinned_at = body.find("id=\"pinned\"").expect("pinned section");
    let notes_at = body.find("id=\"notes\"").expect("notes section");
    let found = body.find(needle).unwrap_or_else(|| panic!("{needle} not in page"));
    match section {
        "pinned" => assert!(
            found > pinned_at && found < notes_at,
            "{needle} not inside the pinned section"
        ),
        "notes" => assert!(found > notes_at, "{needle} not inside the notes section"),
        _ => unreachable!(),
    }
}

// Authentication //////////////////////////////////////////////////////////////////////////////////

#[test]
fn unauthenticated_requests_redirect_to_login() {
    let client = client();
    for path in ["/", "/notes/create", "/labels/create", "/notes/1/edit"] {
        let resp = client.get(path).dispatch();
        assert_eq!(resp.status(), Status::SeeOther, "GET {path}");
        assert_eq!(resp.headers().get_one("Location"), Some("/login"));
    }
    let resp = client.post("/notes/1/delete").dispatch();
    assert_eq!(resp.status(), Status::SeeOther);
    assert_eq!(resp.headers().get_one("Location"), Some("/login"));
}

#[test]
fn register_establishes_session_and_empty_list() {
    let client = client();
    let resp = register(&client, "alice");
    assert_eq!(resp.status(), Status::SeeOther);
    assert_eq!(resp.headers().get_one("Location"), Some("/"));

    let body = page(&client, "/");
    assert!(body.contains("alice"));
    assert!(body.contains("No pinned notes."));
    assert!(body.contains("No notes yet."));
}

#[test]
fn duplicate_username_redisplays_register_form() {
    let client = client();
    register(&client, "alice");
    logout(&client);

    let resp = register(&client, "alice");
    assert_eq!(resp.status(), Status::Ok);
    let body = resp.into_string().unwrap();
    assert!(body.contains("username already taken"));

    // No session was established for the rejected registration.
    let resp = client.get("/").dispatch();
    assert_eq!(resp.status(), Status::SeeOther);
}

#[test]
fn rejected_registrations_leave_no_session() {
    let client = client();

    // Mismatched confirmation.
    let resp = client
        .post("/register")
        .header(ContentType::Form)
        .body("username=alice&password=Str0ngPass%21&password_confirm=Different9%21")
        .dispatch();
    assert_eq!(resp.status(), Status::Ok);

    // Too-short password.
    let resp = client
        .post("/register")
        .header(ContentType::Form)
        .body("username=alice&password=short&password_confirm=short")
        .dispatch();
    assert_eq!(resp.status(), Status::Ok);

    let resp = client.get("/").dispatch();
    assert_eq!(resp.status(), Status::SeeOther);
}

#[test]
fn login_verifies_credentials() {
    let client = client();
    register(&client, "alice");
    logout(&client);

    let resp = login(&client, "alice", "wrong-password");
    assert_eq!(resp.status(), Status::Ok);
    assert!(resp.into_string().unwrap().contains("Invalid username or password."));

    let resp = login(&client, "nobody", "Str0ngPass%21");
    assert_eq!(resp.status(), Status::Ok);

    let resp = login(&client, "alice", "Str0ngPass%21");
    assert_eq!(resp.status(), Status::SeeOther);
    assert_eq!(resp.headers().get_one("Location"), Some("/"));
    assert_eq!(client.get("/").dispatch().status(), Status::Ok);
}

// Notes ///////////////////////////////////////////////////////////////////////////////////////////

#[test]
fn created_note_lists_under_notes() {
    let client = client();
    register(&client, "alice");

    let status = create_note(&client, "title=Groceries&content=milk%2C%20eggs");
    assert_eq!(status, Status::SeeOther);

    let body = page(&client, "/");
    assert!(body.contains("Note created successfully"));
    assert_in_section(&body, "notes", "Groceries");
}

#[test]
fn invalid_note_submission_writes_nothing() {
    let client = client();
    register(&client, "alice");

    let resp = client
        .post("/notes/create")
        .header(ContentType::Form)
        .body("title=&content=milk%2C%20eggs")
        .dispatch();
    assert_eq!(resp.status(), Status::Ok);
    let body = resp.into_string().unwrap();
    // The rejected submission is redisplayed with its values intact.
    assert!(body.contains("milk, eggs"));
    assert!(body.contains("title"));

    let body = page(&client, "/");
    assert!(!body.contains("milk, eggs"));
    assert!(body.contains("No notes yet."));
}

#[test]
fn pinning_moves_note_to_pinned_section() {
    let client = client();
    register(&client, "alice");
    create_note(&client, "title=Groceries&content=milk%2C%20eggs");

    let resp = client
        .post("/notes/1/edit")
        .header(ContentType::Form)
        .body("title=Groceries&content=milk%2C%20eggs&pinned=on")
        .dispatch();
    assert_eq!(resp.status(), Status::SeeOther);

    let body = page(&client, "/");
    assert_in_section(&body, "pinned", "Groceries");
    assert!(body.contains("No notes yet."));
}

#[test]
fn listing_partitions_pinned_and_unpinned() {
    let client = client();
    register(&client, "alice");
    create_note(&client, "title=plain-one&content=x");
    create_note(&client, "title=plain-two&content=x");
    create_note(&client, "title=starred-one&content=x&pinned=on");
    create_note(&client, "title=starred-two&content=x&pinned=on");

    let body = page(&client, "/");
    assert_in_section(&body, "pinned", "starred-one");
    assert_in_section(&body, "pinned", "starred-two");
    assert_in_section(&body, "notes", "plain-one");
    assert_in_section(&body, "notes", "plain-two");
}

#[test]
fn edit_form_is_prepopulated() {
    let client = client();
    register(&client, "alice");
    create_note(&client, "title=Groceries&content=milk%2C%20eggs");

    let body = page(&client, "/notes/1/edit");
    assert!(body.contains("Groceries"));
    assert!(body.contains("milk, eggs"));
}

#[test]
fn delete_removes_note_and_get_is_a_noop() {
    let client = client();
    register(&client, "alice");
    create_note(&client, "title=Groceries&content=x");

    // GET never mutates.
    let resp = client.get("/notes/1/delete").dispatch();
    assert_eq!(resp.status(), Status::SeeOther);
    assert!(page(&client, "/").contains("Groceries"));

    let resp = client.post("/notes/1/delete").dispatch();
    assert_eq!(resp.status(), Status::SeeOther);
    let body = page(&client, "/");
    assert!(!body.contains("Groceries"));
    assert!(body.contains("Note deleted successfully"));
}

#[test]
fn cross_user_note_access_is_not_found() {
    let client = client();
    register(&client, "alice");
    create_note(&client, "title=Groceries&content=milk%2C%20eggs");
    logout(&client);
    register(&client, "bob");

    assert_eq!(client.get("/notes/1/edit").dispatch().status(), Status::NotFound);
    let resp = client
        .post("/notes/1/edit")
        .header(ContentType::Form)
        .body("title=hijacked&content=hijacked")
        .dispatch();
    assert_eq!(resp.status(), Status::NotFound);
    assert_eq!(client.post("/notes/1/delete").dispatch().status(), Status::NotFound);
    assert!(!page(&client, "/").contains("Groceries"));

    // Alice's note is untouched.
    logout(&client);
    login(&client, "alice", "Str0ngPass%21");
    let body = page(&client, "/notes/1/edit");
    assert!(body.contains("Groceries"));
    assert!(!body.contains("hijacked"));
}

// Labels //////////////////////////////////////////////////////////////////////////////////////////

fn create_label(client: &Client, title: &str, color: &str) -> Status {
    client
        .post("/labels/create")
        .header(ContentType::Form)
        .body(format!("title={title}&color={color}"))
        .dispatch()
        .status()
}

#[test]
fn label_crud_and_filtered_listing() {
    let client = client();
    register(&client, "alice");
    assert_eq!(create_label(&client, "work", "%23ff0000"), Status::SeeOther);

    create_note(&client, "title=labeled-note&content=x&label=1");
    create_note(&client, "title=plain-note&content=x");

    let body = page(&client, "/");
    assert!(body.contains("labeled-note"));
    assert!(body.contains("plain-note"));
    assert!(body.contains("work"));

    let body = page(&client, "/label/1");
    assert!(body.contains("labeled-note"));
    assert!(!body.contains("plain-note"));

    let resp = client
        .post("/labels/1/edit")
        .header(ContentType::Form)
        .body("title=errands&color=%2300ff00")
        .dispatch();
    assert_eq!(resp.status(), Status::SeeOther);
    assert!(page(&client, "/").contains("errands"));

    assert_eq!(client.get("/label/999").dispatch().status(), Status::NotFound);
}

#[test]
fn invalid_color_redisplays_label_form() {
    let client = client();
    register(&client, "alice");

    let resp = client
        .post("/labels/create")
        .header(ContentType::Form)
        .body("title=work&color=red")
        .dispatch();
    assert_eq!(resp.status(), Status::Ok);
    assert!(resp.into_string().unwrap().contains("expected a color like"));
    assert!(!page(&client, "/").contains("work"));
}

#[test]
fn deleting_a_referenced_label_unlabels_notes() {
    let client = client();
    register(&client, "alice");
    create_label(&client, "work", "%23ff0000");
    create_note(&client, "title=labeled-note&content=x&label=1");

    let resp = client.post("/labels/1/delete").dispatch();
    assert_eq!(resp.status(), Status::SeeOther);

    // The note survives, unlabeled; the filter route is gone.
    let body = page(&client, "/");
    assert!(body.contains("labeled-note"));
    assert!(!body.contains("work"));
    assert_eq!(client.get("/label/1").dispatch().status(), Status::NotFound);
    assert_eq!(client.get("/notes/1/edit").dispatch().status(), Status::Ok);
}

#[test]
fn cross_user_label_access_is_not_found() {
    let client = client();
    register(&client, "alice");
    create_label(&client, "work", "%23ff0000");
    logout(&client);
    register(&client, "bob");

    assert_eq!(client.get("/labels/1/edit").dispatch().status(), Status::NotFound);
    assert_eq!(client.post("/labels/1/delete").dispatch().status(), Status::NotFound);
    assert_eq!(client.get("/label/1").dispatch().status(), Status::NotFound);
}

#[test]
fn foreign_label_id_is_a_validation_error() {
    let client = client();
    register(&client, "alice");
    create_label(&client, "work", "%23ff0000");
    logout(&client);
    register(&client, "bob");

    let resp = client
        .post("/notes/create")
        .header(ContentType::Form)
        .body("title=sneaky&content=x&label=1")
        .dispatch();
    assert_eq!(resp.status(), Status::Ok);
    assert!(resp.into_string().unwrap().contains("unknown label"));
    assert!(page(&client, "/").contains("No notes yet."));
}
