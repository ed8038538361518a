#[rocket::launch]
fn rocket() -> _ {
    noteapp::rocket()
}
