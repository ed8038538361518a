//! Form validators. Each form is an independent `FromForm` type; failed
//! submissions are turned into a serializable view (submitted values plus
//! per-field messages) so the originating template can redisplay them.

use rocket::form::{self, Context, Error};
use serde::Serialize;

use crate::structs::{Label, Note};

#[derive(FromForm)]
pub struct NoteForm<'r> {
    #[field(validate = len(1..=128))]
    pub title: &'r str,
    #[field(validate = len(1..))]
    pub content: &'r str,
    #[field(default = false)]
    pub pinned: bool,
    // Empty select option parses as None; ownership is checked in the handler.
    pub label: Option<i64>,
}

#[derive(FromForm)]
pub struct LabelForm<'r> {
    #[field(validate = len(1..=64))]
    pub title: &'r str,
    #[field(validate = hex_color())]
    pub color: &'r str,
}

#[derive(FromForm)]
pub struct RegisterForm<'r> {
    #[field(validate = len(3..=32))]
    pub username: &'r str,
    #[field(validate = len(8..))]
    pub password: &'r str,
    #[field(validate = eq(self.password))]
    pub password_confirm: &'r str,
}

#[derive(FromForm)]
pub struct LoginForm<'r> {
    pub username: &'r str,
    pub password: &'r str,
}

fn hex_color<'v>(value: &str) -> form::Result<'v, ()> {
    let digits = value.strip_prefix('#').unwrap_or("");
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        Err(Error::validation("expected a color like #1fa3b2"))?;
    }
    Ok(())
}

#[derive(Serialize, Debug, Clone)]
pub struct FieldError {
    pub field: String,
    pub msg: String,
}

fn field_errors(ctx: &Context<'_>) -> Vec<FieldError> {
    ctx.errors()
        .map(|e| FieldError {
            field: e.name.as_ref().map(|n| n.to_string()).unwrap_or_default(),
            msg: e.to_string(),
        })
        .collect()
}

/// Redisplay state for the note form: either a fresh/bound form (GET) or
/// the rejected submission (POST).
#[derive(Serialize, Debug, Clone)]
pub struct NoteFormView {
    pub title: String,
    pub content: String,
    pub pinned: bool,
    pub label: Option<i64>,
    pub errors: Vec<FieldError>,
}

impl NoteFormView {
    pub fn empty() -> Self {
        NoteFormView {
            title: String::new(),
            content: String::new(),
            pinned: false,
            label: None,
            errors: Vec::new(),
        }
    }

    pub fn from_note(note: &Note) -> Self {
        NoteFormView {
            title: note.title.clone(),
            content: note.content.clone(),
            pinned: note.pinned,
            label: note.label_id,
            errors: Vec::new(),
        }
    }

    pub fn from_context(ctx: &Context<'_>) -> Self {
        NoteFormView {
            title: ctx.field_value("title").unwrap_or_default().to_string(),
            content: ctx.field_value("content").unwrap_or_default().to_string(),
            pinned: matches!(ctx.field_value("pinned"), Some("on" | "true" | "yes")),
            label: ctx.field_value("label").and_then(|v| v.parse().ok()),
            errors: field_errors(ctx),
        }
    }

    pub fn with_error(mut self, field: &str, msg: &str) -> Self {
        self.errors.push(FieldError {
            field: field.to_string(),
            msg: msg.to_string(),
        });
        self
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct LabelFormView {
    pub title: String,
    pub color: String,
    pub errors: Vec<FieldError>,
}

impl LabelFormView {
    pub fn empty() -> Self {
        LabelFormView {
            title: String::new(),
            color: "#aaccff".to_string(),
            errors: Vec::new(),
        }
    }

    pub fn from_label(label: &Label) -> Self {
        LabelFormView {
            title: label.title.clone(),
            color: label.color.clone(),
            errors: Vec::new(),
        }
    }

    pub fn from_context(ctx: &Context<'_>) -> Self {
        LabelFormView {
            title: ctx.field_value("title").unwrap_or_default().to_string(),
            color: ctx.field_value("color").unwrap_or_default().to_string(),
            errors: field_errors(ctx),
        }
    }
}

/// Passwords are never echoed back; only the username survives a rejected
/// registration.
#[derive(Serialize, Debug, Clone)]
pub struct RegisterFormView {
    pub username: String,
    pub errors: Vec<FieldError>,
}

impl RegisterFormView {
    pub fn empty() -> Self {
        RegisterFormView {
            username: String::new(),
            errors: Vec::new(),
        }
    }

    pub fn from_context(ctx: &Context<'_>) -> Self {
        RegisterFormView {
            username: ctx.field_value("username").unwrap_or_default().to_string(),
            errors: field_errors(ctx),
        }
    }

    pub fn with_error(mut self, field: &str, msg: &str) -> Self {
        self.errors.push(FieldError {
            field: field.to_string(),
            msg: msg.to_string(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::hex_color;

    #[test]
    fn hex_color_accepts_six_digit_hex() {
        assert!(hex_color("#1fa3b2").is_ok());
        assert!(hex_color("#FFFFFF").is_ok());
    }

    #[test]
    fn hex_color_rejects_malformed_values() {
        assert!(hex_color("1fa3b2").is_err());
        assert!(hex_color("#fff").is_err());
        assert!(hex_color("#1fa3bz").is_err());
        assert!(hex_color("").is_err());
    }
}
