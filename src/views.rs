//! Minimal self-contained HTML shells for the form routes. Template engines
//! and static assets live outside this service; these pages carry only the
//! information the pipeline needs: forms posting to the real routes, the
//! note listing, and a flash banner slot.

use crate::db::models::Note;

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

// HTML forms only speak GET/POST; sendAs() lifts a form submission to
// PUT/DELETE and follows the redirect the handler answers with.
const METHOD_SCRIPT: &str = r#"<script>
async function sendAs(method, form) {
  const res = await fetch(form.action, { method, body: new FormData(form) });
  window.location = res.redirected ? res.url : form.action;
  return false;
}
</script>"#;

fn layout(title: &str, flash: Option<&str>, body: &str) -> String {
    let banner = match flash {
        Some(msg) => format!("<p class=\"flash\">{}</p>", escape(msg)),
        None => String::new(),
    };

    format!(
        "<!doctype html>\n<html><head><meta charset=\"utf-8\"><title>{} — notekeeper</title>{}</head>\n\
         <body><nav><a href=\"/home\">home</a> <a href=\"/notes\">notes</a> \
         <a href=\"/notes/new\">new note</a> \
         <form method=\"post\" action=\"/logout\" style=\"display:inline\"><button>logout</button></form></nav>\n\
         {}{}</body></html>",
        escape(title),
        METHOD_SCRIPT,
        banner,
        body
    )
}

pub fn home() -> String {
    layout(
        "Welcome",
        None,
        "<h1>notekeeper</h1>\
         <p>Keep notes, attach files.</p>\
         <p><a href=\"/register\">Register</a> or <a href=\"/login\">log in</a>.</p>",
    )
}

pub fn register_form(flash: Option<&str>) -> String {
    layout(
        "Register",
        flash,
        "<h1>Register</h1>\
         <form method=\"post\" action=\"/register\">\
         <label>Username <input name=\"username\" required></label><br>\
         <label>Email <input name=\"email\" type=\"email\" required></label><br>\
         <label>Password <input name=\"password\" type=\"password\" required></label><br>\
         <button>Create account</button></form>",
    )
}

pub fn login_form(flash: Option<&str>) -> String {
    layout(
        "Log in",
        flash,
        "<h1>Log in</h1>\
         <form method=\"post\" action=\"/login\">\
         <label>Email <input name=\"email\" type=\"email\" required></label><br>\
         <label>Password <input name=\"password\" type=\"password\" required></label><br>\
         <button>Log in</button></form>",
    )
}

pub fn new_note_form() -> String {
    layout(
        "New note",
        None,
        "<h1>New note</h1>\
         <form method=\"post\" action=\"/notes\" enctype=\"multipart/form-data\">\
         <label>Title <input name=\"title\" required></label><br>\
         <label>Content <textarea name=\"content\" required></textarea></label><br>\
         <label>Files <input name=\"files\" type=\"file\" multiple></label><br>\
         <button>Create</button></form>",
    )
}

fn attachment_list(note: &Note) -> String {
    if note.file_urls.0.is_empty() {
        return String::new();
    }

    let items: String = note
        .attachments()
        .map(|(url, name)| {
            format!(
                "<li>{}\
                 <form method=\"post\" action=\"/download\" style=\"display:inline\">\
                 <input type=\"hidden\" name=\"file_url\" value=\"{}\">\
                 <button>download</button></form></li>",
                escape(name),
                escape(url)
            )
        })
        .collect();

    format!("<h2>Attachments</h2><ul>{}</ul>", items)
}

pub fn note_list(notes: &[Note]) -> String {
    let items: String = notes
        .iter()
        .map(|note| {
            format!(
                "<li><a href=\"/notes/{id}\">{title}</a> \
                 <a href=\"/notes/{id}/edit\">edit</a> \
                 <a href=\"/notes/{id}/delete\">delete</a></li>",
                id = escape(&note.id),
                title = escape(&note.title),
            )
        })
        .collect();

    layout(
        "Your notes",
        None,
        &format!("<h1>Your notes</h1><ul>{}</ul>", items),
    )
}

pub fn note_detail(note: &Note) -> String {
    layout(
        &note.title,
        None,
        &format!(
            "<h1>{}</h1><p>{}</p>{}",
            escape(&note.title),
            escape(&note.content),
            attachment_list(note)
        ),
    )
}

pub fn edit_note_form(note: &Note) -> String {
    layout(
        "Edit note",
        None,
        &format!(
            "<h1>Edit note</h1>\
             <form method=\"post\" action=\"/notes/{id}\" enctype=\"multipart/form-data\" \
             onsubmit=\"return sendAs('PUT', this)\">\
             <label>Title <input name=\"title\" value=\"{title}\" required></label><br>\
             <label>Content <textarea name=\"content\" required>{content}</textarea></label><br>\
             <label>Add files <input name=\"files\" type=\"file\" multiple></label><br>\
             <button>Save</button></form>{attachments}",
            id = escape(&note.id),
            title = escape(&note.title),
            content = escape(&note.content),
            attachments = attachment_list(note),
        ),
    )
}

pub fn delete_confirm(note: &Note) -> String {
    layout(
        "Delete note",
        None,
        &format!(
            "<h1>Delete \"{title}\"?</h1>\
             <form method=\"post\" action=\"/notes/{id}\" \
             onsubmit=\"return sendAs('DELETE', this)\">\
             <button>Delete permanently</button></form>\
             <p><a href=\"/notes/{id}\">Keep it</a></p>",
            id = escape(&note.id),
            title = escape(&note.title),
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::types::Json;

    fn sample_note() -> Note {
        Note {
            id: "n1".to_string(),
            owner_id: "u1".to_string(),
            title: "Groceries <script>".to_string(),
            content: "milk & eggs".to_string(),
            file_urls: Json(vec!["memory://notes/1.png".to_string()]),
            file_names: Json(vec!["receipt.png".to_string()]),
            created_at: 0,
        }
    }

    #[test]
    fn test_user_content_is_escaped() {
        let html = note_detail(&sample_note());
        assert!(!html.contains("<script>Groceries"));
        assert!(html.contains("Groceries &lt;script&gt;"));
        assert!(html.contains("milk &amp; eggs"));
    }

    #[test]
    fn test_detail_lists_attachments_by_original_name() {
        let html = note_detail(&sample_note());
        assert!(html.contains("receipt.png"));
        assert!(html.contains("memory://notes/1.png"));
        assert!(html.contains("action=\"/download\""));
    }
}
