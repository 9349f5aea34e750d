use axum::{
    extract::{Multipart, Path, State},
    response::{Html, Redirect},
    Extension, Form,
};
use serde::Deserialize;

use crate::api::middleware::Identity;
use crate::api::state::AppState;
use crate::db::models::Note;
use crate::db::NoteRepository;
use crate::error::AppError;
use crate::storage::{StoredFile, UploadFile};
use crate::views;

/// The title/content/files triple carried by the multipart note forms.
struct NoteForm {
    title: String,
    content: String,
    files: Vec<UploadFile>,
}

async fn read_note_form(mut multipart: Multipart) -> Result<NoteForm, AppError> {
    let mut title = String::new();
    let mut content = String::new();
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {}", e)))?
    {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("title") => {
                title = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("unreadable title field: {}", e)))?;
            }
            Some("content") => {
                content = field.text().await.map_err(|e| {
                    AppError::Validation(format!("unreadable content field: {}", e))
                })?;
            }
            Some("files") => {
                let original_name = field.file_name().map(|n| n.to_string()).unwrap_or_default();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("unreadable file field: {}", e)))?;

                // Browsers send an empty part when no file was chosen
                if original_name.is_empty() && bytes.is_empty() {
                    continue;
                }

                files.push(UploadFile {
                    original_name,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {} // ignore unknown fields
        }
    }

    Ok(NoteForm {
        title,
        content,
        files,
    })
}

fn into_columns(stored: Vec<StoredFile>) -> (Vec<String>, Vec<String>) {
    stored
        .into_iter()
        .map(|f| (f.url, f.original_name))
        .unzip()
}

/// Fetch-or-404 through the ownership guard; a foreign note is
/// indistinguishable from a missing one.
async fn owned_note(state: &AppState, id: &str, identity: &Identity) -> Result<Note, AppError> {
    NoteRepository::get_owned(&state.db, id, &identity.user_id)
        .await?
        .ok_or(AppError::NotFound)
}

/// GET /notes/new (requires auth)
pub async fn new_note_form() -> Html<String> {
    Html(views::new_note_form())
}

/// POST /notes (requires auth; multipart, up to 5 files)
pub async fn create_note(
    State(state): State<AppState>,
    identity: Option<Extension<Identity>>,
    multipart: Multipart,
) -> Result<Redirect, AppError> {
    let form = read_note_form(multipart).await?;

    if form.title.trim().is_empty() || form.content.trim().is_empty() {
        return Err(AppError::Validation(
            "title and content are required".to_string(),
        ));
    }

    // The middleware already gated this route; check again anyway
    let Extension(identity) = identity.ok_or(AppError::Unauthenticated)?;

    let stored = state.media.upload(form.files).await?;
    let (file_urls, file_names) = into_columns(stored);

    let note = NoteRepository::create(
        &state.db,
        &identity.user_id,
        &form.title,
        &form.content,
        file_urls,
        file_names,
    )
    .await?;

    tracing::info!(note_id = %note.id, owner_id = %note.owner_id, "note created");
    Ok(Redirect::to("/notes"))
}

/// GET /notes (requires auth)
pub async fn list_notes(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Html<String>, AppError> {
    let notes = NoteRepository::list_for_owner(&state.db, &identity.user_id).await?;
    Ok(Html(views::note_list(&notes)))
}

/// GET /notes/:id (requires auth + ownership)
pub async fn show_note(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let note = owned_note(&state, &id, &identity).await?;
    Ok(Html(views::note_detail(&note)))
}

/// GET /notes/:id/edit (requires auth + ownership)
pub async fn edit_note_form(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let note = owned_note(&state, &id, &identity).await?;
    Ok(Html(views::edit_note_form(&note)))
}

/// PUT /notes/:id (requires auth + ownership; multipart, files appended)
pub async fn update_note(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Redirect, AppError> {
    let note = owned_note(&state, &id, &identity).await?;

    let form = read_note_form(multipart).await?;
    if form.title.trim().is_empty() || form.content.trim().is_empty() {
        return Err(AppError::Validation(
            "title and content are required".to_string(),
        ));
    }

    // Attachments accumulate: new uploads extend both parallel arrays,
    // existing entries are never replaced or dropped
    let mut file_urls = note.file_urls.0;
    let mut file_names = note.file_names.0;
    if !form.files.is_empty() {
        let stored = state.media.upload(form.files).await?;
        for file in stored {
            file_urls.push(file.url);
            file_names.push(file.original_name);
        }
    }

    NoteRepository::update_owned(
        &state.db,
        &id,
        &identity.user_id,
        &form.title,
        &form.content,
        file_urls,
        file_names,
    )
    .await?
    .ok_or(AppError::NotFound)?;

    tracing::info!(note_id = %id, "note updated");
    Ok(Redirect::to(&format!("/notes/{}", id)))
}

/// GET /notes/:id/delete (requires auth + ownership)
pub async fn confirm_delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let note = owned_note(&state, &id, &identity).await?;
    Ok(Html(views::delete_confirm(&note)))
}

/// DELETE /notes/:id (requires auth + ownership)
///
/// Removes only the row; blobs already uploaded to the media service are
/// left in place.
pub async fn delete_note(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    owned_note(&state, &id, &identity).await?;

    if !NoteRepository::delete_owned(&state.db, &id, &identity.user_id).await? {
        return Err(AppError::NotFound);
    }

    tracing::info!(note_id = %id, "note deleted");
    Ok(Redirect::to("/notes"))
}

#[derive(Debug, Deserialize)]
pub struct DownloadForm {
    pub file_url: String,
}

/// POST /download (requires auth)
///
/// Answers with a redirect to a time-scoped signed URL. The URL is not
/// checked against the caller's own notes; any authenticated user can
/// request a signature for any stored file reference.
pub async fn download(
    State(state): State<AppState>,
    Form(form): Form<DownloadForm>,
) -> Redirect {
    Redirect::to(&state.media.sign_download(&form.file_url))
}
