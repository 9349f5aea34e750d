use sqlx::types::Json;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;
use crate::db::models::Note;
use crate::error::AppError;

pub struct NoteRepository;

impl NoteRepository {
    pub async fn create(
        pool: &Pool<Sqlite>,
        owner_id: &str,
        title: &str,
        content: &str,
        file_urls: Vec<String>,
        file_names: Vec<String>,
    ) -> Result<Note, AppError> {
        debug_assert_eq!(file_urls.len(), file_names.len());

        let id = Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().timestamp();

        let note = sqlx::query_as::<_, Note>(
            r#"
INSERT INTO notes (id, owner_id, title, content, file_urls, file_names, created_at)
VALUES (?, ?, ?, ?, ?, ?, ?)
RETURNING *
            "#,
        )
        .bind(&id)
        .bind(owner_id)
        .bind(title)
        .bind(content)
        .bind(Json(file_urls))
        .bind(Json(file_names))
        .bind(created_at)
        .fetch_one(pool)
        .await?;

        Ok(note)
    }

    /// All notes belonging to `owner_id`, in store-native order. Ordering is
    /// unspecified at the API level but stable for a single process.
    pub async fn list_for_owner(
        pool: &Pool<Sqlite>,
        owner_id: &str,
    ) -> Result<Vec<Note>, AppError> {
        let notes = sqlx::query_as::<_, Note>(
            "SELECT * FROM notes WHERE owner_id = ?"
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(notes)
    }

    /// The single ownership guard: a note is only ever fetched together with
    /// its owner. A miss means "missing or not yours" and callers map it to
    /// a plain not-found.
    pub async fn get_owned(
        pool: &Pool<Sqlite>,
        id: &str,
        owner_id: &str,
    ) -> Result<Option<Note>, AppError> {
        let note = sqlx::query_as::<_, Note>(
            "SELECT * FROM notes WHERE id = ? AND owner_id = ?"
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        Ok(note)
    }

    /// Whole-field replacement of title/content plus the full attachment
    /// arrays. The owner filter is repeated in the WHERE clause so the write
    /// itself cannot cross an ownership boundary.
    pub async fn update_owned(
        pool: &Pool<Sqlite>,
        id: &str,
        owner_id: &str,
        title: &str,
        content: &str,
        file_urls: Vec<String>,
        file_names: Vec<String>,
    ) -> Result<Option<Note>, AppError> {
        debug_assert_eq!(file_urls.len(), file_names.len());

        let note = sqlx::query_as::<_, Note>(
            r#"
UPDATE notes
SET title = ?, content = ?, file_urls = ?, file_names = ?
WHERE id = ? AND owner_id = ?
RETURNING *
            "#,
        )
        .bind(title)
        .bind(content)
        .bind(Json(file_urls))
        .bind(Json(file_names))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        Ok(note)
    }

    /// Returns whether a row was actually removed.
    pub async fn delete_owned(
        pool: &Pool<Sqlite>,
        id: &str,
        owner_id: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;
    use crate::db::UserRepository;

    async fn seed_user(pool: &Pool<Sqlite>, email: &str) -> String {
        UserRepository::create(pool, "user", email, "$argon2$fake")
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_create_keeps_attachment_arrays_aligned() {
        let pool = test_pool().await;
        let owner = seed_user(&pool, "a@x.com").await;

        let note = NoteRepository::create(
            &pool,
            &owner,
            "T1",
            "C1",
            vec!["u1.png".into(), "u2.pdf".into()],
            vec!["one.png".into(), "two.pdf".into()],
        )
        .await
        .unwrap();

        assert_eq!(note.file_urls.0.len(), note.file_names.0.len());
        assert_eq!(
            note.attachments().collect::<Vec<_>>(),
            vec![("u1.png", "one.png"), ("u2.pdf", "two.pdf")]
        );
    }

    #[tokio::test]
    async fn test_list_is_isolated_per_owner() {
        let pool = test_pool().await;
        let a = seed_user(&pool, "a@x.com").await;
        let b = seed_user(&pool, "b@x.com").await;

        NoteRepository::create(&pool, &a, "T1", "C1", vec![], vec![])
            .await
            .unwrap();

        let for_a = NoteRepository::list_for_owner(&pool, &a).await.unwrap();
        assert_eq!(for_a.len(), 1);
        assert_eq!(for_a[0].title, "T1");

        let for_b = NoteRepository::list_for_owner(&pool, &b).await.unwrap();
        assert!(for_b.is_empty());
    }

    #[tokio::test]
    async fn test_ownership_guard_hides_foreign_notes() {
        let pool = test_pool().await;
        let a = seed_user(&pool, "a@x.com").await;
        let b = seed_user(&pool, "b@x.com").await;

        let note = NoteRepository::create(&pool, &a, "T1", "C1", vec![], vec![])
            .await
            .unwrap();

        // B can neither read, rewrite, nor delete A's note
        assert!(NoteRepository::get_owned(&pool, &note.id, &b)
            .await
            .unwrap()
            .is_none());
        assert!(NoteRepository::update_owned(&pool, &note.id, &b, "X", "Y", vec![], vec![])
            .await
            .unwrap()
            .is_none());
        assert!(!NoteRepository::delete_owned(&pool, &note.id, &b).await.unwrap());

        // Untouched for the real owner
        let still = NoteRepository::get_owned(&pool, &note.id, &a)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(still.title, "T1");
    }

    #[tokio::test]
    async fn test_update_appends_files_preserving_prefix() {
        let pool = test_pool().await;
        let owner = seed_user(&pool, "a@x.com").await;

        let note = NoteRepository::create(
            &pool,
            &owner,
            "T1",
            "C1",
            vec!["u1.png".into(), "u2.pdf".into()],
            vec!["one.png".into(), "two.pdf".into()],
        )
        .await
        .unwrap();

        let mut urls = note.file_urls.0.clone();
        let mut names = note.file_names.0.clone();
        urls.push("u3.docx".into());
        names.push("three.docx".into());

        let updated = NoteRepository::update_owned(
            &pool, &note.id, &owner, "T1b", "C1b", urls, names,
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(updated.title, "T1b");
        assert_eq!(updated.file_urls.0.len(), 3);
        assert_eq!(updated.file_names.0.len(), 3);
        assert_eq!(&updated.file_urls.0[..2], &note.file_urls.0[..]);
        assert_eq!(updated.file_names.0[2], "three.docx");
    }

    #[tokio::test]
    async fn test_delete_then_get_is_gone() {
        let pool = test_pool().await;
        let owner = seed_user(&pool, "a@x.com").await;

        let note = NoteRepository::create(&pool, &owner, "T1", "C1", vec![], vec![])
            .await
            .unwrap();

        assert!(NoteRepository::delete_owned(&pool, &note.id, &owner).await.unwrap());
        assert!(NoteRepository::get_owned(&pool, &note.id, &owner)
            .await
            .unwrap()
            .is_none());
    }
}
