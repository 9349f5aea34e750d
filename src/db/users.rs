use sqlx::{Pool, Sqlite};
use uuid::Uuid;
use crate::db::models::User;
use crate::error::AppError;

pub struct UserRepository;

impl UserRepository {
    pub async fn create(
        pool: &Pool<Sqlite>,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, AppError> {
        let id = Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().timestamp();

        let user = sqlx::query_as::<_, User>(
            r#"
INSERT INTO users (id, username, email, password_hash, created_at)
VALUES (?, ?, ?, ?, ?)
RETURNING *
            "#,
        )
        .bind(&id)
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(created_at)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            // The UNIQUE index on email is the atomic duplicate guard
            if e.as_database_error()
                .is_some_and(|db| db.is_unique_violation())
            {
                AppError::DuplicateUser
            } else {
                AppError::Database(e)
            }
        })?;

        Ok(user)
    }

    pub async fn get_by_email(
        pool: &Pool<Sqlite>,
        email: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE email = ?"
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn get_by_id(
        pool: &Pool<Sqlite>,
        id: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;

    #[tokio::test]
    async fn test_create_and_lookup() {
        let pool = test_pool().await;

        let user = UserRepository::create(&pool, "alice", "a@x.com", "$argon2$fake")
            .await
            .unwrap();

        let by_email = UserRepository::get_by_email(&pool, "a@x.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, user.id);
        assert_eq!(by_email.username, "alice");

        assert!(UserRepository::get_by_email(&pool, "b@x.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected_atomically() {
        let pool = test_pool().await;

        UserRepository::create(&pool, "alice", "a@x.com", "$argon2$fake")
            .await
            .unwrap();

        let err = UserRepository::create(&pool, "imposter", "a@x.com", "$argon2$other")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateUser));
    }
}
