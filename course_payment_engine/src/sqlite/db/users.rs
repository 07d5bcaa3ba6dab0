use chrono::Utc;
use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewUser, User},
    UserAccountError,
};

pub async fn insert_user(user: NewUser, conn: &mut SqliteConnection) -> Result<User, UserAccountError> {
    let created_at = Utc::now();
    let result = sqlx::query(
        r#"INSERT INTO users (email, name, password_hash, created_at) VALUES ($1, $2, $3, $4)"#,
    )
    .bind(&user.email)
    .bind(&user.name)
    .bind(&user.password_hash)
    .bind(created_at)
    .execute(conn)
    .await;
    match result {
        Ok(res) => {
            let id = res.last_insert_rowid();
            trace!("🧑️ Inserted user #{id} ({})", user.email);
            Ok(User {
                id,
                email: user.email,
                name: user.name,
                password_hash: user.password_hash,
                created_at,
            })
        },
        Err(sqlx::Error::Database(de)) if de.is_unique_violation() => Err(UserAccountError::DuplicateEmail),
        Err(e) => Err(e.into()),
    }
}

pub async fn user_by_email(email: &str, conn: &mut SqliteConnection) -> Result<Option<User>, UserAccountError> {
    let user = sqlx::query_as::<_, User>(
        r#"SELECT id, email, name, password_hash, created_at FROM users WHERE email = $1"#,
    )
    .bind(email)
    .fetch_optional(conn)
    .await?;
    Ok(user)
}

pub async fn user_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<User>, UserAccountError> {
    let user = sqlx::query_as::<_, User>(
        r#"SELECT id, email, name, password_hash, created_at FROM users WHERE id = $1"#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(user)
}
