use crate::auth::repo_types::{NewUser, ProfilePatch, User};
use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, username, email, password_hash, full_name, age, height, weight, \
                            target_weight, daily_calorie_goal, created_at";

impl User {
    /// Find a user by email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(db)
            .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(user)
    }

    /// True when either the username or the email is already registered.
    pub async fn exists(db: &PgPool, username: &str, email: &str) -> anyhow::Result<bool> {
        let found: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM users WHERE username = $1 OR email = $2 LIMIT 1")
                .bind(username)
                .bind(email)
                .fetch_optional(db)
                .await
                .context("check user exists")?;
        Ok(found.is_some())
    }

    /// Create a new user with hashed password.
    pub async fn create(db: &PgPool, new: &NewUser) -> anyhow::Result<User> {
        let sql = format!(
            r#"
            INSERT INTO users
                (username, email, password_hash, full_name, age, height, weight,
                 target_weight, daily_calorie_goal)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(&new.username)
            .bind(&new.email)
            .bind(&new.password_hash)
            .bind(&new.full_name)
            .bind(new.age)
            .bind(new.height)
            .bind(new.weight)
            .bind(new.target_weight)
            .bind(new.daily_calorie_goal)
            .fetch_one(db)
            .await
            .context("create user")?;
        Ok(user)
    }

    pub async fn update_profile(
        db: &PgPool,
        id: Uuid,
        patch: &ProfilePatch,
    ) -> anyhow::Result<Option<User>> {
        let sql = format!(
            r#"
            UPDATE users
               SET email              = COALESCE($2, email),
                   full_name          = COALESCE($3, full_name),
                   age                = COALESCE($4, age),
                   height             = COALESCE($5, height),
                   weight             = COALESCE($6, weight),
                   target_weight      = COALESCE($7, target_weight),
                   daily_calorie_goal = COALESCE($8, daily_calorie_goal)
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(patch.email.as_deref())
            .bind(patch.full_name.as_deref())
            .bind(patch.age)
            .bind(patch.height)
            .bind(patch.weight)
            .bind(patch.target_weight)
            .bind(patch.daily_calorie_goal)
            .fetch_optional(db)
            .await
            .context("update profile")?;
        Ok(user)
    }

    pub async fn set_password_hash(db: &PgPool, id: Uuid, hash: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(hash)
            .execute(db)
            .await
            .context("set password hash")?;
        Ok(())
    }
}
