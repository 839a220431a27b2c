use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

/// How an identity was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Password registration
    Local,
    /// External identity assertion
    External,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Local => "local",
            Provider::External => "external",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "external" => Provider::External,
            _ => Provider::Local,
        }
    }
}

/// A user account record.
///
/// `password_hash` stays inside the db layer; it is never serialized into
/// a response (the struct deliberately does not implement `Serialize`).
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub uuid: String,
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub provider: Provider,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    uuid: String,
    name: String,
    email: String,
    password_hash: Option<String>,
    provider: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            uuid: row.uuid,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            provider: Provider::from_str(&row.provider),
        }
    }
}

const USER_COLUMNS: &str = "id, uuid, name, email, password_hash, provider";

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user. Returns the user ID.
    ///
    /// `password_hash` is `None` for externally-federated accounts. A
    /// duplicate email among local accounts fails the partial unique index.
    pub async fn create(
        &self,
        uuid: &str,
        name: &str,
        email: &str,
        password_hash: Option<&str>,
        provider: Provider,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO users (uuid, name, email, password_hash, provider) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(uuid)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(provider.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Get a user by email within a provider.
    pub async fn get_by_email(
        &self,
        email: &str,
        provider: Provider,
    ) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE email = ? AND provider = ?",
            USER_COLUMNS
        ))
        .bind(email)
        .bind(provider.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    /// Get a user by UUID.
    pub async fn get_by_uuid(&self, uuid: &str) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE uuid = ?",
            USER_COLUMNS
        ))
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    /// Check whether an email is already registered among local accounts.
    pub async fn email_taken(&self, email: &str) -> Result<bool, sqlx::Error> {
        let count: (i32,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = ? AND provider = 'local'")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(count.0 > 0)
    }

    /// Update name and/or email. Unset fields are left unchanged.
    pub async fn update_profile(
        &self,
        id: i64,
        name: Option<&str>,
        email: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET name = COALESCE(?, name), email = COALESCE(?, email) WHERE id = ?",
        )
        .bind(name)
        .bind(email)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace the password hash.
    pub async fn update_password(&self, id: i64, password_hash: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a user by ID.
    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
