//! Transaction storage for per-user finance entries.

use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct TransactionStore {
    pool: SqlitePool,
}

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "income" => TransactionKind::Income,
            _ => TransactionKind::Expense,
        }
    }
}

/// A finance entry belonging to one user.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Transaction {
    #[serde(skip_serializing)]
    pub id: i64,
    #[serde(rename = "id")]
    pub uuid: String,
    #[serde(skip_serializing)]
    pub user_id: i64,
    pub date: String,
    pub description: String,
    pub category: String,
    pub amount: f64,
    pub kind: TransactionKind,
}

#[derive(sqlx::FromRow)]
struct TransactionRow {
    id: i64,
    uuid: String,
    user_id: i64,
    date: String,
    description: String,
    category: String,
    amount: f64,
    kind: String,
}

impl From<TransactionRow> for Transaction {
    fn from(row: TransactionRow) -> Self {
        Self {
            id: row.id,
            uuid: row.uuid,
            user_id: row.user_id,
            date: row.date,
            description: row.description,
            category: row.category,
            amount: row.amount,
            kind: TransactionKind::from_str(&row.kind),
        }
    }
}

const TX_COLUMNS: &str = "id, uuid, user_id, date, description, category, amount, kind";

impl TransactionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new transaction. Returns the row ID.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        uuid: &str,
        user_id: i64,
        date: &str,
        description: &str,
        category: &str,
        amount: f64,
        kind: TransactionKind,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO transactions (uuid, user_id, date, description, category, amount, kind) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid)
        .bind(user_id)
        .bind(date)
        .bind(description)
        .bind(category)
        .bind(amount)
        .bind(kind.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// List all transactions of one user, newest first.
    pub async fn list_by_user(&self, user_id: i64) -> Result<Vec<Transaction>, sqlx::Error> {
        let rows: Vec<TransactionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM transactions WHERE user_id = ? ORDER BY date DESC, id DESC",
            TX_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Transaction::from).collect())
    }

    /// Get one transaction by UUID, scoped to its owner.
    pub async fn get_for_user(
        &self,
        uuid: &str,
        user_id: i64,
    ) -> Result<Option<Transaction>, sqlx::Error> {
        let row: Option<TransactionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM transactions WHERE uuid = ? AND user_id = ?",
            TX_COLUMNS
        ))
        .bind(uuid)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Transaction::from))
    }

    /// Update fields of a transaction, scoped to its owner.
    /// Unset fields are left unchanged.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_for_user(
        &self,
        uuid: &str,
        user_id: i64,
        date: Option<&str>,
        description: Option<&str>,
        category: Option<&str>,
        amount: Option<f64>,
        kind: Option<TransactionKind>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE transactions SET \
             date = COALESCE(?, date), \
             description = COALESCE(?, description), \
             category = COALESCE(?, category), \
             amount = COALESCE(?, amount), \
             kind = COALESCE(?, kind) \
             WHERE uuid = ? AND user_id = ?",
        )
        .bind(date)
        .bind(description)
        .bind(category)
        .bind(amount)
        .bind(kind.map(|k| k.as_str()))
        .bind(uuid)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete one transaction, scoped to its owner.
    pub async fn delete_for_user(&self, uuid: &str, user_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM transactions WHERE uuid = ? AND user_id = ?")
            .bind(uuid)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every transaction of one user. Returns the number deleted.
    pub async fn delete_all_for_user(&self, user_id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM transactions WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
