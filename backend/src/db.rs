use anyhow::Result;
use sqlx::{migrate::MigrateDatabase, Row, Sqlite, SqlitePool};
use std::sync::Arc;

// The database URL for the production database
const DATABASE_URL: &str = "sqlite:minibank.db";

/// A user row as stored in the `users` table
#[derive(Debug, Clone)]
pub struct UserRow {
    pub username: String,
    pub password_hash: String,
    pub balance: i64,
}

/// DbConnection manages database operations
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Create a new database connection
    pub async fn new(url: &str) -> Result<Self> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?
        }

        // Connect to the database
        let pool = SqlitePool::connect(url).await?;

        // Setup database schema
        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Initialize the standard database
    pub async fn init() -> Result<Self> {
        Self::new(DATABASE_URL).await
    }

    /// Initialize a test database with a unique name
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        // Generate a unique database name for tests
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        // Create our database table if it doesn't exist
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                username TEXT PRIMARY KEY,
                password_hash TEXT NOT NULL,
                balance INTEGER NOT NULL CHECK (balance >= 0),
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Insert a new user row. Returns false if the username is already taken.
    pub async fn insert_user(
        &self,
        username: &str,
        password_hash: &str,
        balance: i64,
        created_at: &str,
    ) -> Result<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO users (username, password_hash, balance, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(username)
        .bind(password_hash)
        .bind(balance)
        .bind(created_at)
        .execute(&*self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Retrieve a user row by username
    pub async fn get_user(&self, username: &str) -> Result<Option<UserRow>> {
        let row = sqlx::query("SELECT username, password_hash, balance FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&*self.pool)
            .await?;

        match row {
            Some(r) => Ok(Some(UserRow {
                username: r.get("username"),
                password_hash: r.get("password_hash"),
                balance: r.get("balance"),
            })),
            None => Ok(None),
        }
    }

    /// Retrieve a user's balance by username
    pub async fn get_balance(&self, username: &str) -> Result<Option<i64>> {
        let row = sqlx::query("SELECT balance FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&*self.pool)
            .await?;

        match row {
            Some(r) => {
                let balance: i64 = r.get("balance");
                Ok(Some(balance))
            }
            None => Ok(None),
        }
    }

    /// Move `amount` from sender to receiver inside a single transaction.
    ///
    /// The debit only hits a row when the sender exists and has a sufficient
    /// balance; the credit only hits a row when the receiver exists. If either
    /// update touches zero rows the transaction is rolled back, so a debit can
    /// never survive a failed credit and concurrent transfers cannot drive a
    /// balance negative. Returns false when the transfer was not applied.
    pub async fn transfer_balances(&self, sender: &str, receiver: &str, amount: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let debited = sqlx::query(
            "UPDATE users SET balance = balance - ? WHERE username = ? AND balance >= ?",
        )
        .bind(amount)
        .bind(sender)
        .bind(amount)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if debited == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        let credited = sqlx::query("UPDATE users SET balance = balance + ? WHERE username = ?")
            .bind(amount)
            .bind(receiver)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if credited == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;
        Ok(true)
    }
}
