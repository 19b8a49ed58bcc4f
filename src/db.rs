use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // A single connection serializes writes from concurrent test
        // workers; SQLite tolerates only one writer at a time.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await?;

        Self::create_schema(&pool).await?;

        Ok(Self { pool })
    }

    /// Create the tables if they do not exist yet.
    pub async fn create_schema(pool: &SqlitePool) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS loan_submissions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                credit_score INTEGER NOT NULL,
                monthly_income REAL NOT NULL,
                debt_payments REAL NOT NULL,
                loan_amount REAL NOT NULL,
                loan_term INTEGER NOT NULL,
                employment_status TEXT NOT NULL,
                loan_type TEXT NOT NULL,
                down_payment REAL NOT NULL DEFAULT 0,
                state TEXT NOT NULL,
                collateral TEXT NOT NULL,
                eligibility TEXT NOT NULL,
                reasons TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS test_runs (
                test_id TEXT PRIMARY KEY,
                offer_id TEXT NOT NULL,
                completed INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS test_responses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                offer_id TEXT NOT NULL,
                test_id TEXT NOT NULL,
                response_number INTEGER NOT NULL,
                response_data TEXT NOT NULL,
                postback_url TEXT,
                postback_status TEXT,
                created_at TEXT NOT NULL,
                FOREIGN KEY (test_id) REFERENCES test_runs (test_id)
            )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}
