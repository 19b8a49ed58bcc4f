use crate::errors::{AppError, ResultExt};
use crate::models::{Decision, LoanApplication, LoanSubmission, TestResponseRow, TestRun};
use chrono::Utc;
use sqlx::SqlitePool;

/// A postback attempt about to be persisted.
#[derive(Debug, Clone)]
pub struct AttemptRecord {
    pub offer_id: String,
    pub test_id: String,
    pub response_number: i64,
    pub response_data: String,
    pub postback_url: String,
    pub postback_status: String,
}

/// Database storage for loan submissions, test runs and postback attempts.
///
/// Cheap to clone; the pool itself serializes concurrent writes from
/// multiple test workers.
#[derive(Clone)]
pub struct SubmissionStore {
    pool: SqlitePool,
}

impl SubmissionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a submission together with its computed decision.
    /// Returns the row id.
    pub async fn insert_submission(
        &self,
        application: &LoanApplication,
        decision: &Decision,
    ) -> Result<i64, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO loan_submissions (
                credit_score, monthly_income, debt_payments, loan_amount, loan_term,
                employment_status, loan_type, down_payment, state, collateral,
                eligibility, reasons, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(application.credit_score)
        .bind(application.monthly_income)
        .bind(application.debt_payments)
        .bind(application.loan_amount)
        .bind(application.loan_term)
        .bind(&application.employment_status)
        .bind(&application.loan_type)
        .bind(application.down_payment)
        .bind(&application.state)
        .bind(&application.collateral)
        .bind(decision.status.to_string())
        .bind(decision.reasons.join("; "))
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .context("Failed to insert loan submission")?;

        Ok(result.last_insert_rowid())
    }

    /// Fetch every stored submission, oldest first.
    ///
    /// This is the source of the per-submission snapshot fan-out.
    pub async fn fetch_all_submissions(&self) -> Result<Vec<LoanSubmission>, AppError> {
        let rows = sqlx::query_as::<_, LoanSubmission>(
            "SELECT * FROM loan_submissions ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Register a new test run. Every postback attempt references a run
    /// that was inserted before the worker started.
    pub async fn insert_test_run(&self, test_id: &str, offer_id: &str) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO test_runs (test_id, offer_id, completed, created_at) VALUES (?, ?, 0, ?)",
        )
        .bind(test_id)
        .bind(offer_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .context("Failed to insert test run")?;

        Ok(())
    }

    /// Mark a run as completed. Only called after all scheduled
    /// iterations have finished; cancelled runs are never marked.
    pub async fn mark_test_complete(&self, test_id: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE test_runs SET completed = 1 WHERE test_id = ?")
            .bind(test_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            tracing::warn!("No test run found to mark as completed: {}", test_id);
        }

        Ok(())
    }

    pub async fn fetch_test_run(&self, test_id: &str) -> Result<Option<TestRun>, AppError> {
        let run = sqlx::query_as::<_, TestRun>("SELECT * FROM test_runs WHERE test_id = ?")
            .bind(test_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(run)
    }

    /// Append one postback attempt. One write per attempt.
    pub async fn record_attempt(&self, attempt: &AttemptRecord) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO test_responses (
                offer_id, test_id, response_number, response_data,
                postback_url, postback_status, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&attempt.offer_id)
        .bind(&attempt.test_id)
        .bind(attempt.response_number)
        .bind(&attempt.response_data)
        .bind(&attempt.postback_url)
        .bind(&attempt.postback_status)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .context("Failed to record postback attempt")?;

        Ok(())
    }

    /// All recorded attempts for an offer, ordered by run then sequence
    /// number. Stable ordering keeps repeated reads identical.
    pub async fn results_for_offer(&self, offer_id: &str) -> Result<Vec<TestResponseRow>, AppError> {
        let rows = sqlx::query_as::<_, TestResponseRow>(
            r#"
            SELECT * FROM test_responses
            WHERE offer_id = ?
            ORDER BY test_id ASC, response_number ASC, id ASC
            "#,
        )
        .bind(offer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
