use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

// ============ Request Models ============

/// A loan application as submitted through the form endpoint.
///
/// This is the strongly typed boundary for form data: any missing or
/// malformed field is rejected by deserialization before evaluation begins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanApplication {
    /// Applicant credit score.
    pub credit_score: i64,
    /// Gross monthly income. Must be greater than zero.
    pub monthly_income: f64,
    /// Total monthly debt payments.
    pub debt_payments: f64,
    /// Requested loan amount.
    pub loan_amount: f64,
    /// Loan term in months.
    pub loan_term: i64,
    /// Employment status (free text, e.g. "Employed").
    pub employment_status: String,
    /// Loan product being applied for (e.g. "Personal Loan", "Auto Loan").
    pub loan_type: String,
    /// Applicant state of residence.
    pub state: String,
    /// Whether collateral is offered ("Yes"/"No").
    pub collateral: String,
    /// Down payment offered. Only evaluated for mortgages.
    #[serde(default)]
    pub down_payment: f64,
}

/// Request body for starting a postback test run.
#[derive(Debug, Clone, Deserialize)]
pub struct StartTestRequest {
    pub offer_id: Option<String>,
}

// ============ Eligibility Models ============

/// Eligibility status of a loan application.
///
/// Ordering encodes dominance: a status can only ever be downgraded
/// (Eligible -> Conditional -> NotEligible), never raised back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EligibilityStatus {
    Eligible,
    Conditional,
    #[serde(rename = "Not Eligible")]
    NotEligible,
}

impl EligibilityStatus {
    /// Downgrade to `other` if it is worse than the current status.
    pub fn downgrade(&mut self, other: EligibilityStatus) {
        if other > *self {
            *self = other;
        }
    }
}

impl fmt::Display for EligibilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EligibilityStatus::Eligible => "Eligible",
            EligibilityStatus::Conditional => "Conditional",
            EligibilityStatus::NotEligible => "Not Eligible",
        };
        write!(f, "{}", label)
    }
}

/// Outcome of evaluating a loan application.
///
/// Derived deterministically from the application and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub status: EligibilityStatus,
    /// Reason strings in rule-evaluation order. Empty when fully eligible.
    pub reasons: Vec<String>,
    /// Debt-to-income ratio, in percent.
    pub dti: f64,
}

// ============ Database Models ============

/// A persisted loan submission: the application fields plus the computed decision.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct LoanSubmission {
    pub id: i64,
    pub credit_score: i64,
    pub monthly_income: f64,
    pub debt_payments: f64,
    pub loan_amount: f64,
    pub loan_term: i64,
    pub employment_status: String,
    pub loan_type: String,
    pub down_payment: f64,
    pub state: String,
    pub collateral: String,
    /// Display form of the decision status.
    pub eligibility: String,
    /// Reason strings joined with "; ".
    pub reasons: String,
    pub created_at: DateTime<Utc>,
}

/// A background postback test run.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TestRun {
    pub test_id: String,
    pub offer_id: String,
    /// Set once all scheduled iterations have finished. A cancelled run
    /// is removed from the registry but never marked completed.
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// One recorded postback attempt. Append-only, one row per attempt.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TestResponseRow {
    pub id: i64,
    pub offer_id: String,
    pub test_id: String,
    /// Iteration number within the run, 1-based.
    pub response_number: i64,
    /// The JSON snapshot that was sent, including the postback outcome.
    pub response_data: String,
    pub postback_url: Option<String>,
    /// HTTP status code as a string, or "error" on transport failure.
    pub postback_status: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ============ Registry Models ============

/// In-flight metadata for an active test run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveTest {
    pub offer_id: String,
    pub started_at: DateTime<Utc>,
}
