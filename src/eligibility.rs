use crate::errors::AppError;
use crate::models::{Decision, EligibilityStatus, LoanApplication};

/// Evaluates a loan application against the per-product rule table.
///
/// Pure function: the decision is derived deterministically from the
/// application. Rules fire in a fixed order and only ever downgrade the
/// status; once "Not Eligible" is reached no later rule can raise it.
///
/// A loan type outside the known set matches no rules and stays fully
/// eligible with no reasons.
pub fn evaluate(application: &LoanApplication) -> Result<Decision, AppError> {
    // Guard the DTI division explicitly; zero or negative income is a
    // validation failure, not a crash.
    if application.monthly_income <= 0.0 {
        return Err(AppError::BadRequest(
            "monthly_income must be greater than zero".to_string(),
        ));
    }

    let dti = (application.debt_payments / application.monthly_income) * 100.0;

    let mut status = EligibilityStatus::Eligible;
    let mut reasons: Vec<String> = Vec::new();
    let mut fail = |status: &mut EligibilityStatus, to: EligibilityStatus, reason: &str| {
        status.downgrade(to);
        reasons.push(reason.to_string());
    };

    match application.loan_type.as_str() {
        "Personal Loan" => {
            if application.credit_score < 600 {
                fail(
                    &mut status,
                    EligibilityStatus::NotEligible,
                    "Credit score is too low for a personal loan.",
                );
            }
            if dti > 45.0 {
                fail(
                    &mut status,
                    EligibilityStatus::NotEligible,
                    "DTI ratio is too high for a personal loan.",
                );
            }
        }
        "Mortgage Loan" => {
            if application.credit_score < 500 {
                fail(
                    &mut status,
                    EligibilityStatus::NotEligible,
                    "Credit score is too low for an FHA mortgage.",
                );
            } else if application.credit_score < 620 {
                fail(
                    &mut status,
                    EligibilityStatus::Conditional,
                    "Eligible for FHA but not conventional mortgage.",
                );
            }
            if dti > 43.0 {
                fail(
                    &mut status,
                    EligibilityStatus::NotEligible,
                    "DTI ratio exceeds mortgage requirements.",
                );
            }
            if application.down_payment <= 0.0 {
                fail(
                    &mut status,
                    EligibilityStatus::NotEligible,
                    "Down payment required for a mortgage.",
                );
            }
        }
        "Auto Loan" => {
            if application.credit_score < 660 {
                fail(
                    &mut status,
                    EligibilityStatus::NotEligible,
                    "Credit score is too low for an auto loan.",
                );
            }
            if dti > 50.0 {
                fail(
                    &mut status,
                    EligibilityStatus::NotEligible,
                    "DTI ratio is too high for an auto loan.",
                );
            }
            if application.collateral != "Yes" {
                fail(
                    &mut status,
                    EligibilityStatus::NotEligible,
                    "Collateral (vehicle) required for an auto loan.",
                );
            }
        }
        "Business Loan" => {
            if application.credit_score < 680 {
                fail(
                    &mut status,
                    EligibilityStatus::NotEligible,
                    "Credit score is too low for a business loan.",
                );
            }
        }
        "Credit Card" => {
            if application.credit_score < 600 {
                fail(
                    &mut status,
                    EligibilityStatus::NotEligible,
                    "Credit score is too low for a credit card.",
                );
            }
            if dti > 40.0 {
                fail(
                    &mut status,
                    EligibilityStatus::NotEligible,
                    "DTI ratio is too high for a credit card.",
                );
            }
        }
        other => {
            tracing::debug!("No eligibility rules for loan type '{}'", other);
        }
    }

    Ok(Decision {
        status,
        reasons,
        dti,
    })
}
