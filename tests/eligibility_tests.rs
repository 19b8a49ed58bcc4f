/// Unit tests for the loan eligibility evaluator
/// Covers the per-product rule table, the DTI zero-income guard and the
/// worked examples from the product rules
use loan_postback_api::eligibility::evaluate;
use loan_postback_api::models::{EligibilityStatus, LoanApplication};

/// Helper to build an application with sensible defaults.
fn application(
    loan_type: &str,
    credit_score: i64,
    monthly_income: f64,
    debt_payments: f64,
) -> LoanApplication {
    LoanApplication {
        credit_score,
        monthly_income,
        debt_payments,
        loan_amount: 10_000.0,
        loan_term: 36,
        employment_status: "Employed".to_string(),
        loan_type: loan_type.to_string(),
        state: "CA".to_string(),
        collateral: "Yes".to_string(),
        down_payment: 0.0,
    }
}

#[cfg(test)]
mod personal_loan_tests {
    use super::*;

    #[test]
    fn test_eligible_personal_loan() {
        // Worked example: score 650, income 5000, debt 1000 -> DTI 20, eligible
        let decision = evaluate(&application("Personal Loan", 650, 5000.0, 1000.0)).unwrap();
        assert_eq!(decision.status, EligibilityStatus::Eligible);
        assert!(decision.reasons.is_empty());
        assert!((decision.dti - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_low_score_disqualifies() {
        let decision = evaluate(&application("Personal Loan", 599, 5000.0, 1000.0)).unwrap();
        assert_eq!(decision.status, EligibilityStatus::NotEligible);
        assert_eq!(
            decision.reasons,
            vec!["Credit score is too low for a personal loan."]
        );
    }

    #[test]
    fn test_high_dti_disqualifies() {
        // DTI 50 > 45
        let decision = evaluate(&application("Personal Loan", 700, 2000.0, 1000.0)).unwrap();
        assert_eq!(decision.status, EligibilityStatus::NotEligible);
        assert_eq!(
            decision.reasons,
            vec!["DTI ratio is too high for a personal loan."]
        );
    }

    #[test]
    fn test_both_rules_fire_in_order() {
        // Score and DTI both failing: two reasons, status stays Not Eligible
        let decision = evaluate(&application("Personal Loan", 500, 1000.0, 600.0)).unwrap();
        assert_eq!(decision.status, EligibilityStatus::NotEligible);
        assert_eq!(decision.reasons.len(), 2);
        assert_eq!(
            decision.reasons[0],
            "Credit score is too low for a personal loan."
        );
        assert_eq!(
            decision.reasons[1],
            "DTI ratio is too high for a personal loan."
        );
    }
}

#[cfg(test)]
mod mortgage_tests {
    use super::*;

    #[test]
    fn test_conditional_fha_band() {
        let mut app = application("Mortgage Loan", 550, 5000.0, 1000.0);
        app.down_payment = 20_000.0;
        let decision = evaluate(&app).unwrap();
        assert_eq!(decision.status, EligibilityStatus::Conditional);
        assert_eq!(
            decision.reasons,
            vec!["Eligible for FHA but not conventional mortgage."]
        );
    }

    #[test]
    fn test_conditional_never_overrides_not_eligible() {
        // Worked example: score 550 with no down payment. Both the FHA
        // band and the down-payment rule fire; Not Eligible dominates.
        let decision = evaluate(&application("Mortgage Loan", 550, 5000.0, 1000.0)).unwrap();
        assert_eq!(decision.status, EligibilityStatus::NotEligible);
        assert!(decision
            .reasons
            .contains(&"Eligible for FHA but not conventional mortgage.".to_string()));
        assert!(decision
            .reasons
            .contains(&"Down payment required for a mortgage.".to_string()));
    }

    #[test]
    fn test_score_below_fha_floor() {
        let mut app = application("Mortgage Loan", 499, 5000.0, 1000.0);
        app.down_payment = 20_000.0;
        let decision = evaluate(&app).unwrap();
        assert_eq!(decision.status, EligibilityStatus::NotEligible);
        assert_eq!(
            decision.reasons,
            vec!["Credit score is too low for an FHA mortgage."]
        );
    }

    #[test]
    fn test_conventional_mortgage_eligible() {
        let mut app = application("Mortgage Loan", 620, 5000.0, 1000.0);
        app.down_payment = 20_000.0;
        let decision = evaluate(&app).unwrap();
        assert_eq!(decision.status, EligibilityStatus::Eligible);
        assert!(decision.reasons.is_empty());
    }

    #[test]
    fn test_mortgage_dti_cap() {
        // DTI 44 > 43
        let mut app = application("Mortgage Loan", 700, 5000.0, 2200.0);
        app.down_payment = 20_000.0;
        let decision = evaluate(&app).unwrap();
        assert_eq!(decision.status, EligibilityStatus::NotEligible);
        assert_eq!(
            decision.reasons,
            vec!["DTI ratio exceeds mortgage requirements."]
        );
    }
}

#[cfg(test)]
mod auto_loan_tests {
    use super::*;

    #[test]
    fn test_missing_collateral_always_disqualifies() {
        // Regardless of score or DTI
        for (score, income, debt) in [(850, 10_000.0, 0.0), (700, 5000.0, 100.0)] {
            let mut app = application("Auto Loan", score, income, debt);
            app.collateral = "No".to_string();
            let decision = evaluate(&app).unwrap();
            assert_eq!(decision.status, EligibilityStatus::NotEligible);
            assert!(decision
                .reasons
                .contains(&"Collateral (vehicle) required for an auto loan.".to_string()));
        }
    }

    #[test]
    fn test_eligible_auto_loan() {
        let decision = evaluate(&application("Auto Loan", 700, 5000.0, 1000.0)).unwrap();
        assert_eq!(decision.status, EligibilityStatus::Eligible);
        assert!(decision.reasons.is_empty());
    }

    #[test]
    fn test_auto_loan_score_floor() {
        let decision = evaluate(&application("Auto Loan", 659, 5000.0, 1000.0)).unwrap();
        assert_eq!(decision.status, EligibilityStatus::NotEligible);
    }

    #[test]
    fn test_auto_loan_dti_cap() {
        // DTI 51 > 50
        let decision = evaluate(&application("Auto Loan", 700, 1000.0, 510.0)).unwrap();
        assert_eq!(decision.status, EligibilityStatus::NotEligible);
        assert_eq!(
            decision.reasons,
            vec!["DTI ratio is too high for an auto loan."]
        );
    }
}

#[cfg(test)]
mod business_and_credit_card_tests {
    use super::*;

    #[test]
    fn test_business_loan_boundary() {
        let eligible = evaluate(&application("Business Loan", 680, 5000.0, 1000.0)).unwrap();
        assert_eq!(eligible.status, EligibilityStatus::Eligible);

        let rejected = evaluate(&application("Business Loan", 679, 5000.0, 1000.0)).unwrap();
        assert_eq!(rejected.status, EligibilityStatus::NotEligible);
        assert_eq!(
            rejected.reasons,
            vec!["Credit score is too low for a business loan."]
        );
    }

    #[test]
    fn test_credit_card_rules() {
        let eligible = evaluate(&application("Credit Card", 650, 5000.0, 1000.0)).unwrap();
        assert_eq!(eligible.status, EligibilityStatus::Eligible);

        // DTI 45 > 40
        let high_dti = evaluate(&application("Credit Card", 650, 1000.0, 450.0)).unwrap();
        assert_eq!(high_dti.status, EligibilityStatus::NotEligible);
        assert_eq!(
            high_dti.reasons,
            vec!["DTI ratio is too high for a credit card."]
        );

        let low_score = evaluate(&application("Credit Card", 599, 5000.0, 0.0)).unwrap();
        assert_eq!(low_score.status, EligibilityStatus::NotEligible);
    }
}

#[cfg(test)]
mod dti_guard_tests {
    use super::*;

    #[test]
    fn test_zero_income_rejected_cleanly() {
        let result = evaluate(&application("Personal Loan", 700, 0.0, 1000.0));
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_income_rejected_cleanly() {
        let result = evaluate(&application("Personal Loan", 700, -100.0, 1000.0));
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_debt_gives_zero_dti() {
        let decision = evaluate(&application("Personal Loan", 700, 5000.0, 0.0)).unwrap();
        assert_eq!(decision.dti, 0.0);
        assert_eq!(decision.status, EligibilityStatus::Eligible);
    }
}

#[cfg(test)]
mod unknown_loan_type_tests {
    use super::*;

    #[test]
    fn test_unknown_type_stays_eligible_with_no_reasons() {
        // No rules apply to unrecognized products
        let decision = evaluate(&application("Student Loan", 300, 1000.0, 900.0)).unwrap();
        assert_eq!(decision.status, EligibilityStatus::Eligible);
        assert!(decision.reasons.is_empty());
    }
}
