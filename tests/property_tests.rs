/// Property-based tests using proptest
/// Tests invariants that should hold for all inputs: the evaluator never
/// panics, status downgrades are monotonic, and postback URLs always
/// carry a well-formed payout from the configured set
use loan_postback_api::eligibility::evaluate;
use loan_postback_api::models::{EligibilityStatus, LoanApplication};
use loan_postback_api::postback::{build_postback_url, pick_payout_cents, PAYOUT_OPTIONS_CENTS};
use proptest::prelude::*;

fn arbitrary_application(
    loan_type: String,
    credit_score: i64,
    monthly_income: f64,
    debt_payments: f64,
    collateral: String,
    down_payment: f64,
) -> LoanApplication {
    LoanApplication {
        credit_score,
        monthly_income,
        debt_payments,
        loan_amount: 10_000.0,
        loan_term: 36,
        employment_status: "Employed".to_string(),
        loan_type,
        state: "CA".to_string(),
        collateral,
        down_payment,
    }
}

fn loan_type_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Personal Loan".to_string()),
        Just("Mortgage Loan".to_string()),
        Just("Auto Loan".to_string()),
        Just("Business Loan".to_string()),
        Just("Credit Card".to_string()),
        "[A-Za-z ]{0,20}",
    ]
}

proptest! {
    // The evaluator must never panic, including on zero income where it
    // returns a validation error instead of dividing
    #[test]
    fn evaluator_never_panics(
        loan_type in loan_type_strategy(),
        credit_score in -100i64..=1000,
        monthly_income in 0.0f64..1_000_000.0,
        debt_payments in 0.0f64..1_000_000.0,
        collateral in prop_oneof![Just("Yes".to_string()), Just("No".to_string())],
        down_payment in 0.0f64..1_000_000.0,
    ) {
        let app = arbitrary_application(
            loan_type, credit_score, monthly_income, debt_payments, collateral, down_payment,
        );
        let _ = evaluate(&app);
    }

    // Auto loans without collateral are Not Eligible regardless of all
    // other fields
    #[test]
    fn auto_loan_without_collateral_never_eligible(
        credit_score in 300i64..=850,
        monthly_income in 1.0f64..1_000_000.0,
        debt_payments in 0.0f64..1_000_000.0,
    ) {
        let app = arbitrary_application(
            "Auto Loan".to_string(),
            credit_score,
            monthly_income,
            debt_payments,
            "No".to_string(),
            0.0,
        );
        let decision = evaluate(&app).unwrap();
        prop_assert_eq!(decision.status, EligibilityStatus::NotEligible);
    }

    // Reasons and status move together: a fully eligible decision has no
    // reasons, and any downgrade leaves at least one reason behind
    #[test]
    fn reasons_track_status_downgrades(
        loan_type in loan_type_strategy(),
        credit_score in 300i64..=850,
        monthly_income in 1.0f64..1_000_000.0,
        debt_payments in 0.0f64..1_000_000.0,
        collateral in prop_oneof![Just("Yes".to_string()), Just("No".to_string())],
        down_payment in 0.0f64..100_000.0,
    ) {
        let app = arbitrary_application(
            loan_type, credit_score, monthly_income, debt_payments, collateral, down_payment,
        );
        let decision = evaluate(&app).unwrap();
        prop_assert_eq!(
            decision.reasons.is_empty(),
            decision.status == EligibilityStatus::Eligible
        );
    }
}

proptest! {
    // Payout query parameter is always the cent value rendered as a
    // 2-decimal fraction
    #[test]
    fn payout_rendered_as_two_decimal_fraction(cents in 1u32..=10_000) {
        let url = build_postback_url("https://example.com/postback/abc?", cents, None);
        let expected = format!("payout={:.2}", f64::from(cents) / 100.0);
        prop_assert!(url.contains(&expected));
    }

    // Random payout selection only ever draws from the configured set
    #[test]
    fn picked_payouts_stay_in_configured_set(_dummy in 0u8..=255) {
        let cents = pick_payout_cents();
        prop_assert!(PAYOUT_OPTIONS_CENTS.contains(&cents));
    }

    // Offer ids are query-encoded, never spliced in raw
    #[test]
    fn offer_id_is_query_encoded(offer in "[a-zA-Z0-9 /&=]{1,30}") {
        let url = build_postback_url("https://example.com/pb?", 75, Some(&offer));
        let tail = url.split("offer_id=").nth(1).unwrap_or("");
        prop_assert!(!tail.contains(' '));
        prop_assert!(!tail.contains('&'));
        prop_assert!(!tail.contains('='));
    }
}

#[test]
fn separator_inserted_for_bare_base_urls() {
    assert_eq!(
        build_postback_url("https://example.com/pb", 75, None),
        "https://example.com/pb?payout=0.75"
    );
    assert_eq!(
        build_postback_url("https://example.com/pb?", 100, None),
        "https://example.com/pb?payout=1.00"
    );
    assert_eq!(
        build_postback_url("https://example.com/pb?source=x", 20, None),
        "https://example.com/pb?source=x&payout=0.20"
    );
}
