//! Quick-estimate calculators.
//!
//! Lighter-weight answers than the full verdict report: payment ceilings
//! from the standard PTI guidelines, what a target payment buys at each
//! credit tier's typical APR, and month-by-month amortization schedules.
//! Loan math routes through the supplied engine so parity carries up.

use super::engine::CalcEngine;
use super::types::{
    AmortizationRow, AutoAffordability, CalcError, CalcResult, CREDIT_TIERS, LoanEstimate,
    PaymentApproval, round_cents,
};

/// The three payment-to-income guidelines: (label, ratio, description).
/// Conservative/Standard/Aggressive at 8/12/15 percent of gross monthly.
const PTI_RATIOS: [(&str, f64, &str); 3] = [
    ("Conservative", 0.08, "Low risk, easier approval"),
    ("Standard", 0.12, "Typical auto loan guideline"),
    ("Aggressive", 0.15, "Maximum most lenders approve"),
];

/// When no term is given, estimates assume five years.
const DEFAULT_TERM_MONTHS: u32 = 60;

fn check_positive(name: &str, v: f64) -> CalcResult<f64> {
    match v {
        v if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(CalcError::InvalidInput(format!(
            "{name} must be a finite positive number"
        ))),
    }
}

/// Maximum monthly payment under each PTI guideline, rounded to whole
/// dollars. Pure income arithmetic, no engine involved.
pub fn payment_approvals(monthly_income: f64) -> CalcResult<Vec<PaymentApproval>> {
    let income = check_positive("Monthly income", monthly_income)?;
    Ok(PTI_RATIOS
        .iter()
        .map(|&(pti_type, ratio, description)| PaymentApproval {
            pti_type,
            ratio,
            max_payment: (income * ratio).round(),
            description,
        })
        .collect())
}

/// The loan a target payment services at each tier's typical APR, with the
/// total cost of the payment stream. Whole-dollar outputs; a term of zero
/// takes the five-year default.
pub fn loan_estimates(
    engine: &dyn CalcEngine,
    monthly_payment: f64,
    term_months: u32,
) -> CalcResult<Vec<LoanEstimate>> {
    let payment = check_positive("Monthly payment", monthly_payment)?;
    let term = if term_months == 0 {
        DEFAULT_TERM_MONTHS
    } else {
        term_months
    };

    // same payment across tiers, so total_cost is tier-independent
    let total_cost = (payment * term as f64).round();

    CREDIT_TIERS
        .iter()
        .map(|tier| {
            let loan_amount = engine
                .loan_amount_for_payment(payment, tier.apr_typical, term)?
                .round();
            Ok(LoanEstimate {
                credit_tier: tier.clone(),
                loan_amount,
                total_interest: (total_cost - loan_amount).max(0.0).round(),
                total_cost,
            })
        })
        .collect()
}

/// The combined quick report: payment ceilings for all three guidelines,
/// plus what the Standard (12%) payment buys at each tier.
pub fn auto_affordability(
    engine: &dyn CalcEngine,
    monthly_income: f64,
    term_months: u32,
) -> CalcResult<AutoAffordability> {
    let approvals = payment_approvals(monthly_income)?;
    let standard_payment = approvals[1].max_payment;
    let estimates = loan_estimates(engine, standard_payment, term_months)?;

    Ok(AutoAffordability {
        monthly_income,
        payment_approvals: approvals,
        loan_estimates: estimates,
    })
}

/// Month-by-month amortization of a level-payment loan. The final month's
/// balance is pinned to exactly zero so cent-rounding drift never leaves a
/// residual.
pub fn amortization_schedule(
    engine: &dyn CalcEngine,
    principal: f64,
    apr_percent: f64,
    term_months: u32,
) -> CalcResult<Vec<AmortizationRow>> {
    check_positive("Principal", principal)?;
    let payment = engine.monthly_payment(principal, apr_percent, term_months)?;
    let monthly_rate = apr_percent.max(0.0) / 100.0 / 12.0;

    let mut balance = principal;
    let mut schedule = Vec::with_capacity(term_months as usize);
    for month in 1..=term_months {
        let interest = balance * monthly_rate;
        let principal_portion = payment - interest;
        balance -= principal_portion;

        let remaining = if month == term_months {
            0.0
        } else {
            balance.max(0.0)
        };
        schedule.push(AmortizationRow {
            month,
            payment: round_cents(payment),
            principal: round_cents(principal_portion),
            interest: round_cents(interest),
            balance: round_cents(remaining),
        });
    }

    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reference::ReferenceEngine;

    #[test]
    fn approvals_follow_the_three_guidelines() {
        let approvals = payment_approvals(5_000.0).unwrap();
        assert_eq!(approvals.len(), 3);
        assert_eq!(approvals[0].max_payment, 400.0);
        assert_eq!(approvals[1].max_payment, 600.0);
        assert_eq!(approvals[2].max_payment, 750.0);
        assert_eq!(approvals[1].pti_type, "Standard");
    }

    #[test]
    fn approvals_reject_non_positive_income() {
        assert!(payment_approvals(0.0).is_err());
        assert!(payment_approvals(-100.0).is_err());
        assert!(payment_approvals(f64::NAN).is_err());
    }

    #[test]
    fn better_credit_buys_a_larger_loan() {
        let estimates = loan_estimates(&ReferenceEngine, 600.0, 60).unwrap();
        assert_eq!(estimates.len(), CREDIT_TIERS.len());
        assert_eq!(estimates[0].credit_tier.id, "excellent");
        // same payment stream, so total cost matches across tiers
        assert_eq!(estimates[0].total_cost, estimates[4].total_cost);
        assert!(estimates[0].loan_amount > estimates[4].loan_amount);
        // lower APR also means less of the stream is interest
        assert!(estimates[0].total_interest < estimates[4].total_interest);
    }

    #[test]
    fn zero_term_defaults_to_five_years() {
        let defaulted = loan_estimates(&ReferenceEngine, 600.0, 0).unwrap();
        let explicit = loan_estimates(&ReferenceEngine, 600.0, 60).unwrap();
        assert_eq!(defaulted[0].loan_amount, explicit[0].loan_amount);
        assert_eq!(defaulted[0].total_cost, explicit[0].total_cost);
    }

    #[test]
    fn estimates_reject_non_positive_payment() {
        assert!(loan_estimates(&ReferenceEngine, 0.0, 60).is_err());
        assert!(loan_estimates(&ReferenceEngine, -50.0, 60).is_err());
    }

    #[test]
    fn affordability_estimates_use_the_standard_payment() {
        let report = auto_affordability(&ReferenceEngine, 5_000.0, 60).unwrap();
        assert_eq!(report.monthly_income, 5_000.0);
        let direct = loan_estimates(&ReferenceEngine, 600.0, 60).unwrap();
        assert_eq!(
            report.loan_estimates[0].loan_amount,
            direct[0].loan_amount
        );
    }

    #[test]
    fn schedule_amortizes_to_zero() {
        let schedule = amortization_schedule(&ReferenceEngine, 10_000.0, 6.0, 12).unwrap();
        assert_eq!(schedule.len(), 12);
        assert_eq!(schedule[0].month, 1);
        assert_eq!(schedule[11].balance, 0.0);
        // interest share shrinks as the balance pays down
        assert!(schedule[0].interest > schedule[11].interest);
        assert!(schedule[0].principal < schedule[11].principal);
    }

    #[test]
    fn schedule_rows_reconcile() {
        let schedule = amortization_schedule(&ReferenceEngine, 20_000.0, 7.9, 48).unwrap();
        for row in &schedule {
            assert!(
                (row.principal + row.interest - row.payment).abs() < 0.02,
                "month {} components do not sum to the payment",
                row.month
            );
        }
        let repaid: f64 = schedule.iter().map(|r| r.principal).sum();
        assert!((repaid - 20_000.0).abs() < 1.0);
    }

    #[test]
    fn zero_interest_schedule_is_flat() {
        let schedule = amortization_schedule(&ReferenceEngine, 12_000.0, 0.0, 24).unwrap();
        assert_eq!(schedule[0].interest, 0.0);
        assert_eq!(schedule[0].principal, 500.0);
        assert_eq!(schedule[23].balance, 0.0);
    }

    #[test]
    fn schedule_rejects_engine_level_invalid_inputs() {
        assert!(amortization_schedule(&ReferenceEngine, 10_000.0, 6.0, 0).is_err());
        assert!(amortization_schedule(&ReferenceEngine, 10_000.0, 6.0, 601).is_err());
        assert!(amortization_schedule(&ReferenceEngine, -1.0, 6.0, 12).is_err());
    }
}
