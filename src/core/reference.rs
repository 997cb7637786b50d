//! The portable reference engine.
//!
//! Straightforward, readable arithmetic with no shortcuts; this is the
//! implementation the accelerated engine is measured against, and the one
//! every call falls back to.

use super::engine::CalcEngine;
use super::types::{
    BudgetAllocation, BudgetCategory, BudgetSlice, CalcError, CalcResult, Date, DtiAnalysis,
    DtiBand, IncomeProjection, MAX_TERM_MONTHS, MAX_TERM_YEARS, MortgageResult, PitiBreakdown,
    TaxBreakdown, round_cents,
};

/// 2024 federal brackets, single filer: (floor, ceiling, marginal rate).
const TAX_BRACKETS_2024: [(f64, f64, f64); 7] = [
    (0.0, 11_600.0, 0.10),
    (11_600.0, 47_150.0, 0.12),
    (47_150.0, 100_525.0, 0.22),
    (100_525.0, 191_950.0, 0.24),
    (191_950.0, 243_725.0, 0.32),
    (243_725.0, 609_350.0, 0.35),
    (609_350.0, f64::INFINITY, 0.37),
];

const STANDARD_DEDUCTION_2024: f64 = 14_600.0;
const SS_WAGE_BASE_2024: f64 = 168_600.0;
const SS_RATE: f64 = 0.062;
const MEDICARE_RATE: f64 = 0.0145;

/// PMI runs about 0.5% of the loan amount annually when down < 20%.
const PMI_ANNUAL_RATE: f64 = 0.005;

pub struct ReferenceEngine;

fn ensure_amount(name: &str, value: f64) -> CalcResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(CalcError::InvalidInput(format!(
            "{name} must be a finite non-negative number"
        )));
    }
    Ok(())
}

fn ensure_positive(name: &str, value: f64) -> CalcResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(CalcError::InvalidInput(format!(
            "{name} must be a finite positive number"
        )));
    }
    Ok(())
}

fn ensure_term(term_months: u32) -> CalcResult<()> {
    if term_months == 0 || term_months > MAX_TERM_MONTHS {
        return Err(CalcError::InvalidInput(format!(
            "Term must be between 1 and {MAX_TERM_MONTHS} months"
        )));
    }
    Ok(())
}

fn ensure_percent(name: &str, value: f64) -> CalcResult<()> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(CalcError::InvalidInput(format!(
            "{name} must be between 0 and 100"
        )));
    }
    Ok(())
}

/// Level-payment formula, unrounded. Callers decide the rounding step.
fn level_payment(principal: f64, apr_percent: f64, term_months: u32) -> f64 {
    let n = term_months as f64;
    if apr_percent <= 0.0 {
        return principal / n;
    }
    let r = apr_percent / 100.0 / 12.0;
    let factor = (1.0 + r).powf(n);
    principal * r * factor / (factor - 1.0)
}

fn federal_tax(gross: f64) -> f64 {
    let taxable = (gross - STANDARD_DEDUCTION_2024).max(0.0);
    let mut tax = 0.0;
    let mut remaining = taxable;
    for (floor, ceiling, rate) in TAX_BRACKETS_2024 {
        if remaining <= 0.0 {
            break;
        }
        let in_bracket = remaining.min(ceiling - floor);
        tax += in_bracket * rate;
        remaining -= in_bracket;
    }
    tax
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

impl CalcEngine for ReferenceEngine {
    fn name(&self) -> &'static str {
        "reference"
    }

    fn monthly_payment(
        &self,
        principal: f64,
        apr_percent: f64,
        term_months: u32,
    ) -> CalcResult<f64> {
        ensure_amount("Principal", principal)?;
        if !apr_percent.is_finite() {
            return Err(CalcError::InvalidInput("APR must be finite".to_string()));
        }
        ensure_term(term_months)?;
        if principal == 0.0 {
            return Ok(0.0);
        }
        // Zero-interest stays exact simple division, no rounding.
        if apr_percent <= 0.0 {
            return Ok(principal / term_months as f64);
        }
        Ok(round_cents(level_payment(principal, apr_percent, term_months)))
    }

    fn loan_amount_for_payment(
        &self,
        payment: f64,
        apr_percent: f64,
        term_months: u32,
    ) -> CalcResult<f64> {
        ensure_amount("Payment", payment)?;
        if !apr_percent.is_finite() {
            return Err(CalcError::InvalidInput("APR must be finite".to_string()));
        }
        ensure_term(term_months)?;
        if payment == 0.0 {
            return Ok(0.0);
        }
        let n = term_months as f64;
        if apr_percent <= 0.0 {
            return Ok(round_cents(payment * n));
        }
        let r = apr_percent / 100.0 / 12.0;
        let principal = payment * (1.0 - (1.0 + r).powf(-n)) / r;
        Ok(round_cents(principal))
    }

    fn project_income(
        &self,
        cumulative: f64,
        start: Date,
        check: Date,
    ) -> CalcResult<Option<IncomeProjection>> {
        if !cumulative.is_finite() {
            return Err(CalcError::InvalidInput(
                "Cumulative income must be finite".to_string(),
            ));
        }
        if check < start {
            return Ok(None);
        }
        let year_start = Date::new(check.year, 1, 1)?;
        let effective_start = if start > year_start { start } else { year_start };
        let days = effective_start.days_until_inclusive(check);
        if days <= 0 || cumulative <= 0.0 {
            return Ok(None);
        }

        // Every rate derives from the one unrounded daily figure; rounding
        // happens only on the output fields.
        let daily = cumulative / days as f64;
        let monthly = daily * 365.0 / 12.0;
        Ok(Some(IncomeProjection {
            days_worked: days,
            daily: round_cents(daily),
            weekly: round_cents(daily * 7.0),
            monthly: round_cents(monthly),
            annual: round_cents(daily * 365.0),
            max_auto_payment: round_cents(monthly * 0.12),
            max_rent: round_cents(monthly * 0.30),
        }))
    }

    fn analyze_mortgage(
        &self,
        price: f64,
        down_percent: f64,
        apr_percent: f64,
        term_years: u32,
        property_tax_rate_percent: f64,
        annual_insurance: f64,
    ) -> CalcResult<MortgageResult> {
        ensure_positive("Home price", price)?;
        if !down_percent.is_finite() || down_percent < 0.0 || down_percent >= 100.0 {
            return Err(CalcError::InvalidInput(
                "Down payment percent must be between 0 and 100".to_string(),
            ));
        }
        if !apr_percent.is_finite() {
            return Err(CalcError::InvalidInput("APR must be finite".to_string()));
        }
        if term_years == 0 || term_years > MAX_TERM_YEARS {
            return Err(CalcError::InvalidInput(format!(
                "Loan term must be between 1 and {MAX_TERM_YEARS} years"
            )));
        }
        ensure_amount("Property tax rate", property_tax_rate_percent)?;
        ensure_amount("Annual insurance", annual_insurance)?;

        let down_payment = price * down_percent / 100.0;
        let loan_amount = price - down_payment;
        let term_months = term_years * 12;

        let principal_interest =
            round_cents(self.monthly_payment(loan_amount, apr_percent, term_months)?);
        let property_tax = round_cents(price * property_tax_rate_percent / 100.0 / 12.0);
        let insurance = round_cents(annual_insurance / 12.0);
        let pmi = if down_percent < 20.0 {
            round_cents(loan_amount * PMI_ANNUAL_RATE / 12.0)
        } else {
            0.0
        };
        let total_monthly = round_cents(principal_interest + property_tax + insurance + pmi);

        let total_payments = round_cents(principal_interest * term_months as f64);
        let total_interest = round_cents((total_payments - loan_amount).max(0.0));

        Ok(MortgageResult {
            home_price: price,
            down_payment: round_cents(down_payment),
            down_payment_percent: down_percent,
            loan_amount: round_cents(loan_amount),
            apr_percent,
            term_years,
            piti: PitiBreakdown {
                principal_interest,
                property_tax,
                insurance,
                pmi,
                total_monthly,
            },
            total_payments,
            total_interest,
        })
    }

    fn estimate_taxes(
        &self,
        gross_annual: f64,
        retirement_percent: f64,
        annual_health_premium: f64,
        state_rate_percent: f64,
    ) -> CalcResult<TaxBreakdown> {
        ensure_positive("Gross income", gross_annual)?;
        ensure_percent("Retirement contribution percent", retirement_percent)?;
        ensure_amount("Health insurance premium", annual_health_premium)?;
        ensure_percent("State tax rate", state_rate_percent)?;

        let retirement_401k = gross_annual * retirement_percent / 100.0;
        let agi = (gross_annual - retirement_401k - annual_health_premium).max(0.0);

        let federal = federal_tax(agi);
        let state = agi * state_rate_percent / 100.0;

        // FICA applies to gross wages, before pre-tax deductions.
        let social_security = gross_annual.min(SS_WAGE_BASE_2024) * SS_RATE;
        let medicare = gross_annual * MEDICARE_RATE;
        let fica = social_security + medicare;

        let total_deductions = federal + state + fica + retirement_401k + annual_health_premium;
        let net_annual = gross_annual - total_deductions;
        let effective_tax_rate = (gross_annual - net_annual) / gross_annual * 100.0;

        Ok(TaxBreakdown {
            gross_annual: round_cents(gross_annual),
            federal_tax: round_cents(federal),
            state_tax: round_cents(state),
            fica_tax: round_cents(fica),
            social_security: round_cents(social_security),
            medicare: round_cents(medicare),
            retirement_401k: round_cents(retirement_401k),
            health_insurance: round_cents(annual_health_premium),
            total_deductions: round_cents(total_deductions),
            net_annual: round_cents(net_annual),
            net_monthly: round_cents(net_annual / 12.0),
            effective_tax_rate: round_tenth(effective_tax_rate),
        })
    }

    fn allocate_budget(&self, net_monthly: f64) -> CalcResult<BudgetAllocation> {
        ensure_positive("Net monthly income", net_monthly)?;

        let needs_monthly = net_monthly * 0.50;
        let needs = BudgetCategory {
            name: "Needs",
            percent: 50.0,
            monthly: round_cents(needs_monthly),
            weekly: round_cents(needs_monthly / 4.33),
            daily: round_cents(needs_monthly / 30.0),
            subcategories: vec![
                BudgetSlice {
                    name: "Housing",
                    percent: 25.0,
                    monthly: round_cents(net_monthly * 0.25),
                },
                BudgetSlice {
                    name: "Utilities",
                    percent: 5.0,
                    monthly: round_cents(net_monthly * 0.05),
                },
                BudgetSlice {
                    name: "Groceries",
                    percent: 10.0,
                    monthly: round_cents(net_monthly * 0.10),
                },
                BudgetSlice {
                    name: "Transportation",
                    percent: 10.0,
                    monthly: round_cents(net_monthly * 0.10),
                },
            ],
        };

        let wants_monthly = net_monthly * 0.30;
        let wants = BudgetCategory {
            name: "Wants",
            percent: 30.0,
            monthly: round_cents(wants_monthly),
            weekly: round_cents(wants_monthly / 4.33),
            daily: round_cents(wants_monthly / 30.0),
            subcategories: vec![
                BudgetSlice {
                    name: "Dining Out",
                    percent: 5.0,
                    monthly: round_cents(net_monthly * 0.05),
                },
                BudgetSlice {
                    name: "Subscriptions",
                    percent: 5.0,
                    monthly: round_cents(net_monthly * 0.05),
                },
                BudgetSlice {
                    name: "Travel/Fun",
                    percent: 10.0,
                    monthly: round_cents(net_monthly * 0.10),
                },
                BudgetSlice {
                    name: "Personal",
                    percent: 10.0,
                    monthly: round_cents(net_monthly * 0.10),
                },
            ],
        };

        let savings_monthly = net_monthly * 0.20;
        let savings = BudgetCategory {
            name: "Savings",
            percent: 20.0,
            monthly: round_cents(savings_monthly),
            weekly: round_cents(savings_monthly / 4.33),
            daily: round_cents(savings_monthly / 30.0),
            subcategories: vec![
                BudgetSlice {
                    name: "Emergency Fund",
                    percent: 10.0,
                    monthly: round_cents(net_monthly * 0.10),
                },
                BudgetSlice {
                    name: "Investments",
                    percent: 5.0,
                    monthly: round_cents(net_monthly * 0.05),
                },
                BudgetSlice {
                    name: "Goals",
                    percent: 5.0,
                    monthly: round_cents(net_monthly * 0.05),
                },
            ],
        };

        Ok(BudgetAllocation {
            net_monthly: round_cents(net_monthly),
            needs,
            wants,
            savings,
        })
    }

    fn analyze_dti(
        &self,
        monthly_income: f64,
        housing_payment: f64,
        other_debts: f64,
    ) -> CalcResult<DtiAnalysis> {
        ensure_positive("Monthly income", monthly_income)?;
        ensure_amount("Housing payment", housing_payment)?;
        ensure_amount("Other debts", other_debts)?;

        let front = housing_payment / monthly_income * 100.0;
        let back = (housing_payment + other_debts) / monthly_income * 100.0;

        let band = if front <= 28.0 && back <= 36.0 {
            DtiBand::Comfortable
        } else if back <= 43.0 {
            DtiBand::Marginal
        } else {
            DtiBand::Unlikely
        };

        Ok(DtiAnalysis {
            monthly_income: round_cents(monthly_income),
            housing_payment: round_cents(housing_payment),
            other_debts: round_cents(other_debts),
            front_end_dti: round_tenth(front),
            back_end_dti: round_tenth(back),
            is_affordable: band == DtiBand::Comfortable,
            band,
            qualification: band.qualification().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}"
        );
    }

    fn date(text: &str) -> Date {
        Date::parse(text).unwrap()
    }

    #[test]
    fn payment_matches_published_example() {
        // $24,500 at 7.99% over 60 months lands near $497/month
        let p = ReferenceEngine.monthly_payment(24_500.0, 7.99, 60).unwrap();
        assert_close(p, 497.0, 2.0);
    }

    #[test]
    fn zero_interest_is_exact_division() {
        let p = ReferenceEngine.monthly_payment(24_000.0, 0.0, 60).unwrap();
        assert_eq!(p, 400.0);
        let p = ReferenceEngine.monthly_payment(10_000.0, 0.0, 36).unwrap();
        assert_eq!(p, 10_000.0 / 36.0);
    }

    #[test]
    fn zero_principal_pays_zero() {
        assert_eq!(ReferenceEngine.monthly_payment(0.0, 7.9, 60).unwrap(), 0.0);
    }

    #[test]
    fn rejects_invalid_loan_inputs() {
        assert!(ReferenceEngine.monthly_payment(-1.0, 7.9, 60).is_err());
        assert!(ReferenceEngine.monthly_payment(f64::NAN, 7.9, 60).is_err());
        assert!(ReferenceEngine.monthly_payment(10_000.0, f64::INFINITY, 60).is_err());
        assert!(ReferenceEngine.monthly_payment(10_000.0, 7.9, 0).is_err());
        assert!(ReferenceEngine.monthly_payment(10_000.0, 7.9, 601).is_err());
        assert!(ReferenceEngine.loan_amount_for_payment(450.0, 6.9, 601).is_err());
    }

    #[test]
    fn mortgage_rejects_absurd_terms() {
        // term_years * 12 must never be allowed to overflow
        assert!(ReferenceEngine
            .analyze_mortgage(300_000.0, 20.0, 6.5, 400_000_000, 1.2, 1_500.0)
            .is_err());
        assert!(ReferenceEngine
            .analyze_mortgage(300_000.0, 20.0, 6.5, 51, 1.2, 1_500.0)
            .is_err());
        assert!(ReferenceEngine
            .analyze_mortgage(300_000.0, 20.0, 6.5, 50, 1.2, 1_500.0)
            .is_ok());
    }

    #[test]
    fn loan_amount_round_trips() {
        let loan = ReferenceEngine
            .loan_amount_for_payment(450.0, 6.9, 60)
            .unwrap();
        let payment = ReferenceEngine.monthly_payment(loan, 6.9, 60).unwrap();
        assert_close(payment, 450.0, 0.02);
    }

    #[test]
    fn income_projection_matches_scenario() {
        let projection = ReferenceEngine
            .project_income(45_000.0, date("2026-01-01"), date("2026-06-15"))
            .unwrap()
            .unwrap();
        assert_eq!(projection.days_worked, 166);
        assert_close(projection.daily, 271.08, 0.01);
        assert_close(projection.annual, 45_000.0 / 166.0 * 365.0, 0.01);
        assert_close(projection.weekly, 271.0843 * 7.0, 0.02);
        assert_close(projection.monthly, projection.annual / 12.0, 0.02);
        assert_close(projection.max_auto_payment, projection.monthly * 0.12, 0.02);
        assert_close(projection.max_rent, projection.monthly * 0.30, 0.02);
    }

    #[test]
    fn income_start_clamps_to_january_first() {
        let projection = ReferenceEngine
            .project_income(50_000.0, date("2023-06-01"), date("2024-06-30"))
            .unwrap()
            .unwrap();
        assert_eq!(projection.days_worked, 182);
    }

    #[test]
    fn income_not_computable_states() {
        let eng = ReferenceEngine;
        assert!(eng
            .project_income(45_000.0, date("2026-06-15"), date("2026-01-01"))
            .unwrap()
            .is_none());
        assert!(eng
            .project_income(0.0, date("2026-01-01"), date("2026-06-15"))
            .unwrap()
            .is_none());
        assert!(eng
            .project_income(-500.0, date("2026-01-01"), date("2026-06-15"))
            .unwrap()
            .is_none());
        assert!(eng
            .project_income(f64::NAN, date("2026-01-01"), date("2026-06-15"))
            .is_err());
    }

    #[test]
    fn mortgage_without_pmi_at_twenty_percent_down() {
        let result = ReferenceEngine
            .analyze_mortgage(300_000.0, 20.0, 6.5, 30, 1.2, 1_500.0)
            .unwrap();
        assert_eq!(result.piti.pmi, 0.0);
        assert_eq!(result.loan_amount, 240_000.0);
        assert_close(result.piti.principal_interest, 1_516.96, 1.0);
        assert!(result.total_interest > 0.0);
    }

    #[test]
    fn mortgage_with_pmi_below_twenty_percent_down() {
        let result = ReferenceEngine
            .analyze_mortgage(300_000.0, 10.0, 6.5, 30, 1.2, 1_500.0)
            .unwrap();
        assert!(result.piti.pmi > 0.0);
        // 0.5% of the loan annually
        assert_close(result.piti.pmi, 270_000.0 * 0.005 / 12.0, 0.01);
    }

    #[test]
    fn piti_components_sum_to_total() {
        let result = ReferenceEngine
            .analyze_mortgage(412_345.0, 12.5, 6.875, 30, 1.1, 1_800.0)
            .unwrap();
        let sum = result.piti.principal_interest
            + result.piti.property_tax
            + result.piti.insurance
            + result.piti.pmi;
        assert_close(result.piti.total_monthly, sum, 0.005 + EPS);
    }

    #[test]
    fn federal_tax_middle_income() {
        // $50,000 - $14,600 deduction = $35,400 taxable:
        // $11,600 at 10% + $23,800 at 12% = $4,016
        assert_close(federal_tax(50_000.0), 4_016.0, 0.01);
    }

    #[test]
    fn federal_tax_below_deduction_is_zero() {
        assert_eq!(federal_tax(10_000.0), 0.0);
    }

    #[test]
    fn social_security_caps_at_wage_base() {
        let result = ReferenceEngine
            .estimate_taxes(200_000.0, 0.0, 0.0, 0.0)
            .unwrap();
        assert_close(result.social_security, 168_600.0 * 0.062, 0.01);
        // Medicare is uncapped
        assert_close(result.medicare, 200_000.0 * 0.0145, 0.01);
    }

    #[test]
    fn tax_breakdown_is_internally_consistent() {
        let result = ReferenceEngine
            .estimate_taxes(60_000.0, 6.0, 2_400.0, 5.0)
            .unwrap();
        assert_close(result.retirement_401k, 3_600.0, 0.01);
        assert!(result.net_annual < result.gross_annual);
        assert_close(result.fica_tax, result.social_security + result.medicare, 0.01);
        assert_close(
            result.net_annual,
            result.gross_annual - result.total_deductions,
            0.02,
        );
        assert_close(
            result.effective_tax_rate,
            (result.gross_annual - result.net_annual) / result.gross_annual * 100.0,
            0.1,
        );
        assert!(result.effective_tax_rate < 50.0);
    }

    #[test]
    fn budget_categories_split_fifty_thirty_twenty() {
        let budget = ReferenceEngine.allocate_budget(4_000.0).unwrap();
        assert_eq!(budget.needs.monthly, 2_000.0);
        assert_eq!(budget.wants.monthly, 1_200.0);
        assert_eq!(budget.savings.monthly, 800.0);
        assert_eq!(budget.needs.subcategories.len(), 4);
        assert_eq!(budget.wants.subcategories.len(), 4);
        assert_eq!(budget.savings.subcategories.len(), 3);
    }

    #[test]
    fn dti_marginal_band_scenario() {
        let result = ReferenceEngine.analyze_dti(6_000.0, 1_800.0, 500.0).unwrap();
        assert_eq!(result.front_end_dti, 30.0);
        assert_close(result.back_end_dti, 38.3, 0.05);
        assert_eq!(result.band, DtiBand::Marginal);
        assert!(!result.is_affordable);
        assert!(result.qualification.contains("43%"));
    }

    #[test]
    fn dti_comfortable_band() {
        let result = ReferenceEngine.analyze_dti(8_000.0, 2_000.0, 500.0).unwrap();
        assert_eq!(result.front_end_dti, 25.0);
        assert_eq!(result.band, DtiBand::Comfortable);
        assert!(result.is_affordable);
    }

    #[test]
    fn dti_unlikely_band() {
        let result = ReferenceEngine.analyze_dti(4_000.0, 1_800.0, 500.0).unwrap();
        assert_eq!(result.band, DtiBand::Unlikely);
        assert!(!result.is_affordable);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(256))]

        #[test]
        fn zero_interest_payment_is_exact(
            principal in 1.0..2_000_000.0f64,
            term in 1u32..480,
        ) {
            let p = ReferenceEngine.monthly_payment(principal, 0.0, term).unwrap();
            prop_assert_eq!(p, principal / term as f64);
        }

        #[test]
        fn payment_round_trip(
            payment in 50.0..5_000.0f64,
            apr in 0.1..25.0f64,
            term in 6u32..120,
        ) {
            let loan = ReferenceEngine.loan_amount_for_payment(payment, apr, term).unwrap();
            let back = ReferenceEngine.monthly_payment(loan, apr, term).unwrap();
            prop_assert!((back - payment).abs() < 0.02, "expected {}, got {}", payment, back);
        }

        #[test]
        fn federal_tax_is_monotonic(
            gross in 1_000.0..800_000.0f64,
            delta in 1.0..50_000.0f64,
        ) {
            prop_assert!(federal_tax(gross + delta) >= federal_tax(gross));
        }

        #[test]
        fn income_projection_scales_linearly(
            cumulative in 100.0..500_000.0f64,
            days_offset in 0i64..300,
        ) {
            let start = date("2026-01-01");
            let month = (days_offset / 28) as u32 % 12 + 1;
            let day = (days_offset % 28) as u32 + 1;
            let check = Date::new(2026, month, day).unwrap();
            prop_assume!(check >= start);

            let one = ReferenceEngine.project_income(cumulative, start, check).unwrap().unwrap();
            let two = ReferenceEngine.project_income(2.0 * cumulative, start, check).unwrap().unwrap();
            prop_assert!((two.annual - 2.0 * one.annual).abs() < 0.05);
            prop_assert!((two.daily - 2.0 * one.daily).abs() < 0.05);
        }

        #[test]
        fn budget_sums_hold(net in 100.0..100_000.0f64) {
            let budget = ReferenceEngine.allocate_budget(net).unwrap();
            let total = budget.needs.monthly + budget.wants.monthly + budget.savings.monthly;
            prop_assert!((total - net).abs() < 0.05);

            for category in [&budget.needs, &budget.wants, &budget.savings] {
                let sub_total: f64 = category.subcategories.iter().map(|s| s.monthly).sum();
                prop_assert!(
                    (sub_total - category.monthly).abs() < 0.05,
                    "{} subcategories sum {} vs {}", category.name, sub_total, category.monthly
                );
            }
        }

        #[test]
        fn pmi_threshold_is_hard(
            price in 50_000.0..2_000_000.0f64,
            down in 0.0..99.0f64,
        ) {
            let result = ReferenceEngine
                .analyze_mortgage(price, down, 6.5, 30, 1.2, 1_500.0)
                .unwrap();
            if down < 20.0 {
                prop_assert!(result.piti.pmi > 0.0);
            } else {
                prop_assert_eq!(result.piti.pmi, 0.0);
            }
        }
    }
}
