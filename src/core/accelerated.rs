//! The accelerated engine.
//!
//! Independently written against the same numeric contract as the reference
//! engine: integer exponentiation for the amortization factor, a precomputed
//! cumulative federal tax table, and table-driven budget construction.
//! `load` runs a fixture self-check so a miscompiled or corrupted build
//! surfaces as a load failure instead of silently wrong numbers.

use super::engine::CalcEngine;
use super::types::{
    BudgetAllocation, BudgetCategory, BudgetSlice, CalcError, CalcResult, Date, DtiAnalysis,
    DtiBand, IncomeProjection, MAX_TERM_MONTHS, MAX_TERM_YEARS, MortgageResult, PitiBreakdown,
    TaxBreakdown, round_cents,
};

/// Cumulative 2024 single-filer schedule: (bracket floor, tax owed below the
/// floor, marginal rate above it). Lets the tax lookup run in one pass with
/// no accumulation loop.
const FEDERAL_TAX_TABLE: [(f64, f64, f64); 7] = [
    (0.0, 0.0, 0.10),
    (11_600.0, 1_160.0, 0.12),
    (47_150.0, 5_426.0, 0.22),
    (100_525.0, 17_168.50, 0.24),
    (191_950.0, 39_110.50, 0.32),
    (243_725.0, 55_678.50, 0.35),
    (609_350.0, 183_647.25, 0.37),
];

const STANDARD_DEDUCTION: f64 = 14_600.0;
const SS_WAGE_BASE: f64 = 168_600.0;

const NEEDS_SPLITS: [(&str, f64); 4] = [
    ("Housing", 25.0),
    ("Utilities", 5.0),
    ("Groceries", 10.0),
    ("Transportation", 10.0),
];
const WANTS_SPLITS: [(&str, f64); 4] = [
    ("Dining Out", 5.0),
    ("Subscriptions", 5.0),
    ("Travel/Fun", 10.0),
    ("Personal", 10.0),
];
const SAVINGS_SPLITS: [(&str, f64); 3] =
    [("Emergency Fund", 10.0), ("Investments", 5.0), ("Goals", 5.0)];

pub struct AcceleratedEngine;

impl AcceleratedEngine {
    /// Construct the engine after passing the fixture self-check. A failure
    /// here is a bounded load failure: the dispatcher logs it and stays on
    /// the reference engine.
    pub fn load() -> Result<Self, String> {
        let engine = AcceleratedEngine;
        engine.self_check()?;
        Ok(engine)
    }

    fn self_check(&self) -> Result<(), String> {
        let checks: [(&str, CalcResult<f64>, f64, f64); 4] = [
            (
                "zero-interest payment",
                self.monthly_payment(24_000.0, 0.0, 60),
                400.0,
                0.0,
            ),
            (
                "level payment",
                self.monthly_payment(100_000.0, 6.0, 360),
                599.55,
                0.01,
            ),
            (
                "federal tax bracket boundary",
                Ok(federal_tax(14_600.0 + 47_150.0)),
                5_426.0,
                0.01,
            ),
            (
                "loan amount inverse",
                self.loan_amount_for_payment(599.55, 6.0, 360),
                100_000.0,
                1.0,
            ),
        ];
        for (label, actual, expected, tol) in checks {
            let value = actual.map_err(|e| format!("self-check '{label}' errored: {e}"))?;
            if (value - expected).abs() > tol {
                return Err(format!(
                    "self-check '{label}' produced {value}, expected {expected}"
                ));
            }
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> CalcError {
    CalcError::InvalidInput(msg.to_string())
}

fn check_amount(name: &str, v: f64) -> CalcResult<f64> {
    match v {
        v if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(CalcError::InvalidInput(format!(
            "{name} must be a finite non-negative number"
        ))),
    }
}

fn check_positive(name: &str, v: f64) -> CalcResult<f64> {
    match v {
        v if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(CalcError::InvalidInput(format!(
            "{name} must be a finite positive number"
        ))),
    }
}

fn check_term(term_months: u32) -> CalcResult<u32> {
    match term_months {
        1..=MAX_TERM_MONTHS => Ok(term_months),
        _ => Err(CalcError::InvalidInput(format!(
            "Term must be between 1 and {MAX_TERM_MONTHS} months"
        ))),
    }
}

/// Amortization growth factor (1+r)^n via integer exponentiation.
fn growth_factor(monthly_rate: f64, term_months: u32) -> f64 {
    (1.0 + monthly_rate).powi(term_months as i32)
}

fn federal_tax(gross: f64) -> f64 {
    let taxable = (gross - STANDARD_DEDUCTION).max(0.0);
    for &(floor, base, rate) in FEDERAL_TAX_TABLE.iter().rev() {
        if taxable > floor {
            return base + (taxable - floor) * rate;
        }
    }
    0.0
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn build_category(
    name: &'static str,
    percent: f64,
    net_monthly: f64,
    splits: &[(&'static str, f64)],
) -> BudgetCategory {
    let monthly = net_monthly * percent / 100.0;
    BudgetCategory {
        name,
        percent,
        monthly: round_cents(monthly),
        weekly: round_cents(monthly / 4.33),
        daily: round_cents(monthly / 30.0),
        subcategories: splits
            .iter()
            .map(|&(sub_name, sub_percent)| BudgetSlice {
                name: sub_name,
                percent: sub_percent,
                monthly: round_cents(net_monthly * sub_percent / 100.0),
            })
            .collect(),
    }
}

impl CalcEngine for AcceleratedEngine {
    fn name(&self) -> &'static str {
        "accelerated"
    }

    fn monthly_payment(
        &self,
        principal: f64,
        apr_percent: f64,
        term_months: u32,
    ) -> CalcResult<f64> {
        let principal = check_amount("Principal", principal)?;
        if !apr_percent.is_finite() {
            return Err(invalid("APR must be finite"));
        }
        let term_months = check_term(term_months)?;
        if principal == 0.0 {
            return Ok(0.0);
        }
        if apr_percent <= 0.0 {
            return Ok(principal / term_months as f64);
        }
        let r = apr_percent / 1200.0;
        let factor = growth_factor(r, term_months);
        Ok(round_cents(principal * r * factor / (factor - 1.0)))
    }

    fn loan_amount_for_payment(
        &self,
        payment: f64,
        apr_percent: f64,
        term_months: u32,
    ) -> CalcResult<f64> {
        let payment = check_amount("Payment", payment)?;
        if !apr_percent.is_finite() {
            return Err(invalid("APR must be finite"));
        }
        let term_months = check_term(term_months)?;
        if payment == 0.0 {
            return Ok(0.0);
        }
        let n = term_months as f64;
        if apr_percent <= 0.0 {
            return Ok(round_cents(payment * n));
        }
        let r = apr_percent / 1200.0;
        let factor = growth_factor(r, term_months);
        Ok(round_cents(payment * (factor - 1.0) / (r * factor)))
    }

    fn project_income(
        &self,
        cumulative: f64,
        start: Date,
        check: Date,
    ) -> CalcResult<Option<IncomeProjection>> {
        if !cumulative.is_finite() {
            return Err(invalid("Cumulative income must be finite"));
        }
        if check < start {
            return Ok(None);
        }
        let year_start = Date::new(check.year, 1, 1)?;
        let effective_start = start.max(year_start);
        let days = effective_start.days_until_inclusive(check);
        if days <= 0 || cumulative <= 0.0 {
            return Ok(None);
        }

        let days_f = days as f64;
        let daily = cumulative / days_f;
        let monthly = cumulative * 365.0 / (12.0 * days_f);
        Ok(Some(IncomeProjection {
            days_worked: days,
            daily: round_cents(daily),
            weekly: round_cents(cumulative * 7.0 / days_f),
            monthly: round_cents(monthly),
            annual: round_cents(cumulative * 365.0 / days_f),
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
        let price = check_positive("Home price", price)?;
        if !down_percent.is_finite() || !(0.0..100.0).contains(&down_percent) {
            return Err(invalid("Down payment percent must be between 0 and 100"));
        }
        if !apr_percent.is_finite() {
            return Err(invalid("APR must be finite"));
        }
        if term_years == 0 || term_years > MAX_TERM_YEARS {
            return Err(CalcError::InvalidInput(format!(
                "Loan term must be between 1 and {MAX_TERM_YEARS} years"
            )));
        }
        let tax_rate = check_amount("Property tax rate", property_tax_rate_percent)?;
        let annual_insurance = check_amount("Annual insurance", annual_insurance)?;

        let down_payment = price * down_percent / 100.0;
        let loan_amount = price - down_payment;
        let term_months = term_years * 12;

        let principal_interest =
            round_cents(self.monthly_payment(loan_amount, apr_percent, term_months)?);
        let property_tax = round_cents(price * tax_rate / 1200.0);
        let insurance = round_cents(annual_insurance / 12.0);
        let pmi = match down_percent < 20.0 {
            true => round_cents(loan_amount * 0.005 / 12.0),
            false => 0.0,
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
        let gross = check_positive("Gross income", gross_annual)?;
        if !retirement_percent.is_finite() || !(0.0..=100.0).contains(&retirement_percent) {
            return Err(invalid("Retirement contribution percent must be between 0 and 100"));
        }
        let health = check_amount("Health insurance premium", annual_health_premium)?;
        if !state_rate_percent.is_finite() || !(0.0..=100.0).contains(&state_rate_percent) {
            return Err(invalid("State tax rate must be between 0 and 100"));
        }

        let retirement_401k = gross * retirement_percent / 100.0;
        let agi = (gross - retirement_401k - health).max(0.0);

        let federal = federal_tax(agi);
        let state = agi * state_rate_percent / 100.0;
        let social_security = gross.min(SS_WAGE_BASE) * 0.062;
        let medicare = gross * 0.0145;
        let fica = social_security + medicare;

        let total_deductions = federal + state + fica + retirement_401k + health;
        let net_annual = gross - total_deductions;

        Ok(TaxBreakdown {
            gross_annual: round_cents(gross),
            federal_tax: round_cents(federal),
            state_tax: round_cents(state),
            fica_tax: round_cents(fica),
            social_security: round_cents(social_security),
            medicare: round_cents(medicare),
            retirement_401k: round_cents(retirement_401k),
            health_insurance: round_cents(health),
            total_deductions: round_cents(total_deductions),
            net_annual: round_cents(net_annual),
            net_monthly: round_cents(net_annual / 12.0),
            effective_tax_rate: round_tenth((gross - net_annual) / gross * 100.0),
        })
    }

    fn allocate_budget(&self, net_monthly: f64) -> CalcResult<BudgetAllocation> {
        let net = check_positive("Net monthly income", net_monthly)?;
        Ok(BudgetAllocation {
            net_monthly: round_cents(net),
            needs: build_category("Needs", 50.0, net, &NEEDS_SPLITS),
            wants: build_category("Wants", 30.0, net, &WANTS_SPLITS),
            savings: build_category("Savings", 20.0, net, &SAVINGS_SPLITS),
        })
    }

    fn analyze_dti(
        &self,
        monthly_income: f64,
        housing_payment: f64,
        other_debts: f64,
    ) -> CalcResult<DtiAnalysis> {
        let income = check_positive("Monthly income", monthly_income)?;
        let housing = check_amount("Housing payment", housing_payment)?;
        let debts = check_amount("Other debts", other_debts)?;

        let front = housing / income * 100.0;
        let back = (housing + debts) / income * 100.0;
        let band = match (front <= 28.0 && back <= 36.0, back <= 43.0) {
            (true, _) => DtiBand::Comfortable,
            (false, true) => DtiBand::Marginal,
            (false, false) => DtiBand::Unlikely,
        };

        Ok(DtiAnalysis {
            monthly_income: round_cents(income),
            housing_payment: round_cents(housing),
            other_debts: round_cents(debts),
            front_end_dti: round_tenth(front),
            back_end_dti: round_tenth(back),
            is_affordable: matches!(band, DtiBand::Comfortable),
            band,
            qualification: band.qualification().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn load_self_check_passes() {
        assert!(AcceleratedEngine::load().is_ok());
    }

    #[test]
    fn zero_interest_is_exact_division() {
        let engine = AcceleratedEngine;
        assert_eq!(engine.monthly_payment(24_000.0, 0.0, 60).unwrap(), 400.0);
    }

    #[test]
    fn payment_matches_published_example() {
        let engine = AcceleratedEngine;
        let p = engine.monthly_payment(24_500.0, 7.99, 60).unwrap();
        assert_close(p, 497.0, 2.0);
    }

    #[test]
    fn cumulative_tax_table_matches_bracket_arithmetic() {
        // at each bracket floor the cumulative base must equal the marginal
        // sum of everything below it
        let mut running = 0.0;
        for window in FEDERAL_TAX_TABLE.windows(2) {
            let (floor, base, rate) = window[0];
            let (next_floor, next_base, _) = window[1];
            assert_close(base, running, 1e-9);
            running += (next_floor - floor) * rate;
            assert_close(next_base, running, 1e-9);
        }
    }

    #[test]
    fn federal_tax_spot_values() {
        // $50,000 gross: $35,400 taxable = $1,160 + $23,800 * 12%
        assert_close(federal_tax(50_000.0), 4_016.0, 0.01);
        assert_eq!(federal_tax(10_000.0), 0.0);
        // top bracket engages above $609,350 taxable
        assert_close(
            federal_tax(700_000.0 + STANDARD_DEDUCTION),
            183_647.25 + (700_000.0 - 609_350.0) * 0.37,
            0.01,
        );
    }

    #[test]
    fn income_projection_from_single_division() {
        let engine = AcceleratedEngine;
        let projection = engine
            .project_income(
                45_000.0,
                Date::parse("2026-01-01").unwrap(),
                Date::parse("2026-06-15").unwrap(),
            )
            .unwrap()
            .unwrap();
        assert_eq!(projection.days_worked, 166);
        assert_close(projection.daily, 271.08, 0.01);
        assert_close(projection.annual, 45_000.0 * 365.0 / 166.0, 0.01);
    }

    #[test]
    fn budget_tables_cover_all_subcategories() {
        let engine = AcceleratedEngine;
        let budget = engine.allocate_budget(4_000.0).unwrap();
        assert_eq!(budget.needs.subcategories.len(), 4);
        assert_eq!(budget.wants.subcategories.len(), 4);
        assert_eq!(budget.savings.subcategories.len(), 3);
        let needs_percent: f64 = budget.needs.subcategories.iter().map(|s| s.percent).sum();
        assert_eq!(needs_percent, 50.0);
    }

    #[test]
    fn rejects_the_same_invalid_inputs_as_the_contract() {
        let engine = AcceleratedEngine;
        assert!(engine.monthly_payment(-1.0, 7.9, 60).is_err());
        assert!(engine.monthly_payment(10_000.0, 7.9, 0).is_err());
        assert!(engine.monthly_payment(10_000.0, 7.9, MAX_TERM_MONTHS + 1).is_err());
        assert!(engine.estimate_taxes(0.0, 6.0, 0.0, 5.0).is_err());
        assert!(engine.analyze_dti(0.0, 100.0, 0.0).is_err());
        assert!(engine.analyze_mortgage(300_000.0, 100.0, 6.5, 30, 1.2, 0.0).is_err());
        assert!(engine
            .analyze_mortgage(300_000.0, 20.0, 6.5, 400_000_000, 1.2, 1_500.0)
            .is_err());
    }
}
