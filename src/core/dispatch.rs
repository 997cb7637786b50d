//! The dual-runtime dispatcher.
//!
//! Loads the accelerated engine at most once per process (memoized via
//! `OnceLock`; a failed load never retries) and routes every public entry
//! point through it, falling back to the reference engine per call when the
//! accelerated engine panics. Callers never observe which engine ran; the
//! diagnostics surface is `engine_mode`/`is_accelerated_runtime_available`.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::OnceLock;

use tracing::{error, info, warn};

use super::accelerated::AcceleratedEngine;
use super::engine::CalcEngine;
use super::estimates;
use super::reference::ReferenceEngine;
use super::types::{
    AffordabilityInputs, AmortizationRow, AutoAffordability, BudgetAllocation, CalcResult, Date,
    DtiAnalysis, EngineMode, IncomeProjection, LoanEstimate, MortgageResult, TaxBreakdown,
    VerdictResult,
};
use super::verdict;

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Set to `reference` to force the reference engine for the whole process.
pub const ENGINE_ENV_VAR: &str = "AFFORD_ENGINE";

static ACCELERATED: OnceLock<Option<AcceleratedEngine>> = OnceLock::new();
static REFERENCE: ReferenceEngine = ReferenceEngine;

fn accelerated() -> Option<&'static AcceleratedEngine> {
    ACCELERATED
        .get_or_init(|| {
            let forced = std::env::var(ENGINE_ENV_VAR)
                .is_ok_and(|v| v.eq_ignore_ascii_case("reference"));
            if forced {
                info!("accelerated engine disabled via {ENGINE_ENV_VAR}");
                return None;
            }
            match AcceleratedEngine::load() {
                Ok(engine) => Some(engine),
                Err(reason) => {
                    warn!(%reason, "accelerated engine failed to load; using reference engine");
                    None
                }
            }
        })
        .as_ref()
}

/// Run `op` on the primary engine, falling back to `fallback` only when the
/// primary panics. A `CalcError` is a contract answer both engines agree on
/// and is returned as-is.
fn run_with_fallback<T>(
    primary: Option<&dyn CalcEngine>,
    fallback: &dyn CalcEngine,
    op: impl Fn(&dyn CalcEngine) -> CalcResult<T>,
) -> CalcResult<T> {
    if let Some(engine) = primary {
        match catch_unwind(AssertUnwindSafe(|| op(engine))) {
            Ok(result) => return result,
            Err(_) => {
                error!(
                    engine = engine.name(),
                    "engine panicked on a dispatched call; falling back for this call (parity risk)"
                );
            }
        }
    }
    op(fallback)
}

fn dispatch<T>(op: impl Fn(&dyn CalcEngine) -> CalcResult<T>) -> CalcResult<T> {
    run_with_fallback(
        accelerated().map(|e| e as &dyn CalcEngine),
        &REFERENCE,
        op,
    )
}

pub fn engine_mode() -> EngineMode {
    if accelerated().is_some() {
        EngineMode::Accelerated
    } else {
        EngineMode::Reference
    }
}

pub fn is_accelerated_runtime_available() -> bool {
    accelerated().is_some()
}

pub fn monthly_payment(principal: f64, apr_percent: f64, term_months: u32) -> CalcResult<f64> {
    dispatch(|e| e.monthly_payment(principal, apr_percent, term_months))
}

pub fn loan_amount_for_payment(
    payment: f64,
    apr_percent: f64,
    term_months: u32,
) -> CalcResult<f64> {
    dispatch(|e| e.loan_amount_for_payment(payment, apr_percent, term_months))
}

pub fn project_income(
    cumulative: f64,
    start: Date,
    check: Date,
) -> CalcResult<Option<IncomeProjection>> {
    dispatch(|e| e.project_income(cumulative, start, check))
}

pub fn analyze_mortgage(
    price: f64,
    down_percent: f64,
    apr_percent: f64,
    term_years: u32,
    property_tax_rate_percent: f64,
    annual_insurance: f64,
) -> CalcResult<MortgageResult> {
    dispatch(|e| {
        e.analyze_mortgage(
            price,
            down_percent,
            apr_percent,
            term_years,
            property_tax_rate_percent,
            annual_insurance,
        )
    })
}

pub fn estimate_taxes(
    gross_annual: f64,
    retirement_percent: f64,
    annual_health_premium: f64,
    state_rate_percent: f64,
) -> CalcResult<TaxBreakdown> {
    dispatch(|e| {
        e.estimate_taxes(
            gross_annual,
            retirement_percent,
            annual_health_premium,
            state_rate_percent,
        )
    })
}

pub fn allocate_budget(net_monthly: f64) -> CalcResult<BudgetAllocation> {
    dispatch(|e| e.allocate_budget(net_monthly))
}

pub fn analyze_dti(
    monthly_income: f64,
    housing_payment: f64,
    other_debts: f64,
) -> CalcResult<DtiAnalysis> {
    dispatch(|e| e.analyze_dti(monthly_income, housing_payment, other_debts))
}

pub fn calculate_affordability(inputs: &AffordabilityInputs) -> CalcResult<VerdictResult> {
    dispatch(|e| verdict::calculate_affordability(e, inputs))
}

pub fn loan_estimates(monthly_payment: f64, term_months: u32) -> CalcResult<Vec<LoanEstimate>> {
    dispatch(|e| estimates::loan_estimates(e, monthly_payment, term_months))
}

pub fn auto_affordability(monthly_income: f64, term_months: u32) -> CalcResult<AutoAffordability> {
    dispatch(|e| estimates::auto_affordability(e, monthly_income, term_months))
}

pub fn amortization_schedule(
    principal: f64,
    apr_percent: f64,
    term_months: u32,
) -> CalcResult<Vec<AmortizationRow>> {
    dispatch(|e| estimates::amortization_schedule(e, principal, apr_percent, term_months))
}
