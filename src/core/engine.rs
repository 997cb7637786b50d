use super::types::{
    BudgetAllocation, CalcResult, Date, DtiAnalysis, IncomeProjection, MortgageResult,
    TaxBreakdown,
};

/// The numeric contract shared by the accelerated and reference engines.
///
/// Both implementers must agree to the cent across the full valid input
/// domain, and must apply the identical input policy: non-finite values and
/// negative values where a quantity cannot be negative are rejected with
/// `CalcError::InvalidInput`; a missing-or-empty interactive state (no check
/// date yet, zero cumulative income) is `Ok(None)`, never an error.
pub trait CalcEngine: Send + Sync {
    fn name(&self) -> &'static str;

    /// Level-payment loan math. Zero principal pays zero; a rate of zero or
    /// below degenerates to exact simple division principal/term. Terms
    /// outside 1..=`MAX_TERM_MONTHS` are rejected.
    fn monthly_payment(&self, principal: f64, apr_percent: f64, term_months: u32)
    -> CalcResult<f64>;

    /// Inverse of `monthly_payment`: the principal a given payment services.
    fn loan_amount_for_payment(
        &self,
        payment: f64,
        apr_percent: f64,
        term_months: u32,
    ) -> CalcResult<f64>;

    /// Annualize a partial-year cumulative income figure. Income earned
    /// before January 1 of the check year never counts.
    fn project_income(
        &self,
        cumulative: f64,
        start: Date,
        check: Date,
    ) -> CalcResult<Option<IncomeProjection>>;

    /// Full PITI breakdown. PMI applies iff the down payment is under 20%.
    /// Terms outside 1..=`MAX_TERM_YEARS` are rejected.
    fn analyze_mortgage(
        &self,
        price: f64,
        down_percent: f64,
        apr_percent: f64,
        term_years: u32,
        property_tax_rate_percent: f64,
        annual_insurance: f64,
    ) -> CalcResult<MortgageResult>;

    /// 2024 single-filer brackets, FICA with the Social Security wage-base
    /// cap, flat-rate state tax on AGI.
    fn estimate_taxes(
        &self,
        gross_annual: f64,
        retirement_percent: f64,
        annual_health_premium: f64,
        state_rate_percent: f64,
    ) -> CalcResult<TaxBreakdown>;

    /// 50/30/20 allocation with fixed subcategory splits.
    fn allocate_budget(&self, net_monthly: f64) -> CalcResult<BudgetAllocation>;

    /// Front-end and back-end debt-to-income ratios with the 28/36/43
    /// qualification bands.
    fn analyze_dti(
        &self,
        monthly_income: f64,
        housing_payment: f64,
        other_debts: f64,
    ) -> CalcResult<DtiAnalysis>;
}
