mod accelerated;
mod dispatch;
mod engine;
mod estimates;
mod fmt;
mod reference;
mod types;
mod verdict;

pub use dispatch::{
    allocate_budget, amortization_schedule, analyze_dti, analyze_mortgage, auto_affordability,
    calculate_affordability, engine_mode, estimate_taxes, is_accelerated_runtime_available,
    loan_amount_for_payment, loan_estimates, monthly_payment, project_income, ENGINE_VERSION,
};
pub use engine::CalcEngine;
pub use estimates::payment_approvals;
pub use fmt::{format_currency, format_percent};
pub use types::{
    credit_tier_for, AffordabilityInputs, AmortizationRow, AutoAffordability, BudgetAllocation,
    BudgetCategory, BudgetSlice, CalcError, CalcResult, CreditTier, Date, DtiAnalysis, DtiBand,
    EngineMode, Impact, IncomeProjection, LoanEstimate, MortgageResult, PaymentApproval,
    PitiBreakdown, ScenarioOutcome, Scenarios, StressDriver, StressDriverKind, TaxBreakdown,
    VerdictLevel, VerdictResult, CREDIT_TIERS, MAX_TERM_MONTHS, MAX_TERM_YEARS,
};
