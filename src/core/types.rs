use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by the calculation engines.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type CalcResult<T> = Result<T, CalcError>;

/// Round to the nearest cent. Internal math stays unrounded; this is the
/// explicit rounding step applied at function outputs.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Longest supported amortization. Terms beyond 50 years are rejected by
/// both engines; the bound is shared so rejection behavior stays identical.
pub const MAX_TERM_MONTHS: u32 = 600;
pub const MAX_TERM_YEARS: u32 = 50;

const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 2100;

/// A calendar date, valid between 1900-01-01 and 2100-12-31.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct Date {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl Date {
    pub fn new(year: i32, month: u32, day: u32) -> CalcResult<Self> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(CalcError::InvalidInput(format!(
                "Year {year} out of supported range {MIN_YEAR}-{MAX_YEAR}"
            )));
        }
        if !(1..=12).contains(&month) {
            return Err(CalcError::InvalidInput(format!("Invalid month: {month}")));
        }
        if day < 1 || day > days_in_month(year, month) {
            return Err(CalcError::InvalidInput(format!(
                "Invalid day {day} for {year}-{month:02}"
            )));
        }
        Ok(Self { year, month, day })
    }

    /// Parse an ISO 8601 date string (YYYY-MM-DD).
    pub fn parse(text: &str) -> CalcResult<Self> {
        let parts: Vec<&str> = text.split('-').collect();
        if parts.len() != 3 {
            return Err(CalcError::InvalidInput(format!(
                "Invalid date format: {text}. Expected YYYY-MM-DD"
            )));
        }
        let year = parts[0]
            .parse::<i32>()
            .map_err(|_| CalcError::InvalidInput(format!("Invalid year: {}", parts[0])))?;
        let month = parts[1]
            .parse::<u32>()
            .map_err(|_| CalcError::InvalidInput(format!("Invalid month: {}", parts[1])))?;
        let day = parts[2]
            .parse::<u32>()
            .map_err(|_| CalcError::InvalidInput(format!("Invalid day: {}", parts[2])))?;
        Self::new(year, month, day)
    }

    /// Julian day number; monotone in calendar order, so comparisons and
    /// day arithmetic reduce to integer subtraction.
    pub fn day_number(self) -> i64 {
        let a = (14 - self.month as i64) / 12;
        let y = self.year as i64 + 4800 - a;
        let m = self.month as i64 + 12 * a - 3;
        self.day as i64 + (153 * m + 2) / 5 + 365 * y + y / 4 - y / 100 + y / 400 - 32045
    }

    /// Inclusive day count from self to `end` (same day counts as 1).
    pub fn days_until_inclusive(self, end: Date) -> i64 {
        end.day_number() - self.day_number() + 1
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

/// A credit tier with its APR envelope, in annual percent.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditTier {
    pub id: &'static str,
    pub label: &'static str,
    pub score_range: &'static str,
    pub apr_low: f64,
    pub apr_high: f64,
    pub apr_typical: f64,
}

/// Fixed read-only tier catalog. Not user-editable.
pub const CREDIT_TIERS: [CreditTier; 5] = [
    CreditTier {
        id: "excellent",
        label: "Excellent",
        score_range: "750+",
        apr_low: 4.9,
        apr_high: 6.9,
        apr_typical: 5.9,
    },
    CreditTier {
        id: "good",
        label: "Good",
        score_range: "700-749",
        apr_low: 6.4,
        apr_high: 9.4,
        apr_typical: 7.9,
    },
    CreditTier {
        id: "fair",
        label: "Fair",
        score_range: "650-699",
        apr_low: 9.9,
        apr_high: 13.9,
        apr_typical: 11.9,
    },
    CreditTier {
        id: "poor",
        label: "Needs Work",
        score_range: "550-649",
        apr_low: 13.9,
        apr_high: 19.9,
        apr_typical: 16.9,
    },
    CreditTier {
        id: "rebuilding",
        label: "Rebuilding",
        score_range: "Below 550",
        apr_low: 17.9,
        apr_high: 25.9,
        apr_typical: 21.9,
    },
];

/// Look up a tier by id; unknown ids fall back to "good".
pub fn credit_tier_for(id: &str) -> &'static CreditTier {
    CREDIT_TIERS
        .iter()
        .find(|t| t.id == id)
        .unwrap_or(&CREDIT_TIERS[1])
}

/// Annualized income rates projected from a partial-year cumulative figure.
/// All four rates derive from the single daily rate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeProjection {
    pub days_worked: i64,
    pub daily: f64,
    pub weekly: f64,
    pub monthly: f64,
    pub annual: f64,
    /// Recommended auto payment ceiling (12% of monthly)
    pub max_auto_payment: f64,
    /// Recommended rent ceiling (30% of monthly)
    pub max_rent: f64,
}

/// Principal+interest, taxes, insurance, PMI. Components sum exactly to
/// `total_monthly`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PitiBreakdown {
    pub principal_interest: f64,
    pub property_tax: f64,
    pub insurance: f64,
    pub pmi: f64,
    pub total_monthly: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgageResult {
    pub home_price: f64,
    pub down_payment: f64,
    pub down_payment_percent: f64,
    pub loan_amount: f64,
    pub apr_percent: f64,
    pub term_years: u32,
    pub piti: PitiBreakdown,
    pub total_payments: f64,
    pub total_interest: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBreakdown {
    pub gross_annual: f64,
    pub federal_tax: f64,
    pub state_tax: f64,
    pub fica_tax: f64,
    pub social_security: f64,
    pub medicare: f64,
    pub retirement_401k: f64,
    pub health_insurance: f64,
    pub total_deductions: f64,
    pub net_annual: f64,
    pub net_monthly: f64,
    /// (gross - net) / gross, in percent
    pub effective_tax_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSlice {
    pub name: &'static str,
    pub percent: f64,
    pub monthly: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetCategory {
    pub name: &'static str,
    pub percent: f64,
    pub monthly: f64,
    pub weekly: f64,
    pub daily: f64,
    pub subcategories: Vec<BudgetSlice>,
}

/// 50/30/20 allocation of net monthly income.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetAllocation {
    pub net_monthly: f64,
    pub needs: BudgetCategory,
    pub wants: BudgetCategory,
    pub savings: BudgetCategory,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DtiBand {
    Comfortable,
    Marginal,
    Unlikely,
}

impl DtiBand {
    /// Qualification copy quoted by external consumers; the 28/36/43 cut
    /// points must appear verbatim.
    pub fn qualification(self) -> &'static str {
        match self {
            DtiBand::Comfortable => {
                "Qualifies comfortably - within the 28% front-end / 36% back-end guidelines"
            }
            DtiBand::Marginal => {
                "Marginal - back-end under 43%, may qualify with compensating factors"
            }
            DtiBand::Unlikely => "Unlikely to qualify - back-end above the 43% guideline",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DtiAnalysis {
    pub monthly_income: f64,
    pub housing_payment: f64,
    pub other_debts: f64,
    pub front_end_dti: f64,
    pub back_end_dti: f64,
    /// Within the 28% front-end / 36% back-end guidelines
    pub is_affordable: bool,
    pub band: DtiBand,
    pub qualification: String,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictLevel {
    Comfortable,
    Tight,
    Risky,
}

/// The fixed cut points behind the verdict classification. Collected here so
/// the ordered checks read from a single source of truth.
#[derive(Copy, Clone, Debug)]
pub struct VerdictThresholds {
    /// Payment as % of gross income: under this = comfortable
    pub payment_comfortable: f64,
    /// 8-12% = tight, above = risky
    pub payment_tight: f64,
    /// Back-end DTI including the new payment: under this = comfortable
    pub dti_comfortable: f64,
    /// 36-43% = tight, above = risky
    pub dti_tight: f64,
    /// Monthly margin after obligations: this or more = comfortable
    pub margin_comfortable: f64,
    /// $200-500 = tight, under = risky
    pub margin_tight: f64,
}

pub const THRESHOLDS: VerdictThresholds = VerdictThresholds {
    payment_comfortable: 8.0,
    payment_tight: 12.0,
    dti_comfortable: 36.0,
    dti_tight: 43.0,
    margin_comfortable: 500.0,
    margin_tight: 200.0,
};

#[derive(Debug, Clone)]
pub struct AffordabilityInputs {
    pub vehicle_price: f64,
    pub down_payment: f64,
    pub credit_tier_id: String,
    pub term_months: u32,
    /// Overrides the tier's typical APR when the buyer has a real quote
    pub apr_override: Option<f64>,
    pub gross_monthly_income: f64,
    pub net_monthly_income: Option<f64>,
    /// Rent, child support, minimum debt payments, and the like
    pub fixed_obligations: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StressDriverKind {
    InterestRate,
    TermLength,
    DownPayment,
    IncomeVolatility,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
    Low,
}

/// A sensitivity finding: which input could plausibly move the payment, by
/// how much, and how badly.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StressDriver {
    pub kind: StressDriverKind,
    pub label: &'static str,
    pub impact: Impact,
    pub explanation: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioOutcome {
    pub monthly_payment: f64,
    pub verdict: VerdictLevel,
    pub delta: f64,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenarios {
    pub income_drops_10: ScenarioOutcome,
    pub higher_insurance: ScenarioOutcome,
    pub longer_term: ScenarioOutcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerdictResult {
    pub monthly_payment: f64,
    pub total_interest: f64,
    pub total_cost: f64,
    pub loan_amount: f64,
    pub verdict: VerdictLevel,
    pub verdict_explanation: String,
    pub payment_to_income_ratio: f64,
    pub debt_to_income_with_payment: f64,
    pub remaining_after_payment: f64,
    pub stress_drivers: Vec<StressDriver>,
    pub scenarios: Scenarios,
}

/// A payment ceiling under one payment-to-income guideline.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentApproval {
    pub pti_type: &'static str,
    pub ratio: f64,
    pub max_payment: f64,
    pub description: &'static str,
}

/// The loan a target payment services at one tier's typical APR.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanEstimate {
    pub credit_tier: CreditTier,
    pub loan_amount: f64,
    pub total_interest: f64,
    pub total_cost: f64,
}

/// Payment approvals plus the per-tier estimates the standard 12%
/// guideline payment would buy.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoAffordability {
    pub monthly_income: f64,
    pub payment_approvals: Vec<PaymentApproval>,
    pub loan_estimates: Vec<LoanEstimate>,
}

/// One month of an amortization schedule.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationRow {
    pub month: u32,
    pub payment: f64,
    pub principal: f64,
    pub interest: f64,
    pub balance: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineMode {
    Accelerated,
    Reference,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates() {
        let d = Date::parse("2026-06-15").unwrap();
        assert_eq!(
            d,
            Date {
                year: 2026,
                month: 6,
                day: 15
            }
        );
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(Date::parse("2026/06/15").is_err());
        assert!(Date::parse("2026-13-01").is_err());
        assert!(Date::parse("2026-02-29").is_err()); // not a leap year
        assert!(Date::parse("1899-12-31").is_err());
        assert!(Date::parse("2101-01-01").is_err());
    }

    #[test]
    fn accepts_leap_day_in_leap_years() {
        assert!(Date::parse("2024-02-29").is_ok());
        assert!(Date::parse("2000-02-29").is_ok());
        assert!(Date::parse("2100-02-29").is_err()); // century, not divisible by 400
    }

    #[test]
    fn inclusive_day_counts() {
        let start = Date::parse("2026-01-01").unwrap();
        let end = Date::parse("2026-06-15").unwrap();
        assert_eq!(start.days_until_inclusive(end), 166);

        let jan1 = Date::parse("2024-01-01").unwrap();
        let jun30 = Date::parse("2024-06-30").unwrap();
        assert_eq!(jan1.days_until_inclusive(jun30), 182); // leap year

        assert_eq!(jan1.days_until_inclusive(jan1), 1);
    }

    #[test]
    fn date_ordering_matches_day_numbers() {
        let a = Date::parse("2025-12-31").unwrap();
        let b = Date::parse("2026-01-01").unwrap();
        assert!(a < b);
        assert_eq!(b.day_number() - a.day_number(), 1);
    }

    #[test]
    fn unknown_credit_tier_falls_back_to_good() {
        assert_eq!(credit_tier_for("good").id, "good");
        assert_eq!(credit_tier_for("made-up").id, "good");
        assert_eq!(credit_tier_for("rebuilding").apr_typical, 21.9);
    }

    #[test]
    fn tier_apr_envelopes_are_ordered() {
        for tier in &CREDIT_TIERS {
            assert!(tier.apr_low < tier.apr_typical);
            assert!(tier.apr_typical < tier.apr_high);
        }
    }

    #[test]
    fn round_cents_behaviour() {
        assert_eq!(round_cents(271.08433734939757), 271.08);
        assert_eq!(round_cents(496.995), 497.0);
        assert_eq!(round_cents(0.004999), 0.0);
    }
}
