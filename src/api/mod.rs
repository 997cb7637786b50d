use axum::{
    Router,
    extract::{Json, Query},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

use crate::core::{
    AffordabilityInputs, CalcError, Date, EngineMode, ENGINE_VERSION, allocate_budget,
    amortization_schedule, analyze_dti, analyze_mortgage, auto_affordability,
    calculate_affordability, engine_mode, estimate_taxes, format_currency,
    is_accelerated_runtime_available, loan_amount_for_payment, loan_estimates, monthly_payment,
    payment_approvals, project_income, CREDIT_TIERS,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PaymentPayload {
    principal: Option<f64>,
    apr_percent: Option<f64>,
    term_months: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PaymentResponse {
    principal: f64,
    apr_percent: f64,
    term_months: u32,
    monthly_payment: f64,
    total_paid: f64,
    total_interest: f64,
    monthly_payment_formatted: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct LoanAmountPayload {
    payment: Option<f64>,
    apr_percent: Option<f64>,
    term_months: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoanAmountResponse {
    payment: f64,
    apr_percent: f64,
    term_months: u32,
    loan_amount: f64,
    loan_amount_formatted: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct IncomePayload {
    cumulative: Option<f64>,
    start_date: Option<String>,
    check_date: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IncomeResponse {
    computable: bool,
    projection: Option<crate::core::IncomeProjection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct MortgagePayload {
    price: Option<f64>,
    down_percent: Option<f64>,
    apr_percent: Option<f64>,
    term_years: Option<u32>,
    property_tax_rate_percent: Option<f64>,
    annual_insurance: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TaxesPayload {
    gross_annual: Option<f64>,
    retirement_percent: Option<f64>,
    annual_health_premium: Option<f64>,
    state_rate_percent: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct BudgetPayload {
    net_monthly: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct DtiPayload {
    monthly_income: Option<f64>,
    housing_payment: Option<f64>,
    other_debts: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AffordabilityPayload {
    vehicle_price: Option<f64>,
    down_payment: Option<f64>,
    credit_tier_id: Option<String>,
    term_months: Option<u32>,
    apr_override: Option<f64>,
    gross_monthly_income: Option<f64>,
    net_monthly_income: Option<f64>,
    fixed_obligations: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ApprovalsPayload {
    monthly_income: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct LoanEstimatesPayload {
    monthly_payment: Option<f64>,
    term_months: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AutoAffordabilityPayload {
    monthly_income: Option<f64>,
    term_months: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AmortizationPayload {
    principal: Option<f64>,
    apr_percent: Option<f64>,
    term_months: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EngineResponse {
    mode: EngineMode,
    accelerated_available: bool,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn require<T>(value: Option<T>, name: &str) -> Result<T, String> {
    value.ok_or_else(|| format!("{name} is required"))
}

fn parse_date(text: Option<String>, name: &str) -> Result<Date, String> {
    let text = require(text, name)?;
    Date::parse(&text).map_err(|e| format!("{name}: {e}"))
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/api/payment", get(payment_get).post(payment_post))
        .route(
            "/api/loan-amount",
            get(loan_amount_get).post(loan_amount_post),
        )
        .route("/api/income", get(income_get).post(income_post))
        .route("/api/mortgage", get(mortgage_get).post(mortgage_post))
        .route("/api/taxes", get(taxes_get).post(taxes_post))
        .route("/api/budget", get(budget_get).post(budget_post))
        .route("/api/dti", get(dti_get).post(dti_post))
        .route("/api/affordability", axum::routing::post(affordability_post))
        .route(
            "/api/payment-approvals",
            get(approvals_get).post(approvals_post),
        )
        .route(
            "/api/loan-estimates",
            get(loan_estimates_get).post(loan_estimates_post),
        )
        .route(
            "/api/auto-affordability",
            get(auto_affordability_get).post(auto_affordability_post),
        )
        .route(
            "/api/amortization",
            get(amortization_get).post(amortization_post),
        )
        .route("/api/engine", get(engine_handler))
        .route("/api/credit-tiers", get(credit_tiers_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, engine = ?engine_mode(), "affordability API listening");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn payment_get(Query(payload): Query<PaymentPayload>) -> Response {
    payment_impl(payload)
}

async fn payment_post(Json(payload): Json<PaymentPayload>) -> Response {
    payment_impl(payload)
}

fn payment_impl(payload: PaymentPayload) -> Response {
    let (principal, apr_percent, term_months) = match (
        require(payload.principal, "principal"),
        require(payload.apr_percent, "aprPercent"),
        require(payload.term_months, "termMonths"),
    ) {
        (Ok(p), Ok(a), Ok(t)) => (p, a, t),
        (Err(msg), _, _) | (_, Err(msg), _) | (_, _, Err(msg)) => {
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    match monthly_payment(principal, apr_percent, term_months) {
        Ok(payment) => {
            let total_paid = payment * f64::from(term_months);
            json_response(
                StatusCode::OK,
                PaymentResponse {
                    principal,
                    apr_percent,
                    term_months,
                    monthly_payment: payment,
                    total_paid,
                    total_interest: (total_paid - principal).max(0.0),
                    monthly_payment_formatted: format_currency(payment),
                },
            )
        }
        Err(e) => calc_error_response(e),
    }
}

async fn loan_amount_get(Query(payload): Query<LoanAmountPayload>) -> Response {
    loan_amount_impl(payload)
}

async fn loan_amount_post(Json(payload): Json<LoanAmountPayload>) -> Response {
    loan_amount_impl(payload)
}

fn loan_amount_impl(payload: LoanAmountPayload) -> Response {
    let (payment, apr_percent, term_months) = match (
        require(payload.payment, "payment"),
        require(payload.apr_percent, "aprPercent"),
        require(payload.term_months, "termMonths"),
    ) {
        (Ok(p), Ok(a), Ok(t)) => (p, a, t),
        (Err(msg), _, _) | (_, Err(msg), _) | (_, _, Err(msg)) => {
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    match loan_amount_for_payment(payment, apr_percent, term_months) {
        Ok(loan_amount) => json_response(
            StatusCode::OK,
            LoanAmountResponse {
                payment,
                apr_percent,
                term_months,
                loan_amount,
                loan_amount_formatted: format_currency(loan_amount),
            },
        ),
        Err(e) => calc_error_response(e),
    }
}

async fn income_get(Query(payload): Query<IncomePayload>) -> Response {
    income_impl(payload)
}

async fn income_post(Json(payload): Json<IncomePayload>) -> Response {
    income_impl(payload)
}

fn income_impl(payload: IncomePayload) -> Response {
    let cumulative = match require(payload.cumulative, "cumulative") {
        Ok(v) => v,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    let start = match parse_date(payload.start_date, "startDate") {
        Ok(v) => v,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    let check = match parse_date(payload.check_date, "checkDate") {
        Ok(v) => v,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    match project_income(cumulative, start, check) {
        Ok(projection) => json_response(
            StatusCode::OK,
            IncomeResponse {
                computable: projection.is_some(),
                projection,
            },
        ),
        Err(e) => calc_error_response(e),
    }
}

async fn mortgage_get(Query(payload): Query<MortgagePayload>) -> Response {
    mortgage_impl(payload)
}

async fn mortgage_post(Json(payload): Json<MortgagePayload>) -> Response {
    mortgage_impl(payload)
}

fn mortgage_impl(payload: MortgagePayload) -> Response {
    let required = (
        require(payload.price, "price"),
        require(payload.down_percent, "downPercent"),
        require(payload.apr_percent, "aprPercent"),
        require(payload.term_years, "termYears"),
    );
    let (price, down_percent, apr_percent, term_years) = match required {
        (Ok(p), Ok(d), Ok(a), Ok(t)) => (p, d, a, t),
        (Err(msg), _, _, _) | (_, Err(msg), _, _) | (_, _, Err(msg), _) | (_, _, _, Err(msg)) => {
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };
    let property_tax_rate = payload.property_tax_rate_percent.unwrap_or(1.1);
    let annual_insurance = payload.annual_insurance.unwrap_or(1_200.0);

    match analyze_mortgage(
        price,
        down_percent,
        apr_percent,
        term_years,
        property_tax_rate,
        annual_insurance,
    ) {
        Ok(result) => json_response(StatusCode::OK, result),
        Err(e) => calc_error_response(e),
    }
}

async fn taxes_get(Query(payload): Query<TaxesPayload>) -> Response {
    taxes_impl(payload)
}

async fn taxes_post(Json(payload): Json<TaxesPayload>) -> Response {
    taxes_impl(payload)
}

fn taxes_impl(payload: TaxesPayload) -> Response {
    let gross_annual = match require(payload.gross_annual, "grossAnnual") {
        Ok(v) => v,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    let retirement = payload.retirement_percent.unwrap_or(0.0);
    let health = payload.annual_health_premium.unwrap_or(0.0);
    let state_rate = payload.state_rate_percent.unwrap_or(0.0);

    match estimate_taxes(gross_annual, retirement, health, state_rate) {
        Ok(breakdown) => json_response(StatusCode::OK, breakdown),
        Err(e) => calc_error_response(e),
    }
}

async fn budget_get(Query(payload): Query<BudgetPayload>) -> Response {
    budget_impl(payload)
}

async fn budget_post(Json(payload): Json<BudgetPayload>) -> Response {
    budget_impl(payload)
}

fn budget_impl(payload: BudgetPayload) -> Response {
    let net_monthly = match require(payload.net_monthly, "netMonthly") {
        Ok(v) => v,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    match allocate_budget(net_monthly) {
        Ok(allocation) => json_response(StatusCode::OK, allocation),
        Err(e) => calc_error_response(e),
    }
}

async fn dti_get(Query(payload): Query<DtiPayload>) -> Response {
    dti_impl(payload)
}

async fn dti_post(Json(payload): Json<DtiPayload>) -> Response {
    dti_impl(payload)
}

fn dti_impl(payload: DtiPayload) -> Response {
    let monthly_income = match require(payload.monthly_income, "monthlyIncome") {
        Ok(v) => v,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    let housing = payload.housing_payment.unwrap_or(0.0);
    let debts = payload.other_debts.unwrap_or(0.0);

    match analyze_dti(monthly_income, housing, debts) {
        Ok(analysis) => json_response(StatusCode::OK, analysis),
        Err(e) => calc_error_response(e),
    }
}

async fn affordability_post(Json(payload): Json<AffordabilityPayload>) -> Response {
    let inputs = match affordability_inputs_from_payload(payload) {
        Ok(inputs) => inputs,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    match calculate_affordability(&inputs) {
        Ok(verdict) => json_response(StatusCode::OK, verdict),
        Err(e) => calc_error_response(e),
    }
}

fn affordability_inputs_from_payload(
    payload: AffordabilityPayload,
) -> Result<AffordabilityInputs, String> {
    Ok(AffordabilityInputs {
        vehicle_price: require(payload.vehicle_price, "vehiclePrice")?,
        down_payment: payload.down_payment.unwrap_or(0.0),
        credit_tier_id: payload.credit_tier_id.unwrap_or_else(|| "good".to_string()),
        term_months: require(payload.term_months, "termMonths")?,
        apr_override: payload.apr_override,
        gross_monthly_income: require(payload.gross_monthly_income, "grossMonthlyIncome")?,
        net_monthly_income: payload.net_monthly_income,
        fixed_obligations: payload.fixed_obligations.unwrap_or(0.0),
    })
}

async fn approvals_get(Query(payload): Query<ApprovalsPayload>) -> Response {
    approvals_impl(payload)
}

async fn approvals_post(Json(payload): Json<ApprovalsPayload>) -> Response {
    approvals_impl(payload)
}

fn approvals_impl(payload: ApprovalsPayload) -> Response {
    let monthly_income = match require(payload.monthly_income, "monthlyIncome") {
        Ok(v) => v,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    match payment_approvals(monthly_income) {
        Ok(approvals) => json_response(StatusCode::OK, approvals),
        Err(e) => calc_error_response(e),
    }
}

async fn loan_estimates_get(Query(payload): Query<LoanEstimatesPayload>) -> Response {
    loan_estimates_impl(payload)
}

async fn loan_estimates_post(Json(payload): Json<LoanEstimatesPayload>) -> Response {
    loan_estimates_impl(payload)
}

fn loan_estimates_impl(payload: LoanEstimatesPayload) -> Response {
    let monthly_payment = match require(payload.monthly_payment, "monthlyPayment") {
        Ok(v) => v,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    // omitted term takes the five-year default downstream
    let term_months = payload.term_months.unwrap_or(0);

    match loan_estimates(monthly_payment, term_months) {
        Ok(estimates) => json_response(StatusCode::OK, estimates),
        Err(e) => calc_error_response(e),
    }
}

async fn auto_affordability_get(Query(payload): Query<AutoAffordabilityPayload>) -> Response {
    auto_affordability_impl(payload)
}

async fn auto_affordability_post(Json(payload): Json<AutoAffordabilityPayload>) -> Response {
    auto_affordability_impl(payload)
}

fn auto_affordability_impl(payload: AutoAffordabilityPayload) -> Response {
    let monthly_income = match require(payload.monthly_income, "monthlyIncome") {
        Ok(v) => v,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    let term_months = payload.term_months.unwrap_or(0);

    match auto_affordability(monthly_income, term_months) {
        Ok(report) => json_response(StatusCode::OK, report),
        Err(e) => calc_error_response(e),
    }
}

async fn amortization_get(Query(payload): Query<AmortizationPayload>) -> Response {
    amortization_impl(payload)
}

async fn amortization_post(Json(payload): Json<AmortizationPayload>) -> Response {
    amortization_impl(payload)
}

fn amortization_impl(payload: AmortizationPayload) -> Response {
    let (principal, apr_percent, term_months) = match (
        require(payload.principal, "principal"),
        require(payload.apr_percent, "aprPercent"),
        require(payload.term_months, "termMonths"),
    ) {
        (Ok(p), Ok(a), Ok(t)) => (p, a, t),
        (Err(msg), _, _) | (_, Err(msg), _) | (_, _, Err(msg)) => {
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    match amortization_schedule(principal, apr_percent, term_months) {
        Ok(schedule) => json_response(StatusCode::OK, schedule),
        Err(e) => calc_error_response(e),
    }
}

async fn engine_handler() -> Response {
    json_response(
        StatusCode::OK,
        EngineResponse {
            mode: engine_mode(),
            accelerated_available: is_accelerated_runtime_available(),
            version: ENGINE_VERSION,
        },
    )
}

async fn credit_tiers_handler() -> Response {
    json_response(StatusCode::OK, &CREDIT_TIERS)
}

fn calc_error_response(error: CalcError) -> Response {
    error_response(StatusCode::BAD_REQUEST, &error.to_string())
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
