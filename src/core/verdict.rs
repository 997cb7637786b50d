//! The affordability verdict engine.
//!
//! A single pure classification per call: Comfortable/Tight/Risky from three
//! ordered checks (payment ratio, then back-end DTI, then monthly margin),
//! plus a stress-driver sensitivity report and three fixed what-if
//! scenarios. All loan math routes through the supplied engine so parity
//! carries up to the verdict level.

use super::engine::CalcEngine;
use super::fmt::format_currency;
use super::types::{
    AffordabilityInputs, CalcError, CalcResult, Impact, ScenarioOutcome, Scenarios, StressDriver,
    StressDriverKind, THRESHOLDS, VerdictLevel, VerdictResult, credit_tier_for, round_cents,
};

/// Effective-income heuristic when net income is absent. A documented rough
/// approximation; deployed copy quotes numbers derived from it, so it must
/// not be "improved".
const NET_INCOME_FALLBACK_FACTOR: f64 = 0.75;

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn effective_income(gross: f64, net: Option<f64>) -> f64 {
    net.unwrap_or(gross * NET_INCOME_FALLBACK_FACTOR)
}

/// Ordered classification. When several conditions independently justify the
/// same verdict, the first listed wins the explanation: ratio before DTI
/// before margin.
fn classify(payment_ratio: f64, dti: f64, margin: f64) -> (VerdictLevel, String) {
    let t = THRESHOLDS;

    if payment_ratio > t.payment_tight || dti > t.dti_tight || margin < t.margin_tight {
        let explanation = if payment_ratio > t.payment_tight {
            format!(
                "This payment consumes {payment_ratio:.0}% of your gross income — beyond the recommended 12% maximum."
            )
        } else if dti > t.dti_tight {
            format!(
                "Your total debt obligations would reach {dti:.0}% of income, leaving little cushion for emergencies."
            )
        } else {
            format!(
                "After this payment and your obligations, you'd have only ${} monthly cushion.",
                margin.round()
            )
        };
        return (VerdictLevel::Risky, explanation);
    }

    if payment_ratio > t.payment_comfortable || dti > t.dti_comfortable || margin < t.margin_comfortable
    {
        let explanation = if payment_ratio > t.payment_comfortable {
            format!(
                "This payment is {payment_ratio:.0}% of your income — workable but leaves limited margin if expenses rise."
            )
        } else if dti > t.dti_comfortable {
            format!(
                "Your total debt-to-income of {dti:.0}% is manageable but approaching limits most lenders prefer."
            )
        } else {
            format!(
                "Your monthly cushion of ${} is adequate but not robust against unexpected costs.",
                margin.round()
            )
        };
        return (VerdictLevel::Tight, explanation);
    }

    (
        VerdictLevel::Comfortable,
        format!(
            "This payment is {payment_ratio:.0}% of your income with a healthy {:.0}% margin for savings and unexpected expenses.",
            100.0 - dti
        ),
    )
}

fn validate(inputs: &AffordabilityInputs) -> CalcResult<()> {
    if !inputs.vehicle_price.is_finite() || inputs.vehicle_price <= 0.0 {
        return Err(CalcError::InvalidInput(
            "Vehicle price must be a finite positive number".to_string(),
        ));
    }
    if !inputs.down_payment.is_finite() || inputs.down_payment < 0.0 {
        return Err(CalcError::InvalidInput(
            "Down payment must be a finite non-negative number".to_string(),
        ));
    }
    if inputs.down_payment > inputs.vehicle_price {
        return Err(CalcError::InvalidInput(
            "Down payment cannot exceed the vehicle price".to_string(),
        ));
    }
    if inputs.term_months == 0 {
        return Err(CalcError::InvalidInput(
            "Term must be at least one month".to_string(),
        ));
    }
    if let Some(apr) = inputs.apr_override {
        if !apr.is_finite() || apr < 0.0 {
            return Err(CalcError::InvalidInput(
                "APR override must be a finite non-negative number".to_string(),
            ));
        }
    }
    if !inputs.gross_monthly_income.is_finite() || inputs.gross_monthly_income <= 0.0 {
        return Err(CalcError::InvalidInput(
            "Gross monthly income must be a finite positive number".to_string(),
        ));
    }
    if let Some(net) = inputs.net_monthly_income {
        if !net.is_finite() || net <= 0.0 {
            return Err(CalcError::InvalidInput(
                "Net monthly income must be a finite positive number".to_string(),
            ));
        }
    }
    if !inputs.fixed_obligations.is_finite() || inputs.fixed_obligations < 0.0 {
        return Err(CalcError::InvalidInput(
            "Fixed obligations must be a finite non-negative number".to_string(),
        ));
    }
    Ok(())
}

fn stress_drivers(
    engine: &dyn CalcEngine,
    inputs: &AffordabilityInputs,
    loan_amount: f64,
    rate: f64,
    payment: f64,
) -> CalcResult<Vec<StressDriver>> {
    let tier = credit_tier_for(&inputs.credit_tier_id);
    let mut drivers = Vec::new();

    // Interest-rate sensitivity across the tier's APR envelope
    let worst_payment = engine.monthly_payment(loan_amount, tier.apr_high, inputs.term_months)?;
    let payment_increase = worst_payment - payment;
    if payment_increase > 30.0 {
        drivers.push(StressDriver {
            kind: StressDriverKind::InterestRate,
            label: "Interest Rate Sensitivity",
            impact: if payment_increase > 75.0 {
                Impact::High
            } else {
                Impact::Medium
            },
            explanation: format!(
                "Your rate could range from {:.1}% to {:.1}%, varying your payment by up to {}/month.",
                tier.apr_low,
                tier.apr_high,
                format_currency(payment_increase)
            ),
            value: format!("±{}/mo", format_currency(payment_increase)),
        });
    }

    // Term-length illusion: always reported at 72 months or longer
    if inputs.term_months >= 72 {
        let shorter_payment = engine.monthly_payment(loan_amount, rate, 60)?;
        let extra_cost = payment * inputs.term_months as f64 - shorter_payment * 60.0;
        drivers.push(StressDriver {
            kind: StressDriverKind::TermLength,
            label: "Term Length Illusion",
            impact: if extra_cost > 3_000.0 {
                Impact::High
            } else {
                Impact::Medium
            },
            explanation: format!(
                "The {}-month term saves {}/month but costs {} more in total interest.",
                inputs.term_months,
                format_currency(shorter_payment - payment),
                format_currency(extra_cost)
            ),
            value: format!("+{} total", format_currency(extra_cost)),
        });
    }

    // Down-payment leverage: what topping up to 20% would buy
    let down_percent = inputs.down_payment / inputs.vehicle_price * 100.0;
    if down_percent < 20.0 {
        let additional_down = inputs.vehicle_price * 0.20 - inputs.down_payment;
        let reduced_payment =
            engine.monthly_payment(loan_amount - additional_down, rate, inputs.term_months)?;
        let savings_per_month = payment - reduced_payment;
        drivers.push(StressDriver {
            kind: StressDriverKind::DownPayment,
            label: "Down Payment Leverage",
            impact: if savings_per_month > 50.0 {
                Impact::High
            } else {
                Impact::Medium
            },
            explanation: format!(
                "An additional {} down would reduce your payment by {}/month.",
                format_currency(additional_down),
                format_currency(savings_per_month)
            ),
            value: format!("-{}/mo", format_currency(savings_per_month)),
        });
    }

    // Income volatility: how the ratio moves under a 10% income cut
    let payment_ratio = payment / inputs.gross_monthly_income * 100.0;
    if payment_ratio > 10.0 {
        let stressed_ratio = payment / (inputs.gross_monthly_income * 0.9) * 100.0;
        drivers.push(StressDriver {
            kind: StressDriverKind::IncomeVolatility,
            label: "Income Volatility Impact",
            impact: if stressed_ratio > 15.0 {
                Impact::High
            } else {
                Impact::Low
            },
            explanation: format!(
                "A 10% income drop would push this payment to {stressed_ratio:.0}% of income — {}.",
                if stressed_ratio > 15.0 {
                    "dangerously high"
                } else {
                    "still manageable"
                }
            ),
            value: format!("{stressed_ratio:.0}% stressed"),
        });
    }

    Ok(drivers)
}

fn income_drop_scenario(inputs: &AffordabilityInputs, payment: f64) -> ScenarioOutcome {
    let reduced_gross = inputs.gross_monthly_income * 0.9;
    let ratio = payment / reduced_gross * 100.0;
    let dti = (inputs.fixed_obligations + payment) / reduced_gross * 100.0;
    // Scenario margins measure against gross; only the base verdict folds in
    // the net-income discount.
    let margin = reduced_gross - inputs.fixed_obligations - payment;
    let (verdict, _) = classify(ratio, dti, margin);

    let suffix = match verdict {
        VerdictLevel::Risky => "This would be unsustainable.",
        VerdictLevel::Tight => "Manageable but strained.",
        VerdictLevel::Comfortable => "Still workable.",
    };
    ScenarioOutcome {
        monthly_payment: payment,
        verdict,
        delta: round_cents(-inputs.gross_monthly_income * 0.1),
        explanation: format!(
            "With 10% less income, this payment becomes {ratio:.0}% of your earnings. {suffix}"
        ),
    }
}

fn higher_insurance_scenario(inputs: &AffordabilityInputs, payment: f64) -> ScenarioOutcome {
    // Insurance estimated from vehicle value: ~$150/mo for a $50k car
    let estimated_insurance = (inputs.vehicle_price * 0.003).round();
    let higher_insurance = (estimated_insurance * 1.5).round();
    let effective_payment = payment + higher_insurance;

    let ratio = effective_payment / inputs.gross_monthly_income * 100.0;
    let dti = (inputs.fixed_obligations + effective_payment) / inputs.gross_monthly_income * 100.0;
    let margin = inputs.gross_monthly_income - inputs.fixed_obligations - effective_payment;
    let (verdict, _) = classify(ratio, dti, margin);

    ScenarioOutcome {
        monthly_payment: round_cents(effective_payment),
        verdict,
        delta: higher_insurance - estimated_insurance,
        explanation: format!(
            "If insurance runs {}/month instead of {}, your true cost is {}/month ({ratio:.0}% of income).",
            format_currency(higher_insurance),
            format_currency(estimated_insurance),
            format_currency(effective_payment)
        ),
    }
}

fn longer_term_scenario(
    engine: &dyn CalcEngine,
    inputs: &AffordabilityInputs,
    loan_amount: f64,
    rate: f64,
    payment: f64,
) -> CalcResult<ScenarioOutcome> {
    let extended_term = (inputs.term_months + 12).min(84);
    let extended_payment = engine.monthly_payment(loan_amount, rate, extended_term)?;
    let additional_cost =
        extended_payment * extended_term as f64 - payment * inputs.term_months as f64;

    let ratio = extended_payment / inputs.gross_monthly_income * 100.0;
    let dti = (inputs.fixed_obligations + extended_payment) / inputs.gross_monthly_income * 100.0;
    let margin = inputs.gross_monthly_income - inputs.fixed_obligations - extended_payment;
    let (verdict, _) = classify(ratio, dti, margin);

    Ok(ScenarioOutcome {
        monthly_payment: extended_payment,
        verdict,
        delta: round_cents(extended_payment - payment),
        explanation: format!(
            "Extending to {extended_term} months drops payment to {} but adds {} in total interest.",
            format_currency(extended_payment),
            format_currency(additional_cost)
        ),
    })
}

/// Produce the full affordability report: payment, verdict with ordered
/// explanation, stress drivers, and the three named scenarios.
pub fn calculate_affordability(
    engine: &dyn CalcEngine,
    inputs: &AffordabilityInputs,
) -> CalcResult<VerdictResult> {
    validate(inputs)?;

    let tier = credit_tier_for(&inputs.credit_tier_id);
    let rate = inputs.apr_override.unwrap_or(tier.apr_typical);

    let loan_amount = inputs.vehicle_price - inputs.down_payment;
    let payment = engine.monthly_payment(loan_amount, rate, inputs.term_months)?;
    let total_cost = payment * inputs.term_months as f64 + inputs.down_payment;
    let total_interest = total_cost - inputs.vehicle_price;

    let payment_ratio = payment / inputs.gross_monthly_income * 100.0;
    let dti = (inputs.fixed_obligations + payment) / inputs.gross_monthly_income * 100.0;
    let margin = effective_income(inputs.gross_monthly_income, inputs.net_monthly_income)
        - inputs.fixed_obligations
        - payment;

    let (verdict, verdict_explanation) = classify(payment_ratio, dti, margin);

    let stress_drivers = stress_drivers(engine, inputs, loan_amount, rate, payment)?;
    let scenarios = Scenarios {
        income_drops_10: income_drop_scenario(inputs, payment),
        higher_insurance: higher_insurance_scenario(inputs, payment),
        longer_term: longer_term_scenario(engine, inputs, loan_amount, rate, payment)?,
    };

    Ok(VerdictResult {
        monthly_payment: payment,
        total_interest: round_cents(total_interest),
        total_cost: round_cents(total_cost),
        loan_amount: round_cents(loan_amount),
        verdict,
        verdict_explanation,
        payment_to_income_ratio: round_tenth(payment_ratio),
        debt_to_income_with_payment: round_tenth(dti),
        remaining_after_payment: round_cents(margin),
        stress_drivers,
        scenarios,
    })
}
