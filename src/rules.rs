//! Derived values shown in the report. Everything here is total: bad input
//! degrades to a neutral value instead of failing.

use crate::model::{Field, MonthlyDebts, ReadinessReport, ReadinessStatus};
use tracing::trace;

pub const HOUSING_DTI_LIMIT: f64 = 28.0;
pub const TOTAL_DTI_LIMIT: f64 = 36.0;
/// Points above the limit that still count as `High` rather than `TooHigh`.
pub const DTI_HIGH_BAND: f64 = 7.0;
pub const GOOD_CREDIT_SCORE: i64 = 700;

/// Whole dollars with thousands separators, truncated toward zero.
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return "$0".to_string();
    }
    let whole = amount.trunc() as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if whole < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// Currency for a coerced amount: missing or invalid renders as `$0`.
pub fn currency_or_zero(field: &Field) -> String {
    format_currency(field.amount_or_zero())
}

/// Key-result display: numbers are formatted, other text is shown as given.
pub fn currency_display(field: &Field) -> String {
    if field.is_blank() {
        return "N/A".to_string();
    }
    if field.is_numeric() {
        return format_currency(field.amount_or_zero());
    }
    field.text_or("N/A")
}

pub fn target_price_display(field: &Field) -> String {
    match field.number() {
        Some(amount) if amount > 0.0 => format_currency(amount),
        _ => "N/A".to_string(),
    }
}

/// Capitalizes the first letter of every alphabetic run, lowercasing the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtiStatus {
    Good,
    High,
    TooHigh,
    Unknown,
}

impl DtiStatus {
    pub fn classify(field: &Field, limit: f64) -> Self {
        let Some(value) = field.number() else {
            trace!(?field, limit, "dti value not numeric");
            return DtiStatus::Unknown;
        };
        if value <= limit {
            DtiStatus::Good
        } else if value <= limit + DTI_HIGH_BAND {
            DtiStatus::High
        } else {
            DtiStatus::TooHigh
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DtiStatus::Good => "Good",
            DtiStatus::High => "High",
            DtiStatus::TooHigh => "Too High",
            DtiStatus::Unknown => "N/A",
        }
    }
}

pub fn total_monthly_debt(debts: &MonthlyDebts) -> f64 {
    debts
        .entries()
        .iter()
        .map(|(_, field)| field.amount_or_zero())
        .sum()
}

/// Shortfall between savings and cash needed, when both sides are usable.
pub fn savings_gap(report: &ReadinessReport) -> Option<f64> {
    let savings = report.inputs.total_savings.amount_absent_as_zero()?;
    let needed = report.total_cash_needed.amount_absent_as_zero()?;
    (savings < needed).then(|| needed - savings)
}

fn credit_score(field: &Field) -> Option<i64> {
    if field.is_blank() {
        return Some(0);
    }
    field.number().map(|score| score.trunc() as i64)
}

fn status_steps(status: ReadinessStatus) -> [&'static str; 2] {
    match status {
        ReadinessStatus::Ready => [
            "You're ready! Start interviewing real estate agents in your target area",
            "Get pre-approved with 2-3 lenders to compare rates",
        ],
        ReadinessStatus::Almost => [
            "Consider paying down existing debts to improve your DTI ratio",
            "Continue saving while monitoring interest rates",
        ],
        ReadinessStatus::NotReady => [
            "Focus on increasing income or reducing monthly debts",
            "Consider looking at homes in a lower price range",
        ],
    }
}

/// Ordered next steps: savings gap, credit score, then two status steps.
pub fn recommendations(report: &ReadinessReport) -> Vec<String> {
    let mut steps = Vec::with_capacity(4);

    if let Some(gap) = savings_gap(report) {
        steps.push(format!(
            "Save {} more for down payment, closing costs, and reserves",
            format_currency(gap)
        ));
    }

    match credit_score(&report.inputs.credit_score) {
        Some(score) if score < GOOD_CREDIT_SCORE => steps.push(
            "Work on improving your credit score above 700 for better interest rates".to_string(),
        ),
        Some(_) => steps.push(
            "Your credit score is good - consider getting pre-approved for a mortgage".to_string(),
        ),
        None => trace!("credit score not numeric, skipping credit step"),
    }

    steps.extend(
        status_steps(report.verdict.status)
            .iter()
            .map(|step| step.to_string()),
    );
    steps
}
