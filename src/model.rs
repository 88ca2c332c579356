use crate::error::ReportError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use tracing::{trace, warn};

/// One leaf of the input record. Any JSON value is accepted; values that are
/// neither strings nor numbers collapse to `Missing`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Field {
    #[default]
    Missing,
    Text(String),
    Number(f64),
}

impl Field {
    pub fn text(value: impl Into<String>) -> Self {
        Field::Text(value.into())
    }

    /// Absent, or text that is empty after trimming.
    pub fn is_blank(&self) -> bool {
        match self {
            Field::Missing => true,
            Field::Text(text) => text.trim().is_empty(),
            Field::Number(_) => false,
        }
    }

    /// Parsed numeric value. Text has `$`, `,` and `%` removed before parsing.
    pub fn number(&self) -> Option<f64> {
        match self {
            Field::Missing => None,
            Field::Number(value) => value.is_finite().then_some(*value),
            Field::Text(text) => parse_amount(text),
        }
    }

    /// Blank counts as zero; text that does not parse yields `None`.
    pub fn amount_absent_as_zero(&self) -> Option<f64> {
        if self.is_blank() {
            Some(0.0)
        } else {
            self.number()
        }
    }

    pub fn amount_or_zero(&self) -> f64 {
        self.number().unwrap_or(0.0)
    }

    pub fn text_or(&self, fallback: &str) -> String {
        match self {
            Field::Missing => fallback.to_string(),
            Field::Text(text) if text.trim().is_empty() => fallback.to_string(),
            Field::Text(text) => text.trim().to_string(),
            Field::Number(value) => display_number(*value),
        }
    }

    /// `true` when the field is a JSON number or text that is purely numeric.
    pub fn is_numeric(&self) -> bool {
        match self {
            Field::Missing => false,
            Field::Number(value) => value.is_finite(),
            Field::Text(text) => {
                let trimmed = text.trim();
                !trimmed.is_empty()
                    && trimmed
                        .chars()
                        .all(|ch| ch.is_ascii_digit() || matches!(ch, '.' | '-' | '+'))
                    && trimmed.parse::<f64>().is_ok_and(f64::is_finite)
            }
        }
    }
}

impl From<Value> for Field {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Field::Text(text),
            Value::Number(number) => number.as_f64().map_or(Field::Missing, Field::Number),
            Value::Bool(flag) => Field::Text(flag.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => Field::Missing,
        }
    }
}

impl From<f64> for Field {
    fn from(value: f64) -> Self {
        Field::Number(value)
    }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Field::Text(value.to_string())
    }
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Field::from(Value::deserialize(deserializer)?))
    }
}

fn parse_amount(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, '$' | ',' | '%'))
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn display_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1.0e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadinessStatus {
    Ready,
    Almost,
    NotReady,
}

const STATUS_MARKERS: [(char, ReadinessStatus); 3] = [
    ('\u{2705}', ReadinessStatus::Ready),
    ('\u{1F536}', ReadinessStatus::Almost),
    ('\u{1F534}', ReadinessStatus::NotReady),
];

impl ReadinessStatus {
    /// Markers win over keywords; anything unrecognized is `NotReady`.
    pub fn classify(text: &str) -> Self {
        for (marker, status) in STATUS_MARKERS {
            if text.contains(marker) {
                return status;
            }
        }
        if let Some(status) = ReadinessStatus::from_token(text) {
            return status;
        }
        let lowered = text.trim().to_lowercase();
        if lowered.contains("not ready") {
            ReadinessStatus::NotReady
        } else if lowered.contains("almost") {
            ReadinessStatus::Almost
        } else if lowered.contains("ready") {
            ReadinessStatus::Ready
        } else {
            ReadinessStatus::NotReady
        }
    }

    /// Matches the machine form of a status (`ready`, `not_ready`, ...).
    pub fn from_token(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "ready" => Some(ReadinessStatus::Ready),
            "almost" => Some(ReadinessStatus::Almost),
            "not_ready" | "notready" | "not-ready" => Some(ReadinessStatus::NotReady),
            _ => None,
        }
    }

    pub fn default_label(self) -> &'static str {
        match self {
            ReadinessStatus::Ready => "Ready to Buy",
            ReadinessStatus::Almost => "Almost Ready",
            ReadinessStatus::NotReady => "Not Ready Yet",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub status: ReadinessStatus,
    /// Display text with status markers removed; may be empty.
    pub label: String,
}

impl Verdict {
    pub fn new(status: ReadinessStatus, label: impl Into<String>) -> Self {
        Self {
            status,
            label: label.into(),
        }
    }

    pub fn from_field(field: &Field) -> Self {
        let raw = match field {
            Field::Text(text) => text.as_str(),
            _ => "",
        };
        let status = ReadinessStatus::classify(raw);
        let label = if ReadinessStatus::from_token(raw).is_some() {
            String::new()
        } else {
            strip_markers(raw)
        };
        if raw.trim().is_empty() {
            trace!("readiness status missing, defaulting to not ready");
        }
        Self { status, label }
    }

    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            self.status.default_label()
        } else {
            &self.label
        }
    }
}

impl Default for Verdict {
    fn default() -> Self {
        Self::new(ReadinessStatus::NotReady, "")
    }
}

impl<'de> Deserialize<'de> for Verdict {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Verdict::from_field(&Field::deserialize(deserializer)?))
    }
}

/// Removes status markers and other pictographs the base-14 fonts cannot show.
pub fn strip_markers(text: &str) -> String {
    let kept: String = text
        .chars()
        .filter(|ch| !is_pictograph(*ch))
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_pictograph(ch: char) -> bool {
    matches!(
        ch as u32,
        0x2190..=0x21FF
            | 0x2300..=0x23FF
            | 0x2600..=0x27BF
            | 0x2B00..=0x2BFF
            | 0xFE0F
            | 0x200D
            | 0x1F000..=0x1FAFF
    )
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Dti {
    #[serde(rename = "housingDTI")]
    pub housing: Field,
    #[serde(rename = "totalDTI")]
    pub total: Field,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoanInputs {
    pub annual_income: Field,
    pub additional_income: Field,
    pub credit_score: Field,
    pub total_savings: Field,
    pub monthly_savings: Field,
    pub down_payment_percent: Field,
    pub loan_type: Field,
    pub loan_term: Field,
    pub interest_rate: Field,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonthlyDebts {
    pub car_payment: Field,
    pub student_loans: Field,
    pub credit_cards: Field,
    pub other_debt: Field,
}

impl MonthlyDebts {
    /// Rows in display order.
    pub fn entries(&self) -> [(&'static str, &Field); 4] {
        [
            ("Car Payment(s)", &self.car_payment),
            ("Student Loans", &self.student_loans),
            ("Credit Card Minimums", &self.credit_cards),
            ("Other Debts", &self.other_debt),
        ]
    }
}

/// Pre-computed calculator results plus the inputs that produced them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReadinessReport {
    pub generated_at: Field,
    #[serde(rename = "readinessStatus")]
    pub verdict: Verdict,
    pub target_home_price: Field,
    pub monthly_payment: Field,
    pub down_payment_needed: Field,
    pub closing_costs: Field,
    pub total_cash_needed: Field,
    #[serde(deserialize_with = "lenient")]
    pub dti: Dti,
    #[serde(deserialize_with = "lenient")]
    pub inputs: LoanInputs,
    #[serde(deserialize_with = "lenient")]
    pub monthly_debts: MonthlyDebts,
}

// Sections that are not objects fall back to their all-missing default.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    if !value.is_object() {
        trace!(kind = value_kind(&value), "section is not an object, using defaults");
        return Ok(T::default());
    }
    Ok(serde_json::from_value(value).unwrap_or_default())
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl ReadinessReport {
    /// Builds a report from an already-parsed JSON value. Never fails: a
    /// top-level value that is not an object yields an all-missing report.
    pub fn from_value(value: Value) -> Self {
        if !value.is_object() {
            warn!(kind = value_kind(&value), "input is not a JSON object, using defaults");
            return Self::default();
        }
        serde_json::from_value(value).unwrap_or_else(|err| {
            warn!(error = %err, "input could not be mapped, using defaults");
            Self::default()
        })
    }

    pub fn from_json_str(input: &str, origin: &str) -> Result<Self, ReportError> {
        let value: Value = serde_json::from_str(input).map_err(|source| ReportError::Parse {
            origin: origin.to_string(),
            source,
        })?;
        Ok(Self::from_value(value))
    }

    pub fn from_reader<R: Read>(mut reader: R, origin: &str) -> Result<Self, ReportError> {
        let mut input = String::new();
        reader
            .read_to_string(&mut input)
            .map_err(|source| ReportError::Input {
                origin: origin.to_string(),
                source,
            })?;
        Self::from_json_str(&input, origin)
    }

    pub fn from_path(path: &Path) -> Result<Self, ReportError> {
        let origin = path.display().to_string();
        let input = std::fs::read_to_string(path).map_err(|source| ReportError::Input {
            origin: origin.clone(),
            source,
        })?;
        Self::from_json_str(&input, &origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn amounts_strip_currency_punctuation() {
        assert_eq!(Field::text("$1,234.50").number(), Some(1234.5));
        assert_eq!(Field::text(" 32% ").number(), Some(32.0));
        assert_eq!(Field::text("abc").number(), None);
        assert_eq!(Field::text("   ").number(), None);
        assert_eq!(Field::Number(f64::NAN).number(), None);
        assert_eq!(Field::Missing.amount_or_zero(), 0.0);
    }

    #[test]
    fn blank_counts_as_zero_but_garbage_does_not() {
        assert_eq!(Field::Missing.amount_absent_as_zero(), Some(0.0));
        assert_eq!(Field::text("").amount_absent_as_zero(), Some(0.0));
        assert_eq!(Field::text("n/a").amount_absent_as_zero(), None);
        assert_eq!(Field::text("$5,000").amount_absent_as_zero(), Some(5000.0));
    }

    #[test]
    fn any_json_value_becomes_a_field() {
        assert_eq!(Field::from(json!(null)), Field::Missing);
        assert_eq!(Field::from(json!([1, 2])), Field::Missing);
        assert_eq!(Field::from(json!({"a": 1})), Field::Missing);
        assert_eq!(Field::from(json!(true)), Field::text("true"));
        assert_eq!(Field::from(json!(720)), Field::Number(720.0));
    }

    #[test]
    fn text_or_prefers_present_values() {
        assert_eq!(Field::Missing.text_or("N/A"), "N/A");
        assert_eq!(Field::text(" ").text_or("N/A"), "N/A");
        assert_eq!(Field::Number(720.0).text_or("N/A"), "720");
        assert_eq!(Field::Number(6.5).text_or("N/A"), "6.5");
        assert_eq!(Field::text(" 30 years ").text_or("N/A"), "30 years");
    }

    #[test]
    fn numeric_detection_rejects_formatted_text() {
        assert!(Field::Number(1.0).is_numeric());
        assert!(Field::text("2150.75").is_numeric());
        assert!(!Field::text("$2,150").is_numeric());
        assert!(!Field::text("soon").is_numeric());
        assert!(!Field::Missing.is_numeric());
    }

    #[test]
    fn status_classification_checks_negative_phrase_first() {
        assert_eq!(
            ReadinessStatus::classify("\u{2705} Ready to Buy!"),
            ReadinessStatus::Ready
        );
        assert_eq!(
            ReadinessStatus::classify("\u{1F536} Almost There"),
            ReadinessStatus::Almost
        );
        assert_eq!(
            ReadinessStatus::classify("\u{1F534} Not Ready Yet"),
            ReadinessStatus::NotReady
        );
        assert_eq!(ReadinessStatus::classify("Not Ready"), ReadinessStatus::NotReady);
        assert_eq!(ReadinessStatus::classify("You are READY"), ReadinessStatus::Ready);
        assert_eq!(ReadinessStatus::classify("not_ready"), ReadinessStatus::NotReady);
        assert_eq!(ReadinessStatus::classify("almost"), ReadinessStatus::Almost);
        assert_eq!(ReadinessStatus::classify("unclear"), ReadinessStatus::NotReady);
        assert_eq!(ReadinessStatus::classify(""), ReadinessStatus::NotReady);
    }

    #[test]
    fn verdict_label_drops_markers() {
        let verdict = Verdict::from_field(&Field::text("\u{2705} Ready to Buy!"));
        assert_eq!(verdict.status, ReadinessStatus::Ready);
        assert_eq!(verdict.display_label(), "Ready to Buy!");

        let empty = Verdict::from_field(&Field::text("\u{1F536}"));
        assert_eq!(empty.status, ReadinessStatus::Almost);
        assert_eq!(empty.display_label(), "Almost Ready");

        assert_eq!(Verdict::default().display_label(), "Not Ready Yet");
    }

    #[test]
    fn machine_status_tokens_show_default_labels() {
        let report = ReadinessReport::from_value(json!({"readinessStatus": "not_ready"}));
        assert_eq!(report.verdict.status, ReadinessStatus::NotReady);
        assert_eq!(report.verdict.display_label(), "Not Ready Yet");

        let almost = Verdict::from_field(&Field::text(" Almost "));
        assert_eq!(almost.status, ReadinessStatus::Almost);
        assert_eq!(almost.display_label(), "Almost Ready");

        let ready = Verdict::from_field(&Field::text("READY"));
        assert_eq!(ready.display_label(), "Ready to Buy");

        let prose = Verdict::from_field(&Field::text("Almost Ready!"));
        assert_eq!(prose.display_label(), "Almost Ready!");
    }

    #[test]
    fn report_deserializes_camel_case_keys() {
        let report = ReadinessReport::from_value(json!({
            "generatedAt": "March 3, 2025 at 10:15 AM",
            "readinessStatus": "\u{1F536} Almost Ready",
            "targetHomePrice": "350000",
            "monthlyPayment": "$2,150",
            "dti": {"housingDTI": "27%", "totalDTI": 41},
            "inputs": {"annualIncome": 95000, "loanType": "conventional"},
            "monthlyDebts": {"carPayment": "300", "studentLoans": 200}
        }));
        assert_eq!(report.generated_at, Field::text("March 3, 2025 at 10:15 AM"));
        assert_eq!(report.verdict.status, ReadinessStatus::Almost);
        assert_eq!(report.target_home_price.number(), Some(350_000.0));
        assert_eq!(report.dti.housing, Field::text("27%"));
        assert_eq!(report.dti.total, Field::Number(41.0));
        assert_eq!(report.inputs.annual_income, Field::Number(95_000.0));
        assert_eq!(report.monthly_debts.student_loans, Field::Number(200.0));
        assert_eq!(report.closing_costs, Field::Missing);
    }

    #[test]
    fn malformed_sections_fall_back_to_defaults() {
        let report = ReadinessReport::from_value(json!({
            "dti": "high",
            "inputs": [1, 2, 3],
            "monthlyDebts": null,
            "readinessStatus": 42
        }));
        assert_eq!(report.dti, Dti::default());
        assert_eq!(report.inputs, LoanInputs::default());
        assert_eq!(report.monthly_debts, MonthlyDebts::default());
        assert_eq!(report.verdict.status, ReadinessStatus::NotReady);

        assert_eq!(ReadinessReport::from_value(json!([1])), ReadinessReport::default());
    }

    #[test]
    fn syntax_errors_are_parse_failures() {
        let err = ReadinessReport::from_json_str("{not json", "stdin").expect_err("invalid");
        assert!(matches!(err, ReportError::Parse { ref origin, .. } if origin == "stdin"));
    }

    #[test]
    fn unreadable_paths_are_input_failures() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = ReadinessReport::from_path(&dir.path().join("absent.json")).expect_err("missing");
        assert!(matches!(err, ReportError::Input { .. }));
    }

    #[test]
    fn reader_input_is_parsed() {
        let input = br#"{"readinessStatus": "ready"}"#;
        let report = ReadinessReport::from_reader(&input[..], "stdin").expect("parse");
        assert_eq!(report.verdict.status, ReadinessStatus::Ready);
    }
}
