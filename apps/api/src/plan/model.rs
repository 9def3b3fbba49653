//! Typed view over a plan document.
//!
//! The stored JSON is authored by hand outside this service, so decoding is
//! lenient: a field with an unexpected shape is treated as absent and decoding
//! as a whole never fails. The raw `serde_json::Value` remains the source of
//! truth for `GET /api/plan`; this view only feeds the HTML renderer.

use std::fmt;

use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::{Number, Value};

// ────────────────────────────────────────────────────────────────────────────
// Opaque scalars
// ────────────────────────────────────────────────────────────────────────────

/// An opaque display value. Numbers and text are kept as authored.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Scalar {
    #[default]
    Absent,
    Text(String),
    Number(Number),
    Bool(bool),
}

impl Scalar {
    /// Whether the value should be displayed at all.
    /// Missing, `null`, `""`, `0` and `false` all count as "not provided".
    pub fn is_present(&self) -> bool {
        match self {
            Scalar::Absent => false,
            Scalar::Text(s) => !s.is_empty(),
            Scalar::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
            Scalar::Bool(b) => *b,
        }
    }

    /// Numeric interpretation, accepting numeric strings such as `"2000000"`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => n.as_f64(),
            Scalar::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            Scalar::Absent | Scalar::Bool(_) => None,
        }
    }

    /// Display text, or `fallback` when the value is not present.
    pub fn or<'a>(&'a self, fallback: &'a str) -> DisplayOr<'a> {
        DisplayOr {
            value: self,
            fallback,
        }
    }
}

impl From<Value> for Scalar {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Scalar::Text(s),
            Value::Number(n) => Scalar::Number(n),
            Value::Bool(b) => Scalar::Bool(b),
            Value::Null | Value::Array(_) | Value::Object(_) => Scalar::Absent,
        }
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Scalar::from(Value::deserialize(deserializer)?))
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Absent => Ok(()),
            Scalar::Text(s) => f.write_str(s),
            Scalar::Number(n) => write_number(f, n),
            Scalar::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Whole floats print without a trailing `.0`, the way the site shows them.
fn write_number(f: &mut fmt::Formatter<'_>, n: &Number) -> fmt::Result {
    match n.as_f64() {
        Some(v) if n.is_f64() && v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{}", v as i64),
        _ => write!(f, "{n}"),
    }
}

pub struct DisplayOr<'a> {
    value: &'a Scalar,
    fallback: &'a str,
}

impl fmt::Display for DisplayOr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value.is_present() {
            fmt::Display::fmt(self.value, f)
        } else {
            f.write_str(self.fallback)
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Document
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlanDocument {
    #[serde(deserialize_with = "lenient")]
    pub summary: PlanSummary,
    #[serde(deserialize_with = "lenient_seq")]
    pub funds: Vec<FundRecord>,
    #[serde(deserialize_with = "lenient")]
    pub guardrails: Guardrails,
    pub disclaimer: Scalar,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlanSummary {
    pub title: Scalar,
    pub description: Scalar,
    #[serde(deserialize_with = "lenient")]
    pub highlights: Vec<Scalar>,
    pub corpus_inr: Scalar,
    pub monthly_swp_inr: Scalar,
    pub equity_pct: Scalar,
    pub stability_pct: Scalar,
    pub liquid_pct: Scalar,
    pub notes: Scalar,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FundRecord {
    pub scheme: Scalar,
    pub category: Scalar,
    pub allocation_pct: Scalar,
    /// Rationale shown in the "Why picked" column.
    pub why: Scalar,
    pub nav: Scalar,
    pub cagr_1y: Scalar,
    pub cagr_3y: Scalar,
    pub cagr_5y: Scalar,
    pub aum_cr: Scalar,
    pub expense: Scalar,
    pub riskometer: Scalar,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Guardrails {
    pub trim_if_drawdown_gt: Scalar,
    pub stepup_pct: Scalar,
}

impl PlanDocument {
    /// Builds the typed view. Never fails: malformed parts become absent.
    pub fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Like [`lenient`], but salvages the well-formed entries of a sequence.
fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_default())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decodes_full_document() {
        let plan = PlanDocument::from_value(&json!({
            "summary": {
                "title": "Retire at 50",
                "corpus_inr": 20000000,
                "highlights": ["Low cost", "Diversified"]
            },
            "funds": [{"scheme": "Fund A", "allocation_pct": 60, "nav": "123.4"}],
            "guardrails": {"trim_if_drawdown_gt": "15%"},
            "disclaimer": "Educational only"
        }));

        assert_eq!(plan.summary.title, Scalar::Text("Retire at 50".to_string()));
        assert_eq!(plan.summary.corpus_inr.as_f64(), Some(20_000_000.0));
        assert_eq!(plan.summary.highlights.len(), 2);
        assert_eq!(plan.funds.len(), 1);
        assert_eq!(plan.funds[0].nav.to_string(), "123.4");
        assert!(!plan.guardrails.stepup_pct.is_present());
    }

    #[test]
    fn test_wrong_shapes_become_absent() {
        let plan = PlanDocument::from_value(&json!({
            "summary": "not an object",
            "funds": [{"scheme": {"nested": true}}, 42, {"scheme": "Fund B"}],
            "guardrails": [],
            "disclaimer": {"text": "x"}
        }));

        assert!(!plan.summary.title.is_present());
        assert_eq!(plan.funds.len(), 3);
        assert!(!plan.funds[0].scheme.is_present());
        assert!(!plan.funds[1].scheme.is_present());
        assert_eq!(plan.funds[2].scheme.to_string(), "Fund B");
        assert!(!plan.disclaimer.is_present());
    }

    #[test]
    fn test_non_object_document_is_empty() {
        let plan = PlanDocument::from_value(&json!([1, 2, 3]));
        assert!(plan.funds.is_empty());
        assert!(!plan.summary.title.is_present());
    }

    #[test]
    fn test_presence_follows_truthiness() {
        assert!(!Scalar::Absent.is_present());
        assert!(!Scalar::Text(String::new()).is_present());
        assert!(!Scalar::from(json!(0)).is_present());
        assert!(!Scalar::from(json!(false)).is_present());
        assert!(Scalar::from(json!("0")).is_present());
        assert!(Scalar::from(json!(0.5)).is_present());
    }

    #[test]
    fn test_whole_floats_display_as_integers() {
        assert_eq!(Scalar::from(json!(60.0)).to_string(), "60");
        assert_eq!(Scalar::from(json!(12.75)).to_string(), "12.75");
        assert_eq!(Scalar::from(json!(60)).to_string(), "60");
    }

    #[test]
    fn test_or_uses_fallback_when_absent() {
        assert_eq!(Scalar::Absent.or("-").to_string(), "-");
        assert_eq!(Scalar::from(json!("Very High")).or("-").to_string(), "Very High");
    }
}
