//! Plan → self-contained print HTML.
//!
//! Pure and deterministic: the same document always yields byte-identical
//! markup. Styles are inline and nothing is fetched over the network, so the
//! headless browser can print it without waiting on external assets.

use std::fmt::{self, Write};

use crate::plan::model::{FundRecord, PlanDocument, Scalar};

const DOCUMENT_TITLE: &str = "Blue Sparrow Plan";
const BRAND_HEADING: &str = "Blue Sparrow Capital — Plan Summary";
const METRIC_PLACEHOLDER: &str = "-";
const GUARDRAIL_PLACEHOLDER: &str = "—";

const STYLES: &str = "\
body{font-family: ui-sans-serif,system-ui,-apple-system,Segoe UI,Roboto; color:#0f172a; margin:16px;}
.muted{color:#64748b}
.title{font-weight:800; font-size:22px}
.grid{display:grid; grid-template-columns:repeat(3,1fr); gap:10px; margin:12px 0}
.card{border:1px solid #e2e8f0; border-radius:12px; padding:10px}
.k{font-size:12px; color:#64748b}
.v{font-size:16px; font-weight:700}
.note{font-weight:600; font-size:13px}
table{width:100%; border-collapse:collapse; margin-top:14px; font-size:12px}
th,td{border:1px solid #e2e8f0; padding:6px 8px; vertical-align:top}
th{background:#f8fafc; text-align:left}
.sub{color:#64748b; font-size:11px; margin-top:2px}
.footer{margin-top:16px; font-size:11px; color:#64748b}
.brand{display:flex; align-items:center; justify-content:space-between; margin-bottom:8px}
.mix{font-size:13px}
.highlights{margin:6px 0 0 18px; padding:0; font-size:12px}
.badge{display:inline-block; padding:2px 8px; border-radius:9999px; background:#eef2ff; color:#1e40af; font-size:11px}";

/// Renders the printable plan page.
pub fn render_plan_html(plan: &PlanDocument) -> String {
    let mut out = String::with_capacity(8 * 1024);
    // Writing into a String cannot fail.
    let _ = write_document(&mut out, plan);
    out
}

fn write_document(out: &mut String, plan: &PlanDocument) -> fmt::Result {
    let summary = &plan.summary;

    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html>")?;
    writeln!(out, "<head>")?;
    writeln!(out, "<meta charset=\"utf-8\" />")?;
    writeln!(out, "<title>{DOCUMENT_TITLE}</title>")?;
    writeln!(out, "<style>\n{STYLES}\n</style>")?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;

    writeln!(out, "<div class=\"brand\">")?;
    writeln!(out, "<div>")?;
    writeln!(out, "<div class=\"title\">{BRAND_HEADING}</div>")?;
    writeln!(out, "<div class=\"muted\">{}</div>", text(&summary.title))?;
    if summary.description.is_present() {
        writeln!(out, "<div class=\"sub\">{}</div>", text(&summary.description))?;
    }
    writeln!(out, "</div>")?;
    writeln!(out, "<div class=\"badge\">Shareable PDF</div>")?;
    writeln!(out, "</div>")?;

    let highlights: Vec<&Scalar> = summary.highlights.iter().filter(|h| h.is_present()).collect();
    if !highlights.is_empty() {
        writeln!(out, "<ul class=\"highlights\">")?;
        for highlight in highlights {
            writeln!(out, "<li>{}</li>", text(highlight))?;
        }
        writeln!(out, "</ul>")?;
    }

    writeln!(out, "<div class=\"grid\">")?;
    writeln!(
        out,
        "<div class=\"card\"><div class=\"k\">Corpus</div><div class=\"v\">{}</div></div>",
        escape(&format_inr(&summary.corpus_inr))
    )?;
    writeln!(
        out,
        "<div class=\"card\"><div class=\"k\">Monthly SWP</div><div class=\"v\">{}</div></div>",
        escape(&format_inr(&summary.monthly_swp_inr))
    )?;
    writeln!(
        out,
        "<div class=\"card\"><div class=\"k\">Mix</div><div class=\"v mix\">{}% Eq • {}% Stab • {}% Liquid</div></div>",
        escape(&summary.equity_pct.or("0").to_string()),
        escape(&summary.stability_pct.or("0").to_string()),
        escape(&summary.liquid_pct.or("0").to_string()),
    )?;
    writeln!(out, "</div>")?;

    writeln!(out, "<div class=\"card\">")?;
    writeln!(out, "<div class=\"k\">Notes</div>")?;
    writeln!(out, "<div class=\"v note\">{}</div>", text(&summary.notes))?;
    writeln!(out, "</div>")?;

    writeln!(out, "<h3 style=\"margin-top:14px;\">Fund Details &amp; Rationale</h3>")?;
    writeln!(out, "<table>")?;
    writeln!(out, "<thead>")?;
    writeln!(
        out,
        "<tr><th>#</th><th>Fund</th><th>Alloc %</th><th>Why picked</th>\
         <th>NAV</th><th>1Y</th><th>3Y</th><th>5Y</th>\
         <th>AUM (₹Cr)</th><th>Expense</th><th>Risk</th></tr>"
    )?;
    writeln!(out, "</thead>")?;
    writeln!(out, "<tbody>")?;
    for (index, fund) in plan.funds.iter().enumerate() {
        write_fund_row(out, index + 1, fund)?;
    }
    writeln!(out, "</tbody>")?;
    writeln!(out, "</table>")?;

    writeln!(out, "<div class=\"footer\">")?;
    writeln!(
        out,
        "Guardrails: Trim SWP by {} if 12M return below threshold; step-up {} if conditions met.",
        escape(&plan.guardrails.trim_if_drawdown_gt.or(GUARDRAIL_PLACEHOLDER).to_string()),
        escape(&plan.guardrails.stepup_pct.or(GUARDRAIL_PLACEHOLDER).to_string()),
    )?;
    writeln!(out, "<br/>{}", text(&plan.disclaimer))?;
    writeln!(out, "</div>")?;

    writeln!(out, "</body>")?;
    writeln!(out, "</html>")
}

fn write_fund_row(out: &mut String, position: usize, fund: &FundRecord) -> fmt::Result {
    writeln!(out, "<tr>")?;
    writeln!(out, "<td>{position}</td>")?;
    writeln!(
        out,
        "<td><strong>{}</strong><div class=\"sub\">{}</div></td>",
        text(&fund.scheme),
        text(&fund.category)
    )?;
    writeln!(out, "<td>{}%</td>", escape(&fund.allocation_pct.or("0").to_string()))?;
    writeln!(out, "<td>{}</td>", text(&fund.why))?;
    for metric in [
        &fund.nav,
        &fund.cagr_1y,
        &fund.cagr_3y,
        &fund.cagr_5y,
        &fund.aum_cr,
        &fund.expense,
        &fund.riskometer,
    ] {
        writeln!(out, "<td>{}</td>", escape(&metric.or(METRIC_PLACEHOLDER).to_string()))?;
    }
    writeln!(out, "</tr>")
}

/// Escaped free text, empty when absent.
fn text(value: &Scalar) -> String {
    escape(&value.or("").to_string())
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Formats a rupee amount with Indian digit grouping: `₹2,00,00,000`.
///
/// Up to three fraction digits are kept, trailing zeros dropped. An absent
/// amount reads as `₹0`; text that is not a number yields the placeholder.
pub fn format_inr(amount: &Scalar) -> String {
    if !amount.is_present() {
        return "₹0".to_string();
    }
    match amount.as_f64() {
        Some(value) => format!("₹{}", group_indian(value)),
        None => METRIC_PLACEHOLDER.to_string(),
    }
}

fn group_indian(value: f64) -> String {
    let fixed = format!("{:.3}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let digits: Vec<char> = whole.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 2);
    if digits.len() <= 3 {
        grouped.extend(&digits);
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        // Leading groups are pairs; the first one may be a single digit.
        let lead = head.len() % 2;
        for (i, c) in head.iter().enumerate() {
            if i > 0 && (i + 2 - lead) % 2 == 0 {
                grouped.push(',');
            }
            grouped.push(*c);
        }
        grouped.push(',');
        grouped.extend(tail);
    }

    let negative = value < 0.0 && (grouped.chars().any(|c| c != '0' && c != ',') || !fraction.is_empty());
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if !fraction.is_empty() {
        out.push('.');
        out.push_str(fraction);
    }
    out
}
