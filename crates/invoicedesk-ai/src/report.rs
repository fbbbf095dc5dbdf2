//! Display-ready rendering of an [`AnalysisResult`].

use invoicedesk_core::{AnalysisResult, Category};

/// Shown in place of any optional field the service left out.
pub const NOT_AVAILABLE: &str = "N/A";

/// An analysis result with every field formatted as text.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    /// Category label exactly as the service returned it.
    pub category: String,
    pub category_kind: Category,
    pub total_value: String,
    pub issue_date: String,
    pub issuer_tax_id: String,
    pub summary: String,
}

impl From<&AnalysisResult> for AnalysisReport {
    fn from(r: &AnalysisResult) -> Self {
        Self {
            category: r.category.clone(),
            category_kind: r.category_kind(),
            total_value: r
                .total_value
                .map(format_brl)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            issue_date: or_not_available(r.issue_date.as_deref()),
            issuer_tax_id: or_not_available(r.issuer_tax_id.as_deref()),
            summary: r.summary.clone(),
        }
    }
}

impl AnalysisReport {
    /// Label/value pairs in display order.
    pub fn rows(&self) -> [(&'static str, &str); 5] {
        [
            ("Category", self.category.as_str()),
            ("Total value", self.total_value.as_str()),
            ("Issue date", self.issue_date.as_str()),
            ("Issuer CNPJ", self.issuer_tax_id.as_str()),
            ("Summary", self.summary.as_str()),
        ]
    }
}

fn or_not_available(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Format an amount as Brazilian reais: `R$ 1.234,56`.
pub fn format_brl(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}R$ {grouped},{:02}", cents % 100)
}
