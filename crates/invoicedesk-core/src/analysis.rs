//! Invoice analysis request and result types shared with the classification service.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Body of `POST /analisar-nota`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    #[serde(rename = "texto")]
    pub text: String,
}

/// Structured metadata the classification service extracted from an invoice.
///
/// Produced only by the remote service. `category` keeps the label exactly as
/// the service sent it; use [`AnalysisResult::category_kind`] for the
/// enumerated category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "valor_total", default)]
    pub total_value: Option<f64>,
    #[serde(rename = "data_emissao", default)]
    pub issue_date: Option<String>,
    #[serde(rename = "cnpj_emissor", default)]
    pub issuer_tax_id: Option<String>,
    #[serde(rename = "resumo")]
    pub summary: String,
}

impl AnalysisResult {
    pub fn category_kind(&self) -> Category {
        Category::from_label(&self.category)
    }
}

/// Expense categories the classification service is asked to choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Food,
    Health,
    Transport,
    Education,
    Apparel,
    Electronics,
    Household,
    Stationery,
    Other,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Food,
        Category::Health,
        Category::Transport,
        Category::Education,
        Category::Apparel,
        Category::Electronics,
        Category::Household,
        Category::Stationery,
        Category::Other,
    ];

    /// Label used by the classification service.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Food => "alimentação",
            Self::Health => "saúde",
            Self::Transport => "transporte",
            Self::Education => "educação",
            Self::Apparel => "vestuário",
            Self::Electronics => "eletrônicos",
            Self::Household => "casa",
            Self::Stationery => "papelaria",
            Self::Other => "outros",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Health => "health",
            Self::Transport => "transport",
            Self::Education => "education",
            Self::Apparel => "apparel",
            Self::Electronics => "electronics",
            Self::Household => "household",
            Self::Stationery => "stationery",
            Self::Other => "other",
        }
    }

    /// Map a service label (case-insensitive, surrounding whitespace ignored)
    /// or an English category name onto the enumerated set. Unrecognised
    /// labels fall back to [`Category::Other`].
    pub fn from_label(label: &str) -> Self {
        let needle = label.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.label() == needle || c.as_str() == needle)
            .unwrap_or(Self::Other)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
