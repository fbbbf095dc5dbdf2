//! Invoice analysis pipeline.
//!
//! The classification service is opaque and non-deterministic: the pipeline
//! never parses the invoice itself. It rejects blank input locally, forwards
//! the text verbatim, and passes the service's answer through untouched.
//! Each call is independent; nothing is cached between calls.

use invoicedesk_core::{AnalysisResult, ClassificationApi, RemoteError};
use thiserror::Error;
use tracing::{info, warn};

use crate::AnalysisReport;

const ANALYSIS_FAILED: &str = "failed to analyze invoice";

/// Sample invoice for trying the service out.
pub const EXAMPLE_INVOICE: &str = "NOTA FISCAL ELETRONICA
Farmácia Saúde & Vida
CNPJ: 98.765.432/0001-10
Data: 20/08/2024

Medicamentos:
- Dipirona 500mg: R$ 12,90
- Vitamina C: R$ 18,50

Total: R$ 31,40";

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The text was empty or whitespace; no request was sent.
    #[error("invoice text is empty")]
    EmptyInput,

    /// The service call failed. `message` is the server's detail when it
    /// sent one.
    #[error("{message}")]
    AnalysisFailed {
        message: String,
        #[source]
        source: RemoteError,
    },
}

pub struct InvoiceAnalyzer<C> {
    service: C,
}

impl<C: ClassificationApi> InvoiceAnalyzer<C> {
    pub fn new(service: C) -> Self {
        Self { service }
    }

    /// Classify `text`.
    pub async fn analyze(&self, text: &str) -> Result<AnalysisResult, AnalysisError> {
        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        info!(chars = text.chars().count(), "submitting invoice for analysis");
        let result = self.service.classify(text).await.map_err(|e| {
            warn!(error = %e, "invoice analysis failed");
            AnalysisError::AnalysisFailed {
                message: e.message_or(ANALYSIS_FAILED),
                source: e,
            }
        })?;

        info!(
            category = %result.category,
            has_total = result.total_value.is_some(),
            "invoice analysed"
        );
        Ok(result)
    }

    /// Classify `text` and format the answer for display.
    pub async fn analyze_report(&self, text: &str) -> Result<AnalysisReport, AnalysisError> {
        self.analyze(text).await.map(|r| AnalysisReport::from(&r))
    }
}
