//! Invoice analysis: submits raw invoice text to the classification service
//! and turns its answer into a display-ready report.

mod analyzer;
mod report;

pub use analyzer::{AnalysisError, EXAMPLE_INVOICE, InvoiceAnalyzer};
pub use report::{AnalysisReport, NOT_AVAILABLE, format_brl};
