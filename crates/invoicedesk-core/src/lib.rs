//! Core types for invoicedesk: client records and drafts, draft validation,
//! the edit-mode controller, invoice analysis types, and collaborator ports.

pub mod analysis;
pub mod client;
pub mod edit;
pub mod ports;
pub mod tax_id;
pub mod validation;

pub use analysis::{AnalysisRequest, AnalysisResult, Category};
pub use client::{ClientDraft, ClientId, ClientRecord, Field};
pub use edit::{EditController, EditError, EditMode, Submission};
pub use ports::{ClassificationApi, Confirm, DirectoryApi, RemoteError};
pub use tax_id::TaxIdKind;
pub use validation::{FieldError, FieldErrors, validate};
