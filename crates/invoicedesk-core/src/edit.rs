//! Edit-mode controller for the client form.
//!
//! Two modes: creating a new client (initial) or editing an existing record.
//! The controller owns the draft and its field errors and hands out a
//! [`Submission`] once the draft validates. While that submission is pending
//! the controller refuses new submissions and mode changes; the caller reports
//! the outcome with [`EditController::submit_succeeded`] or
//! [`EditController::submit_failed`].

use thiserror::Error;
use tracing::debug;

use crate::client::{ClientDraft, ClientId, ClientRecord, Field};
use crate::validation::{FieldErrors, validate};

#[derive(Debug, Clone, PartialEq)]
pub enum EditMode {
    Creating,
    Editing(ClientRecord),
}

/// What the directory should do with a validated draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Create(ClientDraft),
    Update(ClientId, ClientDraft),
}

impl Submission {
    pub fn draft(&self) -> &ClientDraft {
        match self {
            Self::Create(draft) | Self::Update(_, draft) => draft,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("a submission is already in progress")]
    Busy,

    #[error("draft has invalid fields: {0}")]
    Invalid(FieldErrors),
}

#[derive(Debug, Clone)]
pub struct EditController {
    mode: EditMode,
    draft: ClientDraft,
    errors: FieldErrors,
    submit_error: Option<String>,
    pending: bool,
}

impl Default for EditController {
    fn default() -> Self {
        Self::new()
    }
}

impl EditController {
    pub fn new() -> Self {
        Self {
            mode: EditMode::Creating,
            draft: ClientDraft::default(),
            errors: FieldErrors::new(),
            submit_error: None,
            pending: false,
        }
    }

    pub fn mode(&self) -> &EditMode {
        &self.mode
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, EditMode::Editing(_))
    }

    /// Id of the record being edited, if any.
    pub fn editing_id(&self) -> Option<ClientId> {
        match &self.mode {
            EditMode::Editing(record) => Some(record.id),
            EditMode::Creating => None,
        }
    }

    pub fn draft(&self) -> &ClientDraft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Operation-level message from the last failed submission.
    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    /// True while a create/update call is in flight; the submit action
    /// should be disabled.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Switch to editing `record`, pre-filling the draft from its fields.
    pub fn begin_edit(&mut self, record: ClientRecord) -> Result<(), EditError> {
        self.ensure_idle()?;
        debug!(id = %record.id, "begin edit");
        self.draft = record.to_draft();
        self.errors.clear_all();
        self.submit_error = None;
        self.mode = EditMode::Editing(record);
        Ok(())
    }

    /// Leave edit mode (or reset a half-filled create form), clearing the
    /// draft and every error.
    pub fn cancel_edit(&mut self) -> Result<(), EditError> {
        self.ensure_idle()?;
        debug!(was_editing = self.is_editing(), "cancel edit");
        self.mode = EditMode::Creating;
        self.draft = ClientDraft::default();
        self.errors.clear_all();
        self.submit_error = None;
        Ok(())
    }

    /// Update one draft field. An existing error on that field is cleared
    /// immediately; other fields keep theirs until the next submit.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        self.draft.set(field, value);
        self.errors.clear(field);
    }

    /// Validate the draft and, when clean, mark a submission as pending.
    pub fn submit(&mut self) -> Result<Submission, EditError> {
        self.ensure_idle()?;
        self.submit_error = None;
        self.errors = validate(&self.draft);
        if !self.errors.is_empty() {
            debug!(fields = %self.errors, "submit blocked by validation");
            return Err(EditError::Invalid(self.errors.clone()));
        }

        self.pending = true;
        let submission = match &self.mode {
            EditMode::Creating => Submission::Create(self.draft.clone()),
            EditMode::Editing(record) => Submission::Update(record.id, self.draft.clone()),
        };
        Ok(submission)
    }

    /// The pending submission was persisted. Returns to create mode; the
    /// draft is cleared only when it was a fresh create.
    pub fn submit_succeeded(&mut self) {
        let was_creating = matches!(self.mode, EditMode::Creating);
        self.pending = false;
        self.mode = EditMode::Creating;
        self.errors.clear_all();
        self.submit_error = None;
        if was_creating {
            self.draft = ClientDraft::default();
        }
    }

    /// The pending submission failed remotely. Mode and draft are kept so
    /// the operator can retry.
    pub fn submit_failed(&mut self, message: impl Into<String>) {
        self.pending = false;
        self.submit_error = Some(message.into());
    }

    /// The pending submission was dropped before it settled. Mode, draft and
    /// errors are left as they were; the controller accepts input again.
    pub fn submit_abandoned(&mut self) {
        if self.pending {
            debug!("pending submission abandoned");
            self.pending = false;
        }
    }

    fn ensure_idle(&self) -> Result<(), EditError> {
        if self.pending {
            return Err(EditError::Busy);
        }
        Ok(())
    }
}
