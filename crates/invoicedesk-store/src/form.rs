//! Form submission: controller → validation → directory mutation → refresh.

use invoicedesk_core::{ClientRecord, DirectoryApi, EditController, EditError, Submission};
use thiserror::Error;
use tracing::info;

use crate::{ClientDirectory, StoreError};

#[derive(Debug, Error)]
pub enum FormError {
    /// Refused locally: a submission is already pending or the draft is invalid.
    #[error(transparent)]
    Edit(#[from] EditError),

    /// The directory rejected or failed the mutation.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Submit the controller's draft as a create or an update, depending on its mode.
///
/// On success the directory has already refreshed and the controller is back
/// in create mode. On a remote failure the message is recorded on the
/// controller and the draft is kept for a retry. If the returned future is
/// dropped before it settles, the controller is released as if the
/// submission never happened.
pub async fn submit_form<A: DirectoryApi>(
    controller: &mut EditController,
    directory: &ClientDirectory<A>,
) -> Result<ClientRecord, FormError> {
    let submission = controller.submit()?;
    let mut in_flight = InFlight {
        controller,
        settled: false,
    };
    let result = match &submission {
        Submission::Create(draft) => directory.create(draft).await,
        Submission::Update(id, draft) => directory.update(*id, draft).await,
    };

    in_flight.settled = true;
    match result {
        Ok(record) => {
            info!(id = %record.id, "form submitted");
            in_flight.controller.submit_succeeded();
            Ok(record)
        }
        Err(e) => {
            in_flight.controller.submit_failed(e.to_string());
            Err(e.into())
        }
    }
}

/// Clears the controller's pending flag if the submission future is dropped
/// mid-flight.
struct InFlight<'a> {
    controller: &'a mut EditController,
    settled: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.controller.submit_abandoned();
        }
    }
}
