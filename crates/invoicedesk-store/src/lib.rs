//! Client directory: a cache of the remote client list that refreshes after
//! every successful mutation, plus the form submission flow that ties the
//! edit-mode controller to it.

mod directory;
mod error;
mod form;

pub use directory::{ClientDirectory, Deletion};
pub use error::StoreError;
pub use form::{FormError, submit_form};
