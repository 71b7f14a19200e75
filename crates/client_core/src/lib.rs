//! Submission core for the order-return form: session draft, workflow transport, and
//! the controller that drives the status lifecycle.

pub mod config;
pub mod controller;
pub mod error;
pub mod record_store;
pub mod transport;

pub use config::{load_settings_from, SubmissionSettings};
pub use controller::{classify_reply, ControllerEvent, SubmissionController, SubmitAttempt};
pub use error::{SettingsError, SubmitError, SubmitErrorKind, TransportError};
pub use record_store::RecordStore;
pub use transport::{HttpWorkflowTransport, TransportReply, WorkflowTransport};

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod config_tests;

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod controller_tests;

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod http_tests;
