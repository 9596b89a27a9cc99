//! # ctrls client
//!
//! HTTP transport for the clinic forms backend.
//!
//! - [`ApiClient`]: one `reqwest` client bound to a [`ctrls_core::ClientConfig`]
//! - public form endpoints: template fetch and submission ([`public`])
//! - staff endpoints: login and submission listing ([`staff`])
//! - [`PublicFormPage`]: drives one form session from load to submit
//!
//! Status codes and bodies are handed to `ctrls-core` for interpretation; this crate only moves
//! bytes and translates transport failures.

pub mod api;
pub mod form_page;
pub mod public;
pub mod staff;

pub use api::ApiClient;
pub use form_page::PublicFormPage;
pub use staff::SubmissionsQuery;

use ctrls_core::{CoreError, ReloadBlocked, SubmissionError, SubmitBlocked, TemplateError};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error(transparent)]
    Blocked(#[from] SubmitBlocked),
    #[error(transparent)]
    ReloadBlocked(#[from] ReloadBlocked),
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("form session was closed")]
    SessionClosed,
    #[error("not logged in")]
    NotAuthenticated,
    #[error("session expired, log in again")]
    Unauthorized,
    #[error("request failed with HTTP {status}: {message}")]
    Api { status: u16, message: String },
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
