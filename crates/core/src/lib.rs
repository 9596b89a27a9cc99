//! # ctrls core
//!
//! Client-side business logic for clinic public forms.
//!
//! This crate contains pure state and decision logic:
//! - the form-filling session and its pre-submit validation ([`session`])
//! - the page state machine from loading to submitted ([`page`])
//! - theme variables derived from clinic branding ([`theme`])
//! - interpretation of backend responses into outcomes ([`outcome`])
//! - persisted staff credentials ([`auth`])
//! - cancellation of work belonging to a closed session ([`scope`])
//!
//! **No HTTP**: requests and their transport live in `ctrls-client`.

pub mod auth;
pub mod config;
pub mod constants;
pub mod error;
pub mod outcome;
pub mod page;
pub mod scope;
pub mod session;
pub mod theme;

pub use auth::{AuthState, AuthStore};
pub use config::{timeout_from_env_value, ClientConfig};
pub use constants::*;
pub use error::{CoreError, CoreResult};
pub use outcome::{
    build_submission_payload, interpret_submission_failure, interpret_submission_response,
    interpret_template_response, SubmissionError, TemplateError,
};
pub use page::{
    FormPage, LoadTicket, PageState, ReadyForm, ReloadBlocked, SubmitBlocked, SubmitFeedback,
};
pub use scope::SessionScope;
pub use session::{
    AnswerMap, FormSession, PatientField, PatientInfo, Sex, ValidatedPatient, ValidationFailure,
};
pub use theme::ThemeContext;
