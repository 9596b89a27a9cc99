//! Wire/boundary support for clinic public forms.
//!
//! This crate provides the **wire models** exchanged with the forms backend and the
//! **translation helpers** that turn them into domain values:
//! - brand color conversion for theming ([`color`])
//! - date representation changes between edit, display and wire formats ([`dates`])
//! - the dynamic field schema carried inside a template ([`schema`])
//! - the public template view and its branding ([`template`])
//! - the submission request/response bodies ([`submission`])
//!
//! No HTTP lives here. Session state and outcome interpretation belong in `ctrls-core`; the
//! transport belongs in `ctrls-client`.

pub mod color;
pub mod dates;
pub mod schema;
pub mod submission;
pub mod template;

pub use color::{to_display_color, DisplayColor};
pub use dates::{edit_to_wire_date, format_datetime_for_display, format_for_display};
pub use schema::{parse_schema, render_schema, FieldDescriptor, FieldType};
pub use submission::{
    Page, PatientWire, ProblemDetailWire, SubmissionPayload, SubmissionReceipt, SubmissionStatus,
    SubmissionSummary,
};
pub use template::{ClinicBranding, DoctorBranding, FormTemplate, FormTemplateWire};

/// Errors returned by the `ctrls-forms` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FormsError {
    #[error("invalid color: {0}")]
    InvalidColor(String),

    #[error("malformed schema: {0}")]
    SchemaMalformed(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`FormsError`].
pub type FormsResult<T> = Result<T, FormsError>;
