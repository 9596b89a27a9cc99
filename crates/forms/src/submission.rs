//! Submission wire bodies.
//!
//! Request (`POST /api/public/forms/{uuid}/submit`):
//!
//! ```text
//! { "patient": { "name", "cpf", "sexo", "nascimento": "DD/MM/YYYY", "email"?, "celular"? },
//!   "answersJson": "<AnswerMap as JSON text>" }
//! ```
//!
//! Success is any 2xx; the backend currently answers `202 Accepted` with a
//! [`SubmissionReceipt`]. Failures carry an RFC 7807 problem body ([`ProblemDetailWire`]) with
//! either an `errors` mapping or a `detail` message.
//!
//! The staff dashboard listing ([`SubmissionSummary`] inside a [`Page`]) shares the
//! [`SubmissionStatus`] vocabulary and lives here too.

use crate::FormsResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Patient block of the submission request.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct PatientWire {
    pub name: String,
    pub cpf: String,
    pub sexo: String,
    /// Birth date in `DD/MM/YYYY`.
    pub nascimento: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub celular: Option<String>,
}

/// The exact body sent to the submission endpoint.
///
/// Built once per submit attempt and never modified afterwards; there are no setters.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    patient: PatientWire,
    answers_json: String,
}

impl SubmissionPayload {
    /// Assemble a payload, serialising the answers into a single JSON text field.
    ///
    /// # Errors
    ///
    /// Returns [`crate::FormsError::InvalidJson`] if the answers cannot be serialised.
    pub fn new(patient: PatientWire, answers: &BTreeMap<String, String>) -> FormsResult<Self> {
        Ok(Self {
            patient,
            answers_json: serde_json::to_string(answers)?,
        })
    }

    pub fn patient(&self) -> &PatientWire {
        &self.patient
    }

    pub fn answers_json(&self) -> &str {
        &self.answers_json
    }
}

/// Processing state of a stored submission.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    Pending,
    Processed,
    Error,
    SyncError,
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SubmissionStatus::Pending => "PENDING",
            SubmissionStatus::Processed => "PROCESSED",
            SubmissionStatus::Error => "ERROR",
            SubmissionStatus::SyncError => "SYNC_ERROR",
        };
        f.write_str(s)
    }
}

/// Body of a successful submission. Both fields are optional because an empty 2xx is also a
/// success.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    #[serde(default)]
    pub submission_id: Option<Uuid>,
    #[serde(default)]
    pub status: Option<SubmissionStatus>,
}

/// RFC 7807 problem body as produced by the backend's exception handler.
///
/// `errors` is a field → message mapping. Values are kept as raw JSON so that a non-string message
/// does not make the whole body unreadable.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ProblemDetailWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, serde_json::Value>>,
}

/// One row of the staff dashboard listing.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionSummary {
    pub id: Uuid,
    pub patient_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_cpf: Option<String>,
    pub status: SubmissionStatus,
    pub form_title: String,
    /// ISO 8601 instant as sent by the backend.
    pub created_at: String,
}

/// Spring-style page wrapper.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub size: u32,
    /// Current page index, 0-based.
    pub number: u32,
}
