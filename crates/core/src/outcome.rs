//! Interpretation of backend responses into user-facing outcomes.
//!
//! The transport hands over a status code and the raw body; everything here is pure so the
//! mapping can be exercised without a server.
//!
//! Submission failures are split three ways because each gets different text:
//! - a problem body with a non-empty `errors` mapping → [`SubmissionError::FieldValidation`]
//! - a problem body with a `detail` message → [`SubmissionError::Detail`]
//! - anything else → [`SubmissionError::Unknown`]

use crate::session::{AnswerMap, ValidatedPatient};
use crate::CoreResult;
use ctrls_forms::{FormTemplate, FormsError, ProblemDetailWire, SubmissionPayload, SubmissionReceipt};

/// Why a submission attempt did not succeed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    /// The backend rejected individual fields. Every message must be shown.
    #[error("validation failed: {}", .0.join("; "))]
    FieldValidation(Vec<String>),

    /// The backend rejected the submission with one descriptive message.
    #[error("{0}")]
    Detail(String),

    /// Network failure, timeout, or a response of unexpected shape. Safe to retry.
    #[error("submission failed: {0}")]
    Unknown(String),
}

impl SubmissionError {
    /// Text to present to the patient.
    pub fn user_message(&self) -> String {
        match self {
            SubmissionError::FieldValidation(messages) => {
                format!("Erro de validação:\n{}", messages.join("\n"))
            }
            SubmissionError::Detail(detail) => detail.clone(),
            SubmissionError::Unknown(_) => {
                "Erro ao enviar formulário. Verifique a sua conexão.".to_string()
            }
        }
    }

    /// True for network and unexpected failures, where resubmitting may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SubmissionError::Unknown(_))
    }
}

/// Why a template could not be shown.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// No template exists for the identifier. Terminal, not worth retrying.
    #[error("form not found")]
    NotFound,

    /// Network failure or an unexpected status. Retryable.
    #[error("form temporarily unavailable: {0}")]
    Unavailable(String),

    /// The backend answered 2xx but the body is not a usable template.
    #[error("malformed template: {0}")]
    Malformed(#[from] FormsError),
}

impl TemplateError {
    pub fn user_message(&self) -> &'static str {
        match self {
            TemplateError::NotFound => "Formulário não encontrado.",
            TemplateError::Unavailable(_) | TemplateError::Malformed(_) => {
                "Formulário indisponível no momento. Tente novamente mais tarde."
            }
        }
    }
}

/// Map a template fetch response to a template or a [`TemplateError`].
///
/// `404` and `400` are both "not found": the backend answers an unknown public identifier with
/// `400` and a detail message.
pub fn interpret_template_response(
    status: u16,
    body: &[u8],
) -> Result<FormTemplate, TemplateError> {
    match status {
        200..=299 => {
            let text = String::from_utf8_lossy(body);
            Ok(FormTemplate::parse_json(&text)?)
        }
        400 | 404 => Err(TemplateError::NotFound),
        other => {
            let detail = serde_json::from_slice::<ProblemDetailWire>(body)
                .ok()
                .and_then(|p| p.detail);
            Err(TemplateError::Unavailable(match detail {
                Some(detail) => format!("HTTP {other}: {detail}"),
                None => format!("HTTP {other}"),
            }))
        }
    }
}

/// Map a submission response to a receipt or a [`SubmissionError`].
///
/// Any 2xx is a success. A body that is empty or not a receipt yields an empty receipt.
pub fn interpret_submission_response(
    status: u16,
    body: &[u8],
) -> Result<SubmissionReceipt, SubmissionError> {
    if (200..300).contains(&status) {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(SubmissionReceipt::default());
        }
        return Ok(serde_json::from_slice(body).unwrap_or_else(|e| {
            tracing::debug!("submission accepted with unreadable body: {e}");
            SubmissionReceipt::default()
        }));
    }
    Err(interpret_submission_failure(status, body))
}

/// Classify a non-2xx submission response.
pub fn interpret_submission_failure(status: u16, body: &[u8]) -> SubmissionError {
    let problem = match serde_json::from_slice::<ProblemDetailWire>(body) {
        Ok(problem) => problem,
        Err(_) => return SubmissionError::Unknown(format!("HTTP {status} with unreadable body")),
    };

    if let Some(errors) = problem.errors.filter(|e| !e.is_empty()) {
        let messages = errors
            .into_values()
            .map(|v| match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .collect();
        return SubmissionError::FieldValidation(messages);
    }

    match problem.detail.filter(|d| !d.trim().is_empty()) {
        Some(detail) => SubmissionError::Detail(detail),
        None => SubmissionError::Unknown(format!("HTTP {status} without errors or detail")),
    }
}

/// Build the immutable wire payload for one submission attempt.
///
/// The birth date is converted to `DD/MM/YYYY` and the answers are serialised to JSON text.
pub fn build_submission_payload(
    patient: &ValidatedPatient,
    answers: &AnswerMap,
) -> CoreResult<SubmissionPayload> {
    Ok(SubmissionPayload::new(patient.to_wire(), answers.as_map())?)
}
