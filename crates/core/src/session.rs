//! Form-filling session state.
//!
//! A [`FormSession`] lives for one patient filling one template. It owns:
//! - the parsed field list (display order)
//! - the patient identity block ([`PatientInfo`])
//! - the dynamic answers ([`AnswerMap`])
//!
//! Writes are plain replacements; validation happens once, right before submission, in
//! [`FormSession::validate_for_submit`].

use crate::{CoreError, CoreResult};
use ctrls_forms::{FieldDescriptor, PatientWire};
use ctrls_types::NonEmptyText;
use std::collections::BTreeMap;

// ============================================================================
// Patient identity
// ============================================================================

/// Patient sex as accepted by the submission endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Sex {
    #[default]
    M,
    F,
}

impl Sex {
    pub fn to_wire(self) -> &'static str {
        match self {
            Sex::M => "M",
            Sex::F => "F",
        }
    }

    pub fn from_wire(s: &str) -> Option<Self> {
        match s.trim() {
            "M" | "m" => Some(Sex::M),
            "F" | "f" => Some(Sex::F),
            _ => None,
        }
    }
}

/// Keys of the patient identity block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PatientField {
    Name,
    Cpf,
    Sexo,
    BirthDate,
    Email,
    Phone,
}

impl PatientField {
    /// Fields that must be non-blank before a submission is attempted.
    pub const MANDATORY: [PatientField; 3] =
        [PatientField::Name, PatientField::Cpf, PatientField::BirthDate];

    pub fn key(self) -> &'static str {
        match self {
            PatientField::Name => "name",
            PatientField::Cpf => "cpf",
            PatientField::Sexo => "sexo",
            PatientField::BirthDate => "birthDate",
            PatientField::Email => "email",
            PatientField::Phone => "phone",
        }
    }
}

impl std::fmt::Display for PatientField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for PatientField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(PatientField::Name),
            "cpf" => Ok(PatientField::Cpf),
            "sexo" => Ok(PatientField::Sexo),
            "birthDate" | "nascimento" => Ok(PatientField::BirthDate),
            "email" => Ok(PatientField::Email),
            "phone" | "celular" => Ok(PatientField::Phone),
            other => Err(CoreError::InvalidInput(format!(
                "unknown patient field {other:?}"
            ))),
        }
    }
}

/// Patient identity as being edited.
///
/// `birth_date` holds the edit representation (`YYYY-MM-DD`). Blank `email`/`phone` mean
/// "not provided".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatientInfo {
    pub name: String,
    pub cpf: String,
    pub sexo: Sex,
    pub birth_date: String,
    pub email: String,
    pub phone: String,
}

/// Patient identity that passed pre-submit validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedPatient {
    pub name: NonEmptyText,
    pub cpf: NonEmptyText,
    pub sexo: Sex,
    /// Still in edit representation; converted when the payload is built.
    pub birth_date: NonEmptyText,
    pub email: Option<NonEmptyText>,
    pub phone: Option<NonEmptyText>,
}

impl ValidatedPatient {
    /// Wire block with the birth date converted to `DD/MM/YYYY`.
    pub fn to_wire(&self) -> PatientWire {
        PatientWire {
            name: self.name.to_string(),
            cpf: self.cpf.to_string(),
            sexo: self.sexo.to_wire().to_string(),
            nascimento: ctrls_forms::edit_to_wire_date(self.birth_date.as_str()),
            email: self.email.as_ref().map(ToString::to_string),
            celular: self.phone.as_ref().map(ToString::to_string),
        }
    }
}

/// Pre-submit validation failure: mandatory patient fields left blank.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("missing mandatory patient fields: {}", join_keys(.missing_fields))]
pub struct ValidationFailure {
    pub missing_fields: Vec<PatientField>,
}

impl ValidationFailure {
    pub fn missing_keys(&self) -> Vec<&'static str> {
        self.missing_fields.iter().map(|f| f.key()).collect()
    }

    pub fn user_message(&self) -> &'static str {
        "Por favor, preencha todos os campos obrigatórios do paciente."
    }
}

fn join_keys(fields: &[PatientField]) -> String {
    fields
        .iter()
        .map(|f| f.key())
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Answers
// ============================================================================

/// Dynamic answers keyed by [`FieldDescriptor::id`].
///
/// Values are strings for every field type, matching what the backend stores in `answersJson`.
/// Ordered by key so the serialised form is stable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnswerMap(BTreeMap<String, String>);

impl AnswerMap {
    /// Creates an empty answer map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite one answer.
    pub fn set(&mut self, field_id: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field_id.into(), value.into());
    }

    /// Returns the answer recorded for a field.
    ///
    /// # Arguments
    ///
    /// * `field_id` - the [`FieldDescriptor::id`] the answer was set under.
    ///
    /// # Returns
    ///
    /// The stored value, or `None` if the field has not been answered.
    pub fn get(&self, field_id: &str) -> Option<&str> {
        self.0.get(field_id).map(String::as_str)
    }

    /// Number of answered fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates `(field_id, value)` pairs in key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use ctrls_core::AnswerMap;
    ///
    /// let mut answers = AnswerMap::new();
    /// answers.set("q2", "sim");
    /// answers.set("q1", "febre");
    /// answers.set("q2", "nao");
    /// assert_eq!(answers.len(), 2);
    /// let pairs: Vec<(&str, &str)> = answers.iter().collect();
    /// assert_eq!(pairs, [("q1", "febre"), ("q2", "nao")]);
    /// ```
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Borrow the underlying map, as serialised into `answersJson`.
    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }

    fn clear(&mut self) {
        self.0.clear();
    }
}

// ============================================================================
// Session
// ============================================================================

/// Mutable state of one form-filling session.
#[derive(Clone, Debug, Default)]
pub struct FormSession {
    fields: Vec<FieldDescriptor>,
    patient: PatientInfo,
    answers: AnswerMap,
}

impl FormSession {
    /// Start a session for the given fields (already in display order).
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        Self {
            fields,
            patient: PatientInfo::default(),
            answers: AnswerMap::new(),
        }
    }

    /// Dynamic fields in display order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn patient(&self) -> &PatientInfo {
        &self.patient
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    /// Replace one patient identity value. No validation happens at write time.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] only for [`PatientField::Sexo`] when the value is not
    /// `M` or `F`, since that field cannot hold anything else.
    pub fn update_patient_field(
        &mut self,
        field: PatientField,
        value: impl Into<String>,
    ) -> CoreResult<()> {
        let value = value.into();
        match field {
            PatientField::Name => self.patient.name = value,
            PatientField::Cpf => self.patient.cpf = value,
            PatientField::BirthDate => self.patient.birth_date = value,
            PatientField::Email => self.patient.email = value,
            PatientField::Phone => self.patient.phone = value,
            PatientField::Sexo => {
                self.patient.sexo = Sex::from_wire(&value).ok_or_else(|| {
                    CoreError::InvalidInput(format!("sexo must be M or F, got {value:?}"))
                })?;
            }
        }
        Ok(())
    }

    /// Insert or overwrite the answer for a dynamic field.
    pub fn update_answer(&mut self, field_id: impl Into<String>, value: impl Into<String>) {
        self.answers.set(field_id, value);
    }

    /// Check the mandatory patient fields before any network call.
    ///
    /// Only `name`, `cpf` and `birthDate` are checked. Dynamic fields marked `required` are not
    /// part of this check; see [`FormSession::unanswered_required_fields`].
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationFailure`] listing every blank mandatory field, in form order.
    pub fn validate_for_submit(&self) -> Result<ValidatedPatient, ValidationFailure> {
        let name = NonEmptyText::new(&self.patient.name).ok();
        let cpf = NonEmptyText::new(&self.patient.cpf).ok();
        let birth_date = NonEmptyText::new(&self.patient.birth_date).ok();

        match (name, cpf, birth_date) {
            (Some(name), Some(cpf), Some(birth_date)) => Ok(ValidatedPatient {
                name,
                cpf,
                sexo: self.patient.sexo,
                birth_date,
                email: NonEmptyText::new(&self.patient.email).ok(),
                phone: NonEmptyText::new(&self.patient.phone).ok(),
            }),
            (name, cpf, birth_date) => {
                let missing_fields = [
                    (PatientField::Name, name.is_none()),
                    (PatientField::Cpf, cpf.is_none()),
                    (PatientField::BirthDate, birth_date.is_none()),
                ]
                .into_iter()
                .filter_map(|(field, missing)| missing.then_some(field))
                .collect();
                Err(ValidationFailure { missing_fields })
            }
        }
    }

    /// Dynamic fields declared `required` that have no non-blank answer yet, in display order.
    pub fn unanswered_required_fields(&self) -> Vec<&FieldDescriptor> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .filter(|f| {
                self.answers
                    .get(&f.id)
                    .map_or(true, |v| v.trim().is_empty())
            })
            .collect()
    }

    /// Clear patient identity and answers. The field list is kept.
    pub fn reset(&mut self) {
        self.patient = PatientInfo::default();
        self.answers.clear();
    }
}
