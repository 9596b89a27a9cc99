//! Dynamic field schema.
//!
//! A form template carries its questionnaire as a JSON string (`schemaJson`). Once parsed it is an
//! ordered list of [`FieldDescriptor`]s; the order in the payload is the display order.
//!
//! Parsing is strict about structure (field types, unique ids, options for closed choices) and
//! lenient about extra keys, which the authoring tool is free to add.

use crate::{FormsError, FormsResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ============================================================================
// Public domain-level types
// ============================================================================

/// Kind of input a field renders as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldType {
    Text,
    Textarea,
    Number,
    Date,
    Select,
    Radio,
    Checkbox,
}

impl FieldType {
    /// Convert to the schema wire string.
    pub fn to_wire(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Select => "select",
            FieldType::Radio => "radio",
            FieldType::Checkbox => "checkbox",
        }
    }

    /// Parse from the schema wire string.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "text" => Some(FieldType::Text),
            "textarea" => Some(FieldType::Textarea),
            "number" => Some(FieldType::Number),
            "date" => Some(FieldType::Date),
            "select" => Some(FieldType::Select),
            "radio" => Some(FieldType::Radio),
            "checkbox" => Some(FieldType::Checkbox),
            _ => None,
        }
    }

    /// Whether answers must come from the field's `options`.
    pub fn is_closed_choice(self) -> bool {
        matches!(self, FieldType::Select | FieldType::Radio)
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_wire())
    }
}

/// One question of the dynamic part of a form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Answer key, unique within one schema.
    pub id: String,
    pub field_type: FieldType,
    pub label: String,
    pub placeholder: Option<String>,
    /// Declared mandatory by the schema author.
    pub required: bool,
    /// Choices in display order. Non-empty for closed-choice types.
    pub options: Vec<String>,
}

// ============================================================================
// Public operations
// ============================================================================

/// Parse a raw schema string into field descriptors.
///
/// Absent or blank input is an empty form, not an error.
///
/// # Errors
///
/// Returns [`FormsError::SchemaMalformed`] if:
/// - the text is not a JSON array of field objects (the message names the failing path),
/// - a field has an unknown `type` or an empty `id`,
/// - two fields share an `id`,
/// - a `select` or `radio` field has no options.
///
/// Callers are expected to recover by treating the form as having no fields and surfacing the
/// error as "form unavailable".
pub fn parse_schema(raw: Option<&str>) -> FormsResult<Vec<FieldDescriptor>> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(Vec::new()),
        Some(raw) => raw,
    };

    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let wire: Vec<FieldWire> = match serde_path_to_error::deserialize(&mut deserializer) {
        Ok(parsed) => parsed,
        Err(err) => {
            let path = err.path().to_string();
            let source = err.into_inner();
            let path = if path.is_empty() || path == "." {
                "<root>"
            } else {
                path.as_str()
            };
            return Err(FormsError::SchemaMalformed(format!(
                "schema mismatch at {path}: {source}"
            )));
        }
    };
    deserializer
        .end()
        .map_err(|e| FormsError::SchemaMalformed(format!("trailing content: {e}")))?;

    let mut seen = HashSet::with_capacity(wire.len());
    wire.into_iter()
        .enumerate()
        .map(|(index, field)| {
            let descriptor = wire_to_domain(index, field)?;
            if !seen.insert(descriptor.id.clone()) {
                return Err(FormsError::SchemaMalformed(format!(
                    "duplicate field id {:?} at [{index}]",
                    descriptor.id
                )));
            }
            Ok(descriptor)
        })
        .collect()
}

/// Render field descriptors back into schema JSON.
///
/// # Errors
///
/// Returns [`FormsError::InvalidJson`] if serialisation fails.
pub fn render_schema(fields: &[FieldDescriptor]) -> FormsResult<String> {
    let wire: Vec<FieldWire> = fields.iter().map(domain_to_wire).collect();
    Ok(serde_json::to_string(&wire)?)
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Deserialize, Serialize)]
struct FieldWire {
    id: String,

    #[serde(rename = "type")]
    field_type: String,

    label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    placeholder: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    required: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    options: Option<Vec<String>>,
}

fn wire_to_domain(index: usize, wire: FieldWire) -> FormsResult<FieldDescriptor> {
    let id = wire.id.trim();
    if id.is_empty() {
        return Err(FormsError::SchemaMalformed(format!(
            "field at [{index}] has an empty id"
        )));
    }

    let field_type = FieldType::from_wire(&wire.field_type).ok_or_else(|| {
        FormsError::SchemaMalformed(format!(
            "field {id:?} at [{index}] has unknown type {:?}",
            wire.field_type
        ))
    })?;

    let options = wire.options.unwrap_or_default();
    if field_type.is_closed_choice() && options.is_empty() {
        return Err(FormsError::SchemaMalformed(format!(
            "{field_type} field {id:?} at [{index}] has no options"
        )));
    }

    Ok(FieldDescriptor {
        id: id.to_string(),
        field_type,
        label: wire.label,
        placeholder: wire.placeholder,
        required: wire.required.unwrap_or(false),
        options,
    })
}

fn domain_to_wire(field: &FieldDescriptor) -> FieldWire {
    FieldWire {
        id: field.id.clone(),
        field_type: field.field_type.to_wire().to_string(),
        label: field.label.clone(),
        placeholder: field.placeholder.clone(),
        required: field.required.then_some(true),
        options: (!field.options.is_empty()).then(|| field.options.clone()),
    }
}
