//! Public form template and branding.
//!
//! The backend serves one template per public identifier:
//!
//! ```text
//! GET /api/public/forms/{uuid}
//! { "id", "title", "description"?, "schemaJson",
//!   "clinicBranding": { "name", "logoUrl"?, "primaryColor"?, "address"? },
//!   "doctorBranding"?: { "name", "profilePhotoUrl"?, "bannerUrl"?, "bio"? } }
//! ```
//!
//! [`FormTemplateWire`] mirrors that body exactly; [`FormTemplate`] is the validated domain view
//! that the rest of the workspace uses. Blank optional strings are normalised to `None` so that,
//! for example, an empty `primaryColor` never reaches the theme.

use crate::schema::{parse_schema, FieldDescriptor};
use crate::{FormsError, FormsResult};
use ctrls_types::PublicId;
use serde::{Deserialize, Serialize};

// ============================================================================
// Public domain-level types
// ============================================================================

/// Clinic display identity applied to the public form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClinicBranding {
    pub name: String,
    pub logo_url: Option<String>,
    /// Hex color, for example `#007bff`.
    pub primary_color: Option<String>,
    pub address: Option<String>,
}

/// Doctor display identity, present when the template belongs to a specific doctor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DoctorBranding {
    pub name: String,
    pub profile_photo_url: Option<String>,
    pub banner_url: Option<String>,
    pub bio: Option<String>,
}

/// A form template as fetched for one public identifier.
///
/// Read-only for the duration of a form session. `raw_schema` stays opaque until
/// [`FormTemplate::fields`] is called.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormTemplate {
    pub public_id: PublicId,
    pub title: String,
    pub description: Option<String>,
    pub raw_schema: Option<String>,
    pub clinic_branding: ClinicBranding,
    pub doctor_branding: Option<DoctorBranding>,
}

impl FormTemplate {
    /// Parse a template from the JSON body returned by the backend.
    ///
    /// # Errors
    ///
    /// Returns [`FormsError::Translation`] if the body does not match the template wire shape
    /// (the message names the failing path) or the `id` is not a usable public identifier.
    pub fn parse_json(body: &str) -> FormsResult<Self> {
        let mut deserializer = serde_json::Deserializer::from_str(body);
        let wire: FormTemplateWire = serde_path_to_error::deserialize(&mut deserializer)
            .map_err(|err| {
                let path = err.path().to_string();
                FormsError::Translation(format!(
                    "template mismatch at {path}: {}",
                    err.into_inner()
                ))
            })?;
        Self::try_from(wire)
    }

    /// Parse the dynamic field schema carried by this template.
    ///
    /// # Errors
    ///
    /// See [`parse_schema`].
    pub fn fields(&self) -> FormsResult<Vec<FieldDescriptor>> {
        parse_schema(self.raw_schema.as_deref())
    }

    /// The clinic's configured primary color, if any.
    pub fn primary_color(&self) -> Option<&str> {
        self.clinic_branding.primary_color.as_deref()
    }
}

// ============================================================================
// Wire types
// ============================================================================

/// Exact JSON shape of `GET /api/public/forms/{uuid}`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FormTemplateWire {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub schema_json: Option<String>,
    pub clinic_branding: ClinicBrandingWire,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_branding: Option<DoctorBrandingWire>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClinicBrandingWire {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DoctorBrandingWire {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

// ============================================================================
// Translation
// ============================================================================

impl TryFrom<FormTemplateWire> for FormTemplate {
    type Error = FormsError;

    fn try_from(wire: FormTemplateWire) -> FormsResult<Self> {
        let public_id = PublicId::parse(&wire.id)
            .map_err(|e| FormsError::Translation(format!("invalid template id: {e}")))?;

        Ok(FormTemplate {
            public_id,
            title: wire.title,
            description: non_blank(wire.description),
            raw_schema: non_blank(wire.schema_json),
            clinic_branding: ClinicBranding {
                name: wire.clinic_branding.name,
                logo_url: non_blank(wire.clinic_branding.logo_url),
                primary_color: non_blank(wire.clinic_branding.primary_color),
                address: non_blank(wire.clinic_branding.address),
            },
            doctor_branding: wire.doctor_branding.map(|d| DoctorBranding {
                name: d.name,
                profile_photo_url: non_blank(d.profile_photo_url),
                banner_url: non_blank(d.banner_url),
                bio: non_blank(d.bio),
            }),
        })
    }
}

impl From<&FormTemplate> for FormTemplateWire {
    fn from(template: &FormTemplate) -> Self {
        FormTemplateWire {
            id: template.public_id.to_string(),
            title: template.title.clone(),
            description: template.description.clone(),
            schema_json: template.raw_schema.clone(),
            clinic_branding: ClinicBrandingWire {
                name: template.clinic_branding.name.clone(),
                logo_url: template.clinic_branding.logo_url.clone(),
                primary_color: template.clinic_branding.primary_color.clone(),
                address: template.clinic_branding.address.clone(),
            },
            doctor_branding: template
                .doctor_branding
                .as_ref()
                .map(|d| DoctorBrandingWire {
                    name: d.name.clone(),
                    profile_photo_url: d.profile_photo_url.clone(),
                    banner_url: d.banner_url.clone(),
                    bio: d.bio.clone(),
                }),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldType;

    const SAMPLE: &str = r##"{
        "id": "3f1c2a9e-7b4d-4e2a-9c11-0a5b6c7d8e9f",
        "title": "Anamnese Geral",
        "description": "Preencha antes da consulta",
        "schemaJson": "[{\"id\":\"q1\",\"type\":\"text\",\"label\":\"Queixa principal\",\"required\":true}]",
        "clinicBranding": {
            "name": "Clínica Vida",
            "logoUrl": "https://cdn.example.com/logo.png",
            "primaryColor": "#007bff",
            "address": "Rua das Flores, 100"
        },
        "doctorBranding": {
            "name": "Dra. Helena",
            "bio": "Clínica geral"
        }
    }"##;

    #[test]
    fn parses_full_template() {
        let template = FormTemplate::parse_json(SAMPLE).expect("valid template");
        assert_eq!(
            template.public_id.as_str(),
            "3f1c2a9e-7b4d-4e2a-9c11-0a5b6c7d8e9f"
        );
        assert_eq!(template.title, "Anamnese Geral");
        assert_eq!(template.primary_color(), Some("#007bff"));
        assert_eq!(template.clinic_branding.name, "Clínica Vida");
        let doctor = template.doctor_branding.as_ref().expect("doctor branding");
        assert_eq!(doctor.name, "Dra. Helena");
        assert_eq!(doctor.bio.as_deref(), Some("Clínica geral"));
        assert!(doctor.banner_url.is_none());

        let fields = template.fields().expect("valid schema");
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].field_type, FieldType::Text);
        assert!(fields[0].required);
    }

    #[test]
    fn parses_minimal_template_and_normalises_blanks() {
        let body = r#"{
            "id": "abc123",
            "title": "Retorno",
            "schemaJson": null,
            "clinicBranding": { "name": "Clínica Sol", "primaryColor": "  " }
        }"#;
        let template = FormTemplate::parse_json(body).expect("valid template");
        assert!(template.description.is_none());
        assert!(template.raw_schema.is_none());
        assert!(template.primary_color().is_none());
        assert!(template.doctor_branding.is_none());
        assert!(template.fields().expect("no schema").is_empty());
    }

    #[test]
    fn reports_path_of_shape_mismatch() {
        let body = r#"{ "id": "abc", "title": "T", "clinicBranding": {} }"#;
        let err = FormTemplate::parse_json(body).expect_err("missing clinic name");
        match err {
            FormsError::Translation(msg) => {
                assert!(msg.contains("clinicBranding"), "{msg}");
                assert!(msg.contains("name"), "{msg}");
            }
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unusable_public_id() {
        let body = r#"{ "id": "a/b", "title": "T", "clinicBranding": { "name": "C" } }"#;
        let err = FormTemplate::parse_json(body).expect_err("slash in id");
        assert!(matches!(err, FormsError::Translation(msg) if msg.contains("invalid template id")));
    }

    #[test]
    fn wire_conversion_keeps_camel_case_keys() {
        let template = FormTemplate::parse_json(SAMPLE).expect("valid template");
        let wire = FormTemplateWire::from(&template);
        let json = serde_json::to_string(&wire).expect("serialise");
        assert!(json.contains("\"schemaJson\""));
        assert!(json.contains("\"primaryColor\":\"#007bff\""));
        assert!(json.contains("\"doctorBranding\""));
        let reparsed = FormTemplate::parse_json(&json).expect("reparse");
        assert_eq!(reparsed, template);
    }
}
