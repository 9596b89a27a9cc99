//! Theme variables for a template's display session.
//!
//! The theme is an explicit value handed to the render layer rather than process-wide state.
//! It is owned by whoever displays a template and is tied to that template: applying a different
//! template drops everything the previous one set.

use crate::constants::PRIMARY_THEME_VARIABLE;
use ctrls_forms::{to_display_color, DisplayColor, FormTemplate};
use ctrls_types::PublicId;
use std::collections::BTreeMap;

/// CSS custom properties derived from a template's branding.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ThemeContext {
    owner: Option<PublicId>,
    variables: BTreeMap<String, String>,
}

impl ThemeContext {
    /// Creates an empty theme with no owner, which renders the default palette.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the branding of `template`.
    ///
    /// Every call re-derives the variables; nothing is cached across templates. A missing or
    /// invalid primary color leaves the default palette in place (the invalid case is logged).
    ///
    /// # Returns
    ///
    /// The color written to `--primary`, if any.
    pub fn apply_template(&mut self, template: &FormTemplate) -> Option<DisplayColor> {
        self.variables.clear();
        self.owner = Some(template.public_id.clone());

        let hex = template.primary_color()?;
        match to_display_color(hex) {
            Ok(color) => {
                self.variables
                    .insert(PRIMARY_THEME_VARIABLE.to_string(), color.to_string());
                tracing::debug!(
                    public_id = %template.public_id,
                    primary = %color,
                    "applied clinic theme"
                );
                Some(color)
            }
            Err(e) => {
                self.variables.remove(PRIMARY_THEME_VARIABLE);
                tracing::warn!(
                    public_id = %template.public_id,
                    "ignoring clinic primary color: {e}"
                );
                None
            }
        }
    }

    /// Template whose display session this theme belongs to.
    pub fn owner(&self) -> Option<&PublicId> {
        self.owner.as_ref()
    }

    /// Looks up one CSS custom property.
    ///
    /// # Arguments
    ///
    /// * `name` - property name including the leading dashes, e.g. `--primary`.
    ///
    /// # Returns
    ///
    /// The HSL value set by the last applied template, or `None` if the property is unset.
    ///
    /// # Examples
    ///
    /// ```
    /// use ctrls_core::ThemeContext;
    /// use ctrls_forms::FormTemplate;
    ///
    /// let template = FormTemplate::parse_json(
    ///     r##"{"id":"form-1","title":"Anamnese","clinicBranding":{"name":"Vida","primaryColor":"#007bff"}}"##,
    /// )?;
    /// let mut theme = ThemeContext::new();
    /// theme.apply_template(&template);
    /// assert_eq!(theme.variable("--primary"), Some("211 100% 50%"));
    /// assert_eq!(theme.variable("--accent"), None);
    /// # Ok::<(), ctrls_forms::FormsError>(())
    /// ```
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    /// Shorthand for the `--primary` variable.
    pub fn primary(&self) -> Option<&str> {
        self.variable(PRIMARY_THEME_VARIABLE)
    }

    /// All set properties as `(name, value)` pairs, ordered by name.
    pub fn variables(&self) -> impl Iterator<Item = (&str, &str)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render the variables as a `:root` rule. Empty when nothing is set.
    pub fn to_css(&self) -> String {
        if self.variables.is_empty() {
            return String::new();
        }
        let body: String = self
            .variables
            .iter()
            .map(|(k, v)| format!("  {k}: {v};\n"))
            .collect();
        format!(":root {{\n{body}}}\n")
    }

    /// End the display session: drop the owner and every variable.
    pub fn clear(&mut self) {
        self.owner = None;
        self.variables.clear();
    }
}
