//! # ctrls types
//!
//! Small validated primitives shared by the form crates.
//!
//! - [`NonEmptyText`]: text that is guaranteed to hold at least one non-whitespace character.
//! - [`PublicId`]: the opaque public identifier of a form template, safe to embed in a URL path.

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("text cannot be empty")]
    Empty,

    /// The public identifier was longer than [`PublicId::MAX_LEN`]
    #[error("public id exceeds maximum length of {max} characters")]
    TooLong { max: usize },

    /// The public identifier contained a character outside `[A-Za-z0-9_-]`
    #[error("public id contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// A string that holds at least one non-whitespace character.
///
/// Input is trimmed on construction, so `"  Ana  "` is stored as `"Ana"`. Deserializing goes
/// through the same check, so a stored blank value is rejected rather than loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the trimmed text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(s).map_err(serde::de::Error::custom)
    }
}

/// Opaque public identifier of a form template.
///
/// The backend currently issues UUIDs, but clients treat the value as an opaque token. The only
/// guarantee is that it can be placed in a URL path segment verbatim: it is non-empty, bounded in
/// length and restricted to ASCII alphanumerics, `-` and `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PublicId(String);

impl PublicId {
    /// Longest identifier accepted, in bytes.
    pub const MAX_LEN: usize = 128;

    /// Parse a public identifier from user or URL input.
    ///
    /// Leading and trailing whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns a [`TextError`] if the value is empty, too long, or contains a character that is
    /// not path-segment safe.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        if trimmed.len() > Self::MAX_LEN {
            return Err(TextError::TooLong { max: Self::MAX_LEN });
        }
        if let Some(bad) = trimmed
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(TextError::InvalidCharacter(bad));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the identifier as it appears in a URL path.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PublicId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for PublicId {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
