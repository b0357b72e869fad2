use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use serde::Serialize;

use crate::error::{Result, StoreError};

/// Field-level error messages shown next to form inputs.
pub mod messages {
    /// Empty required field.
    pub const REQUIRED: &str = "This field is required.";
    /// Post text already used by some post.
    pub const TEXT_NOT_UNIQUE: &str = "This text is not unique, or the post was not edited.";
    /// Group id that does not exist.
    pub const UNKNOWN_GROUP: &str = "Select a valid group.";
    /// Attachment that is not one of the accepted image types.
    pub const INVALID_IMAGE: &str = "Upload a valid image: gif, jpg, jpeg, png or webp.";
    /// Slug with characters outside `[A-Za-z0-9_-]`.
    pub const INVALID_SLUG: &str = "Use only letters, numbers, underscores or hyphens.";
    /// Slug already taken by another group.
    pub const SLUG_TAKEN: &str = "A group with this slug already exists.";
    /// Username outside `[A-Za-z0-9@.+_-]`, or too long.
    pub const INVALID_USERNAME: &str =
        "Enter a valid username of at most 150 letters, digits and @/./+/-/_ characters.";
    /// Username already registered.
    pub const USERNAME_TAKEN: &str = "A user with that username already exists.";
    /// Username that would shadow a route.
    pub const USERNAME_RESERVED: &str = "This username is reserved.";
}

/// Usernames that collide with top-level routes.
pub const RESERVED_USERNAMES: &[&str] = &["new", "follow", "group", "auth", "about", "media", "404", "500"];

const IMAGE_EXTENSIONS: &[&str] = &["gif", "jpg", "jpeg", "png", "webp"];

/// Validation messages keyed by form field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Creates an empty set of errors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates errors holding a single message.
    #[must_use]
    pub fn single(field: &str, message: &str) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Records `message` against `field`.
    pub fn add(&mut self, field: &str, message: &str) -> &mut Self {
        self.0.entry(field.to_owned()).or_default().push(message.to_owned());
        self
    }

    /// Messages recorded against `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// Appends every message of `other`.
    pub fn merge(&mut self, other: Self) -> &mut Self {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
        self
    }

    /// Returns `true` if no field has errors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Validation(self))
        }
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Returns the normalized extension of `file_name` if it names an accepted image type.
#[must_use]
pub fn image_extension(file_name: &str) -> Option<&'static str> {
    let (_, extension) = file_name.rsplit_once('.')?;
    let extension = extension.to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().copied().find(|candidate| *candidate == extension)
}

pub(crate) fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

pub(crate) fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username.chars().count() <= 150
        && username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension("cat.PNG"), Some("png"));
        assert_eq!(image_extension("small.gif"), Some("gif"));
        assert_eq!(image_extension("archive.tar.gz"), None);
        assert_eq!(image_extension("noext"), None);
    }

    #[test]
    fn test_slug_and_username_rules() {
        assert!(is_valid_slug("test-slug_2"));
        assert!(!is_valid_slug("with space"));
        assert!(!is_valid_slug(""));

        assert!(is_valid_username("Stas.Basov+1"));
        assert!(!is_valid_username("bad/name"));
        assert!(!is_valid_username(&"x".repeat(151)));
    }

    #[test]
    fn test_field_errors_display() {
        let mut errors = FieldErrors::new();
        assert!(errors.clone().into_result().is_ok());
        errors.add("text", messages::REQUIRED).add("group", messages::UNKNOWN_GROUP);
        assert_eq!(errors.get("text"), [messages::REQUIRED]);
        assert!(errors.get("image").is_empty());
        assert_eq!(
            errors.to_string(),
            format!("group: {}; text: {}", messages::UNKNOWN_GROUP, messages::REQUIRED)
        );
        assert!(matches!(errors.into_result(), Err(StoreError::Validation(_))));
    }

    #[test]
    fn test_field_errors_merge() {
        let mut errors = FieldErrors::single("image", messages::INVALID_IMAGE);
        errors.merge(FieldErrors::single("text", messages::TEXT_NOT_UNIQUE));
        errors.merge(FieldErrors::single("image", messages::REQUIRED));
        assert_eq!(errors.get("text"), [messages::TEXT_NOT_UNIQUE]);
        assert_eq!(errors.get("image"), [messages::INVALID_IMAGE, messages::REQUIRED]);
    }
}
