use serde::{Deserialize, Serialize};

use super::TagId;

/// A user-defined label for organizing notes.
///
/// Tags are identified independently of their text so a tag can be renamed
/// without rewriting the notes that reference it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    id: TagId,
    label: String,
}

impl Tag {
    /// Creates a new tag with a freshly generated id.
    ///
    /// # Examples
    ///
    /// ```
    /// use jot::Tag;
    ///
    /// let tag = Tag::new("rust");
    /// assert_eq!(tag.label(), "rust");
    /// assert!(!tag.id().as_str().is_empty());
    /// ```
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: TagId::generate(),
            label: label.into(),
        }
    }

    /// Reconstructs a tag from an existing id and label.
    ///
    /// # Examples
    ///
    /// ```
    /// use jot::{Tag, TagId};
    ///
    /// let tag = Tag::with_id(TagId::new("t-1"), "rust");
    /// assert_eq!(tag.id(), &TagId::new("t-1"));
    /// assert_eq!(tag.label(), "rust");
    /// ```
    pub fn with_id(id: TagId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }

    /// Returns the tag's unique identifier.
    pub fn id(&self) -> &TagId {
        &self.id
    }

    /// Returns the tag's label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Rewrites the label. Only the store renames tags.
    pub(crate) fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }
}
