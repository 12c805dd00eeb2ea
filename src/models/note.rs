use serde::{Deserialize, Serialize};

use super::{NoteId, Tag, TagId};

/// A note as it is persisted: tag references are stored as ids.
///
/// Notes are the primary unit of capture. Each note holds a title, a
/// markdown body, and an ordered list of tag ids. A stored id may point at a
/// tag that no longer exists; such dangling references are tolerated and
/// dropped when tags are resolved for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredNote {
    id: NoteId,
    title: String,
    markdown: String,
    tag_ids: Vec<TagId>,
}

impl StoredNote {
    /// Reconstructs a stored note from its parts.
    pub fn new(
        id: NoteId,
        title: impl Into<String>,
        markdown: impl Into<String>,
        tag_ids: Vec<TagId>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            markdown: markdown.into(),
            tag_ids,
        }
    }

    /// Builds a stored note from a draft, generating a fresh id.
    pub(crate) fn from_draft(draft: NoteDraft) -> Self {
        Self {
            id: NoteId::generate(),
            tag_ids: draft.into_tag_ids(),
            title: draft.title,
            markdown: draft.markdown,
        }
    }

    /// Returns the note's unique identifier.
    pub fn id(&self) -> &NoteId {
        &self.id
    }

    /// Returns the note's title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the note's markdown body.
    pub fn markdown(&self) -> &str {
        &self.markdown
    }

    /// Returns the ordered tag id references.
    pub fn tag_ids(&self) -> &[TagId] {
        &self.tag_ids
    }

    /// Replaces title, markdown, and tag ids in full. Partial updates are
    /// not supported; the id never changes.
    pub(crate) fn apply(&mut self, draft: NoteDraft) {
        self.tag_ids = draft.into_tag_ids();
        self.title = draft.title;
        self.markdown = draft.markdown;
    }
}

/// The payload for creating or updating a note.
///
/// A draft carries resolved `Tag` values rather than ids; the store flattens
/// them to ids when writing. An update always supplies all three fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    title: String,
    markdown: String,
    tags: Vec<Tag>,
}

impl NoteDraft {
    /// Creates a draft from its parts.
    ///
    /// # Examples
    ///
    /// ```
    /// use jot::{NoteDraft, Tag};
    ///
    /// let draft = NoteDraft::new("Shopping", "- milk\n- eggs", vec![Tag::new("errands")]);
    /// assert_eq!(draft.title(), "Shopping");
    /// assert_eq!(draft.tags().len(), 1);
    /// ```
    pub fn new(title: impl Into<String>, markdown: impl Into<String>, tags: Vec<Tag>) -> Self {
        Self {
            title: title.into(),
            markdown: markdown.into(),
            tags,
        }
    }

    /// Returns the draft title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the draft markdown body.
    pub fn markdown(&self) -> &str {
        &self.markdown
    }

    /// Returns the tags chosen for the note.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    fn into_tag_ids(&self) -> Vec<TagId> {
        self.tags.iter().map(|tag| tag.id().clone()).collect()
    }
}
