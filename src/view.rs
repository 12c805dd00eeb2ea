use crate::models::{NoteId, StoredNote, Tag};
use crate::store::NoteStore;

/// A note with its tag references resolved to tag values.
///
/// Derived on demand from the persisted collections; never stored and never
/// mutated in place. Recomputed whenever notes or tags change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteView {
    pub id: NoteId,
    pub title: String,
    pub markdown: String,
    pub tags: Vec<Tag>,
}

impl NoteView {
    /// Builds the view form of a note against the current tag set.
    pub fn resolve(note: &StoredNote, tags: &[Tag]) -> Self {
        Self {
            id: note.id().clone(),
            title: note.title().to_string(),
            markdown: note.markdown().to_string(),
            tags: resolve_tags(note, tags),
        }
    }
}

/// Maps each tag id on the note to its tag value, preserving the note's id
/// order. Ids without a match are dropped: a deleted tag leaves dangling
/// references behind, and this is where they are filtered out.
pub fn resolve_tags(note: &StoredNote, tags: &[Tag]) -> Vec<Tag> {
    note.tag_ids()
        .iter()
        .filter_map(|id| tags.iter().find(|tag| tag.id() == id))
        .cloned()
        .collect()
}

/// Filters note views by title substring and selected tags.
///
/// A note is kept when the query is empty or matches its title
/// case-insensitively, and when every selected tag appears among its
/// resolved tags (conjunctive across selections). Returns a fresh sequence
/// in the input order; the input is never mutated.
///
/// # Examples
///
/// ```
/// use jot::{NoteView, filter_notes};
/// use jot::{NoteId, Tag};
///
/// let notes = vec![NoteView {
///     id: NoteId::new("n-1"),
///     title: "Cat food".to_string(),
///     markdown: String::new(),
///     tags: vec![],
/// }];
///
/// assert_eq!(filter_notes(&notes, "CAT", &[]).len(), 1);
/// assert!(filter_notes(&notes, "dog", &[]).is_empty());
/// ```
pub fn filter_notes(notes: &[NoteView], title_query: &str, selected: &[Tag]) -> Vec<NoteView> {
    let query = title_query.to_lowercase();
    notes
        .iter()
        .filter(|note| query.is_empty() || note.title.to_lowercase().contains(&query))
        .filter(|note| {
            selected
                .iter()
                .all(|wanted| note.tags.iter().any(|tag| tag.id() == wanted.id()))
        })
        .cloned()
        .collect()
}

/// Memoized note views keyed on the store revision.
///
/// Recomputing views is always safe and idempotent; the cache only avoids
/// redoing the join when nothing changed between pulls.
#[derive(Default)]
pub struct ViewCache {
    revision: Option<u64>,
    views: Vec<NoteView>,
}

impl ViewCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the resolved views for the store's current state,
    /// recomputing only when the store revision moved.
    pub fn views(&mut self, store: &NoteStore) -> &[NoteView] {
        if self.revision != Some(store.revision()) {
            self.views = store
                .notes()
                .iter()
                .map(|note| NoteView::resolve(note, store.tags()))
                .collect();
            self.revision = Some(store.revision());
        }
        &self.views
    }
}
