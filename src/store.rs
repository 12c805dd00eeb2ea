use anyhow::{Context, Result};

use crate::models::{NoteDraft, NoteId, StoredNote, Tag, TagId};
use crate::storage::{NOTES_KEY, Storage, TAGS_KEY};

/// Canonical owner of the note and tag collections.
///
/// All mutation funnels through the operations below; the collections are
/// never handed out mutably, so readers only ever observe fully applied
/// states. Every mutation persists the touched collection before returning,
/// bumps the revision counter, and notifies subscribers.
///
/// Absent ids on update, rename, or delete are silent no-ops: ids are
/// generated internally and never typed by a user, so the miss path is
/// defensive rather than expected.
///
/// # Examples
///
/// ```
/// use jot::{NoteDraft, NoteStore, Storage, Tag};
///
/// # fn main() -> anyhow::Result<()> {
/// let mut store = NoteStore::open(Storage::in_memory());
///
/// let rust = Tag::new("rust");
/// store.add_tag(rust.clone())?;
/// let id = store.create_note(NoteDraft::new("Borrowing", "notes on &mut", vec![rust]))?;
///
/// assert_eq!(store.notes().len(), 1);
/// store.delete_note(&id)?;
/// assert!(store.notes().is_empty());
/// # Ok(())
/// # }
/// ```
pub struct NoteStore {
    storage: Storage,
    notes: Vec<StoredNote>,
    tags: Vec<Tag>,
    revision: u64,
    subscribers: Vec<Box<dyn FnMut(u64)>>,
}

impl NoteStore {
    /// Opens a store over the given storage, loading both collections.
    ///
    /// Missing or corrupt persisted data yields empty collections, never an
    /// error.
    pub fn open(storage: Storage) -> Self {
        let notes = storage.read(NOTES_KEY, Vec::new());
        let tags = storage.read(TAGS_KEY, Vec::new());
        Self {
            storage,
            notes,
            tags,
            revision: 0,
            subscribers: Vec::new(),
        }
    }

    /// Returns the notes in insertion order.
    pub fn notes(&self) -> &[StoredNote] {
        &self.notes
    }

    /// Returns the tags in insertion order.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Returns the current revision. Bumped once per applied mutation;
    /// derivation caches key on it.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Looks up a note by id.
    pub fn get_note(&self, id: &NoteId) -> Option<&StoredNote> {
        self.notes.iter().find(|note| note.id() == id)
    }

    /// Looks up a tag by its exact label.
    pub fn find_tag_by_label(&self, label: &str) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.label() == label)
    }

    /// Registers an observer called with the new revision after every
    /// mutation. Observers pull fresh snapshots from the store; they are
    /// never handed the collections.
    pub fn subscribe(&mut self, subscriber: impl FnMut(u64) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Creates a note from the draft, appends it, and returns its fresh id.
    pub fn create_note(&mut self, draft: NoteDraft) -> Result<NoteId> {
        let note = StoredNote::from_draft(draft);
        let id = note.id().clone();
        self.notes.push(note);
        self.persist_notes()?;
        self.touch();
        Ok(id)
    }

    /// Replaces title, markdown, and tag references of the matching note.
    ///
    /// Full replacement only; the draft always supplies all three fields.
    /// Silent no-op when no note has the given id.
    pub fn update_note(&mut self, id: &NoteId, draft: NoteDraft) -> Result<()> {
        let Some(note) = self.notes.iter_mut().find(|note| note.id() == id) else {
            return Ok(());
        };
        note.apply(draft);
        self.persist_notes()?;
        self.touch();
        Ok(())
    }

    /// Removes the note with the given id. Silent no-op when absent.
    pub fn delete_note(&mut self, id: &NoteId) -> Result<()> {
        let before = self.notes.len();
        self.notes.retain(|note| note.id() != id);
        if self.notes.len() == before {
            return Ok(());
        }
        self.persist_notes()?;
        self.touch();
        Ok(())
    }

    /// Appends a tag to the collection.
    ///
    /// Id uniqueness rests on the random generation scheme; duplicates are
    /// not checked for.
    pub fn add_tag(&mut self, tag: Tag) -> Result<()> {
        self.tags.push(tag);
        self.persist_tags()?;
        self.touch();
        Ok(())
    }

    /// Rewrites the label of the matching tag. Notes are untouched; their
    /// id references stay valid. Silent no-op when absent.
    pub fn rename_tag(&mut self, id: &TagId, label: impl Into<String>) -> Result<()> {
        let Some(tag) = self.tags.iter_mut().find(|tag| tag.id() == id) else {
            return Ok(());
        };
        tag.set_label(label);
        self.persist_tags()?;
        self.touch();
        Ok(())
    }

    /// Removes the tag with the given id. Silent no-op when absent.
    ///
    /// Does not cascade: notes keep the now-dangling id, which tag
    /// resolution drops at read time.
    pub fn delete_tag(&mut self, id: &TagId) -> Result<()> {
        let before = self.tags.len();
        self.tags.retain(|tag| tag.id() != id);
        if self.tags.len() == before {
            return Ok(());
        }
        self.persist_tags()?;
        self.touch();
        Ok(())
    }

    fn persist_notes(&self) -> Result<()> {
        self.storage
            .write(NOTES_KEY, &self.notes)
            .context("Failed to persist notes")
    }

    fn persist_tags(&self) -> Result<()> {
        self.storage
            .write(TAGS_KEY, &self.tags)
            .context("Failed to persist tags")
    }

    fn touch(&mut self) {
        self.revision += 1;
        let revision = self.revision;
        for subscriber in &mut self.subscribers {
            subscriber(revision);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn store() -> NoteStore {
        NoteStore::open(Storage::in_memory())
    }

    #[test]
    fn create_note_appends_in_insertion_order() {
        let mut store = store();
        store
            .create_note(NoteDraft::new("First", "", vec![]))
            .unwrap();
        store
            .create_note(NoteDraft::new("Second", "", vec![]))
            .unwrap();

        let titles: Vec<&str> = store.notes().iter().map(StoredNote::title).collect();
        assert_eq!(titles, vec!["First", "Second"]);
    }

    #[test]
    fn create_note_flattens_draft_tags_to_ids() {
        let mut store = store();
        let tag = Tag::new("rust");
        store.add_tag(tag.clone()).unwrap();

        let id = store
            .create_note(NoteDraft::new("Borrowing", "body", vec![tag.clone()]))
            .unwrap();

        let note = store.get_note(&id).unwrap();
        assert_eq!(note.tag_ids(), &[tag.id().clone()]);
    }

    #[test]
    fn update_note_replaces_all_fields_in_place() {
        let mut store = store();
        store
            .create_note(NoteDraft::new("First", "", vec![]))
            .unwrap();
        let id = store
            .create_note(NoteDraft::new("Second", "old", vec![]))
            .unwrap();
        store
            .create_note(NoteDraft::new("Third", "", vec![]))
            .unwrap();

        let tag = Tag::new("edited");
        store.add_tag(tag.clone()).unwrap();
        store
            .update_note(&id, NoteDraft::new("Second v2", "new", vec![tag.clone()]))
            .unwrap();

        // Position preserved, non-matching notes untouched
        let titles: Vec<&str> = store.notes().iter().map(StoredNote::title).collect();
        assert_eq!(titles, vec!["First", "Second v2", "Third"]);

        let note = store.get_note(&id).unwrap();
        assert_eq!(note.markdown(), "new");
        assert_eq!(note.tag_ids(), &[tag.id().clone()]);
    }

    #[test]
    fn update_note_unknown_id_is_noop() {
        let mut store = store();
        store
            .create_note(NoteDraft::new("Only", "body", vec![]))
            .unwrap();
        let snapshot = store.notes().to_vec();

        store
            .update_note(
                &NoteId::new("missing"),
                NoteDraft::new("X", "y", vec![]),
            )
            .unwrap();

        assert_eq!(store.notes(), snapshot.as_slice());
    }

    #[test]
    fn delete_note_removes_only_the_match() {
        let mut store = store();
        let keep = store
            .create_note(NoteDraft::new("Keep", "", vec![]))
            .unwrap();
        let doomed = store
            .create_note(NoteDraft::new("Doomed", "", vec![]))
            .unwrap();

        store.delete_note(&doomed).unwrap();

        assert_eq!(store.notes().len(), 1);
        assert_eq!(store.notes()[0].id(), &keep);
        // Deleting again is a no-op
        store.delete_note(&doomed).unwrap();
        assert_eq!(store.notes().len(), 1);
    }

    #[test]
    fn rename_tag_does_not_touch_notes() {
        let mut store = store();
        let tag = Tag::new("rsut");
        store.add_tag(tag.clone()).unwrap();
        let id = store
            .create_note(NoteDraft::new("Note", "", vec![tag.clone()]))
            .unwrap();

        store.rename_tag(tag.id(), "rust").unwrap();

        assert_eq!(store.tags()[0].label(), "rust");
        assert_eq!(store.get_note(&id).unwrap().tag_ids(), &[tag.id().clone()]);
    }

    #[test]
    fn rename_tag_unknown_id_is_noop() {
        let mut store = store();
        store.add_tag(Tag::new("rust")).unwrap();

        store.rename_tag(&TagId::new("missing"), "other").unwrap();

        assert_eq!(store.tags().len(), 1);
        assert_eq!(store.tags()[0].label(), "rust");
    }

    #[test]
    fn delete_tag_leaves_dangling_reference_on_note() {
        let mut store = store();
        let rust = Tag::new("rust");
        let cli = Tag::new("cli");
        store.add_tag(rust.clone()).unwrap();
        store.add_tag(cli.clone()).unwrap();
        let id = store
            .create_note(NoteDraft::new("Note", "", vec![rust.clone(), cli.clone()]))
            .unwrap();

        store.delete_tag(rust.id()).unwrap();

        // Tag gone, note untouched: the stale id stays until resolution
        assert_eq!(store.tags().len(), 1);
        let note = store.get_note(&id).unwrap();
        assert_eq!(note.tag_ids(), &[rust.id().clone(), cli.id().clone()]);
    }

    #[test]
    fn find_tag_by_label_is_exact() {
        let mut store = store();
        store.add_tag(Tag::new("rust")).unwrap();

        assert!(store.find_tag_by_label("rust").is_some());
        assert!(store.find_tag_by_label("Rust").is_none());
    }

    #[test]
    fn created_ids_are_unique_across_many_creations() {
        use std::collections::HashSet;

        let mut store = store();
        let mut seen = HashSet::new();
        for i in 0..100 {
            let id = store
                .create_note(NoteDraft::new(format!("Note {i}"), "", vec![]))
                .unwrap();
            assert!(seen.insert(id));
        }
    }

    #[test]
    fn every_mutation_notifies_subscribers_with_new_revision() {
        let mut store = store();
        let seen: Rc<RefCell<Vec<u64>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        store.subscribe(move |revision| sink.borrow_mut().push(revision));

        let tag = Tag::new("rust");
        store.add_tag(tag.clone()).unwrap();
        let id = store
            .create_note(NoteDraft::new("Note", "", vec![tag.clone()]))
            .unwrap();
        store.rename_tag(tag.id(), "rust-lang").unwrap();
        store.delete_note(&id).unwrap();

        assert_eq!(*seen.borrow(), vec![1, 2, 3, 4]);
        assert_eq!(store.revision(), 4);
    }

    #[test]
    fn noop_mutations_do_not_bump_revision() {
        let mut store = store();
        store
            .update_note(&NoteId::new("missing"), NoteDraft::new("X", "", vec![]))
            .unwrap();
        store.delete_note(&NoteId::new("missing")).unwrap();
        store.delete_tag(&TagId::new("missing")).unwrap();

        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn mutations_persist_synchronously_to_storage() {
        let dir = tempfile::tempdir().unwrap();

        let tag = Tag::new("rust");
        let id;
        {
            let mut store = NoteStore::open(Storage::open(dir.path()).unwrap());
            store.add_tag(tag.clone()).unwrap();
            id = store
                .create_note(NoteDraft::new("Persisted", "body", vec![tag.clone()]))
                .unwrap();
        }

        let reopened = NoteStore::open(Storage::open(dir.path()).unwrap());
        assert_eq!(reopened.tags(), &[tag]);
        let note = reopened.get_note(&id).unwrap();
        assert_eq!(note.title(), "Persisted");
    }
}
