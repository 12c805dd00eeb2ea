use anyhow::Result;
use jot::{NoteDraft, NoteStore, NoteView, Storage, Tag, ViewCache, filter_notes};

/// Helper that mimics the core logic of the list command: resolve views for
/// the store's current state, then apply the title/tag filter.
fn list_notes(store: &NoteStore, title_query: &str, selected: &[Tag]) -> Vec<NoteView> {
    let mut cache = ViewCache::new();
    let views = cache.views(store);
    filter_notes(views, title_query, selected)
}

fn titles(views: &[NoteView]) -> Vec<String> {
    views.iter().map(|v| v.title.clone()).collect()
}

#[test]
fn test_empty_filter_returns_all_notes_in_order() -> Result<()> {
    let mut store = NoteStore::open(Storage::in_memory());
    store.create_note(NoteDraft::new("First", "", vec![]))?;
    store.create_note(NoteDraft::new("Second", "", vec![]))?;
    store.create_note(NoteDraft::new("Third", "", vec![]))?;

    let result = list_notes(&store, "", &[]);
    assert_eq!(titles(&result), vec!["First", "Second", "Third"]);
    Ok(())
}

#[test]
fn test_title_filter_matches_substring_case_insensitively() -> Result<()> {
    let mut store = NoteStore::open(Storage::in_memory());
    store.create_note(NoteDraft::new("Cat food", "", vec![]))?;
    store.create_note(NoteDraft::new("Dog", "", vec![]))?;
    store.create_note(NoteDraft::new("Concatenate", "", vec![]))?;

    let result = list_notes(&store, "cat", &[]);
    assert_eq!(titles(&result), vec!["Cat food", "Concatenate"]);
    Ok(())
}

#[test]
fn test_tag_filter_is_conjunctive() -> Result<()> {
    let mut store = NoteStore::open(Storage::in_memory());

    let work = Tag::new("work");
    let urgent = Tag::new("urgent");
    store.add_tag(work.clone())?;
    store.add_tag(urgent.clone())?;

    store.create_note(NoteDraft::new("Just work", "", vec![work.clone()]))?;
    store.create_note(NoteDraft::new(
        "Work and urgent",
        "",
        vec![work.clone(), urgent.clone()],
    ))?;
    store.create_note(NoteDraft::new("Untagged", "", vec![]))?;

    let result = list_notes(&store, "", &[work.clone(), urgent.clone()]);
    assert_eq!(titles(&result), vec!["Work and urgent"]);

    // A single selected tag matches every note carrying it
    let result = list_notes(&store, "", &[work.clone()]);
    assert_eq!(titles(&result), vec!["Just work", "Work and urgent"]);

    Ok(())
}

#[test]
fn test_views_reflect_tag_mutations() -> Result<()> {
    let mut store = NoteStore::open(Storage::in_memory());

    let tag = Tag::new("draft");
    store.add_tag(tag.clone())?;
    store.create_note(NoteDraft::new("Note", "", vec![tag.clone()]))?;

    let mut cache = ViewCache::new();
    assert_eq!(cache.views(&store)[0].tags[0].label(), "draft");

    store.rename_tag(tag.id(), "final")?;
    assert_eq!(cache.views(&store)[0].tags[0].label(), "final");

    store.delete_tag(tag.id())?;
    assert!(cache.views(&store)[0].tags.is_empty());

    Ok(())
}

#[test]
fn test_cache_recomputes_only_when_revision_moves() -> Result<()> {
    let mut store = NoteStore::open(Storage::in_memory());
    store.create_note(NoteDraft::new("Note", "", vec![]))?;

    let mut cache = ViewCache::new();
    let first = cache.views(&store).as_ptr();
    let second = cache.views(&store).as_ptr();
    // No mutation between pulls: same backing allocation
    assert_eq!(first, second);

    store.create_note(NoteDraft::new("Another", "", vec![]))?;
    assert_eq!(cache.views(&store).len(), 2);

    Ok(())
}
