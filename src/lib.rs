pub mod models;
pub mod storage;
pub mod store;
pub mod view;

pub use models::{NoteDraft, NoteId, StoredNote, Tag, TagId};
pub use storage::{NOTES_KEY, Storage, StorageError, TAGS_KEY};
pub use store::NoteStore;
pub use view::{NoteView, ViewCache, filter_notes, resolve_tags};
