mod ids;
mod note;
mod tag;

pub use ids::{NoteId, TagId};
pub use note::{NoteDraft, StoredNote};
pub use tag::Tag;
