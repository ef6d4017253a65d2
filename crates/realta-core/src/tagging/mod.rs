pub mod classify;
pub mod note;
pub mod reconcile;
pub mod update;

pub use classify::{classify, Candidate, Classification, TagEntry};
pub use note::{compose_note, has_tag, TagPattern};
pub use reconcile::{reconcile, Verdict};
pub use update::{plan_note_updates, NotePlan, NoteUpdate};
