//! Note model

use serde::{Deserialize, Serialize};

/// Maximum length of a note title and of its slug
pub const NOTE_FIELD_MAX_LENGTH: usize = 100;

/// A personal note. Only its author can see or change it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub slug: String,
    pub author_id: i64,
}

/// Submitted note form. An empty slug is derived from the title.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoteForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub slug: String,
}

impl NoteForm {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            slug: String::new(),
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }
}

impl From<&Note> for NoteForm {
    fn from(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            text: note.text.clone(),
            slug: note.slug.clone(),
        }
    }
}

/// Validated note fields ready to be stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteInput {
    pub title: String,
    pub text: String,
    pub slug: String,
}
