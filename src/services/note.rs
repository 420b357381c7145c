//! Note service
//!
//! Personal notes: listing, creation, editing and deletion, all scoped to
//! the note's author. Slugs are unique across every user's notes; an empty
//! slug is derived from the title.

use crate::db::repositories::{is_slug_conflict, NoteRepository};
use crate::models::{FormErrors, Note, NoteForm, NoteInput, User, NOTE_FIELD_MAX_LENGTH};
use crate::services::slug::{is_valid_slug, note_slug};
use crate::services::validation::{limit_length, require, REQUIRED_MESSAGE};
use anyhow::Context;
use std::sync::Arc;

/// Appended to a slug that is already taken
pub const SLUG_WARNING: &str = " - такой slug уже существует, придумайте уникальное значение!";

/// Error for a slug with characters outside `[-a-zA-Z0-9_]`
pub const INVALID_SLUG_MESSAGE: &str =
    "Значение должно состоять только из латинских букв, цифр, знаков подчеркивания или дефиса.";

/// Error types for note service operations
#[derive(Debug, thiserror::Error)]
pub enum NoteServiceError {
    /// Note does not exist or belongs to someone else
    #[error("Note not found")]
    NotFound,

    /// Invalid note form
    #[error("Validation error: {0}")]
    Validation(FormErrors),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Note service
pub struct NoteService {
    repo: Arc<dyn NoteRepository>,
}

impl NoteService {
    pub fn new(repo: Arc<dyn NoteRepository>) -> Self {
        Self { repo }
    }

    /// Notes written by `author`
    pub async fn list_for(&self, author: &User) -> Result<Vec<Note>, NoteServiceError> {
        let notes = self
            .repo
            .list_by_author(author.id)
            .await
            .context("Failed to list notes")?;
        Ok(notes)
    }

    /// Get one of `author`'s notes by slug
    pub async fn get_owned(&self, slug: &str, author: &User) -> Result<Note, NoteServiceError> {
        self.repo
            .get_by_slug_and_author(slug, author.id)
            .await
            .context("Failed to get note")?
            .ok_or(NoteServiceError::NotFound)
    }

    /// Create a note owned by `author`
    pub async fn create(&self, author: &User, form: &NoteForm) -> Result<Note, NoteServiceError> {
        let input = self.validate(form, None).await?;

        // A concurrent request may take the slug between the check and the insert
        let note = match self.repo.create(author.id, &input).await {
            Ok(note) => note,
            Err(e) if is_slug_conflict(&e) => return Err(slug_taken(&input.slug)),
            Err(e) => return Err(e.context("Failed to create note").into()),
        };

        tracing::info!("User {} created note '{}'", author.id, note.slug);
        Ok(note)
    }

    /// Overwrite one of `author`'s notes
    pub async fn update(
        &self,
        slug: &str,
        author: &User,
        form: &NoteForm,
    ) -> Result<Note, NoteServiceError> {
        let note = self.get_owned(slug, author).await?;
        let input = self.validate(form, Some(note.id)).await?;

        let updated = match self.repo.update(note.id, author.id, &input).await {
            Ok(updated) => updated,
            Err(e) if is_slug_conflict(&e) => return Err(slug_taken(&input.slug)),
            Err(e) => return Err(e.context("Failed to update note").into()),
        };
        if !updated {
            return Err(NoteServiceError::NotFound);
        }

        tracing::info!("User {} updated note {} ('{}')", author.id, note.id, input.slug);
        Ok(Note {
            title: input.title,
            text: input.text,
            slug: input.slug,
            ..note
        })
    }

    /// Delete one of `author`'s notes, returning the removed note
    pub async fn delete(&self, slug: &str, author: &User) -> Result<Note, NoteServiceError> {
        let note = self.get_owned(slug, author).await?;

        let deleted = self
            .repo
            .delete(note.id, author.id)
            .await
            .context("Failed to delete note")?;
        if !deleted {
            return Err(NoteServiceError::NotFound);
        }

        tracing::info!("User {} deleted note '{}'", author.id, note.slug);
        Ok(note)
    }

    /// Check a submitted form and settle the slug.
    ///
    /// `editing` is the ID of the note being changed, which may keep its own slug.
    async fn validate(
        &self,
        form: &NoteForm,
        editing: Option<i64>,
    ) -> Result<NoteInput, NoteServiceError> {
        let title = form.title.trim();
        let text = form.text.trim();
        let mut slug = form.slug.trim().to_string();
        let mut errors = FormErrors::new();

        let title_ok = require(&mut errors, "title", title)
            && limit_length(&mut errors, "title", title, NOTE_FIELD_MAX_LENGTH);
        require(&mut errors, "text", text);

        let mut slug_ok = true;
        if slug.is_empty() {
            if title_ok {
                slug = note_slug(title);
                if slug.is_empty() {
                    errors.add("slug", REQUIRED_MESSAGE);
                    slug_ok = false;
                }
            } else {
                slug_ok = false;
            }
        } else if limit_length(&mut errors, "slug", &slug, NOTE_FIELD_MAX_LENGTH) {
            if !is_valid_slug(&slug) {
                errors.add("slug", INVALID_SLUG_MESSAGE);
                slug_ok = false;
            }
        } else {
            slug_ok = false;
        }

        if slug_ok
            && self
                .repo
                .slug_exists(&slug, editing)
                .await
                .context("Failed to check note slug")?
        {
            errors.add("slug", slug_taken_message(&slug));
        }

        errors.into_result().map_err(NoteServiceError::Validation)?;

        Ok(NoteInput {
            title: title.to_string(),
            text: text.to_string(),
            slug,
        })
    }
}

fn slug_taken_message(slug: &str) -> String {
    format!("{}{}", slug, SLUG_WARNING)
}

fn slug_taken(slug: &str) -> NoteServiceError {
    let mut errors = FormErrors::new();
    errors.add("slug", slug_taken_message(slug));
    NoteServiceError::Validation(errors)
}
