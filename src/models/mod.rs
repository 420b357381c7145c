//! Data models
//!
//! Entities stored in the database (User, Session, News, Comment, Note)
//! and the forms submitted for them.

mod comment;
mod form;
mod news;
mod note;
mod session;
mod user;

pub use comment::{Comment, CommentForm, CommentWithAuthor};
pub use form::FormErrors;
pub use news::{CreateNewsInput, News, NEWS_TITLE_MAX_LENGTH};
pub use note::{Note, NoteForm, NoteInput, NOTE_FIELD_MAX_LENGTH};
pub use session::Session;
pub use user::{User, USERNAME_MAX_LENGTH};
