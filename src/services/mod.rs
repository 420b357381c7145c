//! Services layer - Business logic
//!
//! Services sit between the HTTP handlers and the repositories:
//! - Implementing ownership rules (only authors change their content)
//! - Validating submitted forms
//! - Assigning note slugs

pub mod comment;
pub mod news;
pub mod note;
pub mod password;
pub mod slug;
pub mod user;
pub mod validation;

pub use comment::{CommentService, CommentServiceError, BAD_WORDS, BAD_WORDS_WARNING};
pub use news::{NewsService, NewsServiceError};
pub use note::{NoteService, NoteServiceError, SLUG_WARNING};
pub use password::{hash_password, verify_password};
pub use slug::slugify;
pub use user::{LoginInput, RegisterInput, UserService, UserServiceError};
