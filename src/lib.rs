//! ya-sites - news with comments and a personal notes book
//!
//! This library provides the core functionality for both sites: storage,
//! ownership-checked services, templates and the HTTP router.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
pub mod theme;
