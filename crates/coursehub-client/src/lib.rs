//! CourseHub Client Library
//!
//! Typed client for the CourseHub backend: a REST API serving an educational
//! course catalog, user reviews/ratings, and threaded discussions whose free
//! text can embed inline course references.
//!
//! All durable state lives server-side. This crate provides:
//!
//! - **API boundary**: an async [`api::ApiClient`] over every backend endpoint
//! - **Catalog queries**: [`services::catalog::CatalogEngine`] resolves a
//!   (query, filters, sort, page) tuple into a page of courses merged with
//!   their internal rating aggregates
//! - **Reference rendering**: [`services::reference::ReferenceResolver`] turns
//!   discussion text containing `***[[course:<id>]]***` tokens into typed
//!   segments, backed by a lazily populated in-memory cache
//! - **Reply threading**: [`services::thread::build_reply_forest`] converts a
//!   flat reply list into a nested forest for display
//! - **Session context**: [`session::Session`] owns the persisted bearer
//!   token and user identity, with a watch channel for auth changes
//!
//! ## Modules
//!
//! - [`api`]: HTTP client over the backend endpoints
//! - [`config`]: Configuration loading from environment variables
//! - [`error`]: Client error taxonomy
//! - [`models`]: Wire-level data model
//! - [`services`]: Catalog query engine, reference resolver, reply threading
//! - [`session`]: Persisted session context and auth-change notifications

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod session;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use session::Session;
