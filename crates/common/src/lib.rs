//! Shared domain types for notewright
//!
//! The harness drives an external note-taking application; the types here
//! describe the small slice of its domain the scenarios touch: the seeded
//! test user, a note, the importance toggle label pair, and the stage
//! classification used when reporting failures.

pub mod types;

pub use types::{ImportanceLabel, Note, Stage, TestUser};

/// Default base URL of the frontend under test.
pub fn default_frontend_url() -> String {
    "http://localhost:5173".to_string()
}

/// Default base URL of the backend under test.
pub fn default_backend_url() -> String {
    "http://localhost:3001".to_string()
}
