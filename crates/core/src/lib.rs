//! Core domain types and shared logic for the folio document repository.
//!
//! This crate defines the pieces every other crate agrees on:
//! - Application configuration
//! - Session tokens and their at-rest digests
//! - Credential hashing
//! - Stored-name derivation for uploaded files

pub mod config;
pub mod credential;
pub mod error;
pub mod stored_name;
pub mod token;

pub use credential::{hash_password, verify_password};
pub use error::{Error, Result};
pub use stored_name::stored_name_for;
pub use token::{SessionToken, hash_token};

/// Default cap on a single uploaded file: 64 MiB
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 64 * 1024 * 1024;
