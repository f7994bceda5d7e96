//! Core types and trait definitions for the Memoir biography store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod comment;
pub mod error;
pub mod import;
pub mod person;
pub mod slug;
pub mod store;
pub mod trending;

pub use error::{Error, ErrorKind, Result, StoreError};
