//! Shared configuration and error types for the tessera workspace.

pub mod config;
pub mod error;
