//! # Quill Core
//!
//! The domain layer of the Quill blogging platform.
//! Entities, text validation, pagination, the ports that infrastructure
//! implements, and the services that assemble feeds on top of them.
//! This crate has zero infrastructure dependencies.

pub mod config;
pub mod domain;
pub mod error;
pub mod pagination;
pub mod ports;
pub mod services;

pub use config::{FeedConfig, TextPolicy};
pub use error::DomainError;
pub use pagination::{Page, PageNumber, Paginator};
